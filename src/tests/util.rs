use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Url;
use teloxide::types::{ChatId, MessageId, UserId};
use tokio_util::sync::CancellationToken;

use crate::config::{Config, SweepSettings};
use crate::telegram::{ChatApi, MessageOutcome};

pub fn test_config() -> Config {
    Config {
        bot_token: "TEST".to_string(),
        webhook_url: Url::parse("https://example.org/webhook").expect("static url"),
        port: 8443,
        invite_link: None,
        sweep: SweepSettings::default(),
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub delete: usize,
    pub forward: usize,
    pub admins: usize,
    pub get_chat: usize,
    pub reply: usize,
    pub edit: usize,
}

#[derive(Default)]
struct FakeChat {
    messages: BTreeSet<i32>,
    forwardable: HashSet<i32>,
    failing_deletes: HashSet<i32>,
    rate_limited: HashSet<i32>,
    rate_limited_forwards: HashMap<i32, Duration>,
    cancel_on_touch: Option<(i32, CancellationToken)>,
    admins: HashSet<UserId>,
    admins_unavailable: bool,
    fail_edits: bool,
    next_id: i32,
    probe_copies: Vec<i32>,
    sent: Vec<String>,
    edited: Vec<String>,
    calls: CallCounts,
}

impl FakeChat {
    fn touch(&self, id: i32) {
        if let Some((target, token)) = &self.cancel_on_touch {
            if *target == id {
                token.cancel();
            }
        }
    }
}

/// In-memory chat standing in for the Bot API.
///
/// Messages listed via [`FakeChatApi::with_messages`] exist and can be
/// deleted once; only ids marked forwardable survive the forward probe.
pub struct FakeChatApi {
    chat: Mutex<FakeChat>,
}

impl Default for FakeChatApi {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeChatApi {
    pub fn new() -> Self {
        Self {
            chat: Mutex::new(FakeChat {
                next_id: 100_000,
                ..FakeChat::default()
            }),
        }
    }

    fn chat(&self) -> MutexGuard<'_, FakeChat> {
        self.chat.lock().expect("fake chat poisoned")
    }

    pub fn with_messages(self, ids: impl IntoIterator<Item = i32>) -> Self {
        self.chat().messages.extend(ids);
        self
    }

    pub fn with_forwardable(self, ids: impl IntoIterator<Item = i32>) -> Self {
        self.chat().forwardable.extend(ids);
        self
    }

    pub fn with_admins(self, admins: impl IntoIterator<Item = UserId>) -> Self {
        self.chat().admins.extend(admins);
        self
    }

    pub fn failing_delete(self, id: i32) -> Self {
        self.chat().failing_deletes.insert(id);
        self
    }

    /// The first delete of `id` answers with a short flood wait.
    pub fn rate_limited_once(self, id: i32) -> Self {
        self.chat().rate_limited.insert(id);
        self
    }

    /// The first forward of `id` answers with a flood wait of `wait`.
    pub fn rate_limited_forward_once(self, id: i32, wait: Duration) -> Self {
        self.chat().rate_limited_forwards.insert(id, wait);
        self
    }

    /// Cancels `token` as soon as `id` is forwarded or deleted, before the
    /// call answers.
    pub fn cancel_on_touch(self, id: i32, token: CancellationToken) -> Self {
        self.chat().cancel_on_touch = Some((id, token));
        self
    }

    pub fn admins_unavailable(self) -> Self {
        self.chat().admins_unavailable = true;
        self
    }

    pub fn failing_edits(self) -> Self {
        self.chat().fail_edits = true;
        self
    }

    pub fn calls(&self) -> CallCounts {
        self.chat().calls.clone()
    }

    pub fn remaining_messages(&self) -> Vec<i32> {
        let chat = self.chat();
        chat.messages
            .iter()
            .copied()
            .filter(|id| !chat.probe_copies.contains(id))
            .collect()
    }

    pub fn probe_copies(&self) -> Vec<i32> {
        self.chat().probe_copies.clone()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.chat().sent.clone()
    }

    pub fn edited_texts(&self) -> Vec<String> {
        self.chat().edited.clone()
    }
}

#[async_trait]
impl ChatApi for FakeChatApi {
    async fn delete_message(&self, _chat_id: ChatId, message_id: MessageId) -> MessageOutcome {
        let mut chat = self.chat();
        chat.calls.delete += 1;
        let id = message_id.0;
        chat.touch(id);
        if chat.failing_deletes.contains(&id) {
            return MessageOutcome::Failed("Bad Request: message can't be deleted".into());
        }
        if chat.rate_limited.remove(&id) {
            return MessageOutcome::RateLimited(Duration::from_millis(1));
        }
        if chat.messages.remove(&id) {
            MessageOutcome::Deleted
        } else {
            MessageOutcome::NotFound
        }
    }

    async fn forward_message(&self, _chat_id: ChatId, message_id: MessageId) -> MessageOutcome {
        let mut chat = self.chat();
        chat.calls.forward += 1;
        let id = message_id.0;
        chat.touch(id);
        if let Some(wait) = chat.rate_limited_forwards.remove(&id) {
            return MessageOutcome::RateLimited(wait);
        }
        if !(chat.forwardable.contains(&id) && chat.messages.contains(&id)) {
            return MessageOutcome::NotFound;
        }
        chat.next_id += 1;
        let copy = chat.next_id;
        chat.messages.insert(copy);
        chat.probe_copies.push(copy);
        MessageOutcome::Forwarded(MessageId(copy))
    }

    async fn chat_administrators(&self, _chat_id: ChatId) -> Result<HashSet<UserId>> {
        let mut chat = self.chat();
        chat.calls.admins += 1;
        if chat.admins_unavailable {
            return Err(anyhow!("Bad Request: chat not found"));
        }
        Ok(chat.admins.clone())
    }

    async fn probe_chat(&self, _chat_id: ChatId) -> Result<()> {
        self.chat().calls.get_chat += 1;
        Ok(())
    }

    async fn reply_text(
        &self,
        _chat_id: ChatId,
        _reply_to: MessageId,
        text: &str,
    ) -> Result<MessageId> {
        let mut chat = self.chat();
        chat.calls.reply += 1;
        chat.sent.push(text.to_string());
        chat.next_id += 1;
        Ok(MessageId(chat.next_id))
    }

    async fn edit_text(&self, _chat_id: ChatId, _message_id: MessageId, text: &str) -> Result<()> {
        let mut chat = self.chat();
        chat.calls.edit += 1;
        if chat.fail_edits {
            return Err(anyhow!("Bad Request: message to edit not found"));
        }
        chat.edited.push(text.to_string());
        Ok(())
    }
}
