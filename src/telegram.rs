//! Thin seam over the Telegram Bot API.
//!
//! Handlers and the sweeper talk to [`ChatApi`] instead of `teloxide::Bot`
//! directly. Per-message calls return a [`MessageOutcome`] value rather than
//! an error: a message that cannot be deleted or forwarded is an expected
//! result during a cleanup, not a failure of the command.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::{
    prelude::*,
    types::{ChatId, MessageId, ReplyParameters, UserId},
    ApiError, RequestError,
};

/// Result of a single delete or forward attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MessageOutcome {
    Deleted,
    /// The message was forwarded; carries the id of the new copy.
    Forwarded(MessageId),
    NotFound,
    /// Too old to delete, or the bot lacks the rights.
    PermissionDenied,
    RateLimited(Duration),
    Failed(String),
}

impl MessageOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Deleted | Self::Forwarded(_))
    }

    pub fn from_request_error(err: &RequestError) -> Self {
        match err {
            RequestError::Api(ApiError::MessageToDeleteNotFound)
            | RequestError::Api(ApiError::MessageToForwardNotFound)
            | RequestError::Api(ApiError::MessageIdInvalid) => Self::NotFound,
            RequestError::Api(ApiError::MessageCantBeDeleted) => Self::PermissionDenied,
            RequestError::Api(ApiError::Unknown(description))
                if description.to_lowercase().contains("not enough rights") =>
            {
                Self::PermissionDenied
            }
            RequestError::RetryAfter(wait) => Self::RateLimited(wait.duration()),
            other => Self::Failed(other.to_string()),
        }
    }
}

#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> MessageOutcome;

    /// Forwards a message back into the chat it came from.
    async fn forward_message(&self, chat_id: ChatId, message_id: MessageId) -> MessageOutcome;

    async fn chat_administrators(&self, chat_id: ChatId) -> Result<HashSet<UserId>>;

    /// Checks that the chat is reachable.
    async fn probe_chat(&self, chat_id: ChatId) -> Result<()>;

    async fn reply_text(&self, chat_id: ChatId, reply_to: MessageId, text: &str)
        -> Result<MessageId>;

    async fn edit_text(&self, chat_id: ChatId, message_id: MessageId, text: &str) -> Result<()>;
}

#[async_trait]
impl ChatApi for Bot {
    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> MessageOutcome {
        match Requester::delete_message(self, chat_id, message_id).await {
            Ok(_) => MessageOutcome::Deleted,
            Err(err) => {
                tracing::debug!(
                    error = %err,
                    chat_id = chat_id.0,
                    message_id = message_id.0,
                    "Failed to delete message",
                );
                MessageOutcome::from_request_error(&err)
            }
        }
    }

    async fn forward_message(&self, chat_id: ChatId, message_id: MessageId) -> MessageOutcome {
        match Requester::forward_message(self, chat_id, chat_id, message_id).await {
            Ok(copy) => MessageOutcome::Forwarded(copy.id),
            Err(err) => {
                tracing::debug!(
                    error = %err,
                    chat_id = chat_id.0,
                    message_id = message_id.0,
                    "Failed to forward message",
                );
                MessageOutcome::from_request_error(&err)
            }
        }
    }

    async fn chat_administrators(&self, chat_id: ChatId) -> Result<HashSet<UserId>> {
        let admins = self
            .get_chat_administrators(chat_id)
            .await
            .context("get_chat_administrators")?;
        Ok(admins.into_iter().map(|member| member.user.id).collect())
    }

    async fn probe_chat(&self, chat_id: ChatId) -> Result<()> {
        self.get_chat(chat_id).await.context("get_chat")?;
        Ok(())
    }

    async fn reply_text(
        &self,
        chat_id: ChatId,
        reply_to: MessageId,
        text: &str,
    ) -> Result<MessageId> {
        let sent = self
            .send_message(chat_id, text.to_string())
            .reply_parameters(ReplyParameters::new(reply_to))
            .await?;
        Ok(sent.id)
    }

    async fn edit_text(&self, chat_id: ChatId, message_id: MessageId, text: &str) -> Result<()> {
        self.edit_message_text(chat_id, message_id, text.to_string())
            .await?;
        Ok(())
    }
}
