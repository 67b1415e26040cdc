//! The `/cleanup` sweep: a sequential, best-effort pass over message ids.
//!
//! Every candidate id gets at most one delete (plus one forward probe in
//! [`SweepMode::JoinLeaveOnly`]). Failures are counted as "not deleted" and
//! never abort the pass. The upper bound is the id of the command message and
//! is fixed for the whole sweep, so messages sent meanwhile are not touched.

use std::time::{Duration, Instant};

use teloxide::types::{ChatId, MessageId};
use tokio_util::sync::CancellationToken;

use crate::config::SweepSettings;
use crate::messages::sweep_progress_text;
use crate::telegram::{ChatApi, MessageOutcome};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SweepMode {
    /// Delete every id in `[1, upper)`, oldest first.
    All,
    /// Scan the most recent ids below `upper` and delete the ones that
    /// look like join/leave notices.
    JoinLeaveOnly,
}

impl SweepMode {
    /// Maps the `/cleanup` argument to a mode.
    pub fn from_arg(arg: &str) -> Option<Self> {
        match arg.trim().to_lowercase().as_str() {
            "" => Some(Self::JoinLeaveOnly),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    /// How many processed candidates between two status edits.
    pub fn progress_interval(self) -> u32 {
        match self {
            Self::All => 100,
            Self::JoinLeaveOnly => 20,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SweepRequest {
    pub chat_id: ChatId,
    pub upper_bound: MessageId,
    pub mode: SweepMode,
    pub settings: SweepSettings,
}

impl SweepRequest {
    pub fn new(
        chat_id: ChatId,
        upper_bound: MessageId,
        mode: SweepMode,
        settings: SweepSettings,
    ) -> Self {
        Self {
            chat_id,
            upper_bound,
            mode,
            settings,
        }
    }

    /// Candidate ids in the order they are visited.
    pub fn candidates(&self) -> Vec<MessageId> {
        let upper = self.upper_bound.0;
        if upper <= 1 {
            return Vec::new();
        }
        match self.mode {
            SweepMode::All => {
                let span = i32::try_from(self.settings.max_range).unwrap_or(i32::MAX);
                let start = upper.saturating_sub(span).max(1);
                (start..upper).map(MessageId).collect()
            }
            SweepMode::JoinLeaveOnly => (1..upper)
                .rev()
                .take(self.settings.scan_limit as usize)
                .map(MessageId)
                .collect(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SweepResult {
    pub checked_count: u32,
    pub deleted_count: u32,
    pub elapsed: Duration,
    /// The sweep stopped before visiting every candidate.
    pub cancelled: bool,
}

/// Formats a duration as `MM:SS`. Minutes are not wrapped into hours.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[derive(Clone, Copy)]
enum Attempt {
    Delete,
    Forward,
}

/// Runs a sweep. `status` is the message that receives progress edits.
pub async fn sweep<A>(
    api: &A,
    request: &SweepRequest,
    status: Option<MessageId>,
    cancel: &CancellationToken,
) -> SweepResult
where
    A: ChatApi + ?Sized,
{
    let started = Instant::now();
    let chat_id = request.chat_id;
    let mut result = SweepResult::default();

    let candidates = request.candidates();
    tracing::info!(
        chat_id = chat_id.0,
        upper_bound = request.upper_bound.0,
        mode = ?request.mode,
        candidates = candidates.len(),
        "Starting sweep",
    );

    if !candidates.is_empty() {
        if let Err(err) = api.probe_chat(chat_id).await {
            tracing::warn!(error = %err, chat_id = chat_id.0, "Chat lookup failed before sweep");
        }
    }

    for message_id in candidates {
        if cancel.is_cancelled() {
            result.cancelled = true;
            break;
        }

        match process_candidate(api, request, cancel, message_id).await {
            Verdict::Interrupted => {
                result.cancelled = true;
                break;
            }
            Verdict::Deleted => {
                result.checked_count += 1;
                result.deleted_count += 1;
            }
            Verdict::NotDeleted => result.checked_count += 1,
        }

        if result.checked_count % request.mode.progress_interval() == 0 {
            if let Some(status) = status {
                let text =
                    sweep_progress_text(request.mode, result.checked_count, result.deleted_count);
                if let Err(err) = api.edit_text(chat_id, status, &text).await {
                    tracing::debug!(
                        error = %err,
                        chat_id = chat_id.0,
                        message_id = status.0,
                        "Failed to update sweep status",
                    );
                }
            }
        }
    }

    result.elapsed = started.elapsed();
    result
}

/// What became of a single candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Verdict {
    Deleted,
    NotDeleted,
    /// Cancelled while backing off; the candidate is left unclassified.
    Interrupted,
}

async fn process_candidate<A>(
    api: &A,
    request: &SweepRequest,
    cancel: &CancellationToken,
    message_id: MessageId,
) -> Verdict
where
    A: ChatApi + ?Sized,
{
    if request.mode == SweepMode::JoinLeaveOnly {
        match is_ordinary_message(api, request, cancel, message_id).await {
            Some(true) => return Verdict::NotDeleted,
            Some(false) => {}
            None => return Verdict::Interrupted,
        }
        // The forward check can outlive a shutdown request; never delete after one.
        if cancel.is_cancelled() {
            return Verdict::Interrupted;
        }
    }
    match delete_candidate(api, request, cancel, message_id).await {
        Some(true) => Verdict::Deleted,
        Some(false) => Verdict::NotDeleted,
        None => Verdict::Interrupted,
    }
}

async fn delete_candidate<A>(
    api: &A,
    request: &SweepRequest,
    cancel: &CancellationToken,
    message_id: MessageId,
) -> Option<bool>
where
    A: ChatApi + ?Sized,
{
    let deleted = match attempt_with_backoff(api, request, cancel, Attempt::Delete, message_id)
        .await?
    {
        MessageOutcome::Deleted => {
            tracing::debug!(
                chat_id = request.chat_id.0,
                message_id = message_id.0,
                "Deleted message",
            );
            true
        }
        MessageOutcome::NotFound => false,
        other => {
            tracing::debug!(
                chat_id = request.chat_id.0,
                message_id = message_id.0,
                outcome = ?other,
                "Could not delete message",
            );
            false
        }
    };
    Some(deleted)
}

/// Forward probe: anything that forwards is user content. Join/leave notices
/// cannot be forwarded, and neither can ids that no longer exist, so a
/// failed probe is read as "system message" and handed to the delete path.
/// `None` means the check was interrupted by cancellation.
async fn is_ordinary_message<A>(
    api: &A,
    request: &SweepRequest,
    cancel: &CancellationToken,
    message_id: MessageId,
) -> Option<bool>
where
    A: ChatApi + ?Sized,
{
    match attempt_with_backoff(api, request, cancel, Attempt::Forward, message_id).await? {
        MessageOutcome::Forwarded(copy) => {
            if request.settings.remove_probe_copies {
                let outcome = api.delete_message(request.chat_id, copy).await;
                if !outcome.is_success() {
                    tracing::debug!(
                        chat_id = request.chat_id.0,
                        message_id = copy.0,
                        outcome = ?outcome,
                        "Could not remove forwarded probe copy",
                    );
                }
            }
            Some(true)
        }
        _ => Some(false),
    }
}

/// Runs one attempt, retrying once after a flood wait. Returns `None` when
/// the sweep is cancelled during the wait.
async fn attempt_with_backoff<A>(
    api: &A,
    request: &SweepRequest,
    cancel: &CancellationToken,
    attempt: Attempt,
    message_id: MessageId,
) -> Option<MessageOutcome>
where
    A: ChatApi + ?Sized,
{
    let outcome = run_attempt(api, request.chat_id, attempt, message_id).await;
    let MessageOutcome::RateLimited(wait) = outcome else {
        return Some(outcome);
    };
    if !request.settings.retry_on_flood {
        return Some(outcome);
    }

    let wait = wait.min(request.settings.max_backoff);
    tracing::warn!(
        chat_id = request.chat_id.0,
        message_id = message_id.0,
        wait = ?wait,
        "Rate limited during sweep, backing off",
    );
    tokio::select! {
        biased;
        _ = cancel.cancelled() => return None,
        _ = tokio::time::sleep(wait) => {}
    }
    Some(run_attempt(api, request.chat_id, attempt, message_id).await)
}

async fn run_attempt<A>(
    api: &A,
    chat_id: ChatId,
    attempt: Attempt,
    message_id: MessageId,
) -> MessageOutcome
where
    A: ChatApi + ?Sized,
{
    match attempt {
        Attempt::Delete => api.delete_message(chat_id, message_id).await,
        Attempt::Forward => api.forward_message(chat_id, message_id).await,
    }
}
