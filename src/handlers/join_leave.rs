use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::{ChatId, MessageId};

use crate::telegram::{ChatApi, MessageOutcome};

/// True for the service messages Telegram posts when members join or leave.
pub fn is_join_leave(msg: &Message) -> bool {
    msg.new_chat_members().is_some() || msg.left_chat_member().is_some()
}

/// Removes a single join/leave notice. Failures are logged and swallowed.
pub async fn remove_join_leave<A>(api: &A, chat_id: ChatId, message_id: MessageId) -> bool
where
    A: ChatApi + ?Sized,
{
    match api.delete_message(chat_id, message_id).await {
        MessageOutcome::Deleted => {
            tracing::info!(
                chat_id = chat_id.0,
                message_id = message_id.0,
                "Deleted join/leave message"
            );
            true
        }
        outcome => {
            tracing::warn!(
                chat_id = chat_id.0,
                message_id = message_id.0,
                outcome = ?outcome,
                "Failed to delete join/leave message"
            );
            false
        }
    }
}

pub async fn delete_join_leave_message(bot: Bot, msg: Message) -> Result<()> {
    tracing::debug!(chat_id = msg.chat.id.0, "Received join/leave update");
    remove_join_leave(&bot, msg.chat.id, msg.id).await;
    Ok(())
}
