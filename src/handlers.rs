pub mod cleanup;
pub mod join_leave;
pub mod start;

pub use cleanup::handle_cleanup;
pub use join_leave::{delete_join_leave_message, is_join_leave};
pub use start::handle_start;

use teloxide::types::{ChatId, Message, MessageId, UserId};

/// The parts of an incoming command message the handlers care about.
#[derive(Clone, Debug)]
pub struct CommandContext {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub is_private: bool,
    pub user_id: Option<UserId>,
}

impl CommandContext {
    pub fn from_message(msg: &Message) -> Self {
        Self {
            chat_id: msg.chat.id,
            message_id: msg.id,
            is_private: msg.chat.is_private(),
            user_id: msg.from.as_ref().map(|user| user.id),
        }
    }
}
