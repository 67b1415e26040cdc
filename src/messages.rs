//! Shared text sent by the bot.
//!
//! Keep all user-facing strings in this module so they stay in one place and are
//! easy to update or translate.

use crate::sweep::{format_elapsed, SweepMode, SweepResult};

pub const PRIVATE_CHAT_TEXT: &str =
    "This bot keeps groups tidy and has nothing to do in a private chat.";

pub fn private_chat_text(invite_link: Option<&str>) -> String {
    match invite_link {
        Some(link) => format!("{PRIVATE_CHAT_TEXT} Why not join our group instead? {link}"),
        None => PRIVATE_CHAT_TEXT.to_string(),
    }
}

pub const GROUP_START_TEXT: &str =
    "The bot is active! Send /cleanup to remove join/leave messages (admins only).\n\
     /cleanup all - delete every message before the command.";

pub const ADMINS_ONLY: &str = "Only admins can use this command!";
pub const CLEANUP_FAILED: &str =
    "Failed to delete messages. Make sure the bot has the right permissions.";
pub const CLEANUP_USAGE: &str = "Usage: /cleanup to remove join/leave messages, \
     /cleanup all to delete every earlier message.";

pub fn sweep_started_text(mode: SweepMode) -> &'static str {
    match mode {
        SweepMode::All => "🔄 Deleting messages...",
        SweepMode::JoinLeaveOnly => "🔄 Looking for join/leave messages among recent messages...",
    }
}

pub fn sweep_progress_text(mode: SweepMode, checked: u32, deleted: u32) -> String {
    match mode {
        SweepMode::All => format!("🔄 Deleted {deleted} messages so far..."),
        SweepMode::JoinLeaveOnly => format!(
            "🔄 Checked {checked} messages, deleted {deleted} join/leave messages..."
        ),
    }
}

pub fn sweep_summary_text(mode: SweepMode, result: &SweepResult) -> String {
    let header = if result.cancelled {
        "⏹ Cleanup interrupted"
    } else {
        "✅ Cleanup complete"
    };
    let body = match mode {
        SweepMode::All => format!("{} messages deleted", result.deleted_count),
        SweepMode::JoinLeaveOnly => format!(
            "{} join/leave messages deleted out of {} checked",
            result.deleted_count, result.checked_count
        ),
    };
    format!(
        "{header}\n{body}\nTime: {} minutes",
        format_elapsed(result.elapsed)
    )
}
