use anyhow::Result;

use super::CommandContext;
use crate::config::Config;
use crate::messages::{private_chat_text, GROUP_START_TEXT};
use crate::telegram::ChatApi;

pub async fn handle_start<A>(api: &A, ctx: &CommandContext, config: &Config) -> Result<()>
where
    A: ChatApi + ?Sized,
{
    tracing::info!(
        chat_id = ctx.chat_id.0,
        private = ctx.is_private,
        "Start command received"
    );
    let text = if ctx.is_private {
        private_chat_text(config.invite_link.as_deref())
    } else {
        GROUP_START_TEXT.to_string()
    };
    api.reply_text(ctx.chat_id, ctx.message_id, &text).await?;
    Ok(())
}
