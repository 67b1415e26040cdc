use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use super::CommandContext;
use crate::config::Config;
use crate::messages::{
    private_chat_text, sweep_started_text, sweep_summary_text, ADMINS_ONLY, CLEANUP_FAILED,
    CLEANUP_USAGE,
};
use crate::sweep::{format_elapsed, sweep, SweepMode, SweepRequest, SweepResult};
use crate::telegram::ChatApi;

/// Handles `/cleanup [all]`.
///
/// Returns the sweep result when a sweep actually ran. Anything that goes
/// wrong before or around the sweep is logged and answered with a generic
/// notice instead of being bubbled up to the dispatcher.
pub async fn handle_cleanup<A>(
    api: &A,
    ctx: &CommandContext,
    arg: &str,
    config: &Config,
    cancel: &CancellationToken,
) -> Result<Option<SweepResult>>
where
    A: ChatApi + ?Sized,
{
    tracing::info!(
        chat_id = ctx.chat_id.0,
        private = ctx.is_private,
        "Cleanup command received"
    );

    if ctx.is_private {
        let text = private_chat_text(config.invite_link.as_deref());
        api.reply_text(ctx.chat_id, ctx.message_id, &text).await?;
        return Ok(None);
    }

    let Some(mode) = SweepMode::from_arg(arg) else {
        api.reply_text(ctx.chat_id, ctx.message_id, CLEANUP_USAGE)
            .await?;
        return Ok(None);
    };

    match run_cleanup(api, ctx, mode, config, cancel).await {
        Ok(result) => Ok(result),
        Err(err) => {
            tracing::error!(
                error = ?err,
                chat_id = ctx.chat_id.0,
                "Error during cleanup"
            );
            api.reply_text(ctx.chat_id, ctx.message_id, CLEANUP_FAILED)
                .await?;
            Ok(None)
        }
    }
}

async fn run_cleanup<A>(
    api: &A,
    ctx: &CommandContext,
    mode: SweepMode,
    config: &Config,
    cancel: &CancellationToken,
) -> Result<Option<SweepResult>>
where
    A: ChatApi + ?Sized,
{
    let admins = api
        .chat_administrators(ctx.chat_id)
        .await
        .context("fetching chat administrators")?;
    let is_admin = ctx.user_id.is_some_and(|user| admins.contains(&user));
    if !is_admin {
        tracing::info!(
            chat_id = ctx.chat_id.0,
            user_id = ctx.user_id.map(|u| u.0),
            "Cleanup refused for non-admin"
        );
        api.reply_text(ctx.chat_id, ctx.message_id, ADMINS_ONLY)
            .await?;
        return Ok(None);
    }

    let status = api
        .reply_text(ctx.chat_id, ctx.message_id, sweep_started_text(mode))
        .await
        .context("sending status message")?;

    let request = SweepRequest::new(ctx.chat_id, ctx.message_id, mode, config.sweep.clone());
    let result = sweep(api, &request, Some(status), cancel).await;

    let summary = sweep_summary_text(mode, &result);
    if let Err(err) = api.edit_text(ctx.chat_id, status, &summary).await {
        tracing::warn!(
            error = %err,
            chat_id = ctx.chat_id.0,
            message_id = status.0,
            "Failed to edit status message, sending summary instead"
        );
        api.reply_text(ctx.chat_id, ctx.message_id, &summary)
            .await?;
    }

    tracing::info!(
        chat_id = ctx.chat_id.0,
        mode = ?mode,
        deleted = result.deleted_count,
        checked = result.checked_count,
        elapsed = %format_elapsed(result.elapsed),
        cancelled = result.cancelled,
        "Cleanup completed"
    );
    Ok(Some(result))
}
