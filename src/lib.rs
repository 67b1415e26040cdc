use std::net::SocketAddr;

use anyhow::Result;
use teloxide::{
    dispatching::UpdateHandler,
    error_handlers::LoggingErrorHandler,
    prelude::*,
    update_listeners::webhooks,
};
use tokio_util::sync::CancellationToken;

pub mod commands;
pub mod config;
pub mod handlers;
pub mod messages;
pub mod sweep;
mod system_info;
pub mod telegram;

pub mod tests {
    pub mod util;
}

pub use commands::Command;
pub use config::{Config, SweepSettings};
pub use handlers::{delete_join_leave_message, is_join_leave, CommandContext};
pub use sweep::{format_elapsed, sweep, SweepMode, SweepRequest, SweepResult};
pub use system_info::get_system_info;
pub use telegram::{ChatApi, MessageOutcome};

/// Handler tree shared by the webhook dispatcher and the tests.
pub fn schema() -> UpdateHandler<anyhow::Error> {
    Update::filter_message()
        .branch(
            dptree::entry()
                .filter(|msg: Message| is_join_leave(&msg))
                .endpoint(delete_join_leave_message),
        )
        .branch(dptree::entry().filter_command::<Command>().endpoint(
            |bot: Bot,
             msg: Message,
             cmd: Command,
             config: Config,
             cancel: CancellationToken| async move {
                cmd.dispatch(bot, msg, config, cancel).await
            },
        ))
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

// ──────────────────────────────────────────────────────────────
// Main application setup
// ──────────────────────────────────────────────────────────────

pub async fn run() -> Result<()> {
    // Load .env file if it exists (for local development)
    dotenvy::dotenv().ok();
    init_tracing();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "Invalid configuration, not starting");
            return Ok(());
        }
    };

    tracing::info!("Starting cleanup bot ({})", get_system_info().replace('\n', ", "));

    let bot = Bot::new(&config.bot_token);
    let address = SocketAddr::from(([0, 0, 0, 0], config.port));

    tracing::info!(port = config.port, url = %config.webhook_url, "Starting webhook");
    let listener =
        webhooks::axum(bot.clone(), webhooks::Options::new(address, config.webhook_url.clone()))
            .await?;

    // Sweeps check this token between messages so Ctrl-C does not have to
    // wait for a long /cleanup all to finish.
    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown requested, cancelling running sweeps");
            shutdown.cancel();
        }
    });

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![config, cancel])
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    Ok(())
}
