use anyhow::Result;
use teloxide::{prelude::*, utils::command::BotCommands};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::handlers::{handle_cleanup, handle_start, CommandContext};

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(
    rename_rule = "lowercase",
    description = "These commands are supported:"
)]
pub enum Command {
    #[command(description = "show what this bot does.")]
    Start,
    #[command(
        description = "delete join/leave messages (admins only); `/cleanup all` deletes everything."
    )]
    Cleanup(String),
}

impl Command {
    pub async fn dispatch(
        self,
        bot: Bot,
        msg: Message,
        config: Config,
        cancel: CancellationToken,
    ) -> Result<()> {
        let ctx = CommandContext::from_message(&msg);
        match self {
            Command::Start => handle_start(&bot, &ctx, &config).await?,
            Command::Cleanup(arg) => {
                handle_cleanup(&bot, &ctx, &arg, &config, &cancel).await?;
            }
        }
        Ok(())
    }
}
