use std::sync::Arc;
use teloxide::macros::BotCommands;
use teloxide::prelude::*;

use crate::bot::delivery::deliver;
use crate::bot::AppState;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum BotCommand {
    #[command(description = "Start the bot and select a place")]
    Start,
    #[command(description = "Show this help message")]
    Help,
}

pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: BotCommand,
    state: Arc<AppState>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Channel posts have no sender; there is nobody to keep a session for.
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };

    let reply = match cmd {
        BotCommand::Start => {
            tracing::info!("/start from {} ({:?})", user.id.0, user.username);
            state
                .router
                .start(user.id, user.username.as_deref())
                .await
        }
        BotCommand::Help => state.router.help(user.id),
    };

    deliver(&bot, msg.chat.id, None, reply).await?;
    Ok(())
}
