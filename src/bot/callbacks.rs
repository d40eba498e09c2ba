use std::sync::Arc;
use teloxide::prelude::*;

use crate::bot::callback_data::CallbackAction;
use crate::bot::delivery::deliver;
use crate::bot::router::CallbackContext;
use crate::bot::{menus, AppState};

pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    bot.answer_callback_query(&q.id).await?;

    let data = match q.data.as_deref() {
        Some(d) => d,
        None => return Ok(()),
    };

    let action = match data.parse::<CallbackAction>() {
        Ok(action) => action,
        Err(e) => {
            tracing::warn!("Ignoring button from user {}: {}", q.from.id.0, e);
            return Ok(());
        }
    };

    let Some(menu) = q.message.as_ref() else {
        tracing::warn!("Callback {} arrived without its message", data);
        return Ok(());
    };
    let chat_id = menu.chat().id;

    // The download can take a while; say so before starting it.
    if action == CallbackAction::DownloadReport {
        bot.send_message(chat_id, menus::REPORT_PENDING).await?;
    }

    let ctx = CallbackContext {
        user: q.from.id,
        username: q.from.username.as_deref(),
        current_text: menu.regular_message().and_then(|m| m.text()),
    };

    for reply in state.router.handle_callback(&ctx, action).await {
        deliver(&bot, chat_id, Some(menu.id()), reply).await?;
    }

    Ok(())
}
