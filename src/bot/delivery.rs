use teloxide::prelude::*;
use teloxide::types::{InputFile, MessageId};
use teloxide::RequestError;

use crate::bot::router::Reply;

/// Put a [`Reply`] on the wire. Edits fall back to a new message when there
/// is no menu message to edit.
pub async fn deliver(
    bot: &Bot,
    chat_id: ChatId,
    menu_message: Option<MessageId>,
    reply: Reply,
) -> Result<(), RequestError> {
    match (reply, menu_message) {
        (Reply::Edit { text, keyboard }, Some(message_id)) => {
            let mut req = bot.edit_message_text(chat_id, message_id, text);
            if let Some(keyboard) = keyboard {
                req = req.reply_markup(keyboard);
            }
            req.await?;
        }
        (Reply::Send { text, keyboard } | Reply::Edit { text, keyboard }, _) => {
            let mut req = bot.send_message(chat_id, text);
            if let Some(keyboard) = keyboard {
                req = req.reply_markup(keyboard);
            }
            req.await?;
        }
        (Reply::Document { file_name, bytes }, _) => {
            tracing::info!("Sending {} ({} bytes) to chat {}", file_name, bytes.len(), chat_id.0);
            bot.send_document(chat_id, InputFile::memory(bytes).file_name(file_name))
                .await?;
        }
    }
    Ok(())
}
