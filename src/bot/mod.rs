pub mod callback_data;
pub mod callbacks;
pub mod commands;
pub mod delivery;
pub mod router;
pub mod menus;
pub mod session;

use teloxide::dispatching::UpdateFilterExt;
use teloxide::dptree;
use teloxide::prelude::*;

pub use router::MenuRouter;

/// Shared application state, accessible from all handlers.
pub struct AppState {
    pub router: MenuRouter,
}

/// Build the teloxide update handler tree.
pub fn build_handler() -> teloxide::dispatching::UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    let command_handler = Update::filter_message()
        .filter_command::<commands::BotCommand>()
        .endpoint(commands::handle_command);

    let callback_handler = Update::filter_callback_query()
        .endpoint(callbacks::handle_callback);

    dptree::entry()
        .branch(command_handler)
        .branch(callback_handler)
}
