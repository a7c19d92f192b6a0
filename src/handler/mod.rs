mod command;
mod message;
mod notify;
mod print;

use teloxide::{
    dispatching::{UpdateFilterExt, UpdateHandler},
    dptree,
    prelude::Requester,
    types::{Message, Update, User},
    Bot,
};

use command::get_command_handler;
use message::get_message_handler;

pub use notify::{notify_admin, AdminErrorHandler};

use crate::{error::HandlerResult, state::AppState};

/// Message updates only. Updates without a sender are dropped, then the whitelist gates everything.
pub fn get_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    Update::filter_message()
        .filter_map(|msg: Message| msg.from.clone())
        .branch(
            dptree::filter(|user: User, state: AppState| !state.services.access.is_allowed(user.id))
                .endpoint(handle_access_denied),
        )
        .branch(get_command_handler())
        .branch(get_message_handler())
}

async fn handle_access_denied(bot: Bot, msg: Message, user: User) -> HandlerResult<()> {
    warn!("Access denied for user {} ({})", user.id, user.first_name);
    bot.send_message(msg.chat.id, t!("messages.access_denied")).await?;
    Ok(())
}
