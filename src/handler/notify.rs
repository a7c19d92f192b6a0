use std::fmt::{Debug, Display};
use std::sync::Arc;

use futures_util::future::BoxFuture;
use teloxide::{error_handlers::ErrorHandler, prelude::Requester, types::ChatId, Bot};

/// Best effort: a failed notification is logged, never propagated.
pub async fn notify_admin(bot: &Bot, admin: ChatId, text: impl Into<String>) {
    if let Err(e) = bot.send_message(admin, text.into()).await {
        error!("Failed to notify admin {}: {}", admin, e);
    }
}

/// Dispatcher error handler that logs the error and forwards it to the admin chat.
pub struct AdminErrorHandler {
    bot: Bot,
    admin: ChatId,
}

impl AdminErrorHandler {
    pub fn new(bot: Bot, admin: ChatId) -> Arc<Self> {
        Arc::new(Self { bot, admin })
    }
}

impl<E> ErrorHandler<E> for AdminErrorHandler
where
    E: Debug + Display + Send + 'static,
{
    fn handle_error(self: Arc<Self>, error: E) -> BoxFuture<'static, ()> {
        Box::pin(async move {
            error!("An error has occurred in the dispatcher: {:?}", error);
            let text = t!("admin.handler_error", error = error.to_string()).to_string();
            notify_admin(&self.bot, self.admin, text).await;
        })
    }
}
