use std::time::Duration;

use anyhow::Context;
use teloxide::prelude::*;
use teloxide::Bot;

use crate::command::setup_commands;
use crate::error::{BotResult, HandlerResult};
use crate::handler::{get_handler, notify_admin, AdminErrorHandler};
use crate::state::AppState;

/// How often expired rate-limit entries are dropped.
const RATE_LIMIT_SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

fn build_http_client() -> reqwest::Result<reqwest::Client> {
    // long polling holds requests open, so the overall timeout must outlast it
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .pool_idle_timeout(Duration::from_secs(60))
        .tcp_keepalive(Duration::from_secs(30))
        .user_agent(USER_AGENT)
        .build()
}

pub struct BotService {
    pub bot: Bot,
    state: AppState,
}

impl BotService {
    pub fn new(state: AppState) -> BotResult<Self> {
        let client = build_http_client().context("Failed to build Telegram HTTP client")?;

        let bot = Bot::with_client(state.config.telegram.token.clone(), client);

        Ok(Self { bot, state })
    }

    pub async fn start(&self) -> HandlerResult<()> {
        info!("Testing connection to Telegram API...");
        match self.bot.get_me().await {
            Ok(me) => info!("Connected to Telegram API as @{}", me.username()),
            Err(e) => {
                error!("Failed to connect to Telegram API: {:?}", e);
                return Err(anyhow::anyhow!("Failed to connect to Telegram API: {}", e).into());
            }
        }

        let bot = self.bot.clone();
        let state = self.state.clone();

        if let Err(e) = setup_commands(&bot).await {
            warn!("Failed to register bot commands: {}", e);
        }

        let sweeper = state.services.ratelimit.spawn_sweeper(RATE_LIMIT_SWEEP_INTERVAL);

        info!("Bot started with {} printer", state.printer.name());

        let admin = state.services.access.admin_chat();
        notify_admin(&bot, admin, t!("admin.started", printer = state.printer.name())).await;

        Dispatcher::builder(bot.clone(), get_handler())
            .dependencies(dptree::deps![state])
            .error_handler(AdminErrorHandler::new(bot, admin))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        sweeper.abort();
        info!("Bot stopped");

        Ok(())
    }
}
