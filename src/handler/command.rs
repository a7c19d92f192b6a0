use teloxide::{
    dispatching::{HandlerExt, UpdateHandler},
    dptree,
    prelude::Requester,
    types::{Message, User},
    Bot,
};

use super::print::{header_for, pass_rate_limit, report_failure, MAX_QR_CHARS, MAX_TEXT_CHARS};
use crate::{command::Command, error::HandlerResult, printer::preview, state::AppState};

async fn handle_start(bot: Bot, msg: Message, user: User) -> HandlerResult<()> {
    bot.send_message(msg.chat.id, t!("commands.start", first_name = user.first_name))
        .await?;
    Ok(())
}

async fn handle_help(bot: Bot, msg: Message, state: AppState) -> HandlerResult<()> {
    let help = t!(
        "commands.help",
        window = state.services.ratelimit.window().as_secs().to_string(),
        max_text = MAX_TEXT_CHARS.to_string(),
        max_qr = MAX_QR_CHARS.to_string()
    );
    bot.send_message(msg.chat.id, help).await?;
    Ok(())
}

async fn handle_status(bot: Bot, msg: Message, state: AppState) -> HandlerResult<()> {
    let status = state.printer.status().await;
    info!("Status requested: online={}, paper={:?}", status.online, status.paper);

    let online = if status.online { "yes" } else { "no" };
    bot.send_message(
        msg.chat.id,
        t!(
            "commands.status",
            online = online,
            paper = status.paper_status().label()
        ),
    )
    .await?;
    Ok(())
}

async fn handle_qr(bot: Bot, msg: Message, user: User, state: AppState, text: String) -> HandlerResult<()> {
    let data = text.trim();
    if data.is_empty() {
        bot.send_message(msg.chat.id, t!("qr.usage")).await?;
        return Ok(());
    }
    if data.chars().count() > MAX_QR_CHARS {
        bot.send_message(msg.chat.id, t!("qr.too_long", max = MAX_QR_CHARS.to_string()))
            .await?;
        return Ok(());
    }
    if !pass_rate_limit(&bot, &msg, &user, &state).await? {
        return Ok(());
    }

    info!("QR request from user {}: {}", user.id, preview(data));
    let lead = header_for(&user, &state);
    match state.printer.print_qr(lead, data.to_string()).await {
        Ok(()) => {
            bot.send_message(msg.chat.id, t!("qr.printed")).await?;
        }
        Err(e) => {
            report_failure(&bot, &msg, &user, &state, &e, t!("qr.print_failed")).await?;
        }
    }
    Ok(())
}

async fn handle_command(bot: Bot, msg: Message, user: User, cmd: Command, state: AppState) -> HandlerResult<()> {
    match cmd {
        Command::Start => handle_start(bot, msg, user).await?,
        Command::Help => handle_help(bot, msg, state).await?,
        Command::Status => handle_status(bot, msg, state).await?,
        Command::Qr(text) => handle_qr(bot, msg, user, state, text).await?,
    }

    Ok(())
}

pub fn get_command_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync>> {
    dptree::entry().filter_command::<Command>().endpoint(handle_command)
}
