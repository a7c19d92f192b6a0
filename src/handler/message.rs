use teloxide::{
    dispatching::UpdateHandler,
    dptree,
    prelude::Requester,
    types::{Message, User},
    Bot,
};

use super::print::{header_for, pass_rate_limit, report_failure, MAX_TEXT_CHARS};
use crate::{
    error::HandlerResult,
    format::{build_print_job, wrap_job, Segment},
    printer::preview,
    state::AppState,
};

/// Text, or a caption for media, with the entities that belong to it.
fn printable(msg: &Message) -> Option<(&str, &[teloxide::types::MessageEntity])> {
    if let Some(text) = msg.text() {
        return Some((text, msg.entities().unwrap_or_default()));
    }
    msg.caption()
        .map(|caption| (caption, msg.caption_entities().unwrap_or_default()))
}

async fn handle_message(bot: Bot, msg: Message, user: User, state: AppState) -> HandlerResult<()> {
    let Some((text, entities)) = printable(&msg).filter(|(text, _)| !text.trim().is_empty()) else {
        bot.send_message(msg.chat.id, t!("messages.empty")).await?;
        return Ok(());
    };

    // anything command-shaped that reached here did not parse as a known command
    if text.starts_with('/') {
        bot.send_message(msg.chat.id, t!("commands.unknown_command")).await?;
        return Ok(());
    }

    if text.chars().count() > MAX_TEXT_CHARS {
        bot.send_message(msg.chat.id, t!("messages.too_long", max = MAX_TEXT_CHARS.to_string()))
            .await?;
        return Ok(());
    }

    if !pass_rate_limit(&bot, &msg, &user, &state).await? {
        return Ok(());
    }

    info!("Print request from user {}: {}", user.id, preview(text));

    let body = if state.config.print.telegram_formatting {
        build_print_job(text, entities)
    } else {
        vec![Segment::plain(text.trim())]
    };
    let printer = &state.config.printer;
    let mut job = header_for(&user, &state);
    job.extend(wrap_job(&body, &printer.line_widths, &printer.text_style));

    match state.printer.print_text(job).await {
        Ok(()) => {
            bot.send_message(msg.chat.id, t!("messages.printed")).await?;
        }
        Err(e) => {
            report_failure(&bot, &msg, &user, &state, &e, t!("messages.print_failed")).await?;
        }
    }
    Ok(())
}

pub fn get_message_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync>> {
    dptree::entry().endpoint(handle_message)
}
