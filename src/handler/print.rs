use std::time::Instant;

use chrono::Local;
use teloxide::{
    prelude::Requester,
    types::{Message, User},
    Bot,
};

use super::notify_admin;
use crate::{
    error::HandlerResult,
    format::{wrap_job, Header, PrintJob},
    printer::PrinterError,
    service::ThrottleDecision,
    state::AppState,
};

pub const MAX_TEXT_CHARS: usize = 1000;
pub const MAX_QR_CHARS: usize = 500;

/// True when `user` may print now. Otherwise the user is told how long to wait.
pub async fn pass_rate_limit(bot: &Bot, msg: &Message, user: &User, state: &AppState) -> HandlerResult<bool> {
    let limiter = &state.services.ratelimit;
    let decision = limiter.check(user.id, Instant::now());
    if decision == ThrottleDecision::Allowed {
        return Ok(true);
    }

    let remaining = decision.remaining_secs();
    info!("Rate limited user {} for another {}s", user.id, remaining);
    bot.send_message(
        msg.chat.id,
        t!(
            "messages.rate_limited",
            window = limiter.window().as_secs().to_string(),
            remaining = remaining.to_string()
        ),
    )
    .await?;
    Ok(false)
}

/// Header segments for a job, empty when headers are disabled.
///
/// The rule never runs past the paper edge, and a long sender name wraps like body text.
pub fn header_for(user: &User, state: &AppState) -> PrintJob {
    if !state.config.print.header_enabled {
        return Vec::new();
    }
    let printer = &state.config.printer;
    let rule_width = state
        .config
        .print
        .header_line_width
        .min(printer.line_widths.chars_per_line(&printer.text_style));
    let header = Header::for_user(user, Local::now()).to_segments(rule_width);
    wrap_job(&header, &printer.line_widths, &printer.text_style)
}

/// Tells the user the print failed and alerts the admin with the cause.
pub async fn report_failure(
    bot: &Bot,
    msg: &Message,
    user: &User,
    state: &AppState,
    error: &PrinterError,
    reply: impl Into<String>,
) -> HandlerResult<()> {
    error!("Print failed for user {}: {}", user.id, error);
    bot.send_message(msg.chat.id, reply.into()).await?;
    notify_admin(
        bot,
        state.services.access.admin_chat(),
        t!(
            "admin.print_failed",
            user = user.id.to_string(),
            error = error.to_string()
        )
        .to_string(),
    )
    .await;
    Ok(())
}
