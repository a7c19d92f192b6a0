use std::sync::Arc;
use std::time::Duration;

use teloxide::{
    dptree::deps,
    types::{Message, MessageEntity},
};
use teloxide_tests::{MockBot, MockMessagePhoto, MockMessageText, MockUser};

use crate::{
    config::{test_config, test_config_with, AppConfig},
    format::job_text,
    handler::get_handler,
    printer::{MockPrinter, PrintRecord, PrinterAdapter, RetryPolicy},
    state::AppState,
};

fn mock_printer() -> Arc<MockPrinter> {
    Arc::new(MockPrinter::with_retry(RetryPolicy {
        attempts: 3,
        delay: Duration::ZERO,
    }))
}

fn state_with(printer: &Arc<MockPrinter>) -> AppState {
    state_with_config(printer, test_config())
}

fn state_with_config(printer: &Arc<MockPrinter>, config: AppConfig) -> AppState {
    let adapter: Arc<dyn PrinterAdapter> = printer.clone();
    AppState::new(config, adapter)
}

fn texts(sent: &[Message]) -> Vec<String> {
    sent.iter().filter_map(|m| m.text().map(str::to_string)).collect()
}

#[tokio::test]
async fn test_start_command() {
    let printer = mock_printer();
    let mut bot = MockBot::new(MockMessageText::new().text("/start"), get_handler());
    bot.dependencies(deps![state_with(&printer)]);

    bot.dispatch().await;

    let responses = bot.get_responses();
    let message = responses.sent_messages.last().expect("No sent messages were detected!");
    assert!(message.text().unwrap().starts_with("Hi First!"));
    assert!(printer.records().is_empty());
}

#[tokio::test]
async fn test_help_mentions_limits() {
    let printer = mock_printer();
    let mut bot = MockBot::new(MockMessageText::new().text("/help"), get_handler());
    bot.dependencies(deps![state_with(&printer)]);

    bot.dispatch().await;

    let sent = texts(&bot.get_responses().sent_messages);
    let help = sent.last().expect("No sent messages were detected!");
    assert!(help.contains("1 print per 10 sec"));
    assert!(help.contains("up to 1000 characters"));
}

#[tokio::test]
async fn test_status_reports_mock_printer() {
    let printer = mock_printer();
    let mut bot = MockBot::new(MockMessageText::new().text("/status"), get_handler());
    bot.dependencies(deps![state_with(&printer)]);

    bot.dispatch().await;

    let sent = texts(&bot.get_responses().sent_messages);
    assert_eq!(
        sent.last().map(String::as_str),
        Some("Printer online: yes\nPaper status: adequate")
    );
}

#[tokio::test]
async fn test_text_is_printed() {
    let printer = mock_printer();
    let mut bot = MockBot::new(MockMessageText::new().text("Buy milk"), get_handler());
    bot.dependencies(deps![state_with(&printer)]);

    bot.dispatch().await;

    assert_eq!(texts(&bot.get_responses().sent_messages).last().map(String::as_str), Some("Sent to printer!"));
    assert_eq!(printer.records(), vec![PrintRecord::Text("Buy milk".to_string())]);
}

#[tokio::test]
async fn test_non_whitelisted_user_is_denied() {
    let printer = mock_printer();
    let stranger = MockUser::new().id(999).build();
    let messages = vec![
        MockMessageText::new().text("hello").from(stranger.clone()),
        MockMessageText::new().text("/status").from(stranger.clone()),
        MockMessageText::new().text("/qr secret").from(stranger),
    ];
    let mut bot = MockBot::new(messages, get_handler());
    bot.dependencies(deps![state_with(&printer)]);

    bot.dispatch().await;

    assert_eq!(texts(&bot.get_responses().sent_messages), vec!["Access denied"; 3]);
    assert!(printer.records().is_empty());
}

#[tokio::test]
async fn test_second_print_inside_window_is_throttled() {
    let printer = mock_printer();
    let messages = vec![
        MockMessageText::new().text("first"),
        MockMessageText::new().text("second"),
    ];
    let mut bot = MockBot::new(messages, get_handler());
    bot.dependencies(deps![state_with(&printer)]);

    bot.dispatch().await;

    let sent = texts(&bot.get_responses().sent_messages);
    assert_eq!(sent[0], "Sent to printer!");
    assert_eq!(
        sent[1],
        "Print rate limit exceeded. Limit: 1 print per 10 sec.\nPlease wait 10 sec and try again."
    );
    assert_eq!(printer.records(), vec![PrintRecord::Text("first".to_string())]);
}

#[tokio::test]
async fn test_commands_are_not_throttled() {
    let printer = mock_printer();
    let messages = vec![
        MockMessageText::new().text("print me"),
        MockMessageText::new().text("/status"),
        MockMessageText::new().text("/help"),
    ];
    let mut bot = MockBot::new(messages, get_handler());
    bot.dependencies(deps![state_with(&printer)]);

    bot.dispatch().await;

    let sent = texts(&bot.get_responses().sent_messages);
    assert_eq!(sent.len(), 3);
    assert!(sent[1].starts_with("Printer online"));
    assert!(!sent.iter().any(|t| t.starts_with("Print rate limit")));
}

#[tokio::test]
async fn test_qr_prints_payload() {
    let printer = mock_printer();
    let mut bot = MockBot::new(MockMessageText::new().text("/qr https://example.com"), get_handler());
    bot.dependencies(deps![state_with(&printer)]);

    bot.dispatch().await;

    assert_eq!(texts(&bot.get_responses().sent_messages).last().map(String::as_str), Some("QR code sent to printer!"));
    assert_eq!(
        printer.records(),
        vec![PrintRecord::Qr {
            lead: String::new(),
            data: "https://example.com".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_qr_without_text_shows_usage() {
    let printer = mock_printer();
    let mut bot = MockBot::new(MockMessageText::new().text("/qr"), get_handler());
    bot.dependencies(deps![state_with(&printer)]);

    bot.dispatch().await;

    assert_eq!(
        texts(&bot.get_responses().sent_messages).last().map(String::as_str),
        Some("Usage: /qr <text to encode>")
    );
    assert!(printer.records().is_empty());
}

#[tokio::test]
async fn test_rejected_text_does_not_consume_window() {
    let printer = mock_printer();
    let messages = vec![
        MockMessageText::new().text("x".repeat(1001)),
        MockMessageText::new().text("short"),
    ];
    let mut bot = MockBot::new(messages, get_handler());
    bot.dependencies(deps![state_with(&printer)]);

    bot.dispatch().await;

    let sent = texts(&bot.get_responses().sent_messages);
    assert_eq!(sent[0], "Too long! Max 1000 characters.");
    assert_eq!(sent[1], "Sent to printer!");
    assert_eq!(printer.records().len(), 1);
}

#[tokio::test]
async fn test_unknown_command_is_not_printed() {
    let printer = mock_printer();
    let mut bot = MockBot::new(MockMessageText::new().text("/print hello"), get_handler());
    bot.dependencies(deps![state_with(&printer)]);

    bot.dispatch().await;

    assert_eq!(
        texts(&bot.get_responses().sent_messages).last().map(String::as_str),
        Some("Unknown command. Send /help to see what I can do.")
    );
    assert!(printer.records().is_empty());
}

#[tokio::test]
async fn test_print_failure_notifies_user_and_admin() {
    let printer = mock_printer();
    printer.fail_next(10);
    let mut bot = MockBot::new(MockMessageText::new().text("doomed"), get_handler());
    bot.dependencies(deps![state_with(&printer)]);

    bot.dispatch().await;

    let sent = texts(&bot.get_responses().sent_messages);
    assert!(sent.contains(&"Failed to print. The admin has been notified.".to_string()));
    assert!(sent.iter().any(|t| t.starts_with("Print failed for user 12345678.")));
    assert!(printer.records().is_empty());
}

#[tokio::test]
async fn test_header_fits_the_paper() {
    let printer = mock_printer();
    let user = MockUser::new().first_name("Bartholomew Fitzgerald Montgomery").build();
    let mut bot = MockBot::new(MockMessageText::new().text("Buy milk").from(user), get_handler());
    bot.dependencies(deps![state_with_config(
        &printer,
        test_config_with(&[("PRINT_HEADER_ENABLED", "true")])
    )]);

    bot.dispatch().await;

    assert_eq!(texts(&bot.get_responses().sent_messages).last().map(String::as_str), Some("Sent to printer!"));
    let records = printer.records();
    let [PrintRecord::Text(text)] = records.as_slice() else {
        panic!("expected one text print, got {:?}", records);
    };
    assert!(text.contains("Bartholomew"));
    assert!(text.contains("Montgomery"));
    assert!(text.lines().any(|line| line == "-".repeat(32)));
    assert!(text.lines().all(|line| line.chars().count() <= 32), "{}", text);
    assert!(text.trim_end().ends_with("Buy milk"));
}

#[tokio::test]
async fn test_qr_lead_carries_header() {
    let printer = mock_printer();
    let mut bot = MockBot::new(MockMessageText::new().text("/qr https://example.com"), get_handler());
    bot.dependencies(deps![state_with_config(
        &printer,
        test_config_with(&[("PRINT_HEADER_ENABLED", "true")])
    )]);

    bot.dispatch().await;

    let records = printer.records();
    let [PrintRecord::Qr { lead, data }] = records.as_slice() else {
        panic!("expected one QR print, got {:?}", records);
    };
    assert!(lead.contains("First"));
    assert!(lead.contains(&"-".repeat(32)));
    assert_eq!(data, "https://example.com");
}

#[tokio::test]
async fn test_qr_too_long_is_rejected() {
    let printer = mock_printer();
    let messages = vec![
        MockMessageText::new().text(format!("/qr {}", "q".repeat(501))),
        MockMessageText::new().text(format!("/qr {}", "q".repeat(500))),
    ];
    let mut bot = MockBot::new(messages, get_handler());
    bot.dependencies(deps![state_with(&printer)]);

    bot.dispatch().await;

    let sent = texts(&bot.get_responses().sent_messages);
    assert_eq!(sent[0], "QR text too long! Max 500 characters.");
    assert_eq!(sent[1], "QR code sent to printer!");
    assert_eq!(printer.records().len(), 1);
}

#[tokio::test]
async fn test_photo_caption_is_printed() {
    let printer = mock_printer();
    let mut bot = MockBot::new(MockMessagePhoto::new().caption("Photo note"), get_handler());
    bot.dependencies(deps![state_with(&printer)]);

    bot.dispatch().await;

    assert_eq!(texts(&bot.get_responses().sent_messages).last().map(String::as_str), Some("Sent to printer!"));
    assert_eq!(printer.records(), vec![PrintRecord::Text("Photo note".to_string())]);
}

#[tokio::test]
async fn test_formatting_entities_follow_config() {
    let bold_message = || {
        MockMessageText::new()
            .text("Hello world")
            .entities(vec![MessageEntity::bold(0, 5)])
    };

    let printer = mock_printer();
    let mut bot = MockBot::new(bold_message(), get_handler());
    bot.dependencies(deps![state_with(&printer)]);
    bot.dispatch().await;

    let jobs = printer.jobs();
    assert!(jobs[0].iter().any(|s| s.style.bold && s.text == "Hello"));
    drop(bot);

    let plain = mock_printer();
    let mut bot = MockBot::new(bold_message(), get_handler());
    bot.dependencies(deps![state_with_config(
        &plain,
        test_config_with(&[("PRINT_TELEGRAM_FORMATTING", "false")])
    )]);
    bot.dispatch().await;

    let jobs = plain.jobs();
    assert_eq!(job_text(&jobs[0]), "Hello world");
    assert!(jobs[0].iter().all(|s| !s.style.bold));
}
