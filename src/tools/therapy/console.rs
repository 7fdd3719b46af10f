//! Interactive console for the chat tool — reads lines from stdin, runs one
//! turn per line, prints the reply to stdout.
//!
//! Runs until the `shutdown` token is cancelled (Ctrl-C), stdin is closed,
//! or the user types `/quit`.

use std::io::Write as _;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::TherapyConfig;
use crate::error::AppError;
use crate::llm::LlmProvider;

use super::TherapySession;
use super::classify::crisis_notice;
use super::prompt::StyleMode;
use super::reveal::{reveal_chunks, should_reveal};

/// How replies are put on screen.
#[derive(Debug, Clone, Copy)]
pub struct RevealOptions {
    pub enabled: bool,
    pub delay: Duration,
    pub threshold: usize,
}

impl From<&TherapyConfig> for RevealOptions {
    fn from(cfg: &TherapyConfig) -> Self {
        Self {
            enabled: cfg.reveal,
            delay: Duration::from_millis(cfg.reveal_delay_ms),
            threshold: cfg.reveal_threshold,
        }
    }
}

/// One parsed line of console input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Empty,
    Chat(String),
    NewChat,
    Style(StyleMode),
    Help,
    Quit,
    Invalid(String),
}

pub fn parse_line(line: &str) -> ConsoleInput {
    let line = line.trim();
    if line.is_empty() {
        return ConsoleInput::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return ConsoleInput::Chat(line.to_string());
    };

    let mut parts = command.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("new"), None) => ConsoleInput::NewChat,
        (Some("quit" | "exit"), None) => ConsoleInput::Quit,
        (Some("help"), None) => ConsoleInput::Help,
        (Some("style"), Some(mode)) => match mode.parse::<StyleMode>() {
            Ok(style) => ConsoleInput::Style(style),
            Err(e) => ConsoleInput::Invalid(e),
        },
        (Some("style"), None) => ConsoleInput::Invalid("usage: /style concise|segmented".into()),
        _ => ConsoleInput::Invalid(format!("unknown command: /{command} (try /help)")),
    }
}

fn print_help() {
    println!("  /new                       start a new chat");
    println!("  /style concise|segmented   switch reply style");
    println!("  /quit                      leave the console");
}

fn prompt_marker() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

/// Print `text`, piece by piece when it is long enough and reveal is on.
async fn render_reply(text: &str, options: RevealOptions) {
    if !options.enabled || !should_reveal(text, options.threshold) {
        println!("{text}");
        return;
    }
    let mut out = std::io::stdout();
    for chunk in reveal_chunks(text) {
        let _ = out.write_all(chunk.as_bytes());
        let _ = out.flush();
        tokio::time::sleep(options.delay).await;
    }
    println!();
}

pub async fn run_console(
    mut session: TherapySession,
    provider: LlmProvider,
    options: RevealOptions,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    info!(provider = provider.name(), style = %session.style(), "therapy console started");
    println!("─────────────────────────────────");
    println!(" Chat Therapy  (Ctrl-C to quit)");
    println!(" Your calm space to talk things through 🌿");
    println!("─────────────────────────────────");
    println!("What’s on your mind today? Try: “I’m feeling overwhelmed about work.”");

    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();

    loop {
        prompt_marker();

        let line = tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                println!("\n[therapy] shutdown signal received — closing console");
                break;
            }

            line = lines.next_line() => line,
        };

        let input = match line {
            Err(e) => {
                warn!("console read error: {e}");
                break;
            }
            Ok(None) => {
                info!("console stdin closed");
                break;
            }
            Ok(Some(input)) => input,
        };

        match parse_line(&input) {
            ConsoleInput::Empty => continue,
            ConsoleInput::Quit => break,
            ConsoleInput::Help => print_help(),
            ConsoleInput::Invalid(msg) => println!("{msg}"),
            ConsoleInput::NewChat => {
                session.clear();
                println!("[new chat]");
            }
            ConsoleInput::Style(style) => {
                session.set_style(style);
                println!("[style: {style}]");
            }
            ConsoleInput::Chat(query) => {
                debug!(input_len = query.len(), "console received line");
                if let Some(notice) = crisis_notice(&query) {
                    println!("🆘 {notice}");
                }
                println!("… thinking");

                let reply = tokio::select! {
                    biased;

                    _ = shutdown.cancelled() => {
                        println!("\n[therapy] shutdown signal received — reply abandoned");
                        break;
                    }

                    reply = session.submit(&provider, &query) => reply.clone(),
                };

                if let Some(category) = reply.category() {
                    println!("[{category}]");
                }
                render_reply(reply.content(), options).await;
            }
        }
    }

    info!(turns = session.messages().len(), "therapy console closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_chat() {
        assert_eq!(parse_line("  I can't sleep  "), ConsoleInput::Chat("I can't sleep".into()));
        assert_eq!(parse_line("   "), ConsoleInput::Empty);
    }

    #[test]
    fn commands_parse() {
        assert_eq!(parse_line("/new"), ConsoleInput::NewChat);
        assert_eq!(parse_line("/quit"), ConsoleInput::Quit);
        assert_eq!(parse_line("/exit"), ConsoleInput::Quit);
        assert_eq!(parse_line("/help"), ConsoleInput::Help);
        assert_eq!(parse_line("/style segmented"), ConsoleInput::Style(StyleMode::Segmented));
    }

    #[test]
    fn bad_commands_are_invalid() {
        assert!(matches!(parse_line("/style"), ConsoleInput::Invalid(_)));
        assert!(matches!(parse_line("/style loud"), ConsoleInput::Invalid(_)));
        assert!(matches!(parse_line("/dance"), ConsoleInput::Invalid(m) if m.contains("/dance")));
    }

    #[test]
    fn reveal_options_follow_config() {
        let mut cfg = crate::config::Config::test_default().therapy;
        cfg.reveal = true;
        cfg.reveal_delay_ms = 5;
        let opts = RevealOptions::from(&cfg);
        assert!(opts.enabled);
        assert_eq!(opts.delay, Duration::from_millis(5));
        assert_eq!(opts.threshold, 500);
    }
}
