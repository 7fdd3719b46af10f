//! TomBot hub — command-line entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Parse CLI args
//!   3. Load config
//!   4. Init logger at the effective level
//!   5. Build the LLM provider
//!   6. Dispatch to the hub menu, a tool, or the status report

use std::path::PathBuf;

use tracing::{info, warn};

use tombot_hub::config::{self, Config};
use tombot_hub::error::AppError;
use tombot_hub::llm::providers;
use tombot_hub::{logger, tools};

#[cfg(feature = "tool-therapy")]
use tokio_util::sync::CancellationToken;
#[cfg(feature = "tool-therapy")]
use tombot_hub::tools::therapy::{
    TherapySession,
    console::{RevealOptions, run_console},
    prompt::StyleMode,
};

#[cfg(feature = "tool-extractor")]
use tokio::io::AsyncReadExt;
#[cfg(feature = "tool-extractor")]
use tombot_hub::tools::extractor::{self, ExtractError, Extractor};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present — ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let args = parse_cli_args(std::env::args().skip(1))?;
    if matches!(args.command, Command::Help) {
        print_usage();
        return Ok(());
    }

    let config = config::load(args.config_path.as_deref())?;

    let effective_log_level = args.log_level.unwrap_or(config.log_level.as_str());
    let force_cli_level = args.log_level.is_some();

    logger::init(effective_log_level, force_cli_level, config.log_file.as_deref())?;

    info!(
        hub = %config.hub_name,
        configured_log_level = %config.log_level,
        effective_log_level = %effective_log_level,
        provider = %config.llm.provider,
        "config loaded"
    );

    match args.command {
        Command::Help => Ok(()),
        Command::Hub => {
            print_hub_menu(&config);
            Ok(())
        }
        Command::Status => {
            print_status(&config);
            Ok(())
        }
        Command::Therapy { style } => run_therapy(&config, style).await,
        Command::Extract { text, output } => run_extract(&config, text, output).await,
    }
}

fn build_provider(config: &Config) -> Result<tombot_hub::llm::LlmProvider, AppError> {
    if config.llm.provider != "dummy" && config.llm_api_key.is_none() {
        warn!(provider = %config.llm.provider, "no LLM_API_KEY / GROQ_API_KEY set — requests will likely be rejected");
    }
    let provider = providers::build(&config.llm, config.llm_api_key.clone())?;
    info!(provider = provider.name(), "llm provider ready");
    Ok(provider)
}

#[cfg(feature = "tool-therapy")]
async fn run_therapy(config: &Config, style: Option<String>) -> Result<(), AppError> {
    let provider = build_provider(config)?;
    let mut session = TherapySession::from_config(&config.therapy)?;
    if let Some(style) = style {
        session.set_style(style.parse::<StyleMode>().map_err(AppError::Usage)?);
    }

    // Shared shutdown token — Ctrl-C cancels it, the console watches it.
    let shutdown = CancellationToken::new();
    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received — initiating shutdown");
            ctrlc_token.cancel();
        }
    });

    run_console(session, provider, RevealOptions::from(&config.therapy), shutdown).await
}

#[cfg(not(feature = "tool-therapy"))]
async fn run_therapy(_config: &Config, _style: Option<String>) -> Result<(), AppError> {
    Err(AppError::Usage("therapy tool not compiled in (enable feature `tool-therapy`)".into()))
}

#[cfg(feature = "tool-extractor")]
async fn run_extract(
    config: &Config,
    text: Option<String>,
    output: Option<PathBuf>,
) -> Result<(), AppError> {
    let description = match text {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            tokio::io::stdin().read_to_string(&mut buf).await?;
            buf
        }
    };
    if description.trim().is_empty() {
        return Err(ExtractError::EmptyInput.into());
    }

    let provider = build_provider(config)?;
    let record = Extractor::from_config(&config.extractor)
        .extract(&provider, &description)
        .await?;

    let bytes = extractor::download_bytes(&record).map_err(download_error)?;
    println!("{}", String::from_utf8_lossy(&bytes));

    let path = output.unwrap_or_else(|| config.extractor.output_file.clone());
    extractor::write_download(&record, &path)?;
    println!("⬇️  saved {}", path.display());
    Ok(())
}

/// Serialising the download is an output failure, not a schema mismatch.
#[cfg(feature = "tool-extractor")]
fn download_error(e: serde_json::Error) -> AppError {
    AppError::Io(std::io::Error::other(e))
}

#[cfg(not(feature = "tool-extractor"))]
async fn run_extract(
    _config: &Config,
    _text: Option<String>,
    _output: Option<PathBuf>,
) -> Result<(), AppError> {
    Err(AppError::Usage("extractor tool not compiled in (enable feature `tool-extractor`)".into()))
}

fn print_hub_menu(config: &Config) {
    println!("🧰 {}", config.hub_name);
    println!();
    let tiles = tools::available();
    if tiles.is_empty() {
        println!("  no tools compiled in");
        return;
    }
    for tool in tiles {
        println!("  {:<28} tombot {}", tool.title, tool.id);
        println!("      {}", tool.summary);
    }
    println!();
    println!("💡 Run `tombot <tool>` to open a tool, `tombot --help` for options");
}

fn print_status(config: &Config) {
    let fit = |text: String| -> String {
        const WIDTH: usize = 58;
        let char_count = text.chars().count();
        if char_count >= WIDTH {
            let mut out = text.chars().take(WIDTH - 1).collect::<String>();
            out.push('…');
            out
        } else {
            format!("{text:<WIDTH$}")
        }
    };

    let llm_line = if config.llm.provider == "dummy" {
        "dummy (echo, offline)".to_string()
    } else {
        format!("{} · {}", config.llm.provider, config.llm.openai.model)
    };
    let key_line = if config.llm_api_key.is_some() { "present" } else { "missing" };
    let tools_line = {
        let ids: Vec<&str> = tools::available().iter().map(|t| t.id).collect();
        if ids.is_empty() { "none".to_string() } else { ids.join(", ") }
    };
    let log_line = match &config.log_file {
        Some(path) => format!("{} → {}", config.log_level, path.display()),
        None => format!("{} → stderr", config.log_level),
    };

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║ 🤖 TomBot Hub Status                                         ║");
    println!("╟──────────────────────────────────────────────────────────────╢");
    println!("║   {}║", fit(format!("🧾 Hub: {}", config.hub_name)));
    println!("║   {}║", fit(format!("📝 Log: {log_line}")));
    println!("╟──────────────────────────────────────────────────────────────╢");
    println!("║ 🧠 LLM                                                       ║");
    println!("║   {}║", fit(llm_line));
    println!("║   {}║", fit(format!("endpoint: {}", config.llm.openai.api_base_url)));
    println!("║   {}║", fit(format!("api key: {key_line}")));
    println!("╟──────────────────────────────────────────────────────────────╢");
    println!("║ 🧰 Tools                                                     ║");
    println!("║   {}║", fit(tools_line));
    println!(
        "║   {}║",
        fit(format!(
            "therapy: style={}, max_turns={}, max_tokens={}",
            config.therapy.style, config.therapy.max_turns, config.therapy.generation.max_tokens
        ))
    );
    println!(
        "║   {}║",
        fit(format!("extract: output={}", config.extractor.output_file.display()))
    );
    println!("╚══════════════════════════════════════════════════════════════╝");
}

fn print_usage() {
    println!("Usage: tombot [OPTIONS] [COMMAND]");
    println!();
    println!("Commands:");
    println!("  (none)                     Show the hub menu");
    println!("  therapy [--style MODE]     Chat console (MODE: concise | segmented)");
    println!("  extract [TEXT] [-o FILE]   Product description → JSON (reads stdin without TEXT)");
    println!("  status                     Print resolved configuration");
    println!();
    println!("Options:");
    println!("  -h, --help                 Print help");
    println!("  -f, --config <PATH>        Path to configuration file (default: config/default.toml)");
    println!("  -v, -vv, -vvv, -vvvv       Increase logging verbosity");
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Help,
    Hub,
    Therapy { style: Option<String> },
    Extract { text: Option<String>, output: Option<PathBuf> },
    Status,
}

#[derive(Debug)]
struct CliArgs {
    log_level: Option<&'static str>,
    config_path: Option<String>,
    command: Command,
}

fn parse_cli_args(args: impl IntoIterator<Item = String>) -> Result<CliArgs, AppError> {
    let mut verbosity = 0u8;
    let mut config_path = None;
    let mut command: Option<String> = None;
    let mut style = None;
    let mut output = None;
    let mut words: Vec<String> = Vec::new();
    let mut help = false;

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        if arg == "--" {
            words.extend(iter.by_ref());
            break;
        }

        match arg.as_str() {
            "-h" | "--help" => help = true,
            "-f" | "--config" => {
                config_path = Some(
                    iter.next()
                        .ok_or_else(|| AppError::Usage("-f/--config requires a path argument".into()))?,
                );
            }
            "-o" | "--output" => {
                output = Some(PathBuf::from(
                    iter.next()
                        .ok_or_else(|| AppError::Usage("-o/--output requires a path argument".into()))?,
                ));
            }
            "-s" | "--style" => {
                style = Some(
                    iter.next()
                        .ok_or_else(|| AppError::Usage("--style requires concise or segmented".into()))?,
                );
            }
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                verbosity = verbosity.saturating_add((a.len() - 1) as u8);
            }
            a if a.starts_with('-') && a.len() > 1 => {
                return Err(AppError::Usage(format!("unknown option: {a} (try --help)")));
            }
            _ if command.is_none() => command = Some(arg),
            _ => words.push(arg),
        }
    }

    // Each -v raises verbosity one tier from the config default:
    //   -v      → warn
    //   -vv     → info
    //   -vvv    → debug  (prompt sizes, recovery stage)
    //   -vvvv+  → trace  (full payload dumps)
    let log_level = match verbosity {
        0 => None,
        1 => Some("warn"),
        2 => Some("info"),
        3 => Some("debug"),
        _ => Some("trace"),
    };

    let command = if help {
        Command::Help
    } else {
        match command.as_deref() {
            None | Some("hub") => Command::Hub,
            Some("status") => Command::Status,
            Some(id) => {
                // Tool commands exist only for tools compiled into this build.
                let tool = tools::find(id)
                    .ok_or_else(|| AppError::Usage(format!("unknown command: {id} (try --help)")))?;
                match tool.id {
                    "therapy" => Command::Therapy { style },
                    "extract" => {
                        let text = (!words.is_empty()).then(|| words.join(" "));
                        return Ok(CliArgs {
                            log_level,
                            config_path,
                            command: Command::Extract { text, output },
                        });
                    }
                    other => return Err(AppError::Usage(format!("tool {other} has no command"))),
                }
            }
        }
    };

    if !words.is_empty() {
        return Err(AppError::Usage(format!("unexpected argument: {}", words[0])));
    }

    Ok(CliArgs { log_level, config_path, command })
}
