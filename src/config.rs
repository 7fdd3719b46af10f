//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory
//! (or the path given with `-f/--config`), then applies the
//! `TOMBOT_LOG_LEVEL` env override. The API key comes from `LLM_API_KEY`,
//! falling back to `GROQ_API_KEY`; it is never read from TOML.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::error::AppError;
use crate::llm::GenerationParams;

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// OpenAI / OpenAI-compatible provider configuration.
/// Populated from `[llm.openai]` in the TOML.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Full chat completions endpoint URL.
    pub api_base_url: String,
    /// Model name passed in the request body.
    pub model: String,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
}

/// LLM configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Which provider is active (`"dummy"` or `"openai"`).
    /// Maps to `default` in `[llm]` so other provider sections can coexist.
    pub provider: String,
    pub openai: OpenAiConfig,
}

/// Therapy chat tool (`[tools.therapy]`).
#[derive(Debug, Clone)]
pub struct TherapyConfig {
    /// Transcript entries kept in each prompt.
    pub max_turns: usize,
    /// Initial reply style: `"concise"` or `"segmented"`.
    pub style: String,
    /// Reveal long replies chunk by chunk.
    pub reveal: bool,
    pub reveal_delay_ms: u64,
    /// Replies longer than this many characters are revealed incrementally.
    pub reveal_threshold: usize,
    pub generation: GenerationParams,
}

/// Product extractor tool (`[tools.extractor]`).
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Where `tombot extract` writes the JSON download.
    pub output_file: PathBuf,
    pub generation: GenerationParams,
}

/// Fully-resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub hub_name: String,
    pub log_level: String,
    /// Append logs here instead of stderr (already expanded, no `~`).
    pub log_file: Option<PathBuf>,
    pub llm: LlmConfig,
    /// API key from the environment — `None` for keyless local models.
    pub llm_api_key: Option<String>,
    pub therapy: TherapyConfig,
    pub extractor: ExtractorConfig,
}

/// Raw TOML shape — `serde` target before resolution.
#[derive(Deserialize)]
struct RawConfig {
    hub: RawHub,
    #[serde(default)]
    llm: RawLlm,
    #[serde(default)]
    tools: RawTools,
}

#[derive(Deserialize)]
struct RawHub {
    #[serde(default = "default_hub_name")]
    name: String,
    #[serde(default = "default_log_level")]
    log_level: String,
    #[serde(default)]
    log_file: Option<String>,
}

#[derive(Deserialize)]
struct RawLlm {
    #[serde(rename = "default", default = "default_llm_provider")]
    provider: String,
    #[serde(default)]
    openai: RawOpenAiConfig,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self { provider: default_llm_provider(), openai: RawOpenAiConfig::default() }
    }
}

#[derive(Deserialize)]
struct RawOpenAiConfig {
    #[serde(default = "default_openai_api_base_url")]
    api_base_url: String,
    #[serde(default = "default_openai_model")]
    model: String,
    #[serde(default = "default_openai_timeout_seconds")]
    timeout_seconds: u64,
}

impl Default for RawOpenAiConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_openai_api_base_url(),
            model: default_openai_model(),
            timeout_seconds: default_openai_timeout_seconds(),
        }
    }
}

#[derive(Deserialize, Default)]
struct RawTools {
    #[serde(default)]
    therapy: RawTherapy,
    #[serde(default)]
    extractor: RawExtractor,
}

#[derive(Deserialize)]
struct RawTherapy {
    #[serde(default = "default_max_turns")]
    max_turns: usize,
    #[serde(default = "default_style")]
    style: String,
    #[serde(default = "default_true")]
    reveal: bool,
    #[serde(default = "default_reveal_delay_ms")]
    reveal_delay_ms: u64,
    #[serde(default = "default_reveal_threshold")]
    reveal_threshold: usize,
    #[serde(default = "default_therapy_generation")]
    generation: GenerationParams,
}

impl Default for RawTherapy {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            style: default_style(),
            reveal: true,
            reveal_delay_ms: default_reveal_delay_ms(),
            reveal_threshold: default_reveal_threshold(),
            generation: default_therapy_generation(),
        }
    }
}

#[derive(Deserialize)]
struct RawExtractor {
    #[serde(default = "default_output_file")]
    output_file: String,
    #[serde(default = "default_extractor_generation")]
    generation: GenerationParams,
}

impl Default for RawExtractor {
    fn default() -> Self {
        Self { output_file: default_output_file(), generation: default_extractor_generation() }
    }
}

fn default_hub_name() -> String { "The Hub".to_string() }
fn default_log_level() -> String { "warn".to_string() }
fn default_llm_provider() -> String { "dummy".to_string() }
fn default_openai_api_base_url() -> String { "https://api.groq.com/openai/v1/chat/completions".to_string() }
fn default_openai_model() -> String { "llama-3.1-8b-instant".to_string() }
fn default_openai_timeout_seconds() -> u64 { 60 }
fn default_max_turns() -> usize { 24 }
fn default_style() -> String { "concise".to_string() }
fn default_reveal_delay_ms() -> u64 { 20 }
fn default_reveal_threshold() -> usize { 500 }
fn default_output_file() -> String { "product.json".to_string() }
fn default_true() -> bool { true }

fn default_therapy_generation() -> GenerationParams {
    GenerationParams::default()
}

fn default_extractor_generation() -> GenerationParams {
    GenerationParams::extraction()
}

/// Load config from `path` (or `config/default.toml`), then apply env-var overrides.
pub fn load(path: Option<&str>) -> Result<Config, AppError> {
    let log_level_override = env::var("TOMBOT_LOG_LEVEL").ok();
    let api_key = env::var("LLM_API_KEY")
        .or_else(|_| env::var("GROQ_API_KEY"))
        .ok()
        .filter(|k| !k.trim().is_empty());
    load_from(
        Path::new(path.unwrap_or(DEFAULT_CONFIG_PATH)),
        log_level_override.as_deref(),
        api_key,
    )
}

/// Internal loader — accepts an explicit path and overrides.
/// Tests pass overrides directly instead of mutating env vars.
pub fn load_from(
    path: &Path,
    log_level_override: Option<&str>,
    llm_api_key: Option<String>,
) -> Result<Config, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let parsed: RawConfig = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    let hub = parsed.hub;
    let therapy = parsed.tools.therapy;
    let extractor = parsed.tools.extractor;

    if therapy.max_turns == 0 {
        return Err(AppError::Config("tools.therapy.max_turns must be at least 1".into()));
    }

    Ok(Config {
        hub_name: hub.name,
        log_level: log_level_override.unwrap_or(&hub.log_level).to_string(),
        log_file: hub.log_file.as_deref().map(expand_home),
        llm: LlmConfig {
            provider: parsed.llm.provider,
            openai: OpenAiConfig {
                api_base_url: parsed.llm.openai.api_base_url,
                model: parsed.llm.openai.model,
                timeout_seconds: parsed.llm.openai.timeout_seconds,
            },
        },
        llm_api_key,
        therapy: TherapyConfig {
            max_turns: therapy.max_turns,
            style: therapy.style,
            reveal: therapy.reveal,
            reveal_delay_ms: therapy.reveal_delay_ms,
            reveal_threshold: therapy.reveal_threshold,
            generation: therapy.generation,
        },
        extractor: ExtractorConfig {
            output_file: expand_home(&extractor.output_file),
            generation: extractor.generation,
        },
    })
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

// ── test helpers ──────────────────────────────────────────────────────────────

/// Safe `Config` for unit tests — dummy LLM, no API keys, no external calls.
#[cfg(test)]
impl Config {
    pub fn test_default() -> Self {
        Self {
            hub_name: "test".into(),
            log_level: "info".into(),
            log_file: None,
            llm: LlmConfig {
                provider: "dummy".into(),
                openai: OpenAiConfig {
                    api_base_url: "http://localhost:0/v1/chat/completions".into(),
                    model: "test-model".into(),
                    timeout_seconds: 1,
                },
            },
            llm_api_key: None,
            therapy: TherapyConfig {
                max_turns: default_max_turns(),
                style: default_style(),
                reveal: false,
                reveal_delay_ms: 0,
                reveal_threshold: default_reveal_threshold(),
                generation: default_therapy_generation(),
            },
            extractor: ExtractorConfig {
                output_file: PathBuf::from("product.json"),
                generation: default_extractor_generation(),
            },
        }
    }
}
