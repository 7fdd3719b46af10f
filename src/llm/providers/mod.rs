//! LLM provider implementations.
//!
//! `build(config, api_key)` is the factory — called at startup.
//! Adding a new backend = new module + new match arm.

pub mod dummy;
pub mod fixed;
pub mod openai_compatible;

use crate::config::LlmConfig;
use crate::llm::{LlmProvider, ProviderError};

/// Construct a `LlmProvider` from config and an optional API key.
///
/// `api_key` is sourced from the environment (never TOML) and is `None`
/// for keyless local models. `fixed` is not buildable from config; tests
/// construct it directly.
pub fn build(config: &LlmConfig, api_key: Option<String>) -> Result<LlmProvider, ProviderError> {
    match config.provider.as_str() {
        "dummy" => Ok(LlmProvider::Dummy(dummy::DummyProvider)),
        "openai" | "openai-compatible" | "groq" => {
            let oai = &config.openai;
            let p = openai_compatible::OpenAiCompatibleProvider::new(
                oai.api_base_url.clone(),
                oai.model.clone(),
                oai.timeout_seconds,
                api_key,
            )?;
            Ok(LlmProvider::OpenAiCompatible(p))
        }
        _ => Err(ProviderError::UnknownProvider(config.provider.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OpenAiConfig;

    fn llm_config(provider: &str) -> LlmConfig {
        LlmConfig {
            provider: provider.into(),
            openai: OpenAiConfig {
                api_base_url: "http://localhost:0/v1/chat/completions".into(),
                model: "test-model".into(),
                timeout_seconds: 1,
            },
        }
    }

    #[test]
    fn builds_dummy() {
        let p = build(&llm_config("dummy"), None).unwrap();
        assert_eq!(p.name(), "dummy");
    }

    #[test]
    fn builds_openai_aliases() {
        for name in ["openai", "openai-compatible", "groq"] {
            let p = build(&llm_config(name), Some("k".into())).unwrap();
            assert_eq!(p.name(), "openai");
        }
    }

    #[test]
    fn unknown_provider_errors() {
        let err = build(&llm_config("carrier-pigeon"), None).unwrap_err();
        assert!(matches!(err, ProviderError::UnknownProvider(ref n) if n == "carrier-pigeon"));
    }
}
