//! LLM provider abstraction.
//!
//! `LlmProvider` is an enum over concrete provider implementations.
//! Add a new variant + module in `providers/` for each additional backend.
//!
//! Provider instances are shared immutable capabilities — clone them freely.
//! The `complete` method is `async fn` on the enum so callers need no
//! trait-object machinery.

pub mod providers;

use serde::Deserialize;
use thiserror::Error;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("provider request failed: {0}")]
    Request(String),
    #[error("stream decode failed: {0}")]
    Stream(String),
}

// ── Request / response ───────────────────────────────────────────────────────

/// Sampling and transport knobs sent with every completion request.
///
/// Deserialised directly from the `[tools.<id>.generation]` config tables.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GenerationParams {
    pub temperature: f32,
    /// Nucleus-sampling threshold.
    pub top_p: f32,
    /// Upper bound on generated tokens (`max_completion_tokens` on the wire).
    pub max_tokens: u32,
    /// Request server-sent events and concatenate the deltas.
    #[serde(default)]
    pub stream: bool,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self { temperature: 0.6, top_p: 0.9, max_tokens: 512, stream: true }
    }
}

impl GenerationParams {
    /// Near-deterministic sampling for structured (JSON) output.
    pub const fn extraction() -> Self {
        Self { temperature: 0.3, top_p: 0.1, max_tokens: 400, stream: true }
    }
}

/// Reply text of one completion.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub text: String,
}

// ── Provider enum ─────────────────────────────────────────────────────────────

/// All available provider backends.
///
/// Adding a backend = new module + new variant + new `complete` arm.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    Dummy(providers::dummy::DummyProvider),
    Fixed(providers::fixed::FixedProvider),
    OpenAiCompatible(providers::openai_compatible::OpenAiCompatibleProvider),
}

impl LlmProvider {
    /// Send `content` (as the user message) plus an optional system prompt and
    /// return the provider's reply.
    pub async fn complete(
        &self,
        content: &str,
        system: Option<&str>,
        params: &GenerationParams,
    ) -> Result<LlmResponse, ProviderError> {
        match self {
            LlmProvider::Dummy(p) => p.complete(content).await,
            LlmProvider::Fixed(p) => p.complete(content).await,
            LlmProvider::OpenAiCompatible(p) => p.complete(content, system, params).await,
        }
    }

    /// Short backend name for logs and `tombot status`.
    pub fn name(&self) -> &'static str {
        match self {
            LlmProvider::Dummy(_) => "dummy",
            LlmProvider::Fixed(_) => "fixed",
            LlmProvider::OpenAiCompatible(_) => "openai",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use providers::fixed::FixedProvider;

    #[tokio::test]
    async fn enum_dispatches_to_fixed() {
        let p = LlmProvider::Fixed(FixedProvider::reply("hi there"));
        let r = p.complete("ignored", None, &GenerationParams::default()).await.unwrap();
        assert_eq!(r.text, "hi there");
        assert_eq!(p.name(), "fixed");
    }

    #[test]
    fn generation_stream_defaults_off_when_omitted() {
        let p: GenerationParams =
            toml::from_str("temperature = 0.3\ntop_p = 0.1\nmax_tokens = 400").unwrap();
        assert!(!p.stream);
        assert_eq!(p.max_tokens, 400);
    }
}
