//! Product description → JSON extractor.
//!
//! The description is sent as the user message under a strict
//! [`SYSTEM_PROMPT`](prompt::SYSTEM_PROMPT); the reply goes through
//! [`recover_json`](recover::recover_json) and is validated into a
//! [`ProductRecord`]. Nothing is retried: a model or recovery failure is
//! returned to the caller as an [`ExtractError`].

pub mod prompt;
pub mod record;
pub mod recover;

use std::path::Path;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::ExtractorConfig;
use crate::llm::{GenerationParams, LlmProvider, ProviderError};

pub use record::ProductRecord;
pub use recover::{RecoveryError, recover_json};

/// Default name of the downloadable JSON file.
pub const DOWNLOAD_FILE_NAME: &str = "product.json";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Please paste a product description.")]
    EmptyInput,
    #[error("model call failed: {0}")]
    Model(#[from] ProviderError),
    #[error("Failed to parse JSON: {0}")]
    Recovery(#[from] RecoveryError),
    #[error("JSON does not match the product schema: {0}")]
    Schema(#[source] serde_json::Error),
}

/// Stateless extraction pipeline.
#[derive(Debug, Clone)]
pub struct Extractor {
    generation: GenerationParams,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(GenerationParams::extraction())
    }
}

impl Extractor {
    pub fn new(generation: GenerationParams) -> Self {
        Self { generation }
    }

    pub fn from_config(config: &ExtractorConfig) -> Self {
        Self::new(config.generation)
    }

    /// Run one extraction.
    pub async fn extract(
        &self,
        provider: &LlmProvider,
        description: &str,
    ) -> Result<ProductRecord, ExtractError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(ExtractError::EmptyInput);
        }

        let reply = provider
            .complete(description, Some(prompt::SYSTEM_PROMPT), &self.generation)
            .await?;
        debug!(provider = provider.name(), reply_len = reply.text.len(), "extractor: reply received");

        let recovered = recover_json(&reply.text)?;
        let record = ProductRecord::from_object(recovered.object).map_err(ExtractError::Schema)?;
        info!(stage = %recovered.stage, brand = %record.brand, "extractor: record extracted");
        Ok(record)
    }
}

/// Holds the most recent successful record.
///
/// A failed run leaves the previous record in place.
#[derive(Debug, Default)]
pub struct ExtractorSession {
    extractor: Extractor,
    last: Option<ProductRecord>,
}

impl ExtractorSession {
    pub fn new(extractor: Extractor) -> Self {
        Self { extractor, last: None }
    }

    pub fn last(&self) -> Option<&ProductRecord> {
        self.last.as_ref()
    }

    pub fn clear(&mut self) {
        self.last = None;
    }

    pub async fn run(
        &mut self,
        provider: &LlmProvider,
        description: &str,
    ) -> Result<&ProductRecord, ExtractError> {
        match self.extractor.extract(provider, description).await {
            Ok(record) => Ok(self.last.insert(record)),
            Err(e) => {
                warn!(error = %e, kept_previous = self.last.is_some(), "extractor: run failed");
                Err(e)
            }
        }
    }
}

/// Pretty-printed, UTF-8, 2-space indented JSON in schema order.
pub fn download_bytes(record: &ProductRecord) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec_pretty(record)
}

/// Write the download payload to `path`.
pub fn write_download(record: &ProductRecord, path: &Path) -> std::io::Result<()> {
    let bytes = download_bytes(record).map_err(std::io::Error::other)?;
    std::fs::write(path, bytes)?;
    info!(path = %path.display(), "extractor: JSON written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::providers::fixed::FixedProvider;

    const REPLY: &str = r#"{"product_name":"Apple iPhone 15 Pro Max","brand":"Apple","price":"$1199"}"#;

    #[tokio::test]
    async fn empty_input_rejected_before_model_call() {
        let provider = LlmProvider::Fixed(FixedProvider::failing("must not be called"));
        let err = Extractor::default().extract(&provider, "  \n ").await.unwrap_err();
        assert!(matches!(err, ExtractError::EmptyInput));
    }

    #[tokio::test]
    async fn prose_wrapped_reply_is_recovered() {
        let provider = LlmProvider::Fixed(FixedProvider::reply(format!("Here is the JSON:\n{REPLY}")));
        let r = Extractor::default().extract(&provider, "an iPhone").await.unwrap();
        assert_eq!(r.brand, "Apple");
    }

    #[tokio::test]
    async fn model_failure_surfaces() {
        let provider = LlmProvider::Fixed(FixedProvider::failing("rate limited"));
        let err = Extractor::default().extract(&provider, "an iPhone").await.unwrap_err();
        assert!(matches!(err, ExtractError::Model(_)));
    }

    #[tokio::test]
    async fn failed_run_keeps_previous_record() {
        let good = LlmProvider::Fixed(FixedProvider::reply(REPLY));
        let bad = LlmProvider::Fixed(FixedProvider::reply("sorry, no idea"));

        let mut session = ExtractorSession::default();
        session.run(&good, "an iPhone").await.unwrap();

        let err = session.run(&bad, "a toaster").await.unwrap_err();
        assert!(matches!(err, ExtractError::Recovery(RecoveryError::NoValidJson)));
        assert!(err.to_string().contains("model did not return valid JSON"));
        assert_eq!(session.last().map(|r| r.brand.as_str()), Some("Apple"));

        session.clear();
        assert!(session.last().is_none());
    }

    #[test]
    fn default_and_configured_sampling_agree() {
        let configured = Extractor::from_config(&crate::config::Config::test_default().extractor);
        assert_eq!(Extractor::default().generation, configured.generation);
        assert_eq!(configured.generation, GenerationParams::extraction());
    }

    #[test]
    fn download_is_two_space_indented_utf8() {
        let record = ProductRecord { brand: "Škoda".into(), ..Default::default() };
        let text = String::from_utf8(download_bytes(&record).unwrap()).unwrap();
        assert!(text.starts_with("{\n  \"product_name\": \"\",\n  \"brand\": \"Škoda\""));
    }

    #[test]
    fn write_download_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DOWNLOAD_FILE_NAME);
        let record = ProductRecord { brand: "Apple".into(), ..Default::default() };
        write_download(&record, &path).unwrap();
        let back: ProductRecord = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(back, record);
    }
}
