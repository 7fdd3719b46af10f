//! Dummy LLM provider — echoes input back prefixed with `[echo]`.
//! Used for exercising the tools end to end without an API key.

use crate::llm::{LlmResponse, ProviderError};

#[derive(Debug, Clone)]
pub struct DummyProvider;

impl DummyProvider {
    pub async fn complete(&self, content: &str) -> Result<LlmResponse, ProviderError> {
        Ok(LlmResponse { text: format!("[echo] {content}") })
    }
}
