//! Fixed-reply provider — returns a canned reply (or a canned failure)
//! regardless of input. Stands in for the hosted model in tests.

use crate::llm::{LlmResponse, ProviderError};

#[derive(Debug, Clone)]
pub struct FixedProvider {
    outcome: Result<String, String>,
}

impl FixedProvider {
    /// Always answer with `text`.
    pub fn reply(text: impl Into<String>) -> Self {
        Self { outcome: Ok(text.into()) }
    }

    /// Always fail with a [`ProviderError::Request`] carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self { outcome: Err(message.into()) }
    }

    pub async fn complete(&self, _content: &str) -> Result<LlmResponse, ProviderError> {
        match &self.outcome {
            Ok(text) => Ok(LlmResponse { text: text.clone() }),
            Err(msg) => Err(ProviderError::Request(msg.clone())),
        }
    }
}
