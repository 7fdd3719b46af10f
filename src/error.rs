//! Application-wide error types.

use thiserror::Error;

use crate::llm::ProviderError;

#[cfg(feature = "tool-extractor")]
use crate::tools::extractor::ExtractError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("usage error: {0}")]
    Usage(String),

    #[error("llm error: {0}")]
    Provider(#[from] ProviderError),

    #[cfg(feature = "tool-extractor")]
    #[error("extraction failed: {0}")]
    Extract(#[from] ExtractError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn config_error_display() {
        let e = AppError::Config("missing field".into());
        assert!(!e.to_string().is_empty());
        assert!(e.to_string().contains("missing field"));
    }

    #[test]
    fn logger_error_display() {
        let e = AppError::Logger("already initialized".into());
        assert!(e.to_string().contains("already initialized"));
    }

    #[test]
    fn provider_error_converts() {
        let e: AppError = ProviderError::UnknownProvider("mystery".into()).into();
        assert!(e.to_string().starts_with("llm error"));
        assert!(e.to_string().contains("mystery"));
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let e: AppError = io_err.into();
        assert!(e.to_string().contains("io error"));
        // satisfies std::error::Error trait
        let _: &dyn Error = &e;
    }
}
