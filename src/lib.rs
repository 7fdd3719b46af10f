//! TomBot hub — a small set of LLM-backed tools behind one entry point.
//!
//! - [`tools::therapy`]: therapist-style chat with keyword-classified replies.
//! - [`tools::extractor`]: product description → strict JSON record.
//!
//! Both tools talk to the model through [`llm::LlmProvider`]; configuration,
//! logging and errors are shared.

pub mod config;
pub mod error;
pub mod llm;
pub mod logger;
pub mod tools;
