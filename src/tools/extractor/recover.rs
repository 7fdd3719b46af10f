//! Best-effort recovery of one JSON object from a model reply.
//!
//! Strategies are tried in order of decreasing trust and the first one that
//! parses wins:
//!
//! 1. the whole trimmed reply,
//! 2. the match of `(?m)\{[\s\S]*\}$` — an opening brace through a closing
//!    brace that ends a line (tolerates prose before the object),
//! 3. the span from the first `{` to the last `}` (tolerates prose on both
//!    sides).
//!
//! This is not a JSON repair algorithm. A reply holding two objects, or stray
//! braces in the surrounding prose, can make strategy 3 hand back a span that
//! merges them; whether that span parses is left to chance.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

static TRAILING_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)\{[\s\S]*\}$").expect("trailing-object pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecoveryError {
    #[error("model did not return valid JSON")]
    NoValidJson,
}

/// Which strategy produced the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryStage {
    Direct,
    TrailingMatch,
    BraceSpan,
}

impl fmt::Display for RecoveryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecoveryStage::Direct => "direct",
            RecoveryStage::TrailingMatch => "trailing-match",
            RecoveryStage::BraceSpan => "brace-span",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recovered {
    pub object: Map<String, Value>,
    pub stage: RecoveryStage,
}

fn parse_object(candidate: &str) -> Option<Map<String, Value>> {
    serde_json::from_str::<Map<String, Value>>(candidate).ok()
}

fn brace_span(text: &str) -> Option<&str> {
    let first = text.find('{')?;
    let last = text.rfind('}')?;
    (last > first).then(|| &text[first..=last])
}

/// Recover a JSON object from `raw`, or fail with [`RecoveryError::NoValidJson`].
pub fn recover_json(raw: &str) -> Result<Recovered, RecoveryError> {
    let text = raw.trim();

    let found = parse_object(text)
        .map(|o| (o, RecoveryStage::Direct))
        .or_else(|| {
            let m = TRAILING_OBJECT.find(text)?;
            parse_object(m.as_str()).map(|o| (o, RecoveryStage::TrailingMatch))
        })
        .or_else(|| {
            let span = brace_span(text)?;
            parse_object(span).map(|o| (o, RecoveryStage::BraceSpan))
        });

    match found {
        Some((object, stage)) => {
            debug!(%stage, keys = object.len(), "json recovered");
            Ok(Recovered { object, stage })
        }
        None => {
            debug!(raw_len = raw.len(), "json recovery failed");
            Err(RecoveryError::NoValidJson)
        }
    }
}
