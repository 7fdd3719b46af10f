//! Therapist-style chat tool.
//!
//! [`TherapySession`] owns the transcript for one conversation and runs a
//! single turn per [`submit`](TherapySession::submit): record the user
//! message, build the prompt from the pruned transcript, ask the model,
//! classify the reply, record it. A failed model call never aborts the
//! session — the error text becomes the reply.

pub mod classify;
pub mod console;
pub mod prompt;
pub mod reveal;
pub mod transcript;

use tracing::{debug, warn};

use crate::config::TherapyConfig;
use crate::error::AppError;
use crate::llm::{GenerationParams, LlmProvider};

use classify::{ReplyCategory, classify};
use prompt::{DEFAULT_MAX_TURNS, StyleMode, build_full_prompt};
use transcript::Message;

/// Shown when the model answers with nothing.
pub const NO_RESPONSE: &str = "[No response]";

/// Prefix of the reply substituted for a failed model call.
pub const MODEL_ERROR_PREFIX: &str = "[Error contacting model]";

/// One chat conversation.
#[derive(Debug, Clone)]
pub struct TherapySession {
    messages: Vec<Message>,
    style: StyleMode,
    max_turns: usize,
    generation: GenerationParams,
}

impl Default for TherapySession {
    fn default() -> Self {
        Self::new(StyleMode::default(), DEFAULT_MAX_TURNS, GenerationParams::default())
    }
}

impl TherapySession {
    pub fn new(style: StyleMode, max_turns: usize, generation: GenerationParams) -> Self {
        Self { messages: Vec::new(), style, max_turns: max_turns.max(1), generation }
    }

    pub fn from_config(config: &TherapyConfig) -> Result<Self, AppError> {
        let style = config.style.parse::<StyleMode>().map_err(AppError::Config)?;
        Ok(Self::new(style, config.max_turns, config.generation))
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn style(&self) -> StyleMode {
        self.style
    }

    pub fn set_style(&mut self, style: StyleMode) {
        self.style = style;
    }

    /// Drop the whole transcript ("New chat").
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// The payload that would be sent if `query` were submitted now.
    pub fn preview_prompt(&self, query: &str) -> String {
        build_full_prompt(&self.messages, query, self.style, self.max_turns)
    }

    /// Run one turn and return the recorded assistant reply.
    ///
    /// The user message is appended before the prompt is built, so it appears
    /// both as the last history line and as the latest query.
    pub async fn submit(&mut self, provider: &LlmProvider, query: &str) -> &Message {
        self.messages.push(Message::user(query));
        let payload = build_full_prompt(&self.messages, query, self.style, self.max_turns);
        debug!(
            style = %self.style,
            turns = self.messages.len(),
            payload_len = payload.len(),
            "therapy: prompt assembled"
        );

        let reply = match provider.complete(&payload, None, &self.generation).await {
            Ok(resp) if resp.text.trim().is_empty() => NO_RESPONSE.to_string(),
            Ok(resp) => resp.text,
            Err(e) => {
                warn!(provider = provider.name(), error = %e, "therapy: model call failed");
                format!("{MODEL_ERROR_PREFIX} {e}")
            }
        };

        let category: ReplyCategory = classify(&reply);
        debug!(%category, reply_len = reply.len(), "therapy: reply classified");
        self.messages.push(Message::assistant(reply, category));
        &self.messages[self.messages.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::llm::providers::{dummy::DummyProvider, fixed::FixedProvider};
    use transcript::Role;

    #[tokio::test]
    async fn submit_records_user_then_assistant() {
        let provider = LlmProvider::Fixed(FixedProvider::reply("That sounds heavy."));
        let mut session = TherapySession::default();
        let reply = session.submit(&provider, "I'm overwhelmed").await;
        assert_eq!(reply.content(), "That sounds heavy.");
        assert_eq!(reply.category(), Some(ReplyCategory::Therapeutic));

        let roles: Vec<Role> = session.messages().iter().map(|m| m.role()).collect();
        assert_eq!(roles, [Role::User, Role::Assistant]);
    }

    #[tokio::test]
    async fn payload_contains_query_in_history_and_latest() {
        let provider = LlmProvider::Dummy(DummyProvider);
        let mut session = TherapySession::default();
        let reply = session.submit(&provider, "hello there").await.content().to_string();
        assert!(reply.starts_with("[echo] System: You are Mr.TomBot"));
        assert!(reply.contains("Previous conversation:\nUser: hello there"));
        assert!(reply.ends_with("Latest query:\nhello there"));
    }

    #[tokio::test]
    async fn model_failure_becomes_inline_reply() {
        let provider = LlmProvider::Fixed(FixedProvider::failing("401 invalid api key"));
        let mut session = TherapySession::default();
        let reply = session.submit(&provider, "hi").await;
        assert!(reply.content().starts_with(MODEL_ERROR_PREFIX));
        assert!(reply.content().contains("401 invalid api key"));
        assert_eq!(session.messages().len(), 2);
    }

    #[tokio::test]
    async fn empty_reply_becomes_placeholder() {
        let provider = LlmProvider::Fixed(FixedProvider::reply("   "));
        let mut session = TherapySession::default();
        assert_eq!(session.submit(&provider, "hi").await.content(), NO_RESPONSE);
    }

    #[tokio::test]
    async fn clear_starts_fresh() {
        let provider = LlmProvider::Fixed(FixedProvider::reply("ok"));
        let mut session = TherapySession::default();
        session.submit(&provider, "one").await;
        session.clear();
        assert!(session.messages().is_empty());
        assert!(session.preview_prompt("two").contains("Previous conversation:\n(none)"));
    }

    #[test]
    fn from_config_parses_style() {
        let mut cfg = Config::test_default().therapy;
        cfg.style = "segmented".into();
        let session = TherapySession::from_config(&cfg).unwrap();
        assert_eq!(session.style(), StyleMode::Segmented);

        cfg.style = "shouty".into();
        assert!(matches!(TherapySession::from_config(&cfg), Err(AppError::Config(_))));
    }
}
