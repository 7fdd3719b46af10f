//! End-to-end chat turns against offline providers.

use tombot_hub::llm::LlmProvider;
use tombot_hub::llm::providers::{dummy::DummyProvider, fixed::FixedProvider};
use tombot_hub::tools::therapy::classify::ReplyCategory;
use tombot_hub::tools::therapy::prompt::StyleMode;
use tombot_hub::tools::therapy::transcript::Role;
use tombot_hub::tools::therapy::{MODEL_ERROR_PREFIX, TherapySession};

#[tokio::test]
async fn conversation_accumulates_history_across_turns() {
    let provider = LlmProvider::Dummy(DummyProvider);
    let mut session = TherapySession::default();

    session.submit(&provider, "I'm feeling overwhelmed about work.").await;
    let second = session.submit(&provider, "It started last month.").await.content().to_string();

    // The echo of turn two carries turn one in its history block.
    assert!(second.contains("User: I'm feeling overwhelmed about work.\nAssistant: [echo]"));
    assert!(second.ends_with("Latest query:\nIt started last month."));
    assert_eq!(session.messages().len(), 4);
}

#[tokio::test]
async fn segmented_style_changes_directive() {
    let provider = LlmProvider::Dummy(DummyProvider);
    let mut session = TherapySession::default();
    session.set_style(StyleMode::Segmented);
    let reply = session.submit(&provider, "explain burnout").await.content().to_string();
    assert!(reply.contains("TL;DR, Key Points, Steps, Next Actions"));
}

#[tokio::test]
async fn replies_are_tagged_by_category() {
    let mut session = TherapySession::default();

    let steps = LlmProvider::Fixed(FixedProvider::reply("Here is a plan: 1) rest 2) talk to someone."));
    assert_eq!(session.submit(&steps, "what do I do").await.category(), Some(ReplyCategory::Solution));

    let refusal = LlmProvider::Fixed(FixedProvider::reply("That is outside my scope; please seek legal advice."));
    assert_eq!(
        session.submit(&refusal, "should I sue?").await.category(),
        Some(ReplyCategory::OutOfScope)
    );

    let warm = LlmProvider::Fixed(FixedProvider::reply("That sounds exhausting."));
    assert_eq!(session.submit(&warm, "I'm tired").await.category(), Some(ReplyCategory::Therapeutic));
}

#[tokio::test]
async fn failed_call_is_recorded_and_session_continues() {
    let mut session = TherapySession::default();

    let down = LlmProvider::Fixed(FixedProvider::failing("connection refused"));
    let reply = session.submit(&down, "hello?").await;
    assert!(reply.content().starts_with(MODEL_ERROR_PREFIX));

    let up = LlmProvider::Fixed(FixedProvider::reply("I'm here."));
    assert_eq!(session.submit(&up, "hello again").await.content(), "I'm here.");

    let roles: Vec<Role> = session.messages().iter().map(|m| m.role()).collect();
    assert_eq!(roles, [Role::User, Role::Assistant, Role::User, Role::Assistant]);
}

#[tokio::test]
async fn long_conversation_prompt_is_pruned() {
    let provider = LlmProvider::Fixed(FixedProvider::reply("ok"));
    let mut session = TherapySession::default();
    for i in 0..20 {
        session.submit(&provider, &format!("message {i}")).await;
    }
    let prompt = session.preview_prompt("latest");
    let history = prompt
        .split("Previous conversation:\n")
        .nth(1)
        .and_then(|rest| rest.split("\n\nLatest query:").next())
        .unwrap();
    assert_eq!(history.lines().count(), 24);
    assert!(!history.contains("message 7\n"));
    assert!(history.contains("User: message 8"));
}
