//! Prompt assembly for the chat tool.
//!
//! The payload is rebuilt from the transcript on every turn:
//!
//! ```text
//! System: <persona>
//! Style rules: <directive for the selected mode>
//!
//! Previous conversation:
//! User: ...
//! Assistant: ...
//!
//! Latest query:
//! <query>
//! ```
//!
//! Style directives are advisory text for the model; nothing here enforces
//! word counts or section layout.

use std::fmt;
use std::str::FromStr;

use super::transcript::Message;

/// Transcript entries kept in a prompt unless configured otherwise.
pub const DEFAULT_MAX_TURNS: usize = 24;

/// Rendered in place of the history block when there is nothing to show.
pub const EMPTY_HISTORY: &str = "(none)";

const PERSONA: &str = "System: You are Mr.TomBot, a supportive therapist-style AI.";

/// Reply style selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StyleMode {
    /// "Therapist (concise)".
    #[default]
    Concise,
    /// "Segmented explainer".
    Segmented,
}

impl StyleMode {
    pub const ALL: [StyleMode; 2] = [StyleMode::Concise, StyleMode::Segmented];

    pub fn label(self) -> &'static str {
        match self {
            StyleMode::Concise => "Therapist (concise)",
            StyleMode::Segmented => "Segmented explainer",
        }
    }

    pub fn directive(self) -> &'static str {
        match self {
            StyleMode::Concise => {
                "Empathetic, precise, non-clinical. No medications. Stay in mental-wellbeing scope. \
                 Keep answers ≤80 words; 2–5 short bullets when useful; ≤2 clarifying questions."
            }
            StyleMode::Segmented => {
                "When explaining, use up to 4 sections: TL;DR, Key Points, Steps, Next Actions. \
                 Keep ≤180 words total. Each bullet ≤14 words. End with: 'Want me to expand any section?'."
            }
        }
    }
}

impl fmt::Display for StyleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StyleMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "concise" | "therapist" => Ok(StyleMode::Concise),
            "segmented" | "explainer" => Ok(StyleMode::Segmented),
            other => Err(format!("unknown reply style '{other}' (expected concise or segmented)")),
        }
    }
}

/// Render the last `max_turns` user/assistant entries as `"<Role>: <content>"`
/// lines, or [`EMPTY_HISTORY`] when none qualify.
pub fn render_history(history: &[Message], max_turns: usize) -> String {
    let kept: Vec<&Message> = history.iter().filter(|m| m.role().is_conversational()).collect();
    let start = kept.len().saturating_sub(max_turns);
    let lines: Vec<String> = kept[start..]
        .iter()
        .map(|m| format!("{}: {}", m.role().label(), m.content()))
        .collect();

    if lines.is_empty() {
        EMPTY_HISTORY.to_string()
    } else {
        lines.join("\n")
    }
}

/// Assemble the full payload sent to the model for one turn.
pub fn build_full_prompt(history: &[Message], latest: &str, mode: StyleMode, max_turns: usize) -> String {
    format!(
        "{PERSONA}\nStyle rules: {}\n\nPrevious conversation:\n{}\n\nLatest query:\n{latest}",
        mode.directive(),
        render_history(history, max_turns),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::therapy::classify::ReplyCategory;

    fn numbered_history(n: usize) -> Vec<Message> {
        (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    Message::user(format!("u{i}"))
                } else {
                    Message::assistant(format!("a{i}"), ReplyCategory::Therapeutic)
                }
            })
            .collect()
    }

    #[test]
    fn empty_history_renders_placeholder() {
        assert_eq!(render_history(&[], DEFAULT_MAX_TURNS), "(none)");
        let prompt = build_full_prompt(&[], "hello", StyleMode::Concise, DEFAULT_MAX_TURNS);
        assert!(prompt.contains("Previous conversation:\n(none)\n\nLatest query:\nhello"));
    }

    #[test]
    fn keeps_exactly_last_n_in_order() {
        let history = numbered_history(30);
        let rendered = render_history(&history, 24);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 24);
        assert_eq!(lines[0], "User: u6");
        assert_eq!(lines[1], "Assistant: a7");
        assert_eq!(lines[23], "Assistant: a29");
    }

    #[test]
    fn short_history_is_kept_whole() {
        let history = numbered_history(3);
        assert_eq!(render_history(&history, 24), "User: u0\nAssistant: a1\nUser: u2");
    }

    #[test]
    fn non_conversational_roles_dropped_before_truncation() {
        let mut history = numbered_history(4);
        history.insert(1, Message::system("notice"));
        history.push(Message::system("another notice"));
        let rendered = render_history(&history, 3);
        assert_eq!(rendered, "Assistant: a1\nUser: u2\nAssistant: a3");
        assert!(!rendered.contains("notice"));
    }

    #[test]
    fn payload_layout_and_directive() {
        let history = vec![Message::user("I feel stuck")];
        let prompt = build_full_prompt(&history, "What now?", StyleMode::Segmented, 24);
        let expected = format!(
            "System: You are Mr.TomBot, a supportive therapist-style AI.\n\
             Style rules: {}\n\n\
             Previous conversation:\nUser: I feel stuck\n\n\
             Latest query:\nWhat now?",
            StyleMode::Segmented.directive()
        );
        assert_eq!(prompt, expected);
    }

    #[test]
    fn directives_differ_per_mode() {
        assert!(StyleMode::Concise.directive().contains("≤80 words"));
        assert!(StyleMode::Segmented.directive().contains("TL;DR, Key Points, Steps, Next Actions"));
    }

    #[test]
    fn style_parses_names_and_aliases() {
        assert_eq!("concise".parse::<StyleMode>().unwrap(), StyleMode::Concise);
        assert_eq!(" Segmented ".parse::<StyleMode>().unwrap(), StyleMode::Segmented);
        assert_eq!("explainer".parse::<StyleMode>().unwrap(), StyleMode::Segmented);
        assert!("poetic".parse::<StyleMode>().is_err());
    }
}
