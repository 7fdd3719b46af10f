//! Transcript entries for the chat tool.

use std::fmt;

use super::classify::ReplyCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    /// Never rendered into prompts; kept so callers can carry notices in the
    /// same sequence.
    System,
}

impl Role {
    /// Label used in the prompt's history block.
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
            Role::System => "System",
        }
    }

    pub fn is_conversational(self) -> bool {
        matches!(self, Role::User | Role::Assistant)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One immutable transcript entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    role: Role,
    content: String,
    category: Option<ReplyCategory>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into(), category: None }
    }

    pub fn assistant(content: impl Into<String>, category: ReplyCategory) -> Self {
        Self { role: Role::Assistant, content: content.into(), category: Some(category) }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into(), category: None }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Display category; only assistant replies carry one.
    pub fn category(&self) -> Option<ReplyCategory> {
        self.category
    }
}
