//! Tools reachable from the hub.
//!
//! Each tool is a small request/response pipeline over the shared
//! [`LlmProvider`](crate::llm::LlmProvider):
//!
//! ```text
//! input ─▶ prompt assembly ─▶ provider ─▶ classify / recover ─▶ render
//! ```
//!
//! Tools are feature-gated; [`available`] lists the ones compiled in so the
//! hub menu and the CLI dispatcher agree.

#[cfg(feature = "tool-therapy")]
pub mod therapy;

#[cfg(feature = "tool-extractor")]
pub mod extractor;

/// One hub tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolInfo {
    /// CLI subcommand.
    pub id: &'static str,
    pub title: &'static str,
    pub summary: &'static str,
}

/// Tools compiled into this build, in menu order.
pub fn available() -> Vec<ToolInfo> {
    let mut tools = Vec::new();
    #[cfg(feature = "tool-therapy")]
    tools.push(ToolInfo {
        id: "therapy",
        title: "🧠 Chat Therapy",
        summary: "Therapist-style chat with concise or segmented replies.",
    });
    #[cfg(feature = "tool-extractor")]
    tools.push(ToolInfo {
        id: "extract",
        title: "🧩 Product → JSON Extractor",
        summary: "Paste a product description, get strict JSON and download it.",
    });
    tools
}

/// Look up a tool by its CLI id.
pub fn find(id: &str) -> Option<ToolInfo> {
    available().into_iter().find(|t| t.id == id)
}
