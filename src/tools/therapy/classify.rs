//! Keyword classification of chat text.
//!
//! Matching is plain case-folded substring containment with no word
//! boundaries, so `"plan"` also matches `"explanation"` and `"steps"` matches
//! `"footsteps"`. Downstream rendering depends on exactly this behaviour; do
//! not tighten it.

use std::fmt;

/// Display category of an assistant reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplyCategory {
    /// The model declined or redirected (legal, HR, financial, ...).
    OutOfScope,
    /// The reply is a structured plan or list of steps.
    Solution,
    /// Everything else.
    Therapeutic,
}

impl ReplyCategory {
    pub fn tag(self) -> &'static str {
        match self {
            ReplyCategory::OutOfScope => "out-of-scope",
            ReplyCategory::Solution => "solution",
            ReplyCategory::Therapeutic => "therapist",
        }
    }
}

impl fmt::Display for ReplyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

pub const OUT_OF_SCOPE_KEYWORDS: &[&str] = &[
    "outside my scope",
    "out of scope",
    "cannot assist",
    "i can’t assist",
    "i can't assist",
    "i can’t help",
    "i can't help",
    "contact hr",
    "report to hr",
    "authorities",
    "legal advice",
    "lawsuit",
    "file a case",
    "police report",
    "financial advice",
    "tax advice",
    "not able to help",
];

pub const SOLUTION_KEYWORDS: &[&str] = &[
    "steps",
    "plan",
    "solution",
    "checklist",
    "follow these",
    "next actions",
    "here’s how",
    "here is how",
    "actionable",
    "tl;dr",
    "tldr",
];

pub const CRISIS_KEYWORDS: &[&str] = &["suicide", "self-harm", "kill myself", "hurt myself"];

pub const CRISIS_NOTICE: &str =
    "If you're in danger or considering self-harm, call 988 (U.S.) or local emergency services.";

struct Rule {
    keywords: &'static [&'static str],
    category: ReplyCategory,
}

/// Evaluated top to bottom; first hit wins.
const RULES: &[Rule] = &[
    Rule { keywords: OUT_OF_SCOPE_KEYWORDS, category: ReplyCategory::OutOfScope },
    Rule { keywords: SOLUTION_KEYWORDS, category: ReplyCategory::Solution },
];

fn contains_any(folded: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| folded.contains(k))
}

/// Tag a reply by scanning it against the keyword tables in priority order.
pub fn classify(reply: &str) -> ReplyCategory {
    let folded = reply.to_lowercase();
    RULES
        .iter()
        .find(|rule| contains_any(&folded, rule.keywords))
        .map(|rule| rule.category)
        .unwrap_or(ReplyCategory::Therapeutic)
}

/// Safety notice to show before answering, when the user's message
/// mentions self-harm.
pub fn crisis_notice(input: &str) -> Option<&'static str> {
    contains_any(&input.to_lowercase(), CRISIS_KEYWORDS).then_some(CRISIS_NOTICE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_reply_is_therapeutic() {
        assert_eq!(classify("That sounds really hard. How are you sleeping?"), ReplyCategory::Therapeutic);
        assert_eq!(classify(""), ReplyCategory::Therapeutic);
    }

    #[test]
    fn solution_keywords_match_case_insensitively() {
        assert_eq!(classify("TL;DR: rest first."), ReplyCategory::Solution);
        assert_eq!(classify("Here’s how to start:"), ReplyCategory::Solution);
        assert_eq!(classify("A short CHECKLIST"), ReplyCategory::Solution);
    }

    #[test]
    fn out_of_scope_wins_over_solution() {
        let reply = "I can't help with legal advice, but here are some steps to find a lawyer.";
        assert_eq!(classify(reply), ReplyCategory::OutOfScope);
    }

    #[test]
    fn curly_apostrophe_variant_matches() {
        assert_eq!(classify("Sorry, I can’t assist with that."), ReplyCategory::OutOfScope);
    }

    #[test]
    fn substring_matches_inside_longer_words() {
        // Known limitation kept on purpose: no word boundaries.
        assert_eq!(classify("Thanks for the explanation."), ReplyCategory::Solution);
        assert_eq!(classify("lawsuits are stressful"), ReplyCategory::OutOfScope);
    }

    #[test]
    fn keyword_tables_are_disjoint_and_folded() {
        for k in OUT_OF_SCOPE_KEYWORDS.iter().chain(SOLUTION_KEYWORDS).chain(CRISIS_KEYWORDS) {
            assert_eq!(*k, k.to_lowercase(), "keyword {k:?} must be lowercase");
        }
        for k in OUT_OF_SCOPE_KEYWORDS {
            assert!(!SOLUTION_KEYWORDS.contains(k));
        }
    }

    #[test]
    fn crisis_notice_only_for_crisis_language() {
        assert_eq!(crisis_notice("Sometimes I want to HURT MYSELF"), Some(CRISIS_NOTICE));
        assert_eq!(crisis_notice("work is overwhelming"), None);
    }

    #[test]
    fn tags_are_distinct() {
        let all = [ReplyCategory::OutOfScope, ReplyCategory::Solution, ReplyCategory::Therapeutic];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.tag(), b.tag());
            }
        }
        assert_eq!(ReplyCategory::Therapeutic.to_string(), "therapist");
    }
}
