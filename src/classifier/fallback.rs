//! Deterministic fallback classifier.
//!
//! Runs whenever the gateway fails — timeout, transport, or decode.
//! Total: every input, including the empty string, yields a
//! structurally complete classification. The output still flows through
//! the same resolver enforcement as gateway output.

use regex::Regex;
use tracing::debug;

use crate::classifier::types::RawClassification;
use crate::ticket::model::{Department, Priority, Sentiment};

/// Spam-reason tag: message carries no support intent.
pub const SPAM_NO_INTENT: &str = "no_intent";
/// Spam-reason tag: keyboard-mash / symbol noise.
pub const SPAM_RANDOM_TEXT: &str = "random_text";

/// Rule-based classifier used when the AI classifier is unavailable.
pub struct FallbackClassifier {
    punctuation_burst: Regex,
}

impl FallbackClassifier {
    pub fn new() -> Self {
        Self {
            // Symbol noise typical of keyboard mashing; deliberately
            // excludes sentence punctuation.
            punctuation_burst: Regex::new(r"[!@#$%^&*()_+=\[\]{}<>~`|\\]").unwrap(),
        }
    }

    /// Classify a message with local heuristics. Never fails.
    pub fn classify(&self, text: &str) -> RawClassification {
        let trimmed = text.trim();

        if trimmed.chars().count() < 3 || trimmed.eq_ignore_ascii_case("hi") {
            debug!("Fallback: too short or bare greeting — spam");
            return self.spam(trimmed, SPAM_NO_INTENT);
        }

        let is_burst = self.punctuation_burst.is_match(trimmed)
            && trimmed.chars().count() > 10
            && !trimmed.contains(char::is_whitespace);
        if is_burst {
            debug!("Fallback: punctuation burst without whitespace — spam");
            return self.spam(trimmed, SPAM_RANDOM_TEXT);
        }

        // Generic placeholder — a human reviews it from the Software
        // queue at medium priority.
        RawClassification {
            summary: review_summary(trimmed),
            category: "Other".into(),
            priority: Priority::Medium,
            department: Some(Department::Software),
            sentiment: Some(Sentiment::Calm),
            is_spam: false,
            spam_reason: None,
            is_duplicate: false,
            parent_incident_id: None,
            similarity_score: 0,
            swarm_reason: None,
            is_complete: true,
            clarification_question: None,
            handoff_summary: None,
            ai_attempts: None,
            next_best_action: None,
        }
    }

    fn spam(&self, text: &str, reason: &str) -> RawClassification {
        RawClassification {
            summary: if text.is_empty() {
                "Empty message".into()
            } else {
                review_summary(text)
            },
            category: "Spam".into(),
            priority: Priority::None,
            department: None,
            sentiment: None,
            is_spam: true,
            spam_reason: Some(reason.into()),
            is_duplicate: false,
            parent_incident_id: None,
            similarity_score: 0,
            swarm_reason: None,
            is_complete: true,
            clarification_question: None,
            handoff_summary: None,
            ai_attempts: None,
            next_best_action: None,
        }
    }
}

impl Default for FallbackClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// "Review Required" summary with a bounded prefix of the message.
fn review_summary(text: &str) -> String {
    let prefix: String = text.chars().take(50).collect();
    if text.chars().count() > 50 {
        format!("Review Required: {prefix}...")
    } else {
        format!("Review Required: {prefix}")
    }
}
