//! Typed classifier payloads and fail-closed decoding.
//!
//! The provider returns a free-form JSON document (possibly wrapped in
//! markdown). Decoding is strict where it matters: a response missing
//! `summary`, `category`, or `priority`, or carrying an unknown enum
//! value, is a classifier failure — the pipeline then falls back rather
//! than guessing.

use serde::Deserialize;

use crate::error::ClassifierError;
use crate::ticket::model::{Department, Priority, Sentiment};

fn default_true() -> bool {
    true
}

/// The classifier's proposed analysis of one message, as decoded off
/// the wire. Everything here is a *claim* — the triage resolver decides
/// what survives enforcement.
#[derive(Debug, Clone, Deserialize)]
pub struct RawClassification {
    pub summary: String,
    pub category: String,
    pub priority: Priority,
    #[serde(default)]
    pub department: Option<Department>,
    #[serde(default)]
    pub sentiment: Option<Sentiment>,
    #[serde(default)]
    pub is_spam: bool,
    /// Older provider revisions emitted this under `reason`.
    #[serde(default, alias = "reason")]
    pub spam_reason: Option<String>,
    #[serde(default)]
    pub is_duplicate: bool,
    #[serde(default)]
    pub parent_incident_id: Option<String>,
    #[serde(default)]
    pub similarity_score: u8,
    #[serde(default)]
    pub swarm_reason: Option<String>,
    #[serde(default = "default_true")]
    pub is_complete: bool,
    #[serde(default)]
    pub clarification_question: Option<String>,
    #[serde(default)]
    pub handoff_summary: Option<String>,
    #[serde(default)]
    pub ai_attempts: Option<String>,
    #[serde(default)]
    pub next_best_action: Option<String>,
}

/// Outcome of the secondary department-review pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteDecision {
    /// High-confidence mismatch — overwrite the department.
    Reroute,
    /// Routing confirmed.
    Keep,
    /// Low-confidence mismatch — keep the department, ask a human.
    FlagForHuman,
}

/// Decoded department-review response.
#[derive(Debug, Clone, Deserialize)]
pub struct DepartmentReview {
    pub action: RouteDecision,
    #[serde(default)]
    pub correct_department: Option<Department>,
    /// Provider-side confidence, 0.0–1.0.
    #[serde(default = "full_confidence")]
    pub confidence: f32,
}

fn full_confidence() -> f32 {
    1.0
}

impl DepartmentReview {
    /// Confidence as an integer percentage, clamped to 0–100.
    pub fn confidence_pct(&self) -> u8 {
        (self.confidence.clamp(0.0, 1.0) * 100.0).round() as u8
    }
}

/// Decode a classification response, failing closed.
pub fn decode_classification(raw: &str) -> Result<RawClassification, ClassifierError> {
    let json = extract_json_object(raw);
    let decoded: RawClassification =
        serde_json::from_str(&json).map_err(|e| ClassifierError::Decode {
            reason: e.to_string(),
        })?;

    if decoded.summary.trim().is_empty() || decoded.category.trim().is_empty() {
        return Err(ClassifierError::Decode {
            reason: "empty summary or category".into(),
        });
    }

    Ok(decoded)
}

/// Decode a department-review response.
pub fn decode_review(raw: &str) -> Result<DepartmentReview, ClassifierError> {
    let json = extract_json_object(raw);
    serde_json::from_str(&json).map_err(|e| ClassifierError::Decode {
        reason: e.to_string(),
    })
}

/// Pull a JSON object out of provider output, tolerating markdown fences
/// and surrounding prose.
fn extract_json_object(text: &str) -> String {
    let trimmed = text.trim();

    if trimmed.starts_with('{') {
        return trimmed.to_string();
    }

    if let Some(start) = trimmed.find("```") {
        let after = trimmed[start + 3..].trim_start_matches("json");
        if let Some(end) = after.find("```") {
            let inner = after[..end].trim();
            if inner.starts_with('{') {
                return inner.to_string();
            }
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}'))
        && end > start
    {
        return trimmed[start..=end].to_string();
    }

    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_RESPONSE: &str = r#"{
        "summary": "User cannot reach the VPN",
        "category": "Connectivity",
        "priority": "High",
        "department": "Network",
        "sentiment": "Frustrated",
        "is_spam": false,
        "is_duplicate": true,
        "parent_incident_id": "TICK-AAAA0001",
        "similarity_score": 87,
        "swarm_reason": "Same VPN outage as TICK-AAAA0001",
        "is_complete": true,
        "handoff_summary": "Third VPN report this morning",
        "ai_attempts": "Suggested restarting the client",
        "next_best_action": "Link to the outage incident"
    }"#;

    #[test]
    fn decodes_full_response() {
        let raw = decode_classification(FULL_RESPONSE).unwrap();
        assert_eq!(raw.priority, Priority::High);
        assert_eq!(raw.department, Some(Department::Network));
        assert_eq!(raw.sentiment, Some(Sentiment::Frustrated));
        assert!(raw.is_duplicate);
        assert_eq!(raw.parent_incident_id.as_deref(), Some("TICK-AAAA0001"));
        assert_eq!(raw.similarity_score, 87);
        assert!(raw.is_complete);
    }

    #[test]
    fn decodes_minimal_response_with_defaults() {
        let raw = decode_classification(
            r#"{"summary": "Printer broken", "category": "Hardware", "priority": "Low"}"#,
        )
        .unwrap();
        assert!(!raw.is_spam);
        assert!(!raw.is_duplicate);
        assert!(raw.is_complete);
        assert!(raw.department.is_none());
        assert!(raw.clarification_question.is_none());
    }

    #[test]
    fn missing_summary_fails_closed() {
        let result =
            decode_classification(r#"{"category": "Hardware", "priority": "Low"}"#);
        assert!(matches!(result, Err(ClassifierError::Decode { .. })));
    }

    #[test]
    fn missing_priority_fails_closed() {
        let result = decode_classification(r#"{"summary": "x", "category": "y"}"#);
        assert!(matches!(result, Err(ClassifierError::Decode { .. })));
    }

    #[test]
    fn unknown_priority_fails_closed() {
        let result = decode_classification(
            r#"{"summary": "x", "category": "y", "priority": "Urgent"}"#,
        );
        assert!(matches!(result, Err(ClassifierError::Decode { .. })));
    }

    #[test]
    fn blank_summary_fails_closed() {
        let result = decode_classification(
            r#"{"summary": "  ", "category": "y", "priority": "Low"}"#,
        );
        assert!(matches!(result, Err(ClassifierError::Decode { .. })));
    }

    #[test]
    fn spam_priority_none_decodes() {
        let raw = decode_classification(
            r#"{"summary": "Gibberish", "category": "Spam", "priority": "None", "is_spam": true, "reason": "random_text"}"#,
        )
        .unwrap();
        assert!(raw.is_spam);
        assert_eq!(raw.priority, Priority::None);
        // Older `reason` field aliases onto spam_reason.
        assert_eq!(raw.spam_reason.as_deref(), Some("random_text"));
    }

    #[test]
    fn markdown_wrapped_response_decodes() {
        let wrapped = format!("Here is my analysis:\n```json\n{}\n```", FULL_RESPONSE);
        let raw = decode_classification(&wrapped).unwrap();
        assert_eq!(raw.summary, "User cannot reach the VPN");
    }

    #[test]
    fn response_embedded_in_prose_decodes() {
        let raw = decode_classification(
            r#"Sure! {"summary": "x", "category": "y", "priority": "Medium"} Hope that helps."#,
        )
        .unwrap();
        assert_eq!(raw.priority, Priority::Medium);
    }

    #[test]
    fn non_json_fails_closed() {
        assert!(decode_classification("I could not classify this message.").is_err());
    }

    // ── Department review ───────────────────────────────────────────

    #[test]
    fn decodes_reroute_review() {
        let review = decode_review(
            r#"{"is_misrouted": true, "correct_department": "Access", "confidence": 0.92, "action": "reroute"}"#,
        )
        .unwrap();
        assert_eq!(review.action, RouteDecision::Reroute);
        assert_eq!(review.correct_department, Some(Department::Access));
        assert_eq!(review.confidence_pct(), 92);
    }

    #[test]
    fn decodes_flag_review() {
        let review =
            decode_review(r#"{"action": "flag_for_human", "confidence": 0.4}"#).unwrap();
        assert_eq!(review.action, RouteDecision::FlagForHuman);
        assert_eq!(review.confidence_pct(), 40);
    }

    #[test]
    fn review_confidence_defaults_to_full() {
        let review = decode_review(r#"{"action": "keep"}"#).unwrap();
        assert_eq!(review.confidence_pct(), 100);
    }

    #[test]
    fn review_confidence_clamped() {
        let review = decode_review(r#"{"action": "keep", "confidence": 3.5}"#).unwrap();
        assert_eq!(review.confidence_pct(), 100);
    }

    #[test]
    fn unknown_review_action_fails() {
        assert!(decode_review(r#"{"action": "escalate"}"#).is_err());
    }
}
