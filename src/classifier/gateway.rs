//! Classifier gateway — deadline-bounded classification and the
//! optional department-review pass.
//!
//! The gateway owns prompt shaping and response decoding. Every failure
//! mode (deadline expiry, transport error, malformed response) collapses
//! into a single `ClassifierError` outcome — the caller always receives
//! a definite result-or-error within the deadline plus decode time, and
//! no failure escapes this boundary.

use std::sync::Arc;

use tokio::time::timeout;
use tracing::{debug, warn};

use crate::classifier::client::ClassifierClient;
use crate::classifier::types::{
    decode_classification, decode_review, DepartmentReview, RawClassification,
};
use crate::config::TriageConfig;
use crate::error::ClassifierError;
use crate::ticket::model::{ActiveIncidentRef, Department};

/// Gateway to the external classification provider.
pub struct ClassifierGateway {
    client: Arc<dyn ClassifierClient>,
    config: TriageConfig,
}

impl ClassifierGateway {
    pub fn new(client: Arc<dyn ClassifierClient>, config: TriageConfig) -> Self {
        Self { client, config }
    }

    /// Classify one message within the configured deadline.
    ///
    /// Returns the decoded classification together with the raw response
    /// text (kept on the ticket for audit). Deadline expiry is treated
    /// identically to any other failure; there is no retry.
    pub async fn classify(
        &self,
        text: &str,
        active_incidents: &[ActiveIncidentRef],
    ) -> Result<(RawClassification, String), ClassifierError> {
        let prompt = build_classification_prompt(text, active_incidents);
        debug!(
            model = self.client.model_name(),
            incidents = active_incidents.len(),
            "Requesting classification"
        );

        let raw = timeout(self.config.classify_deadline, self.client.complete(&prompt))
            .await
            .map_err(|_| ClassifierError::Timeout {
                deadline: self.config.classify_deadline,
            })??;

        let decoded = decode_classification(&raw)?;
        Ok((decoded, raw))
    }

    /// Secondary department-review pass.
    ///
    /// Best-effort by design: any failure (timeout, transport, decode)
    /// is logged and yields `None`, leaving the original routing
    /// untouched. Never escalates into a classifier failure.
    pub async fn review_department(
        &self,
        text: &str,
        department: Department,
    ) -> Option<DepartmentReview> {
        if !self.config.review_enabled {
            return None;
        }

        let prompt = build_review_prompt(text, department);
        let raw = match timeout(self.config.review_deadline, self.client.complete(&prompt)).await {
            Err(_) => {
                warn!(deadline = ?self.config.review_deadline, "Department review timed out — skipping");
                return None;
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Department review failed — skipping");
                return None;
            }
            Ok(Ok(raw)) => raw,
        };

        match decode_review(&raw) {
            Ok(review) => Some(review),
            Err(e) => {
                warn!(error = %e, "Undecodable department review — skipping");
                None
            }
        }
    }
}

// ── Prompt construction ─────────────────────────────────────────────

fn build_classification_prompt(text: &str, active_incidents: &[ActiveIncidentRef]) -> String {
    let mut prompt = String::with_capacity(2048);

    prompt.push_str(
        "You are a support-ticket triage engine. Analyze the issue below and \
         respond with ONLY a JSON object.\n\n",
    );

    prompt.push_str(
        "Classification rules:\n\
         Priority:\n\
         - Critical: full outage, many users blocked, data loss risk\n\
         - High: system down, business blocked, repeated failures, urgent keywords\n\
         - Medium: functional issue with a workaround\n\
         - Low: minor, cosmetic, informational requests\n\
         Department:\n\
         - Network: internet, WiFi, VPN, slow network, connectivity\n\
         - Hardware: laptop, desktop, printer, physical device issues\n\
         - Software: applications, OS, website, email client, bugs\n\
         - Access: login, password, permissions, account lock\n\
         Sentiment:\n\
         - Calm: neutral wording, no urgency\n\
         - Frustrated: repeated issues, delays, mild urgency\n\
         - Angry: strong language, escalation, threats, caps\n\n",
    );

    prompt.push_str(
        "Guardrails:\n\
         - If the message has no support intent or is random text, set \
           is_spam true with spam_reason \"no_intent\" or \"random_text\".\n\
         - If essential details are missing, set is_complete false and ask \
           ONE clarification_question.\n\
         - If the issue matches an active incident below, set is_duplicate \
           true, parent_incident_id to that incident's id, similarity_score \
           (0-100), and a short swarm_reason. Only use ids from the list.\n\n",
    );

    if active_incidents.is_empty() {
        prompt.push_str("Active incidents: none\n\n");
    } else {
        prompt.push_str("Active incidents:\n");
        for incident in active_incidents {
            prompt.push_str(&format!(
                "- {} [{}]: {}\n",
                incident.incident_id, incident.status, incident.summary
            ));
        }
        prompt.push('\n');
    }

    prompt.push_str(
        "JSON format:\n\
         {\"summary\": \"1-sentence summary\", \"category\": \"generic category\", \
         \"priority\": \"Low | Medium | High | Critical | None\", \
         \"department\": \"Network | Hardware | Software | Access\", \
         \"sentiment\": \"Calm | Frustrated | Angry\", \
         \"is_spam\": false, \"spam_reason\": null, \
         \"is_duplicate\": false, \"parent_incident_id\": null, \
         \"similarity_score\": 0, \"swarm_reason\": null, \
         \"is_complete\": true, \"clarification_question\": null, \
         \"handoff_summary\": \"context for the human agent\", \
         \"ai_attempts\": \"what was already suggested\", \
         \"next_best_action\": \"recommended first step\"}\n\n",
    );

    prompt.push_str(&format!("Issue: {}\n", text));
    prompt
}

fn build_review_prompt(text: &str, department: Department) -> String {
    format!(
        "You are a department validation engine.\n\n\
         Issue: {text}\n\
         Assigned department: {department:?}\n\n\
         Validate the routing with keyword rules:\n\
         - Network: internet, WiFi, VPN, connectivity\n\
         - Hardware: laptop, physical devices\n\
         - Software: apps, website, OS bugs\n\
         - Access: login, password, permissions\n\
         High-confidence mismatch -> reroute. Low-confidence mismatch -> \
         flag_for_human. Otherwise -> keep.\n\n\
         Respond with ONLY a JSON object:\n\
         {{\"action\": \"reroute | keep | flag_for_human\", \
         \"correct_department\": \"Network | Hardware | Software | Access\", \
         \"confidence\": 0.0}}\n"
    )
}
