//! Ticket data model — inbound messages, classification results, and the
//! persisted ticket record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Inbound message ─────────────────────────────────────────────────

/// Where an inbound message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketSource {
    Chat,
    Email,
    Web,
}

impl std::fmt::Display for TicketSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Chat => write!(f, "Chat"),
            Self::Email => write!(f, "Email"),
            Self::Web => write!(f, "Web"),
        }
    }
}

impl std::str::FromStr for TicketSource {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Chat" => Ok(Self::Chat),
            "Email" => Ok(Self::Email),
            "Web" => Ok(Self::Web),
            _ => Err(format!("Unknown source: {}", s)),
        }
    }
}

/// A single unstructured support message, as handed over by the
/// transport layer.
///
/// The transport validates that `sender` and `text` are non-empty before
/// the pipeline ever sees the message. Never mutated; discarded after
/// triage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Intake channel.
    pub source: TicketSource,
    /// Sender identifier (email address, chat handle, display name).
    pub sender: String,
    /// Raw message body.
    pub text: String,
}

// ── Classification enums ────────────────────────────────────────────

/// Ticket priority. `None` is only valid on spam tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
    None,
}

/// Department a ticket is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Department {
    Network,
    Hardware,
    Software,
    Access,
}

/// User sentiment as judged by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    Calm,
    Frustrated,
    Angry,
}

/// Role of a ticket within a duplicate cluster (swarm).
///
/// Exactly one open ticket per cluster is `Primary`; later reports of
/// the same incident become `Follower`s linked via `parent_incident_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketRole {
    Primary,
    Follower,
}

/// Canonical ticket lifecycle status.
///
/// Triage only ever assigns `Cancelled`, `Waiting`, or `Processing`.
/// `UnderReview` and `Resolved` are reached by later human actions;
/// `Received` is the pre-triage placeholder in stored snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketStatus {
    Received,
    Waiting,
    Processing,
    #[serde(rename = "Under Review")]
    UnderReview,
    Resolved,
    Cancelled,
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Received => write!(f, "Received"),
            Self::Waiting => write!(f, "Waiting"),
            Self::Processing => write!(f, "Processing"),
            Self::UnderReview => write!(f, "Under Review"),
            Self::Resolved => write!(f, "Resolved"),
            Self::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Received" => Ok(Self::Received),
            "Waiting" => Ok(Self::Waiting),
            "Processing" => Ok(Self::Processing),
            "Under Review" => Ok(Self::UnderReview),
            "Resolved" => Ok(Self::Resolved),
            "Cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Unknown status: {}", s)),
        }
    }
}

// ── Active incidents ────────────────────────────────────────────────

/// Read-only snapshot of an open primary incident, supplied to the
/// classifier as duplicate-matching context. Lifetime = one triage call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveIncidentRef {
    pub incident_id: String,
    pub summary: String,
    pub status: TicketStatus,
}

// ── Resolved classification ─────────────────────────────────────────

/// The resolved output of triage.
///
/// Produced by the triage resolver from raw classifier output (or
/// fallback output) plus enforcement rules. Spam tickets never carry a
/// department or sentiment; duplicate tickets always carry a verified
/// `parent_incident_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// One-sentence issue summary. Always non-empty.
    pub summary: String,
    /// Generic issue category. Always non-empty.
    pub category: String,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<Department>,
    /// Routing confidence, 0–100. 100 when no revalidation ran.
    pub department_confidence: u8,
    /// Department was overwritten by the review pass.
    pub ai_rerouted: bool,
    /// Department kept, but queued for manual routing review.
    pub flagged_for_review: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
    pub is_spam: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spam_reason: Option<String>,
    pub is_duplicate: bool,
    /// Set iff `is_duplicate`; references an incident from the active
    /// set supplied in the same triage call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_incident_id: Option<String>,
    /// Classifier's similarity judgment for the duplicate link, 0–100.
    pub similarity_score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swarm_reason: Option<String>,
    pub ticket_role: TicketRole,
    pub is_complete: bool,
    /// Set iff `is_complete = false`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clarification_question: Option<String>,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handoff_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_attempts: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_best_action: Option<String>,
}

// ── Ticket ──────────────────────────────────────────────────────────

/// Generate a globally unique, human-readable ticket id.
pub fn new_ticket_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("TICK-{}", hex[..8].to_uppercase())
}

/// A persisted, triaged ticket record.
///
/// Created once per inbound message; the triage core never mutates a
/// ticket after creation. Later status changes are human/admin actions
/// outside this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    /// Human-readable id, e.g. `TICK-9F3A01BC`. Unique across the store.
    pub ticket_id: String,
    pub source: TicketSource,
    pub sender: String,
    pub original_message: String,
    #[serde(flatten)]
    pub classification: Classification,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    /// Undecoded classifier response, kept for audit/guardrail display.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_raw_output: Option<String>,
    /// Why the fallback classifier ran, when it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classifier_error: Option<String>,
}

impl Ticket {
    /// Assemble a new ticket with a freshly generated id.
    pub fn new(
        message: &InboundMessage,
        classification: Classification,
        status: TicketStatus,
    ) -> Self {
        Self {
            ticket_id: new_ticket_id(),
            source: message.source,
            sender: message.sender.clone(),
            original_message: message.text.clone(),
            classification,
            status,
            created_at: Utc::now(),
            ai_raw_output: None,
            classifier_error: None,
        }
    }

    /// Attach the raw classifier response.
    pub fn with_raw_output(mut self, raw: impl Into<String>) -> Self {
        self.ai_raw_output = Some(raw.into());
        self
    }

    /// Record why the fallback classifier ran.
    pub fn with_classifier_error(mut self, reason: impl Into<String>) -> Self {
        self.classifier_error = Some(reason.into());
        self
    }

    /// Whether this ticket is an open primary incident, i.e. visible to
    /// the classifier as duplicate-matching context.
    pub fn is_open_primary(&self) -> bool {
        !self.classification.is_spam
            && self.classification.ticket_role == TicketRole::Primary
            && matches!(
                self.status,
                TicketStatus::Received | TicketStatus::Processing | TicketStatus::UnderReview
            )
    }

    /// Snapshot for the active-incident context.
    pub fn as_incident_ref(&self) -> ActiveIncidentRef {
        ActiveIncidentRef {
            incident_id: self.ticket_id.clone(),
            summary: self.classification.summary.clone(),
            status: self.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placeholder_classification() -> Classification {
        Classification {
            summary: "VPN outage reported".into(),
            category: "Connectivity".into(),
            priority: Priority::High,
            department: Some(Department::Network),
            department_confidence: 100,
            ai_rerouted: false,
            flagged_for_review: false,
            sentiment: Some(Sentiment::Frustrated),
            is_spam: false,
            spam_reason: None,
            is_duplicate: false,
            parent_incident_id: None,
            similarity_score: 0,
            swarm_reason: None,
            ticket_role: TicketRole::Primary,
            is_complete: true,
            clarification_question: None,
            is_active: true,
            handoff_summary: None,
            ai_attempts: None,
            next_best_action: None,
        }
    }

    fn make_message() -> InboundMessage {
        InboundMessage {
            source: TicketSource::Web,
            sender: "alice@example.com".into(),
            text: "VPN down, can't connect to office network".into(),
        }
    }

    #[test]
    fn ticket_id_format() {
        let id = new_ticket_id();
        assert!(id.starts_with("TICK-"));
        assert_eq!(id.len(), 13);
        assert!(id[5..].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn ticket_ids_are_unique() {
        let a = new_ticket_id();
        let b = new_ticket_id();
        assert_ne!(a, b);
    }

    #[test]
    fn new_ticket_copies_message_fields() {
        let ticket = Ticket::new(&make_message(), placeholder_classification(), TicketStatus::Processing);
        assert_eq!(ticket.source, TicketSource::Web);
        assert_eq!(ticket.sender, "alice@example.com");
        assert!(ticket.original_message.contains("VPN down"));
        assert!(ticket.ai_raw_output.is_none());
        assert!(ticket.classifier_error.is_none());
    }

    #[test]
    fn ticket_builders_attach_audit_fields() {
        let ticket = Ticket::new(&make_message(), placeholder_classification(), TicketStatus::Processing)
            .with_raw_output(r#"{"summary": "x"}"#)
            .with_classifier_error("Classifier call timed out after 15s");
        assert_eq!(ticket.ai_raw_output.as_deref(), Some(r#"{"summary": "x"}"#));
        assert!(ticket.classifier_error.as_deref().unwrap().contains("timed out"));
    }

    #[test]
    fn open_primary_detection() {
        let mut ticket =
            Ticket::new(&make_message(), placeholder_classification(), TicketStatus::Processing);
        assert!(ticket.is_open_primary());

        ticket.status = TicketStatus::Resolved;
        assert!(!ticket.is_open_primary());

        ticket.status = TicketStatus::Processing;
        ticket.classification.ticket_role = TicketRole::Follower;
        assert!(!ticket.is_open_primary());
    }

    #[test]
    fn spam_ticket_is_never_open_primary() {
        let mut classification = placeholder_classification();
        classification.is_spam = true;
        let ticket = Ticket::new(&make_message(), classification, TicketStatus::Cancelled);
        assert!(!ticket.is_open_primary());
    }

    #[test]
    fn incident_ref_snapshot() {
        let ticket =
            Ticket::new(&make_message(), placeholder_classification(), TicketStatus::Processing);
        let incident = ticket.as_incident_ref();
        assert_eq!(incident.incident_id, ticket.ticket_id);
        assert_eq!(incident.summary, "VPN outage reported");
        assert_eq!(incident.status, TicketStatus::Processing);
    }

    // ── Serde shape ─────────────────────────────────────────────────

    #[test]
    fn status_serializes_with_display_names() {
        let json = serde_json::to_string(&TicketStatus::UnderReview).unwrap();
        assert_eq!(json, "\"Under Review\"");
        let parsed: TicketStatus = serde_json::from_str("\"Under Review\"").unwrap();
        assert_eq!(parsed, TicketStatus::UnderReview);
    }

    #[test]
    fn status_display_and_fromstr() {
        assert_eq!(TicketStatus::Waiting.to_string(), "Waiting");
        assert_eq!("Under Review".parse::<TicketStatus>().unwrap(), TicketStatus::UnderReview);
        assert!("Closed".parse::<TicketStatus>().is_err());
    }

    #[test]
    fn source_display_and_fromstr() {
        assert_eq!(TicketSource::Chat.to_string(), "Chat");
        assert_eq!("Web".parse::<TicketSource>().unwrap(), TicketSource::Web);
        assert!("Fax".parse::<TicketSource>().is_err());
    }

    #[test]
    fn classification_omits_absent_optionals() {
        let classification = placeholder_classification();
        let json = serde_json::to_string(&classification).unwrap();
        assert!(!json.contains("spam_reason"));
        assert!(!json.contains("parent_incident_id"));
        assert!(!json.contains("clarification_question"));
        assert!(json.contains("\"priority\":\"High\""));
        assert!(json.contains("\"department\":\"Network\""));
    }

    #[test]
    fn ticket_flattens_classification() {
        let ticket =
            Ticket::new(&make_message(), placeholder_classification(), TicketStatus::Processing);
        let json = serde_json::to_value(&ticket).unwrap();
        // Classification fields sit at the top level of the record.
        assert_eq!(json["summary"], "VPN outage reported");
        assert_eq!(json["is_spam"], false);
        assert_eq!(json["status"], "Processing");
        assert_eq!(json["ticket_role"], "Primary");
    }

    #[test]
    fn ticket_serde_roundtrip() {
        let ticket =
            Ticket::new(&make_message(), placeholder_classification(), TicketStatus::Processing);
        let json = serde_json::to_string(&ticket).unwrap();
        let parsed: Ticket = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.ticket_id, ticket.ticket_id);
        assert_eq!(parsed.classification, ticket.classification);
        assert_eq!(parsed.status, TicketStatus::Processing);
    }
}
