//! Change notification — event payload, collaborator trait, and the
//! in-process broadcast implementation backing the WebSocket feed.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use crate::error::NotifyError;
use crate::ticket::model::{Priority, Ticket, TicketStatus};

/// Default broadcast channel capacity.
const DEFAULT_BROADCAST_CAPACITY: usize = 256;

/// Change event emitted after a ticket is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketEvent {
    /// Event kind — currently always `ticket_updated`.
    pub event: String,
    pub ticket_id: String,
    pub status: TicketStatus,
    pub is_spam: bool,
    pub is_active: bool,
    pub priority: Priority,
    pub summary: String,
}

impl TicketEvent {
    /// Build the `ticket_updated` event for a stored ticket.
    pub fn ticket_updated(ticket: &Ticket) -> Self {
        Self {
            event: "ticket_updated".into(),
            ticket_id: ticket.ticket_id.clone(),
            status: ticket.status,
            is_spam: ticket.classification.is_spam,
            is_active: ticket.classification.is_active,
            priority: ticket.classification.priority,
            summary: ticket.classification.summary.clone(),
        }
    }
}

/// Fire-and-forget change notification. Delivery is best-effort; the
/// pipeline logs failures and never waits for acknowledgment.
#[async_trait]
pub trait ChangeNotifier: Send + Sync {
    async fn publish(&self, event: TicketEvent) -> Result<(), NotifyError>;
}

/// In-process notifier backed by a tokio broadcast channel. WebSocket
/// clients subscribe for real-time fan-out.
pub struct BroadcastNotifier {
    tx: broadcast::Sender<TicketEvent>,
}

impl BroadcastNotifier {
    pub fn new() -> Arc<Self> {
        let (tx, _rx) = broadcast::channel(DEFAULT_BROADCAST_CAPACITY);
        Arc::new(Self { tx })
    }

    /// Subscribe to ticket events. Each WebSocket client calls this.
    pub fn subscribe(&self) -> broadcast::Receiver<TicketEvent> {
        self.tx.subscribe()
    }
}

#[async_trait]
impl ChangeNotifier for BroadcastNotifier {
    async fn publish(&self, event: TicketEvent) -> Result<(), NotifyError> {
        debug!(ticket_id = %event.ticket_id, status = %event.status, "Publishing ticket event");
        // Ok if no receivers are listening yet.
        let _ = self.tx.send(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ticket::model::{
        Classification, InboundMessage, TicketRole, TicketSource,
    };

    fn spam_ticket() -> Ticket {
        let message = InboundMessage {
            source: TicketSource::Chat,
            sender: "bot@spam.example".into(),
            text: "hi".into(),
        };
        let classification = Classification {
            summary: "Spam message".into(),
            category: "Spam".into(),
            priority: Priority::None,
            department: None,
            department_confidence: 100,
            ai_rerouted: false,
            flagged_for_review: false,
            sentiment: None,
            is_spam: true,
            spam_reason: Some("no_intent".into()),
            is_duplicate: false,
            parent_incident_id: None,
            similarity_score: 0,
            swarm_reason: None,
            ticket_role: TicketRole::Primary,
            is_complete: true,
            clarification_question: None,
            is_active: false,
            handoff_summary: None,
            ai_attempts: None,
            next_best_action: None,
        };
        Ticket::new(&message, classification, TicketStatus::Cancelled)
    }

    #[test]
    fn event_carries_the_wire_payload() {
        let ticket = spam_ticket();
        let event = TicketEvent::ticket_updated(&ticket);
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event"], "ticket_updated");
        assert_eq!(json["ticket_id"], ticket.ticket_id);
        assert_eq!(json["status"], "Cancelled");
        assert_eq!(json["is_spam"], true);
        assert_eq!(json["is_active"], false);
        assert_eq!(json["priority"], "None");
        assert_eq!(json["summary"], "Spam message");
    }

    #[tokio::test]
    async fn publish_without_subscribers_succeeds() {
        let notifier = BroadcastNotifier::new();
        let event = TicketEvent::ticket_updated(&spam_ticket());
        assert!(notifier.publish(event).await.is_ok());
    }

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let notifier = BroadcastNotifier::new();
        let mut rx = notifier.subscribe();

        let event = TicketEvent::ticket_updated(&spam_ticket());
        notifier.publish(event.clone()).await.unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.ticket_id, event.ticket_id);
        assert_eq!(received.status, TicketStatus::Cancelled);
    }
}
