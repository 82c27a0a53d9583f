//! Triage processor — orchestrates one inbound message through the full
//! pipeline.
//!
//! Flow: active-incident lookup → classifier gateway (fallback on any
//! failure) → resolver → lifecycle derivation → persistence →
//! change notification.
//!
//! A triage request either yields a created ticket with a best-effort
//! classification, or a definite storage failure. Classifier and
//! notification failures never surface to the caller.

use std::sync::Arc;

use tracing::{info, warn};

use crate::classifier::fallback::FallbackClassifier;
use crate::classifier::gateway::ClassifierGateway;
use crate::error::StorageError;
use crate::notify::{ChangeNotifier, TicketEvent};
use crate::store::TicketStore;
use crate::ticket::lifecycle::derive_status;
use crate::ticket::model::{InboundMessage, Ticket};
use crate::triage::resolver::resolve;

/// The pipeline orchestrator. One instance serves all inbound messages;
/// each call is an independent task with no shared mutable state.
pub struct TriageProcessor {
    gateway: ClassifierGateway,
    fallback: FallbackClassifier,
    store: Arc<dyn TicketStore>,
    notifier: Arc<dyn ChangeNotifier>,
}

impl TriageProcessor {
    pub fn new(
        gateway: ClassifierGateway,
        store: Arc<dyn TicketStore>,
        notifier: Arc<dyn ChangeNotifier>,
    ) -> Self {
        Self {
            gateway,
            fallback: FallbackClassifier::new(),
            store,
            notifier,
        }
    }

    /// Storage handle, for transport-level read-back routes.
    pub fn store(&self) -> &Arc<dyn TicketStore> {
        &self.store
    }

    /// Triage one inbound message into a persisted ticket.
    ///
    /// Only a storage failure is an error; every classifier problem
    /// degrades to the fallback path and still produces a ticket.
    /// Dropping the returned future before the gateway resolves abandons
    /// the in-flight call — nothing is persisted for an aborted request.
    pub async fn process(&self, message: InboundMessage) -> Result<Ticket, StorageError> {
        info!(
            source = %message.source,
            sender = %message.sender,
            "Triaging inbound message"
        );

        // Read-only duplicate-matching context. A read failure degrades
        // to an empty set — duplicate claims then drop in enforcement.
        let active_incidents = match self.store.active_primary_incidents().await {
            Ok(incidents) => incidents,
            Err(e) => {
                warn!(error = %e, "Active-incident lookup failed — continuing without context");
                Vec::new()
            }
        };

        let (raw, raw_response, classifier_error) =
            match self.gateway.classify(&message.text, &active_incidents).await {
                Ok((raw, response)) => (raw, Some(response), None),
                Err(e) => {
                    warn!(error = %e, "Classifier unavailable — using fallback");
                    (self.fallback.classify(&message.text), None, Some(e.to_string()))
                }
            };

        // Secondary routing review, only after a successful primary
        // classification of a non-spam message with a department.
        let review = match (&classifier_error, raw.is_spam, raw.department) {
            (None, false, Some(department)) => {
                self.gateway.review_department(&message.text, department).await
            }
            _ => None,
        };

        let classification = resolve(raw, &active_incidents, review);
        let status = derive_status(&classification);

        let mut ticket = Ticket::new(&message, classification, status);
        if let Some(response) = raw_response {
            ticket = ticket.with_raw_output(response);
        }
        if let Some(reason) = classifier_error {
            ticket = ticket.with_classifier_error(reason);
        }

        let ticket = self.store.insert(ticket).await?;

        let event = TicketEvent::ticket_updated(&ticket);
        if let Err(e) = self.notifier.publish(event).await {
            warn!(ticket_id = %ticket.ticket_id, error = %e, "Change notification failed");
        }

        info!(
            ticket_id = %ticket.ticket_id,
            status = %ticket.status,
            spam = ticket.classification.is_spam,
            duplicate = ticket.classification.is_duplicate,
            "Ticket created"
        );
        Ok(ticket)
    }
}
