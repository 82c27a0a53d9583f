//! In-memory ticket store for development and tests.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::TicketStore;
use crate::error::StorageError;
use crate::ticket::model::{ActiveIncidentRef, Ticket};

/// RwLock'd in-memory store. Concurrent readers share the active-incident
/// query; writes serialize on the lock, which is where the unique-id
/// constraint is enforced.
pub struct MemoryStore {
    tickets: RwLock<Vec<Ticket>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            tickets: RwLock::new(Vec::new()),
        })
    }

    /// Number of stored tickets.
    pub async fn len(&self) -> usize {
        self.tickets.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tickets.read().await.is_empty()
    }
}

#[async_trait]
impl TicketStore for MemoryStore {
    async fn insert(&self, ticket: Ticket) -> Result<Ticket, StorageError> {
        let mut tickets = self.tickets.write().await;
        if tickets.iter().any(|t| t.ticket_id == ticket.ticket_id) {
            return Err(StorageError::Constraint(format!(
                "duplicate ticket id {}",
                ticket.ticket_id
            )));
        }
        debug!(ticket_id = %ticket.ticket_id, "Ticket stored");
        tickets.push(ticket.clone());
        Ok(ticket)
    }

    async fn get(&self, ticket_id: &str) -> Result<Option<Ticket>, StorageError> {
        let tickets = self.tickets.read().await;
        Ok(tickets.iter().find(|t| t.ticket_id == ticket_id).cloned())
    }

    async fn active_primary_incidents(&self) -> Result<Vec<ActiveIncidentRef>, StorageError> {
        let tickets = self.tickets.read().await;
        Ok(tickets
            .iter()
            .filter(|t| t.is_open_primary())
            .map(Ticket::as_incident_ref)
            .collect())
    }
}
