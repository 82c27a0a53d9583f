//! Ticket storage — the collaborator interface and an in-memory
//! reference implementation.

pub mod memory;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::ticket::model::{ActiveIncidentRef, Ticket};

pub use memory::MemoryStore;

/// Backend-agnostic ticket storage.
///
/// Implementations must guarantee ticket-id uniqueness on insert and
/// must be safe for concurrent readers of the active-incident query.
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Persist a freshly triaged ticket. Fails with
    /// [`StorageError::Constraint`] on a duplicate ticket id.
    async fn insert(&self, ticket: Ticket) -> Result<Ticket, StorageError>;

    /// Look up a ticket by its human-readable id.
    async fn get(&self, ticket_id: &str) -> Result<Option<Ticket>, StorageError>;

    /// Snapshot of open primary incidents, supplied to the classifier
    /// as duplicate-matching context.
    async fn active_primary_incidents(&self) -> Result<Vec<ActiveIncidentRef>, StorageError>;
}
