//! Lifecycle derivation — maps a resolved classification to the
//! canonical entry status.
//!
//! Total and pure: every classification maps to exactly one status, and
//! the same classification always maps to the same status. Triage only
//! ever assigns `Cancelled`, `Waiting`, or `Processing`; the remaining
//! states are reached by later human actions.

use crate::ticket::model::{Classification, TicketStatus};

/// Derive the entry status for a freshly resolved classification.
///
/// Rule, in priority order:
/// - spam → `Cancelled`
/// - incomplete → `Waiting` (held until the user answers the
///   clarification question)
/// - otherwise → `Processing`
pub fn derive_status(classification: &Classification) -> TicketStatus {
    if classification.is_spam {
        TicketStatus::Cancelled
    } else if !classification.is_complete {
        TicketStatus::Waiting
    } else {
        TicketStatus::Processing
    }
}
