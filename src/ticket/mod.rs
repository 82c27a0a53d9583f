//! Ticket domain model and lifecycle derivation.

pub mod lifecycle;
pub mod model;

pub use lifecycle::derive_status;
pub use model::*;
