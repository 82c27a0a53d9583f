//! Error types for the triage service.

use std::time::Duration;

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Classification provider errors.
///
/// Timeout, transport, and decode failures all collapse into one error
/// class — the pipeline treats them identically and substitutes the
/// fallback classifier.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("Classifier call timed out after {deadline:?}")]
    Timeout { deadline: Duration },

    #[error("Classifier request failed: {reason}")]
    Transport { reason: String },

    #[error("Failed to decode classifier response: {reason}")]
    Decode { reason: String },

    #[error("Invalid response from classifier: {reason}")]
    InvalidResponse { reason: String },
}

/// Ticket storage errors. These surface to the caller — a storage
/// failure means no ticket was created.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Ticket not found: {ticket_id}")]
    NotFound { ticket_id: String },

    #[error("Storage unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Change-notification errors. Logged only, never surfaced.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Failed to publish event: {reason}")]
    PublishFailed { reason: String },
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;
