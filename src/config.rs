//! Configuration types.

use std::time::Duration;

use secrecy::SecretString;

/// Triage pipeline configuration.
#[derive(Debug, Clone)]
pub struct TriageConfig {
    /// Hard deadline for the primary classification call.
    pub classify_deadline: Duration,
    /// Deadline for the secondary department-review call.
    pub review_deadline: Duration,
    /// Whether the department-review pass runs at all.
    pub review_enabled: bool,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            classify_deadline: Duration::from_secs(15),
            review_deadline: Duration::from_secs(5),
            review_enabled: true,
        }
    }
}

/// Configuration for the external classification provider.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Completion endpoint URL.
    pub endpoint: String,
    /// Model identifier sent with each request.
    pub model: String,
    /// API key for bearer auth.
    pub api_key: SecretString,
}
