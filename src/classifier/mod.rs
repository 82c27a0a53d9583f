//! Classification — external AI gateway, transport client, deterministic
//! fallback, and response decoding.

pub mod client;
pub mod fallback;
pub mod gateway;
pub mod types;

pub use client::{ClassifierClient, HttpClassifierClient};
pub use fallback::FallbackClassifier;
pub use gateway::ClassifierGateway;
pub use types::{DepartmentReview, RawClassification, RouteDecision};
