//! Classifier transport — the injectable client trait and its HTTP
//! implementation.
//!
//! The gateway only ever sees `dyn ClassifierClient`, so tests swap in
//! deterministic stubs and the binary wires up the real HTTP client.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::json;

use crate::config::ClassifierConfig;
use crate::error::ClassifierError;

/// Transport for the external classification provider.
///
/// One prompt in, one raw completion out. Timeout enforcement lives in
/// the gateway, not here.
#[async_trait]
pub trait ClassifierClient: Send + Sync {
    /// Model identifier, for logging.
    fn model_name(&self) -> &str;

    /// Send a prompt and return the provider's raw text completion.
    async fn complete(&self, prompt: &str) -> Result<String, ClassifierError>;
}

/// HTTP client for a JSON completion endpoint.
pub struct HttpClassifierClient {
    config: ClassifierConfig,
    http: reqwest::Client,
}

impl HttpClassifierClient {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ClassifierClient for HttpClassifierClient {
    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, prompt: &str) -> Result<String, ClassifierError> {
        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&json!({
                "model": self.config.model,
                "prompt": prompt,
                "response_mime_type": "application/json",
            }))
            .send()
            .await
            .map_err(|e| ClassifierError::Transport {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClassifierError::Transport {
                reason: format!("provider returned HTTP {status}"),
            });
        }

        let body: serde_json::Value =
            response
                .json()
                .await
                .map_err(|e| ClassifierError::InvalidResponse {
                    reason: e.to_string(),
                })?;

        body["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ClassifierError::InvalidResponse {
                reason: "response has no text content".into(),
            })
    }
}
