// src/provider/mod.rs — Chat provider layer

pub mod cascade;
pub mod g4f_bridge;
pub mod huggingface;
pub mod image;
pub mod openai_compat;
pub mod pollinations;
pub mod registry;
pub mod replicate;
pub mod retry;
pub mod router;

use async_trait::async_trait;
use std::time::Duration;

use crate::infra::errors::ProviderError;

/// One external text endpoint.
///
/// `call` performs exactly one outbound request. A credentialed adapter
/// fails with `MissingCredential` before touching the network, and blank
/// output is a `BadResponse`, never a success.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    fn name(&self) -> &str;

    fn model(&self) -> &str;

    /// Environment variable holding the secret, for credentialed adapters.
    fn credential_env(&self) -> Option<&str> {
        None
    }

    fn timeout(&self) -> Duration;

    async fn call(&self, request: &ChatRequest) -> Result<String, ProviderError>;

    fn requires_credential(&self) -> bool {
        self.credential_env().is_some()
    }
}

/// What the caller wants answered, plus per-request options.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    pub message: String,
    /// Rendered transcript of earlier turns; empty for a fresh conversation.
    pub context: String,
    pub system: Option<String>,
    pub temperature: Option<f32>,
    /// Model hint; adapters that serve a single model ignore it.
    pub model: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// The text sent upstream: the bare message, or the message prefixed by
    /// the conversation transcript.
    pub fn prompt(&self) -> String {
        if self.context.trim().is_empty() {
            self.message.clone()
        } else {
            format!(
                "Previous messages:\n{}\nCurrent question: {}",
                self.context, self.message
            )
        }
    }
}

/// Read a credential from the environment. Blank values count as absent.
pub fn read_credential(provider: &str, env_var: &str) -> Result<String, ProviderError> {
    match std::env::var(env_var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ProviderError::missing_credential(provider, env_var)),
    }
}

/// Whether a credential is currently available (used for listings only).
pub fn credential_present(env_var: Option<&str>) -> bool {
    match env_var {
        Some(var) => std::env::var(var).is_ok_and(|v| !v.trim().is_empty()),
        None => true,
    }
}

/// Reject blank extracted text.
pub(crate) fn non_blank(provider: &str, text: &str) -> Result<String, ProviderError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(ProviderError::bad_response(provider, "empty response text"))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Map a reqwest failure and non-2xx status to a provider error.
pub(crate) async fn check_status(
    provider: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = format!(
        "HTTP {}: {}",
        status.as_u16(),
        crate::util::truncate_str(&body, 200)
    );
    // 408/429/5xx may clear up on their own; other client errors will not.
    let transient = status.is_server_error() || status.as_u16() == 408 || status.as_u16() == 429;
    if transient {
        Err(ProviderError::network(provider, message))
    } else {
        Err(ProviderError::bad_response(provider, message))
    }
}
