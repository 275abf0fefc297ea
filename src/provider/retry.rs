// src/provider/retry.rs — Bounded retry with exponential backoff for one adapter
//
// Retries: network failures (connection errors, 408/429/5xx).
// Does NOT retry: missing credentials, malformed or empty payloads.
// The whole retried call still runs inside the cascade's per-provider
// timeout, so retries can never stretch an attempt past its budget.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use super::{ChatProvider, ChatRequest};
use crate::infra::errors::ProviderError;

/// Hard ceiling on extra tries, whatever the config says.
pub const MAX_RETRIES_CAP: u32 = 3;
const INITIAL_DELAY_MS: u64 = 250;
const BACKOFF_FACTOR: f64 = 2.0;
const MAX_DELAY_MS: u64 = 4_000;
const JITTER_FRACTION: f64 = 0.2;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub backoff_factor: f64,
    pub max_delay: Duration,
    pub jitter_fraction: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(INITIAL_DELAY_MS),
            backoff_factor: BACKOFF_FACTOR,
            max_delay: Duration::from_millis(MAX_DELAY_MS),
            jitter_fraction: JITTER_FRACTION,
        }
    }
}

impl RetryConfig {
    pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            max_retries: max_retries.min(MAX_RETRIES_CAP),
            initial_delay,
            ..Self::default()
        }
    }
}

/// A provider wrapper that adds retry with exponential backoff.
pub struct RetryProvider {
    inner: Arc<dyn ChatProvider>,
    config: RetryConfig,
}

impl RetryProvider {
    pub fn new(inner: Arc<dyn ChatProvider>) -> Self {
        Self {
            inner,
            config: RetryConfig::default(),
        }
    }

    pub fn with_config(inner: Arc<dyn ChatProvider>, mut config: RetryConfig) -> Self {
        config.max_retries = config.max_retries.min(MAX_RETRIES_CAP);
        Self { inner, config }
    }

    /// Calculate the delay for a given retry attempt (0-indexed).
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base_ms = self.config.initial_delay.as_millis() as f64
            * self.config.backoff_factor.powi(attempt as i32);
        let capped_ms = base_ms.min(self.config.max_delay.as_millis() as f64);

        let jitter = deterministic_jitter(attempt, self.config.jitter_fraction);
        let final_ms = (capped_ms * jitter).max(1.0);

        Duration::from_millis(final_ms as u64)
    }
}

/// Deterministic jitter for a given attempt to keep retries reproducible in tests.
/// Returns a multiplier in [1 - fraction, 1 + fraction].
fn deterministic_jitter(attempt: u32, fraction: f64) -> f64 {
    let hash = (attempt.wrapping_mul(2654435761)) as f64 / u32::MAX as f64;
    1.0 + fraction * (2.0 * hash - 1.0)
}

#[async_trait]
impl ChatProvider for RetryProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn model(&self) -> &str {
        self.inner.model()
    }

    fn credential_env(&self) -> Option<&str> {
        self.inner.credential_env()
    }

    fn timeout(&self) -> Duration {
        self.inner.timeout()
    }

    async fn call(&self, request: &ChatRequest) -> Result<String, ProviderError> {
        let mut attempt = 0;
        loop {
            match self.inner.call(request).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retriable() && attempt < self.config.max_retries => {
                    let delay = self.delay_for_attempt(attempt);
                    tracing::debug!(
                        provider = self.inner.name(),
                        attempt = attempt + 1,
                        max_retries = self.config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying after error: {}",
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
