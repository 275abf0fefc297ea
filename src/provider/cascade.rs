// src/provider/cascade.rs — Ordered provider cascade with per-provider timeouts
//
// Providers are tried strictly one at a time in priority order. Each call is
// raced against the provider's timeout; a losing call is dropped, never
// awaited further. When the list is exhausted the demo responder answers, so
// resolution itself cannot fail.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use serde::Serialize;

use super::{ChatProvider, ChatRequest};
use crate::demo::DemoResponder;
use crate::infra::errors::{BoomError, ErrorKind, ProviderError};

/// Pseudo-provider name attached to canned answers.
pub const LOCAL_FALLBACK: &str = "local-fallback";
pub const DEMO_MODEL: &str = "demo-mode";

#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Try only this provider first.
    pub pinned: Option<String>,
    /// With `pinned`: on failure go straight to the local fallback.
    pub strict: bool,
    /// Provider to try first (conversation stickiness); beats last-success.
    pub preferred: Option<String>,
}

impl ResolveOptions {
    pub fn pinned(name: impl Into<String>) -> Self {
        Self {
            pinned: Some(name.into()),
            ..Default::default()
        }
    }
}

/// Outcome of a single provider attempt.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptResult {
    pub provider: String,
    pub success: bool,
    pub error_kind: Option<ErrorKind>,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone)]
pub struct Resolution {
    pub text: String,
    pub provider: String,
    pub model: String,
    pub attempts: Vec<AttemptResult>,
}

impl Resolution {
    pub fn is_fallback(&self) -> bool {
        self.provider == LOCAL_FALLBACK
    }
}

pub struct CascadeResolver {
    providers: Vec<Arc<dyn ChatProvider>>,
    demo: DemoResponder,
    last_success: Mutex<Option<String>>,
}

impl CascadeResolver {
    pub fn new(providers: Vec<Arc<dyn ChatProvider>>, demo: DemoResponder) -> Self {
        Self {
            providers,
            demo,
            last_success: Mutex::new(None),
        }
    }

    pub fn providers(&self) -> &[Arc<dyn ChatProvider>] {
        &self.providers
    }

    /// Name of the provider that answered most recently, if any.
    pub fn last_success(&self) -> Option<String> {
        self.last_success.lock().ok().and_then(|slot| slot.clone())
    }

    fn find(&self, name: &str) -> Option<&Arc<dyn ChatProvider>> {
        self.providers
            .iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
    }

    /// Priority order for this call: the sticky provider (if known) first,
    /// then everyone else in configured order.
    fn attempt_order(&self, options: &ResolveOptions) -> Vec<&Arc<dyn ChatProvider>> {
        let sticky = options
            .preferred
            .clone()
            .or_else(|| self.last_success())
            .and_then(|name| self.find(&name));

        let mut order = Vec::with_capacity(self.providers.len());
        if let Some(first) = sticky {
            order.push(first);
        }
        for provider in &self.providers {
            if !order.iter().any(|p| Arc::ptr_eq(p, provider)) {
                order.push(provider);
            }
        }
        order
    }

    /// One timed attempt. The provider future is dropped if the timer wins.
    async fn attempt(
        provider: &Arc<dyn ChatProvider>,
        request: &ChatRequest,
    ) -> (Result<String, ProviderError>, AttemptResult) {
        let started = Instant::now();
        let timeout = provider.timeout();

        let outcome = match tokio::time::timeout(timeout, provider.call(request)).await {
            Ok(Ok(text)) => super::non_blank(provider.name(), &text),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ProviderError::network(
                provider.name(),
                format!("timed out after {}ms", timeout.as_millis()),
            )),
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        let record = AttemptResult {
            provider: provider.name().to_string(),
            success: outcome.is_ok(),
            error_kind: outcome.as_ref().err().map(|e| e.kind),
            elapsed_ms,
        };

        match &outcome {
            Ok(_) => tracing::info!(
                provider = provider.name(),
                elapsed_ms,
                "Provider answered"
            ),
            Err(e) => tracing::warn!(
                provider = provider.name(),
                error_kind = %e.kind,
                elapsed_ms,
                "Provider failed: {}",
                e.message
            ),
        }

        (outcome, record)
    }

    /// Try `provider`; on success remember it and build the resolution.
    async fn try_provider(
        &self,
        provider: &Arc<dyn ChatProvider>,
        request: &ChatRequest,
        attempts: &mut Vec<AttemptResult>,
    ) -> Option<Resolution> {
        let (outcome, record) = Self::attempt(provider, request).await;
        attempts.push(record);
        let text = outcome.ok()?;

        if let Ok(mut slot) = self.last_success.lock() {
            *slot = Some(provider.name().to_string());
        }
        Some(Resolution {
            text,
            provider: provider.name().to_string(),
            model: provider.model().to_string(),
            attempts: std::mem::take(attempts),
        })
    }

    async fn run_chain(
        &self,
        request: &ChatRequest,
        options: &ResolveOptions,
        attempts: &mut Vec<AttemptResult>,
    ) -> Result<Resolution, BoomError> {
        let mut skip: Option<&Arc<dyn ChatProvider>> = None;

        if let Some(pinned) = options.pinned.as_deref() {
            match self.find(pinned) {
                Some(provider) => {
                    if let Some(resolution) = self.try_provider(provider, request, attempts).await
                    {
                        return Ok(resolution);
                    }
                    if options.strict {
                        return Err(BoomError::AllProvidersExhausted);
                    }
                    skip = Some(provider);
                }
                None => tracing::warn!(provider = pinned, "Unknown pinned provider, ignoring"),
            }
        }

        for provider in self.attempt_order(options) {
            if skip.is_some_and(|s| Arc::ptr_eq(s, provider)) {
                continue;
            }
            if let Some(resolution) = self.try_provider(provider, request, attempts).await {
                return Ok(resolution);
            }
        }

        Err(BoomError::AllProvidersExhausted)
    }

    /// Produce a best-effort answer. Never fails.
    pub async fn resolve(&self, request: &ChatRequest, options: &ResolveOptions) -> Resolution {
        let mut attempts = Vec::new();
        match self.run_chain(request, options, &mut attempts).await {
            Ok(resolution) => resolution,
            Err(e) => {
                tracing::warn!(
                    attempts = attempts.len(),
                    "{e}, answering with {LOCAL_FALLBACK}"
                );
                self.fallback(request, attempts)
            }
        }
    }

    fn fallback(&self, request: &ChatRequest, attempts: Vec<AttemptResult>) -> Resolution {
        Resolution {
            text: self.demo.respond(&request.message),
            provider: LOCAL_FALLBACK.to_string(),
            model: DEMO_MODEL.to_string(),
            attempts,
        }
    }
}
