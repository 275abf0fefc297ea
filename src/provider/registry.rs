// src/provider/registry.rs — Build adapters and cascades from config

use std::sync::Arc;
use std::time::Duration;

use super::cascade::CascadeResolver;
use super::g4f_bridge::G4fBridgeProvider;
use super::huggingface::HuggingFaceProvider;
use super::image::{ImageCascade, ImageProvider};
use super::openai_compat::OpenAICompatProvider;
use super::pollinations::PollinationsProvider;
use super::replicate::ReplicateProvider;
use super::retry::{RetryConfig, RetryProvider};
use super::ChatProvider;
use crate::demo::DemoResponder;
use crate::infra::config::{Config, ImageProviderEntry, ImageProviderKind, ProviderEntry, ProviderKind};
use crate::infra::errors::BoomError;

const DEFAULT_REPLICATE_MODEL: &str = "black-forest-labs/flux-schnell";

/// One shared client; per-call budgets come from the cascade timeouts.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(concat!("booomerangs/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_default()
}

fn chat_adapter(
    entry: &ProviderEntry,
    timeout: Duration,
    client: reqwest::Client,
) -> Arc<dyn ChatProvider> {
    match entry.kind {
        ProviderKind::OpenaiCompat => {
            let mut p =
                OpenAICompatProvider::new(&entry.name, &entry.base_url, &entry.model, timeout, client);
            if let Some(env) = &entry.credential_env {
                p = p.with_credential(env);
            }
            Arc::new(p)
        }
        ProviderKind::Huggingface => {
            let mut p =
                HuggingFaceProvider::new(&entry.name, &entry.base_url, &entry.model, timeout, client);
            if let Some(env) = &entry.credential_env {
                p = p.with_credential(env);
            }
            Arc::new(p)
        }
        ProviderKind::G4fBridge => Arc::new(G4fBridgeProvider::new(
            &entry.name,
            &entry.base_url,
            &entry.model,
            timeout,
            client,
        )),
    }
}

/// Chat adapters in priority order, each wrapped in retry when enabled.
pub fn build_chat_providers(config: &Config, client: &reqwest::Client) -> Vec<Arc<dyn ChatProvider>> {
    let default_timeout = config.cascade.default_timeout_ms;
    let retry = RetryConfig::new(
        config.cascade.max_retries,
        Duration::from_millis(config.cascade.retry_initial_delay_ms),
    );

    config
        .chat_providers()
        .iter()
        .map(|entry| {
            let timeout = Duration::from_millis(entry.timeout_ms.unwrap_or(default_timeout));
            let adapter = chat_adapter(entry, timeout, client.clone());
            if retry.max_retries > 0 {
                Arc::new(RetryProvider::with_config(adapter, retry.clone())) as Arc<dyn ChatProvider>
            } else {
                adapter
            }
        })
        .collect()
}

fn image_adapter(
    entry: &ImageProviderEntry,
    timeout: Duration,
    client: reqwest::Client,
) -> Arc<dyn ImageProvider> {
    match entry.kind {
        ImageProviderKind::Pollinations => Arc::new(PollinationsProvider::new(
            &entry.name,
            &entry.base_url,
            timeout,
            client,
        )),
        ImageProviderKind::Replicate => {
            let model = entry.model.as_deref().unwrap_or(DEFAULT_REPLICATE_MODEL);
            let mut p = ReplicateProvider::new(&entry.name, &entry.base_url, model, timeout, client);
            if let Some(env) = &entry.credential_env {
                p = p.with_credential(env);
            }
            Arc::new(p)
        }
    }
}

pub fn build_image_providers(
    config: &Config,
    client: &reqwest::Client,
) -> Vec<Arc<dyn ImageProvider>> {
    config
        .image_providers()
        .iter()
        .map(|entry| {
            let timeout = Duration::from_millis(
                entry.timeout_ms.unwrap_or(config.cascade.default_timeout_ms),
            );
            image_adapter(entry, timeout, client.clone())
        })
        .collect()
}

/// The chat cascade with the demo responder as its last resort.
pub fn build_resolver(config: &Config, client: &reqwest::Client) -> Result<CascadeResolver, BoomError> {
    let demo = DemoResponder::from_config(&config.demo)?;
    let providers = build_chat_providers(config, client);
    tracing::debug!(count = providers.len(), "Chat providers configured");
    Ok(CascadeResolver::new(providers, demo))
}

pub fn build_image_cascade(config: &Config, client: &reqwest::Client) -> ImageCascade {
    ImageCascade::new(build_image_providers(config, client))
}
