// src/provider/pollinations.rs — Pollinations keyless image endpoint
//
// Pollinations renders on GET of `/prompt/{prompt}`, so the URL itself is
// the result. One GET request checks that it really serves an image.

use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use url::Url;

use super::check_status;
use super::image::ImageProvider;
use crate::infra::errors::ProviderError;

const DEFAULT_SIZE: u32 = 1024;

pub struct PollinationsProvider {
    name: String,
    base_url: String,
    width: u32,
    height: u32,
    timeout: Duration,
    client: reqwest::Client,
}

impl PollinationsProvider {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
        client: reqwest::Client,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
            timeout,
            client,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// `{base}/prompt/{percent-encoded prompt}?width=..&height=..&seed=..&nologo=true`
    pub fn image_url(&self, prompt: &str, seed: u32) -> Result<Url, ProviderError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ProviderError::bad_response(&self.name, format!("bad base url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| ProviderError::bad_response(&self.name, "base url cannot have a path"))?
            .pop_if_empty()
            .push("prompt")
            .push(prompt);
        url.query_pairs_mut()
            .append_pair("width", &self.width.to_string())
            .append_pair("height", &self.height.to_string())
            .append_pair("seed", &seed.to_string())
            .append_pair("nologo", "true");
        Ok(url)
    }
}

#[async_trait]
impl ImageProvider for PollinationsProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let seed = rand::thread_rng().gen_range(0..1_000_000);
        let url = self.image_url(prompt, seed)?;

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ProviderError::network(&self.name, e.to_string()))?;
        let response = check_status(&self.name, response).await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !content_type.starts_with("image/") {
            return Err(ProviderError::bad_response(
                &self.name,
                format!("unexpected content type '{content_type}'"),
            ));
        }

        Ok(url.to_string())
    }
}
