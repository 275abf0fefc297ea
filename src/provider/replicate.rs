// src/provider/replicate.rs — Replicate hosted image models

use async_trait::async_trait;
use std::time::Duration;

use super::image::ImageProvider;
use super::{check_status, read_credential};
use crate::infra::errors::ProviderError;

pub const CREDENTIAL_ENV: &str = "REPLICATE_API_TOKEN";

pub struct ReplicateProvider {
    name: String,
    base_url: String,
    /// `owner/name`, e.g. `black-forest-labs/flux-schnell`.
    model: String,
    credential_env: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl ReplicateProvider {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
        client: reqwest::Client,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            credential_env: CREDENTIAL_ENV.into(),
            timeout,
            client,
        }
    }

    pub fn with_credential(mut self, env_var: impl Into<String>) -> Self {
        self.credential_env = env_var.into();
        self
    }

    /// `output` is either a URL string or a list of URLs.
    fn extract_url(&self, resp: &serde_json::Value) -> Result<String, ProviderError> {
        if let Some(error) = resp["error"].as_str() {
            return Err(ProviderError::bad_response(
                &self.name,
                format!("prediction failed: {error}"),
            ));
        }
        let output = &resp["output"];
        let url = output[0].as_str().or_else(|| output.as_str()).ok_or_else(|| {
            let status = resp["status"].as_str().unwrap_or("unknown");
            ProviderError::bad_response(&self.name, format!("no output (status: {status})"))
        })?;
        if url.trim().is_empty() {
            return Err(ProviderError::bad_response(&self.name, "empty output url"));
        }
        Ok(url.to_string())
    }
}

#[async_trait]
impl ImageProvider for ReplicateProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn credential_env(&self) -> Option<&str> {
        Some(&self.credential_env)
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let token = read_credential(&self.name, &self.credential_env)?;

        let body = serde_json::json!({
            "input": { "prompt": prompt },
        });

        let response = self
            .client
            .post(format!("{}/models/{}/predictions", self.base_url, self.model))
            .bearer_auth(token)
            .header("Prefer", "wait")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::network(&self.name, e.to_string()))?;
        let response = check_status(&self.name, response).await?;

        let resp: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::bad_response(&self.name, e.to_string()))?;

        self.extract_url(&resp)
    }
}
