// src/provider/huggingface.rs — HuggingFace Inference API text generation

use async_trait::async_trait;
use std::time::Duration;

use super::{check_status, non_blank, read_credential, ChatProvider, ChatRequest};
use crate::infra::errors::ProviderError;

pub const CREDENTIAL_ENV: &str = "HUGGINGFACE_API_KEY";

const MAX_LENGTH: u32 = 200;

pub struct HuggingFaceProvider {
    name: String,
    base_url: String,
    model: String,
    credential_env: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl HuggingFaceProvider {
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

    /// `[{"generated_text": "..."}]`; the model echoes the prompt, which is stripped.
    fn extract_text(&self, resp: &serde_json::Value, prompt: &str) -> Result<String, ProviderError> {
        let generated = resp[0]["generated_text"].as_str().ok_or_else(|| {
            ProviderError::bad_response(&self.name, "missing [0].generated_text")
        })?;
        let answer = generated.strip_prefix(prompt).unwrap_or(generated);
        non_blank(&self.name, answer)
    }
}

#[async_trait]
impl ChatProvider for HuggingFaceProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn credential_env(&self) -> Option<&str> {
        Some(&self.credential_env)
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn call(&self, request: &ChatRequest) -> Result<String, ProviderError> {
        let api_key = read_credential(&self.name, &self.credential_env)?;
        let prompt = request.prompt();

        let body = serde_json::json!({
            "inputs": prompt,
            "parameters": {
                "max_length": MAX_LENGTH,
                "temperature": request.temperature.unwrap_or(0.7),
            },
        });

        let response = self
            .client
            .post(format!("{}/models/{}", self.base_url, self.model))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::network(&self.name, e.to_string()))?;
        let response = check_status(&self.name, response).await?;

        let resp: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::bad_response(&self.name, e.to_string()))?;

        self.extract_text(&resp, &prompt)
    }
}
