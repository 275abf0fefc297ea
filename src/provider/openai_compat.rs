// src/provider/openai_compat.rs — Generic OpenAI-compatible chat endpoint
//
// Used by: ChatFree and its mirrors (keyless), Perplexity (PERPLEXITY_API_KEY),
// and any custom `/chat/completions` endpoint from config.

use async_trait::async_trait;
use std::time::Duration;

use super::{check_status, non_blank, read_credential, ChatProvider, ChatRequest};
use crate::infra::errors::ProviderError;

const DEFAULT_TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 1000;

pub struct OpenAICompatProvider {
    name: String,
    base_url: String,
    model: String,
    credential_env: Option<String>,
    timeout: Duration,
    client: reqwest::Client,
}

impl OpenAICompatProvider {
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
            credential_env: None,
            timeout,
            client,
        }
    }

    pub fn with_credential(mut self, env_var: impl Into<String>) -> Self {
        self.credential_env = Some(env_var.into());
        self
    }

    fn build_body(&self, request: &ChatRequest) -> serde_json::Value {
        let mut messages = Vec::new();
        if let Some(system) = &request.system {
            messages.push(serde_json::json!({"role": "system", "content": system}));
        }
        messages.push(serde_json::json!({"role": "user", "content": request.prompt()}));

        serde_json::json!({
            "model": request.model.as_deref().unwrap_or(&self.model),
            "messages": messages,
            "temperature": request.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            "max_tokens": MAX_TOKENS,
            "stream": false,
        })
    }

    /// `{"choices": [{"message": {"content": "..."}}]}`
    fn extract_text(&self, resp: &serde_json::Value) -> Result<String, ProviderError> {
        let content = resp["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                ProviderError::bad_response(&self.name, "missing choices[0].message.content")
            })?;
        non_blank(&self.name, content)
    }
}

#[async_trait]
impl ChatProvider for OpenAICompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn credential_env(&self) -> Option<&str> {
        self.credential_env.as_deref()
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn call(&self, request: &ChatRequest) -> Result<String, ProviderError> {
        let api_key = match &self.credential_env {
            Some(env_var) => Some(read_credential(&self.name, env_var)?),
            None => None,
        };

        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header(
                "User-Agent",
                format!("booomerangs/{}", env!("CARGO_PKG_VERSION")),
            )
            .json(&self.build_body(request));
        if let Some(key) = api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ProviderError::network(&self.name, e.to_string()))?;
        let response = check_status(&self.name, response).await?;

        let resp: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::bad_response(&self.name, e.to_string()))?;

        self.extract_text(&resp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::errors::ErrorKind;

    fn provider() -> OpenAICompatProvider {
        OpenAICompatProvider::new(
            "chatfree",
            "https://chatfree.org/api/",
            "gpt-3.5-turbo",
            Duration::from_secs(5),
            reqwest::Client::new(),
        )
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        assert_eq!(provider().base_url, "https://chatfree.org/api");
    }

    #[test]
    fn test_build_body_with_system() {
        let req = ChatRequest::new("hi").with_system("be nice");
        let body = provider().build_body(&req);
        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hi");
        assert_eq!(body["stream"], false);
    }

    #[test]
    fn test_build_body_model_hint() {
        let mut req = ChatRequest::new("hi");
        req.model = Some("gpt-4o-mini".into());
        let body = provider().build_body(&req);
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_extract_text_ok() {
        let resp = serde_json::json!({"choices": [{"message": {"content": " Привет! "}}]});
        assert_eq!(provider().extract_text(&resp).unwrap(), "Привет!");
    }

    #[test]
    fn test_extract_text_blank_is_bad_response() {
        let resp = serde_json::json!({"choices": [{"message": {"content": "   "}}]});
        let err = provider().extract_text(&resp).unwrap_err();
        assert_eq!(err.kind, ErrorKind::BadResponse);
    }

    #[test]
    fn test_extract_text_unknown_shape_is_bad_response() {
        let resp = serde_json::json!({"message": "something else"});
        let err = provider().extract_text(&resp).unwrap_err();
        assert_eq!(err.kind, ErrorKind::BadResponse);
    }

    #[tokio::test]
    async fn test_missing_credential_before_network() {
        // Unroutable base URL: a network attempt would be a Network error.
        let p = OpenAICompatProvider::new(
            "perplexity",
            "http://192.0.2.1:9",
            "sonar",
            Duration::from_secs(5),
            reqwest::Client::new(),
        )
        .with_credential("BOOOMERANGS_TEST_UNSET_PERPLEXITY_KEY");
        assert!(p.requires_credential());
        let err = p.call(&ChatRequest::new("hi")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingCredential);
    }
}
