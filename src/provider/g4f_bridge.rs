// src/provider/g4f_bridge.rs — Local g4f Python bridge
//
// The bridge exposes `POST /python/chat {message, provider}` and proxies to
// one named g4f backend (Qwen, Phind, ...). It answers `{"response": "..."}`
// or `{"error": "..."}`.

use async_trait::async_trait;
use std::time::Duration;

use super::{check_status, non_blank, ChatProvider, ChatRequest};
use crate::infra::errors::ProviderError;

pub struct G4fBridgeProvider {
    name: String,
    base_url: String,
    /// Backend name understood by the bridge, e.g. `Qwen_Qwen_2_5_Max`.
    backend: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl G4fBridgeProvider {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        backend: impl Into<String>,
        timeout: Duration,
        client: reqwest::Client,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            backend: backend.into(),
            timeout,
            client,
        }
    }

    fn extract_text(&self, resp: &serde_json::Value) -> Result<String, ProviderError> {
        if let Some(error) = resp["error"].as_str() {
            return Err(ProviderError::bad_response(
                &self.name,
                format!("bridge error: {error}"),
            ));
        }
        let text = resp["response"]
            .as_str()
            .ok_or_else(|| ProviderError::bad_response(&self.name, "missing response field"))?;
        non_blank(&self.name, text)
    }
}

#[async_trait]
impl ChatProvider for G4fBridgeProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.backend
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn call(&self, request: &ChatRequest) -> Result<String, ProviderError> {
        let body = serde_json::json!({
            "message": request.prompt(),
            "provider": self.backend,
        });

        let response = self
            .client
            .post(format!("{}/python/chat", self.base_url))
            .json(&body)
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

    fn provider() -> G4fBridgeProvider {
        G4fBridgeProvider::new(
            "qwen",
            "http://localhost:5004/",
            "Qwen_Qwen_2_5_Max",
            Duration::from_secs(5),
            reqwest::Client::new(),
        )
    }

    #[test]
    fn test_model_is_backend_name() {
        let p = provider();
        assert_eq!(p.model(), "Qwen_Qwen_2_5_Max");
        assert!(!p.requires_credential());
    }

    #[test]
    fn test_extract_response() {
        let resp = serde_json::json!({"response": "Ответ", "provider": "Qwen"});
        assert_eq!(provider().extract_text(&resp).unwrap(), "Ответ");
    }

    #[test]
    fn test_extract_error_field() {
        let resp = serde_json::json!({"error": "provider offline"});
        let err = provider().extract_text(&resp).unwrap_err();
        assert_eq!(err.kind, ErrorKind::BadResponse);
        assert!(err.message.contains("provider offline"));
    }

    #[test]
    fn test_extract_empty_response() {
        let resp = serde_json::json!({"response": ""});
        assert_eq!(
            provider().extract_text(&resp).unwrap_err().kind,
            ErrorKind::BadResponse
        );
    }
}
