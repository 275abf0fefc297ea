// tests/adapters_test.rs — Integration test: adapters against a local HTTP server

use std::time::Duration;

use axum::extract::Path;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use booomerangs::infra::errors::ErrorKind;
use booomerangs::provider::g4f_bridge::G4fBridgeProvider;
use booomerangs::provider::huggingface::HuggingFaceProvider;
use booomerangs::provider::image::ImageProvider;
use booomerangs::provider::openai_compat::OpenAICompatProvider;
use booomerangs::provider::pollinations::PollinationsProvider;
use booomerangs::provider::replicate::ReplicateProvider;
use booomerangs::provider::{ChatProvider, ChatRequest};

/// Bind a router on an ephemeral port and return its base URL.
async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn timeout() -> Duration {
    Duration::from_secs(5)
}

#[tokio::test]
async fn test_openai_compat_sends_prompt_and_extracts_content() {
    let router = Router::new().route(
        "/api/chat/completions",
        post(|Json(body): Json<Value>| async move {
            let system = body["messages"][0]["content"].as_str().unwrap_or_default();
            let user = body["messages"][1]["content"].as_str().unwrap_or_default();
            Json(json!({
                "choices": [{"message": {"content": format!("[{system}] {user}")}}]
            }))
        }),
    );
    let base = serve(router).await;

    let p = OpenAICompatProvider::new("chatfree", format!("{base}/api"), "gpt-3.5-turbo", timeout(), reqwest::Client::new());
    let request = ChatRequest::new("привет").with_system("sys");
    assert_eq!(p.call(&request).await.unwrap(), "[sys] привет");
}

#[tokio::test]
async fn test_openai_compat_server_error_is_network() {
    let router = Router::new().route(
        "/chat/completions",
        post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
    );
    let base = serve(router).await;

    let p = OpenAICompatProvider::new("x", base, "m", timeout(), reqwest::Client::new());
    let err = p.call(&ChatRequest::new("hi")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Network);
    assert!(err.message.contains("502"));
}

#[tokio::test]
async fn test_openai_compat_client_error_is_bad_response() {
    let router = Router::new().route(
        "/chat/completions",
        post(|| async { (StatusCode::UNAUTHORIZED, "nope") }),
    );
    let base = serve(router).await;

    let p = OpenAICompatProvider::new("x", base, "m", timeout(), reqwest::Client::new());
    let err = p.call(&ChatRequest::new("hi")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::BadResponse);
}

#[tokio::test]
async fn test_openai_compat_blank_content_is_bad_response() {
    let router = Router::new().route(
        "/chat/completions",
        post(|| async { Json(json!({"choices": [{"message": {"content": "  "}}]})) }),
    );
    let base = serve(router).await;

    let p = OpenAICompatProvider::new("x", base, "m", timeout(), reqwest::Client::new());
    let err = p.call(&ChatRequest::new("hi")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::BadResponse);
}

#[tokio::test]
async fn test_connection_refused_is_network() {
    // Bind then drop to get a port nobody listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let p = OpenAICompatProvider::new("x", format!("http://{addr}"), "m", timeout(), reqwest::Client::new());
    let err = p.call(&ChatRequest::new("hi")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Network);
}

#[tokio::test]
async fn test_openai_compat_sends_bearer_when_keyed() {
    const ENV: &str = "BOOOMERANGS_TEST_OPENAI_COMPAT_KEY";
    std::env::set_var(ENV, "sk-test");

    let router = Router::new().route(
        "/chat/completions",
        post(|headers: HeaderMap| async move {
            let auth = headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            Json(json!({"choices": [{"message": {"content": auth}}]}))
        }),
    );
    let base = serve(router).await;

    let p = OpenAICompatProvider::new("perplexity", base, "sonar", timeout(), reqwest::Client::new())
        .with_credential(ENV);
    assert_eq!(p.call(&ChatRequest::new("hi")).await.unwrap(), "Bearer sk-test");
}

#[tokio::test]
async fn test_g4f_bridge_round_trip() {
    let router = Router::new().route(
        "/python/chat",
        post(|Json(body): Json<Value>| async move {
            Json(json!({
                "response": format!("{} via {}", body["message"].as_str().unwrap_or_default(), body["provider"].as_str().unwrap_or_default()),
                "provider": body["provider"],
            }))
        }),
    );
    let base = serve(router).await;

    let p = G4fBridgeProvider::new("qwen", base, "Qwen_Qwen_2_5_Max", timeout(), reqwest::Client::new());
    assert_eq!(
        p.call(&ChatRequest::new("hello")).await.unwrap(),
        "hello via Qwen_Qwen_2_5_Max"
    );
}

#[tokio::test]
async fn test_huggingface_strips_echoed_prompt() {
    const ENV: &str = "BOOOMERANGS_TEST_HF_KEY";
    std::env::set_var(ENV, "hf-test");

    let router = Router::new().route(
        "/models/{owner}/{model}",
        post(|Path((owner, model)): Path<(String, String)>, Json(body): Json<Value>| async move {
            let prompt = body["inputs"].as_str().unwrap_or_default().to_string();
            Json(json!([{"generated_text": format!("{prompt} reply from {owner}/{model}")}]))
        }),
    );
    let base = serve(router).await;

    let p = HuggingFaceProvider::new("huggingface", base, "microsoft/DialoGPT-medium", timeout(), reqwest::Client::new())
        .with_credential(ENV);
    assert_eq!(
        p.call(&ChatRequest::new("hi")).await.unwrap(),
        "reply from microsoft/DialoGPT-medium"
    );
}

#[tokio::test]
async fn test_pollinations_accepts_image_response() {
    let router = Router::new().route(
        "/prompt/{prompt}",
        get(|Path(prompt): Path<String>| async move {
            assert_eq!(prompt, "рыжий кот");
            ([(header::CONTENT_TYPE, "image/jpeg")], vec![0xFFu8, 0xD8, 0xFF])
        }),
    );
    let base = serve(router).await;

    let p = PollinationsProvider::new("pollinations", base.clone(), timeout(), reqwest::Client::new());
    let url = p.generate("рыжий кот").await.unwrap();
    assert!(url.starts_with(&format!("{base}/prompt/")));
    assert!(url.contains("nologo=true"));
}

#[tokio::test]
async fn test_pollinations_rejects_non_image() {
    let router = Router::new().route(
        "/prompt/{prompt}",
        get(|| async { "<html>rate limited</html>".into_response() }),
    );
    let base = serve(router).await;

    let p = PollinationsProvider::new("pollinations", base, timeout(), reqwest::Client::new());
    let err = p.generate("cat").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::BadResponse);
}

#[tokio::test]
async fn test_pollinations_status_taxonomy() {
    let router = Router::new()
        .route(
            "/busy/prompt/{prompt}",
            get(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        )
        .route(
            "/down/prompt/{prompt}",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
        )
        .route(
            "/gone/prompt/{prompt}",
            get(|| async { (StatusCode::NOT_FOUND, "no such thing") }),
        );
    let base = serve(router).await;

    for (prefix, expected) in [
        ("busy", ErrorKind::Network),
        ("down", ErrorKind::Network),
        ("gone", ErrorKind::BadResponse),
    ] {
        let p = PollinationsProvider::new("pollinations", format!("{base}/{prefix}"), timeout(), reqwest::Client::new());
        let err = p.generate("cat").await.unwrap_err();
        assert_eq!(err.kind, expected, "{prefix}");
    }
}

#[tokio::test]
async fn test_replicate_waits_and_extracts_output() {
    const ENV: &str = "BOOOMERANGS_TEST_REPLICATE_TOKEN";
    std::env::set_var(ENV, "r8-test");

    let router = Router::new().route(
        "/models/{owner}/{model}/predictions",
        post(|headers: HeaderMap, Json(body): Json<Value>| async move {
            let prefer = headers.get("prefer").and_then(|v| v.to_str().ok()).unwrap_or_default();
            if prefer != "wait" {
                return Json(json!({"status": "starting", "output": null}));
            }
            Json(json!({
                "status": "succeeded",
                "output": [format!("https://cdn.example/{}.webp", body["input"]["prompt"].as_str().unwrap_or_default())]
            }))
        }),
    );
    let base = serve(router).await;

    let p = ReplicateProvider::new("replicate", base, "black-forest-labs/flux-schnell", timeout(), reqwest::Client::new())
        .with_credential(ENV);
    assert_eq!(p.generate("cat").await.unwrap(), "https://cdn.example/cat.webp");
}
