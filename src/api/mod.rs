// src/api/mod.rs — HTTP surface: JSON chat, SSE streaming, images, sessions

pub mod handlers;
pub mod sessions;
pub mod streaming;
pub mod types;

use axum::http::HeaderValue;
use axum::routing::{get, patch, post};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

use crate::infra::config::ServerConfig;
use crate::memory::ConversationStore;
use crate::provider::cascade::CascadeResolver;
use crate::provider::image::ImageCascade;
use crate::sessions::SessionStoreHandle;

/// Shared state for API handlers. Built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<CascadeResolver>,
    pub images: Arc<ImageCascade>,
    pub memory: ConversationStore,
    pub sessions: SessionStoreHandle,
    /// Used when a request carries no `systemPrompt`.
    pub system_prompt: Option<String>,
    pub stream_chunk_delay: Duration,
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    if parsed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(parsed)
    }
}

/// Build the axum router with all API routes.
pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/api/ai/chat", post(handlers::chat))
        .route("/api/ai/providers", get(handlers::providers))
        .route("/api/ai/image", post(handlers::image))
        .route("/api/ai/conversations", get(handlers::conversations))
        .route(
            "/api/ai/conversations/{user_id}/reset",
            post(handlers::reset_conversation),
        )
        .route("/api/streaming/chat", get(streaming::stream_chat))
        .route(
            "/api/chat/sessions",
            get(sessions::list_sessions).post(sessions::create_session),
        )
        .route(
            "/api/chat/sessions/{id}",
            patch(sessions::update_session).delete(sessions::delete_session),
        )
        .route(
            "/api/chat/sessions/{id}/messages",
            get(sessions::list_messages).post(sessions::add_message),
        )
        .route("/api/health", get(handlers::health))
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

/// Start the API server (runs until the process is stopped).
pub async fn start_server(config: &ServerConfig, state: AppState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);

    let router = build_router(state, &config.cors_origins);

    tracing::info!("BOOOMERANGS listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::DemoResponder;
    use crate::sessions::{open_in_memory, spawn_store_server};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let (sessions, _) = spawn_store_server(open_in_memory().unwrap());
        AppState {
            resolver: Arc::new(CascadeResolver::new(vec![], DemoResponder::default())),
            images: Arc::new(ImageCascade::new(vec![])),
            memory: ConversationStore::default(),
            sessions,
            system_prompt: None,
            stream_chunk_delay: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = build_router(test_state(), &[]);
        let req = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = build_router(test_state(), &[]);
        let req = Request::builder()
            .uri("/api/nope")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_cors_layer_skips_invalid_origin() {
        // Must not panic on a header value with a newline.
        let _ = cors_layer(&["http://ok.example".into(), "bad\norigin".into()]);
    }
}
