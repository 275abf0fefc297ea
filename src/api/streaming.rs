// src/api/streaming.rs — Server-sent events chat
//
// The answer is resolved once, up front, then replayed as word chunks.
// Validation and unknown-session errors are plain JSON responses; once the
// stream has started, problems are reported as `error` events.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use serde::Serialize;
use std::convert::Infallible;

use crate::api::handlers::{persist_exchange, run_chat, ChatInput};
use crate::api::types::StreamQuery;
use crate::api::AppState;
use crate::infra::errors::BoomError;
use crate::util::chunk_words;

pub const WORDS_PER_CHUNK: usize = 3;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    Chunk { content: String, provider: String },
    Complete { provider: String, model: String },
    Error { message: String },
}

impl StreamEvent {
    fn to_sse(&self) -> Event {
        match serde_json::to_string(self) {
            Ok(json) => Event::default().data(json),
            Err(e) => Event::default().data(format!(
                r#"{{"type":"error","message":"{}"}}"#,
                e.to_string().replace('"', "'")
            )),
        }
    }
}

/// The full event sequence for one answer.
pub fn answer_events(
    text: &str,
    provider: &str,
    model: &str,
    persist_error: Option<String>,
) -> Vec<StreamEvent> {
    let mut events: Vec<StreamEvent> = chunk_words(text, WORDS_PER_CHUNK)
        .into_iter()
        .map(|content| StreamEvent::Chunk {
            content,
            provider: provider.to_string(),
        })
        .collect();
    if let Some(message) = persist_error {
        events.push(StreamEvent::Error { message });
    }
    events.push(StreamEvent::Complete {
        provider: provider.to_string(),
        model: model.to_string(),
    });
    events
}

/// GET /api/streaming/chat — Chunked answer over SSE.
pub async fn stream_chat(
    State(state): State<AppState>,
    query: Result<Query<StreamQuery>, QueryRejection>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, BoomError> {
    let Query(query) = query?;
    let input = ChatInput {
        message: query.message,
        session_id: query.session_id,
        user_id: query.user_id,
        provider: query.provider,
        ..Default::default()
    };
    let resolution = run_chat(&state, &input).await?;

    let persist_error = match input.session_id {
        Some(session_id) => persist_exchange(&state, session_id, &input.message, &resolution)
            .await
            .err()
            .map(|e| {
                tracing::warn!(session_id, "Failed to save streamed messages: {e}");
                format!("Failed to save messages: {e}")
            }),
        None => None,
    };

    let events = answer_events(
        &resolution.text,
        &resolution.provider,
        &resolution.model,
        persist_error,
    );
    let delay = state.stream_chunk_delay;

    let stream = async_stream::stream! {
        let last = events.len().saturating_sub(1);
        for (i, event) in events.into_iter().enumerate() {
            yield Ok::<_, Infallible>(event.to_sse());
            if i < last && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
