// src/api/sessions.rs — Chat session CRUD

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;

use crate::api::{types::*, AppState};
use crate::infra::errors::BoomError;
use crate::sessions::{NewMessage, Sender, DEFAULT_TITLE, DEFAULT_USER_ID};

fn not_found(id: i64) -> BoomError {
    BoomError::NotFound(format!("Chat session {id} not found"))
}

/// GET /api/chat/sessions?userId=
pub async fn list_sessions(
    State(state): State<AppState>,
    query: Result<Query<SessionsQuery>, QueryRejection>,
) -> Result<Json<SessionsResponse>, BoomError> {
    let Query(query) = query?;
    let user_id = query.user_id.as_deref().unwrap_or(DEFAULT_USER_ID);
    let sessions = state.sessions.list_sessions(user_id).await?;
    Ok(Json(SessionsResponse {
        success: true,
        sessions,
    }))
}

/// POST /api/chat/sessions
pub async fn create_session(
    State(state): State<AppState>,
    body: Result<Json<CreateSessionBody>, JsonRejection>,
) -> Result<Json<SessionResponse>, BoomError> {
    let Json(body) = body?;
    let user_id = body.user_id.as_deref().unwrap_or(DEFAULT_USER_ID);
    let title = body
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TITLE);
    let session = state.sessions.create_session(user_id, title).await?;
    tracing::debug!(session_id = session.id, "Chat session created");
    Ok(Json(SessionResponse {
        success: true,
        session,
    }))
}

/// GET /api/chat/sessions/{id}/messages
pub async fn list_messages(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessagesResponse>, BoomError> {
    let Path(id) = id?;
    let messages = state
        .sessions
        .list_messages(id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(MessagesResponse {
        success: true,
        messages,
    }))
}

/// POST /api/chat/sessions/{id}/messages
pub async fn add_message(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<NewMessageBody>, JsonRejection>,
) -> Result<Json<MessageResponse>, BoomError> {
    let Path(id) = id?;
    let Json(body) = body?;
    let sender: Sender = body.sender.trim().parse()?;
    if body.content.trim().is_empty() {
        return Err(BoomError::Validation("Message content cannot be empty".into()));
    }

    let message = NewMessage {
        sender,
        content: body.content,
        provider: body.provider,
        model: body.model,
    };
    let message = state
        .sessions
        .insert_message(id, message)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(MessageResponse {
        success: true,
        message,
    }))
}

/// PATCH /api/chat/sessions/{id}
pub async fn update_session(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateSessionBody>, JsonRejection>,
) -> Result<Json<SuccessResponse>, BoomError> {
    let Path(id) = id?;
    let Json(body) = body?;
    let title = body.title.trim();
    if title.is_empty() {
        return Err(BoomError::Validation("Title cannot be empty".into()));
    }
    if !state.sessions.update_title(id, title).await? {
        return Err(not_found(id));
    }
    Ok(SuccessResponse::ok())
}

/// DELETE /api/chat/sessions/{id}
pub async fn delete_session(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<SuccessResponse>, BoomError> {
    let Path(id) = id?;
    if !state.sessions.delete_session(id).await? {
        return Err(not_found(id));
    }
    tracing::debug!(session_id = id, "Chat session deleted");
    Ok(SuccessResponse::ok())
}
