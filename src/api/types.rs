// src/api/types.rs

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Deserializer, Serialize};

use crate::infra::errors::BoomError;
use crate::memory::ConversationStats;
use crate::sessions::{MessageRow, SessionRow};

/// Accept `"42"` or `42` for identifiers the web client sends either way.
fn id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(i64),
    }
    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Str(s)) if !s.trim().is_empty() => Some(s),
        Some(Raw::Num(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn id_number<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match id_string(deserializer)? {
        None => Ok(None),
        Some(s) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid session id '{s}'"))),
    }
}

/// Request body for `POST /api/ai/chat`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatBody {
    #[serde(default)]
    pub message: String,
    #[serde(default, deserialize_with = "id_number")]
    pub session_id: Option<i64>,
    #[serde(default, deserialize_with = "id_string")]
    pub user_id: Option<String>,
    /// Pin this provider first.
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub system_prompt: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub success: bool,
    pub response: String,
    pub provider: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub requires_credential: bool,
    pub credential_present: bool,
    pub timeout_ms: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvidersResponse {
    pub success: bool,
    pub providers: Vec<ProviderInfo>,
    pub image_providers: Vec<ProviderInfo>,
    pub last_success: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageBody {
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResponse {
    pub success: bool,
    pub image_url: String,
    pub provider: String,
}

/// Query string for `GET /api/streaming/chat`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamQuery {
    #[serde(default)]
    pub message: String,
    #[serde(default, deserialize_with = "id_number")]
    pub session_id: Option<i64>,
    #[serde(default, deserialize_with = "id_string")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionsQuery {
    #[serde(default, deserialize_with = "id_string")]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionBody {
    #[serde(default, deserialize_with = "id_string")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMessageBody {
    pub content: String,
    pub sender: String,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSessionBody {
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub success: bool,
    pub session: SessionRow,
}

#[derive(Debug, Serialize)]
pub struct SessionsResponse {
    pub success: bool,
    pub sessions: Vec<SessionRow>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: MessageRow,
}

#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub success: bool,
    pub messages: Vec<MessageRow>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Json<Self> {
        Json(Self { success: true })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationsResponse {
    pub success: bool,
    #[serde(flatten)]
    pub stats: ConversationStats,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub success: bool,
    /// Whether there was a conversation to forget.
    pub existed: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub chat_providers: usize,
    pub image_providers: usize,
    pub active_conversations: usize,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

impl BoomError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            BoomError::Validation(_) => StatusCode::BAD_REQUEST,
            BoomError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Malformed input gets the same JSON error body as any other validation failure.
impl From<JsonRejection> for BoomError {
    fn from(rejection: JsonRejection) -> Self {
        BoomError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for BoomError {
    fn from(rejection: QueryRejection) -> Self {
        BoomError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for BoomError {
    fn from(rejection: PathRejection) -> Self {
        BoomError::Validation(rejection.body_text())
    }
}

impl IntoResponse for BoomError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {self}");
        }
        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}
