// src/api/handlers.rs

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;

use crate::api::{types::*, AppState};
use crate::infra::errors::BoomError;
use crate::memory::ConversationTurn;
use crate::provider::cascade::{Resolution, ResolveOptions};
use crate::provider::{credential_present, router, ChatRequest};
use crate::sessions::NewMessage;
use crate::util::truncate_str;

const ANONYMOUS_USER: &str = "anonymous";

/// Everything one chat turn needs, whichever route it came from.
#[derive(Debug, Clone, Default)]
pub struct ChatInput {
    pub message: String,
    pub session_id: Option<i64>,
    pub user_id: Option<String>,
    pub provider: Option<String>,
    pub strict: bool,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub system_prompt: Option<String>,
}

impl From<ChatBody> for ChatInput {
    fn from(body: ChatBody) -> Self {
        Self {
            message: body.message,
            session_id: body.session_id,
            user_id: body.user_id,
            provider: body.provider,
            strict: body.strict,
            model: body.model,
            temperature: body.temperature,
            system_prompt: body.system_prompt,
        }
    }
}

impl ChatInput {
    /// Conversation memory key: explicit user, else the session, else shared.
    pub fn memory_key(&self) -> String {
        match (&self.user_id, self.session_id) {
            (Some(user), _) => user.clone(),
            (None, Some(session)) => format!("session-{session}"),
            (None, None) => ANONYMOUS_USER.to_string(),
        }
    }
}

/// Validate, consult memory, resolve, and record the answer in memory.
///
/// Session persistence is left to the caller, which decides how to report
/// a storage failure.
pub async fn run_chat(state: &AppState, input: &ChatInput) -> Result<Resolution, BoomError> {
    let message = input.message.trim();
    if message.is_empty() {
        return Err(BoomError::Validation("Message cannot be empty".into()));
    }
    if let Some(id) = input.session_id {
        if state.sessions.get_session(id).await?.is_none() {
            return Err(BoomError::NotFound(format!("Chat session {id} not found")));
        }
    }

    let key = input.memory_key();
    let context = state.memory.context_prefix(&key);
    let options = ResolveOptions {
        pinned: input.provider.clone().filter(|p| !p.trim().is_empty()),
        strict: input.strict,
        preferred: state.memory.sticky_provider(&key),
    };
    state.memory.append(&key, ConversationTurn::user(message));

    let system = choose_system_prompt(input, state.system_prompt.as_deref(), message);
    let mut request = ChatRequest::new(message)
        .with_context(context)
        .with_system(system);
    request.temperature = input.temperature;
    request.model = input.model.clone();

    tracing::debug!(
        user = %key,
        pinned = ?options.pinned,
        preferred = ?options.preferred,
        "Chat: {}",
        truncate_str(message, 80)
    );
    let resolution = state.resolver.resolve(&request, &options).await;

    state.memory.append(
        &key,
        ConversationTurn::assistant(&resolution.text, &resolution.provider),
    );
    Ok(resolution)
}

/// The request's prompt, else the configured one, else the topic default.
fn choose_system_prompt(input: &ChatInput, configured: Option<&str>, message: &str) -> String {
    let given = |p: &&str| !p.trim().is_empty();
    let explicit = input
        .system_prompt
        .as_deref()
        .filter(given)
        .or(configured.filter(given));
    if let Some(prompt) = explicit {
        return prompt.to_string();
    }
    let category = router::classify(message);
    tracing::debug!(?category, "No system prompt given; using topic default");
    category.system_prompt().to_string()
}

/// Store the user message and the answer in the chat session.
pub async fn persist_exchange(
    state: &AppState,
    session_id: i64,
    message: &str,
    resolution: &Resolution,
) -> Result<(), BoomError> {
    let reply = NewMessage::ai(&resolution.text, &resolution.provider, &resolution.model);
    for entry in [NewMessage::user(message.trim()), reply] {
        if state.sessions.insert_message(session_id, entry).await?.is_none() {
            return Err(BoomError::NotFound(format!(
                "Chat session {session_id} not found"
            )));
        }
    }
    Ok(())
}

/// POST /api/ai/chat — One best-effort answer.
pub async fn chat(
    State(state): State<AppState>,
    body: Result<Json<ChatBody>, JsonRejection>,
) -> Result<Json<ChatResponse>, BoomError> {
    let Json(body) = body?;
    let input = ChatInput::from(body);
    let resolution = run_chat(&state, &input).await?;

    if let Some(session_id) = input.session_id {
        if let Err(e) = persist_exchange(&state, session_id, &input.message, &resolution).await {
            tracing::warn!(session_id, "Failed to save chat messages: {e}");
        }
    }

    Ok(Json(ChatResponse {
        success: true,
        response: resolution.text,
        provider: resolution.provider,
        model: resolution.model,
        session_id: input.session_id,
    }))
}

/// GET /api/ai/providers — Configured adapters in priority order.
pub async fn providers(State(state): State<AppState>) -> Json<ProvidersResponse> {
    let providers = state
        .resolver
        .providers()
        .iter()
        .map(|p| ProviderInfo {
            name: p.name().to_string(),
            model: Some(p.model().to_string()),
            requires_credential: p.requires_credential(),
            credential_present: credential_present(p.credential_env()),
            timeout_ms: p.timeout().as_millis() as u64,
        })
        .collect();

    let image_providers = state
        .images
        .providers()
        .iter()
        .map(|p| ProviderInfo {
            name: p.name().to_string(),
            model: None,
            requires_credential: p.credential_env().is_some(),
            credential_present: credential_present(p.credential_env()),
            timeout_ms: p.timeout().as_millis() as u64,
        })
        .collect();

    Json(ProvidersResponse {
        success: true,
        providers,
        image_providers,
        last_success: state.resolver.last_success(),
    })
}

/// POST /api/ai/image — Generate (or placeholder) an image for a prompt.
pub async fn image(
    State(state): State<AppState>,
    body: Result<Json<ImageBody>, JsonRejection>,
) -> Result<Json<ImageResponse>, BoomError> {
    let Json(body) = body?;
    let prompt = body.prompt.trim();
    if prompt.is_empty() {
        return Err(BoomError::Validation("Prompt cannot be empty".into()));
    }

    let resolution = state.images.resolve(prompt).await;
    Ok(Json(ImageResponse {
        success: true,
        image_url: resolution.image_url,
        provider: resolution.provider,
    }))
}

/// GET /api/ai/conversations — In-memory conversation stats.
pub async fn conversations(State(state): State<AppState>) -> Json<ConversationsResponse> {
    Json(ConversationsResponse {
        success: true,
        stats: state.memory.stats(),
    })
}

/// POST /api/ai/conversations/{user_id}/reset — Start a fresh conversation.
pub async fn reset_conversation(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<ResetResponse> {
    let existed = state.memory.reset(&user_id);
    tracing::info!(user = %user_id, existed, "Conversation reset");
    Json(ResetResponse {
        success: true,
        existed,
    })
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        chat_providers: state.resolver.providers().len(),
        image_providers: state.images.providers().len(),
        active_conversations: state.memory.stats().active_conversations,
    })
}
