use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{error, instrument, warn};

use super::dto::{ApiChatRequest, ChatRequest, ChatResponse};
use crate::{ai::Prompt, extractors::rejection_message, state::AppState};

const FRIENDLY_FAILURE: &str =
    "Sorry, I couldn't process your message right now. Please try again later.";

pub fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat))
        .route("/api/chat", post(api_chat))
}

type ChatResult = (StatusCode, Json<ChatResponse>);

#[instrument(skip(state, payload))]
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> ChatResult {
    let Json(payload) = match payload {
        Ok(body) => body,
        Err(rejection) => return rejected(rejection),
    };
    respond(&state, &payload.message, Prompt::new(payload.message.trim())).await
}

#[instrument(skip(state, payload), fields(uid = tracing::field::Empty))]
pub async fn api_chat(
    State(state): State<AppState>,
    payload: Result<Json<ApiChatRequest>, JsonRejection>,
) -> ChatResult {
    let Json(payload) = match payload {
        Ok(body) => body,
        Err(rejection) => return rejected(rejection),
    };
    tracing::Span::current().record("uid", payload.uid.as_deref().unwrap_or("-"));

    let mut prompt = Prompt::new(payload.message.trim());
    if let Some(name) = payload.user_name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        prompt = prompt.with_context(format!("The user's name is {name}."));
    }
    respond(&state, &payload.message, prompt).await
}

fn rejected(rejection: JsonRejection) -> ChatResult {
    warn!(error = %rejection.body_text(), "rejected chat body");
    (
        rejection.status(),
        Json(ChatResponse::error(rejection_message(&rejection))),
    )
}

async fn respond(state: &AppState, raw: &str, prompt: Prompt) -> ChatResult {
    if prompt.text.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ChatResponse::error("Message is required")),
        );
    }

    // The reply never waits on the log store.
    let log = state.chat_log.clone();
    let message = raw.to_owned();
    tokio::spawn(async move {
        if let Err(e) = log.append(&message).await {
            warn!(error = %e, "chat log append failed");
        }
    });

    match state.ai.generate(&prompt).await {
        Ok(text) => (StatusCode::OK, Json(ChatResponse::success(text))),
        Err(e) => {
            error!(error = %e, "ai generate failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ChatResponse::error(FRIENDLY_FAILURE)),
            )
        }
    }
}
