use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::SaveConversationRequest,
    repo_types::{Conversation, ConversationPatch, NewConversation},
};
use crate::{
    error::ApiError,
    extractors::ValidJson,
    responses::{Created, Deleted, Updated},
    state::AppState,
};

pub fn conversation_routes() -> Router<AppState> {
    Router::new()
        .route("/api/save-conversation", post(save_conversation))
        .route("/api/users/:id/conversations", get(list_conversations))
        .route(
            "/api/conversations/:id",
            get(get_conversation)
                .patch(update_conversation)
                .delete(delete_conversation),
        )
}

fn checked_title(title: &str) -> Result<String, ApiError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ApiError::bad_request("Title is required"));
    }
    Ok(title.to_string())
}

#[instrument(skip(state, payload))]
pub async fn save_conversation(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<SaveConversationRequest>,
) -> Result<(StatusCode, Json<Created>), ApiError> {
    let new = NewConversation {
        user_id: payload.user_id,
        title: checked_title(&payload.title)?,
    };
    let id = state.conversations().create(new).await?;
    info!(conversation_id = id, user_id = payload.user_id, "conversation saved");
    Ok((StatusCode::CREATED, Json(Created::new(id))))
}

#[instrument(skip(state))]
pub async fn list_conversations(
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
) -> Result<Json<Vec<Conversation>>, ApiError> {
    let items = state.conversations().list_by_parent(user_id).await?;
    Ok(Json(items))
}

#[instrument(skip(state))]
pub async fn get_conversation(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Conversation>, ApiError> {
    let conversation = state
        .conversations()
        .get_by_id(id)
        .await?
        .ok_or(ApiError::NotFound("Conversation"))?;
    Ok(Json(conversation))
}

#[instrument(skip(state, patch))]
pub async fn update_conversation(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    ValidJson(mut patch): ValidJson<ConversationPatch>,
) -> Result<Json<Updated>, ApiError> {
    patch.title = patch.title.as_deref().map(checked_title).transpose()?;
    let updated = state.conversations().update(id, patch).await?;
    Ok(Json(Updated { updated }))
}

#[instrument(skip(state))]
pub async fn delete_conversation(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Deleted>, ApiError> {
    let deleted = state.conversations().delete(id).await?;
    Ok(Json(Deleted { deleted }))
}
