use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{CreateUserRequest, UpdateUserRequest},
    repo_types::User,
    services,
};
use crate::{
    error::ApiError,
    extractors::ValidJson,
    responses::{Created, Deleted, Updated},
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", post(create_user))
        .route(
            "/api/users/:id",
            get(get_user).patch(update_user).delete(delete_user),
        )
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<Created>), ApiError> {
    let new = services::new_user(payload)?;
    let users = state.users();

    if users.find_by_email(&new.email).await?.is_some() {
        warn!(email = %new.email, "email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let id = users.create(new).await?;
    info!(user_id = id, "user registered");
    Ok((StatusCode::CREATED, Json(Created::new(id))))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .users()
        .get_by_id(id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    Ok(Json(user))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    ValidJson(payload): ValidJson<UpdateUserRequest>,
) -> Result<Json<Updated>, ApiError> {
    let patch = services::user_patch(payload)?;
    let users = state.users();

    if let Some(email) = patch.email.as_deref() {
        if let Some(existing) = users.find_by_email(email).await? {
            if existing.id != id {
                warn!(user_id = id, "email taken by another user");
                return Err(ApiError::Conflict("Email already registered".into()));
            }
        }
    }

    let updated = users.update(id, patch).await?;
    Ok(Json(Updated { updated }))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Deleted>, ApiError> {
    let deleted = state.users().delete(id).await?;
    if deleted {
        info!(user_id = id, "user deleted with their conversations and exercises");
    }
    Ok(Json(Deleted { deleted }))
}
