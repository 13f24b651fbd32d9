use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use super::repo_types::{Exercise, ExercisePatch, NewExercise};
use crate::{
    error::ApiError,
    extractors::ValidJson,
    responses::{Created, Deleted, Updated},
    state::AppState,
};

pub fn exercise_routes() -> Router<AppState> {
    Router::new()
        .route("/api/exercise", post(log_exercise))
        .route("/api/users/:id/exercises", get(list_exercises))
        .route(
            "/api/exercises/:id",
            get(get_exercise).patch(update_exercise).delete(delete_exercise),
        )
}

fn check_duration(duration: f64) -> Result<f64, ApiError> {
    if !duration.is_finite() || duration < 0.0 {
        return Err(ApiError::bad_request("Duration must be a non-negative number"));
    }
    Ok(duration)
}

fn check_type(exercise_type: &str) -> Result<String, ApiError> {
    let exercise_type = exercise_type.trim();
    if exercise_type.is_empty() {
        return Err(ApiError::bad_request("Exercise type is required"));
    }
    Ok(exercise_type.to_string())
}

#[instrument(skip(state, payload))]
pub async fn log_exercise(
    State(state): State<AppState>,
    ValidJson(mut payload): ValidJson<NewExercise>,
) -> Result<(StatusCode, Json<Created>), ApiError> {
    payload.exercise_type = check_type(&payload.exercise_type)?;
    check_duration(payload.duration)?;
    let user_id = payload.user_id;

    let id = state.exercises().create(payload).await?;
    info!(exercise_id = id, user_id, "exercise logged");
    Ok((StatusCode::CREATED, Json(Created::new(id))))
}

#[instrument(skip(state))]
pub async fn list_exercises(
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
) -> Result<Json<Vec<Exercise>>, ApiError> {
    let items = state.exercises().list_by_parent(user_id).await?;
    Ok(Json(items))
}

#[instrument(skip(state))]
pub async fn get_exercise(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Exercise>, ApiError> {
    let exercise = state
        .exercises()
        .get_by_id(id)
        .await?
        .ok_or(ApiError::NotFound("Exercise"))?;
    Ok(Json(exercise))
}

#[instrument(skip(state, patch))]
pub async fn update_exercise(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    ValidJson(mut patch): ValidJson<ExercisePatch>,
) -> Result<Json<Updated>, ApiError> {
    patch.exercise_type = patch.exercise_type.as_deref().map(check_type).transpose()?;
    patch.duration = patch.duration.map(check_duration).transpose()?;
    let updated = state.exercises().update(id, patch).await?;
    Ok(Json(Updated { updated }))
}

#[instrument(skip(state))]
pub async fn delete_exercise(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Deleted>, ApiError> {
    let deleted = state.exercises().delete(id).await?;
    Ok(Json(Deleted { deleted }))
}
