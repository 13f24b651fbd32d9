mod dto;
pub mod handlers;
mod password;
mod repo;
pub mod repo_types;
mod services;

use crate::state::AppState;
use axum::Router;

pub use repo_types::User;

pub fn router() -> Router<AppState> {
    handlers::user_routes()
}
