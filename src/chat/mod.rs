mod dto;
pub mod handlers;
pub mod log;

use crate::state::AppState;
use axum::Router;

pub use self::log::ChatLog;

pub fn router() -> Router<AppState> {
    handlers::chat_routes()
}
