use crate::state::AppState;
use axum::Router;

pub(crate) mod dto;
pub mod handlers;
pub(crate) mod repo;

pub fn router() -> Router<AppState> {
    handlers::comment_routes()
}
