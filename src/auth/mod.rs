use crate::state::AppState;
use axum::Router;

pub(crate) mod dto;
pub(crate) mod extractors;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod repo;
pub mod repo_types;
pub mod secrets;
pub mod services;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
