use crate::state::AppState;
use axum::Router;

mod claims;
mod dto;
pub(crate) mod extractors;
pub mod handlers;
pub mod jwt;
pub(crate) mod password;
pub mod repo;
pub mod repo_types;
mod services;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new().nest("/auth", handlers::auth_routes(state))
}
