use axum::Router;

use crate::state::AppState;

pub mod dto;
pub(crate) mod extractors;
pub mod guard;
pub mod handlers;
pub mod services;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
