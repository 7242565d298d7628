pub mod email;
pub mod form;
pub mod health;
pub mod meta;
pub mod whatsapp;

use axum::extract::DefaultBodyLimit;
use axum::Router;

use crate::state::AppState;

/// Create the API router with all routes
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_request_bytes();

    Router::new()
        .nest("/api", api_routes())
        .merge(meta::meta_routes())
        .fallback(meta::not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::health_routes())
        .nest("/email", email::email_routes())
        .nest("/whatsapp", whatsapp::whatsapp_routes())
}
