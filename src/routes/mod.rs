use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod checkout;
pub mod doc;
pub mod gallery;
pub mod health;
pub mod params;

// Build the API router without binding state; it is provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/artworks", gallery::router())
        .nest("/checkout", checkout::router())
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
}
