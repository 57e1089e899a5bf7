use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod barbers;
pub mod doc;
pub mod health;
pub mod history;
pub mod items;
pub mod params;
pub mod queue;
pub mod services;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/barbers", barbers::router())
        .nest("/services", services::router())
        .nest("/items", items::router())
        .nest("/queue", queue::router())
        .nest("/history", history::router())
}
