use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod buyer;
pub mod categories;
pub mod doc;
pub mod health;
pub mod listings;
pub mod params;
pub mod seller;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/categories", categories::router())
        .nest("/listings", listings::router())
        .nest("/buyer", buyer::router())
        .nest("/seller", seller::router())
}
