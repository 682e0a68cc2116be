// ABOUTME: Route definitions for the petstore HTTP API.
// ABOUTME: Assembles pet and health routes into a single Axum Router with shared state.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::app_state::SharedState;

/// Build the complete Axum router with all routes and shared state.
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route(
            "/pets",
            get(api::pets::list_pets).post(api::pets::create_pet),
        )
        .route(
            "/pets/{id}",
            get(api::pets::get_pet)
                .put(api::pets::update_pet)
                .delete(api::pets::delete_pet),
        )
        .route("/health/liveness", get(api::health::liveness))
        .route("/health/readiness", get(api::health::readiness))
        .method_not_allowed_fallback(api::error::bad_request)
        .fallback(api::error::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
