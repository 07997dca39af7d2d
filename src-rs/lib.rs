pub mod aqi;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod open_meteo;
pub mod pollen;
pub mod rate_limit;
pub mod state;

use axum::{middleware as axum_middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Rate limiting wraps the CORS gate, so a throttled client gets a 429 before
/// any method or origin handling, preflights included.
pub fn build_router(state: AppState) -> Router {
    // `get` would also serve HEAD through the forwarder; only GET may reach it.
    let pollen_endpoint = get(handlers::pollen)
        .head(handlers::method_not_allowed)
        .fallback(handlers::method_not_allowed);

    let pollen_router = Router::new()
        .route("/pollen", pollen_endpoint.clone())
        .route("/api/pollen", pollen_endpoint)
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::cors_gate,
        ))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::pollen_rate_limit,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(pollen_router)
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
