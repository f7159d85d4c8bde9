pub mod health;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, put},
    Router,
};

use crate::baselines::handlers;
use crate::middleware::access_log::access_log;
use crate::middleware::timeout::request_timeout;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let access_log_sink = state.access_log.clone();
    let timeout = state.request_timeout;

    // Later layers wrap earlier ones: the access log sees the timeout's 408.
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/baselines", put(handlers::handle_create_baseline))
        .route(
            "/api/v1/baselines/:baseline_id",
            get(handlers::handle_get_baseline).delete(handlers::handle_delete_baseline),
        )
        .route_layer(from_fn_with_state(timeout, request_timeout))
        .route_layer(from_fn_with_state(access_log_sink, access_log))
        .with_state(state)
}
