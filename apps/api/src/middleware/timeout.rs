//! Per-request deadline. Installed beneath the access logger so a timed-out
//! request is still logged, and answered through `AppError` so the 408 carries
//! the usual JSON error body.

use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::errors::AppError;

/// Dropping the handler future on expiry also drops any open transaction,
/// which rolls it back.
pub async fn request_timeout(
    State(limit): State<Duration>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let uri = req.uri().clone();
    match tokio::time::timeout(limit, next.run(req)).await {
        Ok(response) => response,
        Err(_) => {
            warn!("Request to {uri} timed out after {limit:?}");
            AppError::Timeout.into_response()
        }
    }
}
