//! Axum route handlers for the Baselines API.

use axum::{
    extract::{
        rejection::{BytesRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use tracing::info;

use crate::baselines::builder::build_baseline;
use crate::baselines::intent::CreateBaselineIntent;
use crate::baselines::store::StoredBaseline;
use crate::errors::AppError;
use crate::middleware::account::AccountId;
use crate::state::AppState;

/// PUT /api/v1/baselines
///
/// Validates the raw body, builds the baseline for the caller's account and
/// persists it. Responds with the bare integer id.
pub async fn handle_create_baseline(
    State(state): State<AppState>,
    account: AccountId,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<i64>, AppError> {
    let intent = CreateBaselineIntent::parse(&body?)?;
    let baseline = build_baseline(account, intent);

    let id = state.store.create(&baseline).await?;
    Ok(Json(id))
}

/// GET /api/v1/baselines/:baseline_id
pub async fn handle_get_baseline(
    State(state): State<AppState>,
    account: AccountId,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<StoredBaseline>, AppError> {
    let Path(baseline_id) = path?;
    let baseline = state.store.get(account, baseline_id).await?;
    Ok(Json(baseline))
}

/// DELETE /api/v1/baselines/:baseline_id
pub async fn handle_delete_baseline(
    State(state): State<AppState>,
    account: AccountId,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(baseline_id) = path?;
    state.store.delete(account, baseline_id).await?;
    info!("Baseline {baseline_id} deleted for account {account}");
    Ok(StatusCode::NO_CONTENT)
}
