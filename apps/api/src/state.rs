use std::sync::Arc;
use std::time::Duration;

use crate::baselines::store::BaselineStore;
use crate::middleware::access_log::AccessLogSink;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Baseline persistence. Default: `PgBaselineStore`.
    pub store: Arc<dyn BaselineStore>,
    /// Where the access log middleware sends one record per request.
    pub access_log: Arc<dyn AccessLogSink>,
    /// Deadline for a single request, from `REQUEST_TIMEOUT_SECS`.
    pub request_timeout: Duration,
}
