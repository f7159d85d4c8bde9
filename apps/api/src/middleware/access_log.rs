//! Access logging: one record per request, emitted after the handler has
//! produced its response.
//!
//! Fields: `duration_ms`, `status_code`, `user_agent`, `method`, `remote_addr`,
//! `url`, `content_encoding`, `account`, then one `param_<name>` per route
//! parameter.
//!
//! Each request also lands in the `request_duration_seconds` histogram,
//! labelled `endpoint` = method + matched route (e.g. `PUT/api/v1/baselines`).

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, MatchedPath, RawPathParams, State},
    http::{header, Request, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::middleware::account::AccountId;

/// Receives a finished request's status and its flat key/value fields.
pub trait AccessLogSink: Send + Sync {
    fn record(&self, status: StatusCode, fields: &[(String, String)]);
}

pub const REQUEST_DURATION_SECONDS: &str = "request_duration_seconds";

/// Fields promoted to structured `tracing` fields; the rest go into `extra`.
const PROMOTED: &[&str] = &["status_code", "method", "url", "duration_ms", "account"];

/// Logs through `tracing`: `error!` for 5xx, `info!` otherwise.
pub struct TracingSink;

impl AccessLogSink for TracingSink {
    fn record(&self, status: StatusCode, fields: &[(String, String)]) {
        let extra = fields
            .iter()
            .filter(|(k, _)| !PROMOTED.contains(&k.as_str()))
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(" ");

        if status.is_server_error() {
            tracing::error!(
                status_code = status.as_u16(),
                method = field(fields, "method"),
                url = field(fields, "url"),
                duration_ms = field(fields, "duration_ms"),
                account = field(fields, "account"),
                extra = %extra,
                "request"
            );
        } else {
            tracing::info!(
                status_code = status.as_u16(),
                method = field(fields, "method"),
                url = field(fields, "url"),
                duration_ms = field(fields, "duration_ms"),
                account = field(fields, "account"),
                extra = %extra,
                "request"
            );
        }
    }
}

fn field<'a>(fields: &'a [(String, String)], key: &str) -> &'a str {
    fields
        .iter()
        .find(|(k, _)| k == key)
        .map_or("", |(_, v)| v.as_str())
}

/// Route-level middleware; install with `route_layer` so path params are resolved.
pub async fn access_log(
    State(sink): State<Arc<dyn AccessLogSink>>,
    params: Option<RawPathParams>,
    matched_path: Option<MatchedPath>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let started = Instant::now();

    let method = req.method().to_string();
    let endpoint = format!(
        "{method}{}",
        matched_path.as_ref().map_or("", |p| p.as_str())
    );
    let url = req.uri().to_string();
    let user_agent = header_str(req.headers().get(header::USER_AGENT));
    let account = AccountId::from_headers(req.headers()).map_or(0, |a| a.0);
    let remote_addr = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_default();
    let params: Vec<(String, String)> = params
        .iter()
        .flat_map(|p| p.iter())
        .map(|(k, v)| (format!("param_{k}"), v.to_string()))
        .collect();

    let response = next.run(req).await;

    let elapsed = started.elapsed();
    metrics::histogram!(REQUEST_DURATION_SECONDS, "endpoint" => endpoint)
        .record(elapsed.as_secs_f64());

    let status = response.status();
    let mut fields = vec![
        ("duration_ms".to_string(), elapsed.as_millis().to_string()),
        ("status_code".to_string(), status.as_u16().to_string()),
        ("user_agent".to_string(), user_agent),
        ("method".to_string(), method),
        ("remote_addr".to_string(), remote_addr),
        ("url".to_string(), url),
        (
            "content_encoding".to_string(),
            header_str(response.headers().get(header::CONTENT_ENCODING)),
        ),
        ("account".to_string(), account.to_string()),
    ];
    fields.extend(params);

    sink.record(status, &fields);
    response
}

fn header_str(value: Option<&header::HeaderValue>) -> String {
    value
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
