use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
    routing::get,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

static OBSERVABILITY_ENABLED: OnceLock<bool> = OnceLock::new();

/// Metrics are on unless `OBSERVABILITY_ENABLED` is `false` or `0`.
pub fn is_observability_enabled() -> bool {
    *OBSERVABILITY_ENABLED.get_or_init(|| {
        std::env::var("OBSERVABILITY_ENABLED")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true)
    })
}

const LATENCY_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0];

/// Paths that are polled by infrastructure and would drown the API series.
const UNTRACKED_PATHS: &[&str] = &["/health", "/metrics"];

/// Installs the Prometheus recorder and its upkeep task.
pub fn init_metrics() -> Option<PrometheusHandle> {
    if !is_observability_enabled() {
        return None;
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            LATENCY_BUCKETS,
        )
        .and_then(|builder| {
            builder.set_buckets_for_metric(
                Matcher::Prefix("dashboard_".to_string()),
                LATENCY_BUCKETS,
            )
        })
        .and_then(|builder| builder.install_recorder())
        .map_err(|e| tracing::error!(error = %e, "Failed to install Prometheus recorder"))
        .ok()?;

    let upkeep_handle = handle.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(5));
        loop {
            interval.tick().await;
            upkeep_handle.run_upkeep();
        }
    });

    Some(handle)
}

pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    let uri_path = req.uri().path();
    if !is_observability_enabled() || UNTRACKED_PATHS.contains(&uri_path) {
        return next.run(req).await;
    }

    let start = Instant::now();
    let method = req.method().to_string();
    // Route templates keep the label set bounded (`/api/students/{id}`).
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| uri_path.to_owned(), |p| p.as_str().to_owned());

    gauge!("http_requests_active").increment(1.0);
    let response = next.run(req).await;
    gauge!("http_requests_active").decrement(1.0);

    let status = response.status();
    let class = match status.as_u16() {
        500.. => "5xx",
        400..=499 => "4xx",
        _ => "2xx",
    };
    counter!(
        "http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status.as_u16().to_string(),
        "class" => class
    )
    .increment(1);
    histogram!("http_request_duration_seconds", "method" => method, "path" => path)
        .record(start.elapsed().as_secs_f64());

    response
}

pub fn metrics_app(handle: PrometheusHandle) -> Router {
    Router::new().route("/metrics", get(move || async move { handle.render() }))
}

pub fn track_login(role: &str, success: bool) {
    if !is_observability_enabled() {
        return;
    }
    let status = if success { "success" } else { "failure" };
    counter!("user_logins_total", "role" => role.to_string(), "status" => status).increment(1);
}

pub fn track_jwt_issued() {
    if !is_observability_enabled() {
        return;
    }
    counter!("jwt_tokens_issued_total").increment(1);
}

pub fn track_record_created(resource_type: &str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("records_created_total", "resource_type" => resource_type.to_string()).increment(1);
}

pub fn track_dashboard_cache(series: &str, hit: bool) {
    if !is_observability_enabled() {
        return;
    }
    let outcome = if hit { "hit" } else { "miss" };
    counter!("dashboard_cache_total", "series" => series.to_string(), "outcome" => outcome)
        .increment(1);
}

pub fn track_dashboard_query(series: &str, duration_secs: f64) {
    if !is_observability_enabled() {
        return;
    }
    histogram!("dashboard_query_duration_seconds", "series" => series.to_string())
        .record(duration_secs);
}
