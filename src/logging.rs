use axum::{
    extract::{MatchedPath, Request},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use opentelemetry::{KeyValue, global, trace::TraceError};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    Resource,
    propagation::TraceContextPropagator,
    runtime,
    trace::{RandomIdGenerator, Sampler, Tracer},
};
use opentelemetry_semantic_conventions::resource::{SERVICE_NAME, SERVICE_VERSION};
use std::time::Instant;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(default)
}

/// Logs every request with its latency, at a level chosen by the status,
/// and echoes the `x-request-id` (generated when the client sent none).
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();
    let matched_path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());

    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= 128)
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let mut response = next.run(req).await;
    let latency_ms = start.elapsed().as_millis();
    let status = response.status().as_u16();

    match status {
        400..=499 => warn!(
            request_id = %request_id,
            method = %method,
            path = %matched_path,
            status,
            latency_ms,
            "Client error"
        ),
        500..=599 => error!(
            request_id = %request_id,
            method = %method,
            path = %matched_path,
            status,
            latency_ms,
            "Server error"
        ),
        _ => info!(
            request_id = %request_id,
            method = %method,
            path = %matched_path,
            status,
            latency_ms,
            "Request completed"
        ),
    }

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

fn init_tracer(otlp_endpoint: String) -> Result<Tracer, TraceError> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    let service_name =
        std::env::var("SERVICE_NAME").unwrap_or_else(|_| env!("CARGO_PKG_NAME").to_string());

    let resource = Resource::new(vec![
        KeyValue::new(SERVICE_NAME, service_name),
        KeyValue::new(SERVICE_VERSION, env!("CARGO_PKG_VERSION")),
        KeyValue::new(
            "environment",
            std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        ),
    ]);

    let otlp_exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(otlp_endpoint);

    opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(otlp_exporter)
        .with_trace_config(
            opentelemetry_sdk::trace::Config::default()
                .with_sampler(Sampler::AlwaysOn)
                .with_id_generator(RandomIdGenerator::default())
                .with_resource(resource),
        )
        .install_batch(runtime::Tokio)
}

/// Installs the global subscriber.
///
/// - compact console output filtered by `RUST_LOG` or `LOG_LEVEL`
/// - daily error log file under `LOG_DIR` (default `storage/logs`)
/// - daily JSON log file when `LOG_JSON=true`
/// - OTLP export when `OBSERVABILITY_ENABLED=true` and
///   `OTEL_EXPORTER_OTLP_ENDPOINT` is set
pub fn init_tracing() {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::fmt;

    let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| "storage/logs".to_string());
    let file_logging = match std::fs::create_dir_all(&log_dir) {
        Ok(()) => true,
        Err(e) => {
            eprintln!("Cannot create log directory {}: {}. File logging disabled", log_dir, e);
            false
        }
    };

    let default_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let console_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{}={},mesrs_cache={},tower_http=warn,sqlx=warn,hyper=info,tonic=info",
            env!("CARGO_CRATE_NAME"),
            default_level,
            default_level
        ))
    });

    let console_layer = fmt::layer()
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .with_filter(console_filter);

    let file_layer = file_logging.then(|| {
        let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "mesrs.log");
        fmt::layer()
            .with_writer(file_appender)
            .with_target(false)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .with_filter(EnvFilter::new("error"))
    });

    let json_layer = (file_logging && env_flag("LOG_JSON", false)).then(|| {
        let json_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "mesrs.json");
        fmt::layer()
            .json()
            .with_writer(json_appender)
            .with_current_span(true)
            .with_span_list(true)
            .with_filter(EnvFilter::new("info"))
    });

    let otlp_endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
        .ok()
        .filter(|_| env_flag("OBSERVABILITY_ENABLED", false));
    let mut otel_error = None;
    let otel_layer = otlp_endpoint.and_then(|endpoint| match init_tracer(endpoint) {
        Ok(tracer) => Some(tracing_opentelemetry::layer().with_tracer(tracer)),
        Err(e) => {
            otel_error = Some(e);
            None
        }
    });
    let otel_enabled = otel_layer.is_some();

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .with(json_layer)
        .with(otel_layer)
        .init();

    if let Some(e) = otel_error {
        warn!(error = %e, "Failed to initialize OpenTelemetry, continuing without it");
    }
    info!(otel_enabled, file_logging, "Tracing initialized");
}

pub async fn shutdown_tracer() {
    info!("Shutting down OpenTelemetry tracer");
    global::shutdown_tracer_provider();
}
