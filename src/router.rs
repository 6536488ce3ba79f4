use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::routing::get;
use axum::{Json, Router, middleware};
use serde_json::{Value, json};
use tower_governor::GovernorLayer;
use tower_http::cors::CorsLayer;
use tracing::error;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::metrics::metrics_middleware;
use crate::middleware::role::{require_admin, require_auth};
use crate::modules::academic_years::router::init_academic_years_router;
use crate::modules::activity::router::init_activities_router;
use crate::modules::auth::router::init_auth_router;
use crate::modules::courses::router::init_courses_router;
use crate::modules::dashboard::router::init_dashboard_router;
use crate::modules::enrollments::router::init_enrollments_router;
use crate::modules::exams::router::{init_exam_results_router, init_exams_router};
use crate::modules::formations::router::init_formations_router;
use crate::modules::navigation::router::init_navigation_router;
use crate::modules::profiles::router::init_profiles_router;
use crate::modules::scholarships::router::{init_applications_router, init_scholarships_router};
use crate::modules::students::router::init_students_router;
use crate::modules::teachers::router::init_teachers_router;
use crate::modules::universities::router::init_universities_router;
use crate::state::AppState;

/// Liveness plus a database round trip.
async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Err(e) => {
            error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
        }
    }
}

/// Routes behind a bearer token. Write access is narrowed per handler.
fn data_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .nest(
            "/profiles",
            init_profiles_router()
                .route_layer(middleware::from_fn_with_state(state.clone(), require_admin)),
        )
        .nest("/universities", init_universities_router())
        .nest("/academic-years", init_academic_years_router())
        .nest("/formations", init_formations_router())
        .nest("/courses", init_courses_router())
        .nest("/students", init_students_router())
        .nest("/teachers", init_teachers_router())
        .nest("/enrollments", init_enrollments_router())
        .nest("/exams", init_exams_router())
        .nest("/exam-results", init_exam_results_router())
        .nest("/scholarships", init_scholarships_router())
        .nest("/scholarship-applications", init_applications_router())
        .nest("/activities", init_activities_router())
        .nest("/dashboard", init_dashboard_router())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
}

pub fn init_router(state: AppState) -> Router {
    let limits = &state.rate_limit_config;

    let mut auth_routes = init_auth_router();
    if limits.enabled
        && let Some(config) = limits.auth_governor_config()
    {
        auth_routes = auth_routes.layer(GovernorLayer::new(Arc::new(config)));
    }

    let mut api = Router::new()
        .nest("/auth", auth_routes)
        .nest("/navigation", init_navigation_router())
        .merge(data_routes(&state));
    if limits.enabled
        && let Some(config) = limits.general_governor_config()
    {
        api = api.layer(GovernorLayer::new(Arc::new(config)));
    }

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .route("/health", get(health))
        .nest("/api", api)
        .with_state(state.clone())
        .layer({
            let allowed_origins: Vec<HeaderValue> = state
                .cors_config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    header::AUTHORIZATION,
                    header::CONTENT_TYPE,
                    header::ACCEPT,
                    header::ACCEPT_LANGUAGE,
                    header::IF_NONE_MATCH,
                ])
                .expose_headers([header::ETAG, header::CACHE_CONTROL])
                .allow_credentials(true)
        })
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}
