use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use mesrs_core::{AppError, Paginated};
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::middleware::request::RequestMeta;
use crate::middleware::role::RequireStaff;
use crate::modules::activity::model::{ActivityFilterParams, ActivityLog, LogActivityDto};
use crate::modules::activity::service::{ActivityService, Actor};
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Record a client-side event for the current user
#[utoipa::path(
    post,
    path = "/api/activities",
    request_body = LogActivityDto,
    responses(
        (status = 201, description = "Activity recorded", body = ActivityLog),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Activities"
)]
#[instrument(skip(state, dto))]
pub async fn log_activity(
    State(state): State<AppState>,
    auth_user: AuthUser,
    meta: RequestMeta,
    ValidatedJson(dto): ValidatedJson<LogActivityDto>,
) -> Result<(StatusCode, Json<ActivityLog>), AppError> {
    let actor = Actor::from_auth(&auth_user, meta);
    let log = ActivityService::record(
        &state.db,
        &actor,
        &dto.action.to_uppercase(),
        &dto.resource_type.to_lowercase(),
        dto.resource_id,
        dto.details,
    )
    .await?;
    mesrs_cache::invalidate::dashboard(state.cache()).await;
    Ok((StatusCode::CREATED, Json(log)))
}

/// List activity logs (admin and staff)
#[utoipa::path(
    get,
    path = "/api/activities",
    params(ActivityFilterParams),
    responses(
        (status = 200, description = "Activity logs, newest first", body = Paginated<ActivityLog>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Activities"
)]
#[instrument(skip(state))]
pub async fn list_activities(
    State(state): State<AppState>,
    RequireStaff(_auth_user): RequireStaff,
    Query(filters): Query<ActivityFilterParams>,
) -> Result<Json<Paginated<ActivityLog>>, AppError> {
    Ok(Json(ActivityService::list(&state.db, filters).await?))
}
