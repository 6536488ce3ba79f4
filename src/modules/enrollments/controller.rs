use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use mesrs_core::{AppError, Paginated};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::middleware::request::RequestMeta;
use crate::middleware::role::RequireStaff;
use crate::modules::activity::{ActivityAction, ActivityService, Actor, ResourceType};
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::enrollments::model::{
    CreateEnrollmentDto, Enrollment, EnrollmentDecisionDto, EnrollmentFilterParams,
    EnrollmentStatus, UpdateEnrollmentDto,
};
use crate::modules::enrollments::service::EnrollmentService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Create a pending enrollment
#[utoipa::path(
    post,
    path = "/api/enrollments",
    request_body = CreateEnrollmentDto,
    responses(
        (status = 201, description = "Enrollment created", body = Enrollment),
        (status = 400, description = "Student already enrolled for this formation and year", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Enrollments"
)]
#[instrument(skip(state, dto))]
pub async fn create_enrollment(
    State(state): State<AppState>,
    RequireStaff(auth_user): RequireStaff,
    meta: RequestMeta,
    ValidatedJson(dto): ValidatedJson<CreateEnrollmentDto>,
) -> Result<(StatusCode, Json<Enrollment>), AppError> {
    let enrollment = EnrollmentService::create_enrollment(&state.db, dto).await?;

    let actor = Actor::from_auth(&auth_user, meta);
    ActivityService::record_change(
        &state,
        &actor,
        ActivityAction::Create,
        ResourceType::Enrollment,
        Some(enrollment.id),
    )
    .await;

    Ok((StatusCode::CREATED, Json(enrollment)))
}

/// List enrollments by status, student, formation or academic year
#[utoipa::path(
    get,
    path = "/api/enrollments",
    params(EnrollmentFilterParams),
    responses(
        (status = 200, description = "Enrollments, newest first", body = Paginated<Enrollment>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Enrollments"
)]
#[instrument(skip(state))]
pub async fn list_enrollments(
    State(state): State<AppState>,
    Query(filters): Query<EnrollmentFilterParams>,
) -> Result<Json<Paginated<Enrollment>>, AppError> {
    Ok(Json(EnrollmentService::list_enrollments(&state.db, filters).await?))
}

#[utoipa::path(
    get,
    path = "/api/enrollments/{id}",
    params(("id" = Uuid, Path, description = "Enrollment ID")),
    responses(
        (status = 200, description = "Enrollment", body = Enrollment),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Enrollment not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Enrollments"
)]
#[instrument(skip(state))]
pub async fn get_enrollment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Enrollment>, AppError> {
    Ok(Json(EnrollmentService::get_enrollment(&state.db, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/enrollments/{id}",
    params(("id" = Uuid, Path, description = "Enrollment ID")),
    request_body = UpdateEnrollmentDto,
    responses(
        (status = 200, description = "Enrollment updated", body = Enrollment),
        (status = 400, description = "Student already enrolled for this formation and year", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Enrollment not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Enrollments"
)]
#[instrument(skip(state, dto))]
pub async fn update_enrollment(
    State(state): State<AppState>,
    RequireStaff(auth_user): RequireStaff,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateEnrollmentDto>,
) -> Result<Json<Enrollment>, AppError> {
    let enrollment = EnrollmentService::update_enrollment(&state.db, id, dto).await?;

    let actor = Actor::from_auth(&auth_user, meta);
    ActivityService::record_change(
        &state,
        &actor,
        ActivityAction::Update,
        ResourceType::Enrollment,
        Some(id),
    )
    .await;

    Ok(Json(enrollment))
}

#[utoipa::path(
    delete,
    path = "/api/enrollments/{id}",
    params(("id" = Uuid, Path, description = "Enrollment ID")),
    responses(
        (status = 204, description = "Enrollment deleted"),
        (status = 400, description = "Enrollment is still referenced", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Enrollment not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Enrollments"
)]
#[instrument(skip(state))]
pub async fn delete_enrollment(
    State(state): State<AppState>,
    RequireStaff(auth_user): RequireStaff,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    EnrollmentService::delete_enrollment(&state.db, id).await?;

    let actor = Actor::from_auth(&auth_user, meta);
    ActivityService::record_change(
        &state,
        &actor,
        ActivityAction::Delete,
        ResourceType::Enrollment,
        Some(id),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

async fn apply_transition(
    state: &AppState,
    auth_user: &AuthUser,
    meta: RequestMeta,
    id: Uuid,
    next: EnrollmentStatus,
    action: ActivityAction,
    notes: Option<String>,
) -> Result<Json<Enrollment>, AppError> {
    let enrollment =
        EnrollmentService::transition(&state.db, id, next, auth_user.user_id()?, notes).await?;

    let actor = Actor::from_auth(auth_user, meta);
    ActivityService::record_change(state, &actor, action, ResourceType::Enrollment, Some(id))
        .await;

    Ok(Json(enrollment))
}

/// Approve a pending enrollment
#[utoipa::path(
    post,
    path = "/api/enrollments/{id}/validate",
    params(("id" = Uuid, Path, description = "Enrollment ID")),
    request_body = EnrollmentDecisionDto,
    responses(
        (status = 200, description = "Enrollment approved", body = Enrollment),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Enrollment not found", body = ErrorResponse),
        (status = 422, description = "Enrollment is not pending", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Enrollments"
)]
#[instrument(skip(state, dto))]
pub async fn validate_enrollment(
    State(state): State<AppState>,
    RequireStaff(auth_user): RequireStaff,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<EnrollmentDecisionDto>,
) -> Result<Json<Enrollment>, AppError> {
    apply_transition(
        &state,
        &auth_user,
        meta,
        id,
        EnrollmentStatus::Approved,
        ActivityAction::Validate,
        dto.notes,
    )
    .await
}

/// Reject a pending enrollment
#[utoipa::path(
    post,
    path = "/api/enrollments/{id}/reject",
    params(("id" = Uuid, Path, description = "Enrollment ID")),
    request_body = EnrollmentDecisionDto,
    responses(
        (status = 200, description = "Enrollment rejected", body = Enrollment),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Enrollment not found", body = ErrorResponse),
        (status = 422, description = "Enrollment is not pending", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Enrollments"
)]
#[instrument(skip(state, dto))]
pub async fn reject_enrollment(
    State(state): State<AppState>,
    RequireStaff(auth_user): RequireStaff,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<EnrollmentDecisionDto>,
) -> Result<Json<Enrollment>, AppError> {
    apply_transition(
        &state,
        &auth_user,
        meta,
        id,
        EnrollmentStatus::Rejected,
        ActivityAction::Reject,
        dto.notes,
    )
    .await
}

/// Start an approved enrollment
#[utoipa::path(
    post,
    path = "/api/enrollments/{id}/activate",
    params(("id" = Uuid, Path, description = "Enrollment ID")),
    request_body = EnrollmentDecisionDto,
    responses(
        (status = 200, description = "Enrollment active", body = Enrollment),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Enrollment not found", body = ErrorResponse),
        (status = 422, description = "Enrollment is not approved", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Enrollments"
)]
#[instrument(skip(state, dto))]
pub async fn activate_enrollment(
    State(state): State<AppState>,
    RequireStaff(auth_user): RequireStaff,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<EnrollmentDecisionDto>,
) -> Result<Json<Enrollment>, AppError> {
    apply_transition(
        &state,
        &auth_user,
        meta,
        id,
        EnrollmentStatus::Active,
        ActivityAction::Activate,
        dto.notes,
    )
    .await
}

/// Close an active enrollment
#[utoipa::path(
    post,
    path = "/api/enrollments/{id}/complete",
    params(("id" = Uuid, Path, description = "Enrollment ID")),
    request_body = EnrollmentDecisionDto,
    responses(
        (status = 200, description = "Enrollment completed", body = Enrollment),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Enrollment not found", body = ErrorResponse),
        (status = 422, description = "Enrollment is not active", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Enrollments"
)]
#[instrument(skip(state, dto))]
pub async fn complete_enrollment(
    State(state): State<AppState>,
    RequireStaff(auth_user): RequireStaff,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<EnrollmentDecisionDto>,
) -> Result<Json<Enrollment>, AppError> {
    apply_transition(
        &state,
        &auth_user,
        meta,
        id,
        EnrollmentStatus::Completed,
        ActivityAction::Complete,
        dto.notes,
    )
    .await
}
