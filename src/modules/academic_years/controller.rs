use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use mesrs_core::{AppError, Paginated, PaginationParams};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::request::RequestMeta;
use crate::middleware::role::RequireAdmin;
use crate::modules::academic_years::model::{
    AcademicYear, CreateAcademicYearDto, UpdateAcademicYearDto,
};
use crate::modules::academic_years::service::AcademicYearService;
use crate::modules::activity::{ActivityAction, ActivityService, Actor, ResourceType};
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Create an academic year, optionally as the current one
#[utoipa::path(
    post,
    path = "/api/academic-years",
    request_body = CreateAcademicYearDto,
    responses(
        (status = 201, description = "Academic year created", body = AcademicYear),
        (status = 400, description = "Academic year already exists", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Academic Years"
)]
#[instrument(skip(state, dto))]
pub async fn create_academic_year(
    State(state): State<AppState>,
    RequireAdmin(auth_user): RequireAdmin,
    meta: RequestMeta,
    ValidatedJson(dto): ValidatedJson<CreateAcademicYearDto>,
) -> Result<(StatusCode, Json<AcademicYear>), AppError> {
    let academic_year = AcademicYearService::create_academic_year(&state.db, dto).await?;

    let actor = Actor::from_auth(&auth_user, meta);
    ActivityService::record_change(
        &state,
        &actor,
        ActivityAction::Create,
        ResourceType::AcademicYear,
        Some(academic_year.id),
    )
    .await;

    Ok((StatusCode::CREATED, Json(academic_year)))
}

#[utoipa::path(
    get,
    path = "/api/academic-years",
    params(PaginationParams),
    responses(
        (status = 200, description = "Academic years, most recent first", body = Paginated<AcademicYear>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Academic Years"
)]
#[instrument(skip(state))]
pub async fn list_academic_years(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<Paginated<AcademicYear>>, AppError> {
    Ok(Json(
        AcademicYearService::list_academic_years(&state.db, pagination).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/academic-years/{id}",
    params(("id" = Uuid, Path, description = "Academic year ID")),
    responses(
        (status = 200, description = "Academic year", body = AcademicYear),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Academic year not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Academic Years"
)]
#[instrument(skip(state))]
pub async fn get_academic_year(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AcademicYear>, AppError> {
    Ok(Json(AcademicYearService::get_academic_year(&state.db, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/academic-years/{id}",
    params(("id" = Uuid, Path, description = "Academic year ID")),
    request_body = UpdateAcademicYearDto,
    responses(
        (status = 200, description = "Academic year updated", body = AcademicYear),
        (status = 400, description = "Academic year already exists", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Academic year not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Academic Years"
)]
#[instrument(skip(state, dto))]
pub async fn update_academic_year(
    State(state): State<AppState>,
    RequireAdmin(auth_user): RequireAdmin,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateAcademicYearDto>,
) -> Result<Json<AcademicYear>, AppError> {
    let academic_year = AcademicYearService::update_academic_year(&state.db, id, dto).await?;

    let actor = Actor::from_auth(&auth_user, meta);
    ActivityService::record_change(
        &state,
        &actor,
        ActivityAction::Update,
        ResourceType::AcademicYear,
        Some(id),
    )
    .await;

    Ok(Json(academic_year))
}

#[utoipa::path(
    delete,
    path = "/api/academic-years/{id}",
    params(("id" = Uuid, Path, description = "Academic year ID")),
    responses(
        (status = 204, description = "Academic year deleted"),
        (status = 400, description = "Academic year is still referenced", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Academic year not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Academic Years"
)]
#[instrument(skip(state))]
pub async fn delete_academic_year(
    State(state): State<AppState>,
    RequireAdmin(auth_user): RequireAdmin,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    AcademicYearService::delete_academic_year(&state.db, id).await?;

    let actor = Actor::from_auth(&auth_user, meta);
    ActivityService::record_change(
        &state,
        &actor,
        ActivityAction::Delete,
        ResourceType::AcademicYear,
        Some(id),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

/// The academic year currently in progress
#[utoipa::path(
    get,
    path = "/api/academic-years/current",
    responses(
        (status = 200, description = "Current academic year", body = AcademicYear),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "No current academic year", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Academic Years"
)]
#[instrument(skip(state))]
pub async fn get_current_academic_year(
    State(state): State<AppState>,
) -> Result<Json<AcademicYear>, AppError> {
    Ok(Json(
        AcademicYearService::get_current_academic_year(&state.db).await?,
    ))
}

/// Mark an academic year as current, clearing the previous one
#[utoipa::path(
    post,
    path = "/api/academic-years/{id}/set-current",
    params(("id" = Uuid, Path, description = "Academic year ID")),
    responses(
        (status = 200, description = "Academic year is now current", body = AcademicYear),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Academic year not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Academic Years"
)]
#[instrument(skip(state))]
pub async fn set_current_academic_year(
    State(state): State<AppState>,
    RequireAdmin(auth_user): RequireAdmin,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
) -> Result<Json<AcademicYear>, AppError> {
    let academic_year = AcademicYearService::set_current(&state.db, id).await?;

    let actor = Actor::from_auth(&auth_user, meta);
    ActivityService::record_change(
        &state,
        &actor,
        ActivityAction::Update,
        ResourceType::AcademicYear,
        Some(id),
    )
    .await;

    Ok(Json(academic_year))
}
