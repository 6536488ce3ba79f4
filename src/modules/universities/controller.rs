use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use mesrs_core::{AppError, Paginated};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::request::RequestMeta;
use crate::middleware::role::RequireAdmin;
use crate::modules::activity::{ActivityAction, ActivityService, Actor, ResourceType};
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::universities::model::{
    CreateUniversityDto, University, UniversityFilterParams, UniversityWithStats,
    UpdateUniversityDto,
};
use crate::modules::universities::service::UniversityService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Create a university (admin only)
#[utoipa::path(
    post,
    path = "/api/universities",
    request_body = CreateUniversityDto,
    responses(
        (status = 201, description = "University created", body = University),
        (status = 400, description = "University code already exists", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Universities"
)]
#[instrument(skip(state, dto))]
pub async fn create_university(
    State(state): State<AppState>,
    RequireAdmin(auth_user): RequireAdmin,
    meta: RequestMeta,
    ValidatedJson(dto): ValidatedJson<CreateUniversityDto>,
) -> Result<(StatusCode, Json<University>), AppError> {
    let university = UniversityService::create_university(&state.db, dto).await?;

    let actor = Actor::from_auth(&auth_user, meta);
    ActivityService::record_change(
        &state,
        &actor,
        ActivityAction::Create,
        ResourceType::University,
        Some(university.id),
    )
    .await;

    Ok((StatusCode::CREATED, Json(university)))
}

/// List universities with their headcounts
#[utoipa::path(
    get,
    path = "/api/universities",
    params(UniversityFilterParams),
    responses(
        (status = 200, description = "Universities with student, teacher and formation counts", body = Paginated<UniversityWithStats>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Universities"
)]
#[instrument(skip(state))]
pub async fn list_universities(
    State(state): State<AppState>,
    Query(filters): Query<UniversityFilterParams>,
) -> Result<Json<Paginated<UniversityWithStats>>, AppError> {
    Ok(Json(UniversityService::list_universities(&state.db, filters).await?))
}

#[utoipa::path(
    get,
    path = "/api/universities/{id}",
    params(("id" = Uuid, Path, description = "University ID")),
    responses(
        (status = 200, description = "University", body = UniversityWithStats),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "University not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Universities"
)]
#[instrument(skip(state))]
pub async fn get_university(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UniversityWithStats>, AppError> {
    Ok(Json(UniversityService::get_university(&state.db, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/universities/{id}",
    params(("id" = Uuid, Path, description = "University ID")),
    request_body = UpdateUniversityDto,
    responses(
        (status = 200, description = "University updated", body = University),
        (status = 400, description = "University code already exists", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "University not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Universities"
)]
#[instrument(skip(state, dto))]
pub async fn update_university(
    State(state): State<AppState>,
    RequireAdmin(auth_user): RequireAdmin,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateUniversityDto>,
) -> Result<Json<University>, AppError> {
    let university = UniversityService::update_university(&state.db, id, dto).await?;

    let actor = Actor::from_auth(&auth_user, meta);
    ActivityService::record_change(
        &state,
        &actor,
        ActivityAction::Update,
        ResourceType::University,
        Some(id),
    )
    .await;

    Ok(Json(university))
}

/// Delete a university without formations, students or teachers
#[utoipa::path(
    delete,
    path = "/api/universities/{id}",
    params(("id" = Uuid, Path, description = "University ID")),
    responses(
        (status = 204, description = "University deleted"),
        (status = 400, description = "University is still referenced", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "University not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Universities"
)]
#[instrument(skip(state))]
pub async fn delete_university(
    State(state): State<AppState>,
    RequireAdmin(auth_user): RequireAdmin,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    UniversityService::delete_university(&state.db, id).await?;

    let actor = Actor::from_auth(&auth_user, meta);
    ActivityService::record_change(
        &state,
        &actor,
        ActivityAction::Delete,
        ResourceType::University,
        Some(id),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}
