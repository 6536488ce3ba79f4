use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use mesrs_core::{AppError, Paginated};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::request::RequestMeta;
use crate::middleware::role::RequireStaff;
use crate::modules::activity::{ActivityAction, ActivityService, Actor, ResourceType};
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::teachers::model::{
    CreateTeacherDto, Teacher, TeacherFilterParams, UpdateTeacherDto,
};
use crate::modules::teachers::service::TeacherService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Create a teacher together with their account
#[utoipa::path(
    post,
    path = "/api/teachers",
    request_body = CreateTeacherDto,
    responses(
        (status = 201, description = "Teacher created", body = Teacher),
        (status = 400, description = "Email, national ID or employee number already exists", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Teachers"
)]
#[instrument(skip(state, dto))]
pub async fn create_teacher(
    State(state): State<AppState>,
    RequireStaff(auth_user): RequireStaff,
    meta: RequestMeta,
    ValidatedJson(dto): ValidatedJson<CreateTeacherDto>,
) -> Result<(StatusCode, Json<Teacher>), AppError> {
    let teacher = TeacherService::create_teacher(&state.db, dto).await?;

    let actor = Actor::from_auth(&auth_user, meta);
    ActivityService::record_change(
        &state,
        &actor,
        ActivityAction::Create,
        ResourceType::Teacher,
        Some(teacher.id),
    )
    .await;

    Ok((StatusCode::CREATED, Json(teacher)))
}

/// Search and filter teachers
#[utoipa::path(
    get,
    path = "/api/teachers",
    params(TeacherFilterParams),
    responses(
        (status = 200, description = "Teachers", body = Paginated<Teacher>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Teachers"
)]
#[instrument(skip(state))]
pub async fn list_teachers(
    State(state): State<AppState>,
    Query(filters): Query<TeacherFilterParams>,
) -> Result<Json<Paginated<Teacher>>, AppError> {
    Ok(Json(TeacherService::list_teachers(&state.db, filters).await?))
}

#[utoipa::path(
    get,
    path = "/api/teachers/{id}",
    params(("id" = Uuid, Path, description = "Teacher ID")),
    responses(
        (status = 200, description = "Teacher", body = Teacher),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Teacher not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Teachers"
)]
#[instrument(skip(state))]
pub async fn get_teacher(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Teacher>, AppError> {
    Ok(Json(TeacherService::get_teacher(&state.db, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/teachers/{id}",
    params(("id" = Uuid, Path, description = "Teacher ID")),
    request_body = UpdateTeacherDto,
    responses(
        (status = 200, description = "Teacher updated", body = Teacher),
        (status = 400, description = "Email, national ID or employee number already exists", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Teacher not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Teachers"
)]
#[instrument(skip(state, dto))]
pub async fn update_teacher(
    State(state): State<AppState>,
    RequireStaff(auth_user): RequireStaff,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateTeacherDto>,
) -> Result<Json<Teacher>, AppError> {
    let teacher = TeacherService::update_teacher(&state.db, id, dto).await?;

    let actor = Actor::from_auth(&auth_user, meta);
    ActivityService::record_change(
        &state,
        &actor,
        ActivityAction::Update,
        ResourceType::Teacher,
        Some(id),
    )
    .await;

    Ok(Json(teacher))
}

#[utoipa::path(
    delete,
    path = "/api/teachers/{id}",
    params(("id" = Uuid, Path, description = "Teacher ID")),
    responses(
        (status = 204, description = "Teacher deleted"),
        (status = 400, description = "Teacher is still referenced", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Teacher not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Teachers"
)]
#[instrument(skip(state))]
pub async fn delete_teacher(
    State(state): State<AppState>,
    RequireStaff(auth_user): RequireStaff,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    TeacherService::delete_teacher(&state.db, id).await?;

    let actor = Actor::from_auth(&auth_user, meta);
    ActivityService::record_change(
        &state,
        &actor,
        ActivityAction::Delete,
        ResourceType::Teacher,
        Some(id),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}
