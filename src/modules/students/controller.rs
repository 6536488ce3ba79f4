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
use crate::modules::students::model::{
    CreateStudentDto, Student, StudentFilterParams, UpdateStudentDto,
};
use crate::modules::students::service::StudentService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Create a student together with their account
#[utoipa::path(
    post,
    path = "/api/students",
    request_body = CreateStudentDto,
    responses(
        (status = 201, description = "Student created", body = Student),
        (status = 400, description = "Email, national ID or student number already exists", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state, dto))]
pub async fn create_student(
    State(state): State<AppState>,
    RequireStaff(auth_user): RequireStaff,
    meta: RequestMeta,
    ValidatedJson(dto): ValidatedJson<CreateStudentDto>,
) -> Result<(StatusCode, Json<Student>), AppError> {
    let student = StudentService::create_student(&state.db, dto).await?;

    let actor = Actor::from_auth(&auth_user, meta);
    ActivityService::record_change(
        &state,
        &actor,
        ActivityAction::Create,
        ResourceType::Student,
        Some(student.id),
    )
    .await;

    Ok((StatusCode::CREATED, Json(student)))
}

/// Search and filter students
#[utoipa::path(
    get,
    path = "/api/students",
    params(StudentFilterParams),
    responses(
        (status = 200, description = "Students, newest first", body = Paginated<Student>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn list_students(
    State(state): State<AppState>,
    Query(filters): Query<StudentFilterParams>,
) -> Result<Json<Paginated<Student>>, AppError> {
    Ok(Json(StudentService::list_students(&state.db, filters).await?))
}

#[utoipa::path(
    get,
    path = "/api/students/{id}",
    params(("id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student", body = Student),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Student>, AppError> {
    Ok(Json(StudentService::get_student(&state.db, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/students/{id}",
    params(("id" = Uuid, Path, description = "Student ID")),
    request_body = UpdateStudentDto,
    responses(
        (status = 200, description = "Student updated", body = Student),
        (status = 400, description = "Email, national ID or student number already exists", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state, dto))]
pub async fn update_student(
    State(state): State<AppState>,
    RequireStaff(auth_user): RequireStaff,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateStudentDto>,
) -> Result<Json<Student>, AppError> {
    let student = StudentService::update_student(&state.db, id, dto).await?;

    let actor = Actor::from_auth(&auth_user, meta);
    ActivityService::record_change(
        &state,
        &actor,
        ActivityAction::Update,
        ResourceType::Student,
        Some(id),
    )
    .await;

    Ok(Json(student))
}

/// Delete a student and their account
#[utoipa::path(
    delete,
    path = "/api/students/{id}",
    params(("id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 204, description = "Student deleted"),
        (status = 400, description = "Student is still referenced", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn delete_student(
    State(state): State<AppState>,
    RequireStaff(auth_user): RequireStaff,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    StudentService::delete_student(&state.db, id).await?;

    let actor = Actor::from_auth(&auth_user, meta);
    ActivityService::record_change(
        &state,
        &actor,
        ActivityAction::Delete,
        ResourceType::Student,
        Some(id),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

/// Student record of the signed-in user
#[utoipa::path(
    get,
    path = "/api/students/me",
    responses(
        (status = 200, description = "Own student record", body = Student),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "No student record for this account", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn get_my_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Student>, AppError> {
    StudentService::find_by_profile(&state.db, auth_user.user_id()?)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Student not found")))
}
