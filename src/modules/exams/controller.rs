use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use mesrs_core::{AppError, Paginated, PaginationParams};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::request::RequestMeta;
use crate::middleware::role::{RequireStaff, RequireTeacher};
use crate::modules::activity::{ActivityAction, ActivityService, Actor, ResourceType};
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::exams::model::{
    CreateExamDto, CreateExamResultDto, Exam, ExamFilterParams, ExamResult, UpdateExamDto,
    UpdateExamResultDto,
};
use crate::modules::exams::service::ExamService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Schedules an exam for a course.
#[utoipa::path(
    post,
    path = "/api/exams",
    request_body = CreateExamDto,
    responses(
        (status = 201, description = "Exam created", body = Exam),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Exams"
)]
#[instrument(skip(state, dto))]
pub async fn create_exam(
    State(state): State<AppState>,
    RequireStaff(auth_user): RequireStaff,
    meta: RequestMeta,
    ValidatedJson(dto): ValidatedJson<CreateExamDto>,
) -> Result<(StatusCode, Json<Exam>), AppError> {
    let exam = ExamService::create_exam(&state.db, dto).await?;

    let actor = Actor::from_auth(&auth_user, meta);
    ActivityService::record_change(
        &state,
        &actor,
        ActivityAction::Create,
        ResourceType::Exam,
        Some(exam.id),
    )
    .await;

    Ok((StatusCode::CREATED, Json(exam)))
}

#[utoipa::path(
    get,
    path = "/api/exams",
    params(ExamFilterParams),
    responses(
        (status = 200, description = "Exams matching the filters", body = Paginated<Exam>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Exams"
)]
#[instrument(skip(state))]
pub async fn list_exams(
    State(state): State<AppState>,
    Query(filters): Query<ExamFilterParams>,
) -> Result<Json<Paginated<Exam>>, AppError> {
    Ok(Json(ExamService::list_exams(&state.db, filters).await?))
}

#[utoipa::path(
    get,
    path = "/api/exams/{id}",
    params(("id" = Uuid, Path, description = "Exam ID")),
    responses(
        (status = 200, description = "Exam", body = Exam),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Exam not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Exams"
)]
#[instrument(skip(state))]
pub async fn get_exam(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Exam>, AppError> {
    Ok(Json(ExamService::get_exam(&state.db, id).await?))
}

/// Lowering `max_score` below an already recorded score is rejected.
#[utoipa::path(
    put,
    path = "/api/exams/{id}",
    params(("id" = Uuid, Path, description = "Exam ID")),
    request_body = UpdateExamDto,
    responses(
        (status = 200, description = "Exam updated", body = Exam),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Exam not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Exams"
)]
#[instrument(skip(state, dto))]
pub async fn update_exam(
    State(state): State<AppState>,
    RequireStaff(auth_user): RequireStaff,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateExamDto>,
) -> Result<Json<Exam>, AppError> {
    let exam = ExamService::update_exam(&state.db, id, dto).await?;

    let actor = Actor::from_auth(&auth_user, meta);
    ActivityService::record_change(
        &state,
        &actor,
        ActivityAction::Update,
        ResourceType::Exam,
        Some(id),
    )
    .await;

    Ok(Json(exam))
}

#[utoipa::path(
    delete,
    path = "/api/exams/{id}",
    params(("id" = Uuid, Path, description = "Exam ID")),
    responses(
        (status = 204, description = "Exam deleted"),
        (status = 400, description = "Exam is still referenced", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Exam not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Exams"
)]
#[instrument(skip(state))]
pub async fn delete_exam(
    State(state): State<AppState>,
    RequireStaff(auth_user): RequireStaff,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    ExamService::delete_exam(&state.db, id).await?;

    let actor = Actor::from_auth(&auth_user, meta);
    ActivityService::record_change(
        &state,
        &actor,
        ActivityAction::Delete,
        ResourceType::Exam,
        Some(id),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/exams/{id}/results",
    params(("id" = Uuid, Path, description = "Exam ID"), PaginationParams),
    responses(
        (status = 200, description = "Results recorded for the exam", body = Paginated<ExamResult>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Exam not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Exams"
)]
#[instrument(skip(state))]
pub async fn list_exam_results(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<Paginated<ExamResult>>, AppError> {
    Ok(Json(ExamService::list_results(&state.db, id, pagination).await?))
}

/// Records a student's score. `is_passed` is derived from the score when omitted.
#[utoipa::path(
    post,
    path = "/api/exams/{id}/results",
    params(("id" = Uuid, Path, description = "Exam ID")),
    request_body = CreateExamResultDto,
    responses(
        (status = 201, description = "Result recorded", body = ExamResult),
        (status = 400, description = "Student already has a result for this exam", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Exam not found", body = ErrorResponse),
        (status = 422, description = "Score out of range", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Exams"
)]
#[instrument(skip(state, dto))]
pub async fn create_exam_result(
    State(state): State<AppState>,
    RequireTeacher(auth_user): RequireTeacher,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<CreateExamResultDto>,
) -> Result<(StatusCode, Json<ExamResult>), AppError> {
    let result = ExamService::create_result(&state.db, id, dto).await?;

    let actor = Actor::from_auth(&auth_user, meta);
    ActivityService::record_change(
        &state,
        &actor,
        ActivityAction::Create,
        ResourceType::ExamResult,
        Some(result.id),
    )
    .await;

    Ok((StatusCode::CREATED, Json(result)))
}

#[utoipa::path(
    put,
    path = "/api/exam-results/{id}",
    params(("id" = Uuid, Path, description = "Exam result ID")),
    request_body = UpdateExamResultDto,
    responses(
        (status = 200, description = "Result updated", body = ExamResult),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Exam result not found", body = ErrorResponse),
        (status = 422, description = "Score out of range", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Exams"
)]
#[instrument(skip(state, dto))]
pub async fn update_exam_result(
    State(state): State<AppState>,
    RequireTeacher(auth_user): RequireTeacher,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateExamResultDto>,
) -> Result<Json<ExamResult>, AppError> {
    let result = ExamService::update_result(&state.db, id, dto).await?;

    let actor = Actor::from_auth(&auth_user, meta);
    ActivityService::record_change(
        &state,
        &actor,
        ActivityAction::Update,
        ResourceType::ExamResult,
        Some(id),
    )
    .await;

    Ok(Json(result))
}

#[utoipa::path(
    delete,
    path = "/api/exam-results/{id}",
    params(("id" = Uuid, Path, description = "Exam result ID")),
    responses(
        (status = 204, description = "Result deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Exam result not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Exams"
)]
#[instrument(skip(state))]
pub async fn delete_exam_result(
    State(state): State<AppState>,
    RequireTeacher(auth_user): RequireTeacher,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    ExamService::delete_result(&state.db, id).await?;

    let actor = Actor::from_auth(&auth_user, meta);
    ActivityService::record_change(
        &state,
        &actor,
        ActivityAction::Delete,
        ResourceType::ExamResult,
        Some(id),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}
