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
use crate::modules::courses::model::{Course, CourseFilterParams, CreateCourseDto, UpdateCourseDto};
use crate::modules::courses::service::CourseService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/courses",
    request_body = CreateCourseDto,
    responses(
        (status = 201, description = "Course created", body = Course),
        (status = 400, description = "Course code already exists or a reference is unknown", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, dto))]
pub async fn create_course(
    State(state): State<AppState>,
    RequireStaff(auth_user): RequireStaff,
    meta: RequestMeta,
    ValidatedJson(dto): ValidatedJson<CreateCourseDto>,
) -> Result<(StatusCode, Json<Course>), AppError> {
    let course = CourseService::create_course(&state.db, dto).await?;

    let actor = Actor::from_auth(&auth_user, meta);
    ActivityService::record_change(
        &state,
        &actor,
        ActivityAction::Create,
        ResourceType::Course,
        Some(course.id),
    )
    .await;

    Ok((StatusCode::CREATED, Json(course)))
}

/// List courses of a formation, teacher or academic year
#[utoipa::path(
    get,
    path = "/api/courses",
    params(CourseFilterParams),
    responses(
        (status = 200, description = "Courses", body = Paginated<Course>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state))]
pub async fn list_courses(
    State(state): State<AppState>,
    Query(filters): Query<CourseFilterParams>,
) -> Result<Json<Paginated<Course>>, AppError> {
    Ok(Json(CourseService::list_courses(&state.db, filters).await?))
}

#[utoipa::path(
    get,
    path = "/api/courses/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course", body = Course),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state))]
pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Course>, AppError> {
    Ok(Json(CourseService::get_course(&state.db, id).await?))
}

/// Update a course, including its teacher assignment
#[utoipa::path(
    put,
    path = "/api/courses/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    request_body = UpdateCourseDto,
    responses(
        (status = 200, description = "Course updated", body = Course),
        (status = 400, description = "Course code already exists or a reference is unknown", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, dto))]
pub async fn update_course(
    State(state): State<AppState>,
    RequireStaff(auth_user): RequireStaff,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateCourseDto>,
) -> Result<Json<Course>, AppError> {
    let course = CourseService::update_course(&state.db, id, dto).await?;

    let actor = Actor::from_auth(&auth_user, meta);
    ActivityService::record_change(
        &state,
        &actor,
        ActivityAction::Update,
        ResourceType::Course,
        Some(id),
    )
    .await;

    Ok(Json(course))
}

#[utoipa::path(
    delete,
    path = "/api/courses/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 204, description = "Course deleted"),
        (status = 400, description = "Course is still referenced", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state))]
pub async fn delete_course(
    State(state): State<AppState>,
    RequireStaff(auth_user): RequireStaff,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    CourseService::delete_course(&state.db, id).await?;

    let actor = Actor::from_auth(&auth_user, meta);
    ActivityService::record_change(
        &state,
        &actor,
        ActivityAction::Delete,
        ResourceType::Course,
        Some(id),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}
