use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use mesrs_auth::Role;
use mesrs_core::{AppError, Paginated};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::middleware::request::RequestMeta;
use crate::middleware::role::RequireStaff;
use crate::modules::activity::{ActivityAction, ActivityService, Actor, ResourceType};
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::scholarships::model::{
    ApplicationDecisionDto, ApplicationFilterParams, ApplicationStatus, CreateApplicationDto,
    CreateScholarshipDto, Scholarship, ScholarshipApplication, ScholarshipFilterParams,
    UpdateScholarshipDto,
};
use crate::modules::scholarships::service::ScholarshipService;
use crate::modules::students::service::StudentService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/scholarships",
    request_body = CreateScholarshipDto,
    responses(
        (status = 201, description = "Scholarship created", body = Scholarship),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Scholarships"
)]
#[instrument(skip(state, dto))]
pub async fn create_scholarship(
    State(state): State<AppState>,
    RequireStaff(auth_user): RequireStaff,
    meta: RequestMeta,
    ValidatedJson(dto): ValidatedJson<CreateScholarshipDto>,
) -> Result<(StatusCode, Json<Scholarship>), AppError> {
    let scholarship = ScholarshipService::create_scholarship(&state.db, dto).await?;

    let actor = Actor::from_auth(&auth_user, meta);
    ActivityService::record_change(
        &state,
        &actor,
        ActivityAction::Create,
        ResourceType::Scholarship,
        Some(scholarship.id),
    )
    .await;

    Ok((StatusCode::CREATED, Json(scholarship)))
}

#[utoipa::path(
    get,
    path = "/api/scholarships",
    params(ScholarshipFilterParams),
    responses(
        (status = 200, description = "Scholarship programs matching the filters", body = Paginated<Scholarship>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Scholarships"
)]
#[instrument(skip(state))]
pub async fn list_scholarships(
    State(state): State<AppState>,
    Query(filters): Query<ScholarshipFilterParams>,
) -> Result<Json<Paginated<Scholarship>>, AppError> {
    Ok(Json(ScholarshipService::list_scholarships(&state.db, filters).await?))
}

#[utoipa::path(
    get,
    path = "/api/scholarships/{id}",
    params(("id" = Uuid, Path, description = "Scholarship ID")),
    responses(
        (status = 200, description = "Scholarship", body = Scholarship),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Scholarship not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Scholarships"
)]
#[instrument(skip(state))]
pub async fn get_scholarship(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Scholarship>, AppError> {
    Ok(Json(ScholarshipService::get_scholarship(&state.db, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/scholarships/{id}",
    params(("id" = Uuid, Path, description = "Scholarship ID")),
    request_body = UpdateScholarshipDto,
    responses(
        (status = 200, description = "Scholarship updated", body = Scholarship),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Scholarship not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Scholarships"
)]
#[instrument(skip(state, dto))]
pub async fn update_scholarship(
    State(state): State<AppState>,
    RequireStaff(auth_user): RequireStaff,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateScholarshipDto>,
) -> Result<Json<Scholarship>, AppError> {
    let scholarship = ScholarshipService::update_scholarship(&state.db, id, dto).await?;

    let actor = Actor::from_auth(&auth_user, meta);
    ActivityService::record_change(
        &state,
        &actor,
        ActivityAction::Update,
        ResourceType::Scholarship,
        Some(id),
    )
    .await;

    Ok(Json(scholarship))
}

#[utoipa::path(
    delete,
    path = "/api/scholarships/{id}",
    params(("id" = Uuid, Path, description = "Scholarship ID")),
    responses(
        (status = 204, description = "Scholarship deleted"),
        (status = 400, description = "Scholarship is still referenced", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Scholarship not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Scholarships"
)]
#[instrument(skip(state))]
pub async fn delete_scholarship(
    State(state): State<AppState>,
    RequireStaff(auth_user): RequireStaff,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    ScholarshipService::delete_scholarship(&state.db, id).await?;

    let actor = Actor::from_auth(&auth_user, meta);
    ActivityService::record_change(
        &state,
        &actor,
        ActivityAction::Delete,
        ResourceType::Scholarship,
        Some(id),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

/// Applies for a scholarship.
///
/// Students always apply for themselves. Staff must name the student.
#[utoipa::path(
    post,
    path = "/api/scholarship-applications",
    request_body = CreateApplicationDto,
    responses(
        (status = 201, description = "Application filed", body = ScholarshipApplication),
        (status = 400, description = "Already applied or student missing", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Scholarship not found", body = ErrorResponse),
        (status = 422, description = "Scholarship closed or validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Scholarships"
)]
#[instrument(skip(state, dto))]
pub async fn create_application(
    State(state): State<AppState>,
    auth_user: AuthUser,
    meta: RequestMeta,
    ValidatedJson(dto): ValidatedJson<CreateApplicationDto>,
) -> Result<(StatusCode, Json<ScholarshipApplication>), AppError> {
    let student_id = match auth_user.role() {
        Role::Student => {
            StudentService::find_by_profile(&state.db, auth_user.user_id()?)
                .await?
                .ok_or_else(|| AppError::forbidden("No student record for this account"))?
                .id
        }
        Role::Admin | Role::Staff => dto.student_id.ok_or_else(|| {
            AppError::bad_request(anyhow::anyhow!("student_id is required"))
        })?,
        Role::Teacher => {
            return Err(AppError::forbidden(
                "Only students and staff can file applications",
            ));
        }
    };

    let application = ScholarshipService::create_application(
        &state.db,
        dto.scholarship_id,
        student_id,
        dto.motivation_letter,
    )
    .await?;

    let actor = Actor::from_auth(&auth_user, meta);
    ActivityService::record_change(
        &state,
        &actor,
        ActivityAction::Create,
        ResourceType::ScholarshipApplication,
        Some(application.id),
    )
    .await;

    Ok((StatusCode::CREATED, Json(application)))
}

#[utoipa::path(
    get,
    path = "/api/scholarship-applications",
    params(ApplicationFilterParams),
    responses(
        (status = 200, description = "Applications matching the filters", body = Paginated<ScholarshipApplication>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Scholarships"
)]
#[instrument(skip(state))]
pub async fn list_applications(
    State(state): State<AppState>,
    Query(filters): Query<ApplicationFilterParams>,
) -> Result<Json<Paginated<ScholarshipApplication>>, AppError> {
    Ok(Json(
        ScholarshipService::list_applications(&state.db, filters).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/scholarship-applications/{id}",
    params(("id" = Uuid, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Application", body = ScholarshipApplication),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Application not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Scholarships"
)]
#[instrument(skip(state))]
pub async fn get_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ScholarshipApplication>, AppError> {
    Ok(Json(ScholarshipService::get_application(&state.db, id).await?))
}

/// Approves or rejects a pending application.
#[utoipa::path(
    post,
    path = "/api/scholarship-applications/{id}/decision",
    params(("id" = Uuid, Path, description = "Application ID")),
    request_body = ApplicationDecisionDto,
    responses(
        (status = 200, description = "Decision recorded", body = ScholarshipApplication),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Application not found", body = ErrorResponse),
        (status = 422, description = "Already decided or no places left", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Scholarships"
)]
#[instrument(skip(state, dto))]
pub async fn decide_application(
    State(state): State<AppState>,
    RequireStaff(auth_user): RequireStaff,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<ApplicationDecisionDto>,
) -> Result<Json<ScholarshipApplication>, AppError> {
    let action = match dto.status {
        ApplicationStatus::Approved => ActivityAction::Approve,
        _ => ActivityAction::Reject,
    };
    let application =
        ScholarshipService::decide(&state.db, id, dto, auth_user.user_id()?).await?;

    let actor = Actor::from_auth(&auth_user, meta);
    ActivityService::record_change(
        &state,
        &actor,
        action,
        ResourceType::ScholarshipApplication,
        Some(id),
    )
    .await;

    Ok(Json(application))
}
