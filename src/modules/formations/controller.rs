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
use crate::modules::formations::model::{
    CreateFormationDto, Formation, FormationFilterParams, UpdateFormationDto,
};
use crate::modules::formations::service::FormationService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Create a formation in a university
#[utoipa::path(
    post,
    path = "/api/formations",
    request_body = CreateFormationDto,
    responses(
        (status = 201, description = "Formation created", body = Formation),
        (status = 400, description = "Formation code already exists or university not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Formations"
)]
#[instrument(skip(state, dto))]
pub async fn create_formation(
    State(state): State<AppState>,
    RequireStaff(auth_user): RequireStaff,
    meta: RequestMeta,
    ValidatedJson(dto): ValidatedJson<CreateFormationDto>,
) -> Result<(StatusCode, Json<Formation>), AppError> {
    let formation = FormationService::create_formation(&state.db, dto).await?;

    let actor = Actor::from_auth(&auth_user, meta);
    ActivityService::record_change(
        &state,
        &actor,
        ActivityAction::Create,
        ResourceType::Formation,
        Some(formation.id),
    )
    .await;

    Ok((StatusCode::CREATED, Json(formation)))
}

/// List formations, filtered by university, level or status
#[utoipa::path(
    get,
    path = "/api/formations",
    params(FormationFilterParams),
    responses(
        (status = 200, description = "Formations", body = Paginated<Formation>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Formations"
)]
#[instrument(skip(state))]
pub async fn list_formations(
    State(state): State<AppState>,
    Query(filters): Query<FormationFilterParams>,
) -> Result<Json<Paginated<Formation>>, AppError> {
    Ok(Json(FormationService::list_formations(&state.db, filters).await?))
}

#[utoipa::path(
    get,
    path = "/api/formations/{id}",
    params(("id" = Uuid, Path, description = "Formation ID")),
    responses(
        (status = 200, description = "Formation", body = Formation),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Formation not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Formations"
)]
#[instrument(skip(state))]
pub async fn get_formation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Formation>, AppError> {
    Ok(Json(FormationService::get_formation(&state.db, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/formations/{id}",
    params(("id" = Uuid, Path, description = "Formation ID")),
    request_body = UpdateFormationDto,
    responses(
        (status = 200, description = "Formation updated", body = Formation),
        (status = 400, description = "Formation code already exists or university not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Formation not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Formations"
)]
#[instrument(skip(state, dto))]
pub async fn update_formation(
    State(state): State<AppState>,
    RequireStaff(auth_user): RequireStaff,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateFormationDto>,
) -> Result<Json<Formation>, AppError> {
    let formation = FormationService::update_formation(&state.db, id, dto).await?;

    let actor = Actor::from_auth(&auth_user, meta);
    ActivityService::record_change(
        &state,
        &actor,
        ActivityAction::Update,
        ResourceType::Formation,
        Some(id),
    )
    .await;

    Ok(Json(formation))
}

#[utoipa::path(
    delete,
    path = "/api/formations/{id}",
    params(("id" = Uuid, Path, description = "Formation ID")),
    responses(
        (status = 204, description = "Formation deleted"),
        (status = 400, description = "Formation is still referenced", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Formation not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Formations"
)]
#[instrument(skip(state))]
pub async fn delete_formation(
    State(state): State<AppState>,
    RequireStaff(auth_user): RequireStaff,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    FormationService::delete_formation(&state.db, id).await?;

    let actor = Actor::from_auth(&auth_user, meta);
    ActivityService::record_change(
        &state,
        &actor,
        ActivityAction::Delete,
        ResourceType::Formation,
        Some(id),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}
