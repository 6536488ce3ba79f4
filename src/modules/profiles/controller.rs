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
use crate::modules::profiles::model::{
    AdminUpdateProfileDto, CreateProfileDto, Profile, ProfileFilterParams,
};
use crate::modules::profiles::service::ProfileService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Create a user account with any role (admin only)
#[utoipa::path(
    post,
    path = "/api/profiles",
    request_body = CreateProfileDto,
    responses(
        (status = 201, description = "Profile created", body = Profile),
        (status = 400, description = "Email or national ID already exists", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Profiles"
)]
#[instrument(skip(state, dto))]
pub async fn create_profile(
    State(state): State<AppState>,
    RequireAdmin(auth_user): RequireAdmin,
    meta: RequestMeta,
    ValidatedJson(dto): ValidatedJson<CreateProfileDto>,
) -> Result<(StatusCode, Json<Profile>), AppError> {
    let profile = ProfileService::create_profile(&state.db, dto).await?;

    let actor = Actor::from_auth(&auth_user, meta);
    ActivityService::record_change(
        &state,
        &actor,
        ActivityAction::Create,
        ResourceType::Profile,
        Some(profile.id),
    )
    .await;

    Ok((StatusCode::CREATED, Json(profile)))
}

/// List user accounts (admin only)
#[utoipa::path(
    get,
    path = "/api/profiles",
    params(ProfileFilterParams),
    responses(
        (status = 200, description = "Profiles", body = Paginated<Profile>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Profiles"
)]
#[instrument(skip(state))]
pub async fn list_profiles(
    State(state): State<AppState>,
    RequireAdmin(_auth_user): RequireAdmin,
    Query(filters): Query<ProfileFilterParams>,
) -> Result<Json<Paginated<Profile>>, AppError> {
    Ok(Json(ProfileService::list_profiles(&state.db, filters).await?))
}

#[utoipa::path(
    get,
    path = "/api/profiles/{id}",
    params(("id" = Uuid, Path, description = "Profile ID")),
    responses(
        (status = 200, description = "Profile", body = Profile),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Profile not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Profiles"
)]
#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    RequireAdmin(_auth_user): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<Profile>, AppError> {
    Ok(Json(ProfileService::get_profile(&state.db, id).await?))
}

/// Update any account, including role and activation (admin only)
#[utoipa::path(
    put,
    path = "/api/profiles/{id}",
    params(("id" = Uuid, Path, description = "Profile ID")),
    request_body = AdminUpdateProfileDto,
    responses(
        (status = 200, description = "Profile updated", body = Profile),
        (status = 400, description = "Email or national ID already exists", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Profile not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Profiles"
)]
#[instrument(skip(state, dto))]
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAdmin(auth_user): RequireAdmin,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<AdminUpdateProfileDto>,
) -> Result<Json<Profile>, AppError> {
    let profile = ProfileService::update_profile(&state.db, id, dto).await?;

    let actor = Actor::from_auth(&auth_user, meta);
    ActivityService::record_change(
        &state,
        &actor,
        ActivityAction::Update,
        ResourceType::Profile,
        Some(id),
    )
    .await;

    Ok(Json(profile))
}

#[utoipa::path(
    delete,
    path = "/api/profiles/{id}",
    params(("id" = Uuid, Path, description = "Profile ID")),
    responses(
        (status = 204, description = "Profile deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Profile not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Profiles"
)]
#[instrument(skip(state))]
pub async fn delete_profile(
    State(state): State<AppState>,
    RequireAdmin(auth_user): RequireAdmin,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if auth_user.user_id()? == id {
        return Err(AppError::bad_request(anyhow::anyhow!(
            "You cannot delete your own account"
        )));
    }

    ProfileService::delete_profile(&state.db, id).await?;

    let actor = Actor::from_auth(&auth_user, meta);
    ActivityService::record_change(
        &state,
        &actor,
        ActivityAction::Delete,
        ResourceType::Profile,
        Some(id),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}
