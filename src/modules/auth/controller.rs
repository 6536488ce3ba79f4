use axum::{Json, extract::State, http::StatusCode};
use mesrs_core::{AppError, Msg};
use tracing::instrument;
use utoipa::ToSchema;

use crate::middleware::auth::AuthUser;
use crate::middleware::language::{RequestLanguage, RequestedLanguage};
use crate::middleware::request::RequestMeta;
use crate::modules::activity::{ActivityAction, ActivityService, Actor, ResourceType};
use crate::modules::auth::model::{
    AccessTokenResponse, AuthResponse, ChangePasswordRequest, ForgotPasswordRequest,
    MessageResponse, Profile, ProfileResponse, RefreshTokenRequest, ResetPasswordRequest,
    RoleCheckResponse, SignInRequest, SignUpRequest, UpdateProfileDto,
};
use crate::modules::auth::service::AuthService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[derive(ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Create a student account and open a session
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Email already registered", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn sign_up(
    State(state): State<AppState>,
    RequestLanguage(language): RequestLanguage,
    meta: RequestMeta,
    ValidatedJson(dto): ValidatedJson<SignUpRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let user = AuthService::sign_up(&state.db, dto, language).await?;

    let actor = Actor::new(Some(user.id), meta);
    ActivityService::record_change(
        &state,
        &actor,
        ActivityAction::Create,
        ResourceType::Profile,
        Some(user.id),
    )
    .await;

    let response =
        AuthService::issue_session(user, &state.jwt_config, Msg::SignUpSuccess.text(language))?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Sign in with email and password
#[utoipa::path(
    post,
    path = "/api/auth/signin",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 403, description = "Account disabled", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn sign_in(
    State(state): State<AppState>,
    RequestedLanguage(requested): RequestedLanguage,
    meta: RequestMeta,
    ValidatedJson(dto): ValidatedJson<SignInRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let response = AuthService::sign_in(&state.db, dto, &state.jwt_config, requested).await?;

    let actor = Actor::new(Some(response.user.id), meta);
    ActivityService::record_change(
        &state,
        &actor,
        ActivityAction::Login,
        ResourceType::Session,
        Some(response.user.id),
    )
    .await;

    Ok(Json(response))
}

/// Exchange a refresh token for a new access token
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "New access token", body = AccessTokenResponse),
        (status = 401, description = "Refresh token invalid, expired or revoked", body = ErrorResponse),
        (status = 403, description = "Account disabled", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn refresh(
    State(state): State<AppState>,
    RequestLanguage(language): RequestLanguage,
    ValidatedJson(dto): ValidatedJson<RefreshTokenRequest>,
) -> Result<Json<AccessTokenResponse>, AppError> {
    let response =
        AuthService::refresh(&state.db, &dto.refresh_token, &state.jwt_config, language).await?;
    Ok(Json(response))
}

/// Sign out by revoking the refresh token
#[utoipa::path(
    post,
    path = "/api/auth/signout",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Signed out", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn sign_out(
    State(state): State<AppState>,
    auth_user: AuthUser,
    RequestLanguage(language): RequestLanguage,
    meta: RequestMeta,
    ValidatedJson(dto): ValidatedJson<RefreshTokenRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let user_id = auth_user.user_id()?;
    AuthService::sign_out(
        &state.db,
        user_id,
        &dto.refresh_token,
        &state.jwt_config,
        language,
    )
    .await?;

    let actor = Actor::from_auth(&auth_user, meta);
    ActivityService::record_change(
        &state,
        &actor,
        ActivityAction::Logout,
        ResourceType::Session,
        Some(user_id),
    )
    .await;

    Ok(Json(MessageResponse::new(Msg::SignOutSuccess.text(language))))
}

/// Current session's user
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Signed-in user", body = Profile),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
#[instrument(skip(state))]
pub async fn get_session(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Profile>, AppError> {
    let user = AuthService::get_profile(&state.db, auth_user.user_id()?).await?;
    Ok(Json(user))
}

/// Role checks for the current user
#[utoipa::path(
    get,
    path = "/api/auth/role",
    responses(
        (status = 200, description = "Current role and role checks", body = RoleCheckResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
#[instrument(skip(state))]
pub async fn get_role(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<RoleCheckResponse>, AppError> {
    // Role as currently stored, not as issued in the token.
    let user = AuthService::get_profile(&state.db, auth_user.user_id()?).await?;
    Ok(Json(RoleCheckResponse::from(user.role)))
}

/// Request a password reset email
#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset link sent if the account exists", body = MessageResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn forgot_password(
    State(state): State<AppState>,
    RequestLanguage(language): RequestLanguage,
    ValidatedJson(dto): ValidatedJson<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    AuthService::forgot_password(&state.db, dto, &state.email_config).await?;
    Ok(Json(MessageResponse::new(
        Msg::PasswordResetSent.text(language),
    )))
}

/// Set a new password with a reset token
#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset", body = MessageResponse),
        (status = 400, description = "Unknown, used or expired token", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn reset_password(
    State(state): State<AppState>,
    RequestLanguage(language): RequestLanguage,
    meta: RequestMeta,
    ValidatedJson(dto): ValidatedJson<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let profile_id = AuthService::reset_password(&state.db, dto, language).await?;

    let actor = Actor::new(Some(profile_id), meta);
    ActivityService::record_change(
        &state,
        &actor,
        ActivityAction::PasswordReset,
        ResourceType::Profile,
        Some(profile_id),
    )
    .await;

    Ok(Json(MessageResponse::new(
        Msg::PasswordResetDone.text(language),
    )))
}

/// Current user's profile
#[utoipa::path(
    get,
    path = "/api/auth/profile",
    responses(
        (status = 200, description = "Profile", body = Profile),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Profile>, AppError> {
    let user = AuthService::get_profile(&state.db, auth_user.user_id()?).await?;
    Ok(Json(user))
}

/// Update the current user's profile
#[utoipa::path(
    put,
    path = "/api/auth/profile",
    request_body = UpdateProfileDto,
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn update_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    meta: RequestMeta,
    ValidatedJson(dto): ValidatedJson<UpdateProfileDto>,
) -> Result<Json<ProfileResponse>, AppError> {
    let user_id = auth_user.user_id()?;
    let user = AuthService::update_profile(&state.db, user_id, dto).await?;

    let actor = Actor::from_auth(&auth_user, meta);
    ActivityService::record_change(
        &state,
        &actor,
        ActivityAction::Update,
        ResourceType::Profile,
        Some(user_id),
    )
    .await;

    // A language switch applies to the confirmation itself.
    let message = Msg::ProfileUpdated.text(user.preferred_language).to_string();
    Ok(Json(ProfileResponse { user, message }))
}

/// Change the current user's password
#[utoipa::path(
    post,
    path = "/api/auth/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Current password is wrong", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn change_password(
    State(state): State<AppState>,
    auth_user: AuthUser,
    RequestLanguage(language): RequestLanguage,
    meta: RequestMeta,
    ValidatedJson(dto): ValidatedJson<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let user_id = auth_user.user_id()?;
    AuthService::change_password(&state.db, user_id, dto, language).await?;

    let actor = Actor::from_auth(&auth_user, meta);
    ActivityService::record_change(
        &state,
        &actor,
        ActivityAction::Update,
        ResourceType::Profile,
        Some(user_id),
    )
    .await;

    Ok(Json(MessageResponse::new(Msg::PasswordChanged.text(language))))
}
