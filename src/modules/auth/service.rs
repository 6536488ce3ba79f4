use chrono::{DateTime, Duration, Utc};
use mesrs_auth::{Role, create_access_token, create_refresh_token, verify_refresh_token};
use mesrs_config::{EmailConfig, JwtConfig};
use mesrs_core::{AppError, Language, Msg, hash_password, verify_password};
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::metrics::{track_jwt_issued, track_login};
use crate::modules::auth::model::{
    AccessTokenResponse, AuthResponse, ChangePasswordRequest, ForgotPasswordRequest, Profile,
    ResetPasswordRequest, SignInRequest, SignUpRequest, UpdateProfileDto,
};
use crate::utils::email::EmailService;
use mesrs_models::PROFILE_COLUMNS;

/// Reset links stay valid for one hour.
const RESET_TOKEN_TTL_MINUTES: i64 = 60;

#[derive(sqlx::FromRow)]
struct ProfileWithPassword {
    #[sqlx(flatten)]
    profile: Profile,
    password_hash: String,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Hex sha256 of a reset token, as stored in `password_reset_tokens`.
pub fn hash_reset_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

fn generate_reset_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub struct AuthService;

impl AuthService {
    /// Public sign-up always creates a student account.
    #[instrument(skip(db, dto), fields(email = %dto.email))]
    pub async fn sign_up(
        db: &PgPool,
        dto: SignUpRequest,
        language: Language,
    ) -> Result<Profile, AppError> {
        let email = normalize_email(&dto.email);

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM profiles WHERE email = $1)")
                .bind(&email)
                .fetch_one(db)
                .await?;
        if exists {
            return Err(
                AppError::bad_request(anyhow::anyhow!(Msg::EmailTaken.text(language)))
                    .localized(language),
            );
        }

        let password_hash = hash_password(&dto.password)?;

        let query = format!(
            r#"INSERT INTO profiles (email, password_hash, first_name, last_name, role, preferred_language)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING {PROFILE_COLUMNS}"#
        );

        sqlx::query_as::<_, Profile>(&query)
            .bind(&email)
            .bind(&password_hash)
            .bind(dto.first_name.trim())
            .bind(dto.last_name.trim())
            .bind(Role::Student)
            .bind(language)
            .fetch_one(db)
            .await
            .map_err(|e| AppError::from_write(e, Msg::EmailTaken.text(language)).localized(language))
    }

    /// Verifies credentials and issues an access/refresh token pair.
    ///
    /// The response message uses `requested` when the client asked for a
    /// language, otherwise the profile's stored preference.
    #[instrument(skip(db, dto, jwt_config), fields(email = %dto.email))]
    pub async fn sign_in(
        db: &PgPool,
        dto: SignInRequest,
        jwt_config: &JwtConfig,
        requested: Option<Language>,
    ) -> Result<AuthResponse, AppError> {
        let email = normalize_email(&dto.email);
        let fallback = requested.unwrap_or_default();
        let invalid = || {
            AppError::unauthorized(Msg::InvalidCredentials.text(fallback)).localized(fallback)
        };

        let query = format!("SELECT {PROFILE_COLUMNS}, password_hash FROM profiles WHERE email = $1");
        let Some(row) = sqlx::query_as::<_, ProfileWithPassword>(&query)
            .bind(&email)
            .fetch_optional(db)
            .await?
        else {
            track_login("unknown", false);
            return Err(invalid());
        };

        if !verify_password(&dto.password, &row.password_hash)? {
            track_login(row.profile.role.as_str(), false);
            return Err(invalid());
        }

        let user = row.profile;
        let language = requested.unwrap_or(user.preferred_language);

        if !user.is_active {
            track_login(user.role.as_str(), false);
            return Err(
                AppError::forbidden(Msg::AccountDisabled.text(language)).localized(language)
            );
        }

        track_login(user.role.as_str(), true);
        Self::issue_session(user, jwt_config, Msg::SignInSuccess.text(language))
    }

    /// Builds the token pair returned by sign-up and sign-in.
    pub fn issue_session(
        user: Profile,
        jwt_config: &JwtConfig,
        message: &str,
    ) -> Result<AuthResponse, AppError> {
        let access_token = create_access_token(
            user.id,
            &user.email,
            user.role,
            user.preferred_language,
            jwt_config,
        )?;
        let (refresh_token, _) = create_refresh_token(user.id, &user.email, jwt_config)?;
        track_jwt_issued();

        Ok(AuthResponse {
            access_token,
            refresh_token,
            expires_in: jwt_config.access_token_expiry,
            user,
            message: message.to_string(),
        })
    }

    /// Issues a new access token unless the refresh token has been revoked
    /// or its profile deactivated.
    #[instrument(skip(db, refresh_token, jwt_config))]
    pub async fn refresh(
        db: &PgPool,
        refresh_token: &str,
        jwt_config: &JwtConfig,
        language: Language,
    ) -> Result<AccessTokenResponse, AppError> {
        let expired =
            || AppError::unauthorized(Msg::SessionExpired.text(language)).localized(language);

        let claims = verify_refresh_token(refresh_token, jwt_config).map_err(|_| expired())?;

        let revoked: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE jti = $1)")
                .bind(&claims.jti)
                .fetch_one(db)
                .await?;
        if revoked {
            return Err(expired());
        }

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| expired())?;
        let user = Self::get_profile(db, user_id)
            .await
            .map_err(|_| expired())?;
        if !user.is_active {
            return Err(
                AppError::forbidden(Msg::AccountDisabled.text(language)).localized(language)
            );
        }

        let access_token = create_access_token(
            user.id,
            &user.email,
            user.role,
            user.preferred_language,
            jwt_config,
        )?;
        track_jwt_issued();

        Ok(AccessTokenResponse {
            access_token,
            expires_in: jwt_config.access_token_expiry,
        })
    }

    /// Revokes the refresh token's `jti`. Signing out twice is not an error.
    #[instrument(skip(db, refresh_token, jwt_config))]
    pub async fn sign_out(
        db: &PgPool,
        user_id: Uuid,
        refresh_token: &str,
        jwt_config: &JwtConfig,
        language: Language,
    ) -> Result<(), AppError> {
        let expired =
            || AppError::unauthorized(Msg::SessionExpired.text(language)).localized(language);

        let claims = verify_refresh_token(refresh_token, jwt_config).map_err(|_| expired())?;
        if claims.sub != user_id.to_string() {
            return Err(expired());
        }

        let expires_at = DateTime::<Utc>::from_timestamp(claims.exp as i64, 0)
            .unwrap_or_else(Utc::now);

        sqlx::query(
            r#"INSERT INTO revoked_tokens (jti, profile_id, expires_at)
               VALUES ($1, $2, $3)
               ON CONFLICT (jti) DO NOTHING"#,
        )
        .bind(&claims.jti)
        .bind(user_id)
        .bind(expires_at)
        .execute(db)
        .await?;

        Ok(())
    }

    /// Stores a hashed single-use reset token and mails the link.
    ///
    /// Unknown or inactive emails succeed without sending anything.
    #[instrument(skip(db, dto, email_config), fields(email = %dto.email))]
    pub async fn forgot_password(
        db: &PgPool,
        dto: ForgotPasswordRequest,
        email_config: &EmailConfig,
    ) -> Result<(), AppError> {
        let email = normalize_email(&dto.email);
        let query = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE email = $1 AND is_active");
        let Some(user) = sqlx::query_as::<_, Profile>(&query)
            .bind(&email)
            .fetch_optional(db)
            .await?
        else {
            return Ok(());
        };

        let token = generate_reset_token();
        let expires_at = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);

        sqlx::query(
            r#"INSERT INTO password_reset_tokens (profile_id, token_hash, expires_at)
               VALUES ($1, $2, $3)"#,
        )
        .bind(user.id)
        .bind(hash_reset_token(&token))
        .bind(expires_at)
        .execute(db)
        .await?;

        let email_service = EmailService::new(email_config.clone());
        if let Err(e) = email_service
            .send_password_reset_email(
                &user.email,
                &user.full_name(),
                &token,
                user.preferred_language,
            )
            .await
        {
            warn!(error = %e.error, user_id = %user.id, "Failed to send password reset email");
        }

        Ok(())
    }

    /// Consumes a reset token and sets the new password. Returns the profile id.
    #[instrument(skip(db, dto))]
    pub async fn reset_password(
        db: &PgPool,
        dto: ResetPasswordRequest,
        language: Language,
    ) -> Result<Uuid, AppError> {
        let mut tx = db.begin().await?;

        let row: Option<(Uuid, Uuid)> = sqlx::query_as(
            r#"SELECT id, profile_id FROM password_reset_tokens
               WHERE token_hash = $1 AND used_at IS NULL AND expires_at > NOW()
               FOR UPDATE"#,
        )
        .bind(hash_reset_token(dto.token.trim()))
        .fetch_optional(&mut *tx)
        .await?;

        let Some((token_id, profile_id)) = row else {
            return Err(AppError::bad_request(anyhow::anyhow!(
                Msg::InvalidResetToken.text(language)
            ))
            .localized(language));
        };

        let password_hash = hash_password(&dto.new_password)?;

        sqlx::query("UPDATE profiles SET password_hash = $1, updated_at = NOW() WHERE id = $2")
            .bind(&password_hash)
            .bind(profile_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE password_reset_tokens SET used_at = NOW() WHERE id = $1")
            .bind(token_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(profile_id)
    }

    #[instrument(skip(db))]
    pub async fn get_profile(db: &PgPool, user_id: Uuid) -> Result<Profile, AppError> {
        let query = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1");
        sqlx::query_as::<_, Profile>(&query)
            .bind(user_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Profile not found")))
    }

    #[instrument(skip(db, dto))]
    pub async fn update_profile(
        db: &PgPool,
        user_id: Uuid,
        dto: UpdateProfileDto,
    ) -> Result<Profile, AppError> {
        let query = format!(
            r#"UPDATE profiles SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                phone = COALESCE($4, phone),
                address = COALESCE($5, address),
                date_of_birth = COALESCE($6, date_of_birth),
                avatar_url = COALESCE($7, avatar_url),
                preferred_language = COALESCE($8, preferred_language),
                updated_at = NOW()
               WHERE id = $1
               RETURNING {PROFILE_COLUMNS}"#
        );

        sqlx::query_as::<_, Profile>(&query)
            .bind(user_id)
            .bind(dto.first_name)
            .bind(dto.last_name)
            .bind(dto.phone)
            .bind(dto.address)
            .bind(dto.date_of_birth)
            .bind(dto.avatar_url)
            .bind(dto.preferred_language)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Profile not found")))
    }

    #[instrument(skip(db, dto))]
    pub async fn change_password(
        db: &PgPool,
        user_id: Uuid,
        dto: ChangePasswordRequest,
        language: Language,
    ) -> Result<(), AppError> {
        let current_hash: String =
            sqlx::query_scalar("SELECT password_hash FROM profiles WHERE id = $1")
                .bind(user_id)
                .fetch_optional(db)
                .await?
                .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Profile not found")))?;

        if !verify_password(&dto.current_password, &current_hash)? {
            return Err(AppError::bad_request(anyhow::anyhow!(
                Msg::WrongCurrentPassword.text(language)
            ))
            .localized(language));
        }

        let new_hash = hash_password(&dto.new_password)?;
        sqlx::query("UPDATE profiles SET password_hash = $1, updated_at = NOW() WHERE id = $2")
            .bind(&new_hash)
            .bind(user_id)
            .execute(db)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Admin@MESRS.mr "), "admin@mesrs.mr");
    }

    #[test]
    fn reset_tokens_are_random_hex() {
        let a = generate_reset_token();
        let b = generate_reset_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn reset_token_hash_is_stable_sha256() {
        let hash = hash_reset_token("abc");
        assert_eq!(
            hash,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_ne!(hash_reset_token("abd"), hash);
    }
}
