//! Token creation and verification.
//!
//! Access tokens are short-lived and carry the role. Refresh tokens are
//! long-lived and carry a `jti` so sign-out can revoke them server-side.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use mesrs_config::JwtConfig;
use mesrs_core::{AppError, Language};

use crate::claims::{Claims, RefreshTokenClaims};
use crate::role::Role;

pub fn create_access_token(
    user_id: Uuid,
    email: &str,
    role: Role,
    lang: Language,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp() as usize;
    let exp = now + jwt_config.access_token_expiry as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role,
        lang,
        exp,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal_error(format!("Failed to create token: {e}")))
}

/// Verifies signature and expiry of an access token.
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized("Invalid or expired token"))
}

pub fn create_refresh_token(
    user_id: Uuid,
    email: &str,
    jwt_config: &JwtConfig,
) -> Result<(String, RefreshTokenClaims), AppError> {
    let now = Utc::now().timestamp() as usize;
    let exp = now + jwt_config.refresh_token_expiry as usize;

    let claims = RefreshTokenClaims {
        sub: user_id.to_string(),
        email: email.to_string(),
        exp,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal_error(format!("Failed to create refresh token: {e}")))?;

    Ok((token, claims))
}

pub fn verify_refresh_token(
    token: &str,
    jwt_config: &JwtConfig,
) -> Result<RefreshTokenClaims, AppError> {
    decode::<RefreshTokenClaims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized("Invalid or expired refresh token"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            access_token_expiry: 3600,
            refresh_token_expiry: 604800,
        }
    }

    #[test]
    fn test_access_token_carries_role_and_language() {
        let config = config();
        let user_id = Uuid::new_v4();

        let token =
            create_access_token(user_id, "admin@mesrs.mr", Role::Admin, Language::Ar, &config)
                .unwrap();
        let claims = verify_token(&token, &config).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "admin@mesrs.mr");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.lang, Language::Ar);
    }

    #[test]
    fn test_verify_token_invalid() {
        assert!(verify_token("invalid-token", &config()).is_err());
    }

    #[test]
    fn test_verify_token_wrong_secret() {
        let token = create_access_token(
            Uuid::new_v4(),
            "x@mesrs.mr",
            Role::Student,
            Language::Fr,
            &config(),
        )
        .unwrap();

        let wrong = JwtConfig {
            secret: "different-secret-key-at-least-32-characters".to_string(),
            ..config()
        };
        assert!(verify_token(&token, &wrong).is_err());
    }

    #[test]
    fn test_refresh_token_has_unique_jti() {
        let config = config();
        let user_id = Uuid::new_v4();
        let (token_a, claims_a) = create_refresh_token(user_id, "x@mesrs.mr", &config).unwrap();
        let (_, claims_b) = create_refresh_token(user_id, "x@mesrs.mr", &config).unwrap();

        assert_ne!(claims_a.jti, claims_b.jti);
        let verified = verify_refresh_token(&token_a, &config).unwrap();
        assert_eq!(verified.jti, claims_a.jti);
    }

    #[test]
    fn test_refresh_token_rejected_as_access_token() {
        let config = config();
        let (refresh, _) = create_refresh_token(Uuid::new_v4(), "x@mesrs.mr", &config).unwrap();
        assert!(verify_token(&refresh, &config).is_err());
    }

    #[test]
    fn test_refresh_outlives_access() {
        let config = config();
        let user_id = Uuid::new_v4();
        let access =
            create_access_token(user_id, "x@mesrs.mr", Role::Staff, Language::Fr, &config)
                .unwrap();
        let (_, refresh_claims) = create_refresh_token(user_id, "x@mesrs.mr", &config).unwrap();
        let access_claims = verify_token(&access, &config).unwrap();
        assert!(refresh_claims.exp > access_claims.exp);
    }
}
