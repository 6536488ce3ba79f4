use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use mesrs_auth::{Claims, Role, verify_token};
use mesrs_core::{AppError, Language, Msg};
use uuid::Uuid;

use crate::middleware::language::header_language;
use crate::state::AppState;

/// Extractor that validates the bearer JWT and provides the caller's claims.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        self.0
            .user_id()
            .ok_or_else(|| AppError::unauthorized("Invalid user ID in token"))
    }

    pub fn role(&self) -> Role {
        self.0.role
    }

    pub fn email(&self) -> &str {
        &self.0.email
    }

    /// Language stored on the profile when the token was issued.
    pub fn language(&self) -> Language {
        self.0.lang
    }
}

fn bearer_token(parts: &Parts) -> Option<Result<&str, ()>> {
    let value = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())?;
    Some(value.strip_prefix("Bearer ").ok_or(()))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let language = header_language(parts).unwrap_or_default();

        let token = match bearer_token(parts) {
            Some(Ok(token)) => token,
            Some(Err(())) => {
                return Err(
                    AppError::unauthorized("Invalid authorization header format")
                        .localized(language),
                );
            }
            None => {
                return Err(
                    AppError::unauthorized(Msg::AuthRequired.text(language)).localized(language)
                );
            }
        };

        let claims = verify_token(token, &state.jwt_config).map_err(|_| {
            AppError::unauthorized(Msg::SessionExpired.text(language)).localized(language)
        })?;

        Ok(AuthUser(claims))
    }
}

/// Like [`AuthUser`] but never rejects: a missing or invalid token yields `None`.
#[derive(Debug, Clone)]
pub struct OptionalAuthUser(pub Option<AuthUser>);

impl FromRequestParts<AppState> for OptionalAuthUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = match bearer_token(parts) {
            Some(Ok(token)) => verify_token(token, &state.jwt_config).ok(),
            _ => None,
        };
        Ok(OptionalAuthUser(claims.map(AuthUser)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn claims(sub: &str, role: Role) -> Claims {
        Claims {
            sub: sub.to_string(),
            email: "staff@mesrs.mr".to_string(),
            role,
            lang: Language::Ar,
            exp: 9999999999,
            iat: 1234567890,
        }
    }

    #[test]
    fn test_user_id() {
        let id = Uuid::new_v4();
        let auth_user = AuthUser(claims(&id.to_string(), Role::Staff));
        assert_eq!(auth_user.user_id().unwrap(), id);
        assert_eq!(auth_user.role(), Role::Staff);
        assert_eq!(auth_user.language(), Language::Ar);
        assert_eq!(auth_user.email(), "staff@mesrs.mr");
    }

    #[test]
    fn test_invalid_subject_is_unauthorized() {
        let auth_user = AuthUser(claims("not-a-uuid", Role::Admin));
        let err = auth_user.user_id().unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_bearer_token_parsing() {
        let (parts, _) = Request::builder()
            .header(header::AUTHORIZATION, "Bearer abc.def")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(bearer_token(&parts), Some(Ok("abc.def")));

        let (parts, _) = Request::builder()
            .header(header::AUTHORIZATION, "Basic xyz")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(bearer_token(&parts), Some(Err(())));

        let (parts, _) = Request::builder().body(()).unwrap().into_parts();
        assert_eq!(bearer_token(&parts), None);
    }
}
