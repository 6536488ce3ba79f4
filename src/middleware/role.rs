//! Role-based authorization.
//!
//! Two ways to guard a handler:
//! 1. Route layers (`require_auth`, `require_admin`) applied with
//!    `middleware::from_fn_with_state`
//! 2. Extractors (`RequireAdmin`, `RequireStaff`, `RequireTeacher`) when only
//!    some methods of a route are restricted

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use mesrs_auth::Role;
use mesrs_core::{AppError, Msg};

use crate::middleware::auth::AuthUser;
use crate::middleware::language::header_language;
use crate::state::AppState;

pub const ADMIN: &[Role] = &[Role::Admin];
pub const ADMIN_OR_STAFF: &[Role] = &[Role::Admin, Role::Staff];
pub const ACADEMIC_STAFF: &[Role] = &[Role::Admin, Role::Staff, Role::Teacher];

/// Rejects with 403 unless the caller's role is in `allowed_roles`.
pub fn ensure_role(auth_user: &AuthUser, allowed_roles: &[Role]) -> Result<(), AppError> {
    let role = auth_user.role();
    if role.is_any_of(allowed_roles) {
        return Ok(());
    }

    tracing::warn!(
        user_id = %auth_user.0.sub,
        role = %role,
        "Access denied for role"
    );
    let language = auth_user.language();
    Err(AppError::forbidden(Msg::AccessDenied.text(language)).localized(language))
}

/// Checks the bearer token and role before running the rest of the stack.
///
/// ```rust,ignore
/// let routes = init_profiles_router().route_layer(middleware::from_fn_with_state(
///     state.clone(),
///     require_admin,
/// ));
/// ```
pub async fn require_roles(
    State(state): State<AppState>,
    req: Request,
    next: Next,
    allowed_roles: &[Role],
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await?;
    if let Err(err) = ensure_role(&auth_user, allowed_roles) {
        let language = header_language(&parts).unwrap_or(err.language);
        return Err(err.localized(language));
    }

    let req = Request::from_parts(parts, body);
    Ok(next.run(req).await)
}

/// Any signed-in user.
pub async fn require_auth(State(state): State<AppState>, req: Request, next: Next) -> Response {
    require_roles(State(state), req, next, &Role::ALL)
        .await
        .unwrap_or_else(IntoResponse::into_response)
}

pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    require_roles(State(state), req, next, ADMIN)
        .await
        .unwrap_or_else(IntoResponse::into_response)
}

/// Declares an extractor that authenticates the caller and checks the role.
macro_rules! require_role {
    ($name:ident, $roles:expr) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub AuthUser);

        impl FromRequestParts<AppState> for $name {
            type Rejection = AppError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &AppState,
            ) -> Result<Self, Self::Rejection> {
                let auth_user = AuthUser::from_request_parts(parts, state).await?;
                ensure_role(&auth_user, $roles)?;
                Ok($name(auth_user))
            }
        }
    };
}

require_role!(RequireAdmin, ADMIN);
require_role!(RequireStaff, ADMIN_OR_STAFF);
require_role!(RequireTeacher, ACADEMIC_STAFF);

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use mesrs_auth::Claims;
    use mesrs_core::Language;
    use uuid::Uuid;

    fn user(role: Role, lang: Language) -> AuthUser {
        AuthUser(Claims {
            sub: Uuid::new_v4().to_string(),
            email: "user@mesrs.mr".to_string(),
            role,
            lang,
            exp: 9999999999,
            iat: 1234567890,
        })
    }

    #[test]
    fn test_write_matrix() {
        assert!(ensure_role(&user(Role::Admin, Language::Fr), ADMIN).is_ok());
        assert!(ensure_role(&user(Role::Staff, Language::Fr), ADMIN).is_err());

        assert!(ensure_role(&user(Role::Staff, Language::Fr), ADMIN_OR_STAFF).is_ok());
        assert!(ensure_role(&user(Role::Teacher, Language::Fr), ADMIN_OR_STAFF).is_err());

        assert!(ensure_role(&user(Role::Teacher, Language::Fr), ACADEMIC_STAFF).is_ok());
        assert!(ensure_role(&user(Role::Student, Language::Fr), ACADEMIC_STAFF).is_err());
    }

    #[test]
    fn test_denial_is_localized() {
        let err = ensure_role(&user(Role::Student, Language::Ar), ADMIN).unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(err.language, Language::Ar);
        assert_eq!(err.public_message(), Msg::AccessDenied.text(Language::Ar));
    }
}
