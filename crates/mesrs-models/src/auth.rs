//! Authentication DTOs.

use mesrs_auth::Role;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::profiles::Profile;

pub use mesrs_auth::{Claims, RefreshTokenClaims};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SignUpRequest {
    #[validate(email)]
    #[schema(example = "etudiant@una.mr")]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SignInRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    #[schema(example = "password123")]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
    pub user: Profile,
    pub message: String,
}

/// Profile returned after a self-service update.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub user: Profile,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1))]
    pub refresh_token: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordRequest {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1))]
    pub token: String,
    #[validate(length(min = 8))]
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1))]
    pub current_password: String,
    #[validate(length(min = 8))]
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Role checks for the current caller.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoleCheckResponse {
    pub role: Role,
    pub is_admin: bool,
    pub is_staff: bool,
    pub is_teacher: bool,
    pub is_student: bool,
}

impl From<Role> for RoleCheckResponse {
    fn from(role: Role) -> Self {
        Self {
            role,
            is_admin: role.is_admin(),
            is_staff: role == Role::Staff,
            is_teacher: role.is_teacher(),
            is_student: role.is_student(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_in_validation() {
        let ok = SignInRequest {
            email: "admin@mesrs.mr".to_string(),
            password: "x".to_string(),
        };
        assert!(ok.validate().is_ok());

        let empty = SignInRequest {
            email: "admin@mesrs.mr".to_string(),
            password: String::new(),
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_sign_up_requires_strong_password() {
        let dto = SignUpRequest {
            email: "a@una.mr".to_string(),
            password: "1234567".to_string(),
            first_name: "Ahmed".to_string(),
            last_name: "Salem".to_string(),
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_role_check_response() {
        let check = RoleCheckResponse::from(Role::Teacher);
        assert!(check.is_teacher);
        assert!(!check.is_admin);
        assert!(!check.is_student);
        assert!(!check.is_staff);
    }
}
