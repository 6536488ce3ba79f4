//! Profile domain models and DTOs.
//!
//! A profile is the account of anyone using the dashboard. Students and
//! teachers additionally have a row in their own table pointing at it.

use chrono::{DateTime, NaiveDate, Utc};
use mesrs_auth::Role;
use mesrs_core::serde::deserialize_optional_bool;
use mesrs_core::{Language, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Columns selected for [`Profile`]; never includes the password hash.
pub const PROFILE_COLUMNS: &str = "id, email, first_name, last_name, role, phone, national_id, \
     address, date_of_birth, avatar_url, preferred_language, is_active, created_at, updated_at";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub phone: Option<String>,
    pub national_id: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub avatar_url: Option<String>,
    pub preferred_language: Language,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Created by an admin; any role may be assigned.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProfileDto {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    pub role: Role,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    #[validate(length(max = 50))]
    pub national_id: Option<String>,
    pub preferred_language: Option<Language>,
}

/// Self-service profile update (settings page).
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileDto {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    #[validate(length(max = 255))]
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    #[validate(url)]
    pub avatar_url: Option<String>,
    pub preferred_language: Option<Language>,
}

/// Admin update: everything a user may change plus role and activation.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct AdminUpdateProfileDto {
    #[validate(nested)]
    #[serde(flatten)]
    pub profile: UpdateProfileDto,
    #[validate(email)]
    pub email: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    #[validate(length(max = 50))]
    pub national_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProfileFilterParams {
    /// Case-insensitive match on name or email
    pub search: Option<String>,
    pub role: Option<Role>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_profile_dto_validation() {
        let dto = CreateProfileDto {
            email: "staff@mesrs.mr".to_string(),
            password: "password123".to_string(),
            first_name: "Mariem".to_string(),
            last_name: "Ahmed".to_string(),
            role: Role::Staff,
            phone: None,
            national_id: None,
            preferred_language: Some(Language::Ar),
        };
        assert!(dto.validate().is_ok());

        let bad_email = CreateProfileDto {
            email: "not-an-email".to_string(),
            ..dto.clone()
        };
        assert!(bad_email.validate().is_err());

        let short_password = CreateProfileDto {
            password: "short".to_string(),
            ..dto
        };
        assert!(short_password.validate().is_err());
    }

    #[test]
    fn test_update_profile_dto_validation() {
        assert!(UpdateProfileDto::default().validate().is_ok());

        let empty_name = UpdateProfileDto {
            first_name: Some(String::new()),
            ..Default::default()
        };
        assert!(empty_name.validate().is_err());

        let bad_avatar = UpdateProfileDto {
            avatar_url: Some("not a url".to_string()),
            ..Default::default()
        };
        assert!(bad_avatar.validate().is_err());
    }

    #[test]
    fn test_admin_update_validates_nested_profile() {
        let dto = AdminUpdateProfileDto {
            profile: UpdateProfileDto {
                last_name: Some("x".repeat(101)),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_update_profile_language_from_json() {
        let dto: UpdateProfileDto =
            serde_json::from_str(r#"{"preferred_language": "ar"}"#).unwrap();
        assert_eq!(dto.preferred_language, Some(Language::Ar));
    }
}
