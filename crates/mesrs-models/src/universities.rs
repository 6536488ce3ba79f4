//! University domain models and DTOs.

use chrono::{DateTime, Utc};
use mesrs_core::PaginationParams;
use mesrs_core::serde::deserialize_optional_bool;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct University {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub address: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub rector_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// University with head counts, as listed on the universities page.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct UniversityWithStats {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub university: University,
    pub student_count: i64,
    pub teacher_count: i64,
    pub formation_count: i64,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUniversityDto {
    /// Short unique code, also used as the student number prefix
    #[validate(length(min = 2, max = 10))]
    #[schema(example = "UNA")]
    pub code: String,
    #[validate(length(min = 1, max = 200))]
    #[schema(example = "Université de Nouakchott Al Aasriya")]
    pub name: String,
    #[validate(length(max = 255))]
    pub address: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    #[validate(url)]
    pub website: Option<String>,
    #[validate(length(max = 200))]
    pub rector_name: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUniversityDto {
    #[validate(length(min = 2, max = 10))]
    pub code: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 255))]
    pub address: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    #[validate(url)]
    pub website: Option<String>,
    #[validate(length(max = 200))]
    pub rector_name: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UniversityFilterParams {
    /// Case-insensitive match on name or code
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> CreateUniversityDto {
        CreateUniversityDto {
            code: "UNA".to_string(),
            name: "Université de Nouakchott".to_string(),
            address: None,
            email: Some("contact@una.mr".to_string()),
            phone: None,
            website: Some("https://www.una.mr".to_string()),
            rector_name: None,
            latitude: Some(18.0858),
            longitude: Some(-15.9785),
        }
    }

    #[test]
    fn test_create_university_validation() {
        assert!(valid().validate().is_ok());

        let short_code = CreateUniversityDto {
            code: "U".to_string(),
            ..valid()
        };
        assert!(short_code.validate().is_err());

        let bad_latitude = CreateUniversityDto {
            latitude: Some(120.0),
            ..valid()
        };
        assert!(bad_latitude.validate().is_err());
    }

    #[test]
    fn test_update_university_empty_is_valid() {
        assert!(UpdateUniversityDto::default().validate().is_ok());
    }
}
