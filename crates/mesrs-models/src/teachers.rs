//! Teacher domain models and DTOs.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use mesrs_core::PaginationParams;
use mesrs_core::serde::deserialize_optional_uuid;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Teacher {
    pub id: Uuid,
    pub employee_number: String,
    pub profile_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub university_id: Uuid,
    pub university_name: String,
    pub department: Option<String>,
    pub specialization: Option<String>,
    /// Academic title, e.g. "Professeur", "Maître de conférences"
    pub title: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub salary: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateTeacherDto {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    #[validate(length(max = 50))]
    pub national_id: Option<String>,
    pub university_id: Uuid,
    /// Generated as `ENS{year}{NNNN}` when omitted
    #[validate(length(min = 3, max = 30))]
    pub employee_number: Option<String>,
    #[validate(length(max = 100))]
    pub department: Option<String>,
    #[validate(length(max = 100))]
    pub specialization: Option<String>,
    #[validate(length(max = 100))]
    pub title: Option<String>,
    pub hire_date: Option<NaiveDate>,
    #[validate(range(min = 0.0))]
    pub salary: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateTeacherDto {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    pub university_id: Option<Uuid>,
    #[validate(length(max = 100))]
    pub department: Option<String>,
    #[validate(length(max = 100))]
    pub specialization: Option<String>,
    #[validate(length(max = 100))]
    pub title: Option<String>,
    pub hire_date: Option<NaiveDate>,
    #[validate(range(min = 0.0))]
    pub salary: Option<f64>,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TeacherFilterParams {
    /// Case-insensitive substring of first name, last name, email, specialization or employee number
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub university_id: Option<Uuid>,
    pub department: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

pub const EMPLOYEE_NUMBER_PREFIX: &str = "ENS";

/// Prefix of generated employee numbers, e.g. `ENS2024`.
pub fn employee_number_prefix(hire_date: NaiveDate) -> String {
    format!("{EMPLOYEE_NUMBER_PREFIX}{}", hire_date.year())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_teacher_validation() {
        let dto = CreateTeacherDto {
            first_name: "Mohamed".to_string(),
            last_name: "Vall".to_string(),
            email: "m.vall@una.mr".to_string(),
            password: "password123".to_string(),
            phone: None,
            national_id: None,
            university_id: Uuid::new_v4(),
            employee_number: None,
            department: Some("Informatique".to_string()),
            specialization: Some("Réseaux".to_string()),
            title: Some("Professeur".to_string()),
            hire_date: None,
            salary: Some(45000.0),
        };
        assert!(dto.validate().is_ok());

        let negative_salary = CreateTeacherDto {
            salary: Some(-1.0),
            ..dto
        };
        assert!(negative_salary.validate().is_err());
    }

    #[test]
    fn test_employee_number_prefix() {
        let date = NaiveDate::from_ymd_opt(2023, 9, 1).unwrap();
        assert_eq!(employee_number_prefix(date), "ENS2023");
        assert_eq!(
            crate::students::next_sequence_number("ENS2023", Some("ENS20230007")),
            "ENS20230008"
        );
    }
}
