//! Student domain models and DTOs.
//!
//! A student is a profile attached to a university, optionally to a
//! formation and academic year. Listing joins the profile so the table can
//! show and search names and email.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use mesrs_core::PaginationParams;
use mesrs_core::serde::{deserialize_optional_bool, deserialize_optional_uuid};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::formations::StudyLevel;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Student {
    pub id: Uuid,
    /// Matricule, e.g. `UNA20240001`
    pub student_number: String,
    pub profile_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub university_id: Uuid,
    pub university_name: String,
    pub formation_id: Option<Uuid>,
    pub formation_name: Option<String>,
    pub academic_year_id: Option<Uuid>,
    pub level: Option<StudyLevel>,
    pub gpa: Option<f64>,
    pub enrollment_date: NaiveDate,
    pub is_graduated: bool,
    pub graduation_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Creates the profile and the student record together.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateStudentDto {
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
    pub date_of_birth: Option<NaiveDate>,
    pub university_id: Uuid,
    pub formation_id: Option<Uuid>,
    pub academic_year_id: Option<Uuid>,
    pub level: Option<StudyLevel>,
    /// Generated from the university code when omitted
    #[validate(length(min = 3, max = 30))]
    pub student_number: Option<String>,
    #[validate(range(min = 0.0, max = 20.0))]
    pub gpa: Option<f64>,
    pub enrollment_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateStudentDto {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    pub formation_id: Option<Uuid>,
    pub academic_year_id: Option<Uuid>,
    pub level: Option<StudyLevel>,
    #[validate(range(min = 0.0, max = 20.0))]
    pub gpa: Option<f64>,
    pub is_graduated: Option<bool>,
    pub graduation_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StudentFilterParams {
    /// Case-insensitive substring of first name, last name, email or matricule
    pub search: Option<String>,
    pub level: Option<StudyLevel>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub university_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub formation_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_graduated: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

/// Prefix of generated student numbers: university code followed by the year.
pub fn student_number_prefix(university_code: &str, enrollment_date: NaiveDate) -> String {
    format!(
        "{}{}",
        university_code.trim().to_uppercase(),
        enrollment_date.year()
    )
}

/// Next number after `highest` sharing `prefix`, padded to four digits.
pub fn next_sequence_number(prefix: &str, highest: Option<&str>) -> String {
    let next = highest
        .and_then(|number| number.strip_prefix(prefix))
        .and_then(|sequence| sequence.parse::<u32>().ok())
        .map_or(1, |sequence| sequence + 1);
    format!("{prefix}{next:04}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_dto() -> CreateStudentDto {
        CreateStudentDto {
            first_name: "Aminetou".to_string(),
            last_name: "Cheikh".to_string(),
            email: "aminetou@una.mr".to_string(),
            password: "password123".to_string(),
            phone: None,
            national_id: None,
            date_of_birth: None,
            university_id: Uuid::new_v4(),
            formation_id: None,
            academic_year_id: None,
            level: Some(StudyLevel::Licence2),
            student_number: None,
            gpa: Some(14.5),
            enrollment_date: None,
        }
    }

    #[test]
    fn test_create_student_dto_validation() {
        assert!(valid_dto().validate().is_ok());

        let bad_email = CreateStudentDto {
            email: "invalid-email".to_string(),
            ..valid_dto()
        };
        assert!(bad_email.validate().is_err());

        let gpa_out_of_range = CreateStudentDto {
            gpa: Some(21.0),
            ..valid_dto()
        };
        assert!(gpa_out_of_range.validate().is_err());
    }

    #[test]
    fn test_update_student_dto_empty() {
        assert!(UpdateStudentDto::default().validate().is_ok());
    }

    #[test]
    fn test_student_number_prefix() {
        let date = NaiveDate::from_ymd_opt(2024, 10, 15).unwrap();
        assert_eq!(student_number_prefix("una", date), "UNA2024");
    }

    #[test]
    fn test_next_sequence_number() {
        assert_eq!(next_sequence_number("UNA2024", None), "UNA20240001");
        assert_eq!(
            next_sequence_number("UNA2024", Some("UNA20240041")),
            "UNA20240042"
        );
        assert_eq!(
            next_sequence_number("UNA2024", Some("UNA20249999")),
            "UNA202410000"
        );
    }

    #[test]
    fn test_next_sequence_number_ignores_foreign_format() {
        assert_eq!(
            next_sequence_number("UNA2024", Some("UNA2024-manual")),
            "UNA20240001"
        );
    }
}
