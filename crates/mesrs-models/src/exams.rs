//! Exam and exam result models.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use mesrs_core::PaginationParams;
use mesrs_core::serde::deserialize_optional_uuid;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "exam_session", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ExamSession {
    Normal,
    CatchUp,
}

impl ExamSession {
    pub fn as_str(self) -> &'static str {
        match self {
            ExamSession::Normal => "normal",
            ExamSession::CatchUp => "catch_up",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Exam {
    pub id: Uuid,
    pub name: String,
    pub course_id: Uuid,
    pub exam_date: NaiveDate,
    #[schema(value_type = Option<String>, example = "08:30:00")]
    pub start_time: Option<NaiveTime>,
    #[schema(value_type = Option<String>, example = "10:30:00")]
    pub end_time: Option<NaiveTime>,
    pub session: ExamSession,
    pub location: Option<String>,
    pub max_score: f64,
    pub coefficient: f64,
    pub instructions: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateExamDto {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub course_id: Uuid,
    pub exam_date: NaiveDate,
    #[schema(value_type = Option<String>)]
    pub start_time: Option<NaiveTime>,
    #[schema(value_type = Option<String>)]
    pub end_time: Option<NaiveTime>,
    pub session: Option<ExamSession>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
    #[validate(range(exclusive_min = 0.0, max = 1000.0))]
    pub max_score: Option<f64>,
    #[validate(range(exclusive_min = 0.0, max = 20.0))]
    pub coefficient: Option<f64>,
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateExamDto {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub exam_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>)]
    pub start_time: Option<NaiveTime>,
    #[schema(value_type = Option<String>)]
    pub end_time: Option<NaiveTime>,
    pub session: Option<ExamSession>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
    #[validate(range(exclusive_min = 0.0, max = 1000.0))]
    pub max_score: Option<f64>,
    #[validate(range(exclusive_min = 0.0, max = 20.0))]
    pub coefficient: Option<f64>,
    pub instructions: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExamFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub course_id: Option<Uuid>,
    pub session: Option<ExamSession>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ExamResult {
    pub id: Uuid,
    pub exam_id: Uuid,
    pub student_id: Uuid,
    pub student_number: String,
    pub student_name: String,
    pub score: f64,
    pub grade: Option<String>,
    pub is_passed: bool,
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateExamResultDto {
    pub student_id: Uuid,
    #[validate(range(min = 0.0))]
    pub score: f64,
    #[validate(length(max = 5))]
    pub grade: Option<String>,
    /// Derived from the score when omitted
    pub is_passed: Option<bool>,
    #[validate(length(max = 1000))]
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateExamResultDto {
    #[validate(range(min = 0.0))]
    pub score: Option<f64>,
    #[validate(length(max = 5))]
    pub grade: Option<String>,
    pub is_passed: Option<bool>,
    #[validate(length(max = 1000))]
    pub comments: Option<String>,
}

/// A result passes at half of the exam's maximum score.
pub fn passes(score: f64, max_score: f64) -> bool {
    score >= max_score / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_threshold() {
        assert!(passes(10.0, 20.0));
        assert!(passes(15.5, 20.0));
        assert!(!passes(9.99, 20.0));
        assert!(passes(50.0, 100.0));
    }

    #[test]
    fn test_session_serde() {
        assert_eq!(
            serde_json::to_string(&ExamSession::CatchUp).unwrap(),
            r#""catch_up""#
        );
    }

    #[test]
    fn test_exam_max_score_must_be_positive() {
        let dto = CreateExamDto {
            name: "Examen final".to_string(),
            course_id: Uuid::new_v4(),
            exam_date: NaiveDate::from_ymd_opt(2025, 1, 20).unwrap(),
            start_time: None,
            end_time: None,
            session: None,
            location: None,
            max_score: Some(0.0),
            coefficient: None,
            instructions: None,
        };
        assert!(dto.validate().is_err());
    }
}
