//! Course models. A course belongs to a formation and may be taught by a teacher.

use chrono::{DateTime, Utc};
use mesrs_core::PaginationParams;
use mesrs_core::serde::deserialize_optional_uuid;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Course {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub formation_id: Uuid,
    pub teacher_id: Option<Uuid>,
    pub academic_year_id: Option<Uuid>,
    pub credits: i32,
    pub semester: i32,
    pub max_students: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCourseDto {
    #[validate(length(min = 2, max = 20))]
    pub code: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub formation_id: Uuid,
    pub teacher_id: Option<Uuid>,
    pub academic_year_id: Option<Uuid>,
    #[validate(range(min = 0, max = 60))]
    pub credits: Option<i32>,
    #[validate(range(min = 1, max = 2))]
    pub semester: Option<i32>,
    #[validate(range(min = 1))]
    pub max_students: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCourseDto {
    #[validate(length(min = 2, max = 20))]
    pub code: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub teacher_id: Option<Uuid>,
    pub academic_year_id: Option<Uuid>,
    #[validate(range(min = 0, max = 60))]
    pub credits: Option<i32>,
    #[validate(range(min = 1, max = 2))]
    pub semester: Option<i32>,
    #[validate(range(min = 1))]
    pub max_students: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CourseFilterParams {
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub formation_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub teacher_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub academic_year_id: Option<Uuid>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semester_range() {
        let dto = CreateCourseDto {
            code: "ALG1".to_string(),
            name: "Algèbre 1".to_string(),
            formation_id: Uuid::new_v4(),
            teacher_id: None,
            academic_year_id: None,
            credits: Some(6),
            semester: Some(3),
            max_students: None,
        };
        assert!(dto.validate().is_err());
    }
}
