//! Academic year models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AcademicYear {
    pub id: Uuid,
    #[schema(example = "2024-2025")]
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_current: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_year_range"))]
pub struct CreateAcademicYearDto {
    #[validate(length(min = 4, max = 20))]
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub is_current: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAcademicYearDto {
    #[validate(length(min = 4, max = 20))]
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

fn validate_year_range(dto: &CreateAcademicYearDto) -> Result<(), ValidationError> {
    if dto.end_date <= dto.start_date {
        return Err(ValidationError::new("end_date_before_start_date"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_range() {
        let dto = CreateAcademicYearDto {
            name: "2024-2025".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 10, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 7, 31).unwrap(),
            is_current: true,
        };
        assert!(dto.validate().is_ok());

        let reversed = CreateAcademicYearDto {
            start_date: dto.end_date,
            end_date: dto.start_date,
            ..dto
        };
        assert!(reversed.validate().is_err());
    }
}
