//! Scholarship programs and applications.

use chrono::{DateTime, NaiveDate, Utc};
use mesrs_core::PaginationParams;
use mesrs_core::serde::{deserialize_optional_bool, deserialize_optional_uuid};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "scholarship_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ScholarshipType {
    Excellence,
    Social,
    Research,
}

impl ScholarshipType {
    pub fn as_str(self) -> &'static str {
        match self {
            ScholarshipType::Excellence => "excellence",
            ScholarshipType::Social => "social",
            ScholarshipType::Research => "research",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "application_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    /// Only pending applications can be decided; decisions are final.
    pub fn can_transition_to(self, next: ApplicationStatus) -> bool {
        self == ApplicationStatus::Pending && next != ApplicationStatus::Pending
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Scholarship {
    pub id: Uuid,
    pub name: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub scholarship_type: ScholarshipType,
    pub amount: f64,
    pub duration_months: i32,
    pub max_recipients: Option<i32>,
    pub deadline: Option<NaiveDate>,
    pub criteria: Option<String>,
    pub academic_year_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateScholarshipDto {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(rename = "type")]
    pub scholarship_type: ScholarshipType,
    #[validate(range(min = 0.0))]
    pub amount: f64,
    #[validate(range(min = 1, max = 120))]
    pub duration_months: Option<i32>,
    #[validate(range(min = 1))]
    pub max_recipients: Option<i32>,
    pub deadline: Option<NaiveDate>,
    pub criteria: Option<String>,
    pub academic_year_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateScholarshipDto {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub scholarship_type: Option<ScholarshipType>,
    #[validate(range(min = 0.0))]
    pub amount: Option<f64>,
    #[validate(range(min = 1, max = 120))]
    pub duration_months: Option<i32>,
    #[validate(range(min = 1))]
    pub max_recipients: Option<i32>,
    pub deadline: Option<NaiveDate>,
    pub criteria: Option<String>,
    pub academic_year_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ScholarshipFilterParams {
    #[serde(rename = "type")]
    pub scholarship_type: Option<ScholarshipType>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub academic_year_id: Option<Uuid>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ScholarshipApplication {
    pub id: Uuid,
    pub scholarship_id: Uuid,
    pub scholarship_name: String,
    pub student_id: Uuid,
    pub student_number: String,
    pub student_name: String,
    pub status: ApplicationStatus,
    pub score: Option<f64>,
    pub motivation_letter: Option<String>,
    pub decision_by: Option<Uuid>,
    pub decision_date: Option<DateTime<Utc>>,
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Students apply for themselves; staff may file on behalf of a student.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateApplicationDto {
    pub scholarship_id: Uuid,
    /// Required when filed by staff; ignored for students
    pub student_id: Option<Uuid>,
    #[validate(length(max = 5000))]
    pub motivation_letter: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ApplicationDecisionDto {
    #[validate(custom(function = "validate_decision"))]
    pub status: ApplicationStatus,
    #[validate(range(min = 0.0, max = 100.0))]
    pub score: Option<f64>,
    #[validate(length(max = 1000))]
    pub comments: Option<String>,
}

fn validate_decision(status: &ApplicationStatus) -> Result<(), ValidationError> {
    if *status == ApplicationStatus::Pending {
        return Err(ValidationError::new("decision_must_be_approved_or_rejected"));
    }
    Ok(())
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ApplicationFilterParams {
    pub status: Option<ApplicationStatus>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub scholarship_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub student_id: Option<Uuid>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_transitions() {
        use ApplicationStatus::*;
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(!Pending.can_transition_to(Pending));
        assert!(!Approved.can_transition_to(Rejected));
        assert!(!Rejected.can_transition_to(Approved));
    }

    #[test]
    fn test_decision_cannot_be_pending() {
        let dto = ApplicationDecisionDto {
            status: ApplicationStatus::Pending,
            score: None,
            comments: None,
        };
        assert!(dto.validate().is_err());

        let dto = ApplicationDecisionDto {
            status: ApplicationStatus::Approved,
            score: Some(88.0),
            comments: None,
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_scholarship_type_field_name() {
        let dto: CreateScholarshipDto = serde_json::from_str(
            r#"{"name": "Bourse d'excellence", "type": "excellence", "amount": 15000}"#,
        )
        .unwrap();
        assert_eq!(dto.scholarship_type, ScholarshipType::Excellence);
    }
}
