//! Enrollment models and the enrollment status workflow.

use chrono::{DateTime, NaiveDate, Utc};
use mesrs_core::PaginationParams;
use mesrs_core::serde::deserialize_optional_uuid;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "enrollment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Pending,
    Approved,
    Rejected,
    Active,
    Completed,
}

impl EnrollmentStatus {
    /// pending -> approved | rejected, approved -> active, active -> completed
    pub fn can_transition_to(self, next: EnrollmentStatus) -> bool {
        matches!(
            (self, next),
            (EnrollmentStatus::Pending, EnrollmentStatus::Approved)
                | (EnrollmentStatus::Pending, EnrollmentStatus::Rejected)
                | (EnrollmentStatus::Approved, EnrollmentStatus::Active)
                | (EnrollmentStatus::Active, EnrollmentStatus::Completed)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EnrollmentStatus::Pending => "pending",
            EnrollmentStatus::Approved => "approved",
            EnrollmentStatus::Rejected => "rejected",
            EnrollmentStatus::Active => "active",
            EnrollmentStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Enrollment {
    pub id: Uuid,
    pub student_id: Uuid,
    pub student_number: String,
    pub student_name: String,
    pub formation_id: Uuid,
    pub formation_name: String,
    pub academic_year_id: Uuid,
    pub academic_year_name: String,
    pub status: EnrollmentStatus,
    pub enrollment_date: NaiveDate,
    pub validated_by: Option<Uuid>,
    pub validation_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateEnrollmentDto {
    pub student_id: Uuid,
    pub formation_id: Uuid,
    pub academic_year_id: Uuid,
    pub enrollment_date: Option<NaiveDate>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateEnrollmentDto {
    pub formation_id: Option<Uuid>,
    pub academic_year_id: Option<Uuid>,
    pub enrollment_date: Option<NaiveDate>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

/// Body of validate/reject/activate/complete actions.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct EnrollmentDecisionDto {
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EnrollmentFilterParams {
    pub status: Option<EnrollmentStatus>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub student_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub formation_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub academic_year_id: Option<Uuid>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[cfg(test)]
mod tests {
    use super::*;
    use EnrollmentStatus::*;

    #[test]
    fn test_pending_can_be_decided() {
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(!Pending.can_transition_to(Active));
        assert!(!Pending.can_transition_to(Completed));
    }

    #[test]
    fn test_lifecycle_after_approval() {
        assert!(Approved.can_transition_to(Active));
        assert!(Active.can_transition_to(Completed));
        assert!(!Approved.can_transition_to(Rejected));
        assert!(!Active.can_transition_to(Pending));
    }

    #[test]
    fn test_terminal_states() {
        for next in [Pending, Approved, Rejected, Active, Completed] {
            assert!(!Rejected.can_transition_to(next));
            assert!(!Completed.can_transition_to(next));
        }
    }
}
