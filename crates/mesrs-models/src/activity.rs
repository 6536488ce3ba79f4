//! Activity log records.

use chrono::{DateTime, Utc};
use mesrs_core::PaginationParams;
use mesrs_core::serde::deserialize_optional_uuid;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// What was done. Stored as upper-case text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityAction {
    Create,
    Update,
    Delete,
    Login,
    Logout,
    Validate,
    Approve,
    Reject,
    Activate,
    Complete,
    PasswordReset,
}

impl ActivityAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityAction::Create => "CREATE",
            ActivityAction::Update => "UPDATE",
            ActivityAction::Delete => "DELETE",
            ActivityAction::Login => "LOGIN",
            ActivityAction::Logout => "LOGOUT",
            ActivityAction::Validate => "VALIDATE",
            ActivityAction::Approve => "APPROVE",
            ActivityAction::Reject => "REJECT",
            ActivityAction::Activate => "ACTIVATE",
            ActivityAction::Complete => "COMPLETE",
            ActivityAction::PasswordReset => "PASSWORD_RESET",
        }
    }
}

/// Kind of record an activity is about. Stored as lower-case text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Profile,
    Session,
    University,
    AcademicYear,
    Formation,
    Course,
    Student,
    Teacher,
    Enrollment,
    Exam,
    ExamResult,
    Scholarship,
    ScholarshipApplication,
}

impl ResourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceType::Profile => "profile",
            ResourceType::Session => "session",
            ResourceType::University => "university",
            ResourceType::AcademicYear => "academic_year",
            ResourceType::Formation => "formation",
            ResourceType::Course => "course",
            ResourceType::Student => "student",
            ResourceType::Teacher => "teacher",
            ResourceType::Enrollment => "enrollment",
            ResourceType::Exam => "exam",
            ResourceType::ExamResult => "exam_result",
            ResourceType::Scholarship => "scholarship",
            ResourceType::ScholarshipApplication => "scholarship_application",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ActivityLog {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<Uuid>,
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Client-reported event.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LogActivityDto {
    #[validate(length(min = 1, max = 50))]
    pub action: String,
    #[validate(length(min = 1, max = 50))]
    pub resource_type: String,
    pub resource_id: Option<Uuid>,
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ActivityFilterParams {
    pub action: Option<String>,
    pub resource_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub user_id: Option<Uuid>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_text_matches_serde() {
        for action in [
            ActivityAction::Create,
            ActivityAction::PasswordReset,
            ActivityAction::Logout,
        ] {
            let json = serde_json::to_string(&action).unwrap();
            assert_eq!(json, format!("\"{}\"", action.as_str()));
        }
    }

    #[test]
    fn test_resource_text_matches_serde() {
        for resource in [
            ResourceType::AcademicYear,
            ResourceType::ScholarshipApplication,
            ResourceType::Student,
        ] {
            let json = serde_json::to_string(&resource).unwrap();
            assert_eq!(json, format!("\"{}\"", resource.as_str()));
        }
    }
}
