//! Formation (study program) models.

use chrono::{DateTime, Utc};
use mesrs_core::serde::{deserialize_optional_bool, deserialize_optional_uuid};
use mesrs_core::{Language, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Year of study within the LMD system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "study_level", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StudyLevel {
    #[serde(rename = "licence_1")]
    #[sqlx(rename = "licence_1")]
    Licence1,
    #[serde(rename = "licence_2")]
    #[sqlx(rename = "licence_2")]
    Licence2,
    #[serde(rename = "licence_3")]
    #[sqlx(rename = "licence_3")]
    Licence3,
    #[serde(rename = "master_1")]
    #[sqlx(rename = "master_1")]
    Master1,
    #[serde(rename = "master_2")]
    #[sqlx(rename = "master_2")]
    Master2,
    Doctorat,
}

impl StudyLevel {
    pub const ALL: [StudyLevel; 6] = [
        StudyLevel::Licence1,
        StudyLevel::Licence2,
        StudyLevel::Licence3,
        StudyLevel::Master1,
        StudyLevel::Master2,
        StudyLevel::Doctorat,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StudyLevel::Licence1 => "licence_1",
            StudyLevel::Licence2 => "licence_2",
            StudyLevel::Licence3 => "licence_3",
            StudyLevel::Master1 => "master_1",
            StudyLevel::Master2 => "master_2",
            StudyLevel::Doctorat => "doctorat",
        }
    }

    pub fn label(self, language: Language) -> &'static str {
        match (self, language) {
            (StudyLevel::Licence1, Language::Fr) => "Licence 1",
            (StudyLevel::Licence2, Language::Fr) => "Licence 2",
            (StudyLevel::Licence3, Language::Fr) => "Licence 3",
            (StudyLevel::Master1, Language::Fr) => "Master 1",
            (StudyLevel::Master2, Language::Fr) => "Master 2",
            (StudyLevel::Doctorat, Language::Fr) => "Doctorat",
            (StudyLevel::Licence1, Language::Ar) => "ليسانس 1",
            (StudyLevel::Licence2, Language::Ar) => "ليسانس 2",
            (StudyLevel::Licence3, Language::Ar) => "ليسانس 3",
            (StudyLevel::Master1, Language::Ar) => "ماستر 1",
            (StudyLevel::Master2, Language::Ar) => "ماستر 2",
            (StudyLevel::Doctorat, Language::Ar) => "دكتوراه",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Formation {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub university_id: Uuid,
    pub level: StudyLevel,
    pub duration_years: i32,
    pub credits: i32,
    pub capacity: Option<i32>,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateFormationDto {
    #[validate(length(min = 2, max = 20))]
    pub code: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub university_id: Uuid,
    pub level: StudyLevel,
    #[validate(range(min = 1, max = 8))]
    pub duration_years: Option<i32>,
    #[validate(range(min = 0, max = 600))]
    pub credits: Option<i32>,
    #[validate(range(min = 1))]
    pub capacity: Option<i32>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateFormationDto {
    #[validate(length(min = 2, max = 20))]
    pub code: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub level: Option<StudyLevel>,
    #[validate(range(min = 1, max = 8))]
    pub duration_years: Option<i32>,
    #[validate(range(min = 0, max = 600))]
    pub credits: Option<i32>,
    #[validate(range(min = 1))]
    pub capacity: Option<i32>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FormationFilterParams {
    /// Case-insensitive match on name or code
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub university_id: Option<Uuid>,
    pub level: Option<StudyLevel>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_labels() {
        assert_eq!(StudyLevel::Licence1.label(Language::Fr), "Licence 1");
        assert_eq!(StudyLevel::Doctorat.label(Language::Ar), "دكتوراه");
    }

    #[test]
    fn test_level_serde_names() {
        assert_eq!(
            serde_json::to_string(&StudyLevel::Master2).unwrap(),
            r#""master_2""#
        );
        let level: StudyLevel = serde_json::from_str(r#""doctorat""#).unwrap();
        assert_eq!(level, StudyLevel::Doctorat);

        for level in StudyLevel::ALL {
            let json = serde_json::to_string(&level).unwrap();
            assert_eq!(json, format!("\"{}\"", level.as_str()));
        }
    }

    #[test]
    fn test_create_formation_validation() {
        let dto = CreateFormationDto {
            code: "INF-L".to_string(),
            name: "Licence Informatique".to_string(),
            university_id: Uuid::new_v4(),
            level: StudyLevel::Licence1,
            duration_years: Some(3),
            credits: Some(180),
            capacity: Some(120),
            description: None,
        };
        assert!(dto.validate().is_ok());

        let zero_capacity = CreateFormationDto {
            capacity: Some(0),
            ..dto
        };
        assert!(zero_capacity.validate().is_err());
    }
}
