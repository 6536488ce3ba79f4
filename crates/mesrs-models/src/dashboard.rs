//! Dashboard statistics and chart series.
//!
//! Query rows (`*Row`) mirror what the aggregate SQL returns; the public
//! types are the normalized shapes chart widgets consume.

use chrono::{DateTime, Utc};
use mesrs_core::Language;
use mesrs_core::serde::deserialize_optional_i64;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Chart colors, assigned by index and reused cyclically.
pub const PALETTE: [&str; 8] = [
    "#006233", "#00A652", "#FFC72C", "#CE1126", "#8B5CF6", "#F59E0B", "#EC4899", "#10B981",
];

pub fn color_for(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// Every series is wrapped with the interval the client should refetch at.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SeriesResponse<T> {
    pub data: T,
    pub refresh_interval_secs: u64,
    pub generated_at: DateTime<Utc>,
}

impl<T> SeriesResponse<T> {
    pub fn new(data: T, refresh_interval_secs: u64) -> Self {
        Self {
            data,
            refresh_interval_secs,
            generated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct DashboardStats {
    pub total_students: i64,
    pub total_teachers: i64,
    pub total_universities: i64,
    pub total_formations: i64,
    pub pending_enrollments: i64,
    pub active_scholarships: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StatCard {
    pub key: String,
    pub title: String,
    pub value: i64,
    /// Value formatted with the language's digits and grouping
    pub display_value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
    pub color: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct EnrollmentTrendRow {
    /// `YYYY-MM`
    pub month_year: String,
    pub new_enrollments: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EnrollmentTrendPoint {
    #[schema(example = "2025-03")]
    pub month: String,
    pub year: i32,
    pub students: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct FormationCountRow {
    pub formation_name: String,
    pub student_count: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct UniversityStatsRow {
    pub university_name: String,
    pub student_count: i64,
    pub teacher_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UniversityStat {
    pub university_name: String,
    pub student_count: i64,
    pub teacher_count: i64,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RecentActivity {
    pub id: Uuid,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<Uuid>,
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
    pub user_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct FormationPerformanceRow {
    pub formation_name: String,
    pub total_students: i64,
    pub average_gpa: Option<f64>,
    pub total_results: i64,
    pub passed_results: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FormationPerformance {
    pub formation_name: String,
    pub total_students: i64,
    pub average_gpa: f64,
    /// Percentage of passed exam results, two decimals
    pub pass_rate: f64,
}

#[derive(Debug, Clone, Default, FromRow)]
pub struct MonthlyCountsRow {
    pub students_this_month: i64,
    pub students_last_month: i64,
    pub enrollments_this_month: i64,
    pub enrollments_last_month: i64,
    pub pending_this_month: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MonthlyGrowth {
    pub student_growth: f64,
    pub enrollment_growth: f64,
    pub new_students_this_month: i64,
    pub pending_enrollments_this_month: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SuccessRate {
    pub total_results: i64,
    pub passed_results: i64,
    /// Whole percentage, 0 when there are no results
    pub success_rate: i64,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LanguageQuery {
    /// `ar` or `fr`; overrides Accept-Language and the profile preference
    pub lang: Option<Language>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TrendParams {
    /// Number of months to cover, 1-60 (default: 12)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub months_back: Option<i64>,
}

impl TrendParams {
    pub fn months_back(&self) -> i64 {
        self.months_back.unwrap_or(12).clamp(1, 60)
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecentActivityParams {
    /// Number of entries, 1-100 (default: 10)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
}

impl RecentActivityParams {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(10).clamp(1, 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_cycles() {
        assert_eq!(color_for(0), "#006233");
        assert_eq!(color_for(7), "#10B981");
        assert_eq!(color_for(8), "#006233");
        assert_eq!(color_for(19), "#CE1126");
    }

    #[test]
    fn test_trend_params_clamp() {
        assert_eq!(TrendParams::default().months_back(), 12);
        assert_eq!(TrendParams { months_back: Some(0) }.months_back(), 1);
        assert_eq!(TrendParams { months_back: Some(600) }.months_back(), 60);
    }

    #[test]
    fn test_recent_activity_params_clamp() {
        assert_eq!(RecentActivityParams::default().limit(), 10);
        assert_eq!(RecentActivityParams { limit: Some(-3) }.limit(), 1);
        assert_eq!(RecentActivityParams { limit: Some(500) }.limit(), 100);
    }

    #[test]
    fn test_series_response_shape() {
        let response = SeriesResponse::new(vec![1, 2, 3], 60);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["refresh_interval_secs"], 60);
        assert_eq!(json["data"].as_array().map(Vec::len), Some(3));
        assert!(json.get("generated_at").is_some());
    }
}
