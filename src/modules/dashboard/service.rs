//! Aggregate queries behind the dashboard widgets.
//!
//! Each series is one query whose rows are normalized by a pure function
//! (zero-filling, percentages, colors) so the shaping can be tested
//! without a database.

use std::future::Future;
use std::time::{Duration, Instant};

use chrono::{Datelike, NaiveDate, Utc};
use mesrs_cache::RedisCache;
use mesrs_core::i18n::{Msg, format_number};
use mesrs_core::{AppError, Language};
use serde::{Serialize, de::DeserializeOwned};
use sqlx::PgPool;
use tracing::{debug, instrument, warn};

use crate::metrics::{track_dashboard_cache, track_dashboard_query};
use crate::modules::dashboard::model::{
    ChartPoint, DashboardStats, EnrollmentTrendPoint, EnrollmentTrendRow, FormationCountRow,
    FormationPerformance, FormationPerformanceRow, MonthlyCountsRow, MonthlyGrowth,
    RecentActivity, StatCard, SuccessRate, UniversityStat, UniversityStatsRow, color_for,
};

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Month-over-month change in percent. An empty previous month counts as one.
pub fn growth_percent(current: i64, last: i64) -> f64 {
    round2((current - last) as f64 / last.max(1) as f64 * 100.0)
}

/// Whole percentage of passed results, 0 without results.
pub fn success_rate(passed: i64, total: i64) -> i64 {
    if total == 0 {
        return 0;
    }
    (passed as f64 / total as f64 * 100.0).round() as i64
}

/// Percentage with two decimals, 0 without results.
pub fn pass_rate(passed: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(passed as f64 / total as f64 * 100.0)
}

fn shift_months(date: NaiveDate, back: i64) -> NaiveDate {
    let months = i64::from(date.year()) * 12 + i64::from(date.month0()) - back;
    let year = months.div_euclid(12) as i32;
    let month = months.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

/// One point per month for the `months_back` months ending with `today`'s
/// month, oldest first. Months missing from `rows` are zero.
pub fn fill_trend(
    rows: &[EnrollmentTrendRow],
    months_back: i64,
    today: NaiveDate,
) -> Vec<EnrollmentTrendPoint> {
    (0..months_back)
        .rev()
        .map(|back| {
            let month = shift_months(today, back);
            let key = month.format("%Y-%m").to_string();
            let students = rows
                .iter()
                .find(|row| row.month_year == key)
                .map_or(0, |row| row.new_enrollments);
            EnrollmentTrendPoint {
                month: key,
                year: month.year(),
                students,
            }
        })
        .collect()
}

pub fn stat_cards(stats: &DashboardStats, language: Language) -> Vec<StatCard> {
    [
        ("total_students", Msg::TotalStudents, stats.total_students),
        ("total_teachers", Msg::TotalTeachers, stats.total_teachers),
        ("total_universities", Msg::TotalUniversities, stats.total_universities),
        ("total_formations", Msg::TotalFormations, stats.total_formations),
        ("pending_enrollments", Msg::PendingEnrollments, stats.pending_enrollments),
        ("active_scholarships", Msg::ActiveScholarships, stats.active_scholarships),
    ]
    .into_iter()
    .map(|(key, title, value)| StatCard {
        key: key.to_string(),
        title: title.text(language).to_string(),
        value,
        display_value: format_number(value, language),
    })
    .collect()
}

pub fn formation_points(rows: Vec<FormationCountRow>) -> Vec<ChartPoint> {
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| ChartPoint {
            label: row.formation_name,
            value: row.student_count as f64,
            color: color_for(i).to_string(),
        })
        .collect()
}

pub fn university_stats(rows: Vec<UniversityStatsRow>) -> Vec<UniversityStat> {
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| UniversityStat {
            university_name: row.university_name,
            student_count: row.student_count,
            teacher_count: row.teacher_count,
            color: color_for(i).to_string(),
        })
        .collect()
}

pub fn formation_performance(rows: Vec<FormationPerformanceRow>) -> Vec<FormationPerformance> {
    rows.into_iter()
        .map(|row| FormationPerformance {
            formation_name: row.formation_name,
            total_students: row.total_students,
            average_gpa: round2(row.average_gpa.unwrap_or(0.0)),
            pass_rate: pass_rate(row.passed_results, row.total_results),
        })
        .collect()
}

pub fn monthly_growth(counts: &MonthlyCountsRow) -> MonthlyGrowth {
    MonthlyGrowth {
        student_growth: growth_percent(counts.students_this_month, counts.students_last_month),
        enrollment_growth: growth_percent(
            counts.enrollments_this_month,
            counts.enrollments_last_month,
        ),
        new_students_this_month: counts.students_this_month,
        pending_enrollments_this_month: counts.pending_this_month,
    }
}

/// Serves `key` from Redis when present, otherwise computes the series and
/// stores it for `ttl_secs`. Cache failures only cost a recomputation.
pub async fn cached<T, F, Fut>(
    cache: Option<&RedisCache>,
    series: &str,
    key: &str,
    ttl_secs: u64,
    compute: F,
) -> Result<T, AppError>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    if let Some(cache) = cache
        && let Some(hit) = cache.get::<T>(key).await
    {
        track_dashboard_cache(series, true);
        return Ok(hit);
    }
    if cache.is_some() {
        track_dashboard_cache(series, false);
    }

    let start = Instant::now();
    let value = compute().await?;
    track_dashboard_query(series, start.elapsed().as_secs_f64());

    if let Some(cache) = cache
        && let Err(e) = cache
            .set_with_ttl(key, &value, Duration::from_secs(ttl_secs))
            .await
    {
        warn!(error = %e, series, "Failed to cache dashboard series");
    }

    Ok(value)
}

pub struct DashboardService;

impl DashboardService {
    #[instrument(skip(db))]
    pub async fn get_dashboard_stats(db: &PgPool) -> Result<DashboardStats, AppError> {
        let stats = sqlx::query_as::<_, DashboardStats>(
            r#"SELECT
                (SELECT COUNT(*) FROM students) AS total_students,
                (SELECT COUNT(*) FROM teachers) AS total_teachers,
                (SELECT COUNT(*) FROM universities) AS total_universities,
                (SELECT COUNT(*) FROM formations WHERE is_active) AS total_formations,
                (SELECT COUNT(*) FROM enrollments WHERE status = 'pending') AS pending_enrollments,
                (SELECT COUNT(*) FROM scholarships WHERE is_active) AS active_scholarships"#,
        )
        .fetch_one(db)
        .await?;

        debug!(?stats, "Dashboard stats computed");
        Ok(stats)
    }

    /// New students per month over the last `months_back` months.
    #[instrument(skip(db))]
    pub async fn get_enrollment_trends(
        db: &PgPool,
        months_back: i64,
    ) -> Result<Vec<EnrollmentTrendPoint>, AppError> {
        let today = Utc::now().date_naive();
        let since = shift_months(today, months_back - 1);

        let rows = sqlx::query_as::<_, EnrollmentTrendRow>(
            r#"SELECT to_char(date_trunc('month', enrollment_date), 'YYYY-MM') AS month_year,
                      COUNT(*) AS new_enrollments
               FROM students
               WHERE enrollment_date >= $1
               GROUP BY 1
               ORDER BY 1"#,
        )
        .bind(since)
        .fetch_all(db)
        .await?;

        Ok(fill_trend(&rows, months_back, today))
    }

    #[instrument(skip(db))]
    pub async fn get_enrollment_stats_by_formation(
        db: &PgPool,
    ) -> Result<Vec<ChartPoint>, AppError> {
        let rows = sqlx::query_as::<_, FormationCountRow>(
            r#"SELECT f.name AS formation_name, COUNT(s.id) AS student_count
               FROM formations f
               LEFT JOIN students s ON s.formation_id = f.id
               GROUP BY f.id, f.name
               ORDER BY student_count DESC, f.name ASC"#,
        )
        .fetch_all(db)
        .await?;

        Ok(formation_points(rows))
    }

    #[instrument(skip(db))]
    pub async fn get_university_stats(db: &PgPool) -> Result<Vec<UniversityStat>, AppError> {
        let rows = sqlx::query_as::<_, UniversityStatsRow>(
            r#"SELECT u.name AS university_name,
                      (SELECT COUNT(*) FROM students s WHERE s.university_id = u.id) AS student_count,
                      (SELECT COUNT(*) FROM teachers t WHERE t.university_id = u.id) AS teacher_count
               FROM universities u
               ORDER BY student_count DESC, u.name ASC"#,
        )
        .fetch_all(db)
        .await?;

        Ok(university_stats(rows))
    }

    /// Latest activity entries, attributed to "Système" when no user is known.
    #[instrument(skip(db))]
    pub async fn get_recent_activities(
        db: &PgPool,
        limit: i64,
        language: Language,
    ) -> Result<Vec<RecentActivity>, AppError> {
        let activities = sqlx::query_as::<_, RecentActivity>(
            r#"SELECT a.id, a.action, a.resource_type, a.resource_id, a.details,
                      COALESCE(p.first_name || ' ' || p.last_name, $2) AS user_name,
                      a.created_at
               FROM activity_logs a
               LEFT JOIN profiles p ON p.id = a.user_id
               ORDER BY a.created_at DESC
               LIMIT $1"#,
        )
        .bind(limit)
        .bind(Msg::SystemUser.text(language))
        .fetch_all(db)
        .await?;

        Ok(activities)
    }

    #[instrument(skip(db))]
    pub async fn get_formation_performance(
        db: &PgPool,
    ) -> Result<Vec<FormationPerformance>, AppError> {
        let rows = sqlx::query_as::<_, FormationPerformanceRow>(
            r#"SELECT f.name AS formation_name,
                      (SELECT COUNT(*) FROM students s WHERE s.formation_id = f.id) AS total_students,
                      (SELECT AVG(s.gpa) FROM students s WHERE s.formation_id = f.id) AS average_gpa,
                      (SELECT COUNT(*) FROM exam_results r
                         JOIN students s ON s.id = r.student_id
                        WHERE s.formation_id = f.id) AS total_results,
                      (SELECT COUNT(*) FROM exam_results r
                         JOIN students s ON s.id = r.student_id
                        WHERE s.formation_id = f.id AND r.is_passed) AS passed_results
               FROM formations f
               ORDER BY total_students DESC, f.name ASC"#,
        )
        .fetch_all(db)
        .await?;

        Ok(formation_performance(rows))
    }

    #[instrument(skip(db))]
    pub async fn get_monthly_growth(db: &PgPool) -> Result<MonthlyGrowth, AppError> {
        let counts = sqlx::query_as::<_, MonthlyCountsRow>(
            r#"WITH bounds AS (
                   SELECT date_trunc('month', NOW()) AS this_month,
                          date_trunc('month', NOW()) - INTERVAL '1 month' AS last_month
               )
               SELECT
                   (SELECT COUNT(*) FROM students, bounds
                     WHERE created_at >= this_month) AS students_this_month,
                   (SELECT COUNT(*) FROM students, bounds
                     WHERE created_at >= last_month AND created_at < this_month) AS students_last_month,
                   (SELECT COUNT(*) FROM enrollments, bounds
                     WHERE created_at >= this_month) AS enrollments_this_month,
                   (SELECT COUNT(*) FROM enrollments, bounds
                     WHERE created_at >= last_month AND created_at < this_month) AS enrollments_last_month,
                   (SELECT COUNT(*) FROM enrollments, bounds
                     WHERE created_at >= this_month AND status = 'pending') AS pending_this_month"#,
        )
        .fetch_one(db)
        .await?;

        Ok(monthly_growth(&counts))
    }

    #[instrument(skip(db))]
    pub async fn get_success_rate(db: &PgPool) -> Result<SuccessRate, AppError> {
        let (total_results, passed_results): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE is_passed) FROM exam_results",
        )
        .fetch_one(db)
        .await?;

        Ok(SuccessRate {
            total_results,
            passed_results,
            success_rate: success_rate(passed_results, total_results),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn growth_treats_empty_last_month_as_one() {
        assert_eq!(growth_percent(5, 0), 500.0);
        assert_eq!(growth_percent(0, 0), 0.0);
        assert_eq!(growth_percent(15, 10), 50.0);
        assert_eq!(growth_percent(2, 3), -33.33);
    }

    #[test]
    fn success_rate_rounds_to_whole_percent() {
        assert_eq!(success_rate(0, 0), 0);
        assert_eq!(success_rate(2, 3), 67);
        assert_eq!(success_rate(10, 10), 100);
    }

    #[test]
    fn pass_rate_keeps_two_decimals() {
        assert_eq!(pass_rate(1, 3), 33.33);
        assert_eq!(pass_rate(0, 0), 0.0);
    }

    #[test]
    fn trend_is_zero_filled_oldest_first() {
        let rows = vec![
            EnrollmentTrendRow {
                month_year: "2025-01".into(),
                new_enrollments: 4,
            },
            EnrollmentTrendRow {
                month_year: "2025-03".into(),
                new_enrollments: 9,
            },
        ];
        let points = fill_trend(&rows, 4, date(2025, 3, 17));

        let months: Vec<&str> = points.iter().map(|p| p.month.as_str()).collect();
        assert_eq!(months, ["2024-12", "2025-01", "2025-02", "2025-03"]);
        let counts: Vec<i64> = points.iter().map(|p| p.students).collect();
        assert_eq!(counts, [0, 4, 0, 9]);
        assert_eq!(points[0].year, 2024);
    }

    #[test]
    fn shifting_months_crosses_years() {
        assert_eq!(shift_months(date(2025, 1, 31), 1), date(2024, 12, 1));
        assert_eq!(shift_months(date(2025, 6, 15), 0), date(2025, 6, 1));
        assert_eq!(shift_months(date(2025, 6, 15), 18), date(2023, 12, 1));
    }

    #[test]
    fn stat_cards_localize_titles_not_values() {
        let stats = DashboardStats {
            total_students: 12500,
            ..Default::default()
        };
        let fr = stat_cards(&stats, Language::Fr);
        let ar = stat_cards(&stats, Language::Ar);

        assert_eq!(fr.len(), 6);
        assert_eq!(fr[0].value, ar[0].value);
        assert_eq!(fr[0].title, "Total Étudiants");
        assert_eq!(fr[0].display_value, "12\u{202F}500");
        assert_eq!(ar[0].display_value, "١٢\u{066C}٥٠٠");
    }

    #[test]
    fn chart_points_cycle_the_palette() {
        let rows = (0..9)
            .map(|i| FormationCountRow {
                formation_name: format!("F{i}"),
                student_count: 9 - i,
            })
            .collect();
        let points = formation_points(rows);
        assert_eq!(points[0].color, points[8].color);
        assert_eq!(points[1].value, 8.0);
    }

    #[test]
    fn performance_defaults_missing_gpa_to_zero() {
        let rows = vec![FormationPerformanceRow {
            formation_name: "Informatique".into(),
            total_students: 0,
            average_gpa: None,
            total_results: 0,
            passed_results: 0,
        }];
        let perf = formation_performance(rows);
        assert_eq!(perf[0].average_gpa, 0.0);
        assert_eq!(perf[0].pass_rate, 0.0);
    }

    #[tokio::test]
    async fn cached_without_redis_always_computes() {
        let value = cached(None, "stats", "dashboard:stats", 30, || async {
            Ok::<_, AppError>(7_i64)
        })
        .await
        .unwrap();
        assert_eq!(value, 7);
    }
}
