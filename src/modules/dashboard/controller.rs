use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderName, HeaderValue, header::CACHE_CONTROL},
};
use mesrs_cache::{CacheControlConfig, dashboard as keys, hash_params};
use mesrs_core::AppError;
use tracing::instrument;

use crate::middleware::language::RequestLanguage;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::dashboard::model::{
    ChartPoint, DashboardStats, EnrollmentTrendPoint, FormationPerformance, LanguageQuery,
    MonthlyGrowth, RecentActivity, RecentActivityParams, SeriesResponse, StatCard, SuccessRate,
    TrendParams, UniversityStat,
};
use crate::modules::dashboard::service::{DashboardService, cached, stat_cards};
use crate::state::AppState;

type Series<T> = ([(HeaderName, HeaderValue); 1], Json<SeriesResponse<T>>);

fn respond<T>(data: T, refresh_secs: u64) -> Series<T> {
    (
        [(
            CACHE_CONTROL,
            CacheControlConfig::private(refresh_secs).to_header_value(),
        )],
        Json(SeriesResponse::new(data, refresh_secs)),
    )
}

#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    params(LanguageQuery),
    responses(
        (status = 200, description = "Headline counters", body = SeriesResponse<DashboardStats>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Localized load error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
#[instrument(skip(state))]
pub async fn get_dashboard_stats(
    State(state): State<AppState>,
    RequestLanguage(lang): RequestLanguage,
) -> Result<Series<DashboardStats>, AppError> {
    let ttl = state.dashboard_config.stats_refresh_secs;
    let stats = cached(state.cache(), "stats", &keys::series("stats"), ttl, || {
        DashboardService::get_dashboard_stats(&state.db)
    })
    .await
    .map_err(|e| e.localized(lang))?;

    Ok(respond(stats, ttl))
}

/// Headline counters with localized titles and formatted values.
#[utoipa::path(
    get,
    path = "/api/dashboard/stat-cards",
    params(LanguageQuery),
    responses(
        (status = 200, description = "Stat cards", body = SeriesResponse<Vec<StatCard>>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Localized load error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
#[instrument(skip(state))]
pub async fn get_stat_cards(
    State(state): State<AppState>,
    RequestLanguage(lang): RequestLanguage,
) -> Result<Series<Vec<StatCard>>, AppError> {
    let ttl = state.dashboard_config.stats_refresh_secs;
    let key = keys::localized("stat-cards", lang.code());
    let cards = cached(state.cache(), "stat-cards", &key, ttl, || async {
        let stats = DashboardService::get_dashboard_stats(&state.db).await?;
        Ok(stat_cards(&stats, lang))
    })
    .await
    .map_err(|e| e.localized(lang))?;

    Ok(respond(cards, ttl))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/enrollment-trends",
    params(TrendParams),
    responses(
        (status = 200, description = "New students per month, oldest first", body = SeriesResponse<Vec<EnrollmentTrendPoint>>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Localized load error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
#[instrument(skip(state))]
pub async fn get_enrollment_trends(
    State(state): State<AppState>,
    RequestLanguage(lang): RequestLanguage,
    Query(params): Query<TrendParams>,
) -> Result<Series<Vec<EnrollmentTrendPoint>>, AppError> {
    let ttl = state.dashboard_config.trends_refresh_secs;
    let months_back = params.months_back();
    let key = keys::with_params("enrollment-trends", &hash_params(&months_back));
    let trends = cached(state.cache(), "enrollment-trends", &key, ttl, || {
        DashboardService::get_enrollment_trends(&state.db, months_back)
    })
    .await
    .map_err(|e| e.localized(lang))?;

    Ok(respond(trends, ttl))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/formations",
    responses(
        (status = 200, description = "Students per formation", body = SeriesResponse<Vec<ChartPoint>>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Localized load error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
#[instrument(skip(state))]
pub async fn get_enrollment_stats_by_formation(
    State(state): State<AppState>,
    RequestLanguage(lang): RequestLanguage,
) -> Result<Series<Vec<ChartPoint>>, AppError> {
    let ttl = state.dashboard_config.trends_refresh_secs;
    let points = cached(state.cache(), "formations", &keys::series("formations"), ttl, || {
        DashboardService::get_enrollment_stats_by_formation(&state.db)
    })
    .await
    .map_err(|e| e.localized(lang))?;

    Ok(respond(points, ttl))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/universities",
    responses(
        (status = 200, description = "Students and teachers per university", body = SeriesResponse<Vec<UniversityStat>>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Localized load error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
#[instrument(skip(state))]
pub async fn get_university_stats(
    State(state): State<AppState>,
    RequestLanguage(lang): RequestLanguage,
) -> Result<Series<Vec<UniversityStat>>, AppError> {
    let ttl = state.dashboard_config.trends_refresh_secs;
    let stats = cached(
        state.cache(),
        "universities",
        &keys::series("universities"),
        ttl,
        || DashboardService::get_university_stats(&state.db),
    )
    .await
    .map_err(|e| e.localized(lang))?;

    Ok(respond(stats, ttl))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/activities",
    params(RecentActivityParams, LanguageQuery),
    responses(
        (status = 200, description = "Latest activity, newest first", body = SeriesResponse<Vec<RecentActivity>>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Localized load error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
#[instrument(skip(state))]
pub async fn get_recent_activities(
    State(state): State<AppState>,
    RequestLanguage(lang): RequestLanguage,
    Query(params): Query<RecentActivityParams>,
) -> Result<Series<Vec<RecentActivity>>, AppError> {
    let ttl = state.dashboard_config.stats_refresh_secs;
    let limit = params.limit();
    let key = keys::with_params("activities", &hash_params(&(limit, lang.code())));
    let activities = cached(state.cache(), "activities", &key, ttl, || {
        DashboardService::get_recent_activities(&state.db, limit, lang)
    })
    .await
    .map_err(|e| e.localized(lang))?;

    Ok(respond(activities, ttl))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/formation-performance",
    responses(
        (status = 200, description = "Average GPA and pass rate per formation", body = SeriesResponse<Vec<FormationPerformance>>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Localized load error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
#[instrument(skip(state))]
pub async fn get_formation_performance(
    State(state): State<AppState>,
    RequestLanguage(lang): RequestLanguage,
) -> Result<Series<Vec<FormationPerformance>>, AppError> {
    let ttl = state.dashboard_config.performance_refresh_secs;
    let performance = cached(
        state.cache(),
        "formation-performance",
        &keys::series("formation-performance"),
        ttl,
        || DashboardService::get_formation_performance(&state.db),
    )
    .await
    .map_err(|e| e.localized(lang))?;

    Ok(respond(performance, ttl))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/monthly-growth",
    responses(
        (status = 200, description = "This month against last month", body = SeriesResponse<MonthlyGrowth>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Localized load error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
#[instrument(skip(state))]
pub async fn get_monthly_growth(
    State(state): State<AppState>,
    RequestLanguage(lang): RequestLanguage,
) -> Result<Series<MonthlyGrowth>, AppError> {
    let ttl = state.dashboard_config.performance_refresh_secs;
    let growth = cached(
        state.cache(),
        "monthly-growth",
        &keys::series("monthly-growth"),
        ttl,
        || DashboardService::get_monthly_growth(&state.db),
    )
    .await
    .map_err(|e| e.localized(lang))?;

    Ok(respond(growth, ttl))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/success-rate",
    responses(
        (status = 200, description = "Share of passed exam results", body = SeriesResponse<SuccessRate>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Localized load error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
#[instrument(skip(state))]
pub async fn get_success_rate(
    State(state): State<AppState>,
    RequestLanguage(lang): RequestLanguage,
) -> Result<Series<SuccessRate>, AppError> {
    let ttl = state.dashboard_config.performance_refresh_secs;
    let rate = cached(
        state.cache(),
        "success-rate",
        &keys::series("success-rate"),
        ttl,
        || DashboardService::get_success_rate(&state.db),
    )
    .await
    .map_err(|e| e.localized(lang))?;

    Ok(respond(rate, ttl))
}
