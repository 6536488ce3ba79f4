use axum::{Router, middleware, routing::get};
use mesrs_cache::etag_middleware;

use crate::modules::dashboard::controller::{
    get_dashboard_stats, get_enrollment_stats_by_formation, get_enrollment_trends,
    get_formation_performance, get_monthly_growth, get_recent_activities, get_stat_cards,
    get_success_rate, get_university_stats,
};
use crate::state::AppState;

pub fn init_dashboard_router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(get_dashboard_stats))
        .route("/stat-cards", get(get_stat_cards))
        .route("/enrollment-trends", get(get_enrollment_trends))
        .route("/formations", get(get_enrollment_stats_by_formation))
        .route("/universities", get(get_university_stats))
        .route("/activities", get(get_recent_activities))
        .route("/formation-performance", get(get_formation_performance))
        .route("/monthly-growth", get(get_monthly_growth))
        .route("/success-rate", get(get_success_rate))
        .layer(middleware::from_fn(etag_middleware))
}
