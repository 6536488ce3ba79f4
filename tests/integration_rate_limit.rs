mod common;

use std::net::SocketAddr;

use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use mesrs::mesrs_config::RateLimitConfig;
use mesrs::router::init_router;
use mesrs::state::AppState;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

fn setup_test_app_with_rate_limit(pool: PgPool, rate_limit_config: RateLimitConfig) -> Router {
    dotenvy::dotenv().ok();
    let mut state = AppState::from_env(pool);
    state.rate_limit_config = rate_limit_config;
    init_router(state)
}

/// One sign-in attempt per minute and two general requests.
fn strict_rate_limit_config() -> RateLimitConfig {
    RateLimitConfig {
        enabled: true,
        general_per_second: 60,
        general_burst_size: 2,
        auth_per_second: 60,
        auth_burst_size: 1,
    }
}

fn sign_in_from(peer: &str) -> Request<Body> {
    let addr: SocketAddr = peer.parse().unwrap();
    let mut request = Request::builder()
        .method("POST")
        .uri("/api/auth/signin")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "email": "inconnu@mesrs.mr", "password": "motdepasse123" }).to_string(),
        ))
        .unwrap();
    request.extensions_mut().insert(ConnectInfo(addr));
    request
}

#[sqlx::test(migrations = "./migrations")]
async fn sign_in_attempts_are_limited_per_peer(pool: PgPool) {
    let app = setup_test_app_with_rate_limit(pool, strict_rate_limit_config());

    let response = app.clone().oneshot(sign_in_from("10.0.0.1:4000")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.clone().oneshot(sign_in_from("10.0.0.1:4001")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let response = app.oneshot(sign_in_from("10.0.0.2:4000")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn disabled_limits_let_every_request_through(pool: PgPool) {
    let config = RateLimitConfig {
        enabled: false,
        ..strict_rate_limit_config()
    };
    let app = setup_test_app_with_rate_limit(pool, config);

    for _ in 0..3 {
        let response = app.clone().oneshot(sign_in_from("10.0.0.1:4000")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
