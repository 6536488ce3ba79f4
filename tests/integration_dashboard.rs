mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use common::{
    create_test_formation, create_test_profile, create_test_student, create_test_university,
    send, send_with_headers, setup_test_app, sign_in,
};
use mesrs::mesrs_auth::Role;
use sqlx::PgPool;
use tower::ServiceExt;

#[sqlx::test(migrations = "./migrations")]
async fn dashboard_requires_a_session(pool: PgPool) {
    let app = setup_test_app(pool);

    let (status, _) = send(&app, "GET", "/api/dashboard/stats", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn stats_count_the_records(pool: PgPool) {
    let staff = create_test_profile(&pool, Role::Staff).await;
    let university = create_test_university(&pool).await;
    let formation = create_test_formation(&pool, university).await;
    create_test_student(&pool, university, Some(formation)).await;
    create_test_student(&pool, university, Some(formation)).await;
    let app = setup_test_app(pool);
    let token = sign_in(&app, &staff).await;

    let (status, body) = send(&app, "GET", "/api/dashboard/stats", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["refresh_interval_secs"], 30);
    assert_eq!(body["data"]["total_students"], 2);
    assert_eq!(body["data"]["total_universities"], 1);
    assert_eq!(body["data"]["total_formations"], 1);
    assert_eq!(body["data"]["total_teachers"], 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn series_carry_cache_headers(pool: PgPool) {
    let student = create_test_profile(&pool, Role::Student).await;
    let app = setup_test_app(pool);
    let token = sign_in(&app, &student).await;

    let request = Request::builder()
        .uri("/api/dashboard/success-rate")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "private, max-age=300"
    );
    assert!(response.headers().contains_key(header::ETAG));
}

#[sqlx::test(migrations = "./migrations")]
async fn stat_cards_follow_the_language(pool: PgPool) {
    let staff = create_test_profile(&pool, Role::Staff).await;
    let app = setup_test_app(pool);
    let token = sign_in(&app, &staff).await;

    let (_, body) = send(&app, "GET", "/api/dashboard/stat-cards", Some(&token), None).await;
    assert_eq!(body["data"][0]["key"], "total_students");
    assert_eq!(body["data"][0]["title"], "Total Étudiants");

    let (_, body) = send(
        &app,
        "GET",
        "/api/dashboard/stat-cards?lang=ar",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["data"][0]["title"], "مجموع الطلاب");
    assert_eq!(body["data"].as_array().unwrap().len(), 6);
}

#[sqlx::test(migrations = "./migrations")]
async fn enrollment_trends_cover_every_requested_month(pool: PgPool) {
    let staff = create_test_profile(&pool, Role::Staff).await;
    let university = create_test_university(&pool).await;
    create_test_student(&pool, university, None).await;
    let app = setup_test_app(pool);
    let token = sign_in(&app, &staff).await;

    let (status, body) = send(
        &app,
        "GET",
        "/api/dashboard/enrollment-trends?months_back=6",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let points = body["data"].as_array().unwrap();
    assert_eq!(points.len(), 6);
    assert_eq!(points[5]["students"], 1);
    assert!(points[..5].iter().all(|p| p["students"] == 0));

    let (_, body) = send(&app, "GET", "/api/dashboard/enrollment-trends", Some(&token), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 12);
}

#[sqlx::test(migrations = "./migrations")]
async fn chart_series_use_label_value_color_points(pool: PgPool) {
    let staff = create_test_profile(&pool, Role::Staff).await;
    let university = create_test_university(&pool).await;
    let formation = create_test_formation(&pool, university).await;
    create_test_student(&pool, university, Some(formation)).await;
    let app = setup_test_app(pool);
    let token = sign_in(&app, &staff).await;

    let (status, body) = send(&app, "GET", "/api/dashboard/formations", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let point = &body["data"][0];
    assert_eq!(point["label"], "Licence en Informatique");
    assert_eq!(point["value"], 1.0);
    assert_eq!(point["color"], "#006233");

    let (_, body) = send(&app, "GET", "/api/dashboard/universities", Some(&token), None).await;
    assert_eq!(body["data"][0]["student_count"], 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn recent_activity_names_the_actor(pool: PgPool) {
    let staff = create_test_profile(&pool, Role::Staff).await;
    sqlx::query(
        "INSERT INTO activity_logs (user_id, action, resource_type) VALUES (NULL, 'CREATE', 'university')",
    )
    .execute(&pool)
    .await
    .unwrap();
    let app = setup_test_app(pool);
    let token = sign_in(&app, &staff).await;

    let (status, body) = send_with_headers(
        &app,
        "GET",
        "/api/dashboard/activities?limit=5",
        Some(&token),
        None,
        &[("accept-language", "ar")],
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries[0]["action"], "LOGIN");
    assert_eq!(entries[0]["user_name"], "Test Utilisateur");
    assert_eq!(entries[1]["user_name"], "النظام");
}

#[sqlx::test(migrations = "./migrations")]
async fn empty_database_gives_zero_rates(pool: PgPool) {
    let staff = create_test_profile(&pool, Role::Staff).await;
    let app = setup_test_app(pool);
    let token = sign_in(&app, &staff).await;

    let (_, body) = send(&app, "GET", "/api/dashboard/success-rate", Some(&token), None).await;
    assert_eq!(body["data"]["success_rate"], 0);
    assert_eq!(body["data"]["total_results"], 0);

    let (_, body) = send(&app, "GET", "/api/dashboard/monthly-growth", Some(&token), None).await;
    assert_eq!(body["data"]["student_growth"], 0.0);

    let (status, body) = send(
        &app,
        "GET",
        "/api/dashboard/formation-performance",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());
}
