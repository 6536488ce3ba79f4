mod common;

use axum::http::StatusCode;
use common::{create_test_profile, send, send_with_headers, setup_test_app, sign_in};
use mesrs::mesrs_auth::Role;
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn anonymous_visitors_are_sent_to_sign_in(pool: PgPool) {
    let app = setup_test_app(pool);

    let (status, body) = send(
        &app,
        "GET",
        "/api/navigation/resolve?path=/etudiants/",
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "redirect_to_auth");
    assert_eq!(body["redirect_to"], "/auth");
    assert_eq!(body["from"], "/etudiants");
}

#[sqlx::test(migrations = "./migrations")]
async fn redirect_remembers_the_full_destination(pool: PgPool) {
    let app = setup_test_app(pool);

    let (_, body) = send(
        &app,
        "GET",
        "/api/navigation/resolve?path=%2Fetudiants%3Fsearch%3Dould%26page%3D2",
        None,
        None,
    )
    .await;

    assert_eq!(body["outcome"], "redirect_to_auth");
    assert_eq!(body["from"], "/etudiants?search=ould&page=2");
}

#[sqlx::test(migrations = "./migrations")]
async fn guard_uses_the_callers_role(pool: PgPool) {
    let teacher = create_test_profile(&pool, Role::Teacher).await;
    let app = setup_test_app(pool);
    let token = sign_in(&app, &teacher).await;

    let (_, body) = send(
        &app,
        "GET",
        "/api/navigation/resolve?path=/examens",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["outcome"], "allow");

    let (_, body) = send(
        &app,
        "GET",
        "/api/navigation/resolve?path=/universites",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["outcome"], "redirect_to_unauthorized");
    assert_eq!(body["redirect_to"], "/unauthorized");

    let (_, body) = send(
        &app,
        "GET",
        "/api/navigation/resolve?path=/inconnu",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["outcome"], "not_found");
}

#[sqlx::test(migrations = "./migrations")]
async fn menu_requires_a_session(pool: PgPool) {
    let app = setup_test_app(pool);

    let (status, _) = send(&app, "GET", "/api/navigation/menu", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn menu_is_filtered_and_localized(pool: PgPool) {
    let student = create_test_profile(&pool, Role::Student).await;
    let app = setup_test_app(pool);
    let token = sign_in(&app, &student).await;

    let (status, body) = send(&app, "GET", "/api/navigation/menu", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["language"], "fr");
    assert_eq!(body["direction"], "ltr");
    let ids: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["dashboard", "scholarships", "settings"]);

    let (_, body) = send_with_headers(
        &app,
        "GET",
        "/api/navigation/menu",
        Some(&token),
        None,
        &[("accept-language", "ar-MR,ar;q=0.9")],
    )
    .await;
    assert_eq!(body["language"], "ar");
    assert_eq!(body["direction"], "rtl");
    assert_eq!(body["ministry"], "وزارة التعليم العالي والبحث العلمي");
}
