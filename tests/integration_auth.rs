mod common;

use axum::http::StatusCode;
use common::{
    PASSWORD, create_test_profile, generate_unique_email, send, send_with_headers, setup_test_app,
    sign_in,
};
use mesrs::mesrs_auth::Role;
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn signup_creates_a_student_account(pool: PgPool) {
    let app = setup_test_app(pool);
    let email = generate_unique_email();

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({
            "email": email,
            "password": PASSWORD,
            "first_name": "Aminetou",
            "last_name": "Sidi"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], email.to_lowercase());
    assert_eq!(body["user"]["role"], "student");
    assert!(body["access_token"].as_str().is_some());
    assert!(body["refresh_token"].as_str().is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn signup_rejects_a_registered_email(pool: PgPool) {
    let existing = create_test_profile(&pool, Role::Student).await;
    let app = setup_test_app(pool);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({
            "email": existing.email,
            "password": PASSWORD,
            "first_name": "Autre",
            "last_name": "Personne"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn signin_returns_tokens_and_profile(pool: PgPool) {
    let profile = create_test_profile(&pool, Role::Staff).await;
    let app = setup_test_app(pool);

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/signin",
        None,
        Some(json!({ "email": profile.email, "password": PASSWORD })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], profile.id.to_string());
    assert_eq!(body["user"]["role"], "staff");
    assert!(body["expires_in"].as_i64().unwrap() > 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn wrong_password_is_rejected_in_the_requested_language(pool: PgPool) {
    let profile = create_test_profile(&pool, Role::Student).await;
    let app = setup_test_app(pool);
    let credentials = json!({ "email": profile.email, "password": "pas-le-bon" });

    let (status, body) = send(&app, "POST", "/api/auth/signin", None, Some(credentials.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Email ou mot de passe incorrect");

    let (status, body) = send_with_headers(
        &app,
        "POST",
        "/api/auth/signin",
        None,
        Some(credentials),
        &[("accept-language", "ar")],
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "البريد الإلكتروني أو كلمة المرور غير صحيحة");
}

#[sqlx::test(migrations = "./migrations")]
async fn unknown_email_looks_like_a_wrong_password(pool: PgPool) {
    let app = setup_test_app(pool);

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/signin",
        None,
        Some(json!({ "email": generate_unique_email(), "password": PASSWORD })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Email ou mot de passe incorrect");
}

#[sqlx::test(migrations = "./migrations")]
async fn disabled_accounts_cannot_sign_in(pool: PgPool) {
    let profile = create_test_profile(&pool, Role::Teacher).await;
    sqlx::query("UPDATE profiles SET is_active = FALSE WHERE id = $1")
        .bind(profile.id)
        .execute(&pool)
        .await
        .unwrap();
    let app = setup_test_app(pool);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/signin",
        None,
        Some(json!({ "email": profile.email, "password": PASSWORD })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn session_and_role_require_a_token(pool: PgPool) {
    let profile = create_test_profile(&pool, Role::Teacher).await;
    let app = setup_test_app(pool);

    let (status, _) = send(&app, "GET", "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = sign_in(&app, &profile).await;

    let (status, body) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], profile.email);

    let (status, body) = send(&app, "GET", "/api/auth/role", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "teacher");
    assert_eq!(body["is_teacher"], true);
    assert_eq!(body["is_admin"], false);
}

#[sqlx::test(migrations = "./migrations")]
async fn signed_out_refresh_tokens_are_revoked(pool: PgPool) {
    let profile = create_test_profile(&pool, Role::Student).await;
    let app = setup_test_app(pool);

    let (_, session) = send(
        &app,
        "POST",
        "/api/auth/signin",
        None,
        Some(json!({ "email": profile.email, "password": PASSWORD })),
    )
    .await;
    let access = session["access_token"].as_str().unwrap();
    let refresh = session["refresh_token"].as_str().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/refresh",
        None,
        Some(json!({ "refresh_token": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["access_token"].as_str().is_some());

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/signout",
        Some(access),
        Some(json!({ "refresh_token": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/refresh",
        None,
        Some(json!({ "refresh_token": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn forgot_password_does_not_reveal_unknown_emails(pool: PgPool) {
    let app = setup_test_app(pool);

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/forgot-password",
        None,
        Some(json!({ "email": generate_unique_email() })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn changed_password_replaces_the_old_one(pool: PgPool) {
    let profile = create_test_profile(&pool, Role::Staff).await;
    let app = setup_test_app(pool);
    let token = sign_in(&app, &profile).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/change-password",
        Some(&token),
        Some(json!({ "current_password": "mauvais", "new_password": "nouveau-secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/change-password",
        Some(&token),
        Some(json!({ "current_password": PASSWORD, "new_password": "nouveau-secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/signin",
        None,
        Some(json!({ "email": profile.email, "password": "nouveau-secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
