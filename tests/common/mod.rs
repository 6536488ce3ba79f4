#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use mesrs::mesrs_auth::Role;
use mesrs::mesrs_core::password::hash_password;
use mesrs::router::init_router;
use mesrs::state::AppState;
use serde_json::{Value, json};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

pub const PASSWORD: &str = "motdepasse123";

pub struct TestProfile {
    pub id: Uuid,
    pub email: String,
    pub password: String,
    pub role: Role,
}

pub struct TestStudent {
    pub id: Uuid,
    pub profile: TestProfile,
}

pub fn setup_test_app(pool: PgPool) -> Router {
    dotenvy::dotenv().ok();
    let mut state = AppState::from_env(pool);
    // oneshot requests carry no peer address for the governor to key on
    state.rate_limit_config.enabled = false;
    init_router(state)
}

pub fn unique(prefix: &str) -> String {
    format!("{prefix}{}", &Uuid::new_v4().simple().to_string()[..8]).to_uppercase()
}

pub fn generate_unique_email() -> String {
    format!("test-{}@mesrs.mr", Uuid::new_v4())
}

pub async fn create_test_profile(pool: &PgPool, role: Role) -> TestProfile {
    let email = generate_unique_email();
    let hashed = hash_password(PASSWORD).unwrap();

    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO profiles (email, password_hash, first_name, last_name, role)
         VALUES ($1, $2, 'Test', 'Utilisateur', $3)
         RETURNING id",
    )
    .bind(&email)
    .bind(&hashed)
    .bind(role)
    .fetch_one(pool)
    .await
    .unwrap();

    TestProfile {
        id,
        email,
        password: PASSWORD.to_string(),
        role,
    }
}

pub async fn create_test_university(pool: &PgPool) -> Uuid {
    sqlx::query_scalar("INSERT INTO universities (code, name) VALUES ($1, $2) RETURNING id")
        .bind(unique("U"))
        .bind("Université de Test")
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn create_test_academic_year(pool: &PgPool) -> Uuid {
    sqlx::query_scalar(
        "INSERT INTO academic_years (name, start_date, end_date, is_current)
         VALUES ($1, '2025-09-01', '2026-07-31', FALSE)
         RETURNING id",
    )
    .bind(unique("AY"))
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_test_formation(pool: &PgPool, university_id: Uuid) -> Uuid {
    sqlx::query_scalar(
        "INSERT INTO formations (code, name, university_id, level)
         VALUES ($1, 'Licence en Informatique', $2, 'licence_1')
         RETURNING id",
    )
    .bind(unique("F"))
    .bind(university_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_test_student(
    pool: &PgPool,
    university_id: Uuid,
    formation_id: Option<Uuid>,
) -> TestStudent {
    let profile = create_test_profile(pool, Role::Student).await;
    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO students (student_number, profile_id, university_id, formation_id)
         VALUES ($1, $2, $3, $4)
         RETURNING id",
    )
    .bind(unique("S"))
    .bind(profile.id)
    .bind(university_id)
    .bind(formation_id)
    .fetch_one(pool)
    .await
    .unwrap();

    TestStudent { id, profile }
}

pub async fn sign_in(app: &Router, profile: &TestProfile) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/signin",
        None,
        Some(json!({ "email": profile.email, "password": profile.password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "sign in failed: {body}");
    body["access_token"].as_str().unwrap().to_string()
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    send_with_headers(app, method, uri, token, body, &[]).await
}

pub async fn send_with_headers(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
    headers: &[(&str, &str)],
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }

    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}
