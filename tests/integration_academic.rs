mod common;

use axum::http::StatusCode;
use chrono::{Datelike, Utc};
use common::{
    PASSWORD, create_test_academic_year, create_test_formation, create_test_profile,
    create_test_student, create_test_university, generate_unique_email, send, setup_test_app,
    sign_in, unique,
};
use mesrs::mesrs_auth::Role;
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn only_admins_create_universities(pool: PgPool) {
    let admin = create_test_profile(&pool, Role::Admin).await;
    let staff = create_test_profile(&pool, Role::Staff).await;
    let app = setup_test_app(pool);
    let admin_token = sign_in(&app, &admin).await;
    let staff_token = sign_in(&app, &staff).await;
    let payload = json!({ "code": "una", "name": "Université de Nouakchott Al Aasriya" });

    let (status, _) = send(&app, "POST", "/api/universities", Some(&staff_token), Some(payload.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, "POST", "/api/universities", Some(&admin_token), Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["code"], "UNA");
    assert_eq!(body["is_active"], true);

    let (status, _) = send(&app, "POST", "/api/universities", Some(&admin_token), Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn reads_are_open_to_every_role(pool: PgPool) {
    create_test_university(&pool).await;
    let student = create_test_profile(&pool, Role::Student).await;
    let app = setup_test_app(pool);

    let (status, _) = send(&app, "GET", "/api/universities", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = sign_in(&app, &student).await;
    let (status, body) = send(&app, "GET", "/api/universities?limit=5", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["meta"]["limit"], 5);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn referenced_universities_cannot_be_deleted(pool: PgPool) {
    let admin = create_test_profile(&pool, Role::Admin).await;
    let university = create_test_university(&pool).await;
    create_test_formation(&pool, university).await;
    let app = setup_test_app(pool);
    let token = sign_in(&app, &admin).await;

    let uri = format!("/api/universities/{university}");
    let (status, _) = send(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
async fn only_one_academic_year_is_current(pool: PgPool) {
    let admin = create_test_profile(&pool, Role::Admin).await;
    let older = create_test_academic_year(&pool).await;
    let app = setup_test_app(pool);
    let token = sign_in(&app, &admin).await;

    let (status, created) = send(
        &app,
        "POST",
        "/api/academic-years",
        Some(&token),
        Some(json!({
            "name": "2026-2027",
            "start_date": "2026-09-01",
            "end_date": "2027-07-31",
            "is_current": true
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, current) = send(&app, "GET", "/api/academic-years/current", Some(&token), None).await;
    assert_eq!(current["id"], created["id"]);

    let (status, switched) = send(
        &app,
        "POST",
        &format!("/api/academic-years/{older}/set-current"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(switched["is_current"], true);

    let (_, current) = send(&app, "GET", "/api/academic-years/current", Some(&token), None).await;
    assert_eq!(current["id"], older.to_string());
}

#[sqlx::test(migrations = "./migrations")]
async fn academic_years_must_end_after_they_start(pool: PgPool) {
    let admin = create_test_profile(&pool, Role::Admin).await;
    let app = setup_test_app(pool);
    let token = sign_in(&app, &admin).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/academic-years",
        Some(&token),
        Some(json!({
            "name": "2026-2025",
            "start_date": "2026-09-01",
            "end_date": "2025-07-31"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "./migrations")]
async fn staff_manage_formations(pool: PgPool) {
    let staff = create_test_profile(&pool, Role::Staff).await;
    let teacher = create_test_profile(&pool, Role::Teacher).await;
    let university = create_test_university(&pool).await;
    let app = setup_test_app(pool);
    let staff_token = sign_in(&app, &staff).await;
    let teacher_token = sign_in(&app, &teacher).await;
    let payload = json!({
        "code": unique("MI"),
        "name": "Master en Informatique",
        "university_id": university,
        "level": "master_1"
    });

    let (status, _) = send(&app, "POST", "/api/formations", Some(&teacher_token), Some(payload.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, "POST", "/api/formations", Some(&staff_token), Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["level"], "master_1");

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/formations?level=master_1&university_id={university}"),
        Some(&teacher_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn created_students_get_a_generated_number(pool: PgPool) {
    let staff = create_test_profile(&pool, Role::Staff).await;
    let university = create_test_university(&pool).await;
    let code: String = sqlx::query_scalar("SELECT code FROM universities WHERE id = $1")
        .bind(university)
        .fetch_one(&pool)
        .await
        .unwrap();
    let app = setup_test_app(pool);
    let token = sign_in(&app, &staff).await;

    let mut numbers = Vec::new();
    for first_name in ["Mariem", "Cheikh"] {
        let (status, body) = send(
            &app,
            "POST",
            "/api/students",
            Some(&token),
            Some(json!({
                "first_name": first_name,
                "last_name": "Ahmed",
                "email": generate_unique_email(),
                "password": PASSWORD,
                "university_id": university
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        numbers.push(body["student_number"].as_str().unwrap().to_string());
    }

    let prefix = format!("{code}{}", Utc::now().year());
    assert_eq!(numbers, [format!("{prefix}0001"), format!("{prefix}0002")]);
}

#[sqlx::test(migrations = "./migrations")]
async fn students_are_searchable_by_name_and_number(pool: PgPool) {
    let staff = create_test_profile(&pool, Role::Staff).await;
    let university = create_test_university(&pool).await;
    let student = create_test_student(&pool, university, None).await;
    sqlx::query("UPDATE profiles SET last_name = 'Ould Bah' WHERE id = $1")
        .bind(student.profile.id)
        .execute(&pool)
        .await
        .unwrap();
    create_test_student(&pool, university, None).await;
    let app = setup_test_app(pool);
    let token = sign_in(&app, &staff).await;

    let (status, body) = send(&app, "GET", "/api/students?search=ould%20bah", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["id"], student.id.to_string());

    let (_, body) = send(&app, "GET", "/api/students", Some(&token), None).await;
    assert_eq!(body["meta"]["total"], 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn profiles_are_admin_only(pool: PgPool) {
    let staff = create_test_profile(&pool, Role::Staff).await;
    let admin = create_test_profile(&pool, Role::Admin).await;
    let app = setup_test_app(pool);

    let staff_token = sign_in(&app, &staff).await;
    let (status, _) = send(&app, "GET", "/api/profiles", Some(&staff_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin_token = sign_in(&app, &admin).await;
    let (status, body) = send(&app, "GET", "/api/profiles?role=staff", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn teachers_are_searchable_by_specialization(pool: PgPool) {
    let staff = create_test_profile(&pool, Role::Staff).await;
    let university = create_test_university(&pool).await;
    let app = setup_test_app(pool);
    let token = sign_in(&app, &staff).await;

    for (first_name, specialization) in [("Mohamed", "Génie civil"), ("Khadija", "Mathématiques")] {
        let (status, body) = send(
            &app,
            "POST",
            "/api/teachers",
            Some(&token),
            Some(json!({
                "first_name": first_name,
                "last_name": "Salem",
                "email": generate_unique_email(),
                "password": PASSWORD,
                "university_id": university,
                "department": "Sciences",
                "specialization": specialization
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert!(body["employee_number"].as_str().unwrap().starts_with("ENS"));
    }

    let (status, body) = send(&app, "GET", "/api/teachers?search=CIVIL", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["first_name"], "Mohamed");

    let (_, body) = send(&app, "GET", "/api/teachers?search=math", Some(&token), None).await;
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["first_name"], "Khadija");

    let (_, body) = send(&app, "GET", "/api/teachers?department=Sciences", Some(&token), None).await;
    assert_eq!(body["meta"]["total"], 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn student_search_keeps_whitespace(pool: PgPool) {
    let staff = create_test_profile(&pool, Role::Staff).await;
    let university = create_test_university(&pool).await;
    let bah = create_test_student(&pool, university, None).await;
    let ouldou = create_test_student(&pool, university, None).await;
    for (student, last_name) in [(&bah, "Ould Bah"), (&ouldou, "Ouldou")] {
        sqlx::query("UPDATE profiles SET last_name = $1 WHERE id = $2")
            .bind(last_name)
            .bind(student.profile.id)
            .execute(&pool)
            .await
            .unwrap();
    }
    let app = setup_test_app(pool);
    let token = sign_in(&app, &staff).await;

    let (status, body) = send(&app, "GET", "/api/students?search=OULD%20", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["id"], bah.id.to_string());

    let (_, body) = send(&app, "GET", "/api/students?search=ould", Some(&token), None).await;
    assert_eq!(body["meta"]["total"], 2);
}
