mod common;

use axum::http::StatusCode;
use common::{
    create_test_academic_year, create_test_formation, create_test_profile, create_test_student,
    create_test_university, send, setup_test_app, sign_in, unique,
};
use mesrs::mesrs_auth::Role;
use serde_json::{Value, json};
use sqlx::PgPool;
use uuid::Uuid;

async fn create_test_course(pool: &PgPool, formation_id: Uuid) -> Uuid {
    sqlx::query_scalar(
        "INSERT INTO courses (code, name, formation_id) VALUES ($1, 'Algorithmique', $2) RETURNING id",
    )
    .bind(unique("C"))
    .bind(formation_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn enrollment_moves_through_its_lifecycle(pool: PgPool) {
    let staff = create_test_profile(&pool, Role::Staff).await;
    let university = create_test_university(&pool).await;
    let formation = create_test_formation(&pool, university).await;
    let year = create_test_academic_year(&pool).await;
    let student = create_test_student(&pool, university, Some(formation)).await;
    let app = setup_test_app(pool);
    let token = sign_in(&app, &staff).await;

    let (status, enrollment) = send(
        &app,
        "POST",
        "/api/enrollments",
        Some(&token),
        Some(json!({
            "student_id": student.id,
            "formation_id": formation,
            "academic_year_id": year
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{enrollment}");
    assert_eq!(enrollment["status"], "pending");
    assert_eq!(enrollment["validated_by"], Value::Null);
    let id = enrollment["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/enrollments/{id}/activate"),
        Some(&token),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/enrollments/{id}/validate"),
        Some(&token),
        Some(json!({ "notes": "Dossier complet" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "approved");
    assert_eq!(body["validated_by"], staff.id.to_string());
    assert!(body["validation_date"].is_string());

    for (step, expected) in [("activate", "active"), ("complete", "completed")] {
        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/enrollments/{id}/{step}"),
            Some(&token),
            Some(json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], expected);
    }

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/enrollments/{id}/reject"),
        Some(&token),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "./migrations")]
async fn a_student_enrolls_once_per_formation_and_year(pool: PgPool) {
    let staff = create_test_profile(&pool, Role::Staff).await;
    let university = create_test_university(&pool).await;
    let formation = create_test_formation(&pool, university).await;
    let year = create_test_academic_year(&pool).await;
    let student = create_test_student(&pool, university, Some(formation)).await;
    let app = setup_test_app(pool);
    let token = sign_in(&app, &staff).await;
    let payload = json!({
        "student_id": student.id,
        "formation_id": formation,
        "academic_year_id": year
    });

    let (status, _) = send(&app, "POST", "/api/enrollments", Some(&token), Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(&app, "POST", "/api/enrollments", Some(&token), Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, list) = send(
        &app,
        "GET",
        "/api/enrollments?status=pending",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(list["meta"]["total"], 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn teachers_grade_and_scores_are_bounded(pool: PgPool) {
    let staff = create_test_profile(&pool, Role::Staff).await;
    let teacher = create_test_profile(&pool, Role::Teacher).await;
    let university = create_test_university(&pool).await;
    let formation = create_test_formation(&pool, university).await;
    let course = create_test_course(&pool, formation).await;
    let student = create_test_student(&pool, university, Some(formation)).await;
    let app = setup_test_app(pool);
    let staff_token = sign_in(&app, &staff).await;
    let teacher_token = sign_in(&app, &teacher).await;

    let (status, exam) = send(
        &app,
        "POST",
        "/api/exams",
        Some(&staff_token),
        Some(json!({
            "name": "Examen final",
            "course_id": course,
            "exam_date": "2026-01-15",
            "start_time": "08:30:00",
            "end_time": "10:30:00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{exam}");
    assert_eq!(exam["session"], "normal");
    assert_eq!(exam["max_score"], 20.0);
    let results_uri = format!("/api/exams/{}/results", exam["id"].as_str().unwrap());

    let (status, _) = send(
        &app,
        "POST",
        &results_uri,
        Some(&teacher_token),
        Some(json!({ "student_id": student.id, "score": 21.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, result) = send(
        &app,
        "POST",
        &results_uri,
        Some(&teacher_token),
        Some(json!({ "student_id": student.id, "score": 10.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{result}");
    assert_eq!(result["is_passed"], true);

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/exam-results/{}", result["id"].as_str().unwrap()),
        Some(&teacher_token),
        Some(json!({ "score": 9.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["is_passed"], false);

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/exams/{}", exam["id"].as_str().unwrap()),
        Some(&staff_token),
        Some(json!({ "max_score": 5.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, list) = send(&app, "GET", &results_uri, Some(&teacher_token), None).await;
    assert_eq!(list["meta"]["total"], 1);
    assert_eq!(list["data"][0]["score"], 9.5);
}

#[sqlx::test(migrations = "./migrations")]
async fn grading_waits_for_a_pending_max_score_change(pool: PgPool) {
    let teacher = create_test_profile(&pool, Role::Teacher).await;
    let university = create_test_university(&pool).await;
    let formation = create_test_formation(&pool, university).await;
    let course = create_test_course(&pool, formation).await;
    let student = create_test_student(&pool, university, Some(formation)).await;
    let exam_id: Uuid = sqlx::query_scalar(
        "INSERT INTO exams (name, course_id, exam_date) VALUES ('Partiel', $1, '2026-01-10') RETURNING id",
    )
    .bind(course)
    .fetch_one(&pool)
    .await
    .unwrap();
    let app = setup_test_app(pool.clone());
    let token = sign_in(&app, &teacher).await;

    // An exam edit in flight: the row is locked and max_score is about to drop.
    let mut tx = pool.begin().await.unwrap();
    sqlx::query("SELECT id FROM exams WHERE id = $1 FOR UPDATE")
        .bind(exam_id)
        .execute(&mut *tx)
        .await
        .unwrap();

    let grading = tokio::spawn({
        let app = app.clone();
        async move {
            send(
                &app,
                "POST",
                &format!("/api/exams/{exam_id}/results"),
                Some(&token),
                Some(json!({ "student_id": student.id, "score": 10.0 })),
            )
            .await
        }
    });

    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    sqlx::query("UPDATE exams SET max_score = 5 WHERE id = $1")
        .bind(exam_id)
        .execute(&mut *tx)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let (status, body) = grading.await.unwrap();
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{body}");

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM exam_results WHERE exam_id = $1")
        .bind(exam_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn scholarship_decisions_respect_capacity(pool: PgPool) {
    let staff = create_test_profile(&pool, Role::Staff).await;
    let university = create_test_university(&pool).await;
    let first = create_test_student(&pool, university, None).await;
    let second = create_test_student(&pool, university, None).await;
    let app = setup_test_app(pool);
    let staff_token = sign_in(&app, &staff).await;

    let (status, scholarship) = send(
        &app,
        "POST",
        "/api/scholarships",
        Some(&staff_token),
        Some(json!({
            "name": "Bourse d'excellence",
            "type": "excellence",
            "amount": 15000.0,
            "max_recipients": 1
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{scholarship}");
    assert_eq!(scholarship["duration_months"], 12);
    let scholarship_id = scholarship["id"].as_str().unwrap();

    let mut applications = Vec::new();
    for student in [&first, &second] {
        let token = sign_in(&app, &student.profile).await;
        let (status, application) = send(
            &app,
            "POST",
            "/api/scholarship-applications",
            Some(&token),
            Some(json!({
                "scholarship_id": scholarship_id,
                "motivation_letter": "Je souhaite poursuivre mes études."
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{application}");
        assert_eq!(application["student_id"], student.id.to_string());
        assert_eq!(application["status"], "pending");
        applications.push(application["id"].as_str().unwrap().to_string());
    }

    let decide = |id: &str| format!("/api/scholarship-applications/{id}/decision");

    let (status, approved) = send(
        &app,
        "POST",
        &decide(&applications[0]),
        Some(&staff_token),
        Some(json!({ "status": "approved", "score": 17.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "approved");
    assert_eq!(approved["decision_by"], staff.id.to_string());

    let (status, _) = send(
        &app,
        "POST",
        &decide(&applications[1]),
        Some(&staff_token),
        Some(json!({ "status": "approved" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(
        &app,
        "POST",
        &decide(&applications[0]),
        Some(&staff_token),
        Some(json!({ "status": "rejected" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, rejected) = send(
        &app,
        "POST",
        &decide(&applications[1]),
        Some(&staff_token),
        Some(json!({ "status": "rejected", "comments": "Quota atteint" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rejected["status"], "rejected");
}

#[sqlx::test(migrations = "./migrations")]
async fn students_cannot_decide_or_apply_to_closed_scholarships(pool: PgPool) {
    let university = create_test_university(&pool).await;
    let student = create_test_student(&pool, university, None).await;
    let closed: Uuid = sqlx::query_scalar(
        "INSERT INTO scholarships (name, type, amount, deadline)
         VALUES ('Bourse sociale', 'social', 8000, CURRENT_DATE - 1)
         RETURNING id",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    let app = setup_test_app(pool);
    let token = sign_in(&app, &student.profile).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/scholarship-applications",
        Some(&token),
        Some(json!({ "scholarship_id": closed })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/scholarship-applications/{}/decision", Uuid::new_v4()),
        Some(&token),
        Some(json!({ "status": "approved" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn writes_are_recorded_in_the_activity_log(pool: PgPool) {
    let admin = create_test_profile(&pool, Role::Admin).await;
    let app = setup_test_app(pool);
    let token = sign_in(&app, &admin).await;

    let (status, university) = send(
        &app,
        "POST",
        "/api/universities",
        Some(&token),
        Some(json!({ "code": unique("ACT"), "name": "Université du journal" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, log) = send(
        &app,
        "GET",
        "/api/activities?resource_type=university",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(log["meta"]["total"], 1);
    assert_eq!(log["data"][0]["action"], "CREATE");
    assert_eq!(log["data"][0]["resource_id"], university["id"]);
    assert_eq!(log["data"][0]["user_id"], admin.id.to_string());

    let (_, logins) = send(&app, "GET", "/api/activities?action=LOGIN", Some(&token), None).await;
    assert_eq!(logins["meta"]["total"], 1);
}
