//! Enrollments, exams and results, scholarships and their applications.

use chrono::{Duration, NaiveDate, Utc};
use fake::Fake;
use fake::faker::lorem::fr_fr::Sentence;
use mesrs_models::activity::{ActivityAction, ResourceType};
use mesrs_models::enrollments::EnrollmentStatus;
use mesrs_models::exams::{ExamSession, passes};
use mesrs_models::scholarships::{ApplicationStatus, ScholarshipType};
use sqlx::PgPool;
use std::collections::HashMap;
use std::time::Instant;
use uuid::Uuid;

use super::batch::{Column, Row, insert_rows, text};
use super::models::{SeededCourse, SeededExam, SeededScholarship, SeededStudent};

const ENROLLMENT_COLUMNS: [Column; 7] = [
    ("student_id", "uuid"),
    ("formation_id", "uuid"),
    ("academic_year_id", "uuid"),
    ("status", "enrollment_status"),
    ("enrollment_date", "date"),
    ("validated_by", "uuid"),
    ("validation_date", "timestamptz"),
];

const EXAM_COLUMNS: [Column; 9] = [
    ("name", "text"),
    ("course_id", "uuid"),
    ("exam_date", "date"),
    ("start_time", "time"),
    ("end_time", "time"),
    ("session", "exam_session"),
    ("location", "text"),
    ("max_score", "float8"),
    ("coefficient", "float8"),
];

const RESULT_COLUMNS: [Column; 5] = [
    ("exam_id", "uuid"),
    ("student_id", "uuid"),
    ("score", "float8"),
    ("grade", "text"),
    ("is_passed", "boolean"),
];

const SCHOLARSHIP_COLUMNS: [Column; 8] = [
    ("name", "text"),
    ("type", "scholarship_type"),
    ("amount", "float8"),
    ("duration_months", "int4"),
    ("max_recipients", "int4"),
    ("deadline", "date"),
    ("criteria", "text"),
    ("academic_year_id", "uuid"),
];

const APPLICATION_COLUMNS: [Column; 7] = [
    ("scholarship_id", "uuid"),
    ("student_id", "uuid"),
    ("status", "application_status"),
    ("score", "float8"),
    ("motivation_letter", "text"),
    ("decision_by", "uuid"),
    ("decision_date", "timestamptz"),
];

const ACTIVITY_COLUMNS: [Column; 4] = [
    ("user_id", "uuid"),
    ("action", "text"),
    ("resource_type", "text"),
    ("resource_id", "uuid"),
];

/// Maps a roll in `0..100` to a status: mostly active, some still pending.
pub fn enrollment_status_for(roll: u32) -> EnrollmentStatus {
    match roll {
        0..20 => EnrollmentStatus::Pending,
        20..35 => EnrollmentStatus::Approved,
        35..45 => EnrollmentStatus::Rejected,
        45..90 => EnrollmentStatus::Active,
        _ => EnrollmentStatus::Completed,
    }
}

/// French grading mention for a score out of `max_score`.
pub fn mention(score: f64, max_score: f64) -> &'static str {
    let on_twenty = score / max_score * 20.0;
    if on_twenty >= 16.0 {
        "Très bien"
    } else if on_twenty >= 14.0 {
        "Bien"
    } else if on_twenty >= 12.0 {
        "Assez bien"
    } else if on_twenty >= 10.0 {
        "Passable"
    } else {
        "Ajourné"
    }
}

/// Random score in `0..=max_score`, rounded to the quarter point.
fn quarter_score(max_score: f64) -> f64 {
    let raw: f64 = (0.0..max_score).fake();
    ((raw * 4.0).round() / 4.0).min(max_score)
}

pub async fn seed_enrollments(
    db: &PgPool,
    students: &[SeededStudent],
    academic_year_id: Uuid,
    validated_by: Option<Uuid>,
) -> Result<usize, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("📝 Seeding {} enrollments...", students.len());

    let validated_at = Utc::now().to_rfc3339();
    let rows: Vec<Row> = students
        .iter()
        .map(|student| {
            let status = enrollment_status_for((0..100).fake::<u32>());
            let decided = status != EnrollmentStatus::Pending;
            vec![
                text(student.id),
                text(student.formation_id),
                text(academic_year_id),
                text(status.as_str()),
                text(student.enrollment_date),
                validated_by.filter(|_| decided).map(|id| id.to_string()),
                decided.then(|| validated_at.clone()),
            ]
        })
        .collect();

    let mut tx = db.begin().await?;
    let ids = insert_rows(&mut tx, "enrollments", &ENROLLMENT_COLUMNS, &rows).await?;
    tx.commit().await?;

    println!(
        "   ✓ Inserted {} enrollments in {:?}",
        ids.len(),
        start_time.elapsed()
    );
    Ok(ids.len())
}

/// One normal-session exam per course, plus a catch-up session for every third.
pub async fn seed_exams(
    db: &PgPool,
    courses: &[SeededCourse],
    today: NaiveDate,
) -> Result<Vec<SeededExam>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🖊️  Seeding exams...");

    let mut rows: Vec<Row> = Vec::with_capacity(courses.len() + courses.len() / 3);
    let mut formation_ids = Vec::with_capacity(rows.capacity());
    for (i, course) in courses.iter().enumerate() {
        let exam_date = today - Duration::days((7..150).fake::<i64>());
        let mut sessions = vec![(ExamSession::Normal, exam_date)];
        if i % 3 == 0 {
            sessions.push((ExamSession::CatchUp, exam_date + Duration::days(30)));
        }

        for (session, date) in sessions {
            let name = match session {
                ExamSession::Normal => "Examen final",
                ExamSession::CatchUp => "Examen de rattrapage",
            };
            rows.push(vec![
                text(name),
                text(course.id),
                text(date),
                text("08:30"),
                text("10:30"),
                text(session.as_str()),
                text(format!("Amphi {}", (1..12).fake::<u32>())),
                text(20.0),
                text((1..4).fake::<u32>()),
            ]);
            formation_ids.push(course.formation_id);
        }
    }

    let mut tx = db.begin().await?;
    let ids = insert_rows(&mut tx, "exams", &EXAM_COLUMNS, &rows).await?;
    tx.commit().await?;

    println!(
        "   ✓ Inserted {} exams in {:?}",
        ids.len(),
        start_time.elapsed()
    );

    Ok(ids
        .into_iter()
        .zip(formation_ids)
        .map(|(id, formation_id)| SeededExam {
            id,
            formation_id,
            max_score: 20.0,
        })
        .collect())
}

/// Grades every student of the exam's formation.
pub async fn seed_exam_results(
    db: &PgPool,
    exams: &[SeededExam],
    students: &[SeededStudent],
) -> Result<usize, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("📊 Seeding exam results...");

    let mut by_formation: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for student in students {
        by_formation
            .entry(student.formation_id)
            .or_default()
            .push(student.id);
    }

    let mut rows: Vec<Row> = Vec::new();
    for exam in exams {
        for student_id in by_formation.get(&exam.formation_id).into_iter().flatten() {
            let score = quarter_score(exam.max_score);
            rows.push(vec![
                text(exam.id),
                text(student_id),
                text(score),
                text(mention(score, exam.max_score)),
                text(passes(score, exam.max_score)),
            ]);
        }
    }

    let mut tx = db.begin().await?;
    let ids = insert_rows(&mut tx, "exam_results", &RESULT_COLUMNS, &rows).await?;
    tx.commit().await?;

    println!(
        "   ✓ Inserted {} exam results in {:?}",
        ids.len(),
        start_time.elapsed()
    );
    Ok(ids.len())
}

fn scholarship_shape(kind: ScholarshipType) -> (&'static str, f64, i32) {
    match kind {
        ScholarshipType::Excellence => ("Bourse d'excellence", 15_000.0, 10),
        ScholarshipType::Social => ("Bourse sociale", 8_000.0, 12),
        ScholarshipType::Research => ("Bourse de recherche doctorale", 25_000.0, 36),
    }
}

pub async fn seed_scholarships(
    db: &PgPool,
    count: usize,
    academic_year_id: Uuid,
    today: NaiveDate,
) -> Result<Vec<SeededScholarship>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("💰 Seeding {} scholarships...", count);

    let kinds = [
        ScholarshipType::Excellence,
        ScholarshipType::Social,
        ScholarshipType::Research,
    ];
    let mut caps = Vec::with_capacity(count);
    let rows: Vec<Row> = (0..count)
        .map(|i| {
            let kind = kinds[i % kinds.len()];
            let (name, base_amount, months) = scholarship_shape(kind);
            let max_recipients = (5..30).fake::<i32>();
            caps.push(max_recipients);
            vec![
                text(format!("{name} {}", i / kinds.len() + 1)),
                text(kind.as_str()),
                text(base_amount + (0..10).fake::<u32>() as f64 * 500.0),
                text(months),
                text(max_recipients),
                text(today + Duration::days((15..90).fake::<i64>())),
                text(Sentence(6..12).fake::<String>()),
                text(academic_year_id),
            ]
        })
        .collect();

    let mut tx = db.begin().await?;
    let ids = insert_rows(&mut tx, "scholarships", &SCHOLARSHIP_COLUMNS, &rows).await?;
    tx.commit().await?;

    println!(
        "   ✓ Inserted {} scholarships in {:?}",
        ids.len(),
        start_time.elapsed()
    );

    Ok(ids
        .into_iter()
        .zip(caps)
        .map(|(id, max_recipients)| SeededScholarship { id, max_recipients })
        .collect())
}

/// Statuses for `count` applicants: approvals never exceed `max_recipients`.
pub fn application_statuses(count: usize, max_recipients: i32) -> Vec<ApplicationStatus> {
    let approved = (count / 3).min(max_recipients.max(0) as usize);
    let rejected = count / 4;
    (0..count)
        .map(|i| {
            if i < approved {
                ApplicationStatus::Approved
            } else if i < approved + rejected {
                ApplicationStatus::Rejected
            } else {
                ApplicationStatus::Pending
            }
        })
        .collect()
}

/// Each scholarship draws a contiguous window of distinct applicants.
pub async fn seed_applications(
    db: &PgPool,
    scholarships: &[SeededScholarship],
    students: &[SeededStudent],
    decided_by: Option<Uuid>,
) -> Result<usize, Box<dyn std::error::Error>> {
    if students.is_empty() {
        return Ok(0);
    }
    let start_time = Instant::now();
    println!("📨 Seeding scholarship applications...");

    let decided_at = Utc::now().to_rfc3339();
    let mut rows: Vec<Row> = Vec::new();
    for scholarship in scholarships {
        let count = (scholarship.max_recipients.max(1) as usize * 2).min(students.len());
        let offset = (0..students.len()).fake::<usize>();

        for (i, status) in application_statuses(count, scholarship.max_recipients)
            .into_iter()
            .enumerate()
        {
            let student = &students[(offset + i) % students.len()];
            let decided = status != ApplicationStatus::Pending;
            rows.push(vec![
                text(scholarship.id),
                text(student.id),
                text(status.as_str()),
                text(((0.0..100.0).fake::<f64>() * 10.0).round() / 10.0),
                text(Sentence(10..20).fake::<String>()),
                decided_by.filter(|_| decided).map(|id| id.to_string()),
                decided.then(|| decided_at.clone()),
            ]);
        }
    }

    let mut tx = db.begin().await?;
    let ids = insert_rows(
        &mut tx,
        "scholarship_applications",
        &APPLICATION_COLUMNS,
        &rows,
    )
    .await?;
    tx.commit().await?;

    println!(
        "   ✓ Inserted {} applications in {:?}",
        ids.len(),
        start_time.elapsed()
    );
    Ok(ids.len())
}

/// Records creation entries so the activity feed is not empty after seeding.
pub async fn seed_activity(
    db: &PgPool,
    actor: Option<Uuid>,
    created: &[(ResourceType, Uuid)],
) -> Result<usize, Box<dyn std::error::Error>> {
    let rows: Vec<Row> = created
        .iter()
        .map(|(resource, id)| {
            vec![
                actor.map(|id| id.to_string()),
                text(ActivityAction::Create.as_str()),
                text(resource.as_str()),
                text(id),
            ]
        })
        .collect();

    let mut tx = db.begin().await?;
    let ids = insert_rows(&mut tx, "activity_logs", &ACTIVITY_COLUMNS, &rows).await?;
    tx.commit().await?;
    Ok(ids.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_rolls_cover_every_bucket() {
        assert_eq!(enrollment_status_for(0), EnrollmentStatus::Pending);
        assert_eq!(enrollment_status_for(25), EnrollmentStatus::Approved);
        assert_eq!(enrollment_status_for(40), EnrollmentStatus::Rejected);
        assert_eq!(enrollment_status_for(60), EnrollmentStatus::Active);
        assert_eq!(enrollment_status_for(99), EnrollmentStatus::Completed);
    }

    #[test]
    fn mentions_follow_the_twenty_point_scale() {
        assert_eq!(mention(17.0, 20.0), "Très bien");
        assert_eq!(mention(14.0, 20.0), "Bien");
        assert_eq!(mention(6.0, 10.0), "Assez bien");
        assert_eq!(mention(10.0, 20.0), "Passable");
        assert_eq!(mention(9.75, 20.0), "Ajourné");
    }

    #[test]
    fn quarter_scores_stay_in_range() {
        for _ in 0..200 {
            let score = quarter_score(20.0);
            assert!((0.0..=20.0).contains(&score));
            assert_eq!((score * 4.0).fract(), 0.0);
        }
    }

    #[test]
    fn approvals_respect_capacity() {
        let statuses = application_statuses(30, 4);
        let approved = statuses
            .iter()
            .filter(|s| **s == ApplicationStatus::Approved)
            .count();
        assert_eq!(approved, 4);
        assert_eq!(statuses.len(), 30);
        assert!(statuses.contains(&ApplicationStatus::Pending));

        assert!(application_statuses(0, 10).is_empty());
    }
}
