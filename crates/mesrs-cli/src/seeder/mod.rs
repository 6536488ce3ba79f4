//! Database seeding for development and demos.
//!
//! - [`academic`] - universities, academic years, formations and courses
//! - [`people`] - staff, teacher and student profiles
//! - [`workflows`] - enrollments, exams, results, scholarships and applications
//! - [`batch`] - the multi-row INSERT every seeder goes through
//! - [`models`] - seed rows and [`SeedConfig`]
//!
//! Rows are generated in parallel with Rayon and inserted in batches. A single
//! bcrypt hash at cost 4 is shared by every seeded account.

pub mod academic;
pub mod batch;
pub mod models;
pub mod people;
pub mod workflows;

pub use models::SeedConfig;

use bcrypt::hash;
use chrono::Utc;
use mesrs_models::Role;
use mesrs_models::activity::ResourceType;
use sqlx::PgPool;
use std::time::Instant;
use uuid::Uuid;

pub const DEFAULT_PASSWORD: &str = "password123";

const PREVIOUS_ACADEMIC_YEARS: usize = 2;

pub fn hash_password() -> Result<String, bcrypt::BcryptError> {
    hash(DEFAULT_PASSWORD, 4)
}

/// Seeds the whole academic structure, people and workflows.
pub async fn seed_all(db: &PgPool, config: SeedConfig) -> Result<(), Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    let today = Utc::now().date_naive();

    println!("🌱 Starting full database seeding...");
    println!(
        "   - Universities: {}, formations per university: {}, courses per formation: {}",
        config.num_universities, config.formations_per_university, config.courses_per_formation
    );
    println!(
        "   - People: {} staff, {} teachers per university, {} students per formation",
        config.staff, config.teachers_per_university, config.students_per_formation
    );

    let password_hash = hash_password()?;
    let suffix = academic::run_suffix();

    let current_year = academic::seed_academic_years(db, today, PREVIOUS_ACADEMIC_YEARS).await?;
    let universities = academic::seed_universities(db, config.num_universities, &suffix).await?;
    let formations =
        academic::seed_formations(db, &universities, config.formations_per_university).await?;

    let staff = people::seed_staff(db, config.staff, &password_hash).await?;
    let teachers = people::seed_teachers(
        db,
        &universities,
        config.teachers_per_university,
        today,
        &password_hash,
    )
    .await?;
    let courses = academic::seed_courses(
        db,
        &formations,
        &teachers,
        current_year,
        config.courses_per_formation,
    )
    .await?;
    let students = people::seed_students(
        db,
        &universities,
        &formations,
        config.students_per_formation,
        current_year,
        today,
        &password_hash,
    )
    .await?;

    let decided_by = staff.first().copied();
    let enrollments =
        workflows::seed_enrollments(db, &students, current_year, decided_by).await?;
    let exams = workflows::seed_exams(db, &courses, today).await?;
    let results = workflows::seed_exam_results(db, &exams, &students).await?;
    let scholarships =
        workflows::seed_scholarships(db, config.scholarships, current_year, today).await?;
    let applications =
        workflows::seed_applications(db, &scholarships, &students, decided_by).await?;

    let mut created: Vec<(ResourceType, Uuid)> = universities
        .iter()
        .map(|u| (ResourceType::University, u.id))
        .collect();
    created.extend(formations.iter().map(|f| (ResourceType::Formation, f.id)));
    created.extend(scholarships.iter().map(|s| (ResourceType::Scholarship, s.id)));
    workflows::seed_activity(db, decided_by, &created).await?;

    println!(
        "\n✅ Seeding complete! Created {} universities, {} formations, {} courses, {} teachers, {} students, {} enrollments, {} exams, {} results, {} scholarships, {} applications in {:?}",
        universities.len(),
        formations.len(),
        courses.len(),
        teachers.len(),
        students.len(),
        enrollments,
        exams.len(),
        results,
        scholarships.len(),
        applications,
        start_time.elapsed()
    );
    println!("\n📝 Default password for all seeded accounts: {DEFAULT_PASSWORD}");

    Ok(())
}

/// Creates an administrator. Fails if the email is already registered.
pub async fn create_admin(
    db: &PgPool,
    first_name: &str,
    last_name: &str,
    email: &str,
    password: &str,
) -> Result<Uuid, Box<dyn std::error::Error>> {
    let password_hash = hash(password, bcrypt::DEFAULT_COST)?;

    let id: Option<Uuid> = sqlx::query_scalar(
        "INSERT INTO profiles (email, password_hash, first_name, last_name, role)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (email) DO NOTHING
         RETURNING id",
    )
    .bind(email.trim().to_lowercase())
    .bind(password_hash)
    .bind(first_name)
    .bind(last_name)
    .bind(Role::Admin)
    .fetch_optional(db)
    .await?;

    id.ok_or_else(|| format!("a profile with email {email} already exists").into())
}

/// Removes every non-admin profile and the whole academic structure.
pub async fn clear_all(db: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🗑️  Clearing all seeded data...");

    let mut tx = db.begin().await?;
    for table in [
        "activity_logs",
        "scholarship_applications",
        "scholarships",
        "exam_results",
        "exams",
        "enrollments",
        "courses",
        "students",
        "teachers",
        "formations",
        "universities",
    ] {
        let deleted = sqlx::query(&format!("DELETE FROM {table}"))
            .execute(&mut *tx)
            .await?
            .rows_affected();
        println!("   ✓ {table}: {deleted} rows");
    }

    let profiles = sqlx::query("DELETE FROM profiles WHERE role <> 'admin'")
        .execute(&mut *tx)
        .await?
        .rows_affected();
    println!("   ✓ profiles: {profiles} rows");
    tx.commit().await?;

    println!("\n✅ Cleared seeded data in {:?}", start_time.elapsed());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_password_hash_verifies() {
        let hashed = hash_password().unwrap();
        assert!(bcrypt::verify(DEFAULT_PASSWORD, &hashed).unwrap());
    }
}
