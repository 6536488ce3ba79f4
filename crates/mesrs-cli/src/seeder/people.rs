//! Profiles and the teacher and student records attached to them.

use chrono::{Duration, NaiveDate};
use fake::Fake;
use fake::faker::address::fr_fr::CityName;
use fake::faker::name::fr_fr::{FirstName, LastName};
use fake::faker::phone_number::fr_fr::PhoneNumber;
use mesrs_models::Role;
use mesrs_models::students::{next_sequence_number, student_number_prefix};
use mesrs_models::teachers::employee_number_prefix;
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;
use std::time::Instant;
use uuid::Uuid;

use super::batch::{Column, Row, insert_rows, text};
use super::models::{
    ProfileSeed, SeededFormation, SeededStudent, SeededTeacher, SeededUniversity,
};

const DEPARTMENTS: [&str; 6] = [
    "Sciences exactes",
    "Sciences humaines",
    "Sciences économiques",
    "Sciences juridiques",
    "Technologie",
    "Études islamiques",
];

const TITLES: [&str; 4] = [
    "Assistant",
    "Maître-assistant",
    "Maître de conférences",
    "Professeur",
];

const PROFILE_COLUMNS: [Column; 7] = [
    ("email", "text"),
    ("password_hash", "text"),
    ("first_name", "text"),
    ("last_name", "text"),
    ("role", "user_role"),
    ("phone", "text"),
    ("preferred_language", "ui_language"),
];

const TEACHER_COLUMNS: [Column; 8] = [
    ("employee_number", "text"),
    ("profile_id", "uuid"),
    ("university_id", "uuid"),
    ("department", "text"),
    ("specialization", "text"),
    ("title", "text"),
    ("hire_date", "date"),
    ("salary", "float8"),
];

const STUDENT_COLUMNS: [Column; 8] = [
    ("student_number", "text"),
    ("profile_id", "uuid"),
    ("university_id", "uuid"),
    ("formation_id", "uuid"),
    ("academic_year_id", "uuid"),
    ("level", "study_level"),
    ("gpa", "float8"),
    ("enrollment_date", "date"),
];

/// Lowercase ASCII letters only, so accented names still give valid addresses.
fn email_part(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_lowercase()
}

/// Generates profiles in parallel; every email carries a random tag.
pub fn generate_profiles(
    count: usize,
    role: Role,
    domain: &str,
    password_hash: &str,
) -> Vec<ProfileSeed> {
    (0..count)
        .into_par_iter()
        .map(|i| {
            let first_name: String = FirstName().fake();
            let last_name: String = LastName().fake();
            let tag = &Uuid::new_v4().simple().to_string()[..8];

            ProfileSeed {
                email: format!(
                    "{}.{}.{tag}@{domain}",
                    email_part(&first_name),
                    email_part(&last_name)
                ),
                first_name,
                last_name,
                password_hash: password_hash.to_string(),
                role,
                phone: PhoneNumber().fake(),
                preferred_language: if i % 3 == 0 { "ar" } else { "fr" },
            }
        })
        .collect()
}

async fn insert_profiles(
    tx: &mut Transaction<'_, Postgres>,
    profiles: &[ProfileSeed],
) -> Result<Vec<Uuid>, sqlx::Error> {
    let rows: Vec<Row> = profiles
        .iter()
        .map(|p| {
            vec![
                text(&p.email),
                text(&p.password_hash),
                text(&p.first_name),
                text(&p.last_name),
                text(p.role.as_str()),
                text(&p.phone),
                text(p.preferred_language),
            ]
        })
        .collect();

    insert_rows(tx, "profiles", &PROFILE_COLUMNS, &rows).await
}

/// Seeds ministry staff accounts.
pub async fn seed_staff(
    db: &PgPool,
    count: usize,
    password_hash: &str,
) -> Result<Vec<Uuid>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🧑‍💼 Seeding {} staff accounts...", count);

    let profiles = generate_profiles(count, Role::Staff, "mesrs.gov.mr", password_hash);
    let mut tx = db.begin().await?;
    let ids = insert_profiles(&mut tx, &profiles).await?;
    tx.commit().await?;

    println!(
        "   ✓ Inserted {} staff accounts in {:?}",
        ids.len(),
        start_time.elapsed()
    );
    Ok(ids)
}

pub async fn seed_teachers(
    db: &PgPool,
    universities: &[SeededUniversity],
    per_university: usize,
    today: NaiveDate,
    password_hash: &str,
) -> Result<Vec<SeededTeacher>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!(
        "👩‍🏫 Seeding {} teachers...",
        universities.len() * per_university
    );

    let mut tx = db.begin().await?;
    let mut seeded = Vec::with_capacity(universities.len() * per_university);

    for university in universities {
        let domain = format!("{}.mr", university.code.to_lowercase());
        let profiles =
            generate_profiles(per_university, Role::Teacher, &domain, password_hash);
        let profile_ids = insert_profiles(&mut tx, &profiles).await?;

        let rows: Vec<Row> = profile_ids
            .iter()
            .enumerate()
            .map(|(i, profile_id)| {
                let hire_date = today - Duration::days((30..7300).fake::<i64>());
                let number = format!(
                    "{}-{}-{:03}",
                    employee_number_prefix(hire_date),
                    university.code,
                    i + 1
                );
                let city: String = CityName().fake();
                vec![
                    text(number),
                    text(profile_id),
                    text(university.id),
                    text(DEPARTMENTS[i % DEPARTMENTS.len()]),
                    text(format!("Recherche appliquée, {city}")),
                    text(TITLES[(0..TITLES.len()).fake::<usize>()]),
                    text(hire_date),
                    text((45_000..140_000).fake::<i32>()),
                ]
            })
            .collect();

        let ids = insert_rows(&mut tx, "teachers", &TEACHER_COLUMNS, &rows).await?;
        seeded.extend(ids.into_iter().map(|id| SeededTeacher {
            id,
            university_id: university.id,
        }));
    }

    tx.commit().await?;
    println!(
        "   ✓ Inserted {} teachers in {:?}",
        seeded.len(),
        start_time.elapsed()
    );
    Ok(seeded)
}

/// Assigns `prefix`-scoped sequence numbers in order of appearance.
pub fn number_students(prefixes: &[String]) -> Vec<String> {
    let mut highest: HashMap<&str, String> = HashMap::new();
    prefixes
        .iter()
        .map(|prefix| {
            let number = next_sequence_number(prefix, highest.get(prefix.as_str()).map(String::as_str));
            highest.insert(prefix.as_str(), number.clone());
            number
        })
        .collect()
}

/// Seeds students with enrollment dates spread over the last year.
pub async fn seed_students(
    db: &PgPool,
    universities: &[SeededUniversity],
    formations: &[SeededFormation],
    per_formation: usize,
    academic_year_id: Uuid,
    today: NaiveDate,
    password_hash: &str,
) -> Result<Vec<SeededStudent>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!(
        "🧑‍🎓 Seeding {} students...",
        formations.len() * per_formation
    );

    let codes: HashMap<Uuid, &str> = universities
        .iter()
        .map(|u| (u.id, u.code.as_str()))
        .collect();

    let mut slots = Vec::with_capacity(formations.len() * per_formation);
    for formation in formations {
        for _ in 0..per_formation {
            let enrollment_date = today - Duration::days((0..365).fake::<i64>());
            slots.push((formation, enrollment_date));
        }
    }

    let prefixes: Vec<String> = slots
        .iter()
        .map(|(formation, date)| {
            let code = codes.get(&formation.university_id).copied().unwrap_or("UNK");
            student_number_prefix(code, *date)
        })
        .collect();
    let numbers = number_students(&prefixes);

    let mut tx = db.begin().await?;
    let profiles = generate_profiles(slots.len(), Role::Student, "etu.mesrs.mr", password_hash);
    let profile_ids = insert_profiles(&mut tx, &profiles).await?;

    let rows: Vec<Row> = slots
        .iter()
        .zip(&numbers)
        .zip(&profile_ids)
        .map(|(((formation, date), number), profile_id)| {
            let gpa = ((6.0..18.0).fake::<f64>() * 100.0).round() / 100.0;
            vec![
                text(number),
                text(profile_id),
                text(formation.university_id),
                text(formation.id),
                text(academic_year_id),
                text(formation.level.as_str()),
                text(gpa),
                text(date),
            ]
        })
        .collect();

    let ids = insert_rows(&mut tx, "students", &STUDENT_COLUMNS, &rows).await?;
    tx.commit().await?;

    println!(
        "   ✓ Inserted {} students in {:?}",
        ids.len(),
        start_time.elapsed()
    );

    Ok(ids
        .into_iter()
        .zip(slots)
        .map(|(id, (formation, enrollment_date))| SeededStudent {
            id,
            formation_id: formation.id,
            enrollment_date,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_get_unique_ascii_emails() {
        let profiles = generate_profiles(50, Role::Student, "etu.mesrs.mr", "hash");
        assert_eq!(profiles.len(), 50);

        let mut emails: Vec<&str> = profiles.iter().map(|p| p.email.as_str()).collect();
        emails.sort_unstable();
        emails.dedup();
        assert_eq!(emails.len(), 50);
        assert!(profiles.iter().all(|p| p.email.is_ascii()));
        assert!(profiles.iter().all(|p| p.email.ends_with("@etu.mesrs.mr")));
        assert!(profiles.iter().all(|p| p.role == Role::Student));
    }

    #[test]
    fn accents_are_dropped_from_email_parts() {
        assert_eq!(email_part("Élodie-Marie"), "lodiemarie");
        assert_eq!(email_part("O'Neil"), "oneil");
    }

    #[test]
    fn student_numbers_count_up_per_prefix() {
        let prefixes = vec![
            "UNA2025".to_string(),
            "UNA2025".to_string(),
            "ESP2025".to_string(),
            "UNA2025".to_string(),
        ];
        assert_eq!(
            number_students(&prefixes),
            ["UNA20250001", "UNA20250002", "ESP20250001", "UNA20250003"]
        );
    }
}
