//! Universities, academic years, formations and courses.

use chrono::{Datelike, NaiveDate};
use fake::Fake;
use fake::faker::address::fr_fr::{CityName, StreetName};
use fake::faker::name::fr_fr::{FirstName, LastName};
use fake::faker::phone_number::fr_fr::PhoneNumber;
use mesrs_models::formations::StudyLevel;
use rayon::prelude::*;
use sqlx::PgPool;
use std::time::Instant;
use uuid::Uuid;

use super::batch::{Column, Row, insert_rows, text};
use super::models::{
    AcademicYearSeed, FormationSeed, SeededCourse, SeededFormation, SeededTeacher,
    SeededUniversity, UniversitySeed,
};

/// Real institutions used before falling back to generated names.
const INSTITUTIONS: [(&str, &str, &str, f64, f64); 7] = [
    ("UNA", "Université de Nouakchott Al Aasriya", "Nouakchott", 18.0735, -15.9582),
    ("ESP", "École Supérieure Polytechnique", "Nouakchott", 18.1013, -15.9920),
    ("ENS", "École Normale Supérieure", "Nouakchott", 18.0861, -15.9645),
    ("USIA", "Université des Sciences Islamiques d'Aïoun", "Aïoun", 16.6614, -9.6149),
    ("ISCAE", "Institut Supérieur de Comptabilité et d'Administration des Entreprises", "Nouakchott", 18.1102, -15.9531),
    ("ISET", "Institut Supérieur d'Enseignement Technologique", "Rosso", 16.5138, -15.8050),
    ("ISERI", "Institut Supérieur des Études et Recherches Islamiques", "Nouakchott", 18.0923, -15.9712),
];

const DISCIPLINES: [&str; 14] = [
    "Informatique",
    "Mathématiques",
    "Physique",
    "Chimie",
    "Biologie",
    "Économie",
    "Gestion",
    "Droit",
    "Lettres arabes",
    "Lettres françaises",
    "Histoire",
    "Géographie",
    "Génie civil",
    "Sciences islamiques",
];

const COURSE_TOPICS: [&str; 8] = [
    "Fondamentaux",
    "Méthodologie",
    "Analyse",
    "Travaux pratiques",
    "Séminaire",
    "Projet tutoré",
    "Langues",
    "Statistiques",
];

const UNIVERSITY_COLUMNS: [Column; 9] = [
    ("code", "text"),
    ("name", "text"),
    ("address", "text"),
    ("email", "text"),
    ("phone", "text"),
    ("website", "text"),
    ("rector_name", "text"),
    ("latitude", "float8"),
    ("longitude", "float8"),
];

const FORMATION_COLUMNS: [Column; 7] = [
    ("code", "text"),
    ("name", "text"),
    ("university_id", "uuid"),
    ("level", "study_level"),
    ("duration_years", "int4"),
    ("credits", "int4"),
    ("capacity", "int4"),
];

const COURSE_COLUMNS: [Column; 7] = [
    ("code", "text"),
    ("name", "text"),
    ("formation_id", "uuid"),
    ("teacher_id", "uuid"),
    ("academic_year_id", "uuid"),
    ("credits", "int4"),
    ("semester", "int4"),
];

/// Short random suffix so repeated runs never collide on unique codes.
pub fn run_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..4].to_uppercase()
}

/// Generates universities in parallel, real institutions first.
pub fn generate_universities(count: usize, suffix: &str) -> Vec<UniversitySeed> {
    (0..count)
        .into_par_iter()
        .map(|i| {
            let (acronym, name, city, latitude, longitude) = match INSTITUTIONS.get(i) {
                Some(&(acronym, name, city, lat, lng)) => {
                    (acronym.to_string(), name.to_string(), city.to_string(), lat, lng)
                }
                None => {
                    let city: String = CityName().fake();
                    (
                        format!("U{i:02}"),
                        format!("Université de {city}"),
                        city,
                        (15.0..21.0).fake::<f64>(),
                        (-17.0..-6.0).fake::<f64>(),
                    )
                }
            };
            let domain = format!("{}.mr", acronym.to_lowercase());
            let rector_first: String = FirstName().fake();
            let rector_last: String = LastName().fake();
            let street: String = StreetName().fake();

            UniversitySeed {
                code: format!("{acronym}{suffix}"),
                name,
                address: format!("{street}, {city}"),
                email: format!("contact@{domain}"),
                phone: PhoneNumber().fake(),
                website: format!("https://www.{domain}"),
                rector_name: format!("{rector_first} {rector_last}"),
                latitude,
                longitude,
            }
        })
        .collect()
}

pub async fn seed_universities(
    db: &PgPool,
    count: usize,
    suffix: &str,
) -> Result<Vec<SeededUniversity>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🏛️  Seeding {} universities...", count);

    let universities = generate_universities(count, suffix);
    let rows: Vec<Row> = universities
        .iter()
        .map(|u| {
            vec![
                text(&u.code),
                text(&u.name),
                text(&u.address),
                text(&u.email),
                text(&u.phone),
                text(&u.website),
                text(&u.rector_name),
                text(u.latitude),
                text(u.longitude),
            ]
        })
        .collect();

    let mut tx = db.begin().await?;
    let ids = insert_rows(&mut tx, "universities", &UNIVERSITY_COLUMNS, &rows).await?;
    tx.commit().await?;

    println!(
        "   ✓ Inserted {} universities in {:?}",
        ids.len(),
        start_time.elapsed()
    );

    Ok(ids
        .into_iter()
        .zip(universities)
        .map(|(id, u)| SeededUniversity { id, code: u.code })
        .collect())
}

/// First day of the academic year containing `today` (years start in September).
pub fn current_year_start(today: NaiveDate) -> i32 {
    if today.month() >= 9 {
        today.year()
    } else {
        today.year() - 1
    }
}

/// The current academic year and the `previous` ones before it, oldest first.
pub fn generate_academic_years(today: NaiveDate, previous: usize) -> Vec<AcademicYearSeed> {
    let current = current_year_start(today);
    (0..=previous as i32)
        .rev()
        .filter_map(|back| {
            let start = current - back;
            Some(AcademicYearSeed {
                name: format!("{}-{}", start, start + 1),
                start_date: NaiveDate::from_ymd_opt(start, 9, 1)?,
                end_date: NaiveDate::from_ymd_opt(start + 1, 7, 31)?,
                is_current: back == 0,
            })
        })
        .collect()
}

/// Upserts academic years by name and returns the id of the current one.
pub async fn seed_academic_years(
    db: &PgPool,
    today: NaiveDate,
    previous: usize,
) -> Result<Uuid, Box<dyn std::error::Error>> {
    println!("📅 Seeding academic years...");
    let years = generate_academic_years(today, previous);

    let mut tx = db.begin().await?;
    sqlx::query("UPDATE academic_years SET is_current = FALSE, updated_at = NOW() WHERE is_current")
        .execute(&mut *tx)
        .await?;

    let mut current_id = None;
    for year in &years {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO academic_years (name, start_date, end_date, is_current)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (name) DO UPDATE SET is_current = EXCLUDED.is_current, updated_at = NOW()
             RETURNING id",
        )
        .bind(&year.name)
        .bind(year.start_date)
        .bind(year.end_date)
        .bind(year.is_current)
        .fetch_one(&mut *tx)
        .await?;

        if year.is_current {
            current_id = Some(id);
        }
    }
    tx.commit().await?;

    println!("   ✓ {} academic years ready", years.len());
    current_id.ok_or_else(|| "no current academic year was generated".into())
}

fn level_shape(level: StudyLevel) -> (&'static str, i32, i32) {
    match level {
        StudyLevel::Licence1 | StudyLevel::Licence2 | StudyLevel::Licence3 => ("Licence", 3, 180),
        StudyLevel::Master1 | StudyLevel::Master2 => ("Master", 2, 120),
        StudyLevel::Doctorat => ("Doctorat", 3, 180),
    }
}

pub fn generate_formations(
    universities: &[SeededUniversity],
    per_university: usize,
) -> Vec<FormationSeed> {
    universities
        .par_iter()
        .flat_map(|university| {
            (0..per_university)
                .into_par_iter()
                .map(|i| {
                    let level = StudyLevel::ALL[i % StudyLevel::ALL.len()];
                    let discipline = DISCIPLINES[(0..DISCIPLINES.len()).fake::<usize>()];
                    let (cycle, duration_years, credits) = level_shape(level);

                    FormationSeed {
                        code: format!("{}-F{:02}", university.code, i + 1),
                        name: format!("{cycle} en {discipline}"),
                        university_id: university.id,
                        level,
                        duration_years,
                        credits,
                        capacity: (40..200).fake::<i32>(),
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

pub async fn seed_formations(
    db: &PgPool,
    universities: &[SeededUniversity],
    per_university: usize,
) -> Result<Vec<SeededFormation>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!(
        "🎓 Seeding {} formations...",
        universities.len() * per_university
    );

    let formations = generate_formations(universities, per_university);
    let rows: Vec<Row> = formations
        .iter()
        .map(|f| {
            vec![
                text(&f.code),
                text(&f.name),
                text(f.university_id),
                text(f.level.as_str()),
                text(f.duration_years),
                text(f.credits),
                text(f.capacity),
            ]
        })
        .collect();

    let mut tx = db.begin().await?;
    let ids = insert_rows(&mut tx, "formations", &FORMATION_COLUMNS, &rows).await?;
    tx.commit().await?;

    println!(
        "   ✓ Inserted {} formations in {:?}",
        ids.len(),
        start_time.elapsed()
    );

    Ok(ids
        .into_iter()
        .zip(formations)
        .map(|(id, f)| SeededFormation {
            id,
            code: f.code,
            university_id: f.university_id,
            level: f.level,
        })
        .collect())
}

/// Courses per formation, taught round-robin by teachers of the same university.
pub async fn seed_courses(
    db: &PgPool,
    formations: &[SeededFormation],
    teachers: &[SeededTeacher],
    academic_year_id: Uuid,
    per_formation: usize,
) -> Result<Vec<SeededCourse>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("📖 Seeding {} courses...", formations.len() * per_formation);

    let mut rows: Vec<Row> = Vec::with_capacity(formations.len() * per_formation);
    let mut formation_ids = Vec::with_capacity(rows.capacity());
    for formation in formations {
        let staff: Vec<&SeededTeacher> = teachers
            .iter()
            .filter(|t| t.university_id == formation.university_id)
            .collect();

        for i in 0..per_formation {
            let teacher = (!staff.is_empty()).then(|| staff[i % staff.len()].id);
            rows.push(vec![
                text(format!("{}-C{:02}", formation.code, i + 1)),
                text(COURSE_TOPICS[i % COURSE_TOPICS.len()]),
                text(formation.id),
                teacher.map(|id| id.to_string()),
                text(academic_year_id),
                text((2..8).fake::<i32>()),
                text(i % 2 + 1),
            ]);
            formation_ids.push(formation.id);
        }
    }

    let mut tx = db.begin().await?;
    let ids = insert_rows(&mut tx, "courses", &COURSE_COLUMNS, &rows).await?;
    tx.commit().await?;

    println!(
        "   ✓ Inserted {} courses in {:?}",
        ids.len(),
        start_time.elapsed()
    );

    Ok(ids
        .into_iter()
        .zip(formation_ids)
        .map(|(id, formation_id)| SeededCourse { id, formation_id })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_institutions_come_first() {
        let universities = generate_universities(9, "AB12");
        assert_eq!(universities.len(), 9);
        assert_eq!(universities[0].code, "UNAAB12");
        assert_eq!(universities[0].name, "Université de Nouakchott Al Aasriya");
        assert!(universities[8].name.starts_with("Université de "));
        assert!(universities.iter().all(|u| u.website.starts_with("https://")));
    }

    #[test]
    fn academic_years_start_in_september() {
        let june = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        assert_eq!(current_year_start(june), 2024);

        let october = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        let years = generate_academic_years(october, 2);
        let names: Vec<&str> = years.iter().map(|y| y.name.as_str()).collect();
        assert_eq!(names, ["2023-2024", "2024-2025", "2025-2026"]);
        assert_eq!(years.iter().filter(|y| y.is_current).count(), 1);
        assert!(years[2].is_current);
        assert!(years.iter().all(|y| y.end_date > y.start_date));
    }

    #[test]
    fn formations_cycle_through_levels() {
        let universities = vec![SeededUniversity {
            id: Uuid::new_v4(),
            code: "UNAAB12".into(),
        }];
        let formations = generate_formations(&universities, 7);

        assert_eq!(formations.len(), 7);
        assert_eq!(formations[0].level, StudyLevel::Licence1);
        assert_eq!(formations[5].level, StudyLevel::Doctorat);
        assert_eq!(formations[6].level, StudyLevel::Licence1);
        assert_eq!(formations[3].duration_years, 2);
        assert!(formations[3].name.starts_with("Master en "));
        assert_eq!(formations[0].code, "UNAAB12-F01");
    }
}
