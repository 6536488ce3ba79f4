use chrono::Utc;
use mesrs_auth::Role;
use mesrs_core::search::{contains_any, like_pattern};
use mesrs_core::{AppError, Paginated, hash_password};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::modules::auth::service::normalize_email;
use crate::modules::students::model::{
    CreateStudentDto, Student, StudentFilterParams, UpdateStudentDto, next_sequence_number,
    student_number_prefix,
};

const STUDENT_SELECT: &str = r#"SELECT s.id, s.student_number, s.profile_id,
        p.first_name, p.last_name, p.email, p.phone,
        s.university_id, u.name AS university_name,
        s.formation_id, f.name AS formation_name,
        s.academic_year_id, s.level, s.gpa, s.enrollment_date,
        s.is_graduated, s.graduation_date, s.created_at, s.updated_at
    FROM students s
    JOIN profiles p ON p.id = s.profile_id
    JOIN universities u ON u.id = s.university_id
    LEFT JOIN formations f ON f.id = s.formation_id"#;

/// Columns matched by the `search` filter.
pub const STUDENT_SEARCH_COLUMNS: [&str; 4] =
    ["p.first_name", "p.last_name", "p.email", "s.student_number"];

const CONFLICT: &str = "Email, national ID or student number already exists";

fn not_found() -> AppError {
    AppError::not_found(anyhow::anyhow!("Student not found"))
}

pub struct StudentService;

impl StudentService {
    /// Creates the profile and the student record in one transaction.
    #[instrument(skip(db, dto), fields(email = %dto.email))]
    pub async fn create_student(db: &PgPool, dto: CreateStudentDto) -> Result<Student, AppError> {
        let password_hash = hash_password(&dto.password)?;
        let enrollment_date = dto
            .enrollment_date
            .unwrap_or_else(|| Utc::now().date_naive());

        let mut tx = db.begin().await?;

        let profile_id: Uuid = sqlx::query_scalar(
            r#"INSERT INTO profiles
                (email, password_hash, first_name, last_name, role, phone, national_id, date_of_birth)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING id"#,
        )
        .bind(normalize_email(&dto.email))
        .bind(&password_hash)
        .bind(dto.first_name.trim())
        .bind(dto.last_name.trim())
        .bind(Role::Student)
        .bind(&dto.phone)
        .bind(&dto.national_id)
        .bind(dto.date_of_birth)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_write(e, CONFLICT))?;

        let student_number = match dto.student_number {
            Some(number) => number.trim().to_uppercase(),
            None => {
                let university_code: String =
                    sqlx::query_scalar("SELECT code FROM universities WHERE id = $1")
                        .bind(dto.university_id)
                        .fetch_optional(&mut *tx)
                        .await?
                        .ok_or_else(|| {
                            AppError::bad_request(anyhow::anyhow!("University not found"))
                        })?;
                let prefix = student_number_prefix(&university_code, enrollment_date);
                generate_number(&mut tx, "students", "student_number", &prefix).await?
            }
        };

        let student_id: Uuid = sqlx::query_scalar(
            r#"INSERT INTO students
                (student_number, profile_id, university_id, formation_id, academic_year_id,
                 level, gpa, enrollment_date)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING id"#,
        )
        .bind(&student_number)
        .bind(profile_id)
        .bind(dto.university_id)
        .bind(dto.formation_id)
        .bind(dto.academic_year_id)
        .bind(dto.level)
        .bind(dto.gpa)
        .bind(enrollment_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_write(e, CONFLICT))?;

        let query = format!("{STUDENT_SELECT} WHERE s.id = $1");
        let student = sqlx::query_as::<_, Student>(&query)
            .bind(student_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(student)
    }

    #[instrument(skip(db))]
    pub async fn get_student(db: &PgPool, id: Uuid) -> Result<Student, AppError> {
        let query = format!("{STUDENT_SELECT} WHERE s.id = $1");
        sqlx::query_as::<_, Student>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(not_found)
    }

    /// Student record of a signed-in profile, if it has one.
    #[instrument(skip(db))]
    pub async fn find_by_profile(db: &PgPool, profile_id: Uuid) -> Result<Option<Student>, AppError> {
        let query = format!("{STUDENT_SELECT} WHERE s.profile_id = $1");
        Ok(sqlx::query_as::<_, Student>(&query)
            .bind(profile_id)
            .fetch_optional(db)
            .await?)
    }

    #[instrument(skip(db))]
    pub async fn list_students(
        db: &PgPool,
        filters: StudentFilterParams,
    ) -> Result<Paginated<Student>, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut where_clause = String::from(" WHERE 1=1");
        let mut params: Vec<String> = Vec::new();

        if let Some(pattern) = filters.search.as_deref().and_then(like_pattern) {
            params.push(pattern);
            where_clause.push_str(&format!(
                " AND {}",
                contains_any(&STUDENT_SEARCH_COLUMNS, params.len())
            ));
        }
        if let Some(level) = filters.level {
            params.push(level.as_str().to_string());
            where_clause.push_str(&format!(" AND s.level = ${}::study_level", params.len()));
        }
        if let Some(university_id) = filters.university_id {
            params.push(university_id.to_string());
            where_clause.push_str(&format!(" AND s.university_id = ${}::uuid", params.len()));
        }
        if let Some(formation_id) = filters.formation_id {
            params.push(formation_id.to_string());
            where_clause.push_str(&format!(" AND s.formation_id = ${}::uuid", params.len()));
        }
        if let Some(is_graduated) = filters.is_graduated {
            params.push(is_graduated.to_string());
            where_clause.push_str(&format!(" AND s.is_graduated = ${}::boolean", params.len()));
        }

        let count_query = format!(
            "SELECT COUNT(*) FROM students s JOIN profiles p ON p.id = s.profile_id{where_clause}"
        );
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_sql = count_sql.bind(param);
        }
        let total = count_sql.fetch_one(db).await?;

        let data_query = format!(
            "{STUDENT_SELECT}{where_clause} \
             ORDER BY s.created_at DESC, s.student_number ASC LIMIT {limit} OFFSET {offset}"
        );
        let mut data_sql = sqlx::query_as::<_, Student>(&data_query);
        for param in params {
            data_sql = data_sql.bind(param);
        }
        let students = data_sql.fetch_all(db).await?;

        debug!(total, returned = students.len(), "Listed students");
        Ok(Paginated::new(students, total, &filters.pagination))
    }

    /// Graduating without a date records today.
    #[instrument(skip(db, dto))]
    pub async fn update_student(
        db: &PgPool,
        id: Uuid,
        dto: UpdateStudentDto,
    ) -> Result<Student, AppError> {
        let mut tx = db.begin().await?;

        let profile_id: Uuid = sqlx::query_scalar(
            r#"UPDATE students SET
                formation_id = COALESCE($2, formation_id),
                academic_year_id = COALESCE($3, academic_year_id),
                level = COALESCE($4, level),
                gpa = COALESCE($5, gpa),
                is_graduated = COALESCE($6, is_graduated),
                graduation_date = COALESCE($7, graduation_date,
                    CASE WHEN $6 THEN CURRENT_DATE END),
                updated_at = NOW()
               WHERE id = $1
               RETURNING profile_id"#,
        )
        .bind(id)
        .bind(dto.formation_id)
        .bind(dto.academic_year_id)
        .bind(dto.level)
        .bind(dto.gpa)
        .bind(dto.is_graduated)
        .bind(dto.graduation_date)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::from_write(e, CONFLICT))?
        .ok_or_else(not_found)?;

        sqlx::query(
            r#"UPDATE profiles SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                updated_at = NOW()
               WHERE id = $1"#,
        )
        .bind(profile_id)
        .bind(dto.first_name)
        .bind(dto.last_name)
        .bind(dto.email.as_deref().map(normalize_email))
        .bind(dto.phone)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::from_write(e, CONFLICT))?;

        let query = format!("{STUDENT_SELECT} WHERE s.id = $1");
        let student = sqlx::query_as::<_, Student>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(student)
    }

    /// Removes the student together with its profile.
    #[instrument(skip(db))]
    pub async fn delete_student(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            "DELETE FROM profiles WHERE id = (SELECT profile_id FROM students WHERE id = $1)",
        )
        .bind(id)
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(not_found());
        }

        Ok(())
    }
}

/// Next free `{prefix}NNNN` in `table.column`. Holds a transaction-scoped
/// advisory lock on the prefix so concurrent creations get distinct numbers.
pub(crate) async fn generate_number(
    tx: &mut Transaction<'_, Postgres>,
    table: &str,
    column: &str,
    prefix: &str,
) -> Result<String, AppError> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind(prefix)
        .execute(&mut **tx)
        .await?;

    let query = format!(
        "SELECT {column} FROM {table} WHERE left({column}, length($1)) = $1 \
         ORDER BY length({column}) DESC, {column} DESC LIMIT 1"
    );
    let highest: Option<String> = sqlx::query_scalar(&query)
        .bind(prefix)
        .fetch_optional(&mut **tx)
        .await?;

    Ok(next_sequence_number(prefix, highest.as_deref()))
}
