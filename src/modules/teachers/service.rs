use chrono::Utc;
use mesrs_auth::Role;
use mesrs_core::search::{contains_any, like_pattern};
use mesrs_core::{AppError, Paginated, hash_password};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::auth::service::normalize_email;
use crate::modules::students::service::generate_number;
use crate::modules::teachers::model::{
    CreateTeacherDto, Teacher, TeacherFilterParams, UpdateTeacherDto, employee_number_prefix,
};

const TEACHER_SELECT: &str = r#"SELECT t.id, t.employee_number, t.profile_id,
        p.first_name, p.last_name, p.email, p.phone,
        t.university_id, u.name AS university_name,
        t.department, t.specialization, t.title, t.hire_date, t.salary,
        t.created_at, t.updated_at
    FROM teachers t
    JOIN profiles p ON p.id = t.profile_id
    JOIN universities u ON u.id = t.university_id"#;

pub const TEACHER_SEARCH_COLUMNS: [&str; 5] = [
    "p.first_name",
    "p.last_name",
    "p.email",
    "t.specialization",
    "t.employee_number",
];

const CONFLICT: &str = "Email, national ID or employee number already exists";

fn not_found() -> AppError {
    AppError::not_found(anyhow::anyhow!("Teacher not found"))
}

pub struct TeacherService;

impl TeacherService {
    #[instrument(skip(db, dto), fields(email = %dto.email))]
    pub async fn create_teacher(db: &PgPool, dto: CreateTeacherDto) -> Result<Teacher, AppError> {
        let password_hash = hash_password(&dto.password)?;

        let mut tx = db.begin().await?;

        let profile_id: Uuid = sqlx::query_scalar(
            r#"INSERT INTO profiles
                (email, password_hash, first_name, last_name, role, phone, national_id)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING id"#,
        )
        .bind(normalize_email(&dto.email))
        .bind(&password_hash)
        .bind(dto.first_name.trim())
        .bind(dto.last_name.trim())
        .bind(Role::Teacher)
        .bind(&dto.phone)
        .bind(&dto.national_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_write(e, CONFLICT))?;

        let employee_number = match dto.employee_number {
            Some(number) => number.trim().to_uppercase(),
            None => {
                let date = dto.hire_date.unwrap_or_else(|| Utc::now().date_naive());
                let prefix = employee_number_prefix(date);
                generate_number(&mut tx, "teachers", "employee_number", &prefix).await?
            }
        };

        let teacher_id: Uuid = sqlx::query_scalar(
            r#"INSERT INTO teachers
                (employee_number, profile_id, university_id, department, specialization,
                 title, hire_date, salary)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING id"#,
        )
        .bind(&employee_number)
        .bind(profile_id)
        .bind(dto.university_id)
        .bind(&dto.department)
        .bind(&dto.specialization)
        .bind(&dto.title)
        .bind(dto.hire_date)
        .bind(dto.salary)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_write(e, CONFLICT))?;

        let query = format!("{TEACHER_SELECT} WHERE t.id = $1");
        let teacher = sqlx::query_as::<_, Teacher>(&query)
            .bind(teacher_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(teacher)
    }

    #[instrument(skip(db))]
    pub async fn get_teacher(db: &PgPool, id: Uuid) -> Result<Teacher, AppError> {
        let query = format!("{TEACHER_SELECT} WHERE t.id = $1");
        sqlx::query_as::<_, Teacher>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(not_found)
    }

    #[instrument(skip(db))]
    pub async fn list_teachers(
        db: &PgPool,
        filters: TeacherFilterParams,
    ) -> Result<Paginated<Teacher>, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut where_clause = String::from(" WHERE 1=1");
        let mut params: Vec<String> = Vec::new();

        if let Some(pattern) = filters.search.as_deref().and_then(like_pattern) {
            params.push(pattern);
            where_clause.push_str(&format!(
                " AND {}",
                contains_any(&TEACHER_SEARCH_COLUMNS, params.len())
            ));
        }
        if let Some(university_id) = filters.university_id {
            params.push(university_id.to_string());
            where_clause.push_str(&format!(" AND t.university_id = ${}::uuid", params.len()));
        }
        if let Some(department) = filters
            .department
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
        {
            params.push(department.to_string());
            where_clause.push_str(&format!(" AND t.department = ${}", params.len()));
        }

        let count_query = format!(
            "SELECT COUNT(*) FROM teachers t JOIN profiles p ON p.id = t.profile_id{where_clause}"
        );
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_sql = count_sql.bind(param);
        }
        let total = count_sql.fetch_one(db).await?;

        let data_query = format!(
            "{TEACHER_SELECT}{where_clause} \
             ORDER BY p.last_name ASC, p.first_name ASC LIMIT {limit} OFFSET {offset}"
        );
        let mut data_sql = sqlx::query_as::<_, Teacher>(&data_query);
        for param in params {
            data_sql = data_sql.bind(param);
        }
        let teachers = data_sql.fetch_all(db).await?;

        Ok(Paginated::new(teachers, total, &filters.pagination))
    }

    #[instrument(skip(db, dto))]
    pub async fn update_teacher(
        db: &PgPool,
        id: Uuid,
        dto: UpdateTeacherDto,
    ) -> Result<Teacher, AppError> {
        let mut tx = db.begin().await?;

        let profile_id: Uuid = sqlx::query_scalar(
            r#"UPDATE teachers SET
                university_id = COALESCE($2, university_id),
                department = COALESCE($3, department),
                specialization = COALESCE($4, specialization),
                title = COALESCE($5, title),
                hire_date = COALESCE($6, hire_date),
                salary = COALESCE($7, salary),
                updated_at = NOW()
               WHERE id = $1
               RETURNING profile_id"#,
        )
        .bind(id)
        .bind(dto.university_id)
        .bind(dto.department)
        .bind(dto.specialization)
        .bind(dto.title)
        .bind(dto.hire_date)
        .bind(dto.salary)
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

        let query = format!("{TEACHER_SELECT} WHERE t.id = $1");
        let teacher = sqlx::query_as::<_, Teacher>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(teacher)
    }

    /// Removes the teacher together with its profile. Their courses become unassigned.
    #[instrument(skip(db))]
    pub async fn delete_teacher(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            "DELETE FROM profiles WHERE id = (SELECT profile_id FROM teachers WHERE id = $1)",
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
