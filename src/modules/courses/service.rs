use mesrs_core::search::{contains_any, like_pattern};
use mesrs_core::{AppError, Paginated};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::courses::model::{Course, CourseFilterParams, CreateCourseDto, UpdateCourseDto};

const COURSE_COLUMNS: &str = "id, code, name, formation_id, teacher_id, academic_year_id, \
     credits, semester, max_students, created_at, updated_at";

pub struct CourseService;

impl CourseService {
    #[instrument(skip(db, dto), fields(code = %dto.code))]
    pub async fn create_course(db: &PgPool, dto: CreateCourseDto) -> Result<Course, AppError> {
        let query = format!(
            r#"INSERT INTO courses
                (code, name, formation_id, teacher_id, academic_year_id, credits, semester, max_students)
               VALUES ($1, $2, $3, $4, $5, COALESCE($6, 6), COALESCE($7, 1), $8)
               RETURNING {COURSE_COLUMNS}"#
        );

        sqlx::query_as::<_, Course>(&query)
            .bind(dto.code.trim().to_uppercase())
            .bind(dto.name.trim())
            .bind(dto.formation_id)
            .bind(dto.teacher_id)
            .bind(dto.academic_year_id)
            .bind(dto.credits)
            .bind(dto.semester)
            .bind(dto.max_students)
            .fetch_one(db)
            .await
            .map_err(|e| AppError::from_write(e, "Course code already exists"))
    }

    #[instrument(skip(db))]
    pub async fn get_course(db: &PgPool, id: Uuid) -> Result<Course, AppError> {
        let query = format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1");
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Course not found")))
    }

    #[instrument(skip(db))]
    pub async fn list_courses(
        db: &PgPool,
        filters: CourseFilterParams,
    ) -> Result<Paginated<Course>, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut where_clause = String::from(" WHERE 1=1");
        let mut params: Vec<String> = Vec::new();

        if let Some(pattern) = filters.search.as_deref().and_then(like_pattern) {
            params.push(pattern);
            where_clause.push_str(&format!(" AND {}", contains_any(&["name", "code"], params.len())));
        }
        let id_filters = [
            ("formation_id", filters.formation_id),
            ("teacher_id", filters.teacher_id),
            ("academic_year_id", filters.academic_year_id),
        ];
        for (column, value) in id_filters {
            if let Some(id) = value {
                params.push(id.to_string());
                where_clause.push_str(&format!(" AND {column} = ${}::uuid", params.len()));
            }
        }

        let count_query = format!("SELECT COUNT(*) FROM courses{where_clause}");
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_sql = count_sql.bind(param);
        }
        let total = count_sql.fetch_one(db).await?;

        let data_query = format!(
            "SELECT {COURSE_COLUMNS} FROM courses{where_clause} \
             ORDER BY semester ASC, code ASC LIMIT {limit} OFFSET {offset}"
        );
        let mut data_sql = sqlx::query_as::<_, Course>(&data_query);
        for param in params {
            data_sql = data_sql.bind(param);
        }
        let courses = data_sql.fetch_all(db).await?;

        Ok(Paginated::new(courses, total, &filters.pagination))
    }

    #[instrument(skip(db, dto))]
    pub async fn update_course(
        db: &PgPool,
        id: Uuid,
        dto: UpdateCourseDto,
    ) -> Result<Course, AppError> {
        let query = format!(
            r#"UPDATE courses SET
                code = COALESCE($2, code),
                name = COALESCE($3, name),
                teacher_id = COALESCE($4, teacher_id),
                academic_year_id = COALESCE($5, academic_year_id),
                credits = COALESCE($6, credits),
                semester = COALESCE($7, semester),
                max_students = COALESCE($8, max_students),
                updated_at = NOW()
               WHERE id = $1
               RETURNING {COURSE_COLUMNS}"#
        );

        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .bind(dto.code.map(|c| c.trim().to_uppercase()))
            .bind(dto.name)
            .bind(dto.teacher_id)
            .bind(dto.academic_year_id)
            .bind(dto.credits)
            .bind(dto.semester)
            .bind(dto.max_students)
            .fetch_optional(db)
            .await
            .map_err(|e| AppError::from_write(e, "Course code already exists"))?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Course not found")))
    }

    #[instrument(skip(db))]
    pub async fn delete_course(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Course not found")));
        }

        Ok(())
    }
}
