use mesrs_core::{AppError, Paginated, PaginationParams};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::exams::model::{
    CreateExamDto, CreateExamResultDto, Exam, ExamFilterParams, ExamResult, UpdateExamDto,
    UpdateExamResultDto, passes,
};

const EXAM_COLUMNS: &str = "id, name, course_id, exam_date, start_time, end_time, session, \
     location, max_score, coefficient, instructions, created_at, updated_at";

const RESULT_SELECT: &str = r#"SELECT r.id, r.exam_id, r.student_id, s.student_number,
        p.first_name || ' ' || p.last_name AS student_name,
        r.score, r.grade, r.is_passed, r.comments, r.created_at, r.updated_at
    FROM exam_results r
    JOIN students s ON s.id = r.student_id
    JOIN profiles p ON p.id = s.profile_id"#;

fn exam_not_found() -> AppError {
    AppError::not_found(anyhow::anyhow!("Exam not found"))
}

fn result_not_found() -> AppError {
    AppError::not_found(anyhow::anyhow!("Exam result not found"))
}

/// Scores must lie within `0..=max_score`.
pub fn check_score(score: f64, max_score: f64) -> Result<(), AppError> {
    if !(0.0..=max_score).contains(&score) {
        return Err(AppError::unprocessable(anyhow::anyhow!(
            "Score must be between 0 and {max_score}"
        )));
    }
    Ok(())
}

pub struct ExamService;

impl ExamService {
    #[instrument(skip(db, dto), fields(name = %dto.name))]
    pub async fn create_exam(db: &PgPool, dto: CreateExamDto) -> Result<Exam, AppError> {
        let query = format!(
            r#"INSERT INTO exams
                (name, course_id, exam_date, start_time, end_time, session, location,
                 max_score, coefficient, instructions)
               VALUES ($1, $2, $3, $4, $5, COALESCE($6, 'normal'::exam_session), $7,
                       COALESCE($8, 20), COALESCE($9, 1), $10)
               RETURNING {EXAM_COLUMNS}"#
        );

        sqlx::query_as::<_, Exam>(&query)
            .bind(dto.name.trim())
            .bind(dto.course_id)
            .bind(dto.exam_date)
            .bind(dto.start_time)
            .bind(dto.end_time)
            .bind(dto.session)
            .bind(&dto.location)
            .bind(dto.max_score)
            .bind(dto.coefficient)
            .bind(&dto.instructions)
            .fetch_one(db)
            .await
            .map_err(|e| AppError::from_write(e, "Exam already exists"))
    }

    #[instrument(skip(db))]
    pub async fn get_exam(db: &PgPool, id: Uuid) -> Result<Exam, AppError> {
        let query = format!("SELECT {EXAM_COLUMNS} FROM exams WHERE id = $1");
        sqlx::query_as::<_, Exam>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(exam_not_found)
    }

    #[instrument(skip(db))]
    pub async fn list_exams(
        db: &PgPool,
        filters: ExamFilterParams,
    ) -> Result<Paginated<Exam>, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut where_clause = String::from(" WHERE 1=1");
        let mut params: Vec<String> = Vec::new();

        if let Some(course_id) = filters.course_id {
            params.push(course_id.to_string());
            where_clause.push_str(&format!(" AND course_id = ${}::uuid", params.len()));
        }
        if let Some(session) = filters.session {
            params.push(session.as_str().to_string());
            where_clause.push_str(&format!(" AND session = ${}::exam_session", params.len()));
        }

        let count_query = format!("SELECT COUNT(*) FROM exams{where_clause}");
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_sql = count_sql.bind(param);
        }
        let total = count_sql.fetch_one(db).await?;

        let data_query = format!(
            "SELECT {EXAM_COLUMNS} FROM exams{where_clause} \
             ORDER BY exam_date DESC, start_time ASC NULLS LAST LIMIT {limit} OFFSET {offset}"
        );
        let mut data_sql = sqlx::query_as::<_, Exam>(&data_query);
        for param in params {
            data_sql = data_sql.bind(param);
        }
        let exams = data_sql.fetch_all(db).await?;

        Ok(Paginated::new(exams, total, &filters.pagination))
    }

    /// Lowering `max_score` below an existing result is rejected.
    #[instrument(skip(db, dto))]
    pub async fn update_exam(db: &PgPool, id: Uuid, dto: UpdateExamDto) -> Result<Exam, AppError> {
        let mut tx = db.begin().await?;

        // Result writes hold a share lock on this row.
        sqlx::query("SELECT id FROM exams WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(exam_not_found)?;

        if let Some(max_score) = dto.max_score {
            let highest: Option<f64> =
                sqlx::query_scalar("SELECT MAX(score) FROM exam_results WHERE exam_id = $1")
                    .bind(id)
                    .fetch_one(&mut *tx)
                    .await?;
            if let Some(highest) = highest {
                check_score(highest, max_score)?;
            }
        }

        let query = format!(
            r#"UPDATE exams SET
                name = COALESCE($2, name),
                exam_date = COALESCE($3, exam_date),
                start_time = COALESCE($4, start_time),
                end_time = COALESCE($5, end_time),
                session = COALESCE($6, session),
                location = COALESCE($7, location),
                max_score = COALESCE($8, max_score),
                coefficient = COALESCE($9, coefficient),
                instructions = COALESCE($10, instructions),
                updated_at = NOW()
               WHERE id = $1
               RETURNING {EXAM_COLUMNS}"#
        );

        let exam = sqlx::query_as::<_, Exam>(&query)
            .bind(id)
            .bind(dto.name)
            .bind(dto.exam_date)
            .bind(dto.start_time)
            .bind(dto.end_time)
            .bind(dto.session)
            .bind(dto.location)
            .bind(dto.max_score)
            .bind(dto.coefficient)
            .bind(dto.instructions)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| AppError::from_write(e, "Exam already exists"))?
            .ok_or_else(exam_not_found)?;

        tx.commit().await?;
        Ok(exam)
    }

    #[instrument(skip(db))]
    pub async fn delete_exam(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM exams WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(exam_not_found());
        }

        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn list_results(
        db: &PgPool,
        exam_id: Uuid,
        pagination: PaginationParams,
    ) -> Result<Paginated<ExamResult>, AppError> {
        // 404 for an unknown exam rather than an empty page
        Self::get_exam(db, exam_id).await?;

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM exam_results WHERE exam_id = $1")
                .bind(exam_id)
                .fetch_one(db)
                .await?;

        let query = format!(
            "{RESULT_SELECT} WHERE r.exam_id = $1 \
             ORDER BY s.student_number ASC LIMIT $2 OFFSET $3"
        );
        let results = sqlx::query_as::<_, ExamResult>(&query)
            .bind(exam_id)
            .bind(pagination.limit())
            .bind(pagination.offset())
            .fetch_all(db)
            .await?;

        Ok(Paginated::new(results, total, &pagination))
    }

    #[instrument(skip(db))]
    pub async fn get_result(db: &PgPool, id: Uuid) -> Result<ExamResult, AppError> {
        let query = format!("{RESULT_SELECT} WHERE r.id = $1");
        sqlx::query_as::<_, ExamResult>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(result_not_found)
    }

    /// `is_passed` defaults to `score >= max_score / 2`.
    #[instrument(skip(db, dto))]
    pub async fn create_result(
        db: &PgPool,
        exam_id: Uuid,
        dto: CreateExamResultDto,
    ) -> Result<ExamResult, AppError> {
        let mut tx = db.begin().await?;

        let max_score: f64 =
            sqlx::query_scalar("SELECT max_score FROM exams WHERE id = $1 FOR SHARE")
                .bind(exam_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(exam_not_found)?;

        check_score(dto.score, max_score)?;
        let is_passed = dto.is_passed.unwrap_or_else(|| passes(dto.score, max_score));

        let id: Uuid = sqlx::query_scalar(
            r#"INSERT INTO exam_results (exam_id, student_id, score, grade, is_passed, comments)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING id"#,
        )
        .bind(exam_id)
        .bind(dto.student_id)
        .bind(dto.score)
        .bind(&dto.grade)
        .bind(is_passed)
        .bind(&dto.comments)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_write(e, "Student already has a result for this exam"))?;

        tx.commit().await?;
        Self::get_result(db, id).await
    }

    /// A new score without an explicit `is_passed` re-derives it.
    #[instrument(skip(db, dto))]
    pub async fn update_result(
        db: &PgPool,
        id: Uuid,
        dto: UpdateExamResultDto,
    ) -> Result<ExamResult, AppError> {
        let mut tx = db.begin().await?;

        let (current_passed, max_score): (bool, f64) = sqlx::query_as(
            r#"SELECT r.is_passed, e.max_score
               FROM exam_results r JOIN exams e ON e.id = r.exam_id
               WHERE r.id = $1
               FOR UPDATE OF r FOR SHARE OF e"#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(result_not_found)?;

        if let Some(score) = dto.score {
            check_score(score, max_score)?;
        }
        let is_passed = match (dto.is_passed, dto.score) {
            (Some(explicit), _) => explicit,
            (None, Some(score)) => passes(score, max_score),
            (None, None) => current_passed,
        };

        sqlx::query(
            r#"UPDATE exam_results SET
                score = COALESCE($2, score),
                grade = COALESCE($3, grade),
                is_passed = $4,
                comments = COALESCE($5, comments),
                updated_at = NOW()
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(dto.score)
        .bind(dto.grade)
        .bind(is_passed)
        .bind(dto.comments)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Self::get_result(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn delete_result(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM exam_results WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(result_not_found());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn score_bounds_are_inclusive() {
        assert!(check_score(0.0, 20.0).is_ok());
        assert!(check_score(20.0, 20.0).is_ok());
    }

    #[test]
    fn score_above_max_is_unprocessable() {
        let err = check_score(20.5, 20.0).unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(check_score(-1.0, 20.0).is_err());
    }
}
