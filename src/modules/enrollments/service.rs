use mesrs_core::{AppError, Paginated};
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::modules::enrollments::model::{
    CreateEnrollmentDto, Enrollment, EnrollmentFilterParams, EnrollmentStatus, UpdateEnrollmentDto,
};

const ENROLLMENT_SELECT: &str = r#"SELECT e.id, e.student_id, s.student_number,
        p.first_name || ' ' || p.last_name AS student_name,
        e.formation_id, f.name AS formation_name,
        e.academic_year_id, y.name AS academic_year_name,
        e.status, e.enrollment_date, e.validated_by, e.validation_date, e.notes,
        e.created_at, e.updated_at
    FROM enrollments e
    JOIN students s ON s.id = e.student_id
    JOIN profiles p ON p.id = s.profile_id
    JOIN formations f ON f.id = e.formation_id
    JOIN academic_years y ON y.id = e.academic_year_id"#;

const CONFLICT: &str = "Student is already enrolled in this formation for this academic year";

fn not_found() -> AppError {
    AppError::not_found(anyhow::anyhow!("Enrollment not found"))
}

/// Validation and rejection record who decided and when.
fn records_decision(next: EnrollmentStatus) -> bool {
    matches!(next, EnrollmentStatus::Approved | EnrollmentStatus::Rejected)
}

pub struct EnrollmentService;

impl EnrollmentService {
    /// New enrollments start as `pending`.
    #[instrument(skip(db, dto))]
    pub async fn create_enrollment(
        db: &PgPool,
        dto: CreateEnrollmentDto,
    ) -> Result<Enrollment, AppError> {
        let id: Uuid = sqlx::query_scalar(
            r#"INSERT INTO enrollments
                (student_id, formation_id, academic_year_id, enrollment_date, notes)
               VALUES ($1, $2, $3, COALESCE($4, CURRENT_DATE), $5)
               RETURNING id"#,
        )
        .bind(dto.student_id)
        .bind(dto.formation_id)
        .bind(dto.academic_year_id)
        .bind(dto.enrollment_date)
        .bind(&dto.notes)
        .fetch_one(db)
        .await
        .map_err(|e| AppError::from_write(e, CONFLICT))?;

        Self::get_enrollment(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn get_enrollment(db: &PgPool, id: Uuid) -> Result<Enrollment, AppError> {
        let query = format!("{ENROLLMENT_SELECT} WHERE e.id = $1");
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(not_found)
    }

    #[instrument(skip(db))]
    pub async fn list_enrollments(
        db: &PgPool,
        filters: EnrollmentFilterParams,
    ) -> Result<Paginated<Enrollment>, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut where_clause = String::from(" WHERE 1=1");
        let mut params: Vec<String> = Vec::new();

        if let Some(status) = filters.status {
            params.push(status.as_str().to_string());
            where_clause.push_str(&format!(" AND e.status = ${}::enrollment_status", params.len()));
        }
        let id_filters = [
            ("e.student_id", filters.student_id),
            ("e.formation_id", filters.formation_id),
            ("e.academic_year_id", filters.academic_year_id),
        ];
        for (column, value) in id_filters {
            if let Some(id) = value {
                params.push(id.to_string());
                where_clause.push_str(&format!(" AND {column} = ${}::uuid", params.len()));
            }
        }

        let count_query = format!("SELECT COUNT(*) FROM enrollments e{where_clause}");
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_sql = count_sql.bind(param);
        }
        let total = count_sql.fetch_one(db).await?;

        let data_query = format!(
            "{ENROLLMENT_SELECT}{where_clause} \
             ORDER BY e.created_at DESC LIMIT {limit} OFFSET {offset}"
        );
        let mut data_sql = sqlx::query_as::<_, Enrollment>(&data_query);
        for param in params {
            data_sql = data_sql.bind(param);
        }
        let enrollments = data_sql.fetch_all(db).await?;

        Ok(Paginated::new(enrollments, total, &filters.pagination))
    }

    #[instrument(skip(db, dto))]
    pub async fn update_enrollment(
        db: &PgPool,
        id: Uuid,
        dto: UpdateEnrollmentDto,
    ) -> Result<Enrollment, AppError> {
        let updated = sqlx::query(
            r#"UPDATE enrollments SET
                formation_id = COALESCE($2, formation_id),
                academic_year_id = COALESCE($3, academic_year_id),
                enrollment_date = COALESCE($4, enrollment_date),
                notes = COALESCE($5, notes),
                updated_at = NOW()
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(dto.formation_id)
        .bind(dto.academic_year_id)
        .bind(dto.enrollment_date)
        .bind(dto.notes)
        .execute(db)
        .await
        .map_err(|e| AppError::from_write(e, CONFLICT))?;

        if updated.rows_affected() == 0 {
            return Err(not_found());
        }

        Self::get_enrollment(db, id).await
    }

    /// Moves an enrollment along the status workflow.
    ///
    /// The row is locked while the transition is checked. Illegal
    /// transitions fail with 422.
    #[instrument(skip(db, notes))]
    pub async fn transition(
        db: &PgPool,
        id: Uuid,
        next: EnrollmentStatus,
        decided_by: Uuid,
        notes: Option<String>,
    ) -> Result<Enrollment, AppError> {
        let mut tx = db.begin().await?;

        let current: EnrollmentStatus =
            sqlx::query_scalar("SELECT status FROM enrollments WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(not_found)?;

        if !current.can_transition_to(next) {
            return Err(AppError::unprocessable(anyhow::anyhow!(
                "Cannot change enrollment status from {} to {}",
                current.as_str(),
                next.as_str()
            )));
        }

        sqlx::query(
            r#"UPDATE enrollments SET
                status = $2,
                notes = COALESCE($3, notes),
                validated_by = CASE WHEN $4 THEN $5 ELSE validated_by END,
                validation_date = CASE WHEN $4 THEN NOW() ELSE validation_date END,
                updated_at = NOW()
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(next)
        .bind(notes)
        .bind(records_decision(next))
        .bind(decided_by)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            enrollment_id = %id,
            from = current.as_str(),
            to = next.as_str(),
            "Enrollment status changed"
        );
        Self::get_enrollment(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn delete_enrollment(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM enrollments WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_decisions_record_the_decider() {
        assert!(records_decision(EnrollmentStatus::Approved));
        assert!(records_decision(EnrollmentStatus::Rejected));
        assert!(!records_decision(EnrollmentStatus::Active));
        assert!(!records_decision(EnrollmentStatus::Completed));
    }
}
