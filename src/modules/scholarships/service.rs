use mesrs_core::{AppError, Paginated};
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::modules::scholarships::model::{
    ApplicationDecisionDto, ApplicationFilterParams, ApplicationStatus, CreateScholarshipDto,
    Scholarship, ScholarshipApplication, ScholarshipFilterParams, UpdateScholarshipDto,
};

const SCHOLARSHIP_COLUMNS: &str = "id, name, type, amount, duration_months, max_recipients, \
     deadline, criteria, academic_year_id, is_active, created_at, updated_at";

const APPLICATION_SELECT: &str = r#"SELECT a.id, a.scholarship_id, sc.name AS scholarship_name,
        a.student_id, s.student_number,
        p.first_name || ' ' || p.last_name AS student_name,
        a.status, a.score, a.motivation_letter, a.decision_by, a.decision_date, a.comments,
        a.created_at, a.updated_at
    FROM scholarship_applications a
    JOIN scholarships sc ON sc.id = a.scholarship_id
    JOIN students s ON s.id = a.student_id
    JOIN profiles p ON p.id = s.profile_id"#;

fn scholarship_not_found() -> AppError {
    AppError::not_found(anyhow::anyhow!("Scholarship not found"))
}

fn application_not_found() -> AppError {
    AppError::not_found(anyhow::anyhow!("Scholarship application not found"))
}

/// Whether one more approval fits under `max_recipients`. No cap means unlimited.
pub fn has_capacity(max_recipients: Option<i32>, approved: i64) -> bool {
    max_recipients.is_none_or(|max| approved < i64::from(max))
}

pub struct ScholarshipService;

impl ScholarshipService {
    #[instrument(skip(db, dto), fields(name = %dto.name))]
    pub async fn create_scholarship(
        db: &PgPool,
        dto: CreateScholarshipDto,
    ) -> Result<Scholarship, AppError> {
        let query = format!(
            r#"INSERT INTO scholarships
                (name, type, amount, duration_months, max_recipients, deadline, criteria,
                 academic_year_id)
               VALUES ($1, $2, $3, COALESCE($4, 12), $5, $6, $7, $8)
               RETURNING {SCHOLARSHIP_COLUMNS}"#
        );

        sqlx::query_as::<_, Scholarship>(&query)
            .bind(dto.name.trim())
            .bind(dto.scholarship_type)
            .bind(dto.amount)
            .bind(dto.duration_months)
            .bind(dto.max_recipients)
            .bind(dto.deadline)
            .bind(&dto.criteria)
            .bind(dto.academic_year_id)
            .fetch_one(db)
            .await
            .map_err(|e| AppError::from_write(e, "Academic year not found"))
    }

    #[instrument(skip(db))]
    pub async fn get_scholarship(db: &PgPool, id: Uuid) -> Result<Scholarship, AppError> {
        let query = format!("SELECT {SCHOLARSHIP_COLUMNS} FROM scholarships WHERE id = $1");
        sqlx::query_as::<_, Scholarship>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(scholarship_not_found)
    }

    #[instrument(skip(db))]
    pub async fn list_scholarships(
        db: &PgPool,
        filters: ScholarshipFilterParams,
    ) -> Result<Paginated<Scholarship>, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut where_clause = String::from(" WHERE 1=1");
        let mut params: Vec<String> = Vec::new();

        if let Some(kind) = filters.scholarship_type {
            params.push(kind.as_str().to_string());
            where_clause.push_str(&format!(" AND type = ${}::scholarship_type", params.len()));
        }
        if let Some(is_active) = filters.is_active {
            params.push(is_active.to_string());
            where_clause.push_str(&format!(" AND is_active = ${}::boolean", params.len()));
        }
        if let Some(academic_year_id) = filters.academic_year_id {
            params.push(academic_year_id.to_string());
            where_clause.push_str(&format!(" AND academic_year_id = ${}::uuid", params.len()));
        }

        let count_query = format!("SELECT COUNT(*) FROM scholarships{where_clause}");
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_sql = count_sql.bind(param);
        }
        let total = count_sql.fetch_one(db).await?;

        let data_query = format!(
            "SELECT {SCHOLARSHIP_COLUMNS} FROM scholarships{where_clause} \
             ORDER BY deadline ASC NULLS LAST, name ASC LIMIT {limit} OFFSET {offset}"
        );
        let mut data_sql = sqlx::query_as::<_, Scholarship>(&data_query);
        for param in params {
            data_sql = data_sql.bind(param);
        }
        let scholarships = data_sql.fetch_all(db).await?;

        Ok(Paginated::new(scholarships, total, &filters.pagination))
    }

    #[instrument(skip(db, dto))]
    pub async fn update_scholarship(
        db: &PgPool,
        id: Uuid,
        dto: UpdateScholarshipDto,
    ) -> Result<Scholarship, AppError> {
        let query = format!(
            r#"UPDATE scholarships SET
                name = COALESCE($2, name),
                type = COALESCE($3, type),
                amount = COALESCE($4, amount),
                duration_months = COALESCE($5, duration_months),
                max_recipients = COALESCE($6, max_recipients),
                deadline = COALESCE($7, deadline),
                criteria = COALESCE($8, criteria),
                academic_year_id = COALESCE($9, academic_year_id),
                is_active = COALESCE($10, is_active),
                updated_at = NOW()
               WHERE id = $1
               RETURNING {SCHOLARSHIP_COLUMNS}"#
        );

        sqlx::query_as::<_, Scholarship>(&query)
            .bind(id)
            .bind(dto.name)
            .bind(dto.scholarship_type)
            .bind(dto.amount)
            .bind(dto.duration_months)
            .bind(dto.max_recipients)
            .bind(dto.deadline)
            .bind(dto.criteria)
            .bind(dto.academic_year_id)
            .bind(dto.is_active)
            .fetch_optional(db)
            .await
            .map_err(|e| AppError::from_write(e, "Academic year not found"))?
            .ok_or_else(scholarship_not_found)
    }

    #[instrument(skip(db))]
    pub async fn delete_scholarship(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM scholarships WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(scholarship_not_found());
        }

        Ok(())
    }

    /// Files an application. The scholarship must be active and its deadline
    /// not yet passed.
    #[instrument(skip(db, motivation_letter))]
    pub async fn create_application(
        db: &PgPool,
        scholarship_id: Uuid,
        student_id: Uuid,
        motivation_letter: Option<String>,
    ) -> Result<ScholarshipApplication, AppError> {
        let open: bool = sqlx::query_scalar(
            r#"SELECT is_active AND (deadline IS NULL OR deadline >= CURRENT_DATE)
               FROM scholarships WHERE id = $1"#,
        )
        .bind(scholarship_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(scholarship_not_found)?;

        if !open {
            return Err(AppError::unprocessable(anyhow::anyhow!(
                "Scholarship is not accepting applications"
            )));
        }

        let id: Uuid = sqlx::query_scalar(
            r#"INSERT INTO scholarship_applications (scholarship_id, student_id, motivation_letter)
               VALUES ($1, $2, $3)
               RETURNING id"#,
        )
        .bind(scholarship_id)
        .bind(student_id)
        .bind(motivation_letter)
        .fetch_one(db)
        .await
        .map_err(|e| {
            AppError::from_write(e, "Student has already applied for this scholarship")
        })?;

        Self::get_application(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn get_application(
        db: &PgPool,
        id: Uuid,
    ) -> Result<ScholarshipApplication, AppError> {
        let query = format!("{APPLICATION_SELECT} WHERE a.id = $1");
        sqlx::query_as::<_, ScholarshipApplication>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(application_not_found)
    }

    #[instrument(skip(db))]
    pub async fn list_applications(
        db: &PgPool,
        filters: ApplicationFilterParams,
    ) -> Result<Paginated<ScholarshipApplication>, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut where_clause = String::from(" WHERE 1=1");
        let mut params: Vec<String> = Vec::new();

        if let Some(status) = filters.status {
            params.push(status.as_str().to_string());
            where_clause.push_str(&format!(
                " AND a.status = ${}::application_status",
                params.len()
            ));
        }
        let id_filters = [
            ("a.scholarship_id", filters.scholarship_id),
            ("a.student_id", filters.student_id),
        ];
        for (column, value) in id_filters {
            if let Some(id) = value {
                params.push(id.to_string());
                where_clause.push_str(&format!(" AND {column} = ${}::uuid", params.len()));
            }
        }

        let count_query = format!("SELECT COUNT(*) FROM scholarship_applications a{where_clause}");
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_sql = count_sql.bind(param);
        }
        let total = count_sql.fetch_one(db).await?;

        let data_query = format!(
            "{APPLICATION_SELECT}{where_clause} \
             ORDER BY a.created_at DESC LIMIT {limit} OFFSET {offset}"
        );
        let mut data_sql = sqlx::query_as::<_, ScholarshipApplication>(&data_query);
        for param in params {
            data_sql = data_sql.bind(param);
        }
        let applications = data_sql.fetch_all(db).await?;

        Ok(Paginated::new(applications, total, &filters.pagination))
    }

    /// Approves or rejects a pending application.
    ///
    /// The scholarship row is locked so concurrent approvals cannot exceed
    /// `max_recipients`.
    #[instrument(skip(db, dto))]
    pub async fn decide(
        db: &PgPool,
        id: Uuid,
        dto: ApplicationDecisionDto,
        decided_by: Uuid,
    ) -> Result<ScholarshipApplication, AppError> {
        let mut tx = db.begin().await?;

        let (current, scholarship_id): (ApplicationStatus, Uuid) = sqlx::query_as(
            "SELECT status, scholarship_id FROM scholarship_applications WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(application_not_found)?;

        if !current.can_transition_to(dto.status) {
            return Err(AppError::unprocessable(anyhow::anyhow!(
                "Application has already been {}",
                current.as_str()
            )));
        }

        if dto.status == ApplicationStatus::Approved {
            let max_recipients: Option<i32> = sqlx::query_scalar(
                "SELECT max_recipients FROM scholarships WHERE id = $1 FOR UPDATE",
            )
            .bind(scholarship_id)
            .fetch_one(&mut *tx)
            .await?;

            let approved: i64 = sqlx::query_scalar(
                r#"SELECT COUNT(*) FROM scholarship_applications
                   WHERE scholarship_id = $1 AND status = 'approved'"#,
            )
            .bind(scholarship_id)
            .fetch_one(&mut *tx)
            .await?;

            if !has_capacity(max_recipients, approved) {
                return Err(AppError::unprocessable(anyhow::anyhow!(
                    "Scholarship has reached its maximum number of recipients"
                )));
            }
        }

        sqlx::query(
            r#"UPDATE scholarship_applications SET
                status = $2,
                score = COALESCE($3, score),
                comments = COALESCE($4, comments),
                decision_by = $5,
                decision_date = NOW(),
                updated_at = NOW()
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(dto.status)
        .bind(dto.score)
        .bind(dto.comments)
        .bind(decided_by)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            application_id = %id,
            decision = dto.status.as_str(),
            "Scholarship application decided"
        );
        Self::get_application(db, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncapped_scholarships_always_have_capacity() {
        assert!(has_capacity(None, 0));
        assert!(has_capacity(None, 10_000));
    }

    #[test]
    fn capacity_stops_at_max_recipients() {
        assert!(has_capacity(Some(3), 2));
        assert!(!has_capacity(Some(3), 3));
        assert!(!has_capacity(Some(1), 5));
    }
}
