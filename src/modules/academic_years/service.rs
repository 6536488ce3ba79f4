use mesrs_core::{AppError, Paginated, PaginationParams};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::academic_years::model::{
    AcademicYear, CreateAcademicYearDto, UpdateAcademicYearDto,
};

const ACADEMIC_YEAR_COLUMNS: &str =
    "id, name, start_date, end_date, is_current, created_at, updated_at";

fn not_found() -> AppError {
    AppError::not_found(anyhow::anyhow!("Academic year not found"))
}

pub struct AcademicYearService;

impl AcademicYearService {
    /// At most one year is current: creating a current year demotes the previous one.
    #[instrument(skip(db, dto), fields(name = %dto.name))]
    pub async fn create_academic_year(
        db: &PgPool,
        dto: CreateAcademicYearDto,
    ) -> Result<AcademicYear, AppError> {
        let mut tx = db.begin().await?;

        if dto.is_current {
            sqlx::query(
                "UPDATE academic_years SET is_current = FALSE, updated_at = NOW() WHERE is_current",
            )
            .execute(&mut *tx)
            .await?;
        }

        let query = format!(
            r#"INSERT INTO academic_years (name, start_date, end_date, is_current)
               VALUES ($1, $2, $3, $4)
               RETURNING {ACADEMIC_YEAR_COLUMNS}"#
        );
        let year = sqlx::query_as::<_, AcademicYear>(&query)
            .bind(dto.name.trim())
            .bind(dto.start_date)
            .bind(dto.end_date)
            .bind(dto.is_current)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| AppError::from_write(e, "Academic year already exists"))?;

        tx.commit().await?;
        Ok(year)
    }

    #[instrument(skip(db))]
    pub async fn get_academic_year(db: &PgPool, id: Uuid) -> Result<AcademicYear, AppError> {
        let query = format!("SELECT {ACADEMIC_YEAR_COLUMNS} FROM academic_years WHERE id = $1");
        sqlx::query_as::<_, AcademicYear>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(not_found)
    }

    #[instrument(skip(db))]
    pub async fn get_current_academic_year(db: &PgPool) -> Result<AcademicYear, AppError> {
        let query = format!("SELECT {ACADEMIC_YEAR_COLUMNS} FROM academic_years WHERE is_current");
        sqlx::query_as::<_, AcademicYear>(&query)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("No current academic year")))
    }

    #[instrument(skip(db))]
    pub async fn list_academic_years(
        db: &PgPool,
        pagination: PaginationParams,
    ) -> Result<Paginated<AcademicYear>, AppError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM academic_years")
            .fetch_one(db)
            .await?;

        let query = format!(
            "SELECT {ACADEMIC_YEAR_COLUMNS} FROM academic_years \
             ORDER BY start_date DESC LIMIT $1 OFFSET $2"
        );
        let years = sqlx::query_as::<_, AcademicYear>(&query)
            .bind(pagination.limit())
            .bind(pagination.offset())
            .fetch_all(db)
            .await?;

        Ok(Paginated::new(years, total, &pagination))
    }

    /// Date ranges are re-checked by the table constraint after merging.
    #[instrument(skip(db, dto))]
    pub async fn update_academic_year(
        db: &PgPool,
        id: Uuid,
        dto: UpdateAcademicYearDto,
    ) -> Result<AcademicYear, AppError> {
        let query = format!(
            r#"UPDATE academic_years SET
                name = COALESCE($2, name),
                start_date = COALESCE($3, start_date),
                end_date = COALESCE($4, end_date),
                updated_at = NOW()
               WHERE id = $1
               RETURNING {ACADEMIC_YEAR_COLUMNS}"#
        );

        sqlx::query_as::<_, AcademicYear>(&query)
            .bind(id)
            .bind(dto.name)
            .bind(dto.start_date)
            .bind(dto.end_date)
            .fetch_optional(db)
            .await
            .map_err(|e| AppError::from_write(e, "Academic year already exists"))?
            .ok_or_else(not_found)
    }

    /// Makes `id` the only current year.
    #[instrument(skip(db))]
    pub async fn set_current(db: &PgPool, id: Uuid) -> Result<AcademicYear, AppError> {
        let mut tx = db.begin().await?;

        sqlx::query(
            "UPDATE academic_years SET is_current = FALSE, updated_at = NOW() \
             WHERE is_current AND id <> $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let query = format!(
            r#"UPDATE academic_years SET is_current = TRUE, updated_at = NOW()
               WHERE id = $1
               RETURNING {ACADEMIC_YEAR_COLUMNS}"#
        );
        let year = sqlx::query_as::<_, AcademicYear>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(not_found)?;

        tx.commit().await?;
        Ok(year)
    }

    #[instrument(skip(db))]
    pub async fn delete_academic_year(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM academic_years WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(|e| AppError::from_write(e, "Academic year is still referenced"))?;

        if result.rows_affected() == 0 {
            return Err(not_found());
        }

        Ok(())
    }
}
