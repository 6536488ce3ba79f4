use mesrs_core::search::{contains_any, like_pattern};
use mesrs_core::{AppError, Paginated};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::formations::model::{
    CreateFormationDto, Formation, FormationFilterParams, UpdateFormationDto,
};

const FORMATION_COLUMNS: &str = "id, code, name, university_id, level, duration_years, credits, \
     capacity, description, is_active, created_at, updated_at";

const CONFLICT: &str = "Formation code already exists";

pub struct FormationService;

impl FormationService {
    #[instrument(skip(db, dto), fields(code = %dto.code))]
    pub async fn create_formation(
        db: &PgPool,
        dto: CreateFormationDto,
    ) -> Result<Formation, AppError> {
        let query = format!(
            r#"INSERT INTO formations
                (code, name, university_id, level, duration_years, credits, capacity, description)
               VALUES ($1, $2, $3, $4, COALESCE($5, 3), COALESCE($6, 180), $7, $8)
               RETURNING {FORMATION_COLUMNS}"#
        );

        sqlx::query_as::<_, Formation>(&query)
            .bind(dto.code.trim().to_uppercase())
            .bind(dto.name.trim())
            .bind(dto.university_id)
            .bind(dto.level)
            .bind(dto.duration_years)
            .bind(dto.credits)
            .bind(dto.capacity)
            .bind(&dto.description)
            .fetch_one(db)
            .await
            .map_err(|e| AppError::from_write(e, CONFLICT))
    }

    #[instrument(skip(db))]
    pub async fn get_formation(db: &PgPool, id: Uuid) -> Result<Formation, AppError> {
        let query = format!("SELECT {FORMATION_COLUMNS} FROM formations WHERE id = $1");
        sqlx::query_as::<_, Formation>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Formation not found")))
    }

    #[instrument(skip(db))]
    pub async fn list_formations(
        db: &PgPool,
        filters: FormationFilterParams,
    ) -> Result<Paginated<Formation>, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut where_clause = String::from(" WHERE 1=1");
        let mut params: Vec<String> = Vec::new();

        if let Some(pattern) = filters.search.as_deref().and_then(like_pattern) {
            params.push(pattern);
            where_clause.push_str(&format!(" AND {}", contains_any(&["name", "code"], params.len())));
        }
        if let Some(university_id) = filters.university_id {
            params.push(university_id.to_string());
            where_clause.push_str(&format!(" AND university_id = ${}::uuid", params.len()));
        }
        if let Some(level) = filters.level {
            params.push(level.as_str().to_string());
            where_clause.push_str(&format!(" AND level = ${}::study_level", params.len()));
        }
        if let Some(is_active) = filters.is_active {
            params.push(is_active.to_string());
            where_clause.push_str(&format!(" AND is_active = ${}::boolean", params.len()));
        }

        let count_query = format!("SELECT COUNT(*) FROM formations{where_clause}");
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_sql = count_sql.bind(param);
        }
        let total = count_sql.fetch_one(db).await?;

        let data_query = format!(
            "SELECT {FORMATION_COLUMNS} FROM formations{where_clause} \
             ORDER BY name ASC LIMIT {limit} OFFSET {offset}"
        );
        let mut data_sql = sqlx::query_as::<_, Formation>(&data_query);
        for param in params {
            data_sql = data_sql.bind(param);
        }
        let formations = data_sql.fetch_all(db).await?;

        Ok(Paginated::new(formations, total, &filters.pagination))
    }

    #[instrument(skip(db, dto))]
    pub async fn update_formation(
        db: &PgPool,
        id: Uuid,
        dto: UpdateFormationDto,
    ) -> Result<Formation, AppError> {
        let query = format!(
            r#"UPDATE formations SET
                code = COALESCE($2, code),
                name = COALESCE($3, name),
                level = COALESCE($4, level),
                duration_years = COALESCE($5, duration_years),
                credits = COALESCE($6, credits),
                capacity = COALESCE($7, capacity),
                description = COALESCE($8, description),
                is_active = COALESCE($9, is_active),
                updated_at = NOW()
               WHERE id = $1
               RETURNING {FORMATION_COLUMNS}"#
        );

        sqlx::query_as::<_, Formation>(&query)
            .bind(id)
            .bind(dto.code.map(|c| c.trim().to_uppercase()))
            .bind(dto.name)
            .bind(dto.level)
            .bind(dto.duration_years)
            .bind(dto.credits)
            .bind(dto.capacity)
            .bind(dto.description)
            .bind(dto.is_active)
            .fetch_optional(db)
            .await
            .map_err(|e| AppError::from_write(e, CONFLICT))?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Formation not found")))
    }

    /// Courses and enrollments go with the formation; students keep their
    /// record with no formation.
    #[instrument(skip(db))]
    pub async fn delete_formation(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM formations WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(|e| AppError::from_write(e, "Formation is still referenced"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Formation not found")));
        }

        Ok(())
    }
}
