use mesrs_core::search::{contains_any, like_pattern};
use mesrs_core::{AppError, Paginated};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::universities::model::{
    CreateUniversityDto, University, UniversityFilterParams, UniversityWithStats,
    UpdateUniversityDto,
};

const UNIVERSITY_COLUMNS: &str = "id, code, name, address, email, phone, website, rector_name, \
     latitude, longitude, is_active, created_at, updated_at";

const STATS_SELECT: &str = r#"SELECT u.id, u.code, u.name, u.address, u.email, u.phone, u.website,
        u.rector_name, u.latitude, u.longitude, u.is_active, u.created_at, u.updated_at,
        (SELECT COUNT(*) FROM students s WHERE s.university_id = u.id) AS student_count,
        (SELECT COUNT(*) FROM teachers t WHERE t.university_id = u.id) AS teacher_count,
        (SELECT COUNT(*) FROM formations f WHERE f.university_id = u.id) AS formation_count
    FROM universities u"#;

pub struct UniversityService;

impl UniversityService {
    #[instrument(skip(db, dto), fields(code = %dto.code))]
    pub async fn create_university(
        db: &PgPool,
        dto: CreateUniversityDto,
    ) -> Result<University, AppError> {
        let query = format!(
            r#"INSERT INTO universities
                (code, name, address, email, phone, website, rector_name, latitude, longitude)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
               RETURNING {UNIVERSITY_COLUMNS}"#
        );

        sqlx::query_as::<_, University>(&query)
            .bind(dto.code.trim().to_uppercase())
            .bind(dto.name.trim())
            .bind(&dto.address)
            .bind(&dto.email)
            .bind(&dto.phone)
            .bind(&dto.website)
            .bind(&dto.rector_name)
            .bind(dto.latitude)
            .bind(dto.longitude)
            .fetch_one(db)
            .await
            .map_err(|e| AppError::from_write(e, "University code already exists"))
    }

    #[instrument(skip(db))]
    pub async fn get_university(db: &PgPool, id: Uuid) -> Result<UniversityWithStats, AppError> {
        let query = format!("{STATS_SELECT} WHERE u.id = $1");
        sqlx::query_as::<_, UniversityWithStats>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("University not found")))
    }

    #[instrument(skip(db))]
    pub async fn list_universities(
        db: &PgPool,
        filters: UniversityFilterParams,
    ) -> Result<Paginated<UniversityWithStats>, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut where_clause = String::from(" WHERE 1=1");
        let mut params: Vec<String> = Vec::new();

        if let Some(pattern) = filters.search.as_deref().and_then(like_pattern) {
            params.push(pattern);
            where_clause.push_str(&format!(
                " AND {}",
                contains_any(&["u.name", "u.code"], params.len())
            ));
        }
        if let Some(is_active) = filters.is_active {
            params.push(is_active.to_string());
            where_clause.push_str(&format!(" AND u.is_active = ${}::boolean", params.len()));
        }

        let count_query = format!("SELECT COUNT(*) FROM universities u{where_clause}");
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_sql = count_sql.bind(param);
        }
        let total = count_sql.fetch_one(db).await?;

        let data_query = format!(
            "{STATS_SELECT}{where_clause} ORDER BY u.name ASC LIMIT {limit} OFFSET {offset}"
        );
        let mut data_sql = sqlx::query_as::<_, UniversityWithStats>(&data_query);
        for param in params {
            data_sql = data_sql.bind(param);
        }
        let universities = data_sql.fetch_all(db).await?;

        Ok(Paginated::new(universities, total, &filters.pagination))
    }

    #[instrument(skip(db, dto))]
    pub async fn update_university(
        db: &PgPool,
        id: Uuid,
        dto: UpdateUniversityDto,
    ) -> Result<University, AppError> {
        let query = format!(
            r#"UPDATE universities SET
                code = COALESCE($2, code),
                name = COALESCE($3, name),
                address = COALESCE($4, address),
                email = COALESCE($5, email),
                phone = COALESCE($6, phone),
                website = COALESCE($7, website),
                rector_name = COALESCE($8, rector_name),
                latitude = COALESCE($9, latitude),
                longitude = COALESCE($10, longitude),
                is_active = COALESCE($11, is_active),
                updated_at = NOW()
               WHERE id = $1
               RETURNING {UNIVERSITY_COLUMNS}"#
        );

        sqlx::query_as::<_, University>(&query)
            .bind(id)
            .bind(dto.code.map(|c| c.trim().to_uppercase()))
            .bind(dto.name)
            .bind(dto.address)
            .bind(dto.email)
            .bind(dto.phone)
            .bind(dto.website)
            .bind(dto.rector_name)
            .bind(dto.latitude)
            .bind(dto.longitude)
            .bind(dto.is_active)
            .fetch_optional(db)
            .await
            .map_err(|e| AppError::from_write(e, "University code already exists"))?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("University not found")))
    }

    /// Fails with 400 while formations, students or teachers still reference it.
    #[instrument(skip(db))]
    pub async fn delete_university(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM universities WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(|e| AppError::from_write(e, "University is still referenced"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("University not found")));
        }

        Ok(())
    }
}
