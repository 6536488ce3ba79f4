use mesrs_core::search::{contains_any, like_pattern};
use mesrs_core::{AppError, Paginated, hash_password};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::auth::service::normalize_email;
use crate::modules::profiles::model::{
    AdminUpdateProfileDto, CreateProfileDto, PROFILE_COLUMNS, Profile, ProfileFilterParams,
};

pub struct ProfileService;

impl ProfileService {
    #[instrument(skip(db, dto), fields(email = %dto.email, role = %dto.role))]
    pub async fn create_profile(db: &PgPool, dto: CreateProfileDto) -> Result<Profile, AppError> {
        let password_hash = hash_password(&dto.password)?;

        let query = format!(
            r#"INSERT INTO profiles
                (email, password_hash, first_name, last_name, role, phone, national_id, preferred_language)
               VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, 'fr'::ui_language))
               RETURNING {PROFILE_COLUMNS}"#
        );

        sqlx::query_as::<_, Profile>(&query)
            .bind(normalize_email(&dto.email))
            .bind(&password_hash)
            .bind(dto.first_name.trim())
            .bind(dto.last_name.trim())
            .bind(dto.role)
            .bind(&dto.phone)
            .bind(&dto.national_id)
            .bind(dto.preferred_language)
            .fetch_one(db)
            .await
            .map_err(|e| AppError::from_write(e, "Email or national ID already exists"))
    }

    #[instrument(skip(db))]
    pub async fn get_profile(db: &PgPool, id: Uuid) -> Result<Profile, AppError> {
        let query = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1");
        sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Profile not found")))
    }

    #[instrument(skip(db))]
    pub async fn list_profiles(
        db: &PgPool,
        filters: ProfileFilterParams,
    ) -> Result<Paginated<Profile>, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut where_clause = String::from(" WHERE 1=1");
        let mut params: Vec<String> = Vec::new();

        if let Some(pattern) = filters.search.as_deref().and_then(like_pattern) {
            params.push(pattern);
            where_clause.push_str(&format!(
                " AND {}",
                contains_any(&["first_name", "last_name", "email"], params.len())
            ));
        }
        if let Some(role) = filters.role {
            params.push(role.as_str().to_string());
            where_clause.push_str(&format!(" AND role = ${}::user_role", params.len()));
        }
        if let Some(is_active) = filters.is_active {
            params.push(is_active.to_string());
            where_clause.push_str(&format!(" AND is_active = ${}::boolean", params.len()));
        }

        let count_query = format!("SELECT COUNT(*) FROM profiles{where_clause}");
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_sql = count_sql.bind(param);
        }
        let total = count_sql.fetch_one(db).await?;

        let data_query = format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles{where_clause} \
             ORDER BY last_name ASC, first_name ASC LIMIT {limit} OFFSET {offset}"
        );
        let mut data_sql = sqlx::query_as::<_, Profile>(&data_query);
        for param in params {
            data_sql = data_sql.bind(param);
        }
        let profiles = data_sql.fetch_all(db).await?;

        Ok(Paginated::new(profiles, total, &filters.pagination))
    }

    #[instrument(skip(db, dto))]
    pub async fn update_profile(
        db: &PgPool,
        id: Uuid,
        dto: AdminUpdateProfileDto,
    ) -> Result<Profile, AppError> {
        let query = format!(
            r#"UPDATE profiles SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                phone = COALESCE($4, phone),
                address = COALESCE($5, address),
                date_of_birth = COALESCE($6, date_of_birth),
                avatar_url = COALESCE($7, avatar_url),
                preferred_language = COALESCE($8, preferred_language),
                email = COALESCE($9, email),
                role = COALESCE($10, role),
                is_active = COALESCE($11, is_active),
                national_id = COALESCE($12, national_id),
                updated_at = NOW()
               WHERE id = $1
               RETURNING {PROFILE_COLUMNS}"#
        );

        let profile = dto.profile;
        sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .bind(profile.first_name)
            .bind(profile.last_name)
            .bind(profile.phone)
            .bind(profile.address)
            .bind(profile.date_of_birth)
            .bind(profile.avatar_url)
            .bind(profile.preferred_language)
            .bind(dto.email.as_deref().map(normalize_email))
            .bind(dto.role)
            .bind(dto.is_active)
            .bind(dto.national_id)
            .fetch_optional(db)
            .await
            .map_err(|e| AppError::from_write(e, "Email or national ID already exists"))?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Profile not found")))
    }

    /// Deleting a profile cascades to its student or teacher record.
    #[instrument(skip(db))]
    pub async fn delete_profile(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(|e| AppError::from_write(e, "Profile is still referenced"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Profile not found")));
        }

        Ok(())
    }
}
