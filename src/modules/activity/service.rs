use mesrs_core::{AppError, Paginated};
use serde_json::Value;
use sqlx::PgPool;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::metrics::track_record_created;
use crate::middleware::auth::AuthUser;
use crate::middleware::request::RequestMeta;
use crate::modules::activity::model::{
    ActivityAction, ActivityFilterParams, ActivityLog, ResourceType,
};
use crate::state::AppState;

const ACTIVITY_COLUMNS: &str =
    "id, user_id, action, resource_type, resource_id, details, ip_address, user_agent, created_at";

/// Who performed an action and from where.
#[derive(Debug, Clone, Default)]
pub struct Actor {
    pub user_id: Option<Uuid>,
    pub meta: RequestMeta,
}

impl Actor {
    pub fn new(user_id: Option<Uuid>, meta: RequestMeta) -> Self {
        Self { user_id, meta }
    }

    pub fn from_auth(auth_user: &AuthUser, meta: RequestMeta) -> Self {
        Self::new(auth_user.user_id().ok(), meta)
    }
}

pub struct ActivityService;

impl ActivityService {
    #[instrument(skip(db, details))]
    pub async fn record(
        db: &PgPool,
        actor: &Actor,
        action: &str,
        resource_type: &str,
        resource_id: Option<Uuid>,
        details: Option<Value>,
    ) -> Result<ActivityLog, AppError> {
        let query = format!(
            r#"INSERT INTO activity_logs
                (user_id, action, resource_type, resource_id, details, ip_address, user_agent)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING {ACTIVITY_COLUMNS}"#
        );

        let log = sqlx::query_as::<_, ActivityLog>(&query)
            .bind(actor.user_id)
            .bind(action)
            .bind(resource_type)
            .bind(resource_id)
            .bind(details)
            .bind(&actor.meta.ip_address)
            .bind(&actor.meta.user_agent)
            .fetch_one(db)
            .await
            .map_err(|e| AppError::from_write(e, "Activity could not be recorded"))?;

        Ok(log)
    }

    /// Records an activity. Failures are logged and swallowed so the action
    /// that triggered them still succeeds.
    pub async fn log(
        db: &PgPool,
        actor: &Actor,
        action: ActivityAction,
        resource_type: ResourceType,
        resource_id: Option<Uuid>,
        details: Option<Value>,
    ) {
        if let Err(e) = Self::record(
            db,
            actor,
            action.as_str(),
            resource_type.as_str(),
            resource_id,
            details,
        )
        .await
        {
            warn!(
                error = %e.error,
                action = action.as_str(),
                resource_type = resource_type.as_str(),
                "Failed to record activity"
            );
        }
    }

    /// Logs a write and drops the cached dashboard series it affects.
    pub async fn record_change(
        state: &AppState,
        actor: &Actor,
        action: ActivityAction,
        resource_type: ResourceType,
        resource_id: Option<Uuid>,
    ) {
        if action == ActivityAction::Create {
            track_record_created(resource_type.as_str());
        }
        Self::log(&state.db, actor, action, resource_type, resource_id, None).await;
        mesrs_cache::invalidate::dashboard(state.cache()).await;
    }

    #[instrument(skip(db))]
    pub async fn list(
        db: &PgPool,
        filters: ActivityFilterParams,
    ) -> Result<Paginated<ActivityLog>, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut where_clause = String::from(" WHERE 1=1");
        let mut params: Vec<String> = Vec::new();

        if let Some(action) = filters.action.as_deref().filter(|a| !a.is_empty()) {
            params.push(action.to_uppercase());
            where_clause.push_str(&format!(" AND action = ${}", params.len()));
        }
        if let Some(resource_type) = filters.resource_type.as_deref().filter(|r| !r.is_empty()) {
            params.push(resource_type.to_lowercase());
            where_clause.push_str(&format!(" AND resource_type = ${}", params.len()));
        }
        if let Some(user_id) = filters.user_id {
            params.push(user_id.to_string());
            where_clause.push_str(&format!(" AND user_id = ${}::uuid", params.len()));
        }

        let count_query = format!("SELECT COUNT(*) FROM activity_logs{where_clause}");
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_sql = count_sql.bind(param);
        }
        let total = count_sql.fetch_one(db).await?;

        let data_query = format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activity_logs{where_clause} \
             ORDER BY created_at DESC LIMIT {limit} OFFSET {offset}"
        );
        let mut data_sql = sqlx::query_as::<_, ActivityLog>(&data_query);
        for param in params {
            data_sql = data_sql.bind(param);
        }
        let logs = data_sql.fetch_all(db).await?;

        Ok(Paginated::new(logs, total, &filters.pagination))
    }
}
