use mesrs_cache::{CacheConfig, RedisCache};
use mesrs_config::{CorsConfig, DashboardConfig, EmailConfig, JwtConfig, RateLimitConfig};
use sqlx::PgPool;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub email_config: EmailConfig,
    pub cors_config: CorsConfig,
    pub rate_limit_config: RateLimitConfig,
    pub dashboard_config: DashboardConfig,
    /// Dashboard series cache; `None` when `REDIS_URL` is not set
    pub cache: Option<RedisCache>,
}

impl AppState {
    /// State with every setting read from the environment and no cache.
    pub fn from_env(db: PgPool) -> Self {
        Self {
            db,
            jwt_config: JwtConfig::from_env(),
            email_config: EmailConfig::from_env(),
            cors_config: CorsConfig::from_env(),
            rate_limit_config: RateLimitConfig::from_env(),
            dashboard_config: DashboardConfig::from_env(),
            cache: None,
        }
    }

    pub fn cache(&self) -> Option<&RedisCache> {
        self.cache.as_ref()
    }
}

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let db = mesrs_db::init_db_pool().await?;
    mesrs_db::run_migrations(&db).await?;

    let mut state = AppState::from_env(db);
    state.cache = RedisCache::from_config(&CacheConfig::from_env()).await;

    Ok(state)
}
