//! Redis cache configuration.

use std::env;

/// Cache settings read from the environment.
///
/// - `REDIS_URL`: connection URL. Caching is disabled when unset or empty.
/// - `CACHE_KEY_PREFIX`: prefix for every key (default: `mesrs`)
#[derive(Clone, Debug)]
pub struct CacheConfig {
    pub redis_url: Option<String>,
    pub key_prefix: String,
}

impl CacheConfig {
    pub fn from_env() -> Self {
        Self {
            redis_url: env::var("REDIS_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            key_prefix: env::var("CACHE_KEY_PREFIX").unwrap_or_else(|_| "mesrs".into()),
        }
    }

    pub fn enabled(&self) -> bool {
        self.redis_url.is_some()
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            key_prefix: "mesrs".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_disabled() {
        let config = CacheConfig::default();
        assert!(!config.enabled());
        assert_eq!(config.key_prefix, "mesrs");
    }
}
