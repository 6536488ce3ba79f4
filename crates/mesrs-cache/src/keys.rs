//! Cache key generation and invalidation helpers.

use crate::RedisCache;
use tracing::warn;

fn build_key(parts: &[&str]) -> String {
    parts.join(":")
}

/// Keys for the dashboard series.
pub mod dashboard {
    use super::*;

    /// Key for a series whose payload does not depend on the language.
    pub fn series(name: &str) -> String {
        build_key(&["dashboard", name])
    }

    /// Key for a series that carries localized text.
    pub fn localized(name: &str, lang: &str) -> String {
        build_key(&["dashboard", name, lang])
    }

    /// Key for a series with query parameters, e.g. `months_back` or `limit`.
    pub fn with_params(name: &str, params_hash: &str) -> String {
        build_key(&["dashboard", name, params_hash])
    }

    pub fn invalidation_pattern() -> String {
        "dashboard:*".to_string()
    }
}

/// Short stable hash of query parameters for use as a key component.
pub fn hash_params<T: std::hash::Hash>(params: &T) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::Hasher;

    let mut hasher = DefaultHasher::new();
    params.hash(&mut hasher);
    format!("{:x}", hasher.finish())
}

pub mod invalidate {
    use super::*;

    /// Drops every cached dashboard series.
    ///
    /// Call after any write to universities, formations, students, teachers,
    /// enrollments, exam results, scholarships or activity logs.
    pub async fn dashboard(cache: Option<&RedisCache>) {
        let Some(cache) = cache else { return };

        if let Err(e) = cache
            .invalidate_pattern(&dashboard::invalidation_pattern())
            .await
        {
            warn!(error = %e, "Failed to invalidate dashboard caches");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashboard_keys_share_the_invalidation_prefix() {
        assert_eq!(dashboard::series("stats"), "dashboard:stats");
        assert_eq!(dashboard::localized("stat-cards", "ar"), "dashboard:stat-cards:ar");

        let pattern = dashboard::invalidation_pattern();
        let prefix = pattern.trim_end_matches('*');
        assert!(dashboard::series("success-rate").starts_with(prefix));
        assert!(dashboard::with_params("enrollment-trends", "ab12").starts_with(prefix));
    }

    #[test]
    fn params_hash_is_stable_and_distinct() {
        assert_eq!(hash_params(&12_i64), hash_params(&12_i64));
        assert_ne!(hash_params(&12_i64), hash_params(&24_i64));
    }

    #[tokio::test]
    async fn invalidate_without_cache_is_noop() {
        invalidate::dashboard(None).await;
    }
}
