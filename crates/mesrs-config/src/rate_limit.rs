//! Rate limiting configuration for API endpoints.
//!
//! Token bucket limits keyed by peer IP, via `tower_governor`:
//!
//! - `RATE_LIMIT_GENERAL_PER_SECOND`: replenish interval in seconds for general endpoints (default: 1)
//! - `RATE_LIMIT_GENERAL_BURST_SIZE`: burst size for general endpoints (default: 60)
//! - `RATE_LIMIT_AUTH_PER_SECOND`: replenish interval in seconds for auth endpoints (default: 10)
//! - `RATE_LIMIT_AUTH_BURST_SIZE`: burst size for auth endpoints (default: 5)
//!
//! The dashboard polls several series every 30 seconds per open tab, so the
//! general burst is sized for that.

use tower_governor::governor::{GovernorConfig, GovernorConfigBuilder};
use tower_governor::key_extractor::PeerIpKeyExtractor;

use crate::env_or;

pub type PeerIpGovernorConfig =
    GovernorConfig<PeerIpKeyExtractor, ::governor::middleware::NoOpMiddleware>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub general_per_second: u64,
    pub general_burst_size: u32,
    pub auth_per_second: u64,
    pub auth_burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            general_per_second: 1,
            general_burst_size: 60,
            auth_per_second: 10,
            auth_burst_size: 5,
        }
    }
}

impl RateLimitConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: std::env::var("RATE_LIMIT_ENABLED")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(defaults.enabled),
            general_per_second: env_or(
                "RATE_LIMIT_GENERAL_PER_SECOND",
                defaults.general_per_second,
            ),
            general_burst_size: env_or(
                "RATE_LIMIT_GENERAL_BURST_SIZE",
                defaults.general_burst_size,
            ),
            auth_per_second: env_or("RATE_LIMIT_AUTH_PER_SECOND", defaults.auth_per_second),
            auth_burst_size: env_or("RATE_LIMIT_AUTH_BURST_SIZE", defaults.auth_burst_size),
        }
    }

    /// Returns `None` when the configured values are zero.
    #[must_use]
    pub fn general_governor_config(&self) -> Option<PeerIpGovernorConfig> {
        GovernorConfigBuilder::default()
            .per_second(self.general_per_second)
            .burst_size(self.general_burst_size)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
    }

    #[must_use]
    pub fn auth_governor_config(&self) -> Option<PeerIpGovernorConfig> {
        GovernorConfigBuilder::default()
            .per_second(self.auth_per_second)
            .burst_size(self.auth_burst_size)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RateLimitConfig::default();
        assert!(config.enabled);
        assert_eq!(config.general_burst_size, 60);
        assert_eq!(config.auth_burst_size, 5);
    }

    #[test]
    fn test_governor_configs_build() {
        let config = RateLimitConfig::default();
        assert!(config.general_governor_config().is_some());
        assert!(config.auth_governor_config().is_some());
    }

    #[test]
    fn test_zero_burst_is_rejected() {
        let config = RateLimitConfig {
            auth_burst_size: 0,
            ..RateLimitConfig::default()
        };
        assert!(config.auth_governor_config().is_none());
    }
}
