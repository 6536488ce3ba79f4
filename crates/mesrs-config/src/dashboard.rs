//! Refresh intervals of the dashboard series.
//!
//! Counters and the activity feed move quickly, trends slowly, and
//! performance figures barely within a day. Each series advertises its
//! interval to the client and uses it as its cache TTL.
//!
//! - `DASHBOARD_STATS_REFRESH_SECS`: stats and recent activities (default: 30)
//! - `DASHBOARD_TRENDS_REFRESH_SECS`: enrollment trends, formation and university series (default: 60)
//! - `DASHBOARD_PERFORMANCE_REFRESH_SECS`: performance, growth and success rate (default: 300)

use crate::env_or;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DashboardConfig {
    pub stats_refresh_secs: u64,
    pub trends_refresh_secs: u64,
    pub performance_refresh_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            stats_refresh_secs: 30,
            trends_refresh_secs: 60,
            performance_refresh_secs: 300,
        }
    }
}

impl DashboardConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            stats_refresh_secs: env_or("DASHBOARD_STATS_REFRESH_SECS", defaults.stats_refresh_secs)
                .max(1),
            trends_refresh_secs: env_or(
                "DASHBOARD_TRENDS_REFRESH_SECS",
                defaults.trends_refresh_secs,
            )
            .max(1),
            performance_refresh_secs: env_or(
                "DASHBOARD_PERFORMANCE_REFRESH_SECS",
                defaults.performance_refresh_secs,
            )
            .max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_client_refetch_intervals() {
        let config = DashboardConfig::default();
        assert_eq!(config.stats_refresh_secs, 30);
        assert_eq!(config.trends_refresh_secs, 60);
        assert_eq!(config.performance_refresh_secs, 300);
    }
}
