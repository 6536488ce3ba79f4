//! # MESRS Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`jwt`]: JWT signing secret and token lifetimes
//! - [`cors`]: Allowed origins for the dashboard client
//! - [`email`]: SMTP settings for password reset mail
//! - [`rate_limit`]: Per-IP rate limits for general and auth endpoints
//! - [`dashboard`]: Refresh intervals of the dashboard series
//!
//! ```ignore
//! use mesrs_config::{DashboardConfig, JwtConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let dashboard = DashboardConfig::from_env();
//! ```

pub mod cors;
pub mod dashboard;
pub mod email;
pub mod jwt;
pub mod rate_limit;

pub use cors::CorsConfig;
pub use dashboard::DashboardConfig;
pub use email::EmailConfig;
pub use jwt::JwtConfig;
pub use rate_limit::RateLimitConfig;

pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
