//! # MESRS Cache
//!
//! Optional Redis cache for dashboard series and the HTTP caching headers
//! that go with it.
//!
//! The cache is optional: when `REDIS_URL` is unset the application runs with
//! `None` and every helper in [`invalidate`] becomes a no-op.

pub mod config;
pub mod keys;
pub mod middleware;
pub mod redis;

pub use config::CacheConfig;
pub use keys::{dashboard, hash_params, invalidate};
pub use middleware::{CacheControlConfig, etag_middleware};
pub use redis::{CacheError, RedisCache};
