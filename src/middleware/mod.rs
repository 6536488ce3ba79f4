//! Middleware and extractors for cross-cutting request concerns.
//!
//! - [`auth`]: Bearer token extractors (`AuthUser`, `OptionalAuthUser`)
//! - [`role`]: Role guards, as route layers or as extractors
//! - [`language`]: Per-request interface language
//! - [`request`]: Caller IP and user agent for the activity log
//!
//! # Authentication Flow
//!
//! 1. Client sends `Authorization: Bearer <token>`
//! 2. `AuthUser` verifies the JWT and exposes its claims
//! 3. Role guards compare the claimed role with the route's allowed roles
//! 4. Handler executes if all checks pass
//!
//! ```ignore
//! use crate::middleware::role::RequireStaff;
//!
//! async fn create_formation(RequireStaff(auth_user): RequireStaff) -> impl IntoResponse {
//!     // admin or staff only
//! }
//! ```

pub mod auth;
pub mod language;
pub mod request;
pub mod role;
