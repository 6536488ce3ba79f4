//! # MESRS Auth
//!
//! Roles, JWT claims and token utilities.
//!
//! - [`role`]: The four user roles and their hierarchy
//! - [`claims`]: Access and refresh token claims
//! - [`jwt`]: Token creation and verification
//!
//! ```ignore
//! use mesrs_auth::{Role, create_access_token, verify_token};
//!
//! let token = create_access_token(user_id, "admin@mesrs.mr", Role::Admin, Language::Fr, &config)?;
//! let claims = verify_token(&token, &config)?;
//! assert!(claims.role.is_admin());
//! ```

pub mod claims;
pub mod jwt;
pub mod role;

pub use claims::{Claims, RefreshTokenClaims};
pub use jwt::{create_access_token, create_refresh_token, verify_refresh_token, verify_token};
pub use role::Role;
