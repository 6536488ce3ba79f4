//! # MESRS Core
//!
//! Core types, errors, and utilities for the MESRS dashboard API.
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`i18n`]: Arabic/French language selection, text catalog and number formatting
//! - [`pagination`]: Pagination parameters and response envelope
//! - [`password`]: Password hashing and verification
//! - [`search`]: Helpers for case-insensitive substring filters
//! - [`serde`]: Custom serde helpers for query strings
//!
//! # Example
//!
//! ```ignore
//! use mesrs_core::errors::AppError;
//! use mesrs_core::i18n::{Language, format_number};
//!
//! let error = AppError::not_found(anyhow::anyhow!("Student not found"));
//! assert_eq!(format_number(12500, Language::Fr), "12\u{202F}500");
//! ```

pub mod errors;
pub mod i18n;
pub mod pagination;
pub mod password;
pub mod search;
pub mod serde;

pub use errors::AppError;
pub use i18n::{Language, Msg, format_number};
pub use pagination::{Paginated, PaginationMeta, PaginationParams};
pub use password::{hash_password, verify_password};
