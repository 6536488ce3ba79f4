//! # MESRS Models
//!
//! Database entities, request/response DTOs and filter parameters.
//!
//! - [`profiles`]: User profiles (one per account)
//! - [`auth`]: Sign-in, sign-up, token and password flows
//! - [`universities`], [`academic_years`], [`formations`], [`courses`]: Academic structure
//! - [`students`], [`teachers`]: People attached to a university
//! - [`enrollments`], [`exams`], [`scholarships`]: Workflows with status transitions
//! - [`activity`]: Audit log records
//! - [`dashboard`]: Aggregated statistics and chart series
//! - [`navigation`]: Client route table and guard outcomes

pub mod academic_years;
pub mod activity;
pub mod auth;
pub mod courses;
pub mod dashboard;
pub mod enrollments;
pub mod exams;
pub mod formations;
pub mod navigation;
pub mod profiles;
pub mod scholarships;
pub mod students;
pub mod teachers;
pub mod universities;

pub use mesrs_auth::Role;
pub use mesrs_core::Language;

pub use profiles::{Profile, PROFILE_COLUMNS};
