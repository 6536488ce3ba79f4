//! # MESRS CLI
//!
//! Seeding utilities used by the `mesrs-cli` binary to fill a development
//! database with universities, formations, people and their workflows.
//!
//! ```ignore
//! use mesrs_cli::seeder::{seed_all, SeedConfig};
//!
//! let config = SeedConfig::new(5).with_students(30);
//! seed_all(&pool, config).await?;
//! ```

pub mod seeder;
