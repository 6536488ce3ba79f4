//! Activity log models, re-exported from `mesrs-models`.

pub use mesrs_models::activity::*;
