pub use mesrs_models::courses::*;
