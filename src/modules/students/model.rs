pub use mesrs_models::students::*;
