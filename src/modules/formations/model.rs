pub use mesrs_models::formations::*;
