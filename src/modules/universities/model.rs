pub use mesrs_models::universities::*;
