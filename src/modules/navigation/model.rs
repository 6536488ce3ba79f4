pub use mesrs_models::navigation::*;
