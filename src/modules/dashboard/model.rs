pub use mesrs_models::dashboard::*;
