pub use mesrs_models::teachers::*;
