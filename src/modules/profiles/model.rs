pub use mesrs_models::profiles::*;
