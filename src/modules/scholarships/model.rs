pub use mesrs_models::scholarships::*;
