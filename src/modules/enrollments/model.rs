pub use mesrs_models::enrollments::*;
