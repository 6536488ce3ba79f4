pub use mesrs_models::exams::*;
