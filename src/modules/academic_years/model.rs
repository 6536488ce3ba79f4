pub use mesrs_models::academic_years::*;
