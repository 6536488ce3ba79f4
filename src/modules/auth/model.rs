pub use mesrs_models::auth::*;
pub use mesrs_models::profiles::{Profile, UpdateProfileDto};
