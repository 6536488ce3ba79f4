use axum::{Router, routing::get};

use crate::modules::profiles::controller::{
    create_profile, delete_profile, get_profile, list_profiles, update_profile,
};
use crate::state::AppState;

pub fn init_profiles_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_profiles).post(create_profile))
        .route(
            "/{id}",
            get(get_profile).put(update_profile).delete(delete_profile),
        )
}
