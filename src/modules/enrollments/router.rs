use axum::{
    Router,
    routing::{get, post},
};

use crate::modules::enrollments::controller::{
    activate_enrollment, complete_enrollment, create_enrollment, delete_enrollment,
    get_enrollment, list_enrollments, reject_enrollment, update_enrollment, validate_enrollment,
};
use crate::state::AppState;

pub fn init_enrollments_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_enrollments).post(create_enrollment))
        .route(
            "/{id}",
            get(get_enrollment)
                .put(update_enrollment)
                .delete(delete_enrollment),
        )
        .route("/{id}/validate", post(validate_enrollment))
        .route("/{id}/reject", post(reject_enrollment))
        .route("/{id}/activate", post(activate_enrollment))
        .route("/{id}/complete", post(complete_enrollment))
}
