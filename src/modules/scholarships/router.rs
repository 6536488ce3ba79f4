use axum::{
    Router,
    routing::{get, post},
};

use crate::modules::scholarships::controller::{
    create_application, create_scholarship, decide_application, delete_scholarship,
    get_application, get_scholarship, list_applications, list_scholarships, update_scholarship,
};
use crate::state::AppState;

pub fn init_scholarships_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_scholarships).post(create_scholarship))
        .route(
            "/{id}",
            get(get_scholarship)
                .put(update_scholarship)
                .delete(delete_scholarship),
        )
}

pub fn init_applications_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_applications).post(create_application))
        .route("/{id}", get(get_application))
        .route("/{id}/decision", post(decide_application))
}
