use axum::{Router, routing::get};

use crate::modules::universities::controller::{
    create_university, delete_university, get_university, list_universities, update_university,
};
use crate::state::AppState;

pub fn init_universities_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_universities).post(create_university))
        .route(
            "/{id}",
            get(get_university)
                .put(update_university)
                .delete(delete_university),
        )
}
