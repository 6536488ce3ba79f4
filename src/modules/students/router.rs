use axum::{Router, routing::get};

use crate::modules::students::controller::{
    create_student, delete_student, get_my_student, get_student, list_students, update_student,
};
use crate::state::AppState;

pub fn init_students_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_students).post(create_student))
        .route("/me", get(get_my_student))
        .route(
            "/{id}",
            get(get_student).put(update_student).delete(delete_student),
        )
}
