use axum::{
    Router,
    routing::{get, put},
};

use crate::modules::exams::controller::{
    create_exam, create_exam_result, delete_exam, delete_exam_result, get_exam, list_exam_results,
    list_exams, update_exam, update_exam_result,
};
use crate::state::AppState;

pub fn init_exams_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_exams).post(create_exam))
        .route("/{id}", get(get_exam).put(update_exam).delete(delete_exam))
        .route(
            "/{id}/results",
            get(list_exam_results).post(create_exam_result),
        )
}

pub fn init_exam_results_router() -> Router<AppState> {
    Router::new().route("/{id}", put(update_exam_result).delete(delete_exam_result))
}
