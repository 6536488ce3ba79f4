use axum::{
    Router,
    routing::{get, post},
};

use crate::modules::academic_years::controller::{
    create_academic_year, delete_academic_year, get_academic_year, get_current_academic_year,
    list_academic_years, set_current_academic_year, update_academic_year,
};
use crate::state::AppState;

pub fn init_academic_years_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_academic_years).post(create_academic_year))
        .route("/current", get(get_current_academic_year))
        .route(
            "/{id}",
            get(get_academic_year)
                .put(update_academic_year)
                .delete(delete_academic_year),
        )
        .route("/{id}/set-current", post(set_current_academic_year))
}
