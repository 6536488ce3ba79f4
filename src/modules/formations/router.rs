use axum::{Router, routing::get};

use crate::modules::formations::controller::{
    create_formation, delete_formation, get_formation, list_formations, update_formation,
};
use crate::state::AppState;

pub fn init_formations_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_formations).post(create_formation))
        .route(
            "/{id}",
            get(get_formation)
                .put(update_formation)
                .delete(delete_formation),
        )
}
