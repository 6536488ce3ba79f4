use axum::{Router, routing::get};

use crate::modules::navigation::controller::{get_menu, resolve_route};
use crate::state::AppState;

pub fn init_navigation_router() -> Router<AppState> {
    Router::new()
        .route("/menu", get(get_menu))
        .route("/resolve", get(resolve_route))
}
