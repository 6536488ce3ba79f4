use axum::{Router, routing::get};

use crate::modules::activity::controller::{list_activities, log_activity};
use crate::state::AppState;

pub fn init_activities_router() -> Router<AppState> {
    Router::new().route("/", get(list_activities).post(log_activity))
}
