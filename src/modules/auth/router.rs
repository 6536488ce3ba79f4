use axum::{
    Router,
    routing::{get, post},
};

use crate::modules::auth::controller::{
    change_password, forgot_password, get_profile, get_role, get_session, refresh, reset_password,
    sign_in, sign_out, sign_up, update_profile,
};
use crate::state::AppState;

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(sign_up))
        .route("/signin", post(sign_in))
        .route("/refresh", post(refresh))
        .route("/signout", post(sign_out))
        .route("/me", get(get_session))
        .route("/role", get(get_role))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .route("/profile", get(get_profile).put(update_profile))
        .route("/change-password", post(change_password))
}
