use axum::{Json, extract::Query};
use tracing::instrument;

use crate::middleware::auth::{AuthUser, OptionalAuthUser};
use crate::middleware::language::RequestLanguage;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::dashboard::model::LanguageQuery;
use crate::modules::navigation::model::{MenuResponse, ResolveQuery, RouteDecision};
use crate::modules::navigation::service;

/// Evaluates the client route guard for the caller.
///
/// The bearer token is optional: without one, protected paths resolve to a
/// redirect to the sign-in page.
#[utoipa::path(
    get,
    path = "/api/navigation/resolve",
    params(ResolveQuery),
    responses(
        (status = 200, description = "Guard decision", body = RouteDecision)
    ),
    tag = "Navigation"
)]
#[instrument(skip(auth_user))]
pub async fn resolve_route(
    OptionalAuthUser(auth_user): OptionalAuthUser,
    Query(query): Query<ResolveQuery>,
) -> Json<RouteDecision> {
    let role = auth_user.map(|user| user.role());
    Json(service::resolve_route(&query.path, role))
}

#[utoipa::path(
    get,
    path = "/api/navigation/menu",
    params(LanguageQuery),
    responses(
        (status = 200, description = "Sidebar entries for the caller's role", body = MenuResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Navigation"
)]
#[instrument(skip(auth_user))]
pub async fn get_menu(
    auth_user: AuthUser,
    RequestLanguage(lang): RequestLanguage,
) -> Json<MenuResponse> {
    Json(service::menu(lang, auth_user.role()))
}
