//! Client route table types and guard outcomes.

use mesrs_auth::Role;
use mesrs_core::Language;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Who may open a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    /// Open to everyone, signed in or not
    Public,
    /// Any signed-in user
    Authenticated,
    /// Signed-in users holding one of these roles
    Roles(&'static [Role]),
}

impl RouteAccess {
    pub fn allows(self, role: Role) -> bool {
        match self {
            RouteAccess::Public | RouteAccess::Authenticated => true,
            RouteAccess::Roles(roles) => roles.contains(&role),
        }
    }
}

/// Result of evaluating a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RouteDecision {
    Allow { path: String },
    /// Not signed in; `from` is where to go back after login
    RedirectToAuth { redirect_to: String, from: String },
    RedirectToUnauthorized { redirect_to: String },
    NotFound { path: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MenuItem {
    pub id: String,
    pub path: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MenuResponse {
    pub language: Language,
    /// `rtl` for Arabic
    pub direction: String,
    pub ministry: String,
    pub country: String,
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ResolveQuery {
    /// Client path, e.g. `/universites`
    pub path: String,
}
