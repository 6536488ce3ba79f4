//! Client route table and the guard evaluated before each navigation.

use mesrs_auth::Role;
use mesrs_core::{Language, Msg};

use crate::modules::navigation::model::{MenuItem, MenuResponse, RouteAccess, RouteDecision};

pub const AUTH_PATH: &str = "/auth";
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";

const ADMIN_STAFF: &[Role] = &[Role::Admin, Role::Staff];
const ACADEMIC: &[Role] = &[Role::Admin, Role::Staff, Role::Teacher];
const SCHOLARSHIP_VIEWERS: &[Role] = &[Role::Admin, Role::Staff, Role::Student];

#[derive(Debug, Clone, Copy)]
pub struct ClientRoute {
    pub id: &'static str,
    pub path: &'static str,
    pub title: Msg,
    pub access: RouteAccess,
}

pub const ROUTES: [ClientRoute; 12] = [
    ClientRoute {
        id: "dashboard",
        path: "/",
        title: Msg::DashboardPage,
        access: RouteAccess::Authenticated,
    },
    ClientRoute {
        id: "universities",
        path: "/universites",
        title: Msg::UniversitiesPage,
        access: RouteAccess::Roles(ADMIN_STAFF),
    },
    ClientRoute {
        id: "students",
        path: "/etudiants",
        title: Msg::StudentsPage,
        access: RouteAccess::Roles(ACADEMIC),
    },
    ClientRoute {
        id: "teachers",
        path: "/enseignants",
        title: Msg::TeachersPage,
        access: RouteAccess::Roles(ADMIN_STAFF),
    },
    ClientRoute {
        id: "formations",
        path: "/formations",
        title: Msg::FormationsPage,
        access: RouteAccess::Roles(ACADEMIC),
    },
    ClientRoute {
        id: "enrollments",
        path: "/inscriptions",
        title: Msg::EnrollmentsPage,
        access: RouteAccess::Roles(ADMIN_STAFF),
    },
    ClientRoute {
        id: "exams",
        path: "/examens",
        title: Msg::ExamsPage,
        access: RouteAccess::Roles(ACADEMIC),
    },
    ClientRoute {
        id: "scholarships",
        path: "/bourses",
        title: Msg::ScholarshipsPage,
        access: RouteAccess::Roles(SCHOLARSHIP_VIEWERS),
    },
    ClientRoute {
        id: "statistics",
        path: "/statistiques",
        title: Msg::StatisticsPage,
        access: RouteAccess::Roles(ADMIN_STAFF),
    },
    ClientRoute {
        id: "settings",
        path: "/parametres",
        title: Msg::SettingsPage,
        access: RouteAccess::Authenticated,
    },
    ClientRoute {
        id: "auth",
        path: AUTH_PATH,
        title: Msg::AuthPage,
        access: RouteAccess::Public,
    },
    ClientRoute {
        id: "unauthorized",
        path: UNAUTHORIZED_PATH,
        title: Msg::UnauthorizedPage,
        access: RouteAccess::Public,
    },
];

/// Drops any query or fragment and trailing slashes; `""` becomes `/`.
pub fn normalize_path(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default().trim();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

pub fn find_route(path: &str) -> Option<&'static ClientRoute> {
    ROUTES.iter().find(|route| route.path == path)
}

/// Query string and fragment of a location, `?` or `#` included.
fn location_suffix(location: &str) -> &str {
    location
        .find(['?', '#'])
        .map_or("", |index| &location[index..])
}

/// Decides what happens when a caller with `role` (none when signed out)
/// navigates to `location`. Only the path selects the route; `from` keeps
/// the query and fragment so the client lands on the same view after login.
pub fn resolve_route(location: &str, role: Option<Role>) -> RouteDecision {
    let location = location.trim();
    let path = normalize_path(location);
    let Some(route) = find_route(&path) else {
        return RouteDecision::NotFound { path };
    };

    match (route.access, role) {
        (RouteAccess::Public, _) => RouteDecision::Allow { path },
        (_, None) => RouteDecision::RedirectToAuth {
            redirect_to: AUTH_PATH.to_string(),
            from: format!("{path}{}", location_suffix(location)),
        },
        (access, Some(role)) if access.allows(role) => RouteDecision::Allow { path },
        (_, Some(_)) => RouteDecision::RedirectToUnauthorized {
            redirect_to: UNAUTHORIZED_PATH.to_string(),
        },
    }
}

/// Sidebar entries the role may open, in table order, with localized labels.
pub fn menu(language: Language, role: Role) -> MenuResponse {
    let items = ROUTES
        .iter()
        .filter(|route| route.access != RouteAccess::Public && route.access.allows(role))
        .map(|route| MenuItem {
            id: route.id.to_string(),
            path: route.path.to_string(),
            label: route.title.text(language).to_string(),
        })
        .collect();

    MenuResponse {
        language,
        direction: if language.is_rtl() { "rtl" } else { "ltr" }.to_string(),
        ministry: Msg::Ministry.text(language).to_string(),
        country: Msg::Country.text(language).to_string(),
        items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_ignored() {
        assert_eq!(normalize_path("/etudiants/"), "/etudiants");
        assert_eq!(normalize_path("/etudiants///"), "/etudiants");
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("/bourses?page=2"), "/bourses");
    }

    #[test]
    fn signed_out_users_are_sent_to_auth_with_their_destination() {
        assert_eq!(
            resolve_route("/etudiants/", None),
            RouteDecision::RedirectToAuth {
                redirect_to: "/auth".into(),
                from: "/etudiants".into(),
            }
        );
    }

    #[test]
    fn redirect_keeps_query_and_fragment() {
        assert_eq!(
            resolve_route("/etudiants/?search=ould&page=2#liste", None),
            RouteDecision::RedirectToAuth {
                redirect_to: "/auth".into(),
                from: "/etudiants?search=ould&page=2#liste".into(),
            }
        );
        assert_eq!(
            resolve_route("/bourses#deadline", None),
            RouteDecision::RedirectToAuth {
                redirect_to: "/auth".into(),
                from: "/bourses#deadline".into(),
            }
        );
    }

    #[test]
    fn public_routes_are_always_allowed() {
        for path in ["/auth", "/unauthorized/"] {
            assert!(matches!(resolve_route(path, None), RouteDecision::Allow { .. }));
            assert!(matches!(
                resolve_route(path, Some(Role::Student)),
                RouteDecision::Allow { .. }
            ));
        }
    }

    #[test]
    fn roles_outside_the_allowed_set_are_refused() {
        assert!(matches!(
            resolve_route("/universites", Some(Role::Teacher)),
            RouteDecision::RedirectToUnauthorized { .. }
        ));
        assert!(matches!(
            resolve_route("/bourses", Some(Role::Student)),
            RouteDecision::Allow { .. }
        ));
        assert!(matches!(
            resolve_route("/bourses", Some(Role::Teacher)),
            RouteDecision::RedirectToUnauthorized { .. }
        ));
        assert!(matches!(
            resolve_route("/", Some(Role::Student)),
            RouteDecision::Allow { .. }
        ));
    }

    #[test]
    fn unknown_paths_are_not_found() {
        assert_eq!(
            resolve_route("/nowhere", Some(Role::Admin)),
            RouteDecision::NotFound {
                path: "/nowhere".into()
            }
        );
    }

    #[test]
    fn student_menu_is_localized_and_filtered() {
        let menu_fr = menu(Language::Fr, Role::Student);
        let ids: Vec<&str> = menu_fr.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["dashboard", "scholarships", "settings"]);
        assert_eq!(menu_fr.direction, "ltr");

        let menu_ar = menu(Language::Ar, Role::Student);
        assert_eq!(menu_ar.items[1].label, "المنح");
        assert_eq!(menu_ar.direction, "rtl");
    }

    #[test]
    fn admin_sees_every_protected_route() {
        assert_eq!(menu(Language::Fr, Role::Admin).items.len(), 10);
    }
}
