//! Route surface consumed by the guard and the navigation bar.

use crate::services::session::Role;

use super::resolver::landing_route;

pub const ROOT: &str = "/";
pub const LOGIN: &str = "/login";
pub const USER_DASHBOARD: &str = "/user-dashboard";
pub const ADMIN_DASHBOARD: &str = "/admin-dashboard";

/// A navigable destination and the role it requires, if any.
#[derive(Debug, Clone, Copy)]
pub struct RouteSpec {
    pub path: &'static str,
    pub required_role: Option<Role>,
}

/// The app's destinations. Only the dashboards are role-gated.
pub const ROUTES: &[RouteSpec] = &[
    RouteSpec { path: LOGIN, required_role: None },
    RouteSpec { path: USER_DASHBOARD, required_role: Some(Role::User) },
    RouteSpec { path: ADMIN_DASHBOARD, required_role: Some(Role::Admin) },
];

/// Role annotation for a path; unknown paths carry no requirement.
#[must_use]
pub fn required_role(path: &str) -> Option<Role> {
    ROUTES
        .iter()
        .find(|route| route.path == path)
        .and_then(|route| route.required_role)
}

/// One entry in the bottom navigation bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavLink {
    pub label: &'static str,
    pub target: &'static str,
}

/// The tab strip; every tab lands on the role's own dashboard.
#[must_use]
pub fn nav_links(role: Role) -> [NavLink; 4] {
    let home = landing_route(role);
    [
        NavLink { label: "Home", target: home },
        NavLink { label: "Grades", target: home },
        NavLink { label: "Profile", target: home },
        NavLink { label: "Settings", target: home },
    ]
}

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;
