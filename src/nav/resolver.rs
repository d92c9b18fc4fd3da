//! Landing-route resolution and root dispatch.

use crate::services::session::{Role, SessionSnapshot};

use super::guard::Decision;
use super::routes::{ADMIN_DASHBOARD, LOGIN, USER_DASHBOARD};

/// Canonical post-authentication destination for a role.
#[must_use]
pub fn landing_route(role: Role) -> &'static str {
    match role {
        Role::Admin => ADMIN_DASHBOARD,
        Role::User => USER_DASHBOARD,
    }
}

/// Root is a transient dispatch, not a page: it forwards straight to the
/// login entry or to the session's landing route. Also used as the
/// post-login redirect.
#[must_use]
pub fn dispatch_root(snapshot: &SessionSnapshot) -> Decision {
    if snapshot.is_loading {
        return Decision::Wait;
    }
    match snapshot.user.as_ref() {
        Some(user) => Decision::Redirect(landing_route(user.role)),
        None => Decision::Redirect(LOGIN),
    }
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;
