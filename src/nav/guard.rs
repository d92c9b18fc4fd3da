//! Access guard — per-navigation authorization decision.
//!
//! A total function over `{loading, authenticated, role} × required role`;
//! the three outcomes below are the only ones that exist.

use crate::services::session::{Role, SessionSnapshot};

use super::resolver::landing_route;
use super::routes::{self, LOGIN};

/// Outcome of a navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Session still resolving; render a neutral waiting indicator.
    Wait,
    /// Send the caller elsewhere, discarding the original destination.
    Redirect(&'static str),
    /// Render the destination.
    Allow,
}

/// Decide a navigation attempt against the current session state.
///
/// Precedence: loading defers, missing authentication redirects to login,
/// a role mismatch redirects to the session's own landing route (never an
/// error page), anything else renders. The role comparison never runs
/// without an authenticated user.
#[must_use]
pub fn evaluate(snapshot: &SessionSnapshot, required: Option<Role>) -> Decision {
    if snapshot.is_loading {
        return Decision::Wait;
    }
    let Some(user) = snapshot.user.as_ref() else {
        return Decision::Redirect(LOGIN);
    };
    if let Some(required) = required {
        if user.role != required {
            return Decision::Redirect(landing_route(user.role));
        }
    }
    Decision::Allow
}

/// Decide by path, using the route table's role annotations.
#[must_use]
pub fn evaluate_path(snapshot: &SessionSnapshot, path: &str) -> Decision {
    evaluate(snapshot, routes::required_role(path))
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
