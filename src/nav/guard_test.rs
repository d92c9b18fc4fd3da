use super::*;

use crate::services::session::SessionSnapshot;
use crate::state::test_helpers::{ADMIN_PIN, dummy_user, seeded_manager};

use super::super::routes::{ADMIN_DASHBOARD, USER_DASHBOARD};

fn loading() -> SessionSnapshot {
    SessionSnapshot { user: None, is_loading: true }
}

fn signed_out() -> SessionSnapshot {
    SessionSnapshot { user: None, is_loading: false }
}

fn signed_in(role: Role) -> SessionSnapshot {
    SessionSnapshot { user: Some(dummy_user("u-1", role)), is_loading: false }
}

// =============================================================================
// precedence
// =============================================================================

#[test]
fn loading_always_waits() {
    assert_eq!(evaluate(&loading(), None), Decision::Wait);
    assert_eq!(evaluate(&loading(), Some(Role::Admin)), Decision::Wait);

    // Even an authenticated session defers while loading.
    let mut snapshot = signed_in(Role::Admin);
    snapshot.is_loading = true;
    assert_eq!(evaluate(&snapshot, Some(Role::User)), Decision::Wait);
}

#[test]
fn signed_out_redirects_to_login() {
    assert_eq!(evaluate(&signed_out(), None), Decision::Redirect(LOGIN));
    assert_eq!(evaluate(&signed_out(), Some(Role::Admin)), Decision::Redirect(LOGIN));
}

#[test]
fn role_mismatch_redirects_to_the_actual_home() {
    let admin = signed_in(Role::Admin);
    assert_eq!(evaluate(&admin, Some(Role::User)), Decision::Redirect(ADMIN_DASHBOARD));

    let user = signed_in(Role::User);
    assert_eq!(evaluate(&user, Some(Role::Admin)), Decision::Redirect(USER_DASHBOARD));
}

#[test]
fn matching_role_is_allowed() {
    assert_eq!(evaluate(&signed_in(Role::Admin), Some(Role::Admin)), Decision::Allow);
    assert_eq!(evaluate(&signed_in(Role::User), Some(Role::User)), Decision::Allow);
}

#[test]
fn ungated_destinations_allow_any_session() {
    assert_eq!(evaluate(&signed_in(Role::User), None), Decision::Allow);
    assert_eq!(evaluate(&signed_in(Role::Admin), None), Decision::Allow);
}

// =============================================================================
// by path
// =============================================================================

#[test]
fn evaluate_path_reads_the_route_table() {
    let user = signed_in(Role::User);
    assert_eq!(evaluate_path(&user, USER_DASHBOARD), Decision::Allow);
    assert_eq!(evaluate_path(&user, ADMIN_DASHBOARD), Decision::Redirect(USER_DASHBOARD));
    assert_eq!(evaluate_path(&user, "/unknown"), Decision::Allow);
}

// =============================================================================
// scenarios
// =============================================================================

#[test]
fn fresh_process_with_an_empty_store_redirects_to_login() {
    let (manager, _store) = seeded_manager();
    manager.restore();
    let decision = evaluate_path(&manager.snapshot(), ADMIN_DASHBOARD);
    assert_eq!(decision, Decision::Redirect(LOGIN));
}

#[tokio::test]
async fn admin_on_a_user_route_lands_on_the_admin_dashboard() {
    let (manager, _store) = seeded_manager();
    manager.restore();
    manager.login(ADMIN_PIN).await.unwrap();
    let decision = evaluate_path(&manager.snapshot(), USER_DASHBOARD);
    assert_eq!(decision, Decision::Redirect(ADMIN_DASHBOARD));
}

#[test]
fn before_restore_the_guard_defers() {
    let (manager, _store) = seeded_manager();
    let decision = evaluate_path(&manager.snapshot(), USER_DASHBOARD);
    assert_eq!(decision, Decision::Wait);
}
