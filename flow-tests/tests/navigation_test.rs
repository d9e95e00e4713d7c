//! Session-driven navigation decisions, end to end: log in through the
//! mock service, then run the guard over real session snapshots.

use account_client::{authorize_route, AppRoute, GuardDecision};
use flow_tests::{harness, sign_in, user_json};

#[tokio::test]
async fn admin_login_changes_the_guest_landing() {
    let mut h = harness().await.expect("harness");
    sign_in(&mut h, &user_json("u-1", "Ada", "ada@example.com", "admin"))
        .await
        .expect("sign in");

    let snapshot = h.controller.session().current();
    assert_eq!(
        authorize_route(AppRoute::Auth, &snapshot),
        GuardDecision::RedirectTo(AppRoute::AdminDashboard)
    );
    assert_eq!(
        authorize_route(AppRoute::AdminDashboard, &snapshot),
        GuardDecision::Allow
    );
    assert_eq!(authorize_route(AppRoute::Home, &snapshot), GuardDecision::Allow);
}

#[tokio::test]
async fn plain_user_is_kept_out_of_the_admin_view() {
    let mut h = harness().await.expect("harness");
    sign_in(&mut h, &user_json("u-2", "Nel", "nel@example.com", "user"))
        .await
        .expect("sign in");

    let snapshot = h.controller.session().current();
    assert_eq!(
        authorize_route(AppRoute::AdminDashboard, &snapshot),
        GuardDecision::RedirectTo(AppRoute::Home)
    );
    assert_eq!(
        authorize_route(AppRoute::Auth, &snapshot),
        GuardDecision::RedirectTo(AppRoute::Home)
    );
}

#[tokio::test]
async fn logout_locks_every_protected_route_again() {
    let mut h = harness().await.expect("harness");
    sign_in(&mut h, &user_json("u-1", "Ada", "ada@example.com", "user"))
        .await
        .expect("sign in");
    h.controller.logout().expect("logout");

    let snapshot = h.controller.session().current();
    for route in AppRoute::ALL {
        if route.requirements().requires_auth {
            assert_eq!(
                authorize_route(route, &snapshot),
                GuardDecision::RedirectTo(AppRoute::Auth),
                "route {route:?} must redirect after logout"
            );
        }
    }
    assert_eq!(authorize_route(AppRoute::Auth, &snapshot), GuardDecision::Allow);
}
