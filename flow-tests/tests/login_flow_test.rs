//! Login outcomes: success, bad credentials, and the deferred
//! verification path for unverified accounts.

use account_client::{AccountError, LoginOutcome, SessionStore};
use flow_tests::{
    controller_for, harness, mount_login, mount_otp_gate, secret, sign_in, user_json,
};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn successful_login_writes_the_session() {
    let mut h = harness().await.expect("harness");
    mount_login(
        &h.server,
        "ada@example.com",
        json!({ "user": user_json("u-1", "Ada", "ada@example.com", "user") }),
    )
    .await;

    let outcome = h
        .controller
        .login("ada@example.com", &secret("correct horse"))
        .await
        .expect("login should succeed");

    assert!(matches!(outcome, LoginOutcome::Authenticated(_)));
    assert!(h.controller.session().is_authenticated());
    assert_eq!(
        h.controller.session().current_user_id().as_deref(),
        Some("u-1")
    );
}

#[tokio::test]
async fn bad_credentials_change_no_state() {
    let mut h = harness().await.expect("harness");
    Mock::given(method("POST"))
        .and(path("/api/users/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "error": "Invalid email or password" })),
        )
        .mount(&h.server)
        .await;

    let err = h
        .controller
        .login("ada@example.com", &secret("wrong password"))
        .await
        .unwrap_err();

    match err {
        AccountError::Application { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid email or password");
        }
        other => panic!("expected application error, got {other:?}"),
    }
    assert!(!h.controller.session().is_authenticated());
    assert!(h.controller.registration_state().pending().is_none());
}

#[tokio::test]
async fn unverified_account_stays_signed_out_until_otp_confirmed() {
    let mut h = harness().await.expect("harness");
    mount_login(
        &h.server,
        "new@example.com",
        json!({
            "requiresVerification": true,
            "userId": "u-5",
            "message": "Please verify your email first"
        }),
    )
    .await;
    mount_otp_gate(
        &h.server,
        "/api/users/verify-email",
        "717171",
        json!({ "user": user_json("u-5", "Nel", "new@example.com", "user") }),
    )
    .await;

    let outcome = h
        .controller
        .login("new@example.com", &secret("correct horse"))
        .await
        .expect("login should parse");
    match outcome {
        LoginOutcome::RequiresVerification { user_id, .. } => assert_eq!(user_id, "u-5"),
        other => panic!("expected verification outcome, got {other:?}"),
    }
    // The deferred login must not have written an authenticated session.
    assert!(!h.controller.session().is_authenticated());
    assert_eq!(
        h.controller
            .registration_state()
            .pending()
            .map(|t| t.user_id.as_str()),
        Some("u-5")
    );

    let err = h.controller.confirm_email("000000").await.unwrap_err();
    assert!(matches!(err, AccountError::Application { .. }));
    assert!(!h.controller.session().is_authenticated());

    let user = h
        .controller
        .confirm_email("717171")
        .await
        .expect("confirmation should succeed");
    assert_eq!(user.id, "u-5");
    assert!(h.controller.session().is_authenticated());
    assert_eq!(
        h.controller.session().current_user_id().as_deref(),
        Some("u-5")
    );
}

#[tokio::test]
async fn logout_clears_session_and_abandons_flows() {
    let mut h = harness().await.expect("harness");
    sign_in(&mut h, &user_json("u-1", "Ada", "ada@example.com", "user"))
        .await
        .expect("sign in");
    assert!(h.controller.session().is_authenticated());

    h.controller.logout().expect("logout");

    assert!(!h.controller.session().is_authenticated());
    assert_eq!(h.controller.session().current_user_id(), None);
    assert!(h.controller.registration_state().pending().is_none());
    assert!(h.controller.password_reset_state().pending().is_none());
    assert!(h.controller.email_change_state().pending().is_none());
}

#[tokio::test]
async fn session_survives_a_process_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let session_path = dir.path().join("session.json");

    let mut h = harness().await.expect("harness");
    let controller = controller_for(
        &h.server,
        SessionStore::open(&session_path).expect("open store"),
    )
    .expect("controller");
    h.controller = controller;

    sign_in(&mut h, &user_json("u-1", "Ada", "ada@example.com", "admin"))
        .await
        .expect("sign in");
    drop(h);

    // A new process opens the same file: still signed in, same identity.
    let store = SessionStore::open(&session_path).expect("reopen store");
    assert!(store.is_authenticated());
    assert_eq!(store.current_user_id().as_deref(), Some("u-1"));
    assert!(store.current().is_admin());
}
