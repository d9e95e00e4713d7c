//! Forgot-password reset and signed-in password change.

use account_client::{AccountError, SessionRecord};
use flow_tests::{harness, mount_otp_gate, secret, sign_in, user_json};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn completed_reset_never_authenticates() {
    let mut h = harness().await.expect("harness");
    Mock::given(method("POST"))
        .and(path("/api/users/forgot-password"))
        .and(body_partial_json(json!({ "email": "ada@example.com" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "userId": "u-3",
            "message": "Reset code sent"
        })))
        .mount(&h.server)
        .await;
    mount_otp_gate(
        &h.server,
        "/api/users/reset-password",
        "515151",
        json!({ "message": "Password updated", "email": "ada@example.com" }),
    )
    .await;

    let started = h
        .controller
        .begin_password_reset("ada@example.com")
        .await
        .expect("initiate should succeed");
    assert_eq!(started.user_id, "u-3");

    let completed = h
        .controller
        .complete_password_reset("515151", &secret("brand new password"))
        .await
        .expect("reset should succeed");
    assert_eq!(completed.email.as_deref(), Some("ada@example.com"));

    // Resetting a password proves mailbox ownership, not identity for this
    // device: the session must be exactly as signed out as before.
    assert_eq!(h.controller.session().current(), SessionRecord::unauthenticated());
    assert_eq!(h.controller.session().current_user_id(), None);
}

#[tokio::test]
async fn wrong_otp_leaves_the_reset_pending() {
    let mut h = harness().await.expect("harness");
    Mock::given(method("POST"))
        .and(path("/api/users/forgot-password"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "userId": "u-3", "message": "Reset code sent" })),
        )
        .mount(&h.server)
        .await;
    mount_otp_gate(
        &h.server,
        "/api/users/reset-password",
        "515151",
        json!({ "message": "Password updated", "email": "ada@example.com" }),
    )
    .await;

    h.controller
        .begin_password_reset("ada@example.com")
        .await
        .expect("initiate");

    let err = h
        .controller
        .complete_password_reset("999999", &secret("brand new password"))
        .await
        .unwrap_err();
    assert!(matches!(err, AccountError::Application { .. }));
    assert_eq!(
        h.controller
            .password_reset_state()
            .pending()
            .map(|t| t.user_id.as_str()),
        Some("u-3")
    );
}

#[tokio::test]
async fn reset_completion_without_initiate_fails() {
    let mut h = harness().await.expect("harness");
    let err = h
        .controller
        .complete_password_reset("515151", &secret("brand new password"))
        .await
        .unwrap_err();
    assert!(matches!(err, AccountError::Validation(_)));
}

#[tokio::test]
async fn change_password_requires_a_session() {
    let mut h = harness().await.expect("harness");
    let err = h
        .controller
        .change_password(&secret("old password one"), &secret("new password one"))
        .await
        .unwrap_err();
    assert!(matches!(err, AccountError::Validation(_)));

    sign_in(&mut h, &user_json("u-1", "Ada", "ada@example.com", "user"))
        .await
        .expect("sign in");
    Mock::given(method("PATCH"))
        .and(path("/api/users/u-1/password"))
        .and(body_partial_json(json!({ "currentPassword": "old password one" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "message": "Password changed" })),
        )
        .mount(&h.server)
        .await;

    let message = h
        .controller
        .change_password(&secret("old password one"), &secret("new password one"))
        .await
        .expect("change should succeed");
    assert_eq!(message.as_deref(), Some("Password changed"));
    // Still the same session afterward.
    assert_eq!(
        h.controller.session().current_user_id().as_deref(),
        Some("u-1")
    );
}
