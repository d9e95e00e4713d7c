//! OTP-gated email change: only the email field of the session moves.

use account_client::AccountError;
use flow_tests::{harness, mount_otp_gate, sign_in, user_json};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn verification_patches_only_the_email_field() {
    let mut h = harness().await.expect("harness");
    sign_in(&mut h, &user_json("u-1", "Ada", "old@example.com", "user"))
        .await
        .expect("sign in");
    Mock::given(method("POST"))
        .and(path("/api/users/initiate-email-change"))
        .and(body_partial_json(json!({ "newEmail": "new@example.com" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "message": "Code sent to new address" })),
        )
        .mount(&h.server)
        .await;
    mount_otp_gate(
        &h.server,
        "/api/users/verify-email-change",
        "616161",
        json!({ "message": "Email updated" }),
    )
    .await;

    let before = h.controller.session().current();

    h.controller
        .begin_email_change("new@example.com")
        .await
        .expect("initiate should succeed");
    assert_eq!(
        h.controller
            .email_change_state()
            .pending()
            .and_then(|t| t.target_email.as_deref()),
        Some("new@example.com")
    );

    h.controller
        .complete_email_change("616161")
        .await
        .expect("verification should succeed");

    let after = h.controller.session().current();
    assert_eq!(after.email, "new@example.com");
    // Everything that is not the email is byte-identical.
    assert_eq!(after.user_id, before.user_id);
    assert_eq!(after.name, before.name);
    assert_eq!(after.role, before.role);
    assert_eq!(after.authenticated, before.authenticated);
}

#[tokio::test]
async fn wrong_otp_keeps_the_old_email() {
    let mut h = harness().await.expect("harness");
    sign_in(&mut h, &user_json("u-1", "Ada", "old@example.com", "user"))
        .await
        .expect("sign in");
    Mock::given(method("POST"))
        .and(path("/api/users/initiate-email-change"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "Code sent" })))
        .mount(&h.server)
        .await;
    mount_otp_gate(
        &h.server,
        "/api/users/verify-email-change",
        "616161",
        json!({ "message": "Email updated" }),
    )
    .await;

    h.controller
        .begin_email_change("new@example.com")
        .await
        .expect("initiate");
    let err = h.controller.complete_email_change("121212").await.unwrap_err();
    assert!(matches!(err, AccountError::Application { .. }));
    assert_eq!(h.controller.session().current().email, "old@example.com");
}

#[tokio::test]
async fn begin_requires_a_session() {
    let mut h = harness().await.expect("harness");
    let err = h
        .controller
        .begin_email_change("new@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, AccountError::Validation(_)));
}
