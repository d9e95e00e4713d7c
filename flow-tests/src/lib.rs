//! Cross-flow integration tests for the account client.
//!
//! Stands up a wiremock double of the remote account service and drives
//! complete verification flows through a real controller. Each test gets
//! its own mock server and session store, so tests are independent and
//! need no running services.

use account_client::config::AccountServiceSettings;
use account_client::{AccountClient, AccountController, SessionStore};
use anyhow::{Context, Result};
use secrecy::SecretString;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A controller wired to a fresh mock account service.
pub struct FlowHarness {
    pub server: MockServer,
    pub controller: AccountController,
}

/// Harness with an in-memory session store.
pub async fn harness() -> Result<FlowHarness> {
    let server = MockServer::start().await;
    let controller = controller_for(&server, SessionStore::in_memory())?;
    Ok(FlowHarness { server, controller })
}

/// Build a controller against `server` with the given store. Lets tests
/// exercise durable stores by reopening the same file.
pub fn controller_for(server: &MockServer, session: SessionStore) -> Result<AccountController> {
    let channel = AccountClient::new(AccountServiceSettings {
        url: server.uri(),
        timeout_ms: 2_000,
    })
    .context("failed to build account channel")?;
    Ok(AccountController::new(channel, session))
}

pub fn secret(value: &str) -> SecretString {
    SecretString::new(value.to_string())
}

/// Service-side user record body.
pub fn user_json(id: &str, name: &str, email: &str, role: &str) -> Value {
    json!({ "_id": id, "name": name, "email": email, "role": role })
}

/// Fresh service-style user id, unique per test run.
pub fn fresh_user_id() -> String {
    format!("u-{}", uuid::Uuid::new_v4())
}

/// Mount a login mock: `email` + any password answers `body`.
pub async fn mount_login(server: &MockServer, email: &str, body: Value) {
    Mock::given(method("POST"))
        .and(path("/api/users/login"))
        .and(body_partial_json(json!({ "email": email })))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mount an OTP gate on `route`: the given OTP answers `success` with 200,
/// any other code is rejected with 400. Mount order matters — wiremock
/// picks the first matching mock.
pub async fn mount_otp_gate(server: &MockServer, route: &str, otp: &str, success: Value) {
    Mock::given(method("POST"))
        .and(path(route))
        .and(body_partial_json(json!({ "otp": otp })))
        .respond_with(ResponseTemplate::new(200).set_body_json(success))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "error": "Invalid or expired OTP" })),
        )
        .mount(server)
        .await;
}

/// Convenience: sign the harness's controller in as the given user.
pub async fn sign_in(h: &mut FlowHarness, user: &Value) -> Result<()> {
    let email = user["email"].as_str().unwrap_or_default().to_string();
    mount_login(&h.server, &email, json!({ "user": user })).await;
    h.controller
        .login(&email, &secret("correct horse battery"))
        .await
        .context("login through mock service failed")?;
    Ok(())
}
