//! HTTP channel to the remote account service.
//!
//! Every operation is a single JSON request/response exchange. The channel
//! is stateless: it never touches the session store, and operations that
//! act on behalf of an administrator take that identity as parameters.
//!
//! Envelope normalization: an empty success body is read as `{}`; a non-2xx
//! response is mined for a message (JSON `error`/`message` field, plain-text
//! body, then a status-derived fallback); a request that never reaches the
//! service becomes [`AccountError::Network`], which callers may retry.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::config::AccountServiceSettings;
use crate::error::AccountError;
use crate::models::{UserRecord, UserRole};

const MIN_PASSWORD_LEN: usize = 8;

/// Stateless client for the account service.
#[derive(Clone)]
pub struct AccountClient {
    client: Client,
    settings: AccountServiceSettings,
}

/// Outcome of a login exchange.
#[derive(Debug)]
pub enum LoginOutcome {
    /// Credentials accepted; persisting the session is the caller's job.
    Authenticated(UserRecord),
    /// The account exists but its email is unverified. The service
    /// short-circuits with the user id so the client can collect the
    /// pending OTP instead of surfacing an error.
    RequiresVerification {
        user_id: String,
        message: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LoginBody {
    RequiresVerification {
        #[serde(rename = "requiresVerification")]
        _requires_verification: bool,
        #[serde(rename = "userId")]
        user_id: String,
        #[serde(default)]
        message: Option<String>,
    },
    Authenticated {
        user: UserRecord,
    },
}

/// Result of starting a registration.
#[derive(Debug, Deserialize)]
pub struct RegistrationStarted {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "isNewUser", default)]
    pub is_new_user: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Result of starting a password reset.
#[derive(Debug, Deserialize)]
pub struct PasswordResetStarted {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Result of completing a password reset. Reports the account email so the
/// user can sign in again; it never carries credentials.
#[derive(Debug, Deserialize)]
pub struct PasswordResetCompleted {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Profile fields for write-through updates. Only fields that are `Some`
/// are sent.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Fields an administrator may rewrite on another account.
#[derive(Debug, Clone, Default)]
pub struct AdminUserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
}

/// Which profile change a courtesy notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Password,
    Email,
    Name,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Password => "password",
            NotificationKind::Email => "email",
            NotificationKind::Name => "name",
        }
    }
}

#[derive(Debug, Deserialize)]
struct UserEnvelope {
    user: UserRecord,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

impl AccountClient {
    pub fn new(settings: AccountServiceSettings) -> Result<Self, AccountError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()?;
        Ok(Self { client, settings })
    }

    pub fn base_url(&self) -> &str {
        &self.settings.url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.url, path)
    }

    /// Exchange credentials for a session-ready user record.
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<LoginOutcome, AccountError> {
        validate_email(email)?;
        let body = json!({
            "email": email,
            "passwordHash": password.expose_secret(),
        });
        let request = self.client.post(self.url("/api/users/login")).json(&body);
        let parsed: LoginBody = self.execute(request).await?;
        Ok(match parsed {
            LoginBody::RequiresVerification {
                user_id, message, ..
            } => LoginOutcome::RequiresVerification { user_id, message },
            LoginBody::Authenticated { user } => LoginOutcome::Authenticated(user),
        })
    }

    /// Step 1 of registration: have the service email an OTP.
    pub async fn initiate_register(
        &self,
        email: &str,
        name: Option<&str>,
    ) -> Result<RegistrationStarted, AccountError> {
        validate_email(email)?;
        let body = json!({
            "email": email,
            "name": name.unwrap_or_default(),
        });
        let request = self
            .client
            .post(self.url("/api/users/register"))
            .json(&body);
        self.execute(request).await
    }

    /// Step 2 of registration: redeem the OTP and set credentials.
    pub async fn verify_register(
        &self,
        user_id: &str,
        otp: &str,
        password: &SecretString,
        name: &str,
    ) -> Result<UserRecord, AccountError> {
        validate_password(password)?;
        let body = json!({
            "userId": user_id,
            "otp": otp,
            "password": password.expose_secret(),
            "name": name,
        });
        let request = self
            .client
            .post(self.url("/api/users/verify-register"))
            .json(&body);
        let parsed: UserEnvelope = self.execute(request).await?;
        Ok(parsed.user)
    }

    /// Ask for a fresh OTP for a pending verification.
    pub async fn resend_otp(&self, user_id: &str) -> Result<Option<String>, AccountError> {
        let body = json!({ "userId": user_id });
        let request = self
            .client
            .post(self.url("/api/users/resend-otp"))
            .json(&body);
        let parsed: MessageBody = self.execute(request).await?;
        Ok(parsed.message)
    }

    /// Redeem an email-verification OTP for an existing account.
    pub async fn verify_email(&self, user_id: &str, otp: &str) -> Result<UserRecord, AccountError> {
        let body = json!({ "userId": user_id, "otp": otp });
        let request = self
            .client
            .post(self.url("/api/users/verify-email"))
            .json(&body);
        let parsed: UserEnvelope = self.execute(request).await?;
        Ok(parsed.user)
    }

    /// Start a password reset for the account behind `email`.
    pub async fn forgot_password(&self, email: &str) -> Result<PasswordResetStarted, AccountError> {
        validate_email(email)?;
        let body = json!({ "email": email });
        let request = self
            .client
            .post(self.url("/api/users/forgot-password"))
            .json(&body);
        self.execute(request).await
    }

    /// Redeem a reset OTP and set the new password.
    pub async fn reset_password(
        &self,
        user_id: &str,
        otp: &str,
        new_password: &SecretString,
    ) -> Result<PasswordResetCompleted, AccountError> {
        validate_password(new_password)?;
        let body = json!({
            "userId": user_id,
            "otp": otp,
            "newPassword": new_password.expose_secret(),
        });
        let request = self
            .client
            .post(self.url("/api/users/reset-password"))
            .json(&body);
        self.execute(request).await
    }

    /// Change a signed-in user's password; the current password authorizes
    /// the change.
    pub async fn change_password(
        &self,
        user_id: &str,
        current_password: &SecretString,
        new_password: &SecretString,
    ) -> Result<Option<String>, AccountError> {
        validate_password(new_password)?;
        let body = json!({
            "currentPassword": current_password.expose_secret(),
            "newPassword": new_password.expose_secret(),
        });
        let request = self
            .client
            .patch(self.url(&format!("/api/users/{user_id}/password")))
            .json(&body);
        let parsed: MessageBody = self.execute(request).await?;
        Ok(parsed.message)
    }

    /// Send an OTP to the address the user wants to move to.
    pub async fn initiate_email_change(
        &self,
        user_id: &str,
        new_email: &str,
    ) -> Result<Option<String>, AccountError> {
        validate_email(new_email)?;
        let body = json!({ "userId": user_id, "newEmail": new_email });
        let request = self
            .client
            .post(self.url("/api/users/initiate-email-change"))
            .json(&body);
        let parsed: MessageBody = self.execute(request).await?;
        Ok(parsed.message)
    }

    /// Redeem an email-change OTP.
    pub async fn verify_email_change(
        &self,
        user_id: &str,
        otp: &str,
        new_email: &str,
    ) -> Result<Option<String>, AccountError> {
        let body = json!({ "userId": user_id, "otp": otp, "newEmail": new_email });
        let request = self
            .client
            .post(self.url("/api/users/verify-email-change"))
            .json(&body);
        let parsed: MessageBody = self.execute(request).await?;
        Ok(parsed.message)
    }

    /// Rewrite profile fields; the response is the updated user record.
    pub async fn update_profile(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<UserRecord, AccountError> {
        if let Some(email) = &update.email {
            validate_email(email)?;
        }
        let mut body = serde_json::Map::new();
        if let Some(name) = &update.name {
            body.insert("name".to_string(), json!(name));
        }
        if let Some(email) = &update.email {
            body.insert("email".to_string(), json!(email));
        }
        let request = self
            .client
            .put(self.url(&format!("/api/users/{user_id}")))
            .json(&Value::Object(body));
        self.execute(request).await
    }

    /// Courtesy notification to the account email after a profile change.
    pub async fn send_profile_notification(
        &self,
        kind: NotificationKind,
        email: &str,
        name: &str,
    ) -> Result<Option<String>, AccountError> {
        let body = json!({
            "type": kind.as_str(),
            "email": email,
            "name": name,
        });
        let request = self
            .client
            .post(self.url("/api/users/send-notification"))
            .json(&body);
        let parsed: MessageBody = self.execute(request).await?;
        Ok(parsed.message)
    }

    /// All user accounts; admin only.
    pub async fn list_users(&self) -> Result<Vec<UserRecord>, AccountError> {
        let request = self.client.get(self.url("/api/users"));
        self.execute(request).await
    }

    /// One user account by id; admin only.
    pub async fn get_user(&self, user_id: &str) -> Result<UserRecord, AccountError> {
        let request = self.client.get(self.url(&format!("/api/users/{user_id}")));
        self.execute(request).await
    }

    /// Keyword search over user accounts; admin only.
    pub async fn search_users(&self, keyword: &str) -> Result<Vec<UserRecord>, AccountError> {
        let request = self
            .client
            .get(self.url("/api/users/search"))
            .query(&[("keyword", keyword)]);
        self.execute(request).await
    }

    /// Per-user content statistics; the shape belongs to the service.
    pub async fn user_stats(&self, user_id: &str) -> Result<Value, AccountError> {
        let request = self
            .client
            .get(self.url(&format!("/api/users/{user_id}/stats")));
        self.execute(request).await
    }

    /// Cascade-delete an account and its notes/tags. The acting admin is
    /// named explicitly; the channel never reads it from ambient state.
    pub async fn delete_user(
        &self,
        user_id: &str,
        admin_id: &str,
        admin_name: &str,
    ) -> Result<Option<String>, AccountError> {
        let request = self
            .client
            .delete(self.url(&format!("/api/users/{user_id}")))
            .query(&[
                ("cascade", "true"),
                ("adminId", admin_id),
                ("adminName", admin_name),
            ]);
        let parsed: MessageBody = self.execute(request).await?;
        Ok(parsed.message)
    }

    /// Rewrite another account's fields on behalf of the named admin.
    pub async fn update_user_admin(
        &self,
        user_id: &str,
        update: &AdminUserUpdate,
        admin_name: &str,
    ) -> Result<UserRecord, AccountError> {
        if let Some(email) = &update.email {
            validate_email(email)?;
        }
        let mut body = serde_json::Map::new();
        if let Some(name) = &update.name {
            body.insert("name".to_string(), json!(name));
        }
        if let Some(email) = &update.email {
            body.insert("email".to_string(), json!(email));
        }
        if let Some(role) = update.role {
            body.insert("role".to_string(), json!(role.as_str()));
        }
        let request = self
            .client
            .put(self.url(&format!("/api/users/{user_id}")))
            .query(&[("adminName", admin_name)])
            .json(&Value::Object(body));
        self.execute(request).await
    }

    /// Issue a request and normalize the response envelope.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, AccountError> {
        let response = request.send().await.map_err(|err| {
            tracing::error!(error = %err, "account service unreachable");
            AccountError::Network(err)
        })?;

        let status = response.status();
        let body = response.text().await.map_err(AccountError::Network)?;

        if status.is_success() {
            let raw = if body.trim().is_empty() {
                "{}"
            } else {
                body.as_str()
            };
            serde_json::from_str(raw).map_err(|err| {
                tracing::error!(status = %status, error = %err, "unexpected body from account service");
                AccountError::InvalidResponse(err)
            })
        } else {
            let message = extract_error_message(status, &body);
            tracing::warn!(status = %status, message = %message, "account service rejected request");
            Err(AccountError::Application {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[derive(Debug, Validate)]
struct EmailInput {
    #[validate(email(message = "invalid email address"))]
    email: String,
}

fn validate_email(email: &str) -> Result<(), AccountError> {
    EmailInput {
        email: email.to_string(),
    }
    .validate()
    .map_err(|err| AccountError::Validation(err.to_string()))
}

fn validate_password(password: &SecretString) -> Result<(), AccountError> {
    if password.expose_secret().chars().count() < MIN_PASSWORD_LEN {
        return Err(AccountError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

fn extract_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(message) = parsed.error.or(parsed.message) {
            return message;
        }
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() && !trimmed.starts_with('{') {
        return trimmed.to_string();
    }
    format!("account service returned status {}", status.as_u16())
}
