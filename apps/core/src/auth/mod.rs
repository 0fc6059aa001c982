/// Authentication collaborator boundary.
///
/// The real identity provider (Firebase in the original deployment) lives
/// behind the `AuthProvider` trait; the Session Manager never touches it
/// directly. `StubAuthProvider` is the local stand-in used when no backend
/// is wired — it accepts any credentials that survived validation and
/// synthesizes an identity, matching the original demo login.
use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::errors::AuthError;

/// Identity returned by the external collaborator.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub access_token: String,
}

/// Raw provider failure: an opaque code plus a message.
/// Codes follow the `auth/<reason>` convention of the original provider.
#[derive(Debug, Error)]
#[error("{code}: {message}")]
pub struct AuthProviderError {
    pub code: String,
    pub message: String,
}

impl AuthProviderError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<AuthProviderError> for AuthError {
    fn from(err: AuthProviderError) -> Self {
        match err.code.as_str() {
            "auth/invalid-credential" | "auth/wrong-password" => AuthError::InvalidCredentials,
            "auth/user-not-found" => AuthError::UserNotFound,
            "auth/email-already-in-use" => AuthError::EmailInUse,
            "auth/weak-password" => AuthError::WeakPassword,
            "auth/popup-closed-by-user" => AuthError::Cancelled,
            "auth/network-request-failed" => AuthError::Network(err.message),
            _ => AuthError::Provider {
                code: err.code,
                message: err.message,
            },
        }
    }
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in_with_email_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, AuthProviderError>;

    async fn create_user_with_email_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, AuthProviderError>;

    /// Federated (pop-up consent) flow, e.g. `"google"`.
    async fn sign_in_with_federated_provider(
        &self,
        provider: &str,
    ) -> Result<AuthUser, AuthProviderError>;
}

/// Local stub provider: accepts any validated credentials and synthesizes
/// the identity the way the original client did (name from the email local
/// part, `demo-token-<millis>` token).
#[derive(Default)]
pub struct StubAuthProvider;

impl StubAuthProvider {
    pub fn new() -> Self {
        Self
    }

    fn synthesize(email: &str) -> AuthUser {
        let local_part = email.split('@').next().unwrap_or(email);
        AuthUser {
            uid: Uuid::new_v4().to_string(),
            email: email.to_string(),
            display_name: Some(local_part.to_string()),
            photo_url: None,
            access_token: format!("demo-token-{}", Utc::now().timestamp_millis()),
        }
    }
}

#[async_trait]
impl AuthProvider for StubAuthProvider {
    async fn sign_in_with_email_password(
        &self,
        email: &str,
        _password: &str,
    ) -> Result<AuthUser, AuthProviderError> {
        Ok(Self::synthesize(email))
    }

    async fn create_user_with_email_password(
        &self,
        email: &str,
        _password: &str,
    ) -> Result<AuthUser, AuthProviderError> {
        Ok(Self::synthesize(email))
    }

    async fn sign_in_with_federated_provider(
        &self,
        _provider: &str,
    ) -> Result<AuthUser, AuthProviderError> {
        Err(AuthProviderError::new(
            "auth/operation-not-supported-in-this-environment",
            "Federated sign-in is not available with the local stub provider",
        ))
    }
}
