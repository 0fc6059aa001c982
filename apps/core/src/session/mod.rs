/// Session Manager — owns authentication state.
///
/// All session mutations go through this type; the persisted keys
/// (`user`, `token`, `isAuthenticated`) and the in-memory `SessionState`
/// are only ever updated together, so no partial login can be observed.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::AuthProvider;
use crate::errors::AuthError;
use crate::store::{keys, KeyValueStore};

pub mod validation;

pub const DEMO_EMAIL: &str = "demo@medai.com";
pub const DEMO_PASSWORD: &str = "demo123";

/// Identity provider that produced the current user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Email,
    Google,
    Demo,
}

/// The current user, as persisted under the `user` key.
/// Serialized shape matches the original client (camelCase, ISO timestamps).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub email: String,
    #[serde(rename = "fullName", alias = "name")]
    pub full_name: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub provider: Provider,
    #[serde(rename = "profileImage", skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

/// Invariant: `is_authenticated` iff a user is present and the token is
/// non-empty. Only the two constructors below build this type.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub is_authenticated: bool,
    pub current_user: Option<UserIdentity>,
    pub token: String,
}

impl SessionState {
    pub fn unauthenticated() -> Self {
        Self {
            is_authenticated: false,
            current_user: None,
            token: String::new(),
        }
    }

    pub fn authenticated(user: UserIdentity, token: String) -> Self {
        debug_assert!(!token.is_empty());
        Self {
            is_authenticated: true,
            current_user: Some(user),
            token,
        }
    }
}

/// Observable lifecycle stage. `Authenticating` only exists while a
/// login/signup call is in flight; it is never persisted, so
/// `restore_session` can never yield it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStage {
    Unauthenticated,
    Authenticating,
    Authenticated,
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Signup form snapshot. Fields arrive as strings, exactly as typed;
/// validation parses what needs parsing.
#[derive(Debug, Clone)]
pub struct RegistrationData {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
    pub age: String,
    pub gender: String,
}

pub struct SessionManager {
    store: Arc<dyn KeyValueStore>,
    provider: Arc<dyn AuthProvider>,
    min_password_len: usize,
    state: Mutex<SessionState>,
    in_flight: AtomicBool,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        provider: Arc<dyn AuthProvider>,
        min_password_len: usize,
    ) -> Self {
        Self {
            store,
            provider,
            min_password_len,
            state: Mutex::new(SessionState::unauthenticated()),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.lock().unwrap().clone()
    }

    pub fn current_user(&self) -> Option<UserIdentity> {
        self.state.lock().unwrap().current_user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.lock().unwrap().is_authenticated
    }

    pub fn stage(&self) -> AuthStage {
        if self.in_flight.load(Ordering::SeqCst) {
            AuthStage::Authenticating
        } else if self.is_authenticated() {
            AuthStage::Authenticated
        } else {
            AuthStage::Unauthenticated
        }
    }

    /// History partition for the acting user: the current user id, or
    /// `anonymous` when no session exists.
    pub fn history_partition(&self) -> String {
        self.current_user()
            .map(|user| user.id)
            .unwrap_or_else(|| "anonymous".to_string())
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<UserIdentity, AuthError> {
        validation::validate_login(credentials, self.min_password_len)?;

        self.in_flight.store(true, Ordering::SeqCst);
        let outcome = self
            .provider
            .sign_in_with_email_password(&credentials.email, &credentials.password)
            .await;
        self.in_flight.store(false, Ordering::SeqCst);

        let auth_user = outcome.map_err(AuthError::from)?;
        let provider = if credentials.email == DEMO_EMAIL {
            Provider::Demo
        } else {
            Provider::Email
        };
        let user = UserIdentity {
            id: auth_user.uid,
            full_name: auth_user
                .display_name
                .unwrap_or_else(|| local_part(&auth_user.email)),
            email: auth_user.email,
            created_at: Utc::now(),
            provider,
            profile_image: auth_user.photo_url,
            phone: None,
            age: None,
            gender: None,
        };
        self.establish(user.clone(), auth_user.access_token);
        info!("Login successful for user {}", user.id);
        Ok(user)
    }

    pub async fn signup(&self, data: &RegistrationData) -> Result<UserIdentity, AuthError> {
        validation::validate_signup(data, self.min_password_len)?;

        self.in_flight.store(true, Ordering::SeqCst);
        let outcome = self
            .provider
            .create_user_with_email_password(&data.email, &data.password)
            .await;
        self.in_flight.store(false, Ordering::SeqCst);

        let auth_user = outcome.map_err(AuthError::from)?;
        let user = UserIdentity {
            id: auth_user.uid,
            email: data.email.clone(),
            full_name: data.full_name.clone(),
            created_at: Utc::now(),
            provider: Provider::Email,
            profile_image: None,
            phone: Some(data.phone.clone()),
            age: data.age.trim().parse().ok(),
            gender: Some(data.gender.clone()),
        };
        self.establish(user.clone(), auth_user.access_token);
        info!("Account created for user {}", user.id);
        Ok(user)
    }

    /// Federated (pop-up) sign-in. Cancellation is a normal outcome
    /// (`AuthError::Cancelled`), never a crash, and leaves state unchanged.
    pub async fn login_with_provider(&self, provider: &str) -> Result<UserIdentity, AuthError> {
        self.in_flight.store(true, Ordering::SeqCst);
        let outcome = self.provider.sign_in_with_federated_provider(provider).await;
        self.in_flight.store(false, Ordering::SeqCst);

        let auth_user = outcome.map_err(AuthError::from)?;
        let user = UserIdentity {
            id: auth_user.uid,
            full_name: auth_user
                .display_name
                .unwrap_or_else(|| "User".to_string()),
            email: auth_user.email,
            created_at: Utc::now(),
            provider: Provider::Google,
            profile_image: auth_user.photo_url,
            phone: None,
            age: None,
            gender: None,
        };
        self.establish(user.clone(), auth_user.access_token);
        info!("Federated login successful for user {}", user.id);
        Ok(user)
    }

    /// Direct login with the fixed demo credentials.
    pub async fn demo_login(&self) -> Result<UserIdentity, AuthError> {
        self.login(&Credentials {
            email: DEMO_EMAIL.to_string(),
            password: DEMO_PASSWORD.to_string(),
        })
        .await
    }

    /// Clears the persisted session keys and resets in-memory state.
    /// Idempotent: a second logout is a no-op.
    pub fn logout(&self) {
        self.store.remove(keys::USER);
        self.store.remove(keys::TOKEN);
        self.store.remove(keys::IS_AUTHENTICATED);
        let mut state = self.state.lock().unwrap();
        if state.is_authenticated {
            info!("Logged out user");
        }
        *state = SessionState::unauthenticated();
    }

    /// Reconstructs the session from the store at startup. Never contacts
    /// the collaborator and never fails: anything unparseable or
    /// inconsistent falls back to unauthenticated.
    pub fn restore_session(&self) -> SessionState {
        let flagged = self
            .store
            .get(keys::IS_AUTHENTICATED)
            .is_some_and(|v| v == "true");
        let token = self.store.get(keys::TOKEN).unwrap_or_default();
        let user = self.store.get(keys::USER).and_then(|raw| {
            serde_json::from_str::<UserIdentity>(&raw)
                .map_err(|e| warn!("Stored user failed to parse, treating as signed out: {e}"))
                .ok()
        });

        let restored = match user {
            Some(user) if flagged && !token.is_empty() => SessionState::authenticated(user, token),
            _ => SessionState::unauthenticated(),
        };
        *self.state.lock().unwrap() = restored.clone();
        restored
    }

    /// Writes the three session keys, then swaps in-memory state.
    fn establish(&self, user: UserIdentity, token: String) {
        match serde_json::to_string(&user) {
            Ok(json) => self.store.set(keys::USER, &json),
            Err(e) => warn!("Failed to serialize user for persistence: {e}"),
        }
        self.store.set(keys::TOKEN, &token);
        self.store.set(keys::IS_AUTHENTICATED, "true");
        *self.state.lock().unwrap() = SessionState::authenticated(user, token);
    }
}

fn local_part(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}
