use thiserror::Error;

/// Authentication error taxonomy.
/// Every failure crossing the Session Manager boundary is one of these —
/// no raw provider error reaches the view layer.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Email already in use")]
    EmailInUse,

    #[error("Password is too weak")]
    WeakPassword,

    #[error("Sign-in cancelled by the user")]
    Cancelled,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider error ({code}): {message}")]
    Provider { code: String, message: String },
}

impl AuthError {
    /// User-facing message for transient notifications.
    /// Unknown provider codes fall back to a generic message.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Validation(reason) => reason.clone(),
            AuthError::InvalidCredentials => "Invalid email or password".to_string(),
            AuthError::UserNotFound => "No account found for this email".to_string(),
            AuthError::EmailInUse => "Email already in use".to_string(),
            AuthError::WeakPassword => "Password is too weak".to_string(),
            AuthError::Cancelled => "Sign-in cancelled. Please try again.".to_string(),
            AuthError::Network(_) => "Network error. Please check your connection.".to_string(),
            AuthError::Provider { .. } => "Authentication failed. Please try again.".to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AuthError::Validation(_))
    }
}

/// Errors from the remote prediction boundary and the submission flow.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error (status {status}): {message}")]
    Server { status: u16, message: String },

    #[error("Response parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("A submission is already in flight for this assessment")]
    Busy,
}

impl RequestError {
    pub fn user_message(&self) -> String {
        match self {
            RequestError::Validation(reason) => reason.clone(),
            RequestError::Network(_) => {
                "Network error. Please check your connection and retry.".to_string()
            }
            RequestError::Timeout => "The request timed out. Please retry.".to_string(),
            RequestError::Server { message, .. } if !message.is_empty() => message.clone(),
            RequestError::Server { .. } => "Prediction failed. Please try again.".to_string(),
            RequestError::Parse(_) => "Prediction failed. Please try again.".to_string(),
            RequestError::Busy => "A prediction is already running. Please wait.".to_string(),
        }
    }
}
