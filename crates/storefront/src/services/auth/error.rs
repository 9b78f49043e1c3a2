//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] mrshopy_core::EmailError),

    /// Wrong password, unknown email, or an account without a password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Email already registered.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Display name missing at registration.
    #[error("name is required")]
    MissingName,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// Message safe to show on the sign-in and registration forms.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidEmail(_) => "Please enter a valid email address.".to_string(),
            Self::InvalidCredentials => "Invalid email or password.".to_string(),
            Self::UserAlreadyExists => "An account with this email already exists.".to_string(),
            Self::WeakPassword(msg) => msg.clone(),
            Self::MissingName => "Please enter your name.".to_string(),
            Self::Repository(_) | Self::PasswordHash => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}
