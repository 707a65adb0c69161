//! Domain service for authentication.
//!
//! Handles password login and bearer-token resolution.

use serde::Serialize;
use thiserror::Error;

use crate::domain::UserId;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token missing, expired or invalid")]
    InvalidToken,

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Identity resolved from a bearer token, carried through request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
    pub username: String,
}

/// Login result containing the issued bearer token.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub expires_at: String,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials and issues a new token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown user or wrong
    /// password, and [`AuthError::AccountDisabled`] when the password is right
    /// but the account is inactive.
    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError>;

    /// Resolves a bearer token to the user it was issued to.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`] for unknown or expired tokens and
    /// [`AuthError::AccountDisabled`] if the owner has since been disabled.
    async fn authenticate(&self, token: &str) -> Result<CurrentUser, AuthError>;
}
