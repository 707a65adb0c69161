//! `SeaORM` implementation of the `AuthService` trait.

use crate::db::Store;
use crate::services::auth_service::{AuthError, AuthService, CurrentUser, LoginResult};
use async_trait::async_trait;
use tracing::{info, warn};

pub struct SeaOrmAuthService {
    store: Store,
    token_ttl_seconds: i64,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, token_ttl_seconds: i64) -> Self {
        Self {
            store,
            token_ttl_seconds,
        }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError> {
        if username.trim().is_empty() {
            return Err(AuthError::Validation("Username is required".to_string()));
        }
        if password.is_empty() {
            return Err(AuthError::Validation("Password is required".to_string()));
        }

        let user = self
            .store
            .verify_user_password(username, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.active {
            warn!(username, "Login rejected for disabled account");
            return Err(AuthError::AccountDisabled);
        }

        let issued = self
            .store
            .record_login(user.id, self.token_ttl_seconds)
            .await?;

        info!(username, user_id = %user.id, "User logged in");

        Ok(LoginResult {
            token: issued.token,
            token_type: "Bearer",
            expires_in: issued.ttl_seconds,
            expires_at: issued.expires_at,
        })
    }

    async fn authenticate(&self, token: &str) -> Result<CurrentUser, AuthError> {
        let user = self
            .store
            .resolve_token(token)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if !user.active {
            return Err(AuthError::AccountDisabled);
        }

        Ok(CurrentUser {
            id: user.id,
            username: user.username,
        })
    }
}
