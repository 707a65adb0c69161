use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, TransactionTrait,
    sea_query::Expr,
};

use super::user::{User, generate_token};
use crate::db::format_timestamp;
use crate::domain::UserId;
use crate::entities::{auth_tokens, users};

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: String,
    pub ttl_seconds: i64,
}

pub struct TokenRepository {
    conn: DatabaseConnection,
}

impl TokenRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Stamps the login time and issues a fresh token in one transaction.
    pub async fn record_login(&self, user_id: UserId, ttl_seconds: i64) -> Result<IssuedToken> {
        let now = Utc::now();
        let issued_at = format_timestamp(now);
        let expires_at = format_timestamp(now + Duration::seconds(ttl_seconds));
        let token = generate_token();

        let txn = self.conn.begin().await?;

        users::Entity::update_many()
            .col_expr(users::Column::LastLoginAt, Expr::value(issued_at.clone()))
            .filter(users::Column::Id.eq(user_id.value()))
            .exec(&txn)
            .await
            .context("Failed to update last login")?;

        auth_tokens::Entity::insert(auth_tokens::ActiveModel {
            token: Set(token.clone()),
            user_id: Set(user_id.value()),
            expires_at: Set(expires_at.clone()),
            created_at: Set(issued_at),
        })
        .exec_without_returning(&txn)
        .await
        .context("Failed to insert auth token")?;

        txn.commit().await?;

        Ok(IssuedToken {
            token,
            expires_at,
            ttl_seconds,
        })
    }

    /// Resolves an unexpired token to its owner.
    pub async fn resolve(&self, token: &str) -> Result<Option<User>> {
        let now = format_timestamp(Utc::now());

        let row = auth_tokens::Entity::find()
            .filter(auth_tokens::Column::Token.eq(token))
            .filter(auth_tokens::Column::ExpiresAt.gt(now))
            .find_also_related(users::Entity)
            .one(&self.conn)
            .await
            .context("Failed to query auth token")?;

        Ok(row.and_then(|(_, user)| user).map(User::from))
    }
}
