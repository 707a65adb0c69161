use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::domain::{BillingMonth, SimStatus, UserId};

pub mod migrator;
pub mod repositories;

pub use repositories::operation_log::OperationLogEntry;
pub use repositories::purchase::{NewPurchase, PurchaseOrder, PurchaseOutcome};
pub use repositories::sim::{SimCard, SimSearch, TransitionOutcome};
pub use repositories::token::IssuedToken;
pub use repositories::usage::UsageRecord;
pub use repositories::user::User;

/// Formats a timestamp the way every table stores it.
///
/// Fixed millisecond precision keeps lexicographic order equal to time order,
/// which the expiry filter on `auth_tokens` relies on.
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[must_use]
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = db_url.contains(":memory:");

        if !in_memory {
            let path_str = db_url.trim_start_matches("sqlite:").trim_start_matches("//");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        if !in_memory {
            // Persistent for the file; lets readers proceed while one writer commits.
            conn.execute_unprepared("PRAGMA journal_mode=WAL").await?;
        }

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn token_repo(&self) -> repositories::token::TokenRepository {
        repositories::token::TokenRepository::new(self.conn.clone())
    }

    fn sim_repo(&self) -> repositories::sim::SimRepository {
        repositories::sim::SimRepository::new(self.conn.clone())
    }

    fn usage_repo(&self) -> repositories::usage::UsageRepository {
        repositories::usage::UsageRepository::new(self.conn.clone())
    }

    fn purchase_repo(&self) -> repositories::purchase::PurchaseRepository {
        repositories::purchase::PurchaseRepository::new(self.conn.clone())
    }

    fn operation_log_repo(&self) -> repositories::operation_log::OperationLogRepository {
        repositories::operation_log::OperationLogRepository::new(self.conn.clone())
    }

    // Users

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        security: &SecurityConfig,
    ) -> Result<User> {
        self.user_repo().create(username, password, security).await
    }

    pub async fn set_user_active(&self, username: &str, active: bool) -> Result<bool> {
        self.user_repo().set_active(username, active).await
    }

    pub async fn verify_user_password(&self, username: &str, password: &str) -> Result<Option<User>> {
        self.user_repo().verify_password(username, password).await
    }

    // Tokens

    pub async fn record_login(&self, user_id: UserId, ttl_seconds: i64) -> Result<IssuedToken> {
        self.token_repo().record_login(user_id, ttl_seconds).await
    }

    pub async fn resolve_token(&self, token: &str) -> Result<Option<User>> {
        self.token_repo().resolve(token).await
    }

    // SIM registry

    pub async fn get_sim(&self, iccid: &str) -> Result<Option<SimCard>> {
        self.sim_repo().get(iccid).await
    }

    pub async fn find_owned_sim(&self, owner: UserId, iccid: &str) -> Result<Option<SimCard>> {
        self.sim_repo().find_owned(owner, iccid).await
    }

    pub async fn search_owned_sim(
        &self,
        owner: UserId,
        criteria: &SimSearch,
    ) -> Result<Option<SimCard>> {
        self.sim_repo().search_owned(owner, criteria).await
    }

    pub async fn transition_sim_status(
        &self,
        owner: UserId,
        iccid: &str,
        target: SimStatus,
    ) -> Result<TransitionOutcome> {
        self.sim_repo().transition(owner, iccid, target).await
    }

    pub async fn add_sim(
        &self,
        iccid: &str,
        imsi: &str,
        msisdn: &str,
        owner: UserId,
    ) -> Result<SimCard> {
        self.sim_repo().add(iccid, imsi, msisdn, owner).await
    }

    pub async fn deactivate_sim(&self, iccid: &str) -> Result<Option<SimStatus>> {
        self.sim_repo().deactivate(iccid).await
    }

    // Usage ledger

    pub async fn get_usage(&self, iccid: &str, month: &BillingMonth) -> Result<Option<UsageRecord>> {
        self.usage_repo().get(iccid, month).await
    }

    pub async fn set_usage(
        &self,
        iccid: &str,
        month: &BillingMonth,
        total_mb: i64,
        used_mb: i64,
    ) -> Result<()> {
        self.usage_repo().upsert(iccid, month, total_mb, used_mb).await
    }

    // Purchase ledger

    pub async fn record_purchase(&self, purchase: NewPurchase) -> Result<PurchaseOutcome> {
        self.purchase_repo().record(purchase).await
    }

    pub async fn purchased_mb(&self, iccid: &str, month: &BillingMonth) -> Result<i64> {
        self.purchase_repo().purchased_mb(iccid, month).await
    }

    pub async fn list_purchases(
        &self,
        iccid: &str,
        month: Option<&BillingMonth>,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<PurchaseOrder>, u64)> {
        self.purchase_repo().list(iccid, month, limit, offset).await
    }

    pub async fn count_purchases_by_transid(&self, transid: &str) -> Result<u64> {
        self.purchase_repo().count_by_transid(transid).await
    }

    // Operation log

    pub async fn append_operation_log(&self, entry: OperationLogEntry) -> Result<()> {
        self.operation_log_repo().append(entry).await
    }

    pub async fn list_operation_logs(&self, iccid: &str) -> Result<Vec<OperationLogEntry>> {
        self.operation_log_repo().list_for_sim(iccid).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_have_fixed_precision() {
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_timestamp(at), "2026-01-02T03:04:05.000Z");
    }

    #[test]
    fn timestamps_sort_chronologically() {
        let earlier = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let later = earlier + chrono::Duration::milliseconds(1500);
        assert!(format_timestamp(earlier) < format_timestamp(later));
    }

    #[tokio::test]
    async fn in_memory_store_migrates_and_seeds() {
        let store = Store::with_pool_options("sqlite::memory:", 1, 1).await.unwrap();
        assert!(store.get_user_by_username("demo").await.unwrap().is_some());
    }
}
