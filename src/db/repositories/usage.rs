use anyhow::{Context, Result};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::domain::BillingMonth;
use crate::entities::usage_records;

#[derive(Debug, Clone)]
pub struct UsageRecord {
    pub iccid: String,
    pub month: String,
    pub total_mb: i64,
    pub used_mb: i64,
    pub unit: String,
    pub last_update: String,
}

impl From<usage_records::Model> for UsageRecord {
    fn from(model: usage_records::Model) -> Self {
        Self {
            iccid: model.iccid,
            month: model.month,
            total_mb: model.total_mb,
            used_mb: model.used_mb,
            unit: model.unit,
            last_update: model.last_update,
        }
    }
}

pub struct UsageRepository {
    conn: DatabaseConnection,
}

impl UsageRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, iccid: &str, month: &BillingMonth) -> Result<Option<UsageRecord>> {
        let record = usage_records::Entity::find()
            .filter(usage_records::Column::Iccid.eq(iccid))
            .filter(usage_records::Column::Month.eq(month.as_str()))
            .one(&self.conn)
            .await
            .context("Failed to query usage record")?;

        Ok(record.map(UsageRecord::from))
    }

    /// Stands in for the metering feed: writes the month's figures for a SIM.
    pub async fn upsert(
        &self,
        iccid: &str,
        month: &BillingMonth,
        total_mb: i64,
        used_mb: i64,
    ) -> Result<()> {
        let model = usage_records::ActiveModel {
            iccid: Set(iccid.to_string()),
            month: Set(month.as_str().to_string()),
            total_mb: Set(total_mb),
            used_mb: Set(used_mb),
            unit: Set("MB".to_string()),
            last_update: Set(crate::db::now_timestamp()),
            ..Default::default()
        };

        usage_records::Entity::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    usage_records::Column::Iccid,
                    usage_records::Column::Month,
                ])
                .update_columns([
                    usage_records::Column::TotalMb,
                    usage_records::Column::UsedMb,
                    usage_records::Column::LastUpdate,
                ])
                .to_owned(),
            )
            .exec(&self.conn)
            .await
            .with_context(|| format!("Failed to record usage for {iccid} {month}"))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Store;

    const SIM: &str = "89860000000000000001";

    #[tokio::test]
    async fn upsert_replaces_existing_month() {
        let store = Store::with_pool_options("sqlite::memory:", 1, 1).await.unwrap();
        let month: BillingMonth = "2025-10".parse().unwrap();

        assert!(store.get_usage(SIM, &month).await.unwrap().is_none());

        store.set_usage(SIM, &month, 2048, 10).await.unwrap();
        store.set_usage(SIM, &month, 2048, 900).await.unwrap();

        let usage = store.get_usage(SIM, &month).await.unwrap().unwrap();
        assert_eq!(usage.total_mb, 2048);
        assert_eq!(usage.used_mb, 900);
        assert_eq!(usage.unit, "MB");
    }

    #[tokio::test]
    async fn seeded_usage_is_readable() {
        let store = Store::with_pool_options("sqlite::memory:", 1, 1).await.unwrap();
        let month: BillingMonth = "2025-09".parse().unwrap();

        let usage = store.get_usage(SIM, &month).await.unwrap().unwrap();
        assert_eq!(usage.total_mb, 1024);
        assert_eq!(usage.used_mb, 300);
    }
}
