use crate::entities::{operation_logs, prelude::*};
use anyhow::Result;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationLogEntry {
    pub iccid: String,
    pub user_id: Option<i32>,
    pub action: String,
    pub from_status: Option<String>,
    pub to_status: String,
    pub created_at: String,
}

impl From<operation_logs::Model> for OperationLogEntry {
    fn from(model: operation_logs::Model) -> Self {
        Self {
            iccid: model.iccid,
            user_id: model.user_id,
            action: model.action,
            from_status: model.from_status,
            to_status: model.to_status,
            created_at: model.created_at,
        }
    }
}

pub struct OperationLogRepository {
    conn: DatabaseConnection,
}

impl OperationLogRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn append(&self, entry: OperationLogEntry) -> Result<()> {
        let active_model = operation_logs::ActiveModel {
            iccid: Set(entry.iccid),
            user_id: Set(entry.user_id),
            action: Set(entry.action),
            from_status: Set(entry.from_status),
            to_status: Set(entry.to_status),
            created_at: Set(entry.created_at),
            ..Default::default()
        };

        OperationLogs::insert(active_model).exec(&self.conn).await?;
        Ok(())
    }

    pub async fn list_for_sim(&self, iccid: &str) -> Result<Vec<OperationLogEntry>> {
        let rows = OperationLogs::find()
            .filter(operation_logs::Column::Iccid.eq(iccid))
            .order_by_asc(operation_logs::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(OperationLogEntry::from).collect())
    }
}
