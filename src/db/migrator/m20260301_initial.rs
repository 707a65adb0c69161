use crate::entities::prelude::*;
use crate::entities::{purchase_orders, usage_records};
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        // Parents before children so foreign keys resolve.
        manager
            .create_table(schema.create_table_from_entity(Users).if_not_exists().to_owned())
            .await?;
        manager
            .create_table(
                schema
                    .create_table_from_entity(AuthTokens)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                schema
                    .create_table_from_entity(SimCards)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                schema
                    .create_table_from_entity(PurchaseOrders)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                schema
                    .create_table_from_entity(UsageRecords)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                schema
                    .create_table_from_entity(OperationLogs)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // One usage row per SIM and month; `usage set` upserts on it.
        manager
            .create_index(
                Index::create()
                    .name("idx_usage_records_iccid_month")
                    .table(UsageRecords)
                    .col(usage_records::Column::Iccid)
                    .col(usage_records::Column::Month)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_purchase_orders_iccid_month")
                    .table(PurchaseOrders)
                    .col(purchase_orders::Column::Iccid)
                    .col(purchase_orders::Column::Month)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OperationLogs).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UsageRecords).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PurchaseOrders).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SimCards).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AuthTokens).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await
    }
}
