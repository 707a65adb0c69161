use anyhow::{Context, Result};
use chrono::Utc;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait, sea_query::Expr,
};
use serde::Serialize;
use tracing::debug;

use crate::domain::BillingMonth;
use crate::entities::purchase_orders;

/// Only successful orders are modelled.
pub const ORDER_STATUS_SUCCESS: &str = "SUCCESS";

const MAX_ORDER_ID_ATTEMPTS: usize = 3;

#[derive(Debug, Clone)]
pub struct NewPurchase {
    pub iccid: String,
    pub month: BillingMonth,
    pub package_mb: i32,
    pub price_cent: i64,
    pub product_id: Option<String>,
    pub transid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseOrder {
    pub order_id: String,
    pub iccid: String,
    pub month: String,
    pub package_mb: i32,
    pub price_cent: i64,
    pub product_id: Option<String>,
    pub status: String,
    pub transid: String,
    pub created_at: String,
}

impl From<purchase_orders::Model> for PurchaseOrder {
    fn from(model: purchase_orders::Model) -> Self {
        Self {
            order_id: model.order_id,
            iccid: model.iccid,
            month: model.month,
            package_mb: model.package_mb,
            price_cent: model.price_cent,
            product_id: model.product_id,
            status: model.status,
            transid: model.transid,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseOutcome {
    Created(PurchaseOrder),
    /// A row with the same transid already existed; it is returned unchanged.
    Existing(PurchaseOrder),
}

impl PurchaseOutcome {
    #[must_use]
    pub const fn order(&self) -> &PurchaseOrder {
        match self {
            Self::Created(order) | Self::Existing(order) => order,
        }
    }

    #[must_use]
    pub fn into_order(self) -> PurchaseOrder {
        match self {
            Self::Created(order) | Self::Existing(order) => order,
        }
    }

    #[must_use]
    pub const fn is_replay(&self) -> bool {
        matches!(self, Self::Existing(_))
    }
}

/// `PO` + UTC timestamp to the second + four random digits.
#[must_use]
pub fn generate_order_id() -> String {
    use rand::Rng;

    let suffix: u32 = rand::rng().random_range(0..10_000);
    format!("PO{}{suffix:04}", Utc::now().format("%Y%m%d%H%M%S"))
}

pub struct PurchaseRepository {
    conn: DatabaseConnection,
}

impl PurchaseRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Records a purchase exactly once per transid.
    ///
    /// Each insert runs in a savepoint. A unique violation rolls the savepoint
    /// back and the row is re-read by transid: a hit means another request
    /// (or an earlier retry) already recorded it; a miss means the generated
    /// order id collided and a fresh one is tried.
    pub async fn record(&self, purchase: NewPurchase) -> Result<PurchaseOutcome> {
        let txn = self.conn.begin().await?;

        for attempt in 1..=MAX_ORDER_ID_ATTEMPTS {
            let savepoint = txn.begin().await?;

            let inserted = purchase_orders::Entity::insert(purchase_orders::ActiveModel {
                order_id: Set(generate_order_id()),
                transid: Set(purchase.transid.clone()),
                iccid: Set(purchase.iccid.clone()),
                month: Set(purchase.month.as_str().to_string()),
                package_mb: Set(purchase.package_mb),
                price_cent: Set(purchase.price_cent),
                product_id: Set(purchase.product_id.clone()),
                status: Set(ORDER_STATUS_SUCCESS.to_string()),
                created_at: Set(crate::db::now_timestamp()),
                ..Default::default()
            })
            .exec_without_returning(&savepoint)
            .await;

            match inserted {
                Ok(_) => {
                    savepoint.commit().await?;
                    let order = find_by_transid(&txn, &purchase.transid)
                        .await?
                        .context("Inserted purchase order not found")?;
                    txn.commit().await?;
                    return Ok(PurchaseOutcome::Created(order));
                }
                Err(err) if is_unique_violation(&err) => {
                    savepoint.rollback().await?;

                    if let Some(existing) = find_by_transid(&txn, &purchase.transid).await? {
                        txn.commit().await?;
                        return Ok(PurchaseOutcome::Existing(existing));
                    }

                    debug!(attempt, transid = %purchase.transid, "Order id collision, regenerating");
                }
                Err(err) => {
                    return Err(err).context("Failed to insert purchase order");
                }
            }
        }

        anyhow::bail!(
            "Could not allocate a unique order id after {MAX_ORDER_ID_ATTEMPTS} attempts"
        )
    }

    /// Sum of successful package sizes bought for a SIM in a month.
    pub async fn purchased_mb(&self, iccid: &str, month: &BillingMonth) -> Result<i64> {
        let total: Option<Option<i64>> = purchase_orders::Entity::find()
            .select_only()
            .column_as(Expr::col(purchase_orders::Column::PackageMb).sum(), "purchased_mb")
            .filter(purchase_orders::Column::Iccid.eq(iccid))
            .filter(purchase_orders::Column::Month.eq(month.as_str()))
            .filter(purchase_orders::Column::Status.eq(ORDER_STATUS_SUCCESS))
            .into_tuple()
            .one(&self.conn)
            .await
            .context("Failed to sum purchased packages")?;

        Ok(total.flatten().unwrap_or(0))
    }

    /// Newest first. Returns the page and the unpaged total.
    pub async fn list(
        &self,
        iccid: &str,
        month: Option<&BillingMonth>,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<PurchaseOrder>, u64)> {
        let mut query =
            purchase_orders::Entity::find().filter(purchase_orders::Column::Iccid.eq(iccid));

        if let Some(month) = month {
            query = query.filter(purchase_orders::Column::Month.eq(month.as_str()));
        }

        let total = query
            .clone()
            .count(&self.conn)
            .await
            .context("Failed to count purchase orders")?;

        let orders = query
            .order_by_desc(purchase_orders::Column::CreatedAt)
            .order_by_desc(purchase_orders::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to list purchase orders")?;

        Ok((orders.into_iter().map(PurchaseOrder::from).collect(), total))
    }

    pub async fn count_by_transid(&self, transid: &str) -> Result<u64> {
        let count = purchase_orders::Entity::find()
            .filter(purchase_orders::Column::Transid.eq(transid))
            .count(&self.conn)
            .await?;
        Ok(count)
    }
}

async fn find_by_transid<C: ConnectionTrait>(
    conn: &C,
    transid: &str,
) -> Result<Option<PurchaseOrder>, DbErr> {
    let order = purchase_orders::Entity::find()
        .filter(purchase_orders::Column::Transid.eq(transid))
        .one(conn)
        .await?;

    Ok(order.map(PurchaseOrder::from))
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
