//! `SeaORM` implementation of the `PurchaseService` trait.

use crate::api::types::{PurchasePageDto, PurchaseRequest};
use crate::db::{NewPurchase, PurchaseOutcome, Store};
use crate::domain::BillingMonth;
use crate::services::auth_service::CurrentUser;
use crate::services::purchase_service::{PurchaseError, PurchaseReceipt, PurchaseService};
use async_trait::async_trait;
use tracing::{info, warn};
use uuid::Uuid;

/// Generated transaction ids: `TX` followed by a simple-form UUID v4.
#[must_use]
pub fn generate_transid() -> String {
    format!("TX{}", Uuid::new_v4().simple())
}

pub struct SeaOrmPurchaseService {
    store: Store,
}

impl SeaOrmPurchaseService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn ensure_owned(&self, user: &CurrentUser, iccid: &str) -> Result<(), PurchaseError> {
        self.store
            .find_owned_sim(user.id, iccid)
            .await?
            .map(|_| ())
            .ok_or_else(|| PurchaseError::NotFound(iccid.to_string()))
    }
}

fn validate_request(request: &PurchaseRequest) -> Result<(BillingMonth, i32, i64), PurchaseError> {
    let month: BillingMonth = request.month.parse().map_err(PurchaseError::Validation)?;

    if request.package_mb <= 0 {
        return Err(PurchaseError::Validation(
            "package_mb must be greater than 0".to_string(),
        ));
    }
    let package_mb = i32::try_from(request.package_mb)
        .map_err(|_| PurchaseError::Validation("package_mb is too large".to_string()))?;

    let price_cent = request.pay_amount_cent.unwrap_or(0);
    if price_cent < 0 {
        return Err(PurchaseError::Validation(
            "pay_amount_cent must not be negative".to_string(),
        ));
    }

    Ok((month, package_mb, price_cent))
}

#[async_trait]
impl PurchaseService for SeaOrmPurchaseService {
    async fn purchase(
        &self,
        user: &CurrentUser,
        iccid: &str,
        request: PurchaseRequest,
        transid: Option<String>,
    ) -> Result<PurchaseReceipt, PurchaseError> {
        self.ensure_owned(user, iccid).await?;
        let (month, package_mb, price_cent) = validate_request(&request)?;

        let transid = transid
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(generate_transid);

        let outcome = self
            .store
            .record_purchase(NewPurchase {
                iccid: iccid.to_string(),
                month,
                package_mb,
                price_cent,
                product_id: request.product_id.filter(|p| !p.is_empty()),
                transid: transid.clone(),
            })
            .await?;

        let replayed = outcome.is_replay();
        let order = match outcome {
            PurchaseOutcome::Existing(order) if order.iccid != iccid => {
                warn!(transid = %transid, iccid, "Transaction id reused for a different SIM");
                metrics::counter!("purchases_total", "outcome" => "rejected").increment(1);
                return Err(PurchaseError::TransIdReused(transid));
            }
            outcome => outcome.into_order(),
        };

        let label = if replayed { "replayed" } else { "created" };
        metrics::counter!("purchases_total", "outcome" => label).increment(1);
        info!(
            order_id = %order.order_id,
            transid = %order.transid,
            iccid,
            user_id = %user.id,
            replayed,
            "Purchase recorded"
        );

        Ok(PurchaseReceipt { order, replayed })
    }

    async fn list(
        &self,
        user: &CurrentUser,
        iccid: &str,
        month: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> Result<PurchasePageDto, PurchaseError> {
        let month = month
            .filter(|m| !m.trim().is_empty())
            .map(str::parse::<BillingMonth>)
            .transpose()
            .map_err(PurchaseError::Validation)?;

        self.ensure_owned(user, iccid).await?;

        let (items, total) = self
            .store
            .list_purchases(iccid, month.as_ref(), limit, offset)
            .await?;

        Ok(PurchasePageDto {
            items,
            total,
            limit,
            offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACTIVE_SIM: &str = "89860000000000000001";
    const SUSPENDED_SIM: &str = "89860000000000000002";
    const OTHER_USERS_SIM: &str = "89860000000000000004";

    async fn setup() -> (SeaOrmPurchaseService, CurrentUser) {
        let store = Store::with_pool_options("sqlite::memory:", 1, 1).await.unwrap();
        let demo = store.get_user_by_username("demo").await.unwrap().unwrap();
        let user = CurrentUser {
            id: demo.id,
            username: demo.username,
        };
        (SeaOrmPurchaseService::new(store), user)
    }

    fn request(package_mb: i64) -> PurchaseRequest {
        PurchaseRequest {
            month: "2025-09".to_string(),
            package_mb,
            product_id: Some("PKG-500".to_string()),
            pay_amount_cent: Some(990),
        }
    }

    #[test]
    fn generated_transids_are_prefixed_uuids() {
        let id = generate_transid();
        assert!(id.starts_with("TX"));
        assert_eq!(id.len(), 34);
        assert_ne!(id, generate_transid());
    }

    #[tokio::test]
    async fn same_transid_returns_same_order() {
        let (service, user) = setup().await;

        let first = service
            .purchase(&user, ACTIVE_SIM, request(500), Some("T1".to_string()))
            .await
            .unwrap();
        let second = service
            .purchase(&user, ACTIVE_SIM, request(500), Some("T1".to_string()))
            .await
            .unwrap();

        assert!(!first.replayed);
        assert!(second.replayed);
        assert_eq!(first.order, second.order);
        assert_eq!(service.store.count_purchases_by_transid("T1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn missing_transid_is_generated() {
        let (service, user) = setup().await;

        let receipt = service
            .purchase(&user, ACTIVE_SIM, request(100), None)
            .await
            .unwrap();
        assert!(receipt.order.transid.starts_with("TX"));
        assert_eq!(receipt.order.price_cent, 990);
    }

    #[tokio::test]
    async fn transid_reused_on_another_sim_is_rejected() {
        let (service, user) = setup().await;

        service
            .purchase(&user, ACTIVE_SIM, request(500), Some("T-shared".to_string()))
            .await
            .unwrap();
        let err = service
            .purchase(&user, SUSPENDED_SIM, request(500), Some("T-shared".to_string()))
            .await
            .unwrap_err();

        assert!(matches!(err, PurchaseError::TransIdReused(_)));
    }

    #[tokio::test]
    async fn invalid_requests_are_rejected() {
        let (service, user) = setup().await;

        for bad in [
            request(0),
            request(-5),
            PurchaseRequest {
                month: "2025/09".to_string(),
                ..request(500)
            },
            PurchaseRequest {
                pay_amount_cent: Some(-1),
                ..request(500)
            },
        ] {
            let err = service
                .purchase(&user, ACTIVE_SIM, bad, None)
                .await
                .unwrap_err();
            assert!(matches!(err, PurchaseError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn foreign_sim_is_not_found() {
        let (service, user) = setup().await;

        let err = service
            .purchase(&user, OTHER_USERS_SIM, request(500), Some("T-x".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, PurchaseError::NotFound(_)));

        let err = service
            .list(&user, OTHER_USERS_SIM, None, 20, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, PurchaseError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_filters_by_month() {
        let (service, user) = setup().await;

        service
            .purchase(&user, ACTIVE_SIM, request(100), Some("T-sep".to_string()))
            .await
            .unwrap();
        service
            .purchase(
                &user,
                ACTIVE_SIM,
                PurchaseRequest {
                    month: "2025-10".to_string(),
                    ..request(200)
                },
                Some("T-oct".to_string()),
            )
            .await
            .unwrap();

        let page = service.list(&user, ACTIVE_SIM, None, 20, 0).await.unwrap();
        assert_eq!(page.total, 2);

        let page = service
            .list(&user, ACTIVE_SIM, Some("2025-10"), 20, 0)
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].transid, "T-oct");
    }
}
