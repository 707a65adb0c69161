//! `SeaORM` implementation of the `SimService` trait.

use crate::api::types::{SimDto, SimStatusDto, UsageDto};
use crate::db::{OperationLogEntry, SimCard, SimSearch, Store, TransitionOutcome};
use crate::domain::{BillingMonth, SimStatus, StatusAction};
use crate::services::auth_service::CurrentUser;
use crate::services::sim_service::{SimError, SimService};
use async_trait::async_trait;
use tracing::{info, warn};

pub struct SeaOrmSimService {
    store: Store,
}

impl SeaOrmSimService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn owned_sim(&self, user: &CurrentUser, iccid: &str) -> Result<SimCard, SimError> {
        self.store
            .find_owned_sim(user.id, iccid)
            .await?
            .ok_or_else(|| SimError::NotFound(iccid.to_string()))
    }

    async fn log_transition(
        &self,
        user: &CurrentUser,
        iccid: &str,
        action: &StatusAction,
        from: SimStatus,
    ) {
        let entry = OperationLogEntry {
            iccid: iccid.to_string(),
            user_id: Some(user.id.value()),
            action: action.as_str().to_string(),
            from_status: Some(from.as_str().to_string()),
            to_status: action.target().as_str().to_string(),
            created_at: crate::db::now_timestamp(),
        };

        if let Err(e) = self.store.append_operation_log(entry).await {
            warn!(iccid, error = %e, "Failed to append operation log");
        }
    }
}

#[async_trait]
impl SimService for SeaOrmSimService {
    async fn search(&self, user: &CurrentUser, criteria: SimSearch) -> Result<SimDto, SimError> {
        if criteria.is_empty() {
            return Err(SimError::Validation(
                "At least one of iccid, imsi or msisdn is required".to_string(),
            ));
        }

        let sim = self
            .store
            .search_owned_sim(user.id, &criteria)
            .await?
            .ok_or_else(|| {
                SimError::NotFound(
                    criteria
                        .iccid
                        .or(criteria.imsi)
                        .or(criteria.msisdn)
                        .unwrap_or_default(),
                )
            })?;

        Ok(SimDto {
            iccid: sim.iccid,
            imsi: sim.imsi,
            msisdn: sim.msisdn,
            status: sim.status,
        })
    }

    async fn get_status(
        &self,
        user: &CurrentUser,
        iccid: &str,
    ) -> Result<SimStatusDto, SimError> {
        let sim = self.owned_sim(user, iccid).await?;
        Ok(SimStatusDto {
            iccid: sim.iccid,
            status: sim.status,
        })
    }

    async fn change_status(
        &self,
        user: &CurrentUser,
        iccid: &str,
        action: &str,
    ) -> Result<SimStatusDto, SimError> {
        let action = StatusAction::parse(action);
        let target = action.target();

        let from = match self
            .store
            .transition_sim_status(user.id, iccid, target)
            .await?
        {
            TransitionOutcome::Applied { from } => from,
            TransitionOutcome::NotFound => return Err(SimError::NotFound(iccid.to_string())),
            TransitionOutcome::Deactivated => {
                return Err(SimError::InvalidState {
                    iccid: iccid.to_string(),
                    status: SimStatus::Deactivated,
                });
            }
        };

        info!(
            iccid,
            user_id = %user.id,
            from = %from,
            to = %target,
            "SIM status changed"
        );
        metrics::counter!("status_transitions_total", "to" => target.as_str()).increment(1);

        self.log_transition(user, iccid, &action, from).await;

        Ok(SimStatusDto {
            iccid: iccid.to_string(),
            status: target,
        })
    }

    async fn get_usage(
        &self,
        user: &CurrentUser,
        iccid: &str,
        month: &str,
    ) -> Result<UsageDto, SimError> {
        if month.trim().is_empty() {
            return Err(SimError::Validation("month is required".to_string()));
        }
        let month: BillingMonth = month.parse().map_err(SimError::Validation)?;

        self.owned_sim(user, iccid).await?;

        let usage = self
            .store
            .get_usage(iccid, &month)
            .await?
            .ok_or_else(|| SimError::UsageNotFound {
                iccid: iccid.to_string(),
                month: month.to_string(),
            })?;

        let purchased = self.store.purchased_mb(iccid, &month).await?;
        let effective_total_mb = usage.total_mb + purchased;

        Ok(UsageDto {
            iccid: usage.iccid,
            month: usage.month,
            effective_total_mb,
            used_mb: usage.used_mb,
            remain_mb: (effective_total_mb - usage.used_mb).max(0),
            unit: usage.unit,
            last_update: usage.last_update,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NewPurchase;
    use sea_orm::ConnectionTrait;

    const ACTIVE_SIM: &str = "89860000000000000001";
    const SUSPENDED_SIM: &str = "89860000000000000002";
    const DEACTIVATED_SIM: &str = "89860000000000000003";
    const OTHER_USERS_SIM: &str = "89860000000000000004";

    async fn setup() -> (SeaOrmSimService, CurrentUser) {
        let store = Store::with_pool_options("sqlite::memory:", 1, 1).await.unwrap();
        let demo = store.get_user_by_username("demo").await.unwrap().unwrap();
        let user = CurrentUser {
            id: demo.id,
            username: demo.username,
        };
        (SeaOrmSimService::new(store), user)
    }

    #[tokio::test]
    async fn suspend_and_resume_round_trip() {
        let (service, user) = setup().await;

        let dto = service
            .change_status(&user, ACTIVE_SIM, "suspend")
            .await
            .unwrap();
        assert_eq!(dto.status, SimStatus::Suspended);

        let dto = service
            .change_status(&user, ACTIVE_SIM, "RESUME")
            .await
            .unwrap();
        assert_eq!(dto.status, SimStatus::Active);

        let logs = service.store.list_operation_logs(ACTIVE_SIM).await.unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].action, "SUSPEND");
        assert_eq!(logs[0].from_status.as_deref(), Some("ACTIVE"));
        assert_eq!(logs[1].to_status, "ACTIVE");
    }

    #[tokio::test]
    async fn unknown_action_resumes() {
        let (service, user) = setup().await;

        let dto = service
            .change_status(&user, SUSPENDED_SIM, "wake-up")
            .await
            .unwrap();
        assert_eq!(dto.status, SimStatus::Active);
    }

    #[tokio::test]
    async fn deactivated_sim_rejects_every_action() {
        let (service, user) = setup().await;

        for action in ["SUSPEND", "RESUME", "anything", "", "  "] {
            let err = service
                .change_status(&user, DEACTIVATED_SIM, action)
                .await
                .unwrap_err();
            assert!(matches!(err, SimError::InvalidState { .. }), "{action:?}");
        }
        assert!(service.store.list_operation_logs(DEACTIVATED_SIM).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_action_resumes() {
        let (service, user) = setup().await;

        let dto = service.change_status(&user, SUSPENDED_SIM, "").await.unwrap();
        assert_eq!(dto.status, SimStatus::Active);

        let dto = service.change_status(&user, ACTIVE_SIM, "  ").await.unwrap();
        assert_eq!(dto.status, SimStatus::Active);

        let logs = service.store.list_operation_logs(SUSPENDED_SIM).await.unwrap();
        assert_eq!(logs[0].from_status.as_deref(), Some("SUSPENDED"));
        assert_eq!(logs[0].to_status, "ACTIVE");
    }

    #[tokio::test]
    async fn failed_operation_log_does_not_fail_transition() {
        let (service, user) = setup().await;
        service
            .store
            .conn
            .execute_unprepared("DROP TABLE operation_logs")
            .await
            .unwrap();

        let dto = service
            .change_status(&user, ACTIVE_SIM, "SUSPEND")
            .await
            .unwrap();
        assert_eq!(dto.status, SimStatus::Suspended);

        let sim = service.store.find_owned_sim(user.id, ACTIVE_SIM).await.unwrap().unwrap();
        assert_eq!(sim.status, SimStatus::Suspended);
    }

    #[tokio::test]
    async fn foreign_and_missing_sims_look_the_same() {
        let (service, user) = setup().await;

        let foreign = service.get_status(&user, OTHER_USERS_SIM).await.unwrap_err();
        let missing = service.get_status(&user, "89869999999999999999").await.unwrap_err();

        assert!(matches!(foreign, SimError::NotFound(_)));
        assert!(matches!(missing, SimError::NotFound(_)));
        assert_eq!(
            foreign.to_string().replace(OTHER_USERS_SIM, "X"),
            missing.to_string().replace("89869999999999999999", "X")
        );

        let err = service
            .change_status(&user, OTHER_USERS_SIM, "SUSPEND")
            .await
            .unwrap_err();
        assert!(matches!(err, SimError::NotFound(_)));
    }

    #[tokio::test]
    async fn search_requires_a_criterion() {
        let (service, user) = setup().await;

        let err = service.search(&user, SimSearch::default()).await.unwrap_err();
        assert!(matches!(err, SimError::Validation(_)));

        let by_msisdn = SimSearch {
            msisdn: Some("8613800000002".to_string()),
            ..SimSearch::default()
        };
        let sim = service.search(&user, by_msisdn).await.unwrap();
        assert_eq!(sim.iccid, SUSPENDED_SIM);
        assert_eq!(sim.status, SimStatus::Suspended);
    }

    #[tokio::test]
    async fn usage_includes_purchased_packages() {
        let (service, user) = setup().await;

        let usage = service.get_usage(&user, ACTIVE_SIM, "2025-09").await.unwrap();
        assert_eq!(usage.effective_total_mb, 1024);
        assert_eq!(usage.remain_mb, 724);

        service
            .store
            .record_purchase(NewPurchase {
                iccid: ACTIVE_SIM.to_string(),
                month: "2025-09".parse().unwrap(),
                package_mb: 500,
                price_cent: 0,
                product_id: None,
                transid: "T-usage".to_string(),
            })
            .await
            .unwrap();

        let usage = service.get_usage(&user, ACTIVE_SIM, "2025-09").await.unwrap();
        assert_eq!(usage.effective_total_mb, 1524);
        assert_eq!(usage.used_mb, 300);
        assert_eq!(usage.remain_mb, 1224);
    }

    #[tokio::test]
    async fn remain_never_goes_negative() {
        let (service, user) = setup().await;
        let month: BillingMonth = "2025-10".parse().unwrap();
        service.store.set_usage(ACTIVE_SIM, &month, 100, 250).await.unwrap();

        let usage = service.get_usage(&user, ACTIVE_SIM, "2025-10").await.unwrap();
        assert_eq!(usage.remain_mb, 0);
    }

    #[tokio::test]
    async fn usage_validates_month_and_presence() {
        let (service, user) = setup().await;

        assert!(matches!(
            service.get_usage(&user, ACTIVE_SIM, "").await.unwrap_err(),
            SimError::Validation(_)
        ));
        assert!(matches!(
            service.get_usage(&user, ACTIVE_SIM, "2025-13").await.unwrap_err(),
            SimError::Validation(_)
        ));
        assert!(matches!(
            service.get_usage(&user, ACTIVE_SIM, "2024-01").await.unwrap_err(),
            SimError::UsageNotFound { .. }
        ));
    }
}
