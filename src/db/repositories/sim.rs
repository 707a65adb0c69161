use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    sea_query::Expr,
};

use crate::domain::{SimStatus, UserId};
use crate::entities::sim_cards;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimCard {
    pub iccid: String,
    pub imsi: String,
    pub msisdn: String,
    pub owner_id: UserId,
    pub status: SimStatus,
    pub updated_at: String,
}

impl TryFrom<sim_cards::Model> for SimCard {
    type Error = anyhow::Error;

    fn try_from(model: sim_cards::Model) -> Result<Self> {
        let status = model
            .status
            .parse::<SimStatus>()
            .map_err(|e| anyhow::anyhow!("SIM {}: {e}", model.iccid))?;

        Ok(Self {
            iccid: model.iccid,
            imsi: model.imsi,
            msisdn: model.msisdn,
            owner_id: UserId::new(model.owner_id),
            status,
            updated_at: model.updated_at,
        })
    }
}

/// Identity criteria for a SIM lookup. Set fields are AND-combined.
#[derive(Debug, Clone, Default)]
pub struct SimSearch {
    pub iccid: Option<String>,
    pub imsi: Option<String>,
    pub msisdn: Option<String>,
}

impl SimSearch {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.iccid.is_none() && self.imsi.is_none() && self.msisdn.is_none()
    }
}

/// Result of a conditional status update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The update replaced `from`.
    Applied { from: SimStatus },
    /// No SIM with that iccid belongs to the caller.
    NotFound,
    /// The SIM was (or became) deactivated before the update ran.
    Deactivated,
}

pub struct SimRepository {
    conn: DatabaseConnection,
}

impl SimRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Unscoped lookup for administrative paths.
    pub async fn get(&self, iccid: &str) -> Result<Option<SimCard>> {
        sim_cards::Entity::find_by_id(iccid.to_string())
            .one(&self.conn)
            .await
            .context("Failed to query SIM by iccid")?
            .map(SimCard::try_from)
            .transpose()
    }

    /// Ownership gate: the SIM is returned only when `owner` holds it.
    pub async fn find_owned(&self, owner: UserId, iccid: &str) -> Result<Option<SimCard>> {
        sim_cards::Entity::find_by_id(iccid.to_string())
            .filter(sim_cards::Column::OwnerId.eq(owner.value()))
            .one(&self.conn)
            .await
            .context("Failed to query SIM by iccid")?
            .map(SimCard::try_from)
            .transpose()
    }

    pub async fn search_owned(&self, owner: UserId, criteria: &SimSearch) -> Result<Option<SimCard>> {
        let mut query =
            sim_cards::Entity::find().filter(sim_cards::Column::OwnerId.eq(owner.value()));

        if let Some(iccid) = &criteria.iccid {
            query = query.filter(sim_cards::Column::Iccid.eq(iccid.as_str()));
        }
        if let Some(imsi) = &criteria.imsi {
            query = query.filter(sim_cards::Column::Imsi.eq(imsi.as_str()));
        }
        if let Some(msisdn) = &criteria.msisdn {
            query = query.filter(sim_cards::Column::Msisdn.eq(msisdn.as_str()));
        }

        query
            .one(&self.conn)
            .await
            .context("Failed to search SIM")?
            .map(SimCard::try_from)
            .transpose()
    }

    /// Moves an owned, non-deactivated SIM to `target`.
    ///
    /// The UPDATE only matches the status observed just before it, so the
    /// reported `from` is the value actually replaced. A lost race re-reads
    /// the row and tries again against the newer status.
    pub async fn transition(
        &self,
        owner: UserId,
        iccid: &str,
        target: SimStatus,
    ) -> Result<TransitionOutcome> {
        loop {
            let Some(current) = self.find_owned(owner, iccid).await? else {
                return Ok(TransitionOutcome::NotFound);
            };
            if current.status.is_terminal() {
                return Ok(TransitionOutcome::Deactivated);
            }

            let result = sim_cards::Entity::update_many()
                .col_expr(sim_cards::Column::Status, Expr::value(target.as_str()))
                .col_expr(
                    sim_cards::Column::UpdatedAt,
                    Expr::value(crate::db::now_timestamp()),
                )
                .filter(sim_cards::Column::Iccid.eq(iccid))
                .filter(sim_cards::Column::OwnerId.eq(owner.value()))
                .filter(sim_cards::Column::Status.eq(current.status.as_str()))
                .filter(sim_cards::Column::Status.ne(SimStatus::Deactivated.as_str()))
                .exec(&self.conn)
                .await
                .context("Failed to update SIM status")?;

            if result.rows_affected > 0 {
                return Ok(TransitionOutcome::Applied {
                    from: current.status,
                });
            }
        }
    }

    pub async fn add(
        &self,
        iccid: &str,
        imsi: &str,
        msisdn: &str,
        owner: UserId,
    ) -> Result<SimCard> {
        let model = sim_cards::ActiveModel {
            iccid: Set(iccid.to_string()),
            imsi: Set(imsi.to_string()),
            msisdn: Set(msisdn.to_string()),
            owner_id: Set(owner.value()),
            status: Set(SimStatus::Active.as_str().to_string()),
            updated_at: Set(crate::db::now_timestamp()),
        }
        .insert(&self.conn)
        .await
        .with_context(|| format!("Failed to register SIM {iccid}"))?;

        SimCard::try_from(model)
    }

    /// Administrative deactivation, bypassing ownership.
    /// Returns the previous status, or `None` when the SIM does not exist.
    pub async fn deactivate(&self, iccid: &str) -> Result<Option<SimStatus>> {
        let Some(model) = sim_cards::Entity::find_by_id(iccid.to_string())
            .one(&self.conn)
            .await?
        else {
            return Ok(None);
        };

        let previous = SimCard::try_from(model.clone())?.status;

        let mut active: sim_cards::ActiveModel = model.into();
        active.status = Set(SimStatus::Deactivated.as_str().to_string());
        active.updated_at = Set(crate::db::now_timestamp());
        active.update(&self.conn).await?;

        Ok(Some(previous))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Store;

    const ACTIVE_SIM: &str = "89860000000000000001";
    const DEACTIVATED_SIM: &str = "89860000000000000003";
    const OTHER_USERS_SIM: &str = "89860000000000000004";

    async fn store_and_demo() -> (Store, UserId) {
        let store = Store::with_pool_options("sqlite::memory:", 1, 1).await.unwrap();
        let demo = store.get_user_by_username("demo").await.unwrap().unwrap();
        (store, demo.id)
    }

    #[tokio::test]
    async fn ownership_gate_hides_foreign_sims() {
        let (store, demo) = store_and_demo().await;

        assert!(store.find_owned_sim(demo, ACTIVE_SIM).await.unwrap().is_some());
        assert!(store.find_owned_sim(demo, OTHER_USERS_SIM).await.unwrap().is_none());
        assert!(store.find_owned_sim(demo, "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn search_combines_criteria() {
        let (store, demo) = store_and_demo().await;

        let by_imsi = SimSearch {
            imsi: Some("460000000000001".to_string()),
            ..SimSearch::default()
        };
        let sim = store.search_owned_sim(demo, &by_imsi).await.unwrap().unwrap();
        assert_eq!(sim.iccid, ACTIVE_SIM);

        let mismatched = SimSearch {
            imsi: Some("460000000000001".to_string()),
            msisdn: Some("8613800000002".to_string()),
            ..SimSearch::default()
        };
        assert!(store.search_owned_sim(demo, &mismatched).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn transition_updates_owned_active_sim() {
        let (store, demo) = store_and_demo().await;

        let outcome = store
            .transition_sim_status(demo, ACTIVE_SIM, SimStatus::Suspended)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            TransitionOutcome::Applied {
                from: SimStatus::Active
            }
        );

        let sim = store.find_owned_sim(demo, ACTIVE_SIM).await.unwrap().unwrap();
        assert_eq!(sim.status, SimStatus::Suspended);

        let outcome = store
            .transition_sim_status(demo, ACTIVE_SIM, SimStatus::Active)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            TransitionOutcome::Applied {
                from: SimStatus::Suspended
            }
        );
    }

    #[tokio::test]
    async fn transition_classifies_misses() {
        let (store, demo) = store_and_demo().await;

        let outcome = store
            .transition_sim_status(demo, DEACTIVATED_SIM, SimStatus::Active)
            .await
            .unwrap();
        assert_eq!(outcome, TransitionOutcome::Deactivated);

        let outcome = store
            .transition_sim_status(demo, OTHER_USERS_SIM, SimStatus::Suspended)
            .await
            .unwrap();
        assert_eq!(outcome, TransitionOutcome::NotFound);
    }

    #[tokio::test]
    async fn deactivate_is_terminal_for_owner_transitions() {
        let (store, demo) = store_and_demo().await;

        let previous = store.deactivate_sim(ACTIVE_SIM).await.unwrap();
        assert_eq!(previous, Some(SimStatus::Active));

        let outcome = store
            .transition_sim_status(demo, ACTIVE_SIM, SimStatus::Active)
            .await
            .unwrap();
        assert_eq!(outcome, TransitionOutcome::Deactivated);

        assert_eq!(store.deactivate_sim("missing").await.unwrap(), None);
    }
}
