use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, PurchaseService, SeaOrmAuthService, SeaOrmPurchaseService, SeaOrmSimService,
    SimService,
};

/// Everything a request handler may touch. Built once at startup; the only
/// mutable state behind it is the database.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub sim_service: Arc<dyn SimService>,

    pub purchase_service: Arc<dyn PurchaseService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Ok(Self::with_store(config, store))
    }

    #[must_use]
    pub fn with_store(config: Config, store: Store) -> Self {
        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.token_ttl_seconds,
        )) as Arc<dyn AuthService>;
        let sim_service = Arc::new(SeaOrmSimService::new(store.clone())) as Arc<dyn SimService>;
        let purchase_service =
            Arc::new(SeaOrmPurchaseService::new(store.clone())) as Arc<dyn PurchaseService>;

        Self {
            config: Arc::new(config),
            store,
            auth_service,
            sim_service,
            purchase_service,
        }
    }
}
