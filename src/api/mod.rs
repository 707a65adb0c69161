use axum::{
    Router,
    http::{HeaderName, HeaderValue},
    middleware,
    routing::{get, post},
};
use std::ops::Deref;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::SharedState;

pub mod auth;
mod error;
mod observability;
mod purchases;
mod sims;
mod system;
pub mod trace;
pub mod types;
mod validation;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl Deref for AppState {
    type Target = SharedState;

    fn deref(&self) -> &Self::Target {
        &self.shared
    }
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config().server.cors_allowed_origins.clone();

    let protected_routes = create_protected_router(state.clone());

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/alive", get(system::alive))
        .route("/metrics", get(observability::get_metrics))
        .route("/auth/login", post(auth::login))
        .route_layer(middleware::from_fn(observability::logging_middleware))
        .with_state(state);

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    api_router
        .layer(TraceLayer::new_for_http())
        .layer(
            cors_layer
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers([HeaderName::from_static(trace::TRANSID_HEADER)]),
        )
        .layer(middleware::from_fn(trace::trace_middleware))
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/sims/search", get(sims::search_sim))
        .route(
            "/sims/{iccid}/status",
            get(sims::get_status).patch(sims::change_status),
        )
        .route("/sims/{iccid}/usage", get(sims::get_usage))
        .route("/sims/{iccid}/purchase", post(purchases::purchase))
        .route("/sims/{iccid}/purchases", get(purchases::list_purchases))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
