//! Domain service for package purchases.

use crate::api::types::{PurchasePageDto, PurchaseRequest};
use crate::db::PurchaseOrder;
use crate::services::auth_service::CurrentUser;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PurchaseError {
    #[error("SIM {0} not found")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Transaction id {0} was already used for another SIM")]
    TransIdReused(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for PurchaseError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for PurchaseError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// A recorded order and whether it was created by this call.
#[derive(Debug, Clone)]
pub struct PurchaseReceipt {
    pub order: PurchaseOrder,
    pub replayed: bool,
}

#[async_trait::async_trait]
pub trait PurchaseService: Send + Sync {
    /// Records a package purchase, at most once per transaction id.
    ///
    /// A repeated `transid` returns the original order unchanged. When no
    /// `transid` is supplied one is generated.
    ///
    /// # Errors
    ///
    /// - [`PurchaseError::NotFound`] unless the caller owns `iccid`
    /// - [`PurchaseError::Validation`] for a bad month, package size or amount
    /// - [`PurchaseError::TransIdReused`] when `transid` belongs to another SIM
    async fn purchase(
        &self,
        user: &CurrentUser,
        iccid: &str,
        request: PurchaseRequest,
        transid: Option<String>,
    ) -> Result<PurchaseReceipt, PurchaseError>;

    /// Lists orders for an owned SIM, newest first.
    ///
    /// # Errors
    ///
    /// - [`PurchaseError::NotFound`] unless the caller owns `iccid`
    /// - [`PurchaseError::Validation`] for a malformed month
    async fn list(
        &self,
        user: &CurrentUser,
        iccid: &str,
        month: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> Result<PurchasePageDto, PurchaseError>;
}
