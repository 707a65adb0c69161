//! Domain service for SIM lookups, status transitions and usage.
//!
//! Every per-SIM operation passes the ownership gate first: a SIM that does
//! not exist and a SIM held by someone else are reported the same way.

use crate::api::types::{SimDto, SimStatusDto, UsageDto};
use crate::db::SimSearch;
use crate::domain::SimStatus;
use crate::services::auth_service::CurrentUser;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("SIM {0} not found")]
    NotFound(String),

    #[error("SIM {iccid} is {status}; status change not allowed")]
    InvalidState { iccid: String, status: SimStatus },

    #[error("No usage recorded for SIM {iccid} in {month}")]
    UsageNotFound { iccid: String, month: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for SimError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for SimError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait SimService: Send + Sync {
    /// Finds the caller's SIM matching every supplied identifier.
    ///
    /// # Errors
    ///
    /// - [`SimError::Validation`] when no criterion is given
    /// - [`SimError::NotFound`] when nothing owned by the caller matches
    async fn search(&self, user: &CurrentUser, criteria: SimSearch) -> Result<SimDto, SimError>;

    /// # Errors
    ///
    /// Returns [`SimError::NotFound`] unless the caller owns `iccid`.
    async fn get_status(&self, user: &CurrentUser, iccid: &str)
    -> Result<SimStatusDto, SimError>;

    /// Applies a `SUSPEND`/`RESUME` style action.
    ///
    /// # Errors
    ///
    /// - [`SimError::Validation`] for an empty action
    /// - [`SimError::NotFound`] unless the caller owns `iccid`
    /// - [`SimError::InvalidState`] when the SIM is deactivated
    async fn change_status(
        &self,
        user: &CurrentUser,
        iccid: &str,
        action: &str,
    ) -> Result<SimStatusDto, SimError>;

    /// Usage for a billing month, including purchased packages.
    ///
    /// # Errors
    ///
    /// - [`SimError::Validation`] for a missing or malformed month
    /// - [`SimError::NotFound`] unless the caller owns `iccid`
    /// - [`SimError::UsageNotFound`] when the month has no usage record
    async fn get_usage(
        &self,
        user: &CurrentUser,
        iccid: &str,
        month: &str,
    ) -> Result<UsageDto, SimError>;
}
