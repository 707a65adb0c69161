use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use crate::services::{AuthError, PurchaseError, SimError};

#[derive(Debug)]
pub enum ApiError {
    Unauthenticated(String),

    Forbidden(String),

    NotFound(String),

    ValidationError(String),

    TransIdReused(String),

    InvalidState(String),

    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated(msg) => write!(f, "Unauthenticated: {msg}"),
            Self::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            Self::TransIdReused(msg) => write!(f, "Transaction id reused: {msg}"),
            Self::InvalidState(msg) => write!(f, "Invalid state: {msg}"),
            Self::InternalError(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Stable application code carried in the response envelope.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated(_) => "E_UNAUTHENTICATED",
            Self::Forbidden(_) => "E_FORBIDDEN",
            Self::NotFound(_) => "E_NOT_FOUND",
            Self::ValidationError(_) => "E_INVALID_ARGUMENT",
            Self::TransIdReused(_) => "E_TRANSID_REUSED",
            Self::InvalidState(_) => "E_STATUS_NOT_ALLOWED",
            Self::InternalError(_) => "E_INTERNAL",
        }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError(_) | Self::TransIdReused(_) => StatusCode::BAD_REQUEST,
            Self::InvalidState(_) => StatusCode::CONFLICT,
            Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }

    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
            Self::Unauthenticated(msg)
            | Self::Forbidden(msg)
            | Self::NotFound(msg)
            | Self::ValidationError(msg)
            | Self::TransIdReused(msg)
            | Self::InvalidState(msg) => msg.clone(),
        };

        let body = ApiResponse::<()>::error(self.code(), message);
        (self.status(), Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::ValidationError(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::ValidationError(format!("Invalid query string: {}", rejection.body_text()))
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::Unauthenticated("invalid credential".to_string()),
            AuthError::InvalidToken => Self::Unauthenticated(err.to_string()),
            AuthError::AccountDisabled => Self::Forbidden(err.to_string()),
            AuthError::Validation(msg) => Self::ValidationError(msg),
            AuthError::Database(msg) | AuthError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl From<SimError> for ApiError {
    fn from(err: SimError) -> Self {
        match err {
            SimError::NotFound(_) | SimError::UsageNotFound { .. } => {
                Self::NotFound(err.to_string())
            }
            SimError::InvalidState { .. } => Self::InvalidState(err.to_string()),
            SimError::Validation(msg) => Self::ValidationError(msg),
            SimError::Database(msg) => Self::InternalError(msg),
        }
    }
}

impl From<PurchaseError> for ApiError {
    fn from(err: PurchaseError) -> Self {
        match err {
            PurchaseError::NotFound(_) => Self::NotFound(err.to_string()),
            PurchaseError::Validation(msg) => Self::ValidationError(msg),
            PurchaseError::TransIdReused(_) => Self::TransIdReused(err.to_string()),
            PurchaseError::Database(msg) => Self::InternalError(msg),
        }
    }
}
