use serde::{Deserialize, Serialize};

use crate::db::PurchaseOrder;
use crate::domain::SimStatus;

/// Code carried by every successful response.
pub const SUCCESS_CODE: &str = "0";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Trace {
    pub transid: String,
}

/// Response envelope shared by every JSON endpoint.
///
/// `data` is always present in the body; it is `null` on errors.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: String,
    pub msg: String,
    pub data: Option<T>,
    pub trace: Trace,
}

impl<T> ApiResponse<T> {
    /// Successful response traced with the current request's transid.
    pub fn success(data: T) -> Self {
        Self::success_with_transid(data, super::trace::current_transid())
    }

    pub fn success_with_transid(data: T, transid: impl Into<String>) -> Self {
        Self {
            code: SUCCESS_CODE.to_string(),
            msg: "ok".to_string(),
            data: Some(data),
            trace: Trace {
                transid: transid.into(),
            },
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            msg: message.into(),
            data: None,
            trace: Trace {
                transid: super::trace::current_transid(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AliveDto {
    pub ok: bool,
    pub service: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct SimDto {
    pub iccid: String,
    pub imsi: String,
    pub msisdn: String,
    pub status: SimStatus,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct SimStatusDto {
    pub iccid: String,
    pub status: SimStatus,
}

#[derive(Debug, Deserialize)]
pub struct StatusChangeRequest {
    #[serde(default)]
    pub action: String,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct UsageDto {
    pub iccid: String,
    pub month: String,
    pub effective_total_mb: i64,
    pub used_mb: i64,
    pub remain_mb: i64,
    pub unit: String,
    pub last_update: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseRequest {
    pub month: String,
    pub package_mb: i64,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub pay_amount_cent: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct PurchasePageDto {
    pub items: Vec<PurchaseOrder>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub iccid: Option<String>,
    pub imsi: Option<String>,
    pub msisdn: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UsageQuery {
    pub month: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PurchasesQuery {
    pub month: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
