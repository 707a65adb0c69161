//! Domain primitives for SIM management.
//!
//! The persistence layer stores statuses and months as plain strings; these
//! types are the parsed forms the services work with.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a user account.
///
/// # Examples
///
/// ```rust
/// use iot_sim_ops::domain::UserId;
///
/// let id = UserId::new(7);
/// assert_eq!(id.value(), 7);
/// assert_eq!(id.to_string(), "7");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct UserId(i32);

impl UserId {
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for UserId {
    fn from(id: i32) -> Self {
        Self::new(id)
    }
}

impl From<UserId> for i32 {
    fn from(id: UserId) -> Self {
        id.0
    }
}

/// Lifecycle state of a SIM card.
///
/// `Deactivated` is terminal: no transition leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SimStatus {
    Active,
    Suspended,
    Deactivated,
}

impl SimStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Suspended => "SUSPENDED",
            Self::Deactivated => "DEACTIVATED",
        }
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Deactivated)
    }
}

impl fmt::Display for SimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(Self::Active),
            "SUSPENDED" => Ok(Self::Suspended),
            "DEACTIVATED" => Ok(Self::Deactivated),
            other => Err(format!("Unknown SIM status: {other}")),
        }
    }
}

/// Requested status change.
///
/// Only `SUSPEND` is recognised as a suspension; every other action, blank
/// included, resumes the SIM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusAction {
    Suspend,
    Resume(String),
}

impl StatusAction {
    /// Parses a client-supplied action, case-insensitively.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let action = raw.trim().to_ascii_uppercase();
        if action == "SUSPEND" {
            Self::Suspend
        } else {
            Self::Resume(action)
        }
    }

    #[must_use]
    pub const fn target(&self) -> SimStatus {
        match self {
            Self::Suspend => SimStatus::Suspended,
            Self::Resume(_) => SimStatus::Active,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Suspend => "SUSPEND",
            Self::Resume(action) => action,
        }
    }
}

/// Billing month in `YYYY-MM` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BillingMonth(String);

impl BillingMonth {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BillingMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for BillingMonth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let valid = trimmed.len() == 7
            && chrono::NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d").is_ok();

        if valid {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(format!("Invalid month: '{s}'. Expected format YYYY-MM"))
        }
    }
}

impl Serialize for BillingMonth {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}
