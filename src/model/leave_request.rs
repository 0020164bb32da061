use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum LeaveStatus {
    Pending,
    Approved,
    Declined,
}

impl LeaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveStatus::Pending => "Pending",
            LeaveStatus::Approved => "Approved",
            LeaveStatus::Declined => "Declined",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "id": "5b0c3c1e-8f0a-4d8e-9a55-0e5b8f1d2c11",
    "email": "jane@company.com",
    "from": "2026-01-10",
    "to": "2026-01-11",
    "reason": "casual",
    "oneDay": false,
    "status": "Approved",
    "declineReason": "",
    "createdAt": "2026-01-01T09:00:00Z",
    "updatedAt": "2026-01-01T09:00:00Z"
}))]
pub struct LeaveRequest {
    /// leave application id
    pub id: String,
    /// requester identity
    pub email: String,
    #[serde(rename = "from")]
    #[schema(value_type = String, format = "date")]
    pub from_date: NaiveDate,
    #[serde(rename = "to")]
    #[schema(value_type = String, format = "date")]
    pub to_date: NaiveDate,
    pub reason: String,
    pub one_day: bool,
    pub status: LeaveStatus,
    /// empty unless the request is declined
    pub decline_reason: String,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,
}

impl LeaveRequest {
    /// Inclusive number of calendar days the request covers.
    pub fn days(&self) -> i64 {
        if self.one_day {
            1
        } else {
            (self.to_date - self.from_date).num_days() + 1
        }
    }

    pub fn covers(&self, day: NaiveDate) -> bool {
        self.from_date <= day && day <= self.to_date
    }
}

/// A status change about to be written. The store applies it only while the
/// record still holds `from`.
#[derive(Debug, Clone)]
pub struct LeaveTransition {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub from: LeaveStatus,
    pub to: LeaveStatus,
    pub decline_reason: String,
    pub at: DateTime<Utc>,
}

/// Filter for leave listings. Empty fields match everything.
#[derive(Debug, Clone, Default)]
pub struct LeaveQuery {
    pub email: Option<String>,
    pub status: Option<LeaveStatus>,
}

impl LeaveQuery {
    pub fn matches(&self, leave: &LeaveRequest) -> bool {
        self.email.as_deref().is_none_or(|e| e == leave.email)
            && self.status.is_none_or(|s| s == leave.status)
    }
}

/// Leave application as submitted. Fields stay loose so validation can
/// report each problem in order.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeave {
    #[schema(example = "jane@company.com", format = "email")]
    pub email: Option<String>,
    #[schema(example = "2026-01-10", format = "date")]
    pub from: Option<String>,
    /// ignored for single-day requests
    #[schema(example = "2026-01-11", format = "date")]
    pub to: Option<String>,
    #[schema(example = "casual")]
    pub reason: Option<String>,
    #[schema(example = false)]
    pub one_day: Option<bool>,
}

impl CreateLeave {
    pub fn is_single_day(&self) -> bool {
        self.one_day.unwrap_or(false)
    }
}
