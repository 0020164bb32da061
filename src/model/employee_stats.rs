use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::leave_request::LeaveStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "email": "jane@company.com",
    "name": "Jane Doe",
    "approved": 3,
    "declined": 1,
    "pending": 0,
    "updatedAt": "2026-01-01T09:00:00Z"
}))]
pub struct EmployeeStatistics {
    pub email: String,
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(rename = "approved")]
    pub approved_count: i64,
    #[serde(rename = "declined")]
    pub declined_count: i64,
    #[serde(rename = "pending")]
    pub pending_count: i64,
    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,
}

impl EmployeeStatistics {
    pub fn empty(email: &str, display_name: &str, at: DateTime<Utc>) -> Self {
        Self {
            email: email.to_string(),
            display_name: display_name.to_string(),
            approved_count: 0,
            declined_count: 0,
            pending_count: 0,
            updated_at: at,
        }
    }

    pub fn total(&self) -> i64 {
        self.approved_count + self.declined_count + self.pending_count
    }

    /// Applies a counter change. Counters never go below zero.
    pub fn apply(&mut self, delta: StatsDelta, at: DateTime<Utc>) {
        self.approved_count = (self.approved_count + delta.approved).max(0);
        self.declined_count = (self.declined_count + delta.declined).max(0);
        self.pending_count = (self.pending_count + delta.pending).max(0);
        self.updated_at = at;
    }
}

/// Signed change to an employee's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsDelta {
    pub approved: i64,
    pub declined: i64,
    pub pending: i64,
}

impl StatsDelta {
    fn bump(&mut self, status: LeaveStatus, by: i64) {
        match status {
            LeaveStatus::Approved => self.approved += by,
            LeaveStatus::Declined => self.declined += by,
            LeaveStatus::Pending => self.pending += by,
        }
    }

    /// A new record counted in its initial state.
    pub fn created(status: LeaveStatus) -> Self {
        let mut delta = Self::default();
        delta.bump(status, 1);
        delta
    }

    /// Moves one record from `from` to `to`, so the counter sum is unchanged.
    pub fn transition(from: LeaveStatus, to: LeaveStatus) -> Self {
        let mut delta = Self::default();
        delta.bump(from, -1);
        delta.bump(to, 1);
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_between_decided_states_keeps_sum() {
        let now = Utc::now();
        let mut stats = EmployeeStatistics::empty("a@b.com", "a", now);
        stats.apply(StatsDelta::created(LeaveStatus::Pending), now);
        stats.apply(StatsDelta::transition(LeaveStatus::Pending, LeaveStatus::Approved), now);
        stats.apply(StatsDelta::transition(LeaveStatus::Approved, LeaveStatus::Declined), now);

        assert_eq!(stats.approved_count, 0);
        assert_eq!(stats.declined_count, 1);
        assert_eq!(stats.pending_count, 0);
        assert_eq!(stats.total(), 1);
    }

    #[test]
    fn counters_do_not_go_negative() {
        let now = Utc::now();
        let mut stats = EmployeeStatistics::empty("a@b.com", "a", now);
        stats.apply(StatsDelta::transition(LeaveStatus::Pending, LeaveStatus::Declined), now);

        assert_eq!(stats.pending_count, 0);
        assert_eq!(stats.declined_count, 1);
    }
}
