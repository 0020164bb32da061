use chrono::NaiveDate;

use crate::model::leave_request::LeaveStatus;

/// Short requests with the matching reason are approved on creation.
#[derive(Debug, Clone)]
pub struct AutoApprovalPolicy {
    pub max_days: i64,
    pub match_reason: String,
}

impl Default for AutoApprovalPolicy {
    fn default() -> Self {
        Self {
            max_days: 2,
            match_reason: "casual".to_string(),
        }
    }
}

impl AutoApprovalPolicy {
    pub fn initial_status(&self, days: i64, reason: &str) -> LeaveStatus {
        if days <= self.max_days && reason.trim().to_lowercase() == self.match_reason.to_lowercase() {
            LeaveStatus::Approved
        } else {
            LeaveStatus::Pending
        }
    }
}

#[derive(Debug, Clone)]
pub struct LeavePolicy {
    pub auto_approval: AutoApprovalPolicy,
    /// longest inclusive span one request may cover
    pub max_duration_days: i64,
    /// applies to both `reason` and `declineReason`
    pub max_text_len: usize,
}

impl Default for LeavePolicy {
    fn default() -> Self {
        Self {
            auto_approval: AutoApprovalPolicy::default(),
            max_duration_days: 30,
            max_text_len: 500,
        }
    }
}

/// Days considered by leave recommendations. `start: None` means today.
#[derive(Debug, Clone)]
pub struct RecommendationWindow {
    pub start: Option<NaiveDate>,
    pub days: u32,
    pub limit: usize,
}

impl Default for RecommendationWindow {
    fn default() -> Self {
        Self {
            start: None,
            days: 30,
            limit: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_approval_threshold() {
        let policy = AutoApprovalPolicy::default();
        assert_eq!(policy.initial_status(1, "casual"), LeaveStatus::Approved);
        assert_eq!(policy.initial_status(2, "Casual"), LeaveStatus::Approved);
        assert_eq!(policy.initial_status(2, " CASUAL "), LeaveStatus::Approved);
        assert_eq!(policy.initial_status(3, "casual"), LeaveStatus::Pending);
        assert_eq!(policy.initial_status(1, "casual trip"), LeaveStatus::Pending);
        assert_eq!(policy.initial_status(1, "sick"), LeaveStatus::Pending);
    }

    #[test]
    fn custom_policy() {
        let policy = AutoApprovalPolicy {
            max_days: 1,
            match_reason: "Doctor".into(),
        };
        assert_eq!(policy.initial_status(1, "doctor"), LeaveStatus::Approved);
        assert_eq!(policy.initial_status(2, "doctor"), LeaveStatus::Pending);
    }
}
