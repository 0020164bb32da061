use chrono::Utc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{LeaveError, LeaveService};
use crate::model::{
    employee::display_name_for,
    leave_request::{CreateLeave, LeaveRequest, LeaveStatus, LeaveTransition},
};
use crate::utils::validation::{is_valid_email, non_blank, parse_calendar_date};

const BAD_DATE: &str = "Invalid date format. Expected format: YYYY-MM-DD";

impl LeaveService {
    /// Validates and stores a new leave request, counting it in the
    /// requester's statistics. Checks run in a fixed order and nothing is
    /// written unless all of them pass.
    #[instrument(
        name = "leave_create",
        skip(self, input),
        fields(email = input.email.as_deref().unwrap_or_default())
    )]
    pub async fn create_leave(&self, input: &CreateLeave) -> Result<LeaveRequest, LeaveError> {
        let (Some(email), Some(from), Some(reason)) = (
            non_blank(input.email.as_deref()),
            non_blank(input.from.as_deref()),
            non_blank(input.reason.as_deref()),
        ) else {
            return Err(LeaveError::invalid("Email, from date, and reason are required"));
        };

        if !is_valid_email(email) {
            return Err(LeaveError::invalid("Invalid email format"));
        }

        let one_day = input.is_single_day();
        let to = if one_day {
            None
        } else {
            Some(
                non_blank(input.to.as_deref())
                    .ok_or_else(|| LeaveError::invalid("To date is required for multi-day leaves"))?,
            )
        };

        let from_date = parse_calendar_date(from).ok_or_else(|| LeaveError::invalid(BAD_DATE))?;
        let to_date = match to {
            Some(to) => parse_calendar_date(to).ok_or_else(|| LeaveError::invalid(BAD_DATE))?,
            None => from_date,
        };

        let employee = self
            .directory
            .find_by_email(email)
            .await?
            .ok_or_else(|| LeaveError::NotFound("User not found".to_string()))?;

        if to_date < from_date {
            return Err(LeaveError::invalid("To date must be on or after from date"));
        }

        let days = (to_date - from_date).num_days() + 1;
        if days > self.policy.max_duration_days {
            return Err(LeaveError::invalid(format!(
                "Leave duration cannot exceed {} days",
                self.policy.max_duration_days
            )));
        }

        if reason.chars().count() > self.policy.max_text_len {
            return Err(LeaveError::invalid(format!(
                "Reason cannot exceed {} characters",
                self.policy.max_text_len
            )));
        }

        let now = Utc::now();
        let leave = LeaveRequest {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            from_date,
            to_date,
            reason: reason.to_string(),
            one_day,
            status: self.policy.auto_approval.initial_status(days, reason),
            decline_reason: String::new(),
            created_at: now,
            updated_at: now,
        };

        self.store
            .insert_leave(&leave, &employee.display_name())
            .await?;

        info!(leave_id = %leave.id, status = %leave.status, days, "Leave request created");
        Ok(leave)
    }

    pub async fn get_leave(&self, id: &str) -> Result<LeaveRequest, LeaveError> {
        self.store
            .find_leave(id)
            .await?
            .ok_or_else(|| LeaveError::NotFound("Leave not found".to_string()))
    }

    #[instrument(name = "leave_approve", skip(self))]
    pub async fn approve_leave(&self, id: &str) -> Result<LeaveRequest, LeaveError> {
        let leave = self.get_leave(id).await?;
        if leave.status == LeaveStatus::Approved {
            return Err(LeaveError::AlreadyInState(LeaveStatus::Approved));
        }

        self.transition(leave, LeaveStatus::Approved, String::new())
            .await
    }

    #[instrument(name = "leave_decline", skip(self, decline_reason))]
    pub async fn decline_leave(
        &self,
        id: &str,
        decline_reason: Option<&str>,
    ) -> Result<LeaveRequest, LeaveError> {
        let decline_reason = non_blank(decline_reason)
            .ok_or_else(|| LeaveError::invalid("Decline reason is required"))?;
        if decline_reason.chars().count() > self.policy.max_text_len {
            return Err(LeaveError::invalid(format!(
                "Decline reason cannot exceed {} characters",
                self.policy.max_text_len
            )));
        }

        let leave = self.get_leave(id).await?;
        if leave.status == LeaveStatus::Declined {
            return Err(LeaveError::AlreadyInState(LeaveStatus::Declined));
        }

        self.transition(leave, LeaveStatus::Declined, decline_reason.to_string())
            .await
    }

    async fn transition(
        &self,
        mut leave: LeaveRequest,
        to: LeaveStatus,
        decline_reason: String,
    ) -> Result<LeaveRequest, LeaveError> {
        let display_name = match self.directory.find_by_email(&leave.email).await? {
            Some(employee) => employee.display_name(),
            None => display_name_for(&leave.email, None),
        };

        let change = LeaveTransition {
            id: leave.id.clone(),
            email: leave.email.clone(),
            display_name,
            from: leave.status,
            to,
            decline_reason,
            at: Utc::now(),
        };

        if !self.store.transition_leave(&change).await? {
            warn!(leave_id = %change.id, from = %change.from, to = %change.to, "Leave status changed underneath transition");
            return Err(LeaveError::Conflict);
        }

        leave.status = change.to;
        leave.decline_reason = change.decline_reason;
        leave.updated_at = change.at;

        info!(leave_id = %leave.id, from = %change.from, to = %leave.status, "Leave status changed");
        Ok(leave)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::service::test_support::service;
    use crate::store::LeaveStore;

    fn request(from: &str, to: Option<&str>, reason: &str, one_day: bool) -> CreateLeave {
        CreateLeave {
            email: Some("a@b.com".into()),
            from: Some(from.into()),
            to: to.map(Into::into),
            reason: Some(reason.into()),
            one_day: Some(one_day),
        }
    }

    #[actix_web::test]
    async fn two_day_casual_leave_is_auto_approved() {
        let (service, store) = service().await;

        let leave = service
            .create_leave(&request("2025-01-10", Some("2025-01-11"), "casual", false))
            .await
            .unwrap();
        assert_eq!(leave.status, LeaveStatus::Approved);
        assert_eq!(leave.days(), 2);

        let stats = store.find_statistics("a@b.com").await.unwrap().unwrap();
        assert_eq!(stats.approved_count, 1);
        assert_eq!(stats.pending_count, 0);
        assert_eq!(stats.display_name, "Alice");
    }

    #[actix_web::test]
    async fn three_day_casual_leave_stays_pending() {
        let (service, _) = service().await;

        let leave = service
            .create_leave(&request("2025-01-10", Some("2025-01-12"), "CASUAL", false))
            .await
            .unwrap();
        assert_eq!(leave.status, LeaveStatus::Pending);
    }

    #[actix_web::test]
    async fn single_day_ignores_submitted_to() {
        let (service, _) = service().await;

        let leave = service
            .create_leave(&request("2025-01-10", Some("2025-03-01"), "family event", true))
            .await
            .unwrap();
        assert_eq!(leave.status, LeaveStatus::Pending);
        assert_eq!(leave.to_date, leave.from_date);
        assert_eq!(leave.to_date, NaiveDate::from_ymd_opt(2025, 1, 10).unwrap());
    }

    #[actix_web::test]
    async fn creation_validation_order() {
        let (service, store) = service().await;

        let missing_reason = CreateLeave {
            reason: Some("   ".into()),
            ..request("2025-01-10", None, "", true)
        };
        let cases = [
            (missing_reason, "Email, from date, and reason are required"),
            (
                CreateLeave {
                    email: Some("not-an-email".into()),
                    ..request("2025-01-10", None, "x", true)
                },
                "Invalid email format",
            ),
            (
                request("2025-01-10", None, "x", false),
                "To date is required for multi-day leaves",
            ),
            (request("2025-13-01", None, "x", true), BAD_DATE),
            (request("2025-01-10", Some("soon"), "x", false), BAD_DATE),
            (
                request("2025-01-10", Some("2025-01-09"), "x", false),
                "To date must be on or after from date",
            ),
            (
                request("2025-01-01", Some("2025-02-15"), "x", false),
                "Leave duration cannot exceed 30 days",
            ),
        ];

        for (input, message) in cases {
            match service.create_leave(&input).await {
                Err(LeaveError::InvalidInput(m)) => assert_eq!(m, message),
                other => panic!("expected InvalidInput({message}), got {other:?}"),
            }
        }

        assert!(store.list_leaves(&Default::default()).await.unwrap().is_empty());
        assert!(store.find_statistics("a@b.com").await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn unknown_requester_is_not_found() {
        let (service, _) = service().await;

        let input = CreateLeave {
            email: Some("ghost@b.com".into()),
            ..request("2025-01-10", None, "casual", true)
        };
        assert!(matches!(
            service.create_leave(&input).await,
            Err(LeaveError::NotFound(_))
        ));
    }

    #[actix_web::test]
    async fn overlong_reason_is_rejected() {
        let (service, _) = service().await;

        let reason = "x".repeat(501);
        assert!(matches!(
            service.create_leave(&request("2025-01-10", None, &reason, true)).await,
            Err(LeaveError::InvalidInput(_))
        ));
    }

    #[actix_web::test]
    async fn approve_pending_moves_one_count() {
        let (service, store) = service().await;
        let leave = service
            .create_leave(&request("2025-01-10", Some("2025-01-15"), "vacation", false))
            .await
            .unwrap();

        let approved = service.approve_leave(&leave.id).await.unwrap();
        assert_eq!(approved.status, LeaveStatus::Approved);
        assert_eq!(approved.decline_reason, "");

        let stats = store.find_statistics("a@b.com").await.unwrap().unwrap();
        assert_eq!((stats.approved_count, stats.pending_count), (1, 0));
    }

    #[actix_web::test]
    async fn approving_twice_changes_nothing() {
        let (service, store) = service().await;
        let leave = service
            .create_leave(&request("2025-01-10", None, "casual", true))
            .await
            .unwrap();
        let before = store.find_statistics("a@b.com").await.unwrap().unwrap();

        let err = service.approve_leave(&leave.id).await.unwrap_err();
        assert!(matches!(err, LeaveError::AlreadyInState(LeaveStatus::Approved)));
        assert_eq!(err.to_string(), "Leave is already approved");

        let after = store.find_statistics("a@b.com").await.unwrap().unwrap();
        assert_eq!(before, after);
        assert_eq!(store.find_leave(&leave.id).await.unwrap().unwrap(), leave);
    }

    #[actix_web::test]
    async fn decline_then_approve_clears_reason() {
        let (service, store) = service().await;
        let leave = service
            .create_leave(&request("2025-01-10", None, "dentist", true))
            .await
            .unwrap();

        let declined = service
            .decline_leave(&leave.id, Some("  team offsite  "))
            .await
            .unwrap();
        assert_eq!(declined.status, LeaveStatus::Declined);
        assert_eq!(declined.decline_reason, "team offsite");

        let approved = service.approve_leave(&leave.id).await.unwrap();
        assert_eq!(approved.decline_reason, "");
        assert_eq!(store.find_leave(&leave.id).await.unwrap().unwrap(), approved);

        let stats = store.find_statistics("a@b.com").await.unwrap().unwrap();
        assert_eq!(
            (stats.approved_count, stats.declined_count, stats.pending_count),
            (1, 0, 0)
        );
    }

    #[actix_web::test]
    async fn counter_sum_matches_record_count() {
        let (service, store) = service().await;
        let mut ids = Vec::new();
        for reason in ["casual", "vacation", "dentist"] {
            let leave = service
                .create_leave(&request("2025-02-03", None, reason, true))
                .await
                .unwrap();
            ids.push(leave.id);
        }
        service.decline_leave(&ids[0], Some("coverage")).await.unwrap();
        service.approve_leave(&ids[1]).await.unwrap();
        service.decline_leave(&ids[1], Some("changed plans")).await.unwrap();

        let stats = store.find_statistics("a@b.com").await.unwrap().unwrap();
        assert_eq!(stats.total(), 3);
        assert_eq!(
            (stats.approved_count, stats.declined_count, stats.pending_count),
            (0, 2, 1)
        );
    }

    #[actix_web::test]
    async fn decline_without_reason_changes_nothing() {
        let (service, store) = service().await;
        let leave = service
            .create_leave(&request("2025-01-10", None, "dentist", true))
            .await
            .unwrap();

        for reason in [None, Some(""), Some("   ")] {
            assert!(matches!(
                service.decline_leave(&leave.id, reason).await,
                Err(LeaveError::InvalidInput(_))
            ));
        }
        assert_eq!(store.find_leave(&leave.id).await.unwrap().unwrap(), leave);
    }

    #[actix_web::test]
    async fn declining_twice_is_rejected() {
        let (service, _) = service().await;
        let leave = service
            .create_leave(&request("2025-01-10", None, "dentist", true))
            .await
            .unwrap();
        service.decline_leave(&leave.id, Some("no")).await.unwrap();

        assert!(matches!(
            service.decline_leave(&leave.id, Some("still no")).await,
            Err(LeaveError::AlreadyInState(LeaveStatus::Declined))
        ));
    }

    #[actix_web::test]
    async fn unknown_id_is_not_found() {
        let (service, _) = service().await;

        assert!(matches!(
            service.approve_leave("missing").await,
            Err(LeaveError::NotFound(_))
        ));
        assert!(matches!(
            service.decline_leave("missing", Some("no")).await,
            Err(LeaveError::NotFound(_))
        ));
    }

    #[actix_web::test]
    async fn stale_prior_status_is_a_conflict() {
        let (service, store) = service().await;
        let leave = service
            .create_leave(&request("2025-01-10", None, "dentist", true))
            .await
            .unwrap();
        // another reviewer got there first
        service.approve_leave(&leave.id).await.unwrap();

        let stale = LeaveTransition {
            id: leave.id.clone(),
            email: leave.email.clone(),
            display_name: "Alice".into(),
            from: LeaveStatus::Pending,
            to: LeaveStatus::Declined,
            decline_reason: "late".into(),
            at: Utc::now(),
        };
        assert!(!store.transition_leave(&stale).await.unwrap());

        let stats = store.find_statistics("a@b.com").await.unwrap().unwrap();
        assert_eq!(
            (stats.approved_count, stats.declined_count, stats.pending_count),
            (1, 0, 0)
        );
    }
}
