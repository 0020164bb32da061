use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, instrument};
use utoipa::ToSchema;

use super::{LeaveError, LeaveService};
use crate::model::{
    employee_stats::EmployeeStatistics,
    leave_request::{LeaveQuery, LeaveRequest, LeaveStatus},
};
use crate::utils::validation::{is_valid_email, non_blank};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MonthlyPattern {
    /// 1 = January
    #[schema(example = 3)]
    pub month: u32,
    #[schema(example = 4)]
    pub days: i64,
}

fn require_email(email: Option<&str>) -> Result<&str, LeaveError> {
    non_blank(email)
        .filter(|e| is_valid_email(e))
        .ok_or_else(|| LeaveError::invalid("Valid email is required"))
}

/// Case-insensitive status filter; blank means no filter.
pub fn parse_status_filter(value: Option<&str>) -> Result<Option<LeaveStatus>, LeaveError> {
    non_blank(value)
        .map(|s| {
            LeaveStatus::from_str(s).map_err(|_| {
                LeaveError::invalid(format!(
                    "Invalid status {s:?}. Allowed: Pending, Approved, Declined"
                ))
            })
        })
        .transpose()
}

impl LeaveService {
    pub async fn list_by_email(&self, email: Option<&str>) -> Result<Vec<LeaveRequest>, LeaveError> {
        let email = require_email(email)?;
        let query = LeaveQuery {
            email: Some(email.to_string()),
            status: None,
        };
        Ok(self.store.list_leaves(&query).await?)
    }

    /// Every leave request, or only those in `status`.
    pub async fn list_leaves(
        &self,
        status: Option<LeaveStatus>,
    ) -> Result<Vec<LeaveRequest>, LeaveError> {
        let query = LeaveQuery {
            email: None,
            status,
        };
        Ok(self.store.list_leaves(&query).await?)
    }

    /// All statistics, or the one record for `email` when given.
    pub async fn list_employee_statistics(
        &self,
        email: Option<&str>,
    ) -> Result<Vec<EmployeeStatistics>, LeaveError> {
        match non_blank(email) {
            None => Ok(self.store.list_statistics().await?),
            Some(_) => {
                let email = require_email(email)?;
                Ok(self.store.find_statistics(email).await?.into_iter().collect())
            }
        }
    }

    /// Up to `window.limit` days in the window whose baseline workload plus
    /// the requester's existing leave stays below 1, earliest first.
    #[instrument(name = "leave_recommend", skip(self))]
    pub async fn recommend_leave_days(&self, email: Option<&str>) -> Result<Vec<NaiveDate>, LeaveError> {
        let email = require_email(email)?;
        let leaves = self.list_by_email(Some(email)).await?;
        let start = self.window.start.unwrap_or_else(|| Utc::now().date_naive());

        let days: Vec<NaiveDate> = (0..u64::from(self.window.days))
            .filter_map(|offset| start.checked_add_days(Days::new(offset)))
            .filter(|day| {
                let booked = leaves.iter().filter(|l| l.covers(*day)).count() as f64;
                self.scorer.workload(*day) + booked < 1.0
            })
            .take(self.window.limit)
            .collect();

        debug!(%start, found = days.len(), "Leave recommendations computed");
        Ok(days)
    }

    /// Requested leave days per month of the start date, all twelve months.
    pub async fn analyze_leave_patterns(&self, email: Option<&str>) -> Result<Vec<MonthlyPattern>, LeaveError> {
        let leaves = self.list_by_email(email).await?;

        let mut totals = [0i64; 12];
        for leave in &leaves {
            totals[leave.from_date.month0() as usize] += leave.days();
        }

        Ok(totals
            .iter()
            .zip(1u32..)
            .map(|(&days, month)| MonthlyPattern { month, days })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::model::leave_request::CreateLeave;
    use crate::service::policy::{LeavePolicy, RecommendationWindow};
    use crate::service::scoring::FlatWorkload;
    use crate::service::test_support::{employee, service};
    use crate::model::role::Role;
    use crate::store::{EmployeeDirectory, MemoryStore};

    fn leave(email: &str, from: &str, to: Option<&str>, reason: &str) -> CreateLeave {
        CreateLeave {
            email: Some(email.into()),
            from: Some(from.into()),
            to: to.map(Into::into),
            reason: Some(reason.into()),
            one_day: Some(to.is_none()),
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[actix_web::test]
    async fn listings_are_newest_first_and_filtered() {
        let (service, _) = service().await;
        let first = service.create_leave(&leave("a@b.com", "2025-01-10", None, "casual")).await.unwrap();
        let second = service.create_leave(&leave("a@b.com", "2025-02-10", None, "dentist")).await.unwrap();

        let mine = service.list_by_email(Some("a@b.com")).await.unwrap();
        assert_eq!(
            mine.iter().map(|l| l.id.as_str()).collect::<Vec<_>>(),
            vec![second.id.as_str(), first.id.as_str()]
        );

        let pending = service.list_leaves(Some(LeaveStatus::Pending)).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, second.id);

        assert_eq!(service.list_leaves(None).await.unwrap().len(), 2);
        assert!(service.list_by_email(Some("other@b.com")).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn email_queries_require_valid_email() {
        let (service, _) = service().await;

        for email in [None, Some(""), Some("nope")] {
            assert!(matches!(
                service.list_by_email(email).await,
                Err(LeaveError::InvalidInput(_))
            ));
            assert!(matches!(
                service.analyze_leave_patterns(email).await,
                Err(LeaveError::InvalidInput(_))
            ));
            assert!(matches!(
                service.recommend_leave_days(email).await,
                Err(LeaveError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn status_filter_parsing() {
        assert_eq!(parse_status_filter(None).unwrap(), None);
        assert_eq!(parse_status_filter(Some(" ")).unwrap(), None);
        assert_eq!(
            parse_status_filter(Some("pending")).unwrap(),
            Some(LeaveStatus::Pending)
        );
        assert!(parse_status_filter(Some("cancelled")).is_err());
    }

    #[actix_web::test]
    async fn statistics_newest_first_with_optional_filter() {
        let (service, store) = service().await;
        store
            .insert_employee(&employee("Bob", "bob@b.com", Role::Employee))
            .await
            .unwrap();
        service.create_leave(&leave("a@b.com", "2025-01-10", None, "casual")).await.unwrap();
        service.create_leave(&leave("bob@b.com", "2025-01-10", None, "casual")).await.unwrap();

        let all = service.list_employee_statistics(None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].updated_at >= all[1].updated_at);

        let bob = service.list_employee_statistics(Some("bob@b.com")).await.unwrap();
        assert_eq!(bob.len(), 1);
        assert_eq!(bob[0].display_name, "Bob");

        assert!(
            service
                .list_employee_statistics(Some("nobody@b.com"))
                .await
                .unwrap()
                .is_empty()
        );
        assert!(service.list_employee_statistics(Some("bad")).await.is_err());
    }

    #[actix_web::test]
    async fn patterns_always_have_twelve_months() {
        let (service, _) = service().await;

        let empty = service.analyze_leave_patterns(Some("a@b.com")).await.unwrap();
        assert_eq!(empty.len(), 12);
        assert!(empty.iter().all(|p| p.days == 0));
        assert_eq!(empty.first().map(|p| p.month), Some(1));
        assert_eq!(empty.last().map(|p| p.month), Some(12));
    }

    #[actix_web::test]
    async fn patterns_bucket_by_start_month() {
        let (service, _) = service().await;
        service.create_leave(&leave("a@b.com", "2025-03-30", Some("2025-04-02"), "trip")).await.unwrap();
        service.create_leave(&leave("a@b.com", "2025-03-05", None, "dentist")).await.unwrap();
        service.create_leave(&leave("a@b.com", "2024-12-24", Some("2024-12-26"), "holiday")).await.unwrap();

        let patterns = service.analyze_leave_patterns(Some("a@b.com")).await.unwrap();
        assert_eq!(patterns[2], MonthlyPattern { month: 3, days: 5 });
        assert_eq!(patterns[3].days, 0);
        assert_eq!(patterns[11], MonthlyPattern { month: 12, days: 3 });
    }

    #[actix_web::test]
    async fn recommendations_skip_booked_days() {
        let (service, _) = service().await;
        service.create_leave(&leave("a@b.com", "2025-05-01", Some("2025-05-02"), "trip")).await.unwrap();
        service.create_leave(&leave("a@b.com", "2025-05-04", None, "dentist")).await.unwrap();

        let days = service.recommend_leave_days(Some("a@b.com")).await.unwrap();
        assert_eq!(days, vec![date("2025-05-03"), date("2025-05-05"), date("2025-05-06")]);
    }

    #[actix_web::test]
    async fn busy_baseline_yields_no_recommendations() {
        let store = Arc::new(MemoryStore::new());
        let service = LeaveService::new(
            store.clone(),
            store.clone(),
            LeavePolicy::default(),
            Arc::new(FlatWorkload(1.0)),
            RecommendationWindow::default(),
        );

        let days = service.recommend_leave_days(Some("a@b.com")).await.unwrap();
        assert!(days.is_empty());
    }
}
