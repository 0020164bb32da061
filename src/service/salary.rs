//! Salary setup requests: an employee asks once, an administrator approves.

use std::sync::Arc;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use chrono::Utc;
use derive_more::Display;
use serde::Serialize;
use serde_json::json;
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::model::salary_request::{SalaryApproval, SalaryRequest, SalaryRequestStatus};
use crate::store::{EmployeeDirectory, SalaryStore, StoreError};
use crate::utils::validation::{is_valid_email, non_blank};

const PENDING_EXISTS: &str = "A pending salary request already exists";

#[derive(Debug, Display)]
pub enum SalaryError {
    #[display(fmt = "{}", _0)]
    InvalidInput(String),
    #[display(fmt = "{}", _0)]
    NotFound(String),
    #[display(fmt = "Internal Server Error")]
    Storage(StoreError),
}

impl std::error::Error for SalaryError {}

impl From<StoreError> for SalaryError {
    fn from(e: StoreError) -> Self {
        SalaryError::Storage(e)
    }
}

impl ResponseError for SalaryError {
    fn status_code(&self) -> StatusCode {
        match self {
            SalaryError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            SalaryError::NotFound(_) => StatusCode::NOT_FOUND,
            SalaryError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let SalaryError::Storage(e) = self {
            tracing::error!(error = %e, "Salary store failure");
        }
        HttpResponse::build(self.status_code()).json(json!({
            "message": self.to_string()
        }))
    }
}

/// Answer to "has my salary been set up, and am I still waiting?"
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalaryStatus {
    pub is_salary_set: bool,
    /// `pending` while a request awaits approval, otherwise null
    pub request_status: Option<SalaryRequestStatus>,
}

/// Registered as `web::Data<SalaryService>`.
pub struct SalaryService {
    store: Arc<dyn SalaryStore>,
    directory: Arc<dyn EmployeeDirectory>,
}

impl SalaryService {
    pub fn new(store: Arc<dyn SalaryStore>, directory: Arc<dyn EmployeeDirectory>) -> Self {
        Self { store, directory }
    }

    fn checked_email(email: Option<&str>) -> Result<&str, SalaryError> {
        non_blank(email)
            .filter(|e| is_valid_email(e))
            .ok_or_else(|| SalaryError::InvalidInput("Valid email is required".to_string()))
    }

    /// At most one pending request per employee.
    #[instrument(name = "salary_request_create", skip(self))]
    pub async fn create_request(&self, email: Option<&str>) -> Result<SalaryRequest, SalaryError> {
        let email = Self::checked_email(email)?;

        self.directory
            .find_by_email(email)
            .await?
            .ok_or_else(|| SalaryError::NotFound("User not found".to_string()))?;

        if self.store.find_pending_salary_request(email).await?.is_some() {
            return Err(SalaryError::InvalidInput(PENDING_EXISTS.to_string()));
        }

        let request = SalaryRequest::pending(email, Utc::now());
        match self.store.insert_salary_request(&request).await {
            Ok(()) => {}
            // lost a race with another submission for the same email
            Err(StoreError::Duplicate) => {
                return Err(SalaryError::InvalidInput(PENDING_EXISTS.to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        info!(request_id = %request.id, "Salary request created");
        Ok(request)
    }

    pub async fn salary_status(&self, email: Option<&str>) -> Result<SalaryStatus, SalaryError> {
        let email = Self::checked_email(email)?;

        let salary = self.store.salary_for(email).await?;
        let pending = self.store.find_pending_salary_request(email).await?;

        Ok(SalaryStatus {
            is_salary_set: salary.is_some_and(|s| s > 0.0),
            request_status: pending.map(|r| r.status),
        })
    }

    pub async fn pending_requests(&self) -> Result<Vec<SalaryRequest>, SalaryError> {
        Ok(self
            .store
            .list_salary_requests(Some(SalaryRequestStatus::Pending))
            .await?)
    }

    /// Approves the request whatever its current status. A positive
    /// `base_salary` is recorded for the employee.
    #[instrument(name = "salary_request_approve", skip(self))]
    pub async fn approve_request(
        &self,
        id: &str,
        base_salary: Option<f64>,
    ) -> Result<SalaryRequest, SalaryError> {
        if let Some(amount) = base_salary {
            if !amount.is_finite() || amount <= 0.0 {
                return Err(SalaryError::InvalidInput(
                    "Base salary must be a positive amount".to_string(),
                ));
            }
        }

        let approval = SalaryApproval {
            id: id.to_string(),
            base_salary,
            at: Utc::now(),
        };
        let request = self
            .store
            .approve_salary_request(&approval)
            .await?
            .ok_or_else(|| SalaryError::NotFound("Salary request not found".to_string()))?;

        info!(request_id = %request.id, email = %request.employee_email, "Salary request approved");
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::role::Role;
    use crate::service::test_support::employee;
    use crate::store::MemoryStore;

    async fn service() -> (SalaryService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        store
            .insert_employee(&employee("Alice", "a@b.com", Role::Employee))
            .await
            .unwrap();
        (SalaryService::new(store.clone(), store.clone()), store)
    }

    #[actix_web::test]
    async fn second_pending_request_is_rejected() {
        let (service, store) = service().await;

        let first = service.create_request(Some("a@b.com")).await.unwrap();
        assert_eq!(first.status, SalaryRequestStatus::Pending);

        let err = service.create_request(Some("a@b.com")).await.unwrap_err();
        assert!(matches!(err, SalaryError::InvalidInput(_)));
        assert_eq!(err.to_string(), "A pending salary request already exists");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let pending = store
            .list_salary_requests(Some(SalaryRequestStatus::Pending))
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
    }

    #[actix_web::test]
    async fn store_refuses_second_pending_row() {
        let (_, store) = service().await;
        let at = Utc::now();

        store
            .insert_salary_request(&SalaryRequest::pending("a@b.com", at))
            .await
            .unwrap();
        let err = store
            .insert_salary_request(&SalaryRequest::pending("a@b.com", at))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate));
    }

    #[actix_web::test]
    async fn new_request_allowed_after_approval() {
        let (service, _) = service().await;

        let first = service.create_request(Some("a@b.com")).await.unwrap();
        service.approve_request(&first.id, None).await.unwrap();

        let second = service.create_request(Some("a@b.com")).await.unwrap();
        assert_ne!(first.id, second.id);
    }

    #[actix_web::test]
    async fn unknown_employee_and_bad_email() {
        let (service, _) = service().await;

        let err = service.create_request(Some("ghost@b.com")).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "User not found");

        let err = service.create_request(Some("not-an-email")).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = service.create_request(None).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn status_follows_request_and_salary() {
        let (service, _) = service().await;

        let status = service.salary_status(Some("a@b.com")).await.unwrap();
        assert!(!status.is_salary_set);
        assert_eq!(status.request_status, None);

        let request = service.create_request(Some("a@b.com")).await.unwrap();
        let status = service.salary_status(Some("a@b.com")).await.unwrap();
        assert_eq!(status.request_status, Some(SalaryRequestStatus::Pending));

        let approved = service.approve_request(&request.id, Some(52_000.0)).await.unwrap();
        assert_eq!(approved.status, SalaryRequestStatus::Approved);

        let status = service.salary_status(Some("a@b.com")).await.unwrap();
        assert!(status.is_salary_set);
        assert_eq!(status.request_status, None);
        assert!(service.pending_requests().await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn approve_rejects_missing_request_and_bad_amount() {
        let (service, _) = service().await;

        let err = service.approve_request("nope", None).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Salary request not found");

        let request = service.create_request(Some("a@b.com")).await.unwrap();
        let err = service.approve_request(&request.id, Some(-1.0)).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(service.pending_requests().await.unwrap().len(), 1);
    }
}
