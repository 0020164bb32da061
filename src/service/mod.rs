//! Leave lifecycle and reporting over the store traits.

use std::sync::Arc;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

use crate::model::leave_request::LeaveStatus;
use crate::store::{EmployeeDirectory, LeaveStore, StoreError};

pub mod lifecycle;
pub mod policy;
pub mod query;
pub mod salary;
pub mod scoring;

use policy::{LeavePolicy, RecommendationWindow};
use scoring::WorkloadScorer;

#[derive(Debug, Display)]
pub enum LeaveError {
    #[display(fmt = "{}", _0)]
    InvalidInput(String),
    #[display(fmt = "{}", _0)]
    NotFound(String),
    #[display(fmt = "Leave is already {}", "_0.as_str().to_lowercase()")]
    AlreadyInState(LeaveStatus),
    #[display(fmt = "Leave was modified concurrently, reload and retry")]
    Conflict,
    #[display(fmt = "Internal Server Error")]
    Storage(StoreError),
}

impl std::error::Error for LeaveError {}

impl LeaveError {
    pub fn invalid(message: impl Into<String>) -> Self {
        LeaveError::InvalidInput(message.into())
    }
}

impl From<StoreError> for LeaveError {
    fn from(e: StoreError) -> Self {
        LeaveError::Storage(e)
    }
}

impl ResponseError for LeaveError {
    fn status_code(&self) -> StatusCode {
        match self {
            LeaveError::InvalidInput(_) | LeaveError::AlreadyInState(_) => StatusCode::BAD_REQUEST,
            LeaveError::NotFound(_) => StatusCode::NOT_FOUND,
            LeaveError::Conflict => StatusCode::CONFLICT,
            LeaveError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let LeaveError::Storage(e) = self {
            tracing::error!(error = %e, "Leave store failure");
        }
        HttpResponse::build(self.status_code()).json(json!({
            "message": self.to_string()
        }))
    }
}

/// Lifecycle and query operations share one service value, registered as
/// `web::Data<LeaveService>`.
pub struct LeaveService {
    store: Arc<dyn LeaveStore>,
    directory: Arc<dyn EmployeeDirectory>,
    policy: LeavePolicy,
    scorer: Arc<dyn WorkloadScorer>,
    window: RecommendationWindow,
}

impl LeaveService {
    pub fn new(
        store: Arc<dyn LeaveStore>,
        directory: Arc<dyn EmployeeDirectory>,
        policy: LeavePolicy,
        scorer: Arc<dyn WorkloadScorer>,
        window: RecommendationWindow,
    ) -> Self {
        Self {
            store,
            directory,
            policy,
            scorer,
            window,
        }
    }
}
