//! Persistence seams for leave records, employee statistics and the
//! employee directory.
//!
//! Every method that writes a leave record also writes the matching
//! statistics change, and implementations must apply both or neither.

use derive_more::Display;
use futures::future::BoxFuture;

use crate::model::{
    employee::Employee,
    employee_stats::EmployeeStatistics,
    leave_request::{LeaveQuery, LeaveRequest, LeaveTransition},
    salary_request::{SalaryApproval, SalaryRequest, SalaryRequestStatus},
};

pub mod memory;
pub mod mysql;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

#[derive(Debug, Display)]
pub enum StoreError {
    #[display(fmt = "database error: {}", _0)]
    Database(sqlx::Error),
    #[display(fmt = "duplicate key")]
    Duplicate,
    #[display(fmt = "corrupt row: {}", _0)]
    Corrupt(String),
    #[display(fmt = "store lock poisoned")]
    Poisoned,
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        // 23000 is MySQL's integrity-constraint class (duplicate key)
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.code().as_deref() == Some("23000") {
                return StoreError::Duplicate;
            }
        }
        StoreError::Database(e)
    }
}

pub trait LeaveStore: Send + Sync {
    /// Inserts a new record and counts it in the requester's statistics.
    fn insert_leave<'a>(
        &'a self,
        leave: &'a LeaveRequest,
        display_name: &'a str,
    ) -> BoxFuture<'a, Result<(), StoreError>>;

    fn find_leave<'a>(&'a self, id: &'a str)
    -> BoxFuture<'a, Result<Option<LeaveRequest>, StoreError>>;

    /// Applies the status change if the record still holds `change.from`,
    /// moving one count between the matching statistics counters.
    /// Returns `false` when nothing matched.
    fn transition_leave<'a>(
        &'a self,
        change: &'a LeaveTransition,
    ) -> BoxFuture<'a, Result<bool, StoreError>>;

    /// Matching records, newest first.
    fn list_leaves<'a>(
        &'a self,
        query: &'a LeaveQuery,
    ) -> BoxFuture<'a, Result<Vec<LeaveRequest>, StoreError>>;

    /// All statistics records, most recently updated first.
    fn list_statistics(&self) -> BoxFuture<'_, Result<Vec<EmployeeStatistics>, StoreError>>;

    fn find_statistics<'a>(
        &'a self,
        email: &'a str,
    ) -> BoxFuture<'a, Result<Option<EmployeeStatistics>, StoreError>>;
}

pub trait EmployeeDirectory: Send + Sync {
    fn find_by_email<'a>(&'a self, email: &'a str)
    -> BoxFuture<'a, Result<Option<Employee>, StoreError>>;

    /// Fails with [`StoreError::Duplicate`] when the email is taken.
    fn insert_employee<'a>(&'a self, employee: &'a Employee) -> BoxFuture<'a, Result<(), StoreError>>;
}

pub trait SalaryStore: Send + Sync {
    /// Fails with [`StoreError::Duplicate`] while the employee already has a
    /// pending request.
    fn insert_salary_request<'a>(
        &'a self,
        request: &'a SalaryRequest,
    ) -> BoxFuture<'a, Result<(), StoreError>>;

    fn find_pending_salary_request<'a>(
        &'a self,
        email: &'a str,
    ) -> BoxFuture<'a, Result<Option<SalaryRequest>, StoreError>>;

    /// Matching requests, newest first.
    fn list_salary_requests(
        &self,
        status: Option<SalaryRequestStatus>,
    ) -> BoxFuture<'_, Result<Vec<SalaryRequest>, StoreError>>;

    /// Marks the request approved and records the base salary when one is
    /// given. Returns `None` for an unknown id.
    fn approve_salary_request<'a>(
        &'a self,
        approval: &'a SalaryApproval,
    ) -> BoxFuture<'a, Result<Option<SalaryRequest>, StoreError>>;

    fn salary_for<'a>(&'a self, email: &'a str) -> BoxFuture<'a, Result<Option<f64>, StoreError>>;
}
