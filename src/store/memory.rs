use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use futures::future::{BoxFuture, FutureExt, ready};

use super::{EmployeeDirectory, LeaveStore, SalaryStore, StoreError};
use crate::model::{
    employee::Employee,
    employee_stats::{EmployeeStatistics, StatsDelta},
    leave_request::{LeaveQuery, LeaveRequest, LeaveTransition},
    salary_request::{SalaryApproval, SalaryRequest, SalaryRequestStatus},
};

#[derive(Default)]
struct State {
    /// insertion order
    leaves: Vec<LeaveRequest>,
    stats: HashMap<String, EmployeeStatistics>,
    employees: HashMap<String, Employee>,
    /// insertion order
    salary_requests: Vec<SalaryRequest>,
    /// base salary by email
    salaries: HashMap<String, f64>,
}

/// Process-local store used when no database is configured, and by tests.
/// One write lock covers the leave record and its statistics.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, StoreError> {
        self.state.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, StoreError> {
        self.state.write().map_err(|_| StoreError::Poisoned)
    }

    fn bump_stats(state: &mut State, email: &str, display_name: &str, delta: StatsDelta, at: chrono::DateTime<chrono::Utc>) {
        let stats = state
            .stats
            .entry(email.to_string())
            .or_insert_with(|| EmployeeStatistics::empty(email, display_name, at));
        stats.display_name = display_name.to_string();
        stats.apply(delta, at);
    }
}

impl LeaveStore for MemoryStore {
    fn insert_leave<'a>(
        &'a self,
        leave: &'a LeaveRequest,
        display_name: &'a str,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        let result = self.write().and_then(|mut state| {
            if state.leaves.iter().any(|l| l.id == leave.id) {
                return Err(StoreError::Duplicate);
            }
            state.leaves.push(leave.clone());
            Self::bump_stats(
                &mut state,
                &leave.email,
                display_name,
                StatsDelta::created(leave.status),
                leave.created_at,
            );
            Ok(())
        });
        ready(result).boxed()
    }

    fn find_leave<'a>(
        &'a self,
        id: &'a str,
    ) -> BoxFuture<'a, Result<Option<LeaveRequest>, StoreError>> {
        let result = self
            .read()
            .map(|state| state.leaves.iter().find(|l| l.id == id).cloned());
        ready(result).boxed()
    }

    fn transition_leave<'a>(
        &'a self,
        change: &'a LeaveTransition,
    ) -> BoxFuture<'a, Result<bool, StoreError>> {
        let result = self.write().map(|mut state| {
            let Some(leave) = state
                .leaves
                .iter_mut()
                .find(|l| l.id == change.id && l.status == change.from)
            else {
                return false;
            };
            leave.status = change.to;
            leave.decline_reason = change.decline_reason.clone();
            leave.updated_at = change.at;

            Self::bump_stats(
                &mut state,
                &change.email,
                &change.display_name,
                StatsDelta::transition(change.from, change.to),
                change.at,
            );
            true
        });
        ready(result).boxed()
    }

    fn list_leaves<'a>(
        &'a self,
        query: &'a LeaveQuery,
    ) -> BoxFuture<'a, Result<Vec<LeaveRequest>, StoreError>> {
        let result = self.read().map(|state| {
            // newest insert first, so equal timestamps keep a stable order
            let mut leaves: Vec<LeaveRequest> = state
                .leaves
                .iter()
                .rev()
                .filter(|l| query.matches(l))
                .cloned()
                .collect();
            leaves.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            leaves
        });
        ready(result).boxed()
    }

    fn list_statistics(&self) -> BoxFuture<'_, Result<Vec<EmployeeStatistics>, StoreError>> {
        let result = self.read().map(|state| {
            let mut stats: Vec<EmployeeStatistics> = state.stats.values().cloned().collect();
            stats.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.email.cmp(&b.email)));
            stats
        });
        ready(result).boxed()
    }

    fn find_statistics<'a>(
        &'a self,
        email: &'a str,
    ) -> BoxFuture<'a, Result<Option<EmployeeStatistics>, StoreError>> {
        let result = self.read().map(|state| state.stats.get(email).cloned());
        ready(result).boxed()
    }
}

impl EmployeeDirectory for MemoryStore {
    fn find_by_email<'a>(
        &'a self,
        email: &'a str,
    ) -> BoxFuture<'a, Result<Option<Employee>, StoreError>> {
        let result = self.read().map(|state| state.employees.get(email).cloned());
        ready(result).boxed()
    }

    fn insert_employee<'a>(&'a self, employee: &'a Employee) -> BoxFuture<'a, Result<(), StoreError>> {
        let result = self.write().and_then(|mut state| {
            if state.employees.contains_key(&employee.email) {
                return Err(StoreError::Duplicate);
            }
            state
                .employees
                .insert(employee.email.clone(), employee.clone());
            Ok(())
        });
        ready(result).boxed()
    }
}

impl SalaryStore for MemoryStore {
    fn insert_salary_request<'a>(
        &'a self,
        request: &'a SalaryRequest,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        let result = self.write().and_then(|mut state| {
            let pending_exists = state.salary_requests.iter().any(|r| {
                r.employee_email == request.employee_email && r.status == SalaryRequestStatus::Pending
            });
            if pending_exists || state.salary_requests.iter().any(|r| r.id == request.id) {
                return Err(StoreError::Duplicate);
            }
            state.salary_requests.push(request.clone());
            Ok(())
        });
        ready(result).boxed()
    }

    fn find_pending_salary_request<'a>(
        &'a self,
        email: &'a str,
    ) -> BoxFuture<'a, Result<Option<SalaryRequest>, StoreError>> {
        let result = self.read().map(|state| {
            state
                .salary_requests
                .iter()
                .find(|r| r.employee_email == email && r.status == SalaryRequestStatus::Pending)
                .cloned()
        });
        ready(result).boxed()
    }

    fn list_salary_requests(
        &self,
        status: Option<SalaryRequestStatus>,
    ) -> BoxFuture<'_, Result<Vec<SalaryRequest>, StoreError>> {
        let result = self.read().map(|state| {
            let mut requests: Vec<SalaryRequest> = state
                .salary_requests
                .iter()
                .rev()
                .filter(|r| status.is_none_or(|s| r.status == s))
                .cloned()
                .collect();
            requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            requests
        });
        ready(result).boxed()
    }

    fn approve_salary_request<'a>(
        &'a self,
        approval: &'a SalaryApproval,
    ) -> BoxFuture<'a, Result<Option<SalaryRequest>, StoreError>> {
        let result = self.write().map(|mut state| {
            let request = state
                .salary_requests
                .iter_mut()
                .find(|r| r.id == approval.id)?;
            request.status = SalaryRequestStatus::Approved;
            request.updated_at = approval.at;
            let request = request.clone();

            if let Some(amount) = approval.base_salary {
                state.salaries.insert(request.employee_email.clone(), amount);
            }
            Some(request)
        });
        ready(result).boxed()
    }

    fn salary_for<'a>(&'a self, email: &'a str) -> BoxFuture<'a, Result<Option<f64>, StoreError>> {
        let result = self.read().map(|state| state.salaries.get(email).copied());
        ready(result).boxed()
    }
}
