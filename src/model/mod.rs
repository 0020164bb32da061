pub mod employee;
pub mod employee_stats;
pub mod leave_request;
pub mod role;
pub mod salary_request;
