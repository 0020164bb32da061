pub mod employee;
pub mod leave_request;
pub mod salary_request;
