use crate::api::leave_request::{DeclineLeave, LeaveEnvelope};
use crate::api::salary_request::{
    ApproveSalaryRequest, CreateSalaryRequest, SalaryRequestApproved, SalaryRequestCreated,
};
use crate::model::employee::EmployeeProfile;
use crate::model::employee_stats::EmployeeStatistics;
use crate::model::leave_request::{CreateLeave, LeaveRequest, LeaveStatus};
use crate::model::role::Role;
use crate::model::salary_request::{SalaryRequest, SalaryRequestStatus};
use crate::models::{LoginReqDto, LoginResponse, RegisterReq};
use crate::service::query::MonthlyPattern;
use crate::service::salary::SalaryStatus;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leave Desk API",
        version = "1.0.0",
        description = r#"
## Leave Management Service

Employees submit leave requests; HR and administrators approve or decline them.
Every transition keeps the per-employee leave counters in step.

### 🔹 Key Features
- **Leave requests**
  - Submit single-day or multi-day requests, short casual leave is approved automatically
- **Review**
  - Approve or decline requests, with a reason required on decline
- **Reporting**
  - Per-employee counters, monthly leave patterns and suggested days off
- **Salary setup**
  - Employees ask for a salary to be set up, administrators approve

### 🔐 Security
Review and reporting endpoints for HR are protected using **JWT Bearer authentication**.
Only the **Admin** and **HR** roles may approve, decline or list every request.
Salary requests are listed and approved by the **Admin** role only.

### 📦 Response Format
- JSON-based RESTful responses
- Errors are returned as `{"message": "..."}`

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::routes::ping,

        crate::auth::handlers::register,
        crate::auth::handlers::login,

        crate::api::leave_request::create_leave,
        crate::api::leave_request::leaves_by_email,
        crate::api::leave_request::leave_list,
        crate::api::leave_request::pending_leaves,
        crate::api::leave_request::approved_leaves,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::decline_leave,
        crate::api::leave_request::employee_stats,
        crate::api::leave_request::recommendations,
        crate::api::leave_request::patterns,

        crate::api::salary_request::create_salary_request,
        crate::api::salary_request::salary_status,
        crate::api::salary_request::pending_salary_requests,
        crate::api::salary_request::approve_salary_request,

        crate::api::employee::find_employee
    ),
    components(
        schemas(
            LeaveStatus,
            LeaveRequest,
            CreateLeave,
            DeclineLeave,
            LeaveEnvelope,
            EmployeeStatistics,
            MonthlyPattern,
            EmployeeProfile,
            Role,
            RegisterReq,
            LoginReqDto,
            LoginResponse,
            SalaryRequestStatus,
            SalaryRequest,
            SalaryStatus,
            CreateSalaryRequest,
            ApproveSalaryRequest,
            SalaryRequestCreated,
            SalaryRequestApproved
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Leave", description = "Leave request and review APIs"),
        (name = "Salary", description = "Salary setup requests"),
        (name = "Employee", description = "Employee directory APIs"),
        (name = "Auth", description = "Registration and login"),
        (name = "Health", description = "Liveness probe"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_leave_routes_and_bearer_scheme() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/leaves"));
        assert!(doc.paths.paths.contains_key("/api/leaves/approve/{leave_id}"));
        assert!(doc.paths.paths.contains_key("/auth/login"));
        assert!(doc.paths.paths.contains_key("/api/salary-requests/approve/{request_id}"));

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
