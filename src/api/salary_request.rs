use crate::auth::auth::AuthUser;
use crate::model::salary_request::SalaryRequest;
use crate::service::salary::{SalaryService, SalaryStatus};
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSalaryRequest {
    #[schema(example = "jane@company.com", format = "email")]
    pub employee_email: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApproveSalaryRequest {
    /// recorded as the employee's base salary when present
    #[schema(example = 52000.0)]
    pub base_salary: Option<f64>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SalaryStatusQuery {
    /// Employee email
    #[param(example = "jane@company.com")]
    pub email: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalaryRequestCreated {
    #[schema(example = "Salary request created successfully")]
    pub message: String,
    pub salary_request: SalaryRequest,
}

#[derive(Serialize, ToSchema)]
pub struct SalaryRequestApproved {
    #[schema(example = "Salary request approved")]
    pub message: String,
    pub request: SalaryRequest,
}

/// Ask HR to set up a salary. One pending request per employee.
#[utoipa::path(
    post,
    path = "/api/salary-requests",
    request_body = CreateSalaryRequest,
    responses(
        (status = 201, description = "Salary request created", body = SalaryRequestCreated),
        (status = 400, description = "Pending request exists or email invalid", body = Object, example = json!({
            "message": "A pending salary request already exists"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Employee not registered", body = Object, example = json!({
            "message": "User not found"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Salary"
)]
pub async fn create_salary_request(
    auth: AuthUser,
    service: web::Data<SalaryService>,
    payload: web::Json<CreateSalaryRequest>,
) -> actix_web::Result<impl Responder> {
    let request = service.create_request(payload.employee_email.as_deref()).await?;
    info!(request_id = %request.id, requested_by = %auth.email, "Salary request submitted");

    Ok(HttpResponse::Created().json(SalaryRequestCreated {
        message: "Salary request created successfully".to_string(),
        salary_request: request,
    }))
}

/// Whether a salary is set for the employee and whether a request is pending
#[utoipa::path(
    get,
    path = "/api/salary-requests/status",
    params(SalaryStatusQuery),
    responses(
        (status = 200, description = "Salary setup status", body = SalaryStatus, example = json!({
            "isSalarySet": false,
            "requestStatus": "pending"
        })),
        (status = 400, description = "Missing or invalid email"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Salary"
)]
pub async fn salary_status(
    _auth: AuthUser,
    service: web::Data<SalaryService>,
    query: web::Query<SalaryStatusQuery>,
) -> actix_web::Result<impl Responder> {
    let status = service.salary_status(query.email.as_deref()).await?;
    Ok(HttpResponse::Ok().json(status))
}

/// Salary requests awaiting approval, newest first
#[utoipa::path(
    get,
    path = "/api/salary-requests/pending",
    responses(
        (status = 200, description = "Pending salary requests", body = [SalaryRequest]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only", body = Object, example = json!({
            "message": "Forbidden: Admin access required"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Salary"
)]
pub async fn pending_salary_requests(
    service: web::Data<SalaryService>,
) -> actix_web::Result<impl Responder> {
    let requests = service.pending_requests().await?;
    Ok(HttpResponse::Ok().json(requests))
}

/* =========================
Approve salary request (Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/salary-requests/approve/{request_id}",
    params(
        ("request_id" = String, Path, description = "ID of the salary request to approve")
    ),
    request_body = ApproveSalaryRequest,
    responses(
        (status = 200, description = "Salary request approved", body = SalaryRequestApproved),
        (status = 400, description = "Base salary not positive"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Salary request not found", body = Object, example = json!({
            "message": "Salary request not found"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Salary"
)]
pub async fn approve_salary_request(
    auth: AuthUser,
    service: web::Data<SalaryService>,
    path: web::Path<String>,
    payload: Option<web::Json<ApproveSalaryRequest>>,
) -> actix_web::Result<impl Responder> {
    let base_salary = payload.as_ref().and_then(|p| p.base_salary);
    let request = service.approve_request(&path, base_salary).await?;
    info!(request_id = %request.id, approver = %auth.email, approver_id = %auth.user_id, "Salary request approved");

    Ok(HttpResponse::Ok().json(SalaryRequestApproved {
        message: "Salary request approved".to_string(),
        request,
    }))
}
