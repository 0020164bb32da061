use crate::auth::auth::AuthUser;
use crate::model::leave_request::{CreateLeave, LeaveRequest, LeaveStatus};
use crate::service::{LeaveService, query::parse_status_filter};
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmailQuery {
    /// Employee email
    #[param(example = "jane@company.com")]
    pub email: Option<String>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatusQuery {
    /// Filter by leave status (Pending, Approved, Declined)
    #[param(example = "Pending")]
    pub status: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeclineLeave {
    #[schema(example = "Team coverage is too thin that week")]
    pub decline_reason: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveEnvelope {
    #[schema(example = "Leave created successfully")]
    pub message: String,
    pub leave: LeaveRequest,
}

impl LeaveEnvelope {
    fn new(message: &str, leave: LeaveRequest) -> Self {
        Self {
            message: message.to_string(),
            leave,
        }
    }
}

/* =========================
Create leave request
========================= */
/// Submit a leave request. Short requests with the auto-approval reason are
/// approved immediately.
#[utoipa::path(
    post,
    path = "/api/leaves",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request created", body = LeaveEnvelope),
        (status = 400, description = "Missing or invalid fields", body = Object, example = json!({
            "message": "To date must be on or after from date"
        })),
        (status = 404, description = "Requester not registered", body = Object, example = json!({
            "message": "User not found"
        }))
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    service: web::Data<LeaveService>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<impl Responder> {
    let leave = service.create_leave(&payload).await?;

    Ok(HttpResponse::Created().json(LeaveEnvelope::new("Leave created successfully", leave)))
}

/// Leave requests of one employee, newest first
#[utoipa::path(
    get,
    path = "/api/leaves/by-email",
    params(EmailQuery),
    responses(
        (status = 200, description = "Leave requests for the email", body = [LeaveRequest]),
        (status = 400, description = "Missing or invalid email", body = Object, example = json!({
            "message": "Valid email is required"
        }))
    ),
    tag = "Leave"
)]
pub async fn leaves_by_email(
    service: web::Data<LeaveService>,
    query: web::Query<EmailQuery>,
) -> actix_web::Result<impl Responder> {
    let leaves = service.list_by_email(query.email.as_deref()).await?;
    Ok(HttpResponse::Ok().json(leaves))
}

/// Every leave request, optionally filtered by status
#[utoipa::path(
    get,
    path = "/api/leaves/all",
    params(StatusQuery),
    responses(
        (status = 200, description = "Leave requests, newest first", body = [LeaveRequest]),
        (status = 400, description = "Unknown status"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    service: web::Data<LeaveService>,
    query: web::Query<StatusQuery>,
) -> actix_web::Result<impl Responder> {
    let status = parse_status_filter(query.status.as_deref())?;
    let leaves = service.list_leaves(status).await?;
    Ok(HttpResponse::Ok().json(leaves))
}

/// Leave requests awaiting review
#[utoipa::path(
    get,
    path = "/api/leaves/pending",
    responses(
        (status = 200, description = "Pending leave requests, newest first", body = [LeaveRequest]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn pending_leaves(service: web::Data<LeaveService>) -> actix_web::Result<impl Responder> {
    let leaves = service.list_leaves(Some(LeaveStatus::Pending)).await?;
    Ok(HttpResponse::Ok().json(leaves))
}

/// Approved leave requests
#[utoipa::path(
    get,
    path = "/api/leaves/approved",
    responses(
        (status = 200, description = "Approved leave requests, newest first", body = [LeaveRequest]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn approved_leaves(service: web::Data<LeaveService>) -> actix_web::Result<impl Responder> {
    let leaves = service.list_leaves(Some(LeaveStatus::Approved)).await?;
    Ok(HttpResponse::Ok().json(leaves))
}

/// for getting a leave application details endpoint
#[utoipa::path(
    get,
    path = "/api/leaves/{leave_id}",
    params(
        ("leave_id" = String, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "message": "Leave not found"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    service: web::Data<LeaveService>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let leave = service.get_leave(&path).await?;
    Ok(HttpResponse::Ok().json(leave))
}

/* =========================
Approve leave (HR/Admin)
========================= */
/// Swagger doc for approve_leave endpoint
#[utoipa::path(
    put,
    path = "/api/leaves/approve/{leave_id}",
    params(
        ("leave_id" = String, Path, description = "ID of the leave request to approve")
    ),
    responses(
        (status = 200, description = "Leave approved", body = LeaveEnvelope),
        (status = 400, description = "Leave already approved", body = Object, example = json!({
            "message": "Leave is already approved"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Leave changed during the update")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    service: web::Data<LeaveService>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let leave = service.approve_leave(&path).await?;
    info!(leave_id = %leave.id, reviewer = %auth.email, reviewer_id = %auth.user_id, "Leave approved");

    Ok(HttpResponse::Ok().json(LeaveEnvelope::new("Leave approved successfully", leave)))
}

/* =========================
Decline leave (HR/Admin)
========================= */
/// Swagger doc for decline_leave endpoint
#[utoipa::path(
    put,
    path = "/api/leaves/decline/{leave_id}",
    params(
        ("leave_id" = String, Path, description = "ID of the leave request to decline")
    ),
    request_body = DeclineLeave,
    responses(
        (status = 200, description = "Leave declined", body = LeaveEnvelope),
        (status = 400, description = "Missing decline reason or already declined", body = Object, example = json!({
            "message": "Decline reason is required"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Leave changed during the update")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn decline_leave(
    auth: AuthUser,
    service: web::Data<LeaveService>,
    path: web::Path<String>,
    payload: Option<web::Json<DeclineLeave>>,
) -> actix_web::Result<impl Responder> {
    let reason = payload.as_ref().and_then(|p| p.decline_reason.as_deref());
    let leave = service.decline_leave(&path, reason).await?;
    info!(leave_id = %leave.id, reviewer = %auth.email, reviewer_id = %auth.user_id, "Leave declined");

    Ok(HttpResponse::Ok().json(LeaveEnvelope::new("Leave declined successfully", leave)))
}

/// Per-employee leave counters, most recently updated first
#[utoipa::path(
    get,
    path = "/api/leaves/employee-stats",
    params(EmailQuery),
    responses(
        (status = 200, description = "Employee statistics", body = [crate::model::employee_stats::EmployeeStatistics]),
        (status = 400, description = "Invalid email filter"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn employee_stats(
    service: web::Data<LeaveService>,
    query: web::Query<EmailQuery>,
) -> actix_web::Result<impl Responder> {
    let stats = service.list_employee_statistics(query.email.as_deref()).await?;
    Ok(HttpResponse::Ok().json(stats))
}

/// Suggested days off in the upcoming window
#[utoipa::path(
    get,
    path = "/api/leaves/recommendations",
    params(EmailQuery),
    responses(
        (status = 200, description = "Up to three recommended dates", body = [String], example = json!([
            "2026-05-03", "2026-05-05", "2026-05-06"
        ])),
        (status = 400, description = "Missing or invalid email")
    ),
    tag = "Leave"
)]
pub async fn recommendations(
    service: web::Data<LeaveService>,
    query: web::Query<EmailQuery>,
) -> actix_web::Result<impl Responder> {
    let days = service.recommend_leave_days(query.email.as_deref()).await?;
    Ok(HttpResponse::Ok().json(days))
}

/// Requested leave days per calendar month
#[utoipa::path(
    get,
    path = "/api/leaves/patterns",
    params(EmailQuery),
    responses(
        (status = 200, description = "Twelve monthly totals", body = [crate::service::query::MonthlyPattern]),
        (status = 400, description = "Missing or invalid email")
    ),
    tag = "Leave"
)]
pub async fn patterns(
    service: web::Data<LeaveService>,
    query: web::Query<EmailQuery>,
) -> actix_web::Result<impl Responder> {
    let patterns = service.analyze_leave_patterns(query.email.as_deref()).await?;
    Ok(HttpResponse::Ok().json(patterns))
}
