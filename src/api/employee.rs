use crate::{
    api::leave_request::EmailQuery,
    auth::auth::{AuthError, AuthUser},
    model::employee::EmployeeProfile,
    store::EmployeeDirectory,
    utils::validation::{is_valid_email, non_blank},
};
use actix_web::{HttpResponse, Responder, web};
use serde_json::json;
use tracing::error;

/// Look up a registered employee by email
#[utoipa::path(
    get,
    path = "/api/users",
    params(EmailQuery),
    responses(
        (status = 200, description = "Employee found", body = EmployeeProfile),
        (status = 400, description = "Missing or invalid email"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "User not found"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Employee"
)]
pub async fn find_employee(
    _auth: AuthUser,
    directory: web::Data<dyn EmployeeDirectory>,
    query: web::Query<EmailQuery>,
) -> actix_web::Result<impl Responder> {
    let email = non_blank(query.email.as_deref())
        .filter(|e| is_valid_email(e))
        .ok_or_else(|| AuthError::InvalidInput("Valid email is required".into()))?;

    let employee = directory.find_by_email(email).await.map_err(|e| {
        error!(error = %e, "Directory lookup failed");
        AuthError::Internal
    })?;

    match employee {
        Some(employee) => Ok(HttpResponse::Ok().json(EmployeeProfile::from(employee))),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "User not found"
        }))),
    }
}
