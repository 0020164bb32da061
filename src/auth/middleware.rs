use crate::auth::auth::AuthUser;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, ResponseError,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
};

/// Gate for leave review routes: a valid bearer token with the Admin or HR
/// role. The decoded [`AuthUser`] is left in request extensions.
pub async fn reviewer_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let checked = AuthUser::from_bearer(req.request())
        .and_then(|user| user.require_hr_or_admin().map(|_| user));

    let auth_user = match checked {
        Ok(user) => user,
        Err(e) => {
            tracing::info!(path = %req.path(), error = %e, "Reviewer route rejected");
            let resp = e.error_response();
            return Ok(req.into_response(resp));
        }
    };

    req.extensions_mut().insert(auth_user);

    next.call(req).await
}

/// Gate for salary administration: a valid bearer token with the Admin role.
pub async fn admin_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let checked = AuthUser::from_bearer(req.request()).and_then(|user| user.require_admin().map(|_| user));

    let auth_user = match checked {
        Ok(user) => user,
        Err(e) => {
            tracing::info!(path = %req.path(), error = %e, "Admin route rejected");
            return Ok(req.into_response(e.error_response()));
        }
    };

    req.extensions_mut().insert(auth_user);

    next.call(req).await
}
