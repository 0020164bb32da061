use crate::config::Config;
use crate::{auth::jwt::verify_token, model::role::Role};
use actix_web::{
    FromRequest, HttpMessage, HttpRequest, HttpResponse, ResponseError, dev::Payload,
    http::StatusCode, web::Data,
};
use derive_more::Display;
use futures::future::{Ready, ready};
use serde_json::json;

#[derive(Debug, Display)]
pub enum AuthError {
    #[display(fmt = "Missing Authorization header")]
    MissingToken,
    #[display(fmt = "Invalid or expired token")]
    InvalidToken,
    #[display(fmt = "HR/Admin only")]
    Forbidden,
    #[display(fmt = "Forbidden: Admin access required")]
    AdminOnly,
    #[display(fmt = "Invalid credentials")]
    InvalidCredentials,
    #[display(fmt = "{}", _0)]
    InvalidInput(String),
    #[display(fmt = "Email already registered")]
    EmailTaken,
    #[display(fmt = "Internal Server Error")]
    Internal,
}

impl std::error::Error for AuthError {}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingToken | AuthError::InvalidToken | AuthError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::Forbidden | AuthError::AdminOnly => StatusCode::FORBIDDEN,
            AuthError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AuthError::EmailTaken => StatusCode::CONFLICT,
            AuthError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "message": self.to_string()
        }))
    }
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    /// Decodes `Authorization: Bearer <jwt>`.
    pub fn from_bearer(req: &HttpRequest) -> Result<Self, AuthError> {
        let token = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .ok_or(AuthError::MissingToken)?;

        let config = req.app_data::<Data<Config>>().ok_or_else(|| {
            tracing::error!("Config missing from app data");
            AuthError::Internal
        })?;

        let claims = verify_token(token, &config.jwt_secret).map_err(|e| {
            tracing::debug!(error = %e, "Rejected bearer token");
            AuthError::InvalidToken
        })?;
        let role = Role::from_id(claims.role).ok_or(AuthError::InvalidToken)?;

        Ok(AuthUser {
            user_id: claims.user_id,
            email: claims.sub,
            role,
        })
    }

    pub fn require_hr_or_admin(&self) -> Result<(), AuthError> {
        if self.role.can_review_leave() {
            Ok(())
        } else {
            Err(AuthError::Forbidden)
        }
    }

    pub fn require_admin(&self) -> Result<(), AuthError> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(AuthError::AdminOnly)
        }
    }
}

impl FromRequest for AuthUser {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // the reviewer guard has already decoded the token on admin routes
        if let Some(user) = req.extensions().get::<AuthUser>() {
            return ready(Ok(user.clone()));
        }
        ready(AuthUser::from_bearer(req))
    }
}
