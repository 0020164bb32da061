use crate::{
    auth::{
        auth::AuthError,
        jwt::generate_access_token,
        password::{hash_password, verify_password},
    },
    config::Config,
    model::{
        employee::{Employee, NOT_AVAILABLE, ProfileDetails},
        role::Role,
    },
    models::{LoginReqDto, LoginResponse, RegisterReq},
    store::{EmployeeDirectory, StoreError},
    utils::validation::{is_valid_email, non_blank},
};
use actix_web::{HttpResponse, Responder, web};
use chrono::Utc;
use serde_json::json;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

const MIN_PASSWORD_LEN: usize = 8;

fn or_not_available(value: Option<&str>) -> String {
    non_blank(value).unwrap_or(NOT_AVAILABLE).to_string()
}

/// Validates, hashes and stores a new directory entry.
pub async fn insert_account(
    directory: &dyn EmployeeDirectory,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
    details: ProfileDetails,
) -> Result<Employee, AuthError> {
    let name = name.trim();
    let email = email.trim();

    if name.is_empty() || email.is_empty() || password.is_empty() {
        return Err(AuthError::InvalidInput(
            "Name, email and password must not be empty".into(),
        ));
    }
    if !is_valid_email(email) {
        return Err(AuthError::InvalidInput("Invalid email format".into()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::InvalidInput(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let password_hash = hash_password(password).map_err(|e| {
        error!(error = %e, "Password hashing failed");
        AuthError::Internal
    })?;

    let employee = Employee {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        email: email.to_string(),
        role,
        position: or_not_available(details.position.as_deref()),
        department: or_not_available(details.department.as_deref()),
        phone: or_not_available(details.phone.as_deref()),
        password_hash,
        created_at: Utc::now(),
    };

    match directory.insert_employee(&employee).await {
        Ok(()) => Ok(employee),
        Err(StoreError::Duplicate) => Err(AuthError::EmailTaken),
        Err(e) => {
            error!(error = %e, "Failed to register employee");
            Err(AuthError::Internal)
        }
    }
}

/// Employee registration handler
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterReq,
    responses(
        (status = 201, description = "Employee registered", body = Object, example = json!({
            "message": "User registered successfully"
        })),
        (status = 400, description = "Invalid registration data"),
        (status = 409, description = "Email already registered")
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_register", skip(directory, user), fields(email = %user.email))]
pub async fn register(
    user: web::Json<RegisterReq>,
    directory: web::Data<dyn EmployeeDirectory>,
) -> actix_web::Result<impl Responder> {
    let directory: &dyn EmployeeDirectory = &**directory;

    let existing = directory.find_by_email(user.email.trim()).await.map_err(|e| {
        error!(error = %e, "Directory lookup failed");
        AuthError::Internal
    })?;
    if existing.is_some() {
        return Err(AuthError::EmailTaken.into());
    }

    let user = user.into_inner();
    let details = ProfileDetails {
        position: user.position,
        department: user.department,
        phone: user.phone,
    };
    let employee = insert_account(
        directory,
        &user.name,
        &user.email,
        &user.password,
        Role::Employee,
        details,
    )
    .await?;
    info!(user_id = %employee.id, "Employee registered");

    Ok(HttpResponse::Created().json(json!({
        "message": "User registered successfully"
    })))
}

/// Exchanges email and password for an access token
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Email or password missing"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_login", skip(directory, config, user), fields(email = %user.email))]
pub async fn login(
    user: web::Json<LoginReqDto>,
    directory: web::Data<dyn EmployeeDirectory>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    info!("Login request received");

    if user.email.trim().is_empty() || user.password.is_empty() {
        return Err(AuthError::InvalidInput("Email and password required".into()).into());
    }

    let employee = match directory.find_by_email(user.email.trim()).await {
        Ok(Some(employee)) => employee,
        Ok(None) => {
            info!("Invalid credentials: user not found");
            return Err(AuthError::InvalidCredentials.into());
        }
        Err(e) => {
            error!(error = %e, "Directory error while fetching user");
            return Err(AuthError::Internal.into());
        }
    };

    if let Err(e) = verify_password(&user.password, &employee.password_hash) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return Err(AuthError::InvalidCredentials.into());
    }

    debug!(user_id = %employee.id, "Generating access token");
    let access_token = generate_access_token(&employee, &config.jwt_secret, config.access_token_ttl)
        .map_err(|e| {
            error!(error = %e, "Token encoding failed");
            AuthError::Internal
        })?;

    info!("Login successful");
    Ok(HttpResponse::Ok().json(LoginResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: config.access_token_ttl,
    }))
}
