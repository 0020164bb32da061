use crate::{
    api::{employee, leave_request, salary_request},
    auth::{
        handlers,
        middleware::{admin_middleware, reviewer_middleware},
    },
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{
    HttpRequest, HttpResponse, Responder, error,
    middleware::from_fn,
    web,
};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

/// Liveness probe
#[utoipa::path(
    get,
    path = "/ping",
    responses(
        (status = 200, description = "Service is up", body = Object, example = json!({
            "message": "PONG",
            "timestamp": "2026-05-01T08:00:00Z"
        }))
    ),
    tag = "Health"
)]
pub async fn ping() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "message": "PONG",
        "timestamp": Utc::now()
    }))
}

fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> error::Error {
    let response = HttpResponse::BadRequest().json(json!({ "message": err.to_string() }));
    error::InternalError::from_response(err, response).into()
}

fn query_error_handler(err: error::QueryPayloadError, _req: &HttpRequest) -> error::Error {
    let response = HttpResponse::BadRequest().json(json!({ "message": err.to_string() }));
    error::InternalError::from_response(err, response).into()
}

// Helper to build per-route limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let burst = requests_per_min.max(1);
    let per_ms = (60_000 / burst as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(burst)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .expect("burst and period are both non-zero");
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler));

    cfg.service(web::resource("/ping").route(web::get().to(ping)));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter)
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(register_limiter)
                    .route(web::post().to(handlers::register)),
            ),
    );

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(protected_limiter) // rate limiting
            // /users?email=
            .service(web::resource("/users").route(web::get().to(employee::find_employee)))
            .service(
                web::scope("/leaves")
                    // /leaves
                    .service(
                        web::resource("")
                            .route(web::post().to(leave_request::create_leave))
                            .route(web::get().to(leave_request::leaves_by_email)),
                    )
                    .service(
                        web::resource("/by-email")
                            .route(web::get().to(leave_request::leaves_by_email)),
                    )
                    .service(
                        web::resource("/recommendations")
                            .route(web::get().to(leave_request::recommendations)),
                    )
                    .service(web::resource("/patterns").route(web::get().to(leave_request::patterns)))
                    // HR/Admin only from here on
                    .service(
                        web::resource("/all")
                            .wrap(from_fn(reviewer_middleware))
                            .route(web::get().to(leave_request::leave_list)),
                    )
                    .service(
                        web::resource("/pending")
                            .wrap(from_fn(reviewer_middleware))
                            .route(web::get().to(leave_request::pending_leaves)),
                    )
                    .service(
                        web::resource("/approved")
                            .wrap(from_fn(reviewer_middleware))
                            .route(web::get().to(leave_request::approved_leaves)),
                    )
                    .service(
                        web::resource("/employee-stats")
                            .wrap(from_fn(reviewer_middleware))
                            .route(web::get().to(leave_request::employee_stats)),
                    )
                    // /leaves/approve/{id}
                    .service(
                        web::resource("/approve/{id}")
                            .wrap(from_fn(reviewer_middleware))
                            .route(web::put().to(leave_request::approve_leave)),
                    )
                    // /leaves/decline/{id}
                    .service(
                        web::resource("/decline/{id}")
                            .wrap(from_fn(reviewer_middleware))
                            .route(web::put().to(leave_request::decline_leave)),
                    )
                    // /leaves/{id} must stay last, it matches every single segment
                    .service(
                        web::resource("/{id}")
                            .wrap(from_fn(reviewer_middleware))
                            .route(web::get().to(leave_request::get_leave)),
                    ),
            )
            .service(
                web::scope("/salary-requests")
                    .service(
                        web::resource("")
                            .route(web::post().to(salary_request::create_salary_request)),
                    )
                    .service(
                        web::resource("/status").route(web::get().to(salary_request::salary_status)),
                    )
                    // Admin only
                    .service(
                        web::resource("/pending")
                            .wrap(from_fn(admin_middleware))
                            .route(web::get().to(salary_request::pending_salary_requests)),
                    )
                    .service(
                        web::resource("/approve/{id}")
                            .wrap(from_fn(admin_middleware))
                            .route(web::put().to(salary_request::approve_salary_request)),
                    ),
            ),
    );
}

// LOGIN
//  └─ access_token (ACCESS_TOKEN_TTL, 15 min by default)

// API REQUEST
//  └─ Authorization: Bearer access_token
//       └─ role Admin/Hr required on review routes
//       └─ role Admin required on salary administration
