use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;
use std::sync::Arc;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod model;
mod models;
mod routes;
mod service;
mod store;
mod utils;

use config::Config;
use db::init_db;

use crate::auth::auth::AuthError;
use crate::auth::handlers::insert_account;
use crate::docs::ApiDoc;
use crate::model::{employee::ProfileDetails, role::Role};
use crate::service::LeaveService;
use crate::service::salary::SalaryService;
use crate::store::{EmployeeDirectory, LeaveStore, MemoryStore, MySqlStore, SalaryStore};
use crate::utils::directory_cache::CachedDirectory;
use tracing::{error, info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

/// Creates the configured admin account unless it already exists.
async fn bootstrap_admin(config: &Config, directory: &dyn EmployeeDirectory) {
    let Some(admin) = &config.bootstrap_admin else {
        return;
    };

    let account = insert_account(
        directory,
        &admin.name,
        &admin.email,
        &admin.password,
        Role::Admin,
        ProfileDetails::default(),
    );
    match account.await {
        Ok(employee) => info!(user_id = %employee.id, email = %employee.email, "Bootstrap admin created"),
        Err(AuthError::EmailTaken) => info!(email = %admin.email, "Bootstrap admin already present"),
        Err(e) => error!(error = %e, "Failed to create bootstrap admin"),
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let (leaves, salaries, employees): (
        Arc<dyn LeaveStore>,
        Arc<dyn SalaryStore>,
        Arc<dyn EmployeeDirectory>,
    ) = match &config.database_url {
        Some(url) => {
            let pool = init_db(url).await.context("database initialisation failed")?;
            let store = Arc::new(MySqlStore::new(pool));
            let leaves: Arc<dyn LeaveStore> = store.clone();
            let salaries: Arc<dyn SalaryStore> = store.clone();
            let employees: Arc<dyn EmployeeDirectory> = store;
            (leaves, salaries, employees)
        }
        None => {
            warn!("DATABASE_URL not set, leave data is kept in memory only");
            let store = Arc::new(MemoryStore::new());
            let leaves: Arc<dyn LeaveStore> = store.clone();
            let salaries: Arc<dyn SalaryStore> = store.clone();
            let employees: Arc<dyn EmployeeDirectory> = store;
            (leaves, salaries, employees)
        }
    };

    let directory: Arc<dyn EmployeeDirectory> =
        Arc::new(CachedDirectory::new(employees, config.directory_cache_ttl));

    bootstrap_admin(&config, directory.as_ref()).await;

    let leave_service = Data::new(LeaveService::new(
        leaves,
        directory.clone(),
        config.leave_policy(),
        config.workload_scorer(),
        config.recommendation_window(),
    ));
    let salary_service = Data::new(SalaryService::new(salaries, directory.clone()));
    let directory_data: Data<dyn EmployeeDirectory> = Data::from(directory);

    // Clone values for the closure (avoid move issues)
    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    info!(addr = %server_addr, prefix = %config.api_prefix, "Binding HTTP server");

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(leave_service.clone())
            .app_data(salary_service.clone())
            .app_data(directory_data.clone())
            .app_data(Data::new(config.clone()))
            // Configure auth + api routes with rate limiting
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(&server_addr)
    .with_context(|| format!("failed to bind {server_addr}"))?
    .run()
    .await?;

    Ok(())
}
