//! Nilestay Backend Server
//!
//! Property-management backend for a short-term-rental operation:
//! apartments, customers, bookings with the finance engine, service
//! catalog, expenses, staff accounts, audit logs, and reports.

use actix_cors::Cors;
use actix_web::{http::header, middleware, web, App, HttpResponse, HttpServer};
use anyhow::Context;
use nilestay_api::handlers::{
    configure_apartments, configure_audit, configure_auth, configure_bookings,
    configure_customers, configure_expenses, configure_reports, configure_services,
    configure_users,
};
use nilestay_auth::{JwtService, PasswordService};
use nilestay_core::AppConfig;
use nilestay_db::create_pool;
use std::env;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Health check endpoint
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "nilestay",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Configure API routes
fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            // Health check
            .route("/health", web::get().to(health_check))
            // Auth endpoints
            .configure(configure_auth)
            // Staff accounts (admin only)
            .configure(configure_users)
            // Audit log endpoints (admin only)
            .configure(configure_audit)
            // Unit inventory
            .configure(configure_apartments)
            // Guest records
            .configure(configure_customers)
            // Service catalog
            .configure(configure_services)
            // Bookings, calendar, finance preview
            .configure(configure_bookings)
            // Maintenance expenses
            .configure(configure_expenses)
            // Reports and exports
            .configure(configure_reports),
    );
}

/// Initialize tracing/logging
fn init_tracing() {
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "nilestay={},nilestay_api={},nilestay_db={},nilestay_services={},actix_web=info,sqlx=warn",
            log_level, log_level, log_level, log_level
        ))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    init_tracing();

    info!("Starting Nilestay backend v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    info!(
        "USD/EGP conversion rate: {}",
        config.finance.usd_to_egp_rate
    );

    // Create auth services
    let jwt_expiration_secs = config.auth.jwt_expiration_minutes * 60;
    let jwt_service = Arc::new(JwtService::new(&config.auth.jwt_secret, jwt_expiration_secs));
    let password_service = Arc::new(PasswordService::new());

    info!(
        "JWT service configured with {} second token expiration",
        jwt_expiration_secs
    );

    // CORS configuration
    let cors_origins = env::var("CORS_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string());

    info!("Connecting to database...");
    let pool = create_pool(
        &config.database.url,
        Some(config.database.max_connections),
    )
    .await
    .context("Failed to create database pool")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    info!("Database ready");

    let bind_addr = config.server_addr();
    let workers = config.server.workers.max(1);
    info!(
        "Starting HTTP server on {} with {} workers",
        bind_addr, workers
    );

    let app_config = config.clone();
    let jwt_service_clone = jwt_service.clone();
    let password_service_clone = password_service.clone();

    HttpServer::new(move || {
        // Configure CORS - clone cors_origins for each worker
        let cors_origins_inner = cors_origins.clone();
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _req_head| {
                let origins: Vec<&str> = cors_origins_inner.split(',').collect();
                if let Ok(origin_str) = origin.to_str() {
                    origins.iter().any(|o| o.trim() == origin_str)
                } else {
                    false
                }
            })
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                header::AUTHORIZATION,
                header::ACCEPT,
                header::CONTENT_TYPE,
                header::COOKIE,
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            // Shared state
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(app_config.clone()))
            .app_data(web::Data::new(jwt_service_clone.clone()))
            .app_data(web::Data::new(password_service_clone.clone()))
            // Middleware
            .wrap(cors)
            .wrap(middleware::Logger::new("%a \"%r\" %s %b %Dms"))
            .wrap(middleware::Compress::default())
            .wrap(middleware::NormalizePath::trim())
            .wrap(tracing_actix_web::TracingLogger::default())
            // Routes
            .configure(configure_routes)
            // Root redirect to health
            .route(
                "/",
                web::get().to(|| async {
                    HttpResponse::Found()
                        .append_header(("Location", "/api/v1/health"))
                        .finish()
                }),
            )
    })
    .workers(workers)
    .bind(&bind_addr)?
    .run()
    .await?;

    Ok(())
}
