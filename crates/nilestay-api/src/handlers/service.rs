//! Catalog service management handlers

use crate::dto::{ApiResponse, PaginationParams, ServiceRequest, ServiceResponse};
use actix_web::{web, HttpResponse};
use nilestay_auth::AuthenticatedUser;
use nilestay_core::models::{AuditLogBuilder, Permission};
use nilestay_core::traits::{PaginatedResponse, Repository};
use nilestay_core::AppError;
use nilestay_db::PgServiceRepository;
use sqlx::PgPool;
use tracing::{debug, info, instrument};
use validator::Validate;

/// List catalog services
#[instrument(skip(pool, _user, query))]
pub async fn list_services(
    pool: web::Data<PgPool>,
    _user: AuthenticatedUser,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse, AppError> {
    debug!("Listing catalog services");

    let repo = PgServiceRepository::new(pool.get_ref().clone());

    let total = repo.count().await?;
    let services = repo.find_all(query.limit(), query.offset()).await?;

    let data: Vec<ServiceResponse> = services.into_iter().map(Into::into).collect();
    let response: PaginatedResponse<ServiceResponse> = query.paginate(data, total);

    Ok(HttpResponse::Ok().json(response))
}

/// Get catalog service by ID
#[instrument(skip(pool, _user))]
pub async fn get_service(
    pool: web::Data<PgPool>,
    _user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let repo = PgServiceRepository::new(pool.get_ref().clone());
    let service = repo
        .find_by_id(id)
        .await?
        .ok_or(AppError::ServiceNotFound(id))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(ServiceResponse::from(service))))
}

/// Create a new catalog service
#[instrument(skip(pool, user, req))]
pub async fn create_service(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    req: web::Json<ServiceRequest>,
) -> Result<HttpResponse, AppError> {
    user.require(Permission::ManageServices)?;
    req.validate()?;

    let service = req.into_inner().into_service(0);
    service.validate().map_err(AppError::Validation)?;

    debug!("Creating catalog service: {}", service.name);

    let repo = PgServiceRepository::new(pool.get_ref().clone());
    let created = repo.create(&service).await?;

    info!(service_id = created.id, "Catalog service created");

    if let Ok(audit_data) = AuditLogBuilder::default()
        .username(user.username.clone())
        .action("create")
        .entity_type("service")
        .entity_id(created.id.to_string())
        .build()
    {
        audit_data.insert(pool.get_ref()).await;
    }

    Ok(HttpResponse::Created().json(ApiResponse::success(ServiceResponse::from(created))))
}

/// Update a catalog service.
///
/// Committed bookings keep their materialized snapshots; a price change
/// here only affects future selections.
#[instrument(skip(pool, user, req))]
pub async fn update_service(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
    req: web::Json<ServiceRequest>,
) -> Result<HttpResponse, AppError> {
    user.require(Permission::ManageServices)?;
    req.validate()?;

    let id = path.into_inner();

    let repo = PgServiceRepository::new(pool.get_ref().clone());
    let existing = repo
        .find_by_id(id)
        .await?
        .ok_or(AppError::ServiceNotFound(id))?;

    let mut service = req.into_inner().into_service(id);
    service.created_at = existing.created_at;
    service.validate().map_err(AppError::Validation)?;

    let updated = repo.update(&service).await?;

    info!(service_id = id, "Catalog service updated");

    if let Ok(audit_data) = AuditLogBuilder::default()
        .username(user.username.clone())
        .action("update")
        .entity_type("service")
        .entity_id(id.to_string())
        .build()
    {
        audit_data.insert(pool.get_ref()).await;
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(ServiceResponse::from(updated))))
}

/// Delete a catalog service
#[instrument(skip(pool, user))]
pub async fn delete_service(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    user.require(Permission::ManageServices)?;

    let id = path.into_inner();

    let repo = PgServiceRepository::new(pool.get_ref().clone());
    let deleted = repo.delete(id).await?;

    if !deleted {
        return Err(AppError::ServiceNotFound(id));
    }

    info!(service_id = id, "Catalog service deleted");

    if let Ok(audit_data) = AuditLogBuilder::default()
        .username(user.username.clone())
        .action("delete")
        .entity_type("service")
        .entity_id(id.to_string())
        .build()
    {
        audit_data.insert(pool.get_ref()).await;
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success("Service deleted successfully")))
}

/// Configure catalog service routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/services")
            .route("", web::get().to(list_services))
            .route("", web::post().to(create_service))
            .route("/{id}", web::get().to(get_service))
            .route("/{id}", web::put().to(update_service))
            .route("/{id}", web::delete().to(delete_service)),
    );
}
