//! Apartment management handlers

use crate::dto::{ApartmentRequest, ApartmentResponse, ApiResponse, PaginationParams};
use actix_web::{web, HttpResponse};
use nilestay_auth::AuthenticatedUser;
use nilestay_core::models::{AuditLogBuilder, Permission};
use nilestay_core::traits::{PaginatedResponse, Repository};
use nilestay_core::AppError;
use nilestay_db::PgApartmentRepository;
use serde_json::json;
use sqlx::PgPool;
use tracing::{debug, info, instrument};
use validator::Validate;

/// List apartments
#[instrument(skip(pool, _user, query))]
pub async fn list_apartments(
    pool: web::Data<PgPool>,
    _user: AuthenticatedUser,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse, AppError> {
    debug!("Listing apartments");

    let repo = PgApartmentRepository::new(pool.get_ref().clone());

    let total = repo.count().await?;
    let apartments = repo.find_all(query.limit(), query.offset()).await?;

    let data: Vec<ApartmentResponse> = apartments.into_iter().map(Into::into).collect();
    let response: PaginatedResponse<ApartmentResponse> = query.paginate(data, total);

    Ok(HttpResponse::Ok().json(response))
}

/// Get apartment by ID
#[instrument(skip(pool, _user))]
pub async fn get_apartment(
    pool: web::Data<PgPool>,
    _user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let repo = PgApartmentRepository::new(pool.get_ref().clone());
    let apartment = repo
        .find_by_id(id)
        .await?
        .ok_or(AppError::ApartmentNotFound(id))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(ApartmentResponse::from(apartment))))
}

/// Create a new apartment
#[instrument(skip(pool, user, req))]
pub async fn create_apartment(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    req: web::Json<ApartmentRequest>,
) -> Result<HttpResponse, AppError> {
    user.require(Permission::ManageApartments)?;
    req.validate()?;

    let apartment = req.into_inner().into_apartment(0);
    apartment.validate().map_err(AppError::Validation)?;

    debug!("Creating apartment: {}", apartment.name);

    let repo = PgApartmentRepository::new(pool.get_ref().clone());
    let created = repo.create(&apartment).await?;

    info!(apartment_id = created.id, "Apartment created");

    if let Ok(audit_data) = AuditLogBuilder::default()
        .username(user.username.clone())
        .action("create")
        .entity_type("apartment")
        .entity_id(created.id.to_string())
        .details(json!({ "name": created.name }))
        .build()
    {
        audit_data.insert(pool.get_ref()).await;
    }

    Ok(HttpResponse::Created().json(ApiResponse::success(ApartmentResponse::from(created))))
}

/// Update an apartment
#[instrument(skip(pool, user, req))]
pub async fn update_apartment(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
    req: web::Json<ApartmentRequest>,
) -> Result<HttpResponse, AppError> {
    user.require(Permission::ManageApartments)?;
    req.validate()?;

    let id = path.into_inner();

    let repo = PgApartmentRepository::new(pool.get_ref().clone());
    let existing = repo
        .find_by_id(id)
        .await?
        .ok_or(AppError::ApartmentNotFound(id))?;

    let mut apartment = req.into_inner().into_apartment(id);
    apartment.created_at = existing.created_at;
    apartment.validate().map_err(AppError::Validation)?;

    let updated = repo.update(&apartment).await?;

    info!(apartment_id = id, "Apartment updated");

    if let Ok(audit_data) = AuditLogBuilder::default()
        .username(user.username.clone())
        .action("update")
        .entity_type("apartment")
        .entity_id(id.to_string())
        .build()
    {
        audit_data.insert(pool.get_ref()).await;
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(ApartmentResponse::from(updated))))
}

/// Delete an apartment
#[instrument(skip(pool, user))]
pub async fn delete_apartment(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    user.require(Permission::ManageApartments)?;

    let id = path.into_inner();

    let repo = PgApartmentRepository::new(pool.get_ref().clone());
    let deleted = repo.delete(id).await?;

    if !deleted {
        return Err(AppError::ApartmentNotFound(id));
    }

    info!(apartment_id = id, "Apartment deleted");

    if let Ok(audit_data) = AuditLogBuilder::default()
        .username(user.username.clone())
        .action("delete")
        .entity_type("apartment")
        .entity_id(id.to_string())
        .build()
    {
        audit_data.insert(pool.get_ref()).await;
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success("Apartment deleted successfully")))
}

/// Configure apartment routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/apartments")
            .route("", web::get().to(list_apartments))
            .route("", web::post().to(create_apartment))
            .route("/{id}", web::get().to(get_apartment))
            .route("/{id}", web::put().to(update_apartment))
            .route("/{id}", web::delete().to(delete_apartment)),
    );
}
