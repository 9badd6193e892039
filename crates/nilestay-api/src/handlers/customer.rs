//! Customer management handlers

use crate::dto::{ApiResponse, CustomerRequest, CustomerResponse, PaginationParams};
use actix_web::{web, HttpResponse};
use nilestay_auth::AuthenticatedUser;
use nilestay_core::models::{AuditLogBuilder, Permission};
use nilestay_core::traits::{CustomerRepository, PaginatedResponse, Repository};
use nilestay_core::AppError;
use nilestay_db::PgCustomerRepository;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::{debug, info, instrument};
use validator::Validate;

/// Customer list query parameters
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CustomerListParams {
    #[serde(flatten)]
    #[validate(nested)]
    pub pagination: PaginationParams,

    /// Name or phone fragment to search for
    pub q: Option<String>,
}

/// List or search customers
#[instrument(skip(pool, _user, query))]
pub async fn list_customers(
    pool: web::Data<PgPool>,
    _user: AuthenticatedUser,
    query: web::Query<CustomerListParams>,
) -> Result<HttpResponse, AppError> {
    debug!("Listing customers");

    let repo = PgCustomerRepository::new(pool.get_ref().clone());

    let (customers, total) = match query.q.as_deref() {
        Some(q) if !q.trim().is_empty() => {
            repo.search(q.trim(), query.pagination.limit(), query.pagination.offset())
                .await?
        }
        _ => {
            let total = repo.count().await?;
            let customers = repo
                .find_all(query.pagination.limit(), query.pagination.offset())
                .await?;
            (customers, total)
        }
    };

    let data: Vec<CustomerResponse> = customers.into_iter().map(Into::into).collect();
    let response: PaginatedResponse<CustomerResponse> = query.pagination.paginate(data, total);

    Ok(HttpResponse::Ok().json(response))
}

/// Get customer by ID
#[instrument(skip(pool, _user))]
pub async fn get_customer(
    pool: web::Data<PgPool>,
    _user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let repo = PgCustomerRepository::new(pool.get_ref().clone());
    let customer = repo
        .find_by_id(id)
        .await?
        .ok_or(AppError::CustomerNotFound(id))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(CustomerResponse::from(customer))))
}

/// Create a new customer
#[instrument(skip(pool, user, req))]
pub async fn create_customer(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    req: web::Json<CustomerRequest>,
) -> Result<HttpResponse, AppError> {
    user.require(Permission::ManageCustomers)?;
    req.validate()?;

    let customer = req.into_inner().into_customer(0);
    customer.validate().map_err(AppError::Validation)?;

    debug!("Creating customer: {}", customer.name);

    let repo = PgCustomerRepository::new(pool.get_ref().clone());
    let created = repo.create(&customer).await?;

    info!(customer_id = created.id, "Customer created");

    if let Ok(audit_data) = AuditLogBuilder::default()
        .username(user.username.clone())
        .action("create")
        .entity_type("customer")
        .entity_id(created.id.to_string())
        .build()
    {
        audit_data.insert(pool.get_ref()).await;
    }

    Ok(HttpResponse::Created().json(ApiResponse::success(CustomerResponse::from(created))))
}

/// Update a customer
#[instrument(skip(pool, user, req))]
pub async fn update_customer(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
    req: web::Json<CustomerRequest>,
) -> Result<HttpResponse, AppError> {
    user.require(Permission::ManageCustomers)?;
    req.validate()?;

    let id = path.into_inner();

    let repo = PgCustomerRepository::new(pool.get_ref().clone());
    let existing = repo
        .find_by_id(id)
        .await?
        .ok_or(AppError::CustomerNotFound(id))?;

    let mut customer = req.into_inner().into_customer(id);
    customer.created_at = existing.created_at;
    customer.validate().map_err(AppError::Validation)?;

    let updated = repo.update(&customer).await?;

    info!(customer_id = id, "Customer updated");

    if let Ok(audit_data) = AuditLogBuilder::default()
        .username(user.username.clone())
        .action("update")
        .entity_type("customer")
        .entity_id(id.to_string())
        .build()
    {
        audit_data.insert(pool.get_ref()).await;
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(CustomerResponse::from(updated))))
}

/// Delete a customer
#[instrument(skip(pool, user))]
pub async fn delete_customer(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    user.require(Permission::ManageCustomers)?;

    let id = path.into_inner();

    let repo = PgCustomerRepository::new(pool.get_ref().clone());
    let deleted = repo.delete(id).await?;

    if !deleted {
        return Err(AppError::CustomerNotFound(id));
    }

    info!(customer_id = id, "Customer deleted");

    if let Ok(audit_data) = AuditLogBuilder::default()
        .username(user.username.clone())
        .action("delete")
        .entity_type("customer")
        .entity_id(id.to_string())
        .build()
    {
        audit_data.insert(pool.get_ref()).await;
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success("Customer deleted successfully")))
}

/// Configure customer routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/customers")
            .route("", web::get().to(list_customers))
            .route("", web::post().to(create_customer))
            .route("/{id}", web::get().to(get_customer))
            .route("/{id}", web::put().to(update_customer))
            .route("/{id}", web::delete().to(delete_customer)),
    );
}
