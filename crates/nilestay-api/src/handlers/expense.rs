//! Expense management handlers

use crate::dto::{ApiResponse, ExpenseFilterParams, ExpenseRequest, ExpenseResponse};
use actix_web::{web, HttpResponse};
use nilestay_auth::AuthenticatedUser;
use nilestay_core::models::{AuditLogBuilder, Permission};
use nilestay_core::traits::{ExpenseRepository, PaginatedResponse, Repository};
use nilestay_core::AppError;
use nilestay_db::PgExpenseRepository;
use serde_json::json;
use sqlx::PgPool;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

/// List expenses with filters
#[instrument(skip(pool, _user, query))]
pub async fn list_expenses(
    pool: web::Data<PgPool>,
    _user: AuthenticatedUser,
    query: web::Query<ExpenseFilterParams>,
) -> Result<HttpResponse, AppError> {
    query.validate().map_err(|e| {
        warn!("Invalid expense query parameters: {}", e);
        AppError::Validation(e.to_string())
    })?;

    debug!("Listing expenses");

    let repo = PgExpenseRepository::new(pool.get_ref().clone());
    let (expenses, total) = repo
        .list_filtered(
            query.apartment_id,
            query.category,
            query.from_date(),
            query.to_date(),
            query.pagination.limit(),
            query.pagination.offset(),
        )
        .await?;

    let data: Vec<ExpenseResponse> = expenses.into_iter().map(Into::into).collect();
    let response: PaginatedResponse<ExpenseResponse> = query.pagination.paginate(data, total);

    Ok(HttpResponse::Ok().json(response))
}

/// Get expense by ID
#[instrument(skip(pool, _user))]
pub async fn get_expense(
    pool: web::Data<PgPool>,
    _user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let repo = PgExpenseRepository::new(pool.get_ref().clone());
    let expense = repo
        .find_by_id(id)
        .await?
        .ok_or(AppError::ExpenseNotFound(id))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(ExpenseResponse::from(expense))))
}

/// Create a new expense
#[instrument(skip(pool, user, req))]
pub async fn create_expense(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    req: web::Json<ExpenseRequest>,
) -> Result<HttpResponse, AppError> {
    user.require(Permission::ManageExpenses)?;
    req.validate()?;

    let expense = req.into_inner().into_expense(0, &user.username);
    expense.validate().map_err(AppError::Validation)?;

    debug!("Creating expense: {}", expense.description);

    let repo = PgExpenseRepository::new(pool.get_ref().clone());
    let created = repo.create(&expense).await?;

    info!(expense_id = created.id, "Expense created");

    if let Ok(audit_data) = AuditLogBuilder::default()
        .username(user.username.clone())
        .action("create")
        .entity_type("expense")
        .entity_id(created.id.to_string())
        .details(json!({ "amount": created.amount.to_string() }))
        .build()
    {
        audit_data.insert(pool.get_ref()).await;
    }

    Ok(HttpResponse::Created().json(ApiResponse::success(ExpenseResponse::from(created))))
}

/// Update an expense
#[instrument(skip(pool, user, req))]
pub async fn update_expense(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
    req: web::Json<ExpenseRequest>,
) -> Result<HttpResponse, AppError> {
    user.require(Permission::ManageExpenses)?;
    req.validate()?;

    let id = path.into_inner();

    let repo = PgExpenseRepository::new(pool.get_ref().clone());
    let existing = repo
        .find_by_id(id)
        .await?
        .ok_or(AppError::ExpenseNotFound(id))?;

    let mut expense = req.into_inner().into_expense(id, &existing.created_by);
    expense.created_at = existing.created_at;
    expense.validate().map_err(AppError::Validation)?;

    let updated = repo.update(&expense).await?;

    info!(expense_id = id, "Expense updated");

    if let Ok(audit_data) = AuditLogBuilder::default()
        .username(user.username.clone())
        .action("update")
        .entity_type("expense")
        .entity_id(id.to_string())
        .build()
    {
        audit_data.insert(pool.get_ref()).await;
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(ExpenseResponse::from(updated))))
}

/// Delete an expense
#[instrument(skip(pool, user))]
pub async fn delete_expense(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    user.require(Permission::ManageExpenses)?;

    let id = path.into_inner();

    let repo = PgExpenseRepository::new(pool.get_ref().clone());
    let deleted = repo.delete(id).await?;

    if !deleted {
        return Err(AppError::ExpenseNotFound(id));
    }

    info!(expense_id = id, "Expense deleted");

    if let Ok(audit_data) = AuditLogBuilder::default()
        .username(user.username.clone())
        .action("delete")
        .entity_type("expense")
        .entity_id(id.to_string())
        .build()
    {
        audit_data.insert(pool.get_ref()).await;
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success("Expense deleted successfully")))
}

/// Configure expense routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/expenses")
            .route("", web::get().to(list_expenses))
            .route("", web::post().to(create_expense))
            .route("/{id}", web::get().to(get_expense))
            .route("/{id}", web::put().to(update_expense))
            .route("/{id}", web::delete().to(delete_expense)),
    );
}
