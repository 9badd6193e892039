//! User management handlers
//!
//! HTTP handlers for staff account CRUD and permission toggles (admin only).

use crate::dto::{
    ApiResponse, PaginationParams, UserCreateRequest, UserListResponse, UserResponse,
    UserUpdateRequest,
};
use actix_web::{web, HttpResponse};
use nilestay_auth::{AdminUser, PasswordService};
use nilestay_core::models::{AuditLogBuilder, User, UserPermissions, UserRole};
use nilestay_core::traits::{Repository, UserRepository};
use nilestay_core::AppError;
use nilestay_db::PgUserRepository;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use validator::Validate;

/// List all users (admin only)
#[instrument(skip(pool, _admin, query))]
pub async fn list_users(
    pool: web::Data<PgPool>,
    _admin: AdminUser,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse, AppError> {
    debug!("Listing users");

    let page = query.page.max(1);
    let per_page = query.per_page.clamp(1, 100);
    let offset = (page - 1) * per_page;

    let repo = PgUserRepository::new(pool.get_ref().clone());

    let total = repo.count().await?;
    let users = repo.find_all(per_page, offset).await?;

    let total_pages = (total + per_page - 1) / per_page;

    let response = UserListResponse {
        users: users.iter().map(UserResponse::from).collect(),
        total,
        page,
        per_page,
        total_pages,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(response)))
}

/// Get user by ID (admin only, or own profile)
#[instrument(skip(pool, admin))]
pub async fn get_user(
    pool: web::Data<PgPool>,
    admin: AdminUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();

    let repo = PgUserRepository::new(pool.get_ref().clone());
    let found_user = repo
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))?;

    debug!(admin = %admin.username, "Fetched user {}", user_id);

    Ok(HttpResponse::Ok().json(ApiResponse::success(UserResponse::from(found_user))))
}

/// Create a new user (admin only)
#[instrument(skip(pool, password_service, admin, req))]
pub async fn create_user(
    pool: web::Data<PgPool>,
    password_service: web::Data<Arc<PasswordService>>,
    admin: AdminUser,
    req: web::Json<UserCreateRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate()?;

    debug!("Creating user: {}", req.username);

    let role = UserRole::from_str(&req.role).ok_or_else(|| {
        AppError::InvalidInput(format!(
            "Invalid role: {}. Must be one of: staff, admin",
            req.role
        ))
    })?;

    // An admin account holds every toggle implicitly
    let permissions = if role.is_admin() {
        UserPermissions::all()
    } else {
        req.permissions
    };

    let password_hash = password_service.hash_password(&req.password)?;

    let repo = PgUserRepository::new(pool.get_ref().clone());

    if repo.find_by_username(&req.username).await?.is_some() {
        return Err(AppError::AlreadyExists(format!(
            "User {} already exists",
            req.username
        )));
    }

    if let Some(ref email) = req.email {
        if repo.find_by_email(email).await?.is_some() {
            return Err(AppError::AlreadyExists(format!(
                "Email {} already in use",
                email
            )));
        }
    }

    let new_user = User {
        id: 0,
        username: req.username.clone(),
        password_hash,
        first_name: req.first_name.clone(),
        last_name: req.last_name.clone(),
        email: req.email.clone(),
        role,
        permissions,
        active: true,
        last_login: None,
        created_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
    };

    let created = repo.create(&new_user).await?;

    info!(
        username = %created.username,
        id = %created.id,
        admin = %admin.username,
        "User created"
    );

    if let Ok(audit_data) = AuditLogBuilder::default()
        .username(admin.username.clone())
        .action("create")
        .entity_type("user")
        .entity_id(created.id.to_string())
        .build()
    {
        audit_data.insert(pool.get_ref()).await;
    }

    Ok(HttpResponse::Created().json(ApiResponse::success(UserResponse::from(created))))
}

/// Update a user: profile fields, role, permission toggles, active flag
/// (admin only)
#[instrument(skip(pool, admin, req))]
pub async fn update_user(
    pool: web::Data<PgPool>,
    admin: AdminUser,
    path: web::Path<i32>,
    req: web::Json<UserUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();

    req.validate()?;

    let repo = PgUserRepository::new(pool.get_ref().clone());

    let current_admin = repo
        .find_by_username(&admin.username)
        .await?
        .ok_or_else(|| AppError::NotFound("Current user not found".to_string()))?;

    let mut existing_user = repo
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))?;

    if let Some(first_name) = &req.first_name {
        existing_user.first_name = Some(first_name.clone());
    }

    if let Some(last_name) = &req.last_name {
        existing_user.last_name = Some(last_name.clone());
    }

    if let Some(email) = &req.email {
        // Check if email is already in use by another user
        if let Some(email_user) = repo.find_by_email(email).await? {
            if email_user.id != user_id {
                return Err(AppError::AlreadyExists(format!(
                    "Email {} already in use",
                    email
                )));
            }
        }
        existing_user.email = Some(email.clone());
    }

    if let Some(ref role_str) = req.role {
        let new_role = UserRole::from_str(role_str)
            .ok_or_else(|| AppError::InvalidInput(format!("Invalid role: {}", role_str)))?;
        existing_user.role = new_role;
    }

    if let Some(permissions) = req.permissions {
        existing_user.permissions = permissions;
    }

    if let Some(active) = req.active {
        // Prevent an admin from deactivating themselves
        if user_id == current_admin.id && !active {
            return Err(AppError::InvalidInput(
                "You cannot deactivate your own account".to_string(),
            ));
        }
        existing_user.active = active;
    }

    existing_user.updated_at = chrono::Utc::now();

    let updated = repo.update(&existing_user).await?;

    info!(user_id = user_id, admin = %admin.username, "User updated");

    if let Ok(audit_data) = AuditLogBuilder::default()
        .username(admin.username.clone())
        .action("update")
        .entity_type("user")
        .entity_id(user_id.to_string())
        .build()
    {
        audit_data.insert(pool.get_ref()).await;
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(UserResponse::from(updated))))
}

/// Delete a user (admin only)
#[instrument(skip(pool, admin))]
pub async fn delete_user(
    pool: web::Data<PgPool>,
    admin: AdminUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();

    let repo = PgUserRepository::new(pool.get_ref().clone());

    let current_admin = repo
        .find_by_username(&admin.username)
        .await?
        .ok_or_else(|| AppError::NotFound("Current user not found".to_string()))?;

    // Prevent an admin from deleting themselves
    if user_id == current_admin.id {
        return Err(AppError::InvalidInput(
            "You cannot delete your own account".to_string(),
        ));
    }

    let deleted = repo.delete(user_id).await?;

    if !deleted {
        return Err(AppError::UserNotFound(user_id.to_string()));
    }

    info!(user_id = user_id, admin = %admin.username, "User deleted");

    if let Ok(audit_data) = AuditLogBuilder::default()
        .username(admin.username.clone())
        .action("delete")
        .entity_type("user")
        .entity_id(user_id.to_string())
        .build()
    {
        audit_data.insert(pool.get_ref()).await;
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success("User deleted successfully")))
}

/// Configure user management routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("", web::get().to(list_users))
            .route("", web::post().to(create_user))
            .route("/{id}", web::get().to(get_user))
            .route("/{id}", web::put().to(update_user))
            .route("/{id}", web::delete().to(delete_user)),
    );
}
