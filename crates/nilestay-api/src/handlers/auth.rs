//! Authentication handlers

use crate::dto::auth::{
    ChangePasswordRequest, ChangePasswordResponse, LoginRequest, LoginResponse, LogoutResponse,
    MeResponse,
};
use crate::dto::ApiResponse;
use actix_web::{cookie::Cookie, web, HttpResponse};
use chrono::{Duration, Utc};
use nilestay_auth::{AuthenticatedUser, JwtService, PasswordService};
use nilestay_core::models::{AuditLogBuilder, UserInfo};
use nilestay_core::traits::{Repository, UserRepository};
use nilestay_core::AppError;
use nilestay_db::PgUserRepository;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use validator::Validate;

/// Login endpoint
///
/// POST /api/v1/auth/login
#[instrument(skip(pool, jwt_service, password_service, req))]
pub async fn login(
    pool: web::Data<PgPool>,
    jwt_service: web::Data<Arc<JwtService>>,
    password_service: web::Data<Arc<PasswordService>>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Login validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let username = req.username.trim();
    let password = &req.password;

    debug!(username = %username, "Processing login request");

    let user_repo = PgUserRepository::new(pool.get_ref().clone());
    let user = user_repo.find_by_username(username).await?.ok_or_else(|| {
        info!(username = %username, "Login failed: user not found");
        AppError::InvalidCredentials
    })?;

    if !user.can_login() {
        warn!(username = %username, "Login failed: user is inactive");
        return Err(AppError::InvalidCredentials);
    }

    let password_valid = password_service
        .verify_password(password, &user.password_hash)
        .map_err(|e| {
            error!("Password verification error: {}", e);
            AppError::Internal("Password verification failed".to_string())
        })?;

    if !password_valid {
        info!(username = %username, "Login failed: invalid password");
        return Err(AppError::InvalidCredentials);
    }

    if let Err(e) = user_repo.update_last_login(user.id).await {
        warn!("Failed to update last login for user {}: {}", user.id, e);
    }

    let token = jwt_service.create_token_for_user(&user)?;
    let expires_in = jwt_service.expiration_secs();

    info!(username = %username, role = ?user.role, "Login successful");

    if let Ok(audit_data) = AuditLogBuilder::default()
        .user_id(user.id)
        .username(user.username.clone())
        .action("login")
        .entity_type("auth")
        .build()
    {
        audit_data.insert(pool.get_ref()).await;
    }

    let user_info = UserInfo::from(&user);
    let response = LoginResponse::new(token.clone(), expires_in, user_info);

    let cookie = Cookie::build("token", token)
        .path("/")
        .http_only(true)
        .secure(false) // Set to true in production with HTTPS
        .max_age(actix_web::cookie::time::Duration::seconds(expires_in))
        .finish();

    Ok(HttpResponse::Ok()
        .cookie(cookie)
        .json(ApiResponse::success(response)))
}

/// Logout endpoint
///
/// POST /api/v1/auth/logout
#[instrument(skip(pool, user))]
pub async fn logout(pool: web::Data<PgPool>, user: AuthenticatedUser) -> HttpResponse {
    info!(username = %user.username, "User logged out");

    if let Ok(audit_data) = AuditLogBuilder::default()
        .username(user.username.clone())
        .action("logout")
        .entity_type("auth")
        .build()
    {
        audit_data.insert(pool.get_ref()).await;
    }

    let cookie = Cookie::build("token", "")
        .path("/")
        .http_only(true)
        .max_age(actix_web::cookie::time::Duration::seconds(0))
        .finish();

    HttpResponse::Ok()
        .cookie(cookie)
        .json(ApiResponse::success(LogoutResponse::default()))
}

/// Get current user info
///
/// GET /api/v1/auth/me
#[instrument(skip(pool, user))]
pub async fn me(pool: web::Data<PgPool>, user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
    debug!(username = %user.username, "Getting current user info");

    let user_repo = PgUserRepository::new(pool.get_ref().clone());
    let db_user = user_repo
        .find_by_username(&user.username)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let user_info = UserInfo::from(&db_user);
    let token_expires_at = Utc::now() + Duration::seconds(user.claims.exp - Utc::now().timestamp());

    let response = MeResponse {
        user: user_info,
        token_expires_at,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(response)))
}

/// Change password
///
/// POST /api/v1/auth/change-password
#[instrument(skip(pool, password_service, user, req))]
pub async fn change_password(
    pool: web::Data<PgPool>,
    password_service: web::Data<Arc<PasswordService>>,
    user: AuthenticatedUser,
    req: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Change password validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    debug!(username = %user.username, "Processing password change request");

    let user_repo = PgUserRepository::new(pool.get_ref().clone());
    let mut db_user = user_repo
        .find_by_username(&user.username)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let current_valid =
        password_service.verify_password(&req.current_password, &db_user.password_hash)?;

    if !current_valid {
        warn!(username = %user.username, "Change password failed: invalid current password");
        return Err(AppError::InvalidCredentials);
    }

    let new_hash = password_service.hash_password(&req.new_password)?;
    db_user.password_hash = new_hash;
    db_user.updated_at = Utc::now();

    user_repo.update(&db_user).await?;

    info!(username = %user.username, "Password changed successfully");

    Ok(
        HttpResponse::Ok().json(ApiResponse::success(ChangePasswordResponse {
            message: "Password changed successfully".to_string(),
        })),
    )
}

/// Configure auth routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/login", web::post().to(login))
            .route("/logout", web::post().to(logout))
            .route("/me", web::get().to(me))
            .route("/change-password", web::post().to(change_password)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_validation() {
        let valid_req = LoginRequest {
            username: "admin".to_string(),
            password: "password".to_string(),
        };
        assert!(valid_req.validate().is_ok());

        let invalid_req = LoginRequest {
            username: "".to_string(),
            password: "".to_string(),
        };
        assert!(invalid_req.validate().is_err());
    }
}
