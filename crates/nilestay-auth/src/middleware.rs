//! Actix-web authentication middleware and request extractors
//!
//! Provides extractors for authenticated users with permission-based
//! access control.

use crate::jwt::JwtService;
use crate::Claims;
use actix_web::{dev::Payload, error::ErrorUnauthorized, web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use nilestay_core::error::AppError;
use nilestay_core::models::{Permission, UserRole};
use std::sync::Arc;
use tracing::{debug, warn};

/// Extract JWT token from request
///
/// Checks for token in the following order:
/// 1. Authorization header (Bearer token)
/// 2. Cookie named "token"
fn extract_token_from_request(req: &HttpRequest) -> Option<String> {
    // Try Authorization header first
    if let Some(auth_header) = req.headers().get("Authorization") {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    // Try cookie
    if let Some(cookie) = req.cookie("token") {
        return Some(cookie.value().to_string());
    }

    None
}

/// Authenticated user extractor
///
/// Extracts and validates the JWT token from a request, providing access to
/// the user's identity, role, and permission toggles.
///
/// # Examples
///
/// ```no_run
/// use actix_web::HttpResponse;
/// use nilestay_auth::middleware::AuthenticatedUser;
/// use nilestay_core::models::Permission;
///
/// async fn create_booking(user: AuthenticatedUser) -> HttpResponse {
///     if let Err(e) = user.require(Permission::ManageBookings) {
///         return HttpResponse::from_error(e);
///     }
///     HttpResponse::Ok().finish()
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Username of the authenticated user
    pub username: String,

    /// Role of the authenticated user
    pub role: UserRole,

    /// Full claims from the JWT token
    pub claims: Claims,
}

impl AuthenticatedUser {
    /// Check if user has admin privileges
    pub fn is_admin(&self) -> bool {
        self.claims.is_admin()
    }

    /// Whether the user holds the given permission (admins always do)
    pub fn can(&self, permission: Permission) -> bool {
        self.claims.allows(permission)
    }

    /// Require a permission, returning `Forbidden` when it is missing
    pub fn require(&self, permission: Permission) -> Result<(), AppError> {
        if self.can(permission) {
            Ok(())
        } else {
            warn!(
                username = %self.username,
                permission = ?permission,
                "Permission denied"
            );
            Err(AppError::Forbidden)
        }
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        // Extract JWT service from app data
        let jwt_service = match req.app_data::<web::Data<Arc<JwtService>>>() {
            Some(service) => service.get_ref().clone(),
            None => {
                warn!("JwtService not found in app data");
                return ready(Err(ErrorUnauthorized(AppError::Unauthorized(
                    "Authentication service not configured".to_string(),
                ))));
            }
        };

        // Extract token from request
        let token = match extract_token_from_request(req) {
            Some(t) => t,
            None => {
                debug!("No authentication token found in request");
                return ready(Err(ErrorUnauthorized(AppError::Unauthorized(
                    "No authentication token provided".to_string(),
                ))));
            }
        };

        // Validate token and extract claims
        match jwt_service.validate_token(&token) {
            Ok(claims) => {
                debug!(
                    username = %claims.sub,
                    role = ?claims.role,
                    "User authenticated successfully"
                );

                ready(Ok(AuthenticatedUser {
                    username: claims.sub.clone(),
                    role: claims.role,
                    claims,
                }))
            }
            Err(e) => {
                warn!(error = %e, "Token validation failed");
                ready(Err(ErrorUnauthorized(e)))
            }
        }
    }
}

/// Admin user extractor
///
/// Requires the user to have the admin role. Returns `Forbidden` when the
/// user lacks it.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthenticatedUser);

impl std::ops::Deref for AdminUser {
    type Target = AuthenticatedUser;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for AdminUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let auth_user = match AuthenticatedUser::from_request(req, payload).into_inner() {
            Ok(user) => user,
            Err(e) => return ready(Err(e)),
        };

        if !auth_user.is_admin() {
            warn!(
                username = %auth_user.username,
                role = %auth_user.role,
                "User attempted admin access without privileges"
            );
            return ready(Err(ErrorUnauthorized(AppError::Forbidden)));
        }

        debug!(
            username = %auth_user.username,
            "Admin access granted"
        );

        ready(Ok(AdminUser(auth_user)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use nilestay_core::models::{User, UserPermissions};

    fn create_test_jwt_service() -> Arc<JwtService> {
        Arc::new(JwtService::new("test-secret-key-12345", 3600))
    }

    fn staff_user(permissions: UserPermissions) -> User {
        User {
            username: "staff".to_string(),
            role: UserRole::Staff,
            permissions,
            ..Default::default()
        }
    }

    #[actix_web::test]
    async fn test_extract_token_from_authorization_header() {
        let jwt_service = create_test_jwt_service();
        let token = jwt_service
            .create_token_for_user(&staff_user(UserPermissions::default()))
            .unwrap();

        let app = test::init_service(App::new().app_data(web::Data::new(jwt_service)).route(
            "/test",
            web::get().to(|user: AuthenticatedUser| async move {
                assert_eq!(user.username, "staff");
                "OK"
            }),
        ))
        .await;

        let req = test::TestRequest::get()
            .uri("/test")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn test_missing_token() {
        let jwt_service = create_test_jwt_service();

        let app = test::init_service(App::new().app_data(web::Data::new(jwt_service)).route(
            "/test",
            web::get().to(|_user: AuthenticatedUser| async { "OK" }),
        ))
        .await;

        let req = test::TestRequest::get().uri("/test").to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn test_invalid_token() {
        let jwt_service = create_test_jwt_service();

        let app = test::init_service(App::new().app_data(web::Data::new(jwt_service)).route(
            "/test",
            web::get().to(|_user: AuthenticatedUser| async { "OK" }),
        ))
        .await;

        let req = test::TestRequest::get()
            .uri("/test")
            .insert_header(("Authorization", "Bearer invalid.token.here"))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn test_admin_extractor_with_admin_role() {
        let jwt_service = create_test_jwt_service();
        let admin = User {
            username: "admin".to_string(),
            role: UserRole::Admin,
            ..Default::default()
        };
        let token = jwt_service.create_token_for_user(&admin).unwrap();

        let app = test::init_service(App::new().app_data(web::Data::new(jwt_service)).route(
            "/admin",
            web::get().to(|admin: AdminUser| async move {
                assert_eq!(admin.username, "admin");
                "OK"
            }),
        ))
        .await;

        let req = test::TestRequest::get()
            .uri("/admin")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn test_admin_extractor_with_staff_role() {
        let jwt_service = create_test_jwt_service();
        let token = jwt_service
            .create_token_for_user(&staff_user(UserPermissions::all()))
            .unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(jwt_service))
                .route("/admin", web::get().to(|_admin: AdminUser| async { "OK" })),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/admin")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }

    #[::core::prelude::v1::test]
    fn test_permission_checks() {
        let claims = Claims::new(
            "staff",
            UserRole::Staff,
            UserPermissions {
                manage_bookings: true,
                view_reports: true,
                ..Default::default()
            },
        );
        let user = AuthenticatedUser {
            username: claims.sub.clone(),
            role: claims.role,
            claims,
        };

        assert!(user.can(Permission::ManageBookings));
        assert!(user.can(Permission::ViewReports));
        assert!(!user.can(Permission::ManageUsers));
        assert!(user.require(Permission::ManageBookings).is_ok());
        assert!(matches!(
            user.require(Permission::ManageUsers),
            Err(AppError::Forbidden)
        ));
    }
}
