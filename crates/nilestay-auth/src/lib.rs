//! Authentication and authorization for Nilestay
//!
//! This crate provides JWT-based authentication, password hashing with Argon2,
//! and Actix-web extractors for role- and permission-based access control.
//!
//! # Features
//!
//! - JWT token creation and validation
//! - Argon2 password hashing and verification
//! - Request extractors for authenticated users
//! - Per-permission access checks with admin override
//!
//! # Examples
//!
//! ## Creating a JWT token
//!
//! ```no_run
//! use nilestay_auth::{JwtService, Claims};
//! use nilestay_core::models::{UserPermissions, UserRole};
//!
//! let jwt_service = JwtService::new("your-secret-key", 3600);
//! let claims = Claims::new("admin", UserRole::Admin, UserPermissions::all());
//! let token = jwt_service.create_token(&claims)?;
//! # Ok::<(), nilestay_core::error::AppError>(())
//! ```
//!
//! ## Password hashing
//!
//! ```no_run
//! use nilestay_auth::PasswordService;
//!
//! let password_service = PasswordService::new();
//! let hash = password_service.hash_password("secure_password")?;
//! let is_valid = password_service.verify_password("secure_password", &hash)?;
//! assert!(is_valid);
//! # Ok::<(), nilestay_core::error::AppError>(())
//! ```

pub mod claims;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use claims::Claims;
pub use jwt::JwtService;
pub use middleware::{AdminUser, AuthenticatedUser};
pub use password::PasswordService;

#[cfg(test)]
mod tests {
    use super::*;
    use nilestay_core::models::{UserPermissions, UserRole};

    #[test]
    fn test_integration_jwt_and_password() {
        let password_service = PasswordService::new();
        let jwt_service = JwtService::new("test-secret-key-12345", 3600);

        // Test password hashing
        let password = "my_secure_password";
        let hash = password_service.hash_password(password).unwrap();
        assert!(password_service.verify_password(password, &hash).unwrap());
        assert!(!password_service
            .verify_password("wrong_password", &hash)
            .unwrap());

        // Test JWT creation and validation
        let claims = Claims::new("testuser", UserRole::Admin, UserPermissions::all());
        let token = jwt_service.create_token(&claims).unwrap();
        let decoded_claims = jwt_service.validate_token(&token).unwrap();

        assert_eq!(decoded_claims.sub, "testuser");
        assert_eq!(decoded_claims.role, UserRole::Admin);
    }
}
