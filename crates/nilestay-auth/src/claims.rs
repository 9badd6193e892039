//! JWT Claims structure
//!
//! Defines the claims structure used in JWT tokens for authentication.
//! Tokens carry the user's role and a snapshot of their permission
//! toggles; changing a user's permissions takes effect on the next login.

use chrono::{Duration, Utc};
use nilestay_core::models::{Permission, UserPermissions, UserRole};
use serde::{Deserialize, Serialize};

/// JWT Claims
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,

    /// User role
    pub role: UserRole,

    /// Permission toggles at login time
    pub permissions: UserPermissions,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create new claims with the specified username, role, and permissions.
    ///
    /// Expiration is left unset (0) and filled in by `JwtService`.
    pub fn new(username: &str, role: UserRole, permissions: UserPermissions) -> Self {
        let now = Utc::now();

        Self {
            sub: username.to_string(),
            role,
            permissions,
            iat: now.timestamp(),
            exp: 0, // Will be set by JwtService
        }
    }

    /// Create new claims with custom expiration duration
    pub fn with_expiration(
        username: &str,
        role: UserRole,
        permissions: UserPermissions,
        expires_in_secs: i64,
    ) -> Self {
        let now = Utc::now();
        let exp = now + Duration::seconds(expires_in_secs);

        Self {
            sub: username.to_string(),
            role,
            permissions,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }

    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp();
        self.exp <= now
    }

    /// Get the username from the claims
    pub fn username(&self) -> &str {
        &self.sub
    }

    /// Check if user has admin privileges
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Whether the token grants the given permission
    /// (admins pass every check)
    pub fn allows(&self, permission: Permission) -> bool {
        self.role.is_admin() || self.permissions.allows(permission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_claims_creation() {
        let claims = Claims::new("testuser", UserRole::Staff, UserPermissions::default());
        assert_eq!(claims.sub, "testuser");
        assert_eq!(claims.role, UserRole::Staff);
        assert!(claims.iat > 0);
    }

    #[test]
    fn test_claims_with_expiration() {
        let claims =
            Claims::with_expiration("admin", UserRole::Admin, UserPermissions::all(), 3600);
        assert_eq!(claims.sub, "admin");
        assert!(!claims.is_expired());

        let now = Utc::now().timestamp();
        assert!(claims.exp > now);
        assert!(claims.exp <= now + 3600);
    }

    #[test]
    fn test_expired_claims() {
        let mut claims = Claims::new("user", UserRole::Staff, UserPermissions::default());
        claims.exp = (Utc::now() - Duration::hours(1)).timestamp();
        assert!(claims.is_expired());
    }

    #[test]
    fn test_permission_checks() {
        let staff = Claims::new(
            "staff",
            UserRole::Staff,
            UserPermissions {
                manage_bookings: true,
                ..Default::default()
            },
        );
        assert!(staff.allows(Permission::ManageBookings));
        assert!(!staff.allows(Permission::ManageUsers));
        assert!(!staff.is_admin());

        let admin = Claims::new("admin", UserRole::Admin, UserPermissions::default());
        assert!(admin.allows(Permission::ManageUsers));
        assert!(admin.is_admin());
    }
}
