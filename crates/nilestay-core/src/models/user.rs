//! User model
//!
//! Staff accounts for authentication and authorization. Access is a role
//! (staff or admin) plus independent per-area permission toggles; an admin
//! passes every permission check regardless of toggles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// User role enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Staff member, restricted by permission toggles
    #[default]
    Staff,
    /// Administrator with full access
    Admin,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Staff => write!(f, "staff"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}

impl UserRole {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "staff" => Some(UserRole::Staff),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }

    /// Check if role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

/// One grantable area of the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ManageApartments,
    ManageBookings,
    ManageCustomers,
    ManageServices,
    ManageExpenses,
    ManageUsers,
    ViewReports,
    ExportData,
}

/// Per-user permission toggles
///
/// Fields default to `false` when absent so that snapshots written before
/// a toggle existed deserialize cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UserPermissions {
    #[serde(default)]
    pub manage_apartments: bool,
    #[serde(default)]
    pub manage_bookings: bool,
    #[serde(default)]
    pub manage_customers: bool,
    #[serde(default)]
    pub manage_services: bool,
    #[serde(default)]
    pub manage_expenses: bool,
    #[serde(default)]
    pub manage_users: bool,
    #[serde(default)]
    pub view_reports: bool,
    #[serde(default)]
    pub export_data: bool,
}

impl UserPermissions {
    /// Every toggle granted
    pub fn all() -> Self {
        Self {
            manage_apartments: true,
            manage_bookings: true,
            manage_customers: true,
            manage_services: true,
            manage_expenses: true,
            manage_users: true,
            view_reports: true,
            export_data: true,
        }
    }

    /// Whether the given permission is granted
    pub fn allows(&self, permission: Permission) -> bool {
        match permission {
            Permission::ManageApartments => self.manage_apartments,
            Permission::ManageBookings => self.manage_bookings,
            Permission::ManageCustomers => self.manage_customers,
            Permission::ManageServices => self.manage_services,
            Permission::ManageExpenses => self.manage_expenses,
            Permission::ManageUsers => self.manage_users,
            Permission::ViewReports => self.view_reports,
            Permission::ExportData => self.export_data,
        }
    }
}

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i32,

    /// Username (unique, for login)
    pub username: String,

    /// Password hash (never expose in API responses)
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// First name
    pub first_name: Option<String>,

    /// Last name
    pub last_name: Option<String>,

    /// Email address
    pub email: Option<String>,

    /// User role
    pub role: UserRole,

    /// Per-area permission toggles
    pub permissions: UserPermissions,

    /// Whether user is active
    pub active: bool,

    /// Last login timestamp
    pub last_login: Option<DateTime<Utc>>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Get full name
    pub fn full_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => self.username.clone(),
        }
    }

    /// Whether the user may perform an action gated by the permission.
    ///
    /// Admins pass every check; staff need the matching toggle.
    pub fn can(&self, permission: Permission) -> bool {
        self.active && (self.role.is_admin() || self.permissions.allows(permission))
    }

    /// Check if user can perform admin actions
    pub fn can_admin(&self) -> bool {
        self.active && self.role.is_admin()
    }

    /// Check if user is active and can login
    pub fn can_login(&self) -> bool {
        self.active
    }
}

impl Default for User {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            username: String::new(),
            password_hash: String::new(),
            first_name: None,
            last_name: None,
            email: None,
            role: UserRole::Staff,
            permissions: UserPermissions::default(),
            active: true,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// User info for API responses (without sensitive data)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i32,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub role: String,
    pub permissions: UserPermissions,
    pub active: bool,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            role: user.role.to_string(),
            permissions: user.permissions,
            active: user.active,
            last_login: user.last_login,
        }
    }
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!(UserRole::from_str("admin"), Some(UserRole::Admin));
        assert_eq!(UserRole::from_str("Staff"), Some(UserRole::Staff));
        assert_eq!(UserRole::from_str("manager"), None);
    }

    #[test]
    fn test_admin_passes_every_check() {
        let user = User {
            role: UserRole::Admin,
            permissions: UserPermissions::default(),
            ..Default::default()
        };
        assert!(user.can(Permission::ManageApartments));
        assert!(user.can(Permission::ManageUsers));
        assert!(user.can(Permission::ExportData));
    }

    #[test]
    fn test_staff_needs_toggle() {
        let user = User {
            role: UserRole::Staff,
            permissions: UserPermissions {
                manage_bookings: true,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(user.can(Permission::ManageBookings));
        assert!(!user.can(Permission::ManageUsers));
        assert!(!user.can(Permission::ViewReports));
    }

    #[test]
    fn test_inactive_user_denied() {
        let user = User {
            role: UserRole::Admin,
            active: false,
            ..Default::default()
        };
        assert!(!user.can(Permission::ManageBookings));
        assert!(!user.can_login());
    }

    #[test]
    fn test_full_permissions() {
        let all = UserPermissions::all();
        assert!(all.allows(Permission::ManageApartments));
        assert!(all.allows(Permission::ExportData));
    }

    #[test]
    fn test_user_full_name() {
        let user = User {
            first_name: Some("Mona".to_string()),
            last_name: Some("Said".to_string()),
            username: "msaid".to_string(),
            ..Default::default()
        };
        assert_eq!(user.full_name(), "Mona Said");

        let user = User {
            first_name: None,
            last_name: None,
            username: "admin".to_string(),
            ..Default::default()
        };
        assert_eq!(user.full_name(), "admin");
    }

    #[test]
    fn test_permissions_backfill_on_load() {
        // Older snapshots may omit toggles added later
        let perms: UserPermissions = serde_json::from_str(r#"{"manage_bookings": true}"#).unwrap();
        assert!(perms.manage_bookings);
        assert!(!perms.export_data);
    }
}
