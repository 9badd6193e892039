//! User repository implementation
//!
//! Provides PostgreSQL-backed storage for staff accounts. Permission
//! toggles are stored as JSONB so new toggles backfill to `false` on load.

use nilestay_core::{
    models::{User, UserPermissions, UserRole},
    traits::{Repository, UserRepository},
    AppError, AppResult,
};
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::{debug, error, instrument};

/// PostgreSQL implementation of UserRepository
pub struct PgUserRepository {
    pool: PgPool,
}

const USER_COLUMNS: &str = r#"
    id, username, password_hash,
    first_name, last_name, email,
    role, permissions, active,
    last_login, created_at, updated_at
"#;

fn parse_role(s: &str) -> UserRole {
    UserRole::from_str(s).unwrap_or(UserRole::Staff)
}

fn parse_permissions(value: serde_json::Value) -> UserPermissions {
    serde_json::from_value(value).unwrap_or_default()
}

fn map_user(row: sqlx::postgres::PgRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        email: row.get("email"),
        role: parse_role(row.get("role")),
        permissions: parse_permissions(row.get("permissions")),
        active: row.get("active"),
        last_login: row.get("last_login"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl PgUserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<User, i32> for PgUserRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>> {
        debug!("Finding user by id: {}", id);

        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        let result = sqlx::query(&query)
            .bind(id)
            .map(map_user)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding user {}: {}", id, e);
                AppError::Database(format!("Failed to find user: {}", e))
            })?;

        Ok(result)
    }

    #[instrument(skip(self))]
    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<User>> {
        debug!("Finding all users with limit {} offset {}", limit, offset);

        let query = format!(
            "SELECT {} FROM users ORDER BY id LIMIT $1 OFFSET $2",
            USER_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(limit)
            .bind(offset)
            .map(map_user)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding users: {}", e);
                AppError::Database(format!("Failed to fetch users: {}", e))
            })?;

        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting users: {}", e);
                AppError::Database(format!("Failed to count users: {}", e))
            })?;

        Ok(result.0)
    }

    #[instrument(skip(self, entity))]
    async fn create(&self, entity: &User) -> AppResult<User> {
        debug!("Creating user: {}", entity.username);

        let permissions = serde_json::to_value(entity.permissions)
            .map_err(|e| AppError::Serialization(e.to_string()))?;

        let query = format!(
            r#"
            INSERT INTO users (
                username, password_hash, first_name, last_name,
                email, role, permissions, active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(&entity.username)
            .bind(&entity.password_hash)
            .bind(&entity.first_name)
            .bind(&entity.last_name)
            .bind(&entity.email)
            .bind(entity.role.to_string())
            .bind(&permissions)
            .bind(entity.active)
            .map(map_user)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error creating user: {}", e);
                if e.to_string().contains("unique constraint") {
                    AppError::AlreadyExists(format!("User {} already exists", entity.username))
                } else {
                    AppError::Database(format!("Failed to create user: {}", e))
                }
            })?;

        Ok(row)
    }

    #[instrument(skip(self, entity))]
    async fn update(&self, entity: &User) -> AppResult<User> {
        debug!("Updating user: {}", entity.id);

        let permissions = serde_json::to_value(entity.permissions)
            .map_err(|e| AppError::Serialization(e.to_string()))?;

        let query = format!(
            r#"
            UPDATE users
            SET username = $2,
                password_hash = $3,
                first_name = $4,
                last_name = $5,
                email = $6,
                role = $7,
                permissions = $8,
                active = $9,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(entity.id)
            .bind(&entity.username)
            .bind(&entity.password_hash)
            .bind(&entity.first_name)
            .bind(&entity.last_name)
            .bind(&entity.email)
            .bind(entity.role.to_string())
            .bind(&permissions)
            .bind(entity.active)
            .map(map_user)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error updating user {}: {}", entity.id, e);
                AppError::Database(format!("Failed to update user: {}", e))
            })?;

        Ok(row)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i32) -> AppResult<bool> {
        debug!("Deleting user: {}", id);

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting user {}: {}", id, e);
                AppError::Database(format!("Failed to delete user: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        debug!("Finding user by username: {}", username);

        let query = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);

        let result = sqlx::query(&query)
            .bind(username)
            .map(map_user)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding user by username: {}", e);
                AppError::Database(format!("Failed to find user: {}", e))
            })?;

        Ok(result)
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        debug!("Finding user by email: {}", email);

        let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);

        let result = sqlx::query(&query)
            .bind(email)
            .map(map_user)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding user by email: {}", e);
                AppError::Database(format!("Failed to find user: {}", e))
            })?;

        Ok(result)
    }

    #[instrument(skip(self))]
    async fn update_last_login(&self, id: i32) -> AppResult<()> {
        debug!("Updating last login for user: {}", id);

        sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error updating last login for user {}: {}", id, e);
                AppError::Database(format!("Failed to update last login: {}", e))
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_role() {
        assert_eq!(parse_role("admin"), UserRole::Admin);
        assert_eq!(parse_role("staff"), UserRole::Staff);
        assert_eq!(parse_role("invalid"), UserRole::Staff);
    }

    #[test]
    fn test_parse_permissions_backfills_missing_toggles() {
        let perms = parse_permissions(json!({"manage_bookings": true}));
        assert!(perms.manage_bookings);
        assert!(!perms.manage_users);

        let perms = parse_permissions(json!("not an object"));
        assert_eq!(perms, UserPermissions::default());
    }
}
