//! Audit log repository implementation

use chrono::{DateTime, Utc};
use nilestay_core::{
    models::{AuditLog, AuditLogData},
    AppError, AppResult,
};
use sqlx::{PgPool, Row};
use tracing::{debug, error, instrument};

/// PostgreSQL implementation of the audit log repository
pub struct PgAuditLogRepository {
    pool: PgPool,
}

const AUDIT_COLUMNS: &str = r#"
    id, user_id, username, action, entity_type,
    entity_id, details, ip_address, user_agent, created_at
"#;

fn map_audit(row: sqlx::postgres::PgRow) -> AuditLog {
    AuditLog {
        id: row.get("id"),
        user_id: row.get("user_id"),
        username: row.get("username"),
        action: row.get("action"),
        entity_type: row.get("entity_type"),
        entity_id: row.get("entity_id"),
        details: row.get("details"),
        ip_address: row.get("ip_address"),
        user_agent: row.get("user_agent"),
        created_at: row.get("created_at"),
    }
}

impl PgAuditLogRepository {
    /// Create a new audit log repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new audit log entry
    #[instrument(skip(self, data))]
    pub async fn create(&self, data: AuditLogData) -> AppResult<AuditLog> {
        debug!("Creating audit log: {} on {}", data.action, data.entity_type);

        let query = format!(
            r#"
            INSERT INTO audit_logs (
                user_id, username, action, entity_type,
                entity_id, details, ip_address, user_agent
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            AUDIT_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(data.user_id)
            .bind(&data.username)
            .bind(&data.action)
            .bind(&data.entity_type)
            .bind(&data.entity_id)
            .bind(&data.details)
            .bind(&data.ip_address)
            .bind(&data.user_agent)
            .map(map_audit)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error creating audit log: {}", e);
                AppError::Database(format!("Failed to create audit log: {}", e))
            })?;

        Ok(row)
    }

    /// Find audit logs with filters and pagination
    #[allow(clippy::too_many_arguments)]
    #[instrument(skip(self))]
    pub async fn find_with_filters(
        &self,
        username: Option<&str>,
        action: Option<&str>,
        entity_type: Option<&str>,
        entity_id: Option<&str>,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<AuditLog>> {
        debug!("Finding audit logs with filters");

        let query = format!(
            r#"
            SELECT {}
            FROM audit_logs
            WHERE ($1::TEXT IS NULL OR username = $1)
              AND ($2::TEXT IS NULL OR action = $2)
              AND ($3::TEXT IS NULL OR entity_type = $3)
              AND ($4::TEXT IS NULL OR entity_id = $4)
              AND ($5::TIMESTAMPTZ IS NULL OR created_at >= $5)
              AND ($6::TIMESTAMPTZ IS NULL OR created_at <= $6)
            ORDER BY created_at DESC
            LIMIT $7 OFFSET $8
            "#,
            AUDIT_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(username)
            .bind(action)
            .bind(entity_type)
            .bind(entity_id)
            .bind(start_date)
            .bind(end_date)
            .bind(limit)
            .bind(offset)
            .map(map_audit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding audit logs: {}", e);
                AppError::Database(format!("Failed to fetch audit logs: {}", e))
            })?;

        Ok(rows)
    }

    /// Count audit logs matching the same filters
    #[instrument(skip(self))]
    pub async fn count_with_filters(
        &self,
        username: Option<&str>,
        action: Option<&str>,
        entity_type: Option<&str>,
        entity_id: Option<&str>,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM audit_logs
            WHERE ($1::TEXT IS NULL OR username = $1)
              AND ($2::TEXT IS NULL OR action = $2)
              AND ($3::TEXT IS NULL OR entity_type = $3)
              AND ($4::TEXT IS NULL OR entity_id = $4)
              AND ($5::TIMESTAMPTZ IS NULL OR created_at >= $5)
              AND ($6::TIMESTAMPTZ IS NULL OR created_at <= $6)
            "#,
        )
        .bind(username)
        .bind(action)
        .bind(entity_type)
        .bind(entity_id)
        .bind(start_date)
        .bind(end_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error counting audit logs: {}", e);
            AppError::Database(format!("Failed to count audit logs: {}", e))
        })?;

        Ok(result.0)
    }
}
