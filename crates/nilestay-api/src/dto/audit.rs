//! Audit log DTOs

use super::common::PaginationParams;
use chrono::{DateTime, Utc};
use nilestay_core::models::AuditLog;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use validator::Validate;

/// Audit log filter parameters
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AuditFilterParams {
    /// Pagination parameters
    #[serde(flatten)]
    #[validate(nested)]
    pub pagination: PaginationParams,

    /// Filter by username
    pub username: Option<String>,

    /// Filter by action
    pub action: Option<String>,

    /// Filter by entity type
    pub entity_type: Option<String>,

    /// Filter by entity id
    pub entity_id: Option<String>,

    /// Filter by minimum timestamp (ISO 8601)
    #[serde(default)]
    pub start_date: Option<String>,

    /// Filter by maximum timestamp (ISO 8601)
    #[serde(default)]
    pub end_date: Option<String>,
}

impl AuditFilterParams {
    pub fn start(&self) -> Option<DateTime<Utc>> {
        parse_datetime(self.start_date.as_deref())
    }

    pub fn end(&self) -> Option<DateTime<Utc>> {
        parse_datetime(self.end_date.as_deref())
    }
}

fn parse_datetime(value: Option<&str>) -> Option<DateTime<Utc>> {
    value.and_then(|s| {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    })
}

/// Audit log API response
#[derive(Debug, Clone, Serialize)]
pub struct AuditLogResponse {
    pub id: i64,
    pub user_id: Option<i32>,
    pub username: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub details: Option<JsonValue>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<AuditLog> for AuditLogResponse {
    fn from(log: AuditLog) -> Self {
        Self {
            id: log.id,
            user_id: log.user_id,
            username: log.username,
            action: log.action,
            entity_type: log.entity_type,
            entity_id: log.entity_id,
            details: log.details,
            ip_address: log.ip_address,
            created_at: log.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_datetime() {
        assert!(parse_datetime(Some("2025-06-01T00:00:00Z")).is_some());
        assert!(parse_datetime(Some("not a date")).is_none());
        assert!(parse_datetime(None).is_none());
    }
}
