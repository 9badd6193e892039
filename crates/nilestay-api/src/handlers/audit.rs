//! Audit log handlers (admin only)

use crate::dto::{AuditFilterParams, AuditLogResponse};
use actix_web::{web, HttpResponse};
use nilestay_auth::AdminUser;
use nilestay_core::traits::PaginatedResponse;
use nilestay_core::AppError;
use nilestay_db::PgAuditLogRepository;
use sqlx::PgPool;
use tracing::{debug, instrument, warn};
use validator::Validate;

/// List audit logs with filters (admin only)
#[instrument(skip(pool, _admin, query))]
pub async fn list_audit_logs(
    pool: web::Data<PgPool>,
    _admin: AdminUser,
    query: web::Query<AuditFilterParams>,
) -> Result<HttpResponse, AppError> {
    query.validate().map_err(|e| {
        warn!("Invalid audit query parameters: {}", e);
        AppError::Validation(e.to_string())
    })?;

    debug!("Listing audit logs");

    let repo = PgAuditLogRepository::new(pool.get_ref().clone());

    let logs = repo
        .find_with_filters(
            query.username.as_deref(),
            query.action.as_deref(),
            query.entity_type.as_deref(),
            query.entity_id.as_deref(),
            query.start(),
            query.end(),
            query.pagination.limit(),
            query.pagination.offset(),
        )
        .await?;

    let total = repo
        .count_with_filters(
            query.username.as_deref(),
            query.action.as_deref(),
            query.entity_type.as_deref(),
            query.entity_id.as_deref(),
            query.start(),
            query.end(),
        )
        .await?;

    let data: Vec<AuditLogResponse> = logs.into_iter().map(Into::into).collect();
    let response: PaginatedResponse<AuditLogResponse> = query.pagination.paginate(data, total);

    Ok(HttpResponse::Ok().json(response))
}

/// Configure audit routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/audit").route("", web::get().to(list_audit_logs)));
}
