//! Catalog service repository implementation

use nilestay_core::{
    models::CatalogService,
    traits::{Repository, ServiceRepository},
    AppError, AppResult,
};
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::{debug, error, instrument};

/// PostgreSQL implementation of ServiceRepository
pub struct PgServiceRepository {
    pool: PgPool,
}

const SERVICE_COLUMNS: &str = r#"
    id, name, price, is_free, enabled, created_at, updated_at
"#;

fn map_service(row: sqlx::postgres::PgRow) -> CatalogService {
    CatalogService {
        id: row.get("id"),
        name: row.get("name"),
        price: row.get("price"),
        is_free: row.get("is_free"),
        enabled: row.get("enabled"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl PgServiceRepository {
    /// Create a new service repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<CatalogService, i32> for PgServiceRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> AppResult<Option<CatalogService>> {
        debug!("Finding service by id: {}", id);

        let query = format!("SELECT {} FROM services WHERE id = $1", SERVICE_COLUMNS);

        let result = sqlx::query(&query)
            .bind(id)
            .map(map_service)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding service {}: {}", id, e);
                AppError::Database(format!("Failed to find service: {}", e))
            })?;

        Ok(result)
    }

    #[instrument(skip(self))]
    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<CatalogService>> {
        let query = format!(
            "SELECT {} FROM services ORDER BY name LIMIT $1 OFFSET $2",
            SERVICE_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(limit)
            .bind(offset)
            .map(map_service)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding services: {}", e);
                AppError::Database(format!("Failed to fetch services: {}", e))
            })?;

        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM services")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting services: {}", e);
                AppError::Database(format!("Failed to count services: {}", e))
            })?;

        Ok(result.0)
    }

    #[instrument(skip(self, entity))]
    async fn create(&self, entity: &CatalogService) -> AppResult<CatalogService> {
        debug!("Creating service: {}", entity.name);

        let query = format!(
            r#"
            INSERT INTO services (name, price, is_free, enabled)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            SERVICE_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(&entity.name)
            .bind(entity.price)
            .bind(entity.is_free)
            .bind(entity.enabled)
            .map(map_service)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error creating service: {}", e);
                AppError::Database(format!("Failed to create service: {}", e))
            })?;

        Ok(row)
    }

    #[instrument(skip(self, entity))]
    async fn update(&self, entity: &CatalogService) -> AppResult<CatalogService> {
        debug!("Updating service: {}", entity.id);

        let query = format!(
            r#"
            UPDATE services
            SET name = $2,
                price = $3,
                is_free = $4,
                enabled = $5,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            SERVICE_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(entity.id)
            .bind(&entity.name)
            .bind(entity.price)
            .bind(entity.is_free)
            .bind(entity.enabled)
            .map(map_service)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error updating service {}: {}", entity.id, e);
                AppError::Database(format!("Failed to update service: {}", e))
            })?;

        Ok(row)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i32) -> AppResult<bool> {
        debug!("Deleting service: {}", id);

        // Committed bookings keep their materialized snapshots; deleting a
        // catalog entry only removes it from future selection.
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting service {}: {}", id, e);
                AppError::Database(format!("Failed to delete service: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ServiceRepository for PgServiceRepository {
    #[instrument(skip(self))]
    async fn list_enabled(&self) -> AppResult<Vec<CatalogService>> {
        let query = format!(
            "SELECT {} FROM services WHERE enabled ORDER BY name",
            SERVICE_COLUMNS
        );

        let rows = sqlx::query(&query)
            .map(map_service)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error listing enabled services: {}", e);
                AppError::Database(format!("Failed to fetch services: {}", e))
            })?;

        Ok(rows)
    }
}
