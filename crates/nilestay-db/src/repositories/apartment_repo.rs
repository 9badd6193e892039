//! Apartment repository implementation
//!
//! Provides PostgreSQL-backed storage for the unit inventory.

use nilestay_core::{
    models::Apartment,
    traits::{ApartmentRepository, Repository},
    AppError, AppResult,
};
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::{debug, error, instrument};

/// PostgreSQL implementation of ApartmentRepository
pub struct PgApartmentRepository {
    pool: PgPool,
}

const APARTMENT_COLUMNS: &str = r#"
    id, name, address,
    owner_name, owner_phone, owner_email,
    contract_start, contract_end,
    daily_price, monthly_price,
    notes, active, created_at, updated_at
"#;

fn map_apartment(row: sqlx::postgres::PgRow) -> Apartment {
    Apartment {
        id: row.get("id"),
        name: row.get("name"),
        address: row.get("address"),
        owner_name: row.get("owner_name"),
        owner_phone: row.get("owner_phone"),
        owner_email: row.get("owner_email"),
        contract_start: row.get("contract_start"),
        contract_end: row.get("contract_end"),
        daily_price: row.get("daily_price"),
        monthly_price: row.get("monthly_price"),
        notes: row.get("notes"),
        active: row.get("active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl PgApartmentRepository {
    /// Create a new apartment repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Apartment, i32> for PgApartmentRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Apartment>> {
        debug!("Finding apartment by id: {}", id);

        let query = format!("SELECT {} FROM apartments WHERE id = $1", APARTMENT_COLUMNS);

        let result = sqlx::query(&query)
            .bind(id)
            .map(map_apartment)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding apartment {}: {}", id, e);
                AppError::Database(format!("Failed to find apartment: {}", e))
            })?;

        Ok(result)
    }

    #[instrument(skip(self))]
    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<Apartment>> {
        debug!("Finding all apartments with limit {} offset {}", limit, offset);

        let query = format!(
            "SELECT {} FROM apartments ORDER BY name LIMIT $1 OFFSET $2",
            APARTMENT_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(limit)
            .bind(offset)
            .map(map_apartment)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding apartments: {}", e);
                AppError::Database(format!("Failed to fetch apartments: {}", e))
            })?;

        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM apartments")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting apartments: {}", e);
                AppError::Database(format!("Failed to count apartments: {}", e))
            })?;

        Ok(result.0)
    }

    #[instrument(skip(self, entity))]
    async fn create(&self, entity: &Apartment) -> AppResult<Apartment> {
        debug!("Creating apartment: {}", entity.name);

        let query = format!(
            r#"
            INSERT INTO apartments (
                name, address,
                owner_name, owner_phone, owner_email,
                contract_start, contract_end,
                daily_price, monthly_price,
                notes, active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            APARTMENT_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(&entity.name)
            .bind(&entity.address)
            .bind(&entity.owner_name)
            .bind(&entity.owner_phone)
            .bind(&entity.owner_email)
            .bind(entity.contract_start)
            .bind(entity.contract_end)
            .bind(entity.daily_price)
            .bind(entity.monthly_price)
            .bind(&entity.notes)
            .bind(entity.active)
            .map(map_apartment)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error creating apartment: {}", e);
                if e.to_string().contains("unique constraint") {
                    AppError::AlreadyExists(format!("Apartment {} already exists", entity.name))
                } else {
                    AppError::Database(format!("Failed to create apartment: {}", e))
                }
            })?;

        Ok(row)
    }

    #[instrument(skip(self, entity))]
    async fn update(&self, entity: &Apartment) -> AppResult<Apartment> {
        debug!("Updating apartment: {}", entity.id);

        let query = format!(
            r#"
            UPDATE apartments
            SET name = $2,
                address = $3,
                owner_name = $4,
                owner_phone = $5,
                owner_email = $6,
                contract_start = $7,
                contract_end = $8,
                daily_price = $9,
                monthly_price = $10,
                notes = $11,
                active = $12,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            APARTMENT_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(entity.id)
            .bind(&entity.name)
            .bind(&entity.address)
            .bind(&entity.owner_name)
            .bind(&entity.owner_phone)
            .bind(&entity.owner_email)
            .bind(entity.contract_start)
            .bind(entity.contract_end)
            .bind(entity.daily_price)
            .bind(entity.monthly_price)
            .bind(&entity.notes)
            .bind(entity.active)
            .map(map_apartment)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error updating apartment {}: {}", entity.id, e);
                AppError::Database(format!("Failed to update apartment: {}", e))
            })?;

        Ok(row)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i32) -> AppResult<bool> {
        debug!("Deleting apartment: {}", id);

        let result = sqlx::query("DELETE FROM apartments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting apartment {}: {}", id, e);
                AppError::Database(format!("Failed to delete apartment: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ApartmentRepository for PgApartmentRepository {
    #[instrument(skip(self))]
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Apartment>> {
        debug!("Finding apartment by name: {}", name);

        let query = format!("SELECT {} FROM apartments WHERE name = $1", APARTMENT_COLUMNS);

        let result = sqlx::query(&query)
            .bind(name)
            .map(map_apartment)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding apartment by name: {}", e);
                AppError::Database(format!("Failed to find apartment: {}", e))
            })?;

        Ok(result)
    }

    #[instrument(skip(self))]
    async fn list_active(&self) -> AppResult<Vec<Apartment>> {
        let query = format!(
            "SELECT {} FROM apartments WHERE active ORDER BY name",
            APARTMENT_COLUMNS
        );

        let rows = sqlx::query(&query)
            .map(map_apartment)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error listing active apartments: {}", e);
                AppError::Database(format!("Failed to fetch apartments: {}", e))
            })?;

        Ok(rows)
    }
}
