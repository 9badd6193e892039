//! Customer repository implementation

use nilestay_core::{
    models::Customer,
    traits::{CustomerRepository, Repository},
    AppError, AppResult,
};
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::{debug, error, instrument};

/// PostgreSQL implementation of CustomerRepository
pub struct PgCustomerRepository {
    pool: PgPool,
}

const CUSTOMER_COLUMNS: &str = r#"
    id, name, phone, email,
    national_id, nationality, notes,
    created_at, updated_at
"#;

fn map_customer(row: sqlx::postgres::PgRow) -> Customer {
    Customer {
        id: row.get("id"),
        name: row.get("name"),
        phone: row.get("phone"),
        email: row.get("email"),
        national_id: row.get("national_id"),
        nationality: row.get("nationality"),
        notes: row.get("notes"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl PgCustomerRepository {
    /// Create a new customer repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Customer, i32> for PgCustomerRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Customer>> {
        debug!("Finding customer by id: {}", id);

        let query = format!("SELECT {} FROM customers WHERE id = $1", CUSTOMER_COLUMNS);

        let result = sqlx::query(&query)
            .bind(id)
            .map(map_customer)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding customer {}: {}", id, e);
                AppError::Database(format!("Failed to find customer: {}", e))
            })?;

        Ok(result)
    }

    #[instrument(skip(self))]
    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<Customer>> {
        let query = format!(
            "SELECT {} FROM customers ORDER BY name LIMIT $1 OFFSET $2",
            CUSTOMER_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(limit)
            .bind(offset)
            .map(map_customer)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding customers: {}", e);
                AppError::Database(format!("Failed to fetch customers: {}", e))
            })?;

        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting customers: {}", e);
                AppError::Database(format!("Failed to count customers: {}", e))
            })?;

        Ok(result.0)
    }

    #[instrument(skip(self, entity))]
    async fn create(&self, entity: &Customer) -> AppResult<Customer> {
        debug!("Creating customer: {}", entity.name);

        let query = format!(
            r#"
            INSERT INTO customers (
                name, phone, email, national_id, nationality, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            CUSTOMER_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(&entity.name)
            .bind(&entity.phone)
            .bind(&entity.email)
            .bind(&entity.national_id)
            .bind(&entity.nationality)
            .bind(&entity.notes)
            .map(map_customer)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error creating customer: {}", e);
                AppError::Database(format!("Failed to create customer: {}", e))
            })?;

        Ok(row)
    }

    #[instrument(skip(self, entity))]
    async fn update(&self, entity: &Customer) -> AppResult<Customer> {
        debug!("Updating customer: {}", entity.id);

        let query = format!(
            r#"
            UPDATE customers
            SET name = $2,
                phone = $3,
                email = $4,
                national_id = $5,
                nationality = $6,
                notes = $7,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            CUSTOMER_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(entity.id)
            .bind(&entity.name)
            .bind(&entity.phone)
            .bind(&entity.email)
            .bind(&entity.national_id)
            .bind(&entity.nationality)
            .bind(&entity.notes)
            .map(map_customer)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error updating customer {}: {}", entity.id, e);
                AppError::Database(format!("Failed to update customer: {}", e))
            })?;

        Ok(row)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i32) -> AppResult<bool> {
        debug!("Deleting customer: {}", id);

        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting customer {}: {}", id, e);
                AppError::Database(format!("Failed to delete customer: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CustomerRepository for PgCustomerRepository {
    #[instrument(skip(self))]
    async fn find_by_phone(&self, phone: &str) -> AppResult<Option<Customer>> {
        debug!("Finding customer by phone: {}", phone);

        let query = format!("SELECT {} FROM customers WHERE phone = $1", CUSTOMER_COLUMNS);

        let result = sqlx::query(&query)
            .bind(phone)
            .map(map_customer)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding customer by phone: {}", e);
                AppError::Database(format!("Failed to find customer: {}", e))
            })?;

        Ok(result)
    }

    #[instrument(skip(self))]
    async fn search(
        &self,
        query_text: &str,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Customer>, i64)> {
        debug!("Searching customers: {}", query_text);

        let pattern = format!("%{}%", query_text);

        let query = format!(
            r#"
            SELECT {}
            FROM customers
            WHERE name ILIKE $1 OR phone ILIKE $1
            ORDER BY name
            LIMIT $2 OFFSET $3
            "#,
            CUSTOMER_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(&pattern)
            .bind(limit)
            .bind(offset)
            .map(map_customer)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error searching customers: {}", e);
                AppError::Database(format!("Failed to search customers: {}", e))
            })?;

        let total: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM customers WHERE name ILIKE $1 OR phone ILIKE $1",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error counting customer search: {}", e);
            AppError::Database(format!("Failed to count customers: {}", e))
        })?;

        Ok((rows, total.0))
    }
}
