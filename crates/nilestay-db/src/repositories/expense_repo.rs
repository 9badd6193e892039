//! Expense repository implementation

use chrono::NaiveDate;
use nilestay_core::{
    models::{Currency, Expense, ExpenseCategory},
    traits::{ExpenseRepository, Repository},
    AppError, AppResult,
};
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::{debug, error, instrument};

/// PostgreSQL implementation of ExpenseRepository
pub struct PgExpenseRepository {
    pool: PgPool,
}

const EXPENSE_COLUMNS: &str = r#"
    id, apartment_id, description, amount, currency,
    category, incurred_on, created_by, created_at, updated_at
"#;

fn map_expense(row: sqlx::postgres::PgRow) -> Expense {
    Expense {
        id: row.get("id"),
        apartment_id: row.get("apartment_id"),
        description: row.get("description"),
        amount: row.get("amount"),
        currency: Currency::from_str(row.get("currency")).unwrap_or_default(),
        category: ExpenseCategory::from_str(row.get("category")).unwrap_or_default(),
        incurred_on: row.get("incurred_on"),
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl PgExpenseRepository {
    /// Create a new expense repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Expense, i32> for PgExpenseRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Expense>> {
        debug!("Finding expense by id: {}", id);

        let query = format!("SELECT {} FROM expenses WHERE id = $1", EXPENSE_COLUMNS);

        let result = sqlx::query(&query)
            .bind(id)
            .map(map_expense)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding expense {}: {}", id, e);
                AppError::Database(format!("Failed to find expense: {}", e))
            })?;

        Ok(result)
    }

    #[instrument(skip(self))]
    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<Expense>> {
        let query = format!(
            "SELECT {} FROM expenses ORDER BY incurred_on DESC LIMIT $1 OFFSET $2",
            EXPENSE_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(limit)
            .bind(offset)
            .map(map_expense)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding expenses: {}", e);
                AppError::Database(format!("Failed to fetch expenses: {}", e))
            })?;

        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM expenses")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting expenses: {}", e);
                AppError::Database(format!("Failed to count expenses: {}", e))
            })?;

        Ok(result.0)
    }

    #[instrument(skip(self, entity))]
    async fn create(&self, entity: &Expense) -> AppResult<Expense> {
        debug!("Creating expense: {}", entity.description);

        let query = format!(
            r#"
            INSERT INTO expenses (
                apartment_id, description, amount, currency,
                category, incurred_on, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            EXPENSE_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(entity.apartment_id)
            .bind(&entity.description)
            .bind(entity.amount)
            .bind(entity.currency.as_str())
            .bind(entity.category.as_str())
            .bind(entity.incurred_on)
            .bind(&entity.created_by)
            .map(map_expense)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error creating expense: {}", e);
                AppError::Database(format!("Failed to create expense: {}", e))
            })?;

        Ok(row)
    }

    #[instrument(skip(self, entity))]
    async fn update(&self, entity: &Expense) -> AppResult<Expense> {
        debug!("Updating expense: {}", entity.id);

        let query = format!(
            r#"
            UPDATE expenses
            SET apartment_id = $2,
                description = $3,
                amount = $4,
                currency = $5,
                category = $6,
                incurred_on = $7,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            EXPENSE_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(entity.id)
            .bind(entity.apartment_id)
            .bind(&entity.description)
            .bind(entity.amount)
            .bind(entity.currency.as_str())
            .bind(entity.category.as_str())
            .bind(entity.incurred_on)
            .map(map_expense)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error updating expense {}: {}", entity.id, e);
                AppError::Database(format!("Failed to update expense: {}", e))
            })?;

        Ok(row)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i32) -> AppResult<bool> {
        debug!("Deleting expense: {}", id);

        let result = sqlx::query("DELETE FROM expenses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting expense {}: {}", id, e);
                AppError::Database(format!("Failed to delete expense: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ExpenseRepository for PgExpenseRepository {
    #[instrument(skip(self))]
    async fn list_filtered(
        &self,
        apartment_id: Option<i32>,
        category: Option<ExpenseCategory>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Expense>, i64)> {
        debug!("Listing expenses with filters");

        let category_str = category.map(|c| c.as_str().to_string());

        let query = format!(
            r#"
            SELECT {}
            FROM expenses
            WHERE ($1::INT4 IS NULL OR apartment_id = $1)
              AND ($2::TEXT IS NULL OR category = $2)
              AND ($3::DATE IS NULL OR incurred_on >= $3)
              AND ($4::DATE IS NULL OR incurred_on <= $4)
            ORDER BY incurred_on DESC
            LIMIT $5 OFFSET $6
            "#,
            EXPENSE_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(apartment_id)
            .bind(&category_str)
            .bind(from)
            .bind(to)
            .bind(limit)
            .bind(offset)
            .map(map_expense)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error listing expenses: {}", e);
                AppError::Database(format!("Failed to fetch expenses: {}", e))
            })?;

        let total: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM expenses
            WHERE ($1::INT4 IS NULL OR apartment_id = $1)
              AND ($2::TEXT IS NULL OR category = $2)
              AND ($3::DATE IS NULL OR incurred_on >= $3)
              AND ($4::DATE IS NULL OR incurred_on <= $4)
            "#,
        )
        .bind(apartment_id)
        .bind(&category_str)
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error counting expenses: {}", e);
            AppError::Database(format!("Failed to count expenses: {}", e))
        })?;

        Ok((rows, total.0))
    }
}
