//! Expense DTOs

use super::common::PaginationParams;
use chrono::{DateTime, NaiveDate, Utc};
use nilestay_core::models::{Currency, Expense, ExpenseCategory};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to create or fully update an expense
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ExpenseRequest {
    pub apartment_id: Option<i32>,

    #[validate(length(min = 1, max = 250, message = "Description is required"))]
    pub description: String,

    pub amount: Decimal,

    #[serde(default)]
    pub currency: Currency,

    #[serde(default)]
    pub category: ExpenseCategory,

    pub incurred_on: NaiveDate,
}

impl ExpenseRequest {
    /// Build a domain expense from this request (id 0 for creation)
    pub fn into_expense(self, id: i32, created_by: &str) -> Expense {
        let now = Utc::now();
        Expense {
            id,
            apartment_id: self.apartment_id,
            description: self.description,
            amount: self.amount,
            currency: self.currency,
            category: self.category,
            incurred_on: self.incurred_on,
            created_by: created_by.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Expense filter parameters for list queries
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ExpenseFilterParams {
    /// Pagination parameters
    #[serde(flatten)]
    #[validate(nested)]
    pub pagination: PaginationParams,

    /// Filter by apartment
    pub apartment_id: Option<i32>,

    /// Filter by category
    pub category: Option<ExpenseCategory>,

    /// Only expenses incurred on or after this date (YYYY-MM-DD)
    #[serde(default)]
    pub from: Option<String>,

    /// Only expenses incurred on or before this date (YYYY-MM-DD)
    #[serde(default)]
    pub to: Option<String>,
}

impl ExpenseFilterParams {
    pub fn from_date(&self) -> Option<NaiveDate> {
        self.from
            .as_deref()
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
    }

    pub fn to_date(&self) -> Option<NaiveDate> {
        self.to
            .as_deref()
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
    }
}

/// Expense API response
#[derive(Debug, Clone, Serialize)]
pub struct ExpenseResponse {
    pub id: i32,
    pub apartment_id: Option<i32>,
    pub description: String,
    pub amount: Decimal,
    pub currency: String,
    pub category: String,
    pub incurred_on: NaiveDate,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Expense> for ExpenseResponse {
    fn from(expense: Expense) -> Self {
        Self {
            id: expense.id,
            apartment_id: expense.apartment_id,
            description: expense.description,
            amount: expense.amount,
            currency: expense.currency.as_str().to_string(),
            category: expense.category.as_str().to_string(),
            incurred_on: expense.incurred_on,
            created_by: expense.created_by,
            created_at: expense.created_at,
            updated_at: expense.updated_at,
        }
    }
}
