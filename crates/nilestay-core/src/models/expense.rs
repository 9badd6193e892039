//! Expense model
//!
//! Maintenance and operating spend, optionally tied to one apartment.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Currency;

/// Expense category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    #[default]
    Maintenance,
    Cleaning,
    Utilities,
    Supplies,
    Other,
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ExpenseCategory {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "maintenance" => Some(ExpenseCategory::Maintenance),
            "cleaning" => Some(ExpenseCategory::Cleaning),
            "utilities" => Some(ExpenseCategory::Utilities),
            "supplies" => Some(ExpenseCategory::Supplies),
            "other" => Some(ExpenseCategory::Other),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Maintenance => "maintenance",
            ExpenseCategory::Cleaning => "cleaning",
            ExpenseCategory::Utilities => "utilities",
            ExpenseCategory::Supplies => "supplies",
            ExpenseCategory::Other => "other",
        }
    }
}

/// Expense entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    /// Unique identifier
    pub id: i32,

    /// Apartment the expense belongs to (None = operation-wide)
    pub apartment_id: Option<i32>,

    /// What the money was spent on
    pub description: String,

    /// Amount spent
    pub amount: Decimal,

    /// Currency of the amount
    pub currency: Currency,

    /// Expense category
    pub category: ExpenseCategory,

    /// Date the expense was incurred
    pub incurred_on: NaiveDate,

    /// Username of the staff member who recorded it
    pub created_by: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// The expense amount normalized to EGP for aggregation
    pub fn amount_in_egp(&self, usd_to_egp_rate: Decimal) -> Decimal {
        self.currency.to_egp(self.amount, usd_to_egp_rate)
    }

    /// Validate expense data
    pub fn validate(&self) -> Result<(), String> {
        if self.description.trim().is_empty() {
            return Err("Expense description cannot be empty".to_string());
        }
        if self.amount < Decimal::ZERO {
            return Err("Expense amount cannot be negative".to_string());
        }
        Ok(())
    }
}

impl Default for Expense {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            apartment_id: None,
            description: String::new(),
            amount: Decimal::ZERO,
            currency: Currency::Egp,
            category: ExpenseCategory::Maintenance,
            incurred_on: now.date_naive(),
            created_by: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_in_egp() {
        let expense = Expense {
            description: "AC repair".to_string(),
            amount: dec!(40),
            currency: Currency::Usd,
            ..Default::default()
        };
        assert_eq!(expense.amount_in_egp(dec!(50)), dec!(2000));

        let expense = Expense {
            description: "Plumbing".to_string(),
            amount: dec!(800),
            currency: Currency::Egp,
            ..Default::default()
        };
        assert_eq!(expense.amount_in_egp(dec!(50)), dec!(800));
    }

    #[test]
    fn test_validation() {
        let expense = Expense {
            description: "".to_string(),
            amount: dec!(10),
            ..Default::default()
        };
        assert!(expense.validate().is_err());

        let expense = Expense {
            description: "Bulbs".to_string(),
            amount: dec!(-10),
            ..Default::default()
        };
        assert!(expense.validate().is_err());
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!(
            ExpenseCategory::from_str("cleaning"),
            Some(ExpenseCategory::Cleaning)
        );
        assert_eq!(ExpenseCategory::from_str("rent"), None);
    }
}
