//! Customer (guest) model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Customer entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Unique identifier
    pub id: i32,

    /// Full name
    pub name: String,

    /// Contact phone
    pub phone: Option<String>,

    /// Contact email
    pub email: Option<String>,

    /// National ID or passport number
    pub national_id: Option<String>,

    /// Nationality
    pub nationality: Option<String>,

    /// Free-form notes
    pub notes: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Validate customer data
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Customer name cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for Customer {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            name: String::new(),
            phone: None,
            email: None,
            national_id: None,
            nationality: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }
}
