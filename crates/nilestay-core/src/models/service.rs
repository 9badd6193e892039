//! Catalog service model
//!
//! Reusable, named add-ons (airport pickup, cleaning, late checkout...)
//! with an EGP list price. Bookings reference catalog entries by id; at
//! commit time the selection is snapshotted into per-booking stay services,
//! so later catalog edits never touch committed bookings.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Catalog service entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogService {
    /// Unique identifier
    pub id: i32,

    /// Service name
    pub name: String,

    /// List price in EGP
    pub price: Decimal,

    /// Complimentary service (always carries a zero price)
    pub is_free: bool,

    /// Whether the service is selectable for new bookings
    pub enabled: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl CatalogService {
    /// Validate catalog entry configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Service name cannot be empty".to_string());
        }
        if self.price < Decimal::ZERO {
            return Err("Service price cannot be negative".to_string());
        }
        if self.is_free && !self.price.is_zero() {
            return Err("Free services must have a zero price".to_string());
        }
        Ok(())
    }
}

impl Default for CatalogService {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            name: String::new(),
            price: Decimal::ZERO,
            is_free: false,
            enabled: true,
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
    fn test_valid_service() {
        let service = CatalogService {
            id: 1,
            name: "Airport pickup".to_string(),
            price: dec!(350),
            ..Default::default()
        };
        assert!(service.validate().is_ok());
    }

    #[test]
    fn test_free_service_must_be_zero_priced() {
        let service = CatalogService {
            name: "Welcome basket".to_string(),
            price: dec!(50),
            is_free: true,
            ..Default::default()
        };
        assert!(service.validate().is_err());

        let service = CatalogService {
            name: "Welcome basket".to_string(),
            price: Decimal::ZERO,
            is_free: true,
            ..Default::default()
        };
        assert!(service.validate().is_ok());
    }

    #[test]
    fn test_negative_price_rejected() {
        let service = CatalogService {
            name: "Cleaning".to_string(),
            price: dec!(-10),
            ..Default::default()
        };
        assert!(service.validate().is_err());
    }
}
