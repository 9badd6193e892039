//! Catalog service DTOs

use chrono::{DateTime, Utc};
use nilestay_core::models::CatalogService;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to create or fully update a catalog service
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ServiceRequest {
    #[validate(length(min = 1, max = 120, message = "Name must be between 1 and 120 characters"))]
    pub name: String,

    /// List price in EGP
    #[serde(default)]
    pub price: Decimal,

    #[serde(default)]
    pub is_free: bool,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl ServiceRequest {
    /// Build a domain catalog service from this request (id 0 for creation)
    pub fn into_service(self, id: i32) -> CatalogService {
        let now = Utc::now();
        CatalogService {
            id,
            name: self.name,
            price: self.price,
            is_free: self.is_free,
            enabled: self.enabled,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Catalog service API response
#[derive(Debug, Clone, Serialize)]
pub struct ServiceResponse {
    pub id: i32,
    pub name: String,
    pub price: Decimal,
    pub is_free: bool,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CatalogService> for ServiceResponse {
    fn from(service: CatalogService) -> Self {
        Self {
            id: service.id,
            name: service.name,
            price: service.price,
            is_free: service.is_free,
            enabled: service.enabled,
            created_at: service.created_at,
            updated_at: service.updated_at,
        }
    }
}
