//! Apartment DTOs

use chrono::{DateTime, NaiveDate, Utc};
use nilestay_core::models::Apartment;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to create or fully update an apartment
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ApartmentRequest {
    #[validate(length(min = 1, max = 120, message = "Name must be between 1 and 120 characters"))]
    pub name: String,

    pub address: Option<String>,

    #[validate(length(min = 1, message = "Owner name is required"))]
    pub owner_name: String,

    pub owner_phone: Option<String>,

    #[validate(email(message = "Invalid owner email format"))]
    pub owner_email: Option<String>,

    pub contract_start: Option<NaiveDate>,
    pub contract_end: Option<NaiveDate>,

    /// Nightly price in EGP
    pub daily_price: Decimal,

    /// Monthly price in EGP (0 = no monthly tier)
    #[serde(default)]
    pub monthly_price: Decimal,

    pub notes: Option<String>,

    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl ApartmentRequest {
    /// Build a domain apartment from this request (id 0 for creation)
    pub fn into_apartment(self, id: i32) -> Apartment {
        let now = Utc::now();
        Apartment {
            id,
            name: self.name,
            address: self.address,
            owner_name: self.owner_name,
            owner_phone: self.owner_phone,
            owner_email: self.owner_email,
            contract_start: self.contract_start,
            contract_end: self.contract_end,
            daily_price: self.daily_price,
            monthly_price: self.monthly_price,
            notes: self.notes,
            active: self.active,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Apartment API response
#[derive(Debug, Clone, Serialize)]
pub struct ApartmentResponse {
    pub id: i32,
    pub name: String,
    pub address: Option<String>,
    pub owner_name: String,
    pub owner_phone: Option<String>,
    pub owner_email: Option<String>,
    pub contract_start: Option<NaiveDate>,
    pub contract_end: Option<NaiveDate>,
    pub daily_price: Decimal,
    pub monthly_price: Decimal,
    pub notes: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Apartment> for ApartmentResponse {
    fn from(apartment: Apartment) -> Self {
        Self {
            id: apartment.id,
            name: apartment.name,
            address: apartment.address,
            owner_name: apartment.owner_name,
            owner_phone: apartment.owner_phone,
            owner_email: apartment.owner_email,
            contract_start: apartment.contract_start,
            contract_end: apartment.contract_end,
            daily_price: apartment.daily_price,
            monthly_price: apartment.monthly_price,
            notes: apartment.notes,
            active: apartment.active,
            created_at: apartment.created_at,
            updated_at: apartment.updated_at,
        }
    }
}
