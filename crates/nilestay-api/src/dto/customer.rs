//! Customer DTOs

use chrono::{DateTime, Utc};
use nilestay_core::models::Customer;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to create or fully update a customer
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CustomerRequest {
    #[validate(length(min = 1, max = 120, message = "Name must be between 1 and 120 characters"))]
    pub name: String,

    pub phone: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    pub national_id: Option<String>,
    pub nationality: Option<String>,
    pub notes: Option<String>,
}

impl CustomerRequest {
    /// Build a domain customer from this request (id 0 for creation)
    pub fn into_customer(self, id: i32) -> Customer {
        let now = Utc::now();
        Customer {
            id,
            name: self.name,
            phone: self.phone,
            email: self.email,
            national_id: self.national_id,
            nationality: self.nationality,
            notes: self.notes,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Customer API response
#[derive(Debug, Clone, Serialize)]
pub struct CustomerResponse {
    pub id: i32,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub national_id: Option<String>,
    pub nationality: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Customer> for CustomerResponse {
    fn from(customer: Customer) -> Self {
        Self {
            id: customer.id,
            name: customer.name,
            phone: customer.phone,
            email: customer.email,
            national_id: customer.national_id,
            nationality: customer.nationality,
            notes: customer.notes,
            created_at: customer.created_at,
            updated_at: customer.updated_at,
        }
    }
}
