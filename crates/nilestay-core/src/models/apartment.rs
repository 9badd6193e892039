//! Apartment model
//!
//! A unit in the rental inventory, together with its owner-contract window
//! and its rate card (EGP daily and monthly list prices).

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An apartment's price list
///
/// Both prices are EGP. A zero `monthly_price` means the unit has no
/// monthly tier and is always billed nightly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateCard {
    /// Price per night
    pub daily_price: Decimal,

    /// Price per 30-night month (0 = no monthly tier)
    pub monthly_price: Decimal,
}

impl RateCard {
    pub fn has_monthly_tier(&self) -> bool {
        self.monthly_price > Decimal::ZERO
    }

    /// Validate rate card invariants (both prices non-negative)
    pub fn validate(&self) -> Result<(), String> {
        if self.daily_price < Decimal::ZERO {
            return Err("Daily price cannot be negative".to_string());
        }
        if self.monthly_price < Decimal::ZERO {
            return Err("Monthly price cannot be negative".to_string());
        }
        Ok(())
    }
}

/// Apartment entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Apartment {
    /// Unique identifier
    pub id: i32,

    /// Display name (e.g. "Zamalek 3B")
    pub name: String,

    /// Street address
    pub address: Option<String>,

    /// Name of the unit's owner
    pub owner_name: String,

    /// Owner contact phone
    pub owner_phone: Option<String>,

    /// Owner contact email
    pub owner_email: Option<String>,

    /// Owner contract start date
    pub contract_start: Option<NaiveDate>,

    /// Owner contract end date
    pub contract_end: Option<NaiveDate>,

    /// Nightly price in EGP
    pub daily_price: Decimal,

    /// Monthly price in EGP (0 = no monthly tier)
    pub monthly_price: Decimal,

    /// Free-form notes
    pub notes: Option<String>,

    /// Whether the unit is currently in inventory
    pub active: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Apartment {
    /// Project the apartment's prices into a rate card
    pub fn rate_card(&self) -> RateCard {
        RateCard {
            daily_price: self.daily_price,
            monthly_price: self.monthly_price,
        }
    }

    /// Whether the owner contract covers the given date.
    ///
    /// An open-ended (absent) boundary counts as covered.
    pub fn contract_covers(&self, date: NaiveDate) -> bool {
        let after_start = self.contract_start.map_or(true, |s| date >= s);
        let before_end = self.contract_end.map_or(true, |e| date <= e);
        after_start && before_end
    }

    /// Validate apartment configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Apartment name cannot be empty".to_string());
        }
        if self.owner_name.trim().is_empty() {
            return Err("Owner name cannot be empty".to_string());
        }
        self.rate_card().validate()?;
        if let (Some(start), Some(end)) = (self.contract_start, self.contract_end) {
            if end < start {
                return Err("Owner contract cannot end before it starts".to_string());
            }
        }
        Ok(())
    }
}

impl Default for Apartment {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            name: String::new(),
            address: None,
            owner_name: String::new(),
            owner_phone: None,
            owner_email: None,
            contract_start: None,
            contract_end: None,
            daily_price: Decimal::ZERO,
            monthly_price: Decimal::ZERO,
            notes: None,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn test_apartment() -> Apartment {
        Apartment {
            id: 1,
            name: "Zamalek 3B".to_string(),
            owner_name: "A. Hassan".to_string(),
            daily_price: dec!(1000),
            monthly_price: dec!(25000),
            ..Default::default()
        }
    }

    #[test]
    fn test_rate_card_projection() {
        let apartment = test_apartment();
        let card = apartment.rate_card();
        assert_eq!(card.daily_price, dec!(1000));
        assert_eq!(card.monthly_price, dec!(25000));
        assert!(card.has_monthly_tier());
    }

    #[test]
    fn test_no_monthly_tier() {
        let card = RateCard {
            daily_price: dec!(1000),
            monthly_price: Decimal::ZERO,
        };
        assert!(!card.has_monthly_tier());
        assert!(card.validate().is_ok());
    }

    #[test]
    fn test_negative_price_rejected() {
        let mut apartment = test_apartment();
        apartment.daily_price = dec!(-1);
        assert!(apartment.validate().is_err());

        let mut apartment = test_apartment();
        apartment.monthly_price = dec!(-25000);
        assert!(apartment.validate().is_err());
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut apartment = test_apartment();
        apartment.name = "  ".to_string();
        assert!(apartment.validate().is_err());
    }

    #[test]
    fn test_inverted_contract_rejected() {
        let mut apartment = test_apartment();
        apartment.contract_start = NaiveDate::from_ymd_opt(2025, 6, 1);
        apartment.contract_end = NaiveDate::from_ymd_opt(2025, 1, 1);
        assert!(apartment.validate().is_err());
    }

    #[test]
    fn test_contract_covers() {
        let mut apartment = test_apartment();
        apartment.contract_start = NaiveDate::from_ymd_opt(2025, 1, 1);
        apartment.contract_end = NaiveDate::from_ymd_opt(2025, 12, 31);

        let inside = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let outside = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        assert!(apartment.contract_covers(inside));
        assert!(!apartment.contract_covers(outside));

        apartment.contract_end = None;
        assert!(apartment.contract_covers(outside));
    }
}
