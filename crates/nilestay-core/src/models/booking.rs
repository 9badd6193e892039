//! Booking model
//!
//! A booking is a guest stay (or a non-revenue maintenance block) on one
//! apartment, together with its full financial record: base price, stay
//! services, discount, payments, and commission. The derived financial
//! fields are owned by the finance engine and recomputed wholesale on
//! every mutation, never patched in place.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::Currency;

/// Booking lifecycle status
///
/// Normal flow is `confirmed -> stay -> checked_out`, with `cancelled` and
/// `maintenance` as side exits from `confirmed`. Transitions are not
/// enforced; the system only reacts to the current value. `maintenance`
/// zeroes the financial derivation, `cancelled` keeps its figures but is
/// excluded from revenue reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Reserved, guest not yet arrived
    #[default]
    Confirmed,
    /// Guest currently in the unit
    Stay,
    /// Stay completed
    CheckedOut,
    /// Reservation cancelled
    Cancelled,
    /// Non-revenue maintenance block
    Maintenance,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl BookingStatus {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "confirmed" => Some(BookingStatus::Confirmed),
            "stay" => Some(BookingStatus::Stay),
            "checked_out" => Some(BookingStatus::CheckedOut),
            "cancelled" => Some(BookingStatus::Cancelled),
            "maintenance" => Some(BookingStatus::Maintenance),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Stay => "stay",
            BookingStatus::CheckedOut => "checked_out",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Maintenance => "maintenance",
        }
    }

    /// Non-revenue maintenance block
    pub fn is_maintenance(&self) -> bool {
        matches!(self, BookingStatus::Maintenance)
    }

    /// Counts toward revenue, commission, and customer reporting
    pub fn is_revenue(&self) -> bool {
        !matches!(self, BookingStatus::Cancelled | BookingStatus::Maintenance)
    }

    /// Takes the unit out of inventory for its date range
    pub fn blocks_inventory(&self) -> bool {
        matches!(
            self,
            BookingStatus::Confirmed | BookingStatus::Stay | BookingStatus::Maintenance
        )
    }
}

/// Payment status derived from the booking's total and paid amount
///
/// Always recomputed by the finance engine from `total_amount` and
/// `paid_amount`, never hand-set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Nothing received yet
    #[default]
    Unpaid,
    /// Some money received, balance outstanding
    Partial,
    /// Balance fully settled
    Paid,
    /// Non-revenue booking (maintenance block); no payment applies
    NotApplicable,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PaymentStatus {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "unpaid" => Some(PaymentStatus::Unpaid),
            "partial" => Some(PaymentStatus::Partial),
            "paid" => Some(PaymentStatus::Paid),
            "not_applicable" => Some(PaymentStatus::NotApplicable),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Partial => "partial",
            PaymentStatus::Paid => "paid",
            PaymentStatus::NotApplicable => "not_applicable",
        }
    }
}

/// How a payment was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    BankTransfer,
    Instapay,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PaymentMethod {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cash" => Some(PaymentMethod::Cash),
            "card" => Some(PaymentMethod::Card),
            "bank_transfer" => Some(PaymentMethod::BankTransfer),
            "instapay" => Some(PaymentMethod::Instapay),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Instapay => "instapay",
        }
    }
}

/// A service attached to one specific booking
///
/// Either a snapshot of a catalog service taken at commit time
/// (`source_service_id` set, price already converted to the booking's
/// currency) or a freeform extra entered by staff. Its lifecycle is tied
/// to the owning booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StayService {
    /// Unique identifier
    pub id: Uuid,

    /// Owning booking
    pub booking_id: Uuid,

    /// Catalog entry this was copied from (None = freeform)
    pub source_service_id: Option<i32>,

    /// Service name as charged
    pub name: String,

    /// Price in the booking's currency
    pub price: Decimal,

    /// Date the service applies to
    pub date: NaiveDate,

    /// How the service was (or will be) paid
    pub payment_method: PaymentMethod,

    /// Whether the service has been paid for
    pub is_paid: bool,

    /// Whether the service has been delivered
    pub is_fulfilled: bool,
}

/// Booking entity
///
/// Embeds its stay services and the derived financial fields. The derived
/// fields satisfy, at all times:
///
/// - `total_amount = round2(base_price + services_total - discount)`
/// - `remaining = round2(total_amount - paid_amount)`
/// - `payment_status` follows from `remaining`/`paid_amount`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    /// Unique identifier
    pub id: Uuid,

    /// Apartment being occupied
    pub apartment_id: i32,

    /// Guest the booking belongs to
    pub customer_id: i32,

    /// Check-in date (first night)
    pub start_date: NaiveDate,

    /// Checkout date (exclusive of nights)
    pub end_date: NaiveDate,

    /// Booking currency
    pub currency: Currency,

    /// Lifecycle status
    pub status: BookingStatus,

    /// Discount in the booking's currency
    pub discount: Decimal,

    /// Total received so far, in the booking's currency
    pub paid_amount: Decimal,

    /// Default payment method
    pub payment_method: PaymentMethod,

    /// Commission owed to the operator, in the booking's currency
    pub commission_amount: Decimal,

    /// Whether the commission has been settled
    pub commission_paid: bool,

    /// Operator who sold the booking
    pub operator: Option<String>,

    /// Free-form notes
    pub notes: Option<String>,

    /// Services attached to this booking
    pub services: Vec<StayService>,

    /// Derived: number of billable nights (min 1)
    pub nights: i64,

    /// Derived: stay price before services and discount
    pub base_price: Decimal,

    /// Derived: catalog + ad-hoc services subtotal
    pub services_total: Decimal,

    /// Derived: base + services - discount, rounded to 2 dp
    pub total_amount: Decimal,

    /// Derived: total - paid, rounded to 2 dp
    pub remaining: Decimal,

    /// Derived: payment state
    pub payment_status: PaymentStatus,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Whether this booking's stay window overlaps the given half-open
    /// date range (`end` exclusive, matching checkout-day semantics).
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date < end && self.end_date > start
    }

    /// Whether the booking occupies the unit on the given night
    pub fn occupies(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date < self.end_date
    }
}

impl Default for Booking {
    fn default() -> Self {
        let now = Utc::now();
        let today = now.date_naive();
        Self {
            id: Uuid::new_v4(),
            apartment_id: 0,
            customer_id: 0,
            start_date: today,
            end_date: today,
            currency: Currency::Egp,
            status: BookingStatus::Confirmed,
            discount: Decimal::ZERO,
            paid_amount: Decimal::ZERO,
            payment_method: PaymentMethod::Cash,
            commission_amount: Decimal::ZERO,
            commission_paid: false,
            operator: None,
            notes: None,
            services: Vec::new(),
            nights: 0,
            base_price: Decimal::ZERO,
            services_total: Decimal::ZERO,
            total_amount: Decimal::ZERO,
            remaining: Decimal::ZERO,
            payment_status: PaymentStatus::Unpaid,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(
            BookingStatus::from_str("checked_out"),
            Some(BookingStatus::CheckedOut)
        );
        assert_eq!(
            BookingStatus::from_str("MAINTENANCE"),
            Some(BookingStatus::Maintenance)
        );
        assert_eq!(BookingStatus::from_str("unknown"), None);
    }

    #[test]
    fn test_status_classification() {
        assert!(BookingStatus::Confirmed.is_revenue());
        assert!(BookingStatus::Stay.is_revenue());
        assert!(BookingStatus::CheckedOut.is_revenue());
        assert!(!BookingStatus::Cancelled.is_revenue());
        assert!(!BookingStatus::Maintenance.is_revenue());

        assert!(BookingStatus::Maintenance.blocks_inventory());
        assert!(!BookingStatus::Cancelled.blocks_inventory());
        assert!(!BookingStatus::CheckedOut.blocks_inventory());
    }

    #[test]
    fn test_payment_status_roundtrip() {
        for status in [
            PaymentStatus::Unpaid,
            PaymentStatus::Partial,
            PaymentStatus::Paid,
            PaymentStatus::NotApplicable,
        ] {
            assert_eq!(PaymentStatus::from_str(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_payment_method_parsing() {
        assert_eq!(
            PaymentMethod::from_str("bank_transfer"),
            Some(PaymentMethod::BankTransfer)
        );
        assert_eq!(PaymentMethod::from_str("cheque"), None);
    }

    #[test]
    fn test_overlap() {
        let booking = Booking {
            start_date: date(2025, 6, 10),
            end_date: date(2025, 6, 15),
            ..Default::default()
        };

        assert!(booking.overlaps(date(2025, 6, 12), date(2025, 6, 20)));
        assert!(booking.overlaps(date(2025, 6, 1), date(2025, 6, 11)));
        // Checkout day does not collide with a same-day check-in
        assert!(!booking.overlaps(date(2025, 6, 15), date(2025, 6, 20)));
        assert!(!booking.overlaps(date(2025, 6, 1), date(2025, 6, 10)));
    }

    #[test]
    fn test_occupies() {
        let booking = Booking {
            start_date: date(2025, 6, 10),
            end_date: date(2025, 6, 12),
            ..Default::default()
        };

        assert!(booking.occupies(date(2025, 6, 10)));
        assert!(booking.occupies(date(2025, 6, 11)));
        assert!(!booking.occupies(date(2025, 6, 12)));
    }
}
