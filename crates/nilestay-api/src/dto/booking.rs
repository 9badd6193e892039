//! Booking DTOs

use super::common::PaginationParams;
use super::customer::CustomerRequest;
use chrono::{DateTime, NaiveDate, Utc};
use nilestay_core::models::{Booking, BookingStatus, Currency, PaymentMethod, StayService};
use nilestay_services::booking::{BookingRequest as ServiceBookingRequest, ExtraServiceInput};
use nilestay_services::pricing::BookingDraft;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A freeform extra service on a booking form, priced in the booking's
/// currency at entry time
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StayServiceInput {
    #[validate(length(min = 1, message = "Service name is required"))]
    pub name: String,

    #[serde(default)]
    pub price: Decimal,

    pub date: NaiveDate,

    #[serde(default)]
    pub payment_method: PaymentMethod,

    #[serde(default)]
    pub is_paid: bool,

    #[serde(default)]
    pub is_fulfilled: bool,
}

impl From<&StayServiceInput> for ExtraServiceInput {
    fn from(input: &StayServiceInput) -> Self {
        Self {
            name: input.name.clone(),
            price: input.price,
            date: input.date,
            payment_method: input.payment_method,
            is_paid: input.is_paid,
            is_fulfilled: input.is_fulfilled,
        }
    }
}

/// Request to create or fully update a booking.
///
/// The guest is either an existing `customer_id` or an inline
/// `new_customer` payload created together with the booking.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BookingCommitRequest {
    pub apartment_id: i32,

    pub customer_id: Option<i32>,

    #[validate(nested)]
    pub new_customer: Option<CustomerRequest>,

    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    #[serde(default)]
    pub currency: Currency,

    #[serde(default)]
    pub status: BookingStatus,

    #[serde(default)]
    pub discount: Decimal,

    #[serde(default)]
    pub paid_amount: Decimal,

    #[serde(default)]
    pub payment_method: PaymentMethod,

    #[serde(default)]
    pub commission_amount: Decimal,

    #[serde(default)]
    pub commission_paid: bool,

    pub operator: Option<String>,
    pub notes: Option<String>,

    #[serde(default)]
    pub selected_service_ids: Vec<i32>,

    #[serde(default)]
    pub extra_services: Vec<StayServiceInput>,
}

impl BookingCommitRequest {
    /// Build the service-layer request once the customer id is resolved
    pub fn to_service_request(&self, customer_id: i32) -> ServiceBookingRequest {
        ServiceBookingRequest {
            apartment_id: self.apartment_id,
            customer_id,
            start_date: self.start_date,
            end_date: self.end_date,
            currency: self.currency,
            status: self.status,
            discount: self.discount,
            paid_amount: self.paid_amount,
            payment_method: self.payment_method,
            commission_amount: self.commission_amount,
            commission_paid: self.commission_paid,
            operator: self.operator.clone(),
            notes: self.notes.clone(),
            selected_service_ids: self.selected_service_ids.clone(),
            extra_services: self.extra_services.iter().map(Into::into).collect(),
        }
    }
}

/// Request to price a draft without committing it.
///
/// Dates arrive as raw form strings; an absent or unparseable date simply
/// yields the all-zero result, matching mid-form behavior.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingPreviewRequest {
    pub apartment_id: Option<i32>,

    pub start_date: Option<String>,
    pub end_date: Option<String>,

    #[serde(default)]
    pub currency: Currency,

    #[serde(default)]
    pub status: BookingStatus,

    #[serde(default)]
    pub discount: Decimal,

    #[serde(default)]
    pub paid_amount: Decimal,

    #[serde(default)]
    pub payment_method: PaymentMethod,

    #[serde(default)]
    pub selected_service_ids: Vec<i32>,

    #[serde(default)]
    pub extra_services: Vec<StayServiceInput>,
}

fn parse_form_date(value: Option<&str>) -> Option<NaiveDate> {
    value.and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

impl BookingPreviewRequest {
    /// Build an engine draft from the form fields
    pub fn to_draft(&self) -> BookingDraft {
        BookingDraft {
            status: self.status,
            currency: self.currency,
            start_date: parse_form_date(self.start_date.as_deref()),
            end_date: parse_form_date(self.end_date.as_deref()),
            discount: self.discount,
            paid_amount: self.paid_amount,
            payment_method: self.payment_method,
            selected_service_ids: self.selected_service_ids.clone(),
            services: self
                .extra_services
                .iter()
                .map(|e| StayService {
                    id: Uuid::nil(),
                    booking_id: Uuid::nil(),
                    source_service_id: None,
                    name: e.name.clone(),
                    price: e.price,
                    date: e.date,
                    payment_method: e.payment_method,
                    is_paid: e.is_paid,
                    is_fulfilled: e.is_fulfilled,
                })
                .collect(),
        }
    }
}

/// Request to record an additional payment
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentRequest {
    pub amount: Decimal,
}

/// Request to change the booking status
#[derive(Debug, Clone, Deserialize)]
pub struct StatusChangeRequest {
    pub status: BookingStatus,
}

/// Request to settle or reopen the commission
#[derive(Debug, Clone, Deserialize)]
pub struct CommissionRequest {
    pub paid: bool,
}

/// Booking filter parameters for list queries
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BookingFilterParams {
    /// Pagination parameters
    #[serde(flatten)]
    #[validate(nested)]
    pub pagination: PaginationParams,

    /// Filter by apartment
    pub apartment_id: Option<i32>,

    /// Filter by customer
    pub customer_id: Option<i32>,

    /// Filter by status
    pub status: Option<BookingStatus>,

    /// Only bookings ending after this date (YYYY-MM-DD)
    #[serde(default)]
    pub from: Option<String>,

    /// Only bookings starting before this date (YYYY-MM-DD)
    #[serde(default)]
    pub to: Option<String>,
}

impl BookingFilterParams {
    pub fn from_date(&self) -> Option<NaiveDate> {
        parse_form_date(self.from.as_deref())
    }

    pub fn to_date(&self) -> Option<NaiveDate> {
        parse_form_date(self.to.as_deref())
    }
}

/// Calendar query parameters
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarParams {
    /// Range start (YYYY-MM-DD, inclusive)
    pub start: String,

    /// Range end (YYYY-MM-DD, exclusive)
    pub end: String,
}

impl CalendarParams {
    pub fn range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let start = parse_form_date(Some(&self.start))?;
        let end = parse_form_date(Some(&self.end))?;
        Some((start, end))
    }
}

/// One occupied slot on a calendar day
#[derive(Debug, Clone, Serialize)]
pub struct CalendarSlot {
    pub booking_id: Uuid,
    pub apartment_id: i32,
    pub customer_id: i32,
    pub status: String,
    pub is_checkin: bool,
    pub is_checkout_next_day: bool,
}

/// One day of the calendar view
#[derive(Debug, Clone, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub slots: Vec<CalendarSlot>,
}

/// Calendar view response
#[derive(Debug, Clone, Serialize)]
pub struct CalendarResponse {
    pub days: Vec<CalendarDay>,
}

/// Stay service API response
#[derive(Debug, Clone, Serialize)]
pub struct StayServiceResponse {
    pub id: Uuid,
    pub source_service_id: Option<i32>,
    pub name: String,
    pub price: Decimal,
    pub date: NaiveDate,
    pub payment_method: String,
    pub is_paid: bool,
    pub is_fulfilled: bool,
}

impl From<&StayService> for StayServiceResponse {
    fn from(service: &StayService) -> Self {
        Self {
            id: service.id,
            source_service_id: service.source_service_id,
            name: service.name.clone(),
            price: service.price,
            date: service.date,
            payment_method: service.payment_method.as_str().to_string(),
            is_paid: service.is_paid,
            is_fulfilled: service.is_fulfilled,
        }
    }
}

/// Booking API response, including the derived financial fields
#[derive(Debug, Clone, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub apartment_id: i32,
    pub customer_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub currency: String,
    pub status: String,
    pub discount: Decimal,
    pub paid_amount: Decimal,
    pub payment_method: String,
    pub commission_amount: Decimal,
    pub commission_paid: bool,
    pub operator: Option<String>,
    pub notes: Option<String>,
    pub services: Vec<StayServiceResponse>,
    pub nights: i64,
    pub base_price: Decimal,
    pub services_total: Decimal,
    pub total_amount: Decimal,
    pub remaining: Decimal,
    pub payment_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id,
            apartment_id: booking.apartment_id,
            customer_id: booking.customer_id,
            start_date: booking.start_date,
            end_date: booking.end_date,
            currency: booking.currency.as_str().to_string(),
            status: booking.status.as_str().to_string(),
            discount: booking.discount,
            paid_amount: booking.paid_amount,
            payment_method: booking.payment_method.as_str().to_string(),
            commission_amount: booking.commission_amount,
            commission_paid: booking.commission_paid,
            operator: booking.operator.clone(),
            notes: booking.notes.clone(),
            services: booking.services.iter().map(Into::into).collect(),
            nights: booking.nights,
            base_price: booking.base_price,
            services_total: booking.services_total,
            total_amount: booking.total_amount,
            remaining: booking.remaining,
            payment_status: booking.payment_status.as_str().to_string(),
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        }
    }
}

/// Finance preview response
#[derive(Debug, Clone, Serialize)]
pub struct FinancePreviewResponse {
    pub nights: i64,
    pub base_price: Decimal,
    pub services_total: Decimal,
    pub total: Decimal,
    pub remaining: Decimal,
    pub payment_status: String,
    pub overpaid: bool,
}

impl FinancePreviewResponse {
    pub fn new(finance: &nilestay_services::pricing::FinanceResult, overpaid: bool) -> Self {
        Self {
            nights: finance.nights,
            base_price: finance.base_price,
            services_total: finance.services_total,
            total: finance.total,
            remaining: finance.remaining,
            payment_status: finance.payment_status.as_str().to_string(),
            overpaid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_form_date() {
        assert_eq!(
            parse_form_date(Some("2025-06-10")),
            NaiveDate::from_ymd_opt(2025, 6, 10)
        );
        assert_eq!(parse_form_date(Some("10/06/2025")), None);
        assert_eq!(parse_form_date(Some("")), None);
        assert_eq!(parse_form_date(None), None);
    }

    #[test]
    fn test_preview_request_unparseable_dates_become_none() {
        let request = BookingPreviewRequest {
            apartment_id: Some(1),
            start_date: Some("junk".to_string()),
            end_date: Some("2025-06-10".to_string()),
            currency: Currency::Egp,
            status: BookingStatus::Confirmed,
            discount: Decimal::ZERO,
            paid_amount: Decimal::ZERO,
            payment_method: PaymentMethod::Cash,
            selected_service_ids: vec![],
            extra_services: vec![],
        };
        let draft = request.to_draft();
        assert!(draft.start_date.is_none());
        assert!(draft.end_date.is_some());
    }

    #[test]
    fn test_calendar_params_range() {
        let params = CalendarParams {
            start: "2025-06-01".to_string(),
            end: "2025-07-01".to_string(),
        };
        let (start, end) = params.range().unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());

        let params = CalendarParams {
            start: "bad".to_string(),
            end: "2025-07-01".to_string(),
        };
        assert!(params.range().is_none());
    }
}
