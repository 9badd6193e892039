//! Report DTOs

use super::common::ExportFormat;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Common report query parameters
#[derive(Debug, Clone, Deserialize)]
pub struct ReportParams {
    /// Export format (csv or json)
    #[serde(default)]
    pub format: ExportFormat,

    /// Only bookings overlapping on/after this date (YYYY-MM-DD)
    #[serde(default)]
    pub from: Option<String>,

    /// Only bookings overlapping before this date (YYYY-MM-DD)
    #[serde(default)]
    pub to: Option<String>,
}

impl ReportParams {
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

/// One row of the commission report
#[derive(Debug, Clone, Serialize)]
pub struct CommissionReportRow {
    pub booking_id: Uuid,
    pub apartment: String,
    pub customer: String,
    pub operator: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub currency: String,
    pub total_amount: Decimal,
    pub commission_amount: Decimal,
    pub commission_paid: bool,
}

/// One row of the customer report
#[derive(Debug, Clone, Serialize)]
pub struct CustomerReportRow {
    pub customer_id: i32,
    pub name: String,
    pub phone: String,
    pub bookings: i64,
    pub nights: i64,
    /// Lifetime spend normalized to EGP
    pub total_spent_egp: Decimal,
    /// Outstanding balance normalized to EGP
    pub outstanding_egp: Decimal,
}

/// Dashboard summary figures
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub apartments: i64,
    pub active_apartments: i64,
    pub customers: i64,
    pub bookings_total: i64,
    pub bookings_confirmed: i64,
    pub bookings_in_stay: i64,
    pub maintenance_blocks: i64,
    /// Revenue booked (EGP basis), cancelled and maintenance excluded
    pub revenue_egp: Decimal,
    /// Payments received (EGP basis)
    pub collected_egp: Decimal,
    /// Balances still due (EGP basis)
    pub outstanding_egp: Decimal,
    /// Commissions not yet settled (EGP basis)
    pub unpaid_commission_egp: Decimal,
    /// Expenses recorded (EGP basis)
    pub expenses_egp: Decimal,
}
