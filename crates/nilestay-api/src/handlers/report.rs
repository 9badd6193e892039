//! Report handlers
//!
//! Commission and customer reports with CSV/JSON export, plus the
//! dashboard summary. Reports consume the already-computed finance fields
//! on bookings; cancelled and maintenance rows never count as revenue.

use crate::dto::{
    csv_escape, ApiResponse, CommissionReportRow, CustomerReportRow, DashboardStats, ExportFormat,
    ReportParams,
};
use actix_web::{web, HttpResponse};
use chrono::Utc;
use nilestay_auth::AuthenticatedUser;
use nilestay_core::models::{Apartment, Booking, BookingStatus, Customer, Permission};
use nilestay_core::traits::{
    ApartmentRepository, BookingRepository, ExpenseRepository, Repository,
};
use nilestay_core::{AppConfig, AppError};
use nilestay_db::{
    PgApartmentRepository, PgBookingRepository, PgCustomerRepository, PgExpenseRepository,
};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::collections::HashMap;
use std::fmt::Write as _;
use tracing::{debug, info, instrument};

/// Effectively-unbounded limit for report queries
const REPORT_LIMIT: i64 = 1_000_000;

async fn load_bookings(
    pool: &PgPool,
    params: &ReportParams,
) -> Result<Vec<Booking>, AppError> {
    let repo = PgBookingRepository::new(pool.clone());
    let (bookings, _) = repo
        .list_filtered(
            None,
            None,
            None,
            params.from_date(),
            params.to_date(),
            REPORT_LIMIT,
            0,
        )
        .await?;
    Ok(bookings)
}

async fn apartment_names(pool: &PgPool) -> Result<HashMap<i32, String>, AppError> {
    let repo = PgApartmentRepository::new(pool.clone());
    let apartments: Vec<Apartment> = repo.find_all(REPORT_LIMIT, 0).await?;
    Ok(apartments.into_iter().map(|a| (a.id, a.name)).collect())
}

async fn customers_by_id(pool: &PgPool) -> Result<HashMap<i32, Customer>, AppError> {
    let repo = PgCustomerRepository::new(pool.clone());
    let customers = repo.find_all(REPORT_LIMIT, 0).await?;
    Ok(customers.into_iter().map(|c| (c.id, c)).collect())
}

fn csv_response(filename_stem: &str, body: String) -> HttpResponse {
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    let filename = format!("{}_{}.csv", filename_stem, timestamp);

    HttpResponse::Ok()
        .content_type(ExportFormat::Csv.content_type())
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", filename),
        ))
        .body(body)
}

/// Commission report: one row per revenue booking carrying a commission
///
/// GET /api/v1/reports/commissions?format=csv|json&from=&to=
#[instrument(skip(pool, user, query))]
pub async fn commission_report(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    query: web::Query<ReportParams>,
) -> Result<HttpResponse, AppError> {
    user.require(Permission::ViewReports)?;
    if query.format == ExportFormat::Csv {
        user.require(Permission::ExportData)?;
    }

    debug!("Building commission report");

    let bookings = load_bookings(pool.get_ref(), &query).await?;
    let apartments = apartment_names(pool.get_ref()).await?;
    let customers = customers_by_id(pool.get_ref()).await?;

    let rows: Vec<CommissionReportRow> = bookings
        .iter()
        .filter(|b| b.status.is_revenue())
        .filter(|b| b.commission_amount > Decimal::ZERO)
        .map(|b| CommissionReportRow {
            booking_id: b.id,
            apartment: apartments
                .get(&b.apartment_id)
                .cloned()
                .unwrap_or_default(),
            customer: customers
                .get(&b.customer_id)
                .map(|c| c.name.clone())
                .unwrap_or_default(),
            operator: b.operator.clone().unwrap_or_default(),
            start_date: b.start_date,
            end_date: b.end_date,
            currency: b.currency.as_str().to_string(),
            total_amount: b.total_amount,
            commission_amount: b.commission_amount,
            commission_paid: b.commission_paid,
        })
        .collect();

    info!("Commission report: {} rows", rows.len());

    match query.format {
        ExportFormat::Json => Ok(HttpResponse::Ok().json(ApiResponse::success(rows))),
        ExportFormat::Csv => {
            let mut csv = String::new();
            let _ = writeln!(
                &mut csv,
                "booking_id,apartment,customer,operator,start_date,end_date,currency,total_amount,commission_amount,commission_paid"
            );
            for row in &rows {
                let _ = writeln!(
                    &mut csv,
                    "{},{},{},{},{},{},{},{},{},{}",
                    row.booking_id,
                    csv_escape(&row.apartment),
                    csv_escape(&row.customer),
                    csv_escape(&row.operator),
                    row.start_date,
                    row.end_date,
                    row.currency,
                    row.total_amount,
                    row.commission_amount,
                    row.commission_paid,
                );
            }
            Ok(csv_response("commissions", csv))
        }
    }
}

/// Customer report: per-guest booking count, nights, and totals
///
/// GET /api/v1/reports/customers?format=csv|json&from=&to=
#[instrument(skip(pool, config, user, query))]
pub async fn customer_report(
    pool: web::Data<PgPool>,
    config: web::Data<AppConfig>,
    user: AuthenticatedUser,
    query: web::Query<ReportParams>,
) -> Result<HttpResponse, AppError> {
    user.require(Permission::ViewReports)?;
    if query.format == ExportFormat::Csv {
        user.require(Permission::ExportData)?;
    }

    debug!("Building customer report");

    let rate = config.finance.usd_rate();
    let bookings = load_bookings(pool.get_ref(), &query).await?;
    let customers = customers_by_id(pool.get_ref()).await?;

    let mut by_customer: HashMap<i32, CustomerReportRow> = HashMap::new();

    for booking in bookings.iter().filter(|b| b.status.is_revenue()) {
        let entry = by_customer.entry(booking.customer_id).or_insert_with(|| {
            let customer = customers.get(&booking.customer_id);
            CustomerReportRow {
                customer_id: booking.customer_id,
                name: customer.map(|c| c.name.clone()).unwrap_or_default(),
                phone: customer
                    .and_then(|c| c.phone.clone())
                    .unwrap_or_default(),
                bookings: 0,
                nights: 0,
                total_spent_egp: Decimal::ZERO,
                outstanding_egp: Decimal::ZERO,
            }
        });

        entry.bookings += 1;
        entry.nights += booking.nights;
        entry.total_spent_egp += booking.currency.to_egp(booking.total_amount, rate);
        entry.outstanding_egp += booking.currency.to_egp(booking.remaining, rate);
    }

    let mut rows: Vec<CustomerReportRow> = by_customer.into_values().collect();
    rows.sort_by(|a, b| b.total_spent_egp.cmp(&a.total_spent_egp));

    info!("Customer report: {} rows", rows.len());

    match query.format {
        ExportFormat::Json => Ok(HttpResponse::Ok().json(ApiResponse::success(rows))),
        ExportFormat::Csv => {
            let mut csv = String::new();
            let _ = writeln!(
                &mut csv,
                "customer_id,name,phone,bookings,nights,total_spent_egp,outstanding_egp"
            );
            for row in &rows {
                let _ = writeln!(
                    &mut csv,
                    "{},{},{},{},{},{},{}",
                    row.customer_id,
                    csv_escape(&row.name),
                    csv_escape(&row.phone),
                    row.bookings,
                    row.nights,
                    row.total_spent_egp,
                    row.outstanding_egp,
                );
            }
            Ok(csv_response("customers", csv))
        }
    }
}

/// Dashboard summary figures
///
/// GET /api/v1/reports/dashboard
#[instrument(skip(pool, config, user))]
pub async fn dashboard(
    pool: web::Data<PgPool>,
    config: web::Data<AppConfig>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    user.require(Permission::ViewReports)?;

    debug!("Building dashboard stats");

    let rate = config.finance.usd_rate();

    let apartment_repo = PgApartmentRepository::new(pool.get_ref().clone());
    let customer_repo = PgCustomerRepository::new(pool.get_ref().clone());
    let booking_repo = PgBookingRepository::new(pool.get_ref().clone());
    let expense_repo = PgExpenseRepository::new(pool.get_ref().clone());

    let apartments = apartment_repo.count().await?;
    let active_apartments = apartment_repo.list_active().await?.len() as i64;
    let customers = customer_repo.count().await?;

    let (bookings, bookings_total) = booking_repo
        .list_filtered(None, None, None, None, None, REPORT_LIMIT, 0)
        .await?;
    let (expenses, _) = expense_repo
        .list_filtered(None, None, None, None, REPORT_LIMIT, 0)
        .await?;

    let mut stats = DashboardStats {
        apartments,
        active_apartments,
        customers,
        bookings_total,
        bookings_confirmed: 0,
        bookings_in_stay: 0,
        maintenance_blocks: 0,
        revenue_egp: Decimal::ZERO,
        collected_egp: Decimal::ZERO,
        outstanding_egp: Decimal::ZERO,
        unpaid_commission_egp: Decimal::ZERO,
        expenses_egp: Decimal::ZERO,
    };

    for booking in &bookings {
        match booking.status {
            BookingStatus::Confirmed => stats.bookings_confirmed += 1,
            BookingStatus::Stay => stats.bookings_in_stay += 1,
            BookingStatus::Maintenance => stats.maintenance_blocks += 1,
            BookingStatus::CheckedOut | BookingStatus::Cancelled => {}
        }

        if booking.status.is_revenue() {
            stats.revenue_egp += booking.currency.to_egp(booking.total_amount, rate);
            stats.collected_egp += booking.currency.to_egp(booking.paid_amount, rate);
            stats.outstanding_egp += booking.currency.to_egp(booking.remaining, rate);
            if !booking.commission_paid {
                stats.unpaid_commission_egp +=
                    booking.currency.to_egp(booking.commission_amount, rate);
            }
        }
    }

    for expense in &expenses {
        stats.expenses_egp += expense.amount_in_egp(rate);
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(stats)))
}

/// Configure report routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/reports")
            .route("/commissions", web::get().to(commission_report))
            .route("/customers", web::get().to(customer_report))
            .route("/dashboard", web::get().to(dashboard)),
    );
}
