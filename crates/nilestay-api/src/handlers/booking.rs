//! Booking handlers
//!
//! CRUD plus the finance-preview, calendar, payment, status, and
//! commission endpoints. All financial derivation goes through
//! `nilestay_services`; handlers only resolve inputs and persist.

use crate::dto::{
    ApiResponse, BookingCommitRequest, BookingFilterParams, BookingPreviewRequest,
    BookingResponse, CalendarDay, CalendarParams, CalendarResponse, CalendarSlot,
    CommissionRequest, FinancePreviewResponse, PaymentRequest, StatusChangeRequest,
};
use actix_web::{web, HttpResponse};
use chrono::Duration;
use nilestay_auth::AuthenticatedUser;
use nilestay_core::models::{AuditLogBuilder, BookingStatus, Permission};
use nilestay_core::traits::{BookingRepository, PaginatedResponse, Repository};
use nilestay_core::{AppConfig, AppError};
use nilestay_db::{
    PgApartmentRepository, PgBookingRepository, PgCustomerRepository, PgServiceRepository,
};
use nilestay_services::pricing::is_overpaid;
use nilestay_services::BookingService;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

/// Longest calendar range served in one request
const MAX_CALENDAR_DAYS: i64 = 366;

type PgBookingService =
    BookingService<PgApartmentRepository, PgBookingRepository, PgServiceRepository>;

fn booking_service(pool: &PgPool, config: &AppConfig) -> PgBookingService {
    BookingService::new(
        Arc::new(PgApartmentRepository::new(pool.clone())),
        Arc::new(PgBookingRepository::new(pool.clone())),
        Arc::new(PgServiceRepository::new(pool.clone())),
        config.finance.usd_rate(),
    )
}

/// Resolve the guest for a commit request: an existing customer id or an
/// inline new-customer payload created on the spot.
async fn resolve_customer(
    pool: &PgPool,
    req: &BookingCommitRequest,
) -> Result<i32, AppError> {
    let repo = PgCustomerRepository::new(pool.clone());

    if let Some(id) = req.customer_id {
        repo.find_by_id(id)
            .await?
            .map(|c| c.id)
            .ok_or(AppError::CustomerNotFound(id))
    } else if let Some(new_customer) = &req.new_customer {
        new_customer
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        let customer = new_customer.clone().into_customer(0);
        customer.validate().map_err(AppError::Validation)?;
        let created = repo.create(&customer).await?;
        info!(customer_id = created.id, "Customer created inline with booking");
        Ok(created.id)
    } else {
        Err(AppError::MissingField(
            "customer_id or new_customer".to_string(),
        ))
    }
}

/// List bookings with filters
#[instrument(skip(pool, _user, query))]
pub async fn list_bookings(
    pool: web::Data<PgPool>,
    _user: AuthenticatedUser,
    query: web::Query<BookingFilterParams>,
) -> Result<HttpResponse, AppError> {
    query.validate().map_err(|e| {
        warn!("Invalid booking query parameters: {}", e);
        AppError::Validation(e.to_string())
    })?;

    debug!(
        "Listing bookings: page={}, apartment_id={:?}, status={:?}",
        query.pagination.page, query.apartment_id, query.status
    );

    let repo = PgBookingRepository::new(pool.get_ref().clone());
    let (bookings, total) = repo
        .list_filtered(
            query.apartment_id,
            query.customer_id,
            query.status,
            query.from_date(),
            query.to_date(),
            query.pagination.limit(),
            query.pagination.offset(),
        )
        .await?;

    let data: Vec<BookingResponse> = bookings.into_iter().map(Into::into).collect();
    let response: PaginatedResponse<BookingResponse> = query.pagination.paginate(data, total);

    Ok(HttpResponse::Ok().json(response))
}

/// Get booking by ID
#[instrument(skip(pool, _user))]
pub async fn get_booking(
    pool: web::Data<PgPool>,
    _user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let repo = PgBookingRepository::new(pool.get_ref().clone());
    let booking = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::BookingNotFound(id.to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(BookingResponse::from(booking))))
}

/// Price a draft without committing it.
///
/// Safe to call on every form edit; degrades to zeros while the form is
/// incomplete.
#[instrument(skip(pool, config, _user, req))]
pub async fn preview_booking(
    pool: web::Data<PgPool>,
    config: web::Data<AppConfig>,
    _user: AuthenticatedUser,
    req: web::Json<BookingPreviewRequest>,
) -> Result<HttpResponse, AppError> {
    let service = booking_service(pool.get_ref(), config.get_ref());

    let draft = req.to_draft();
    let finance = service.preview(req.apartment_id, &draft).await?;
    let overpaid = is_overpaid(&draft, &finance);

    Ok(HttpResponse::Ok().json(ApiResponse::success(FinancePreviewResponse::new(
        &finance, overpaid,
    ))))
}

/// Create a booking
#[instrument(skip(pool, config, user, req))]
pub async fn create_booking(
    pool: web::Data<PgPool>,
    config: web::Data<AppConfig>,
    user: AuthenticatedUser,
    req: web::Json<BookingCommitRequest>,
) -> Result<HttpResponse, AppError> {
    user.require(Permission::ManageBookings)?;
    req.validate().map_err(|e| AppError::Validation(e.to_string()))?;

    let customer_id = resolve_customer(pool.get_ref(), &req).await?;

    let service = booking_service(pool.get_ref(), config.get_ref());
    let booking = service.create(req.to_service_request(customer_id)).await?;

    if let Ok(audit_data) = AuditLogBuilder::default()
        .username(user.username.clone())
        .action("create")
        .entity_type("booking")
        .entity_id(booking.id.to_string())
        .details(json!({
            "apartment_id": booking.apartment_id,
            "total_amount": booking.total_amount.to_string(),
        }))
        .build()
    {
        audit_data.insert(pool.get_ref()).await;
    }

    Ok(HttpResponse::Created().json(ApiResponse::success(BookingResponse::from(booking))))
}

/// Update a booking (full re-derivation)
#[instrument(skip(pool, config, user, req))]
pub async fn update_booking(
    pool: web::Data<PgPool>,
    config: web::Data<AppConfig>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    req: web::Json<BookingCommitRequest>,
) -> Result<HttpResponse, AppError> {
    user.require(Permission::ManageBookings)?;
    req.validate().map_err(|e| AppError::Validation(e.to_string()))?;

    let id = path.into_inner();
    let customer_id = resolve_customer(pool.get_ref(), &req).await?;

    let service = booking_service(pool.get_ref(), config.get_ref());
    let booking = service
        .update(id, req.to_service_request(customer_id))
        .await?;

    if let Ok(audit_data) = AuditLogBuilder::default()
        .username(user.username.clone())
        .action("update")
        .entity_type("booking")
        .entity_id(id.to_string())
        .build()
    {
        audit_data.insert(pool.get_ref()).await;
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(BookingResponse::from(booking))))
}

/// Change a booking's status
#[instrument(skip(pool, config, user, req))]
pub async fn change_booking_status(
    pool: web::Data<PgPool>,
    config: web::Data<AppConfig>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    req: web::Json<StatusChangeRequest>,
) -> Result<HttpResponse, AppError> {
    user.require(Permission::ManageBookings)?;

    let id = path.into_inner();

    let service = booking_service(pool.get_ref(), config.get_ref());
    let booking = service.change_status(id, req.status).await?;

    if let Ok(audit_data) = AuditLogBuilder::default()
        .username(user.username.clone())
        .action("change_status")
        .entity_type("booking")
        .entity_id(id.to_string())
        .details(json!({ "status": req.status.as_str() }))
        .build()
    {
        audit_data.insert(pool.get_ref()).await;
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(BookingResponse::from(booking))))
}

/// Record a payment against a booking
#[instrument(skip(pool, config, user, req))]
pub async fn record_payment(
    pool: web::Data<PgPool>,
    config: web::Data<AppConfig>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    req: web::Json<PaymentRequest>,
) -> Result<HttpResponse, AppError> {
    user.require(Permission::ManageBookings)?;

    let id = path.into_inner();

    let service = booking_service(pool.get_ref(), config.get_ref());
    let booking = service.record_payment(id, req.amount).await?;

    if let Ok(audit_data) = AuditLogBuilder::default()
        .username(user.username.clone())
        .action("record_payment")
        .entity_type("booking")
        .entity_id(id.to_string())
        .details(json!({ "amount": req.amount.to_string() }))
        .build()
    {
        audit_data.insert(pool.get_ref()).await;
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(BookingResponse::from(booking))))
}

/// Settle or reopen a booking's commission
#[instrument(skip(pool, config, user, req))]
pub async fn set_commission(
    pool: web::Data<PgPool>,
    config: web::Data<AppConfig>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    req: web::Json<CommissionRequest>,
) -> Result<HttpResponse, AppError> {
    user.require(Permission::ManageBookings)?;

    let id = path.into_inner();

    let service = booking_service(pool.get_ref(), config.get_ref());
    let booking = service.set_commission_paid(id, req.paid).await?;

    if let Ok(audit_data) = AuditLogBuilder::default()
        .username(user.username.clone())
        .action("set_commission")
        .entity_type("booking")
        .entity_id(id.to_string())
        .details(json!({ "paid": req.paid }))
        .build()
    {
        audit_data.insert(pool.get_ref()).await;
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(BookingResponse::from(booking))))
}

/// Delete a booking
#[instrument(skip(pool, config, user))]
pub async fn delete_booking(
    pool: web::Data<PgPool>,
    config: web::Data<AppConfig>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    user.require(Permission::ManageBookings)?;

    let id = path.into_inner();

    let service = booking_service(pool.get_ref(), config.get_ref());
    let deleted = service.delete(id).await?;

    if !deleted {
        return Err(AppError::BookingNotFound(id.to_string()));
    }

    if let Ok(audit_data) = AuditLogBuilder::default()
        .username(user.username.clone())
        .action("delete")
        .entity_type("booking")
        .entity_id(id.to_string())
        .build()
    {
        audit_data.insert(pool.get_ref()).await;
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success("Booking deleted successfully")))
}

/// Day-by-day occupancy view.
///
/// Cancelled bookings are hidden; maintenance blocks show like stays so
/// the unit reads as out of inventory.
#[instrument(skip(pool, _user, query))]
pub async fn calendar(
    pool: web::Data<PgPool>,
    _user: AuthenticatedUser,
    query: web::Query<CalendarParams>,
) -> Result<HttpResponse, AppError> {
    let (start, end) = query
        .range()
        .ok_or_else(|| AppError::InvalidInput("Invalid calendar range".to_string()))?;

    let span = (end - start).num_days();
    if span <= 0 {
        return Err(AppError::InvalidInput(
            "Calendar range must end after it starts".to_string(),
        ));
    }
    if span > MAX_CALENDAR_DAYS {
        return Err(AppError::InvalidInput(format!(
            "Calendar range is limited to {} days",
            MAX_CALENDAR_DAYS
        )));
    }

    let repo = PgBookingRepository::new(pool.get_ref().clone());
    let bookings = repo.find_in_range(start, end).await?;

    let mut days = Vec::with_capacity(span as usize);
    for offset in 0..span {
        let date = start + Duration::days(offset);
        let slots: Vec<CalendarSlot> = bookings
            .iter()
            .filter(|b| b.status != BookingStatus::Cancelled)
            .filter(|b| b.occupies(date))
            .map(|b| CalendarSlot {
                booking_id: b.id,
                apartment_id: b.apartment_id,
                customer_id: b.customer_id,
                status: b.status.as_str().to_string(),
                is_checkin: b.start_date == date,
                is_checkout_next_day: b.end_date == date + Duration::days(1),
            })
            .collect();

        days.push(CalendarDay { date, slots });
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(CalendarResponse { days })))
}

/// Configure booking routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/bookings")
            .route("", web::get().to(list_bookings))
            .route("", web::post().to(create_booking))
            .route("/preview", web::post().to(preview_booking))
            .route("/calendar", web::get().to(calendar))
            .route("/{id}", web::get().to(get_booking))
            .route("/{id}", web::put().to(update_booking))
            .route("/{id}", web::delete().to(delete_booking))
            .route("/{id}/status", web::put().to(change_booking_status))
            .route("/{id}/payments", web::post().to(record_payment))
            .route("/{id}/commission", web::put().to(set_commission)),
    );
}
