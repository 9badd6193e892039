//! Booking lifecycle service
//!
//! The compute-then-commit flow around the finance engine: every mutation
//! rebuilds the draft and re-runs the full derivation (a booking is never
//! incrementally patched), the overpayment and double-booking gates run
//! before anything is persisted, and catalog selections are materialized
//! exactly once per commit.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use nilestay_core::{
    models::{Booking, BookingStatus, Currency, PaymentMethod, StayService},
    traits::{ApartmentRepository, BookingRepository, ServiceRepository},
    AppError, AppResult,
};
use rust_decimal::Decimal;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::pricing::{
    compute_finance, is_overpaid, materialize_catalog_selections, BookingDraft, FinanceResult,
};

/// A freeform extra service entered by staff, priced in the booking's
/// currency at entry time.
#[derive(Debug, Clone)]
pub struct ExtraServiceInput {
    pub name: String,
    pub price: Decimal,
    pub date: NaiveDate,
    pub payment_method: PaymentMethod,
    pub is_paid: bool,
    pub is_fulfilled: bool,
}

/// Everything needed to commit a booking (create or full edit)
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub apartment_id: i32,
    pub customer_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub currency: Currency,
    pub status: BookingStatus,
    pub discount: Decimal,
    pub paid_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub commission_amount: Decimal,
    pub commission_paid: bool,
    pub operator: Option<String>,
    pub notes: Option<String>,
    pub selected_service_ids: Vec<i32>,
    pub extra_services: Vec<ExtraServiceInput>,
}

/// Booking lifecycle service
///
/// Owns its repositories behind `Arc`s and carries the fixed USD rate so
/// the engine never reaches into ambient state.
pub struct BookingService<A, B, S> {
    apartment_repo: Arc<A>,
    booking_repo: Arc<B>,
    service_repo: Arc<S>,
    usd_to_egp_rate: Decimal,
}

impl<A, B, S> BookingService<A, B, S>
where
    A: ApartmentRepository,
    B: BookingRepository,
    S: ServiceRepository,
{
    /// Create a new booking service
    pub fn new(
        apartment_repo: Arc<A>,
        booking_repo: Arc<B>,
        service_repo: Arc<S>,
        usd_to_egp_rate: Decimal,
    ) -> Self {
        Self {
            apartment_repo,
            booking_repo,
            service_repo,
            usd_to_egp_rate,
        }
    }

    /// Run the engine for a draft without committing anything.
    ///
    /// An unknown or missing apartment degrades to the all-zero result,
    /// matching the "not enough information yet" mid-form state.
    #[instrument(skip(self, draft))]
    pub async fn preview(
        &self,
        apartment_id: Option<i32>,
        draft: &BookingDraft,
    ) -> AppResult<FinanceResult> {
        let rate_card = match apartment_id {
            Some(id) => self
                .apartment_repo
                .find_by_id(id)
                .await?
                .map(|a| a.rate_card()),
            None => None,
        };
        let catalog = self.service_repo.list_enabled().await?;

        Ok(compute_finance(
            draft,
            rate_card.as_ref(),
            &catalog,
            self.usd_to_egp_rate,
        ))
    }

    /// Create a booking from a request.
    ///
    /// Gates: the apartment must exist, the draft must not be overpaid, and
    /// an inventory-blocking booking must not overlap another on the same
    /// unit. Catalog selections are materialized here, once.
    #[instrument(skip(self, req))]
    pub async fn create(&self, req: BookingRequest) -> AppResult<Booking> {
        let apartment = self
            .apartment_repo
            .find_by_id(req.apartment_id)
            .await?
            .ok_or(AppError::ApartmentNotFound(req.apartment_id))?;
        let catalog = self.service_repo.list_enabled().await?;

        let booking_id = Uuid::new_v4();
        let draft = draft_from_request(&req, booking_id);

        let rate_card = apartment.rate_card();
        let finance = compute_finance(&draft, Some(&rate_card), &catalog, self.usd_to_egp_rate);

        if is_overpaid(&draft, &finance) {
            return Err(AppError::Overpaid {
                paid: draft.paid_amount.to_string(),
                total: finance.total.to_string(),
            });
        }

        if req.status.blocks_inventory() {
            self.ensure_no_overlap(req.apartment_id, req.start_date, req.end_date, None)
                .await?;
        }

        let booked_on = Utc::now().date_naive();
        let mut services = draft.services.clone();
        services.extend(materialize_catalog_selections(
            &draft,
            &catalog,
            &finance,
            booking_id,
            booked_on,
            self.usd_to_egp_rate,
        ));

        let booking = assemble_booking(booking_id, &req, services, &finance);
        let created = self.booking_repo.create(&booking).await?;

        info!(
            booking_id = %created.id,
            apartment_id = created.apartment_id,
            total = %created.total_amount,
            "Booking created"
        );

        Ok(created)
    }

    /// Re-save a booking from a full request, re-running the derivation.
    ///
    /// Materialized catalog snapshots survive as long as their selection
    /// does; deselected snapshots are dropped, newly selected ids are
    /// materialized. Freeform extras are replaced wholesale by the request.
    #[instrument(skip(self, req))]
    pub async fn update(&self, id: Uuid, req: BookingRequest) -> AppResult<Booking> {
        let existing = self
            .booking_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::BookingNotFound(id.to_string()))?;

        let apartment = self
            .apartment_repo
            .find_by_id(req.apartment_id)
            .await?
            .ok_or(AppError::ApartmentNotFound(req.apartment_id))?;
        let catalog = self.service_repo.list_enabled().await?;

        // Keep materialized snapshots that are still selected; their prices
        // must stay as captured at the original commit.
        let kept: Vec<StayService> = existing
            .services
            .iter()
            .filter(|s| {
                s.source_service_id
                    .map(|src| req.selected_service_ids.contains(&src))
                    .unwrap_or(false)
            })
            .cloned()
            .collect();

        let mut draft = draft_from_request(&req, id);
        // A kept snapshot carries the charge for its selection; dropping the
        // id here keeps the engine from pricing it a second time from the
        // (possibly since-edited) catalog.
        draft
            .selected_service_ids
            .retain(|sid| !kept.iter().any(|s| s.source_service_id == Some(*sid)));
        draft.services.extend(kept);

        let rate_card = apartment.rate_card();
        let finance = compute_finance(&draft, Some(&rate_card), &catalog, self.usd_to_egp_rate);

        if is_overpaid(&draft, &finance) {
            return Err(AppError::Overpaid {
                paid: draft.paid_amount.to_string(),
                total: finance.total.to_string(),
            });
        }

        if req.status.blocks_inventory() {
            self.ensure_no_overlap(req.apartment_id, req.start_date, req.end_date, Some(id))
                .await?;
        }

        let booked_on = existing.created_at.date_naive();
        let mut services = draft.services.clone();
        services.extend(materialize_catalog_selections(
            &draft,
            &catalog,
            &finance,
            id,
            booked_on,
            self.usd_to_egp_rate,
        ));

        let mut booking = assemble_booking(id, &req, services, &finance);
        booking.created_at = existing.created_at;

        let updated = self.booking_repo.update(&booking).await?;

        info!(booking_id = %updated.id, total = %updated.total_amount, "Booking updated");

        Ok(updated)
    }

    /// Apply a status change and re-derive the finances.
    ///
    /// Transitions are not validated; the derivation simply reacts to the
    /// new value (switching to maintenance zeroes every figure).
    #[instrument(skip(self))]
    pub async fn change_status(&self, id: Uuid, status: BookingStatus) -> AppResult<Booking> {
        let mut booking = self
            .booking_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::BookingNotFound(id.to_string()))?;

        debug!(booking_id = %id, from = %booking.status, to = %status, "Changing booking status");

        booking.status = status;
        self.rederive_and_save(booking).await
    }

    /// Record an additional payment against the booking
    #[instrument(skip(self))]
    pub async fn record_payment(&self, id: Uuid, amount: Decimal) -> AppResult<Booking> {
        if amount <= Decimal::ZERO {
            return Err(AppError::InvalidInput(
                "Payment amount must be positive".to_string(),
            ));
        }

        let mut booking = self
            .booking_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::BookingNotFound(id.to_string()))?;

        booking.paid_amount += amount;

        let draft = draft_from_booking(&booking);
        let rate_card = self
            .apartment_repo
            .find_by_id(booking.apartment_id)
            .await?
            .map(|a| a.rate_card());
        let finance = compute_finance(
            &draft,
            rate_card.as_ref(),
            &[],
            self.usd_to_egp_rate,
        );

        if is_overpaid(&draft, &finance) {
            return Err(AppError::Overpaid {
                paid: draft.paid_amount.to_string(),
                total: finance.total.to_string(),
            });
        }

        apply_finance(&mut booking, &finance);
        self.booking_repo.update(&booking).await
    }

    /// Settle or reopen the operator commission
    #[instrument(skip(self))]
    pub async fn set_commission_paid(&self, id: Uuid, paid: bool) -> AppResult<Booking> {
        let mut booking = self
            .booking_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::BookingNotFound(id.to_string()))?;

        booking.commission_paid = paid;
        self.booking_repo.update(&booking).await
    }

    /// Delete a booking and its stay services
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let deleted = self.booking_repo.delete(id).await?;
        if deleted {
            info!(booking_id = %id, "Booking deleted");
        }
        Ok(deleted)
    }

    async fn rederive_and_save(&self, mut booking: Booking) -> AppResult<Booking> {
        let draft = draft_from_booking(&booking);
        let rate_card = self
            .apartment_repo
            .find_by_id(booking.apartment_id)
            .await?
            .map(|a| a.rate_card());

        // Catalog selections were materialized at commit, so the committed
        // booking's derivation runs on its stay services alone.
        let finance = compute_finance(&draft, rate_card.as_ref(), &[], self.usd_to_egp_rate);
        apply_finance(&mut booking, &finance);

        self.booking_repo.update(&booking).await
    }

    async fn ensure_no_overlap(
        &self,
        apartment_id: i32,
        start: NaiveDate,
        end: NaiveDate,
        exclude: Option<Uuid>,
    ) -> AppResult<()> {
        let overlapping = self
            .booking_repo
            .find_overlapping(apartment_id, start, end, exclude)
            .await?;

        if let Some(other) = overlapping.first() {
            return Err(AppError::BookingConflict(format!(
                "Apartment {} is occupied {} to {}",
                apartment_id, other.start_date, other.end_date
            )));
        }

        Ok(())
    }
}

/// Build an engine draft from a commit request
fn draft_from_request(req: &BookingRequest, booking_id: Uuid) -> BookingDraft {
    BookingDraft {
        status: req.status,
        currency: req.currency,
        start_date: Some(req.start_date),
        end_date: Some(req.end_date),
        discount: req.discount,
        paid_amount: req.paid_amount,
        payment_method: req.payment_method,
        selected_service_ids: req.selected_service_ids.clone(),
        services: req
            .extra_services
            .iter()
            .map(|e| StayService {
                id: Uuid::new_v4(),
                booking_id,
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

/// Build an engine draft from a committed booking (selections already
/// materialized, so none are passed)
fn draft_from_booking(booking: &Booking) -> BookingDraft {
    BookingDraft {
        status: booking.status,
        currency: booking.currency,
        start_date: Some(booking.start_date),
        end_date: Some(booking.end_date),
        discount: booking.discount,
        paid_amount: booking.paid_amount,
        payment_method: booking.payment_method,
        selected_service_ids: Vec::new(),
        services: booking.services.clone(),
    }
}

/// Copy the engine's output onto the booking's derived fields
fn apply_finance(booking: &mut Booking, finance: &FinanceResult) {
    booking.nights = finance.nights;
    booking.base_price = finance.base_price;
    booking.services_total = finance.services_total;
    booking.total_amount = finance.total;
    booking.remaining = finance.remaining;
    booking.payment_status = finance.payment_status;
    booking.updated_at = Utc::now();
}

fn assemble_booking(
    id: Uuid,
    req: &BookingRequest,
    services: Vec<StayService>,
    finance: &FinanceResult,
) -> Booking {
    let now = Utc::now();
    Booking {
        id,
        apartment_id: req.apartment_id,
        customer_id: req.customer_id,
        start_date: req.start_date,
        end_date: req.end_date,
        currency: req.currency,
        status: req.status,
        discount: req.discount,
        paid_amount: req.paid_amount,
        payment_method: req.payment_method,
        commission_amount: req.commission_amount,
        commission_paid: req.commission_paid,
        operator: req.operator.clone(),
        notes: req.notes.clone(),
        services,
        nights: finance.nights,
        base_price: finance.base_price,
        services_total: finance.services_total,
        total_amount: finance.total,
        remaining: finance.remaining,
        payment_status: finance.payment_status,
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use nilestay_core::models::{Apartment, CatalogService, PaymentStatus};
    use nilestay_core::traits::Repository;
    use parking_lot::Mutex;
    use rust_decimal_macros::dec;

    struct MockApartmentRepository {
        apartment: Option<Apartment>,
    }

    #[async_trait]
    impl Repository<Apartment, i32> for MockApartmentRepository {
        async fn find_by_id(&self, _id: i32) -> AppResult<Option<Apartment>> {
            Ok(self.apartment.clone())
        }

        async fn find_all(&self, _limit: i64, _offset: i64) -> AppResult<Vec<Apartment>> {
            Ok(self.apartment.clone().into_iter().collect())
        }

        async fn count(&self) -> AppResult<i64> {
            Ok(i64::from(self.apartment.is_some()))
        }

        async fn create(&self, entity: &Apartment) -> AppResult<Apartment> {
            Ok(entity.clone())
        }

        async fn update(&self, entity: &Apartment) -> AppResult<Apartment> {
            Ok(entity.clone())
        }

        async fn delete(&self, _id: i32) -> AppResult<bool> {
            Ok(true)
        }
    }

    #[async_trait]
    impl ApartmentRepository for MockApartmentRepository {
        async fn find_by_name(&self, _name: &str) -> AppResult<Option<Apartment>> {
            Ok(self.apartment.clone())
        }

        async fn list_active(&self) -> AppResult<Vec<Apartment>> {
            Ok(self.apartment.clone().into_iter().collect())
        }
    }

    #[derive(Default)]
    struct MockBookingRepository {
        bookings: Mutex<Vec<Booking>>,
    }

    #[async_trait]
    impl Repository<Booking, Uuid> for MockBookingRepository {
        async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>> {
            Ok(self.bookings.lock().iter().find(|b| b.id == id).cloned())
        }

        async fn find_all(&self, _limit: i64, _offset: i64) -> AppResult<Vec<Booking>> {
            Ok(self.bookings.lock().clone())
        }

        async fn count(&self) -> AppResult<i64> {
            Ok(self.bookings.lock().len() as i64)
        }

        async fn create(&self, entity: &Booking) -> AppResult<Booking> {
            self.bookings.lock().push(entity.clone());
            Ok(entity.clone())
        }

        async fn update(&self, entity: &Booking) -> AppResult<Booking> {
            let mut bookings = self.bookings.lock();
            if let Some(slot) = bookings.iter_mut().find(|b| b.id == entity.id) {
                *slot = entity.clone();
            }
            Ok(entity.clone())
        }

        async fn delete(&self, id: Uuid) -> AppResult<bool> {
            let mut bookings = self.bookings.lock();
            let before = bookings.len();
            bookings.retain(|b| b.id != id);
            Ok(bookings.len() < before)
        }
    }

    #[async_trait]
    impl BookingRepository for MockBookingRepository {
        async fn list_filtered(
            &self,
            _apartment_id: Option<i32>,
            _customer_id: Option<i32>,
            _status: Option<BookingStatus>,
            _from: Option<NaiveDate>,
            _to: Option<NaiveDate>,
            _limit: i64,
            _offset: i64,
        ) -> AppResult<(Vec<Booking>, i64)> {
            let bookings = self.bookings.lock().clone();
            let total = bookings.len() as i64;
            Ok((bookings, total))
        }

        async fn find_overlapping(
            &self,
            apartment_id: i32,
            start: NaiveDate,
            end: NaiveDate,
            exclude: Option<Uuid>,
        ) -> AppResult<Vec<Booking>> {
            Ok(self
                .bookings
                .lock()
                .iter()
                .filter(|b| b.apartment_id == apartment_id)
                .filter(|b| b.status.blocks_inventory())
                .filter(|b| Some(b.id) != exclude)
                .filter(|b| b.overlaps(start, end))
                .cloned()
                .collect())
        }

        async fn find_in_range(&self, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<Booking>> {
            Ok(self
                .bookings
                .lock()
                .iter()
                .filter(|b| b.overlaps(start, end))
                .cloned()
                .collect())
        }

        async fn find_by_customer(&self, customer_id: i32) -> AppResult<Vec<Booking>> {
            Ok(self
                .bookings
                .lock()
                .iter()
                .filter(|b| b.customer_id == customer_id)
                .cloned()
                .collect())
        }
    }

    struct MockServiceRepository {
        services: Vec<CatalogService>,
    }

    #[async_trait]
    impl Repository<CatalogService, i32> for MockServiceRepository {
        async fn find_by_id(&self, id: i32) -> AppResult<Option<CatalogService>> {
            Ok(self.services.iter().find(|s| s.id == id).cloned())
        }

        async fn find_all(&self, _limit: i64, _offset: i64) -> AppResult<Vec<CatalogService>> {
            Ok(self.services.clone())
        }

        async fn count(&self) -> AppResult<i64> {
            Ok(self.services.len() as i64)
        }

        async fn create(&self, entity: &CatalogService) -> AppResult<CatalogService> {
            Ok(entity.clone())
        }

        async fn update(&self, entity: &CatalogService) -> AppResult<CatalogService> {
            Ok(entity.clone())
        }

        async fn delete(&self, _id: i32) -> AppResult<bool> {
            Ok(true)
        }
    }

    #[async_trait]
    impl ServiceRepository for MockServiceRepository {
        async fn list_enabled(&self) -> AppResult<Vec<CatalogService>> {
            Ok(self.services.iter().filter(|s| s.enabled).cloned().collect())
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn test_apartment() -> Apartment {
        Apartment {
            id: 1,
            name: "Zamalek 3B".to_string(),
            owner_name: "A. Hassan".to_string(),
            daily_price: dec!(1000),
            monthly_price: Decimal::ZERO,
            ..Default::default()
        }
    }

    fn service(
        apartment: Option<Apartment>,
        catalog: Vec<CatalogService>,
    ) -> (
        BookingService<MockApartmentRepository, MockBookingRepository, MockServiceRepository>,
        Arc<MockBookingRepository>,
    ) {
        let booking_repo = Arc::new(MockBookingRepository::default());
        let svc = BookingService::new(
            Arc::new(MockApartmentRepository { apartment }),
            booking_repo.clone(),
            Arc::new(MockServiceRepository { services: catalog }),
            dec!(50),
        );
        (svc, booking_repo)
    }

    fn base_request() -> BookingRequest {
        BookingRequest {
            apartment_id: 1,
            customer_id: 7,
            start_date: date(2025, 6, 10),
            end_date: date(2025, 6, 13),
            currency: Currency::Egp,
            status: BookingStatus::Confirmed,
            discount: Decimal::ZERO,
            paid_amount: Decimal::ZERO,
            payment_method: PaymentMethod::Cash,
            commission_amount: Decimal::ZERO,
            commission_paid: false,
            operator: None,
            notes: None,
            selected_service_ids: Vec::new(),
            extra_services: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_create_persists_derived_fields() {
        let (svc, _) = service(Some(test_apartment()), vec![]);

        let booking = svc
            .create(BookingRequest {
                paid_amount: dec!(1500),
                ..base_request()
            })
            .await
            .unwrap();

        assert_eq!(booking.nights, 3);
        assert_eq!(booking.total_amount, dec!(3000));
        assert_eq!(booking.remaining, dec!(1500));
        assert_eq!(booking.payment_status, PaymentStatus::Partial);
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_apartment() {
        let (svc, _) = service(None, vec![]);

        let result = svc.create(base_request()).await;
        assert!(matches!(result, Err(AppError::ApartmentNotFound(1))));
    }

    #[tokio::test]
    async fn test_create_rejects_overpayment() {
        let (svc, repo) = service(Some(test_apartment()), vec![]);

        let result = svc
            .create(BookingRequest {
                paid_amount: dec!(5000), // total is 3000
                ..base_request()
            })
            .await;

        assert!(matches!(result, Err(AppError::Overpaid { .. })));
        assert_eq!(repo.bookings.lock().len(), 0);
    }

    #[tokio::test]
    async fn test_create_rejects_overlap() {
        let (svc, _) = service(Some(test_apartment()), vec![]);

        svc.create(base_request()).await.unwrap();

        let result = svc
            .create(BookingRequest {
                start_date: date(2025, 6, 12),
                end_date: date(2025, 6, 15),
                ..base_request()
            })
            .await;

        assert!(matches!(result, Err(AppError::BookingConflict(_))));
    }

    #[tokio::test]
    async fn test_back_to_back_stays_allowed() {
        let (svc, _) = service(Some(test_apartment()), vec![]);

        svc.create(base_request()).await.unwrap();

        // Check-in on the previous guest's checkout day
        let result = svc
            .create(BookingRequest {
                start_date: date(2025, 6, 13),
                end_date: date(2025, 6, 16),
                ..base_request()
            })
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_create_materializes_catalog_selection() {
        let catalog = vec![CatalogService {
            id: 3,
            name: "Airport pickup".to_string(),
            price: dec!(350),
            ..Default::default()
        }];
        let (svc, _) = service(Some(test_apartment()), catalog);

        let booking = svc
            .create(BookingRequest {
                selected_service_ids: vec![3],
                ..base_request()
            })
            .await
            .unwrap();

        assert_eq!(booking.services.len(), 1);
        assert_eq!(booking.services[0].source_service_id, Some(3));
        assert_eq!(booking.services[0].price, dec!(350));
        assert_eq!(booking.services_total, dec!(350));
        assert_eq!(booking.total_amount, dec!(3350));
    }

    #[tokio::test]
    async fn test_update_keeps_materialized_snapshot_price() {
        let mut catalog_service = CatalogService {
            id: 3,
            name: "Airport pickup".to_string(),
            price: dec!(350),
            ..Default::default()
        };
        let (svc, _) = service(Some(test_apartment()), vec![catalog_service.clone()]);

        let booking = svc
            .create(BookingRequest {
                selected_service_ids: vec![3],
                ..base_request()
            })
            .await
            .unwrap();

        // A later catalog price change must not reach the committed booking
        catalog_service.price = dec!(999);
        let (svc, repo2) = service(Some(test_apartment()), vec![catalog_service]);
        repo2.bookings.lock().push(booking.clone());

        let updated = svc
            .update(
                booking.id,
                BookingRequest {
                    selected_service_ids: vec![3],
                    notes: Some("late checkout requested".to_string()),
                    ..base_request()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.services.len(), 1);
        assert_eq!(updated.services[0].price, dec!(350));
        assert_eq!(updated.services[0].id, booking.services[0].id);
        // Charged once, at the snapshot price
        assert_eq!(updated.services_total, dec!(350));
        assert_eq!(updated.total_amount, dec!(3350));
    }

    #[tokio::test]
    async fn test_update_drops_deselected_snapshot() {
        let catalog = vec![CatalogService {
            id: 3,
            name: "Airport pickup".to_string(),
            price: dec!(350),
            ..Default::default()
        }];
        let (svc, _) = service(Some(test_apartment()), catalog);

        let booking = svc
            .create(BookingRequest {
                selected_service_ids: vec![3],
                ..base_request()
            })
            .await
            .unwrap();

        let updated = svc
            .update(booking.id, base_request())
            .await
            .unwrap();

        assert!(updated.services.is_empty());
        assert_eq!(updated.total_amount, dec!(3000));
    }

    #[tokio::test]
    async fn test_change_status_to_maintenance_zeroes_finance() {
        let (svc, _) = service(Some(test_apartment()), vec![]);

        let booking = svc
            .create(BookingRequest {
                paid_amount: dec!(1000),
                ..base_request()
            })
            .await
            .unwrap();

        let updated = svc
            .change_status(booking.id, BookingStatus::Maintenance)
            .await
            .unwrap();

        assert_eq!(updated.total_amount, Decimal::ZERO);
        assert_eq!(updated.remaining, Decimal::ZERO);
        assert_eq!(updated.payment_status, PaymentStatus::NotApplicable);
    }

    #[tokio::test]
    async fn test_record_payment_settles_booking() {
        let (svc, _) = service(Some(test_apartment()), vec![]);

        let booking = svc
            .create(BookingRequest {
                paid_amount: dec!(1000),
                ..base_request()
            })
            .await
            .unwrap();

        let updated = svc.record_payment(booking.id, dec!(2000)).await.unwrap();
        assert_eq!(updated.paid_amount, dec!(3000));
        assert_eq!(updated.remaining, Decimal::ZERO);
        assert_eq!(updated.payment_status, PaymentStatus::Paid);

        // Paying beyond the total is blocked
        let result = svc.record_payment(booking.id, dec!(500)).await;
        assert!(matches!(result, Err(AppError::Overpaid { .. })));
    }

    #[tokio::test]
    async fn test_record_payment_rejects_non_positive() {
        let (svc, _) = service(Some(test_apartment()), vec![]);
        let booking = svc.create(base_request()).await.unwrap();

        let result = svc.record_payment(booking.id, Decimal::ZERO).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_commission_toggle() {
        let (svc, _) = service(Some(test_apartment()), vec![]);

        let booking = svc
            .create(BookingRequest {
                commission_amount: dec!(150),
                operator: Some("walk-in desk".to_string()),
                ..base_request()
            })
            .await
            .unwrap();
        assert!(!booking.commission_paid);

        let updated = svc.set_commission_paid(booking.id, true).await.unwrap();
        assert!(updated.commission_paid);
    }

    #[tokio::test]
    async fn test_delete() {
        let (svc, repo) = service(Some(test_apartment()), vec![]);
        let booking = svc.create(base_request()).await.unwrap();

        assert!(svc.delete(booking.id).await.unwrap());
        assert!(repo.bookings.lock().is_empty());
        assert!(!svc.delete(booking.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_preview_without_apartment_is_zero() {
        let (svc, _) = service(Some(test_apartment()), vec![]);

        let draft = BookingDraft {
            start_date: Some(date(2025, 6, 10)),
            end_date: Some(date(2025, 6, 13)),
            ..Default::default()
        };
        let finance = svc.preview(None, &draft).await.unwrap();
        assert_eq!(finance.total, Decimal::ZERO);
        assert_eq!(finance.nights, 0);

        let finance = svc.preview(Some(1), &draft).await.unwrap();
        assert_eq!(finance.total, dec!(3000));
    }
}
