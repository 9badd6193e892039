//! Booking repository implementation
//!
//! Provides PostgreSQL-backed storage for bookings and their embedded stay
//! services. Writes are transactional: a booking's stay services are
//! rewritten wholesale with the booking row, mirroring the way derived
//! fields are recomputed wholesale rather than patched.

use chrono::NaiveDate;
use nilestay_core::{
    models::{Booking, BookingStatus, Currency, PaymentMethod, PaymentStatus, StayService},
    traits::{BookingRepository, Repository},
    AppError, AppResult,
};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction};
use std::collections::HashMap;
use tracing::{debug, error, instrument};
use uuid::Uuid;

/// PostgreSQL implementation of BookingRepository
pub struct PgBookingRepository {
    pool: PgPool,
}

const BOOKING_COLUMNS: &str = r#"
    id, apartment_id, customer_id,
    start_date, end_date,
    currency, status,
    discount, paid_amount, payment_method,
    commission_amount, commission_paid, operator,
    notes,
    nights, base_price, services_total,
    total_amount, remaining, payment_status,
    created_at, updated_at
"#;

const STAY_SERVICE_COLUMNS: &str = r#"
    id, booking_id, source_service_id, name, price,
    date, payment_method, is_paid, is_fulfilled
"#;

fn parse_currency(s: &str) -> Currency {
    Currency::from_str(s).unwrap_or_default()
}

fn parse_status(s: &str) -> BookingStatus {
    BookingStatus::from_str(s).unwrap_or_default()
}

fn parse_payment_status(s: &str) -> PaymentStatus {
    PaymentStatus::from_str(s).unwrap_or_default()
}

fn parse_payment_method(s: &str) -> PaymentMethod {
    PaymentMethod::from_str(s).unwrap_or_default()
}

fn map_booking(row: sqlx::postgres::PgRow) -> Booking {
    Booking {
        id: row.get("id"),
        apartment_id: row.get("apartment_id"),
        customer_id: row.get("customer_id"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        currency: parse_currency(row.get("currency")),
        status: parse_status(row.get("status")),
        discount: row.get("discount"),
        paid_amount: row.get("paid_amount"),
        payment_method: parse_payment_method(row.get("payment_method")),
        commission_amount: row.get("commission_amount"),
        commission_paid: row.get("commission_paid"),
        operator: row.get("operator"),
        notes: row.get("notes"),
        services: Vec::new(), // attached separately
        nights: row.get("nights"),
        base_price: row.get("base_price"),
        services_total: row.get("services_total"),
        total_amount: row.get("total_amount"),
        remaining: row.get("remaining"),
        payment_status: parse_payment_status(row.get("payment_status")),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn map_stay_service(row: sqlx::postgres::PgRow) -> StayService {
    StayService {
        id: row.get("id"),
        booking_id: row.get("booking_id"),
        source_service_id: row.get("source_service_id"),
        name: row.get("name"),
        price: row.get("price"),
        date: row.get("date"),
        payment_method: parse_payment_method(row.get("payment_method")),
        is_paid: row.get("is_paid"),
        is_fulfilled: row.get("is_fulfilled"),
    }
}

impl PgBookingRepository {
    /// Create a new booking repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Attach stay services to the given bookings with one array query
    async fn attach_services(&self, bookings: &mut [Booking]) -> AppResult<()> {
        if bookings.is_empty() {
            return Ok(());
        }

        let ids: Vec<Uuid> = bookings.iter().map(|b| b.id).collect();

        let query = format!(
            "SELECT {} FROM booking_services WHERE booking_id = ANY($1) ORDER BY date, name",
            STAY_SERVICE_COLUMNS
        );

        let services = sqlx::query(&query)
            .bind(&ids)
            .map(map_stay_service)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error fetching stay services: {}", e);
                AppError::Database(format!("Failed to fetch stay services: {}", e))
            })?;

        let mut by_booking: HashMap<Uuid, Vec<StayService>> = HashMap::new();
        for service in services {
            by_booking.entry(service.booking_id).or_default().push(service);
        }

        for booking in bookings {
            if let Some(services) = by_booking.remove(&booking.id) {
                booking.services = services;
            }
        }

        Ok(())
    }

    async fn insert_services(
        tx: &mut Transaction<'_, Postgres>,
        services: &[StayService],
    ) -> AppResult<()> {
        for service in services {
            sqlx::query(
                r#"
                INSERT INTO booking_services (
                    id, booking_id, source_service_id, name, price,
                    date, payment_method, is_paid, is_fulfilled
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(service.id)
            .bind(service.booking_id)
            .bind(service.source_service_id)
            .bind(&service.name)
            .bind(service.price)
            .bind(service.date)
            .bind(service.payment_method.as_str())
            .bind(service.is_paid)
            .bind(service.is_fulfilled)
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                error!("Database error inserting stay service: {}", e);
                AppError::Database(format!("Failed to insert stay service: {}", e))
            })?;
        }

        Ok(())
    }
}

#[async_trait]
impl Repository<Booking, Uuid> for PgBookingRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>> {
        debug!("Finding booking by id: {}", id);

        let query = format!("SELECT {} FROM bookings WHERE id = $1", BOOKING_COLUMNS);

        let result = sqlx::query(&query)
            .bind(id)
            .map(map_booking)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding booking {}: {}", id, e);
                AppError::Database(format!("Failed to find booking: {}", e))
            })?;

        match result {
            Some(booking) => {
                let mut bookings = vec![booking];
                self.attach_services(&mut bookings).await?;
                Ok(bookings.pop())
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<Booking>> {
        let query = format!(
            "SELECT {} FROM bookings ORDER BY start_date DESC LIMIT $1 OFFSET $2",
            BOOKING_COLUMNS
        );

        let mut bookings = sqlx::query(&query)
            .bind(limit)
            .bind(offset)
            .map(map_booking)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding bookings: {}", e);
                AppError::Database(format!("Failed to fetch bookings: {}", e))
            })?;

        self.attach_services(&mut bookings).await?;
        Ok(bookings)
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bookings")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting bookings: {}", e);
                AppError::Database(format!("Failed to count bookings: {}", e))
            })?;

        Ok(result.0)
    }

    #[instrument(skip(self, entity))]
    async fn create(&self, entity: &Booking) -> AppResult<Booking> {
        debug!("Creating booking: {}", entity.id);

        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            AppError::Transaction(e.to_string())
        })?;

        let query = format!(
            r#"
            INSERT INTO bookings (
                id, apartment_id, customer_id,
                start_date, end_date,
                currency, status,
                discount, paid_amount, payment_method,
                commission_amount, commission_paid, operator,
                notes,
                nights, base_price, services_total,
                total_amount, remaining, payment_status
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                $11, $12, $13, $14, $15, $16, $17, $18, $19, $20
            )
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        );

        let mut booking = sqlx::query(&query)
            .bind(entity.id)
            .bind(entity.apartment_id)
            .bind(entity.customer_id)
            .bind(entity.start_date)
            .bind(entity.end_date)
            .bind(entity.currency.as_str())
            .bind(entity.status.as_str())
            .bind(entity.discount)
            .bind(entity.paid_amount)
            .bind(entity.payment_method.as_str())
            .bind(entity.commission_amount)
            .bind(entity.commission_paid)
            .bind(&entity.operator)
            .bind(&entity.notes)
            .bind(entity.nights)
            .bind(entity.base_price)
            .bind(entity.services_total)
            .bind(entity.total_amount)
            .bind(entity.remaining)
            .bind(entity.payment_status.as_str())
            .map(map_booking)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                error!("Database error creating booking: {}", e);
                AppError::Database(format!("Failed to create booking: {}", e))
            })?;

        Self::insert_services(&mut tx, &entity.services).await?;

        tx.commit().await.map_err(|e| {
            error!("Failed to commit booking transaction: {}", e);
            AppError::Transaction(e.to_string())
        })?;

        booking.services = entity.services.clone();
        Ok(booking)
    }

    #[instrument(skip(self, entity))]
    async fn update(&self, entity: &Booking) -> AppResult<Booking> {
        debug!("Updating booking: {}", entity.id);

        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            AppError::Transaction(e.to_string())
        })?;

        let query = format!(
            r#"
            UPDATE bookings
            SET apartment_id = $2,
                customer_id = $3,
                start_date = $4,
                end_date = $5,
                currency = $6,
                status = $7,
                discount = $8,
                paid_amount = $9,
                payment_method = $10,
                commission_amount = $11,
                commission_paid = $12,
                operator = $13,
                notes = $14,
                nights = $15,
                base_price = $16,
                services_total = $17,
                total_amount = $18,
                remaining = $19,
                payment_status = $20,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        );

        let mut booking = sqlx::query(&query)
            .bind(entity.id)
            .bind(entity.apartment_id)
            .bind(entity.customer_id)
            .bind(entity.start_date)
            .bind(entity.end_date)
            .bind(entity.currency.as_str())
            .bind(entity.status.as_str())
            .bind(entity.discount)
            .bind(entity.paid_amount)
            .bind(entity.payment_method.as_str())
            .bind(entity.commission_amount)
            .bind(entity.commission_paid)
            .bind(&entity.operator)
            .bind(&entity.notes)
            .bind(entity.nights)
            .bind(entity.base_price)
            .bind(entity.services_total)
            .bind(entity.total_amount)
            .bind(entity.remaining)
            .bind(entity.payment_status.as_str())
            .map(map_booking)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                error!("Database error updating booking {}: {}", entity.id, e);
                AppError::Database(format!("Failed to update booking: {}", e))
            })?;

        // Stay services are rewritten wholesale with the booking row
        sqlx::query("DELETE FROM booking_services WHERE booking_id = $1")
            .bind(entity.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("Database error clearing stay services: {}", e);
                AppError::Database(format!("Failed to clear stay services: {}", e))
            })?;

        Self::insert_services(&mut tx, &entity.services).await?;

        tx.commit().await.map_err(|e| {
            error!("Failed to commit booking transaction: {}", e);
            AppError::Transaction(e.to_string())
        })?;

        booking.services = entity.services.clone();
        Ok(booking)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        debug!("Deleting booking: {}", id);

        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            AppError::Transaction(e.to_string())
        })?;

        sqlx::query("DELETE FROM booking_services WHERE booking_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("Database error deleting stay services: {}", e);
                AppError::Database(format!("Failed to delete stay services: {}", e))
            })?;

        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("Database error deleting booking {}: {}", id, e);
                AppError::Database(format!("Failed to delete booking: {}", e))
            })?;

        tx.commit().await.map_err(|e| {
            error!("Failed to commit delete transaction: {}", e);
            AppError::Transaction(e.to_string())
        })?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    #[instrument(skip(self))]
    async fn list_filtered(
        &self,
        apartment_id: Option<i32>,
        customer_id: Option<i32>,
        status: Option<BookingStatus>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Booking>, i64)> {
        debug!("Listing bookings with filters");

        let status_str = status.map(|s| s.as_str().to_string());

        let query = format!(
            r#"
            SELECT {}
            FROM bookings
            WHERE ($1::INT4 IS NULL OR apartment_id = $1)
              AND ($2::INT4 IS NULL OR customer_id = $2)
              AND ($3::TEXT IS NULL OR status = $3)
              AND ($4::DATE IS NULL OR end_date > $4)
              AND ($5::DATE IS NULL OR start_date < $5)
            ORDER BY start_date DESC
            LIMIT $6 OFFSET $7
            "#,
            BOOKING_COLUMNS
        );

        let mut bookings = sqlx::query(&query)
            .bind(apartment_id)
            .bind(customer_id)
            .bind(&status_str)
            .bind(from)
            .bind(to)
            .bind(limit)
            .bind(offset)
            .map(map_booking)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error listing bookings: {}", e);
                AppError::Database(format!("Failed to fetch bookings: {}", e))
            })?;

        let total: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM bookings
            WHERE ($1::INT4 IS NULL OR apartment_id = $1)
              AND ($2::INT4 IS NULL OR customer_id = $2)
              AND ($3::TEXT IS NULL OR status = $3)
              AND ($4::DATE IS NULL OR end_date > $4)
              AND ($5::DATE IS NULL OR start_date < $5)
            "#,
        )
        .bind(apartment_id)
        .bind(customer_id)
        .bind(&status_str)
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error counting bookings: {}", e);
            AppError::Database(format!("Failed to count bookings: {}", e))
        })?;

        self.attach_services(&mut bookings).await?;
        Ok((bookings, total.0))
    }

    #[instrument(skip(self))]
    async fn find_overlapping(
        &self,
        apartment_id: i32,
        start: NaiveDate,
        end: NaiveDate,
        exclude: Option<Uuid>,
    ) -> AppResult<Vec<Booking>> {
        debug!(
            "Finding overlapping bookings for apartment {} between {} and {}",
            apartment_id, start, end
        );

        let query = format!(
            r#"
            SELECT {}
            FROM bookings
            WHERE apartment_id = $1
              AND start_date < $3
              AND end_date > $2
              AND status IN ('confirmed', 'stay', 'maintenance')
              AND ($4::UUID IS NULL OR id != $4)
            ORDER BY start_date
            "#,
            BOOKING_COLUMNS
        );

        let mut bookings = sqlx::query(&query)
            .bind(apartment_id)
            .bind(start)
            .bind(end)
            .bind(exclude)
            .map(map_booking)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding overlapping bookings: {}", e);
                AppError::Database(format!("Failed to fetch bookings: {}", e))
            })?;

        self.attach_services(&mut bookings).await?;
        Ok(bookings)
    }

    #[instrument(skip(self))]
    async fn find_in_range(&self, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<Booking>> {
        debug!("Finding bookings between {} and {}", start, end);

        let query = format!(
            r#"
            SELECT {}
            FROM bookings
            WHERE start_date < $2 AND end_date > $1
            ORDER BY apartment_id, start_date
            "#,
            BOOKING_COLUMNS
        );

        let mut bookings = sqlx::query(&query)
            .bind(start)
            .bind(end)
            .map(map_booking)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding bookings in range: {}", e);
                AppError::Database(format!("Failed to fetch bookings: {}", e))
            })?;

        self.attach_services(&mut bookings).await?;
        Ok(bookings)
    }

    #[instrument(skip(self))]
    async fn find_by_customer(&self, customer_id: i32) -> AppResult<Vec<Booking>> {
        let query = format!(
            "SELECT {} FROM bookings WHERE customer_id = $1 ORDER BY start_date DESC",
            BOOKING_COLUMNS
        );

        let mut bookings = sqlx::query(&query)
            .bind(customer_id)
            .map(map_booking)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding customer bookings: {}", e);
                AppError::Database(format!("Failed to fetch bookings: {}", e))
            })?;

        self.attach_services(&mut bookings).await?;
        Ok(bookings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsers_fall_back_to_defaults() {
        assert_eq!(parse_status("stay"), BookingStatus::Stay);
        assert_eq!(parse_status("garbage"), BookingStatus::Confirmed);
        assert_eq!(parse_currency("USD"), Currency::Usd);
        assert_eq!(parse_currency(""), Currency::Egp);
        assert_eq!(parse_payment_status("partial"), PaymentStatus::Partial);
        assert_eq!(parse_payment_method("instapay"), PaymentMethod::Instapay);
    }
}
