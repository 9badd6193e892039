//! Common traits for repositories
//!
//! Defines abstractions for database access used by services and handlers.

use crate::error::AppError;
use crate::models::{
    Apartment, Booking, BookingStatus, CatalogService, Customer, Expense, ExpenseCategory, User,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

/// Generic repository trait for CRUD operations
#[async_trait]
pub trait Repository<T, ID>: Send + Sync {
    /// Find entity by ID
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, AppError>;

    /// Find all entities with pagination
    async fn find_all(&self, limit: i64, offset: i64) -> Result<Vec<T>, AppError>;

    /// Count total entities
    async fn count(&self) -> Result<i64, AppError>;

    /// Create a new entity
    async fn create(&self, entity: &T) -> Result<T, AppError>;

    /// Update an existing entity
    async fn update(&self, entity: &T) -> Result<T, AppError>;

    /// Delete entity by ID
    async fn delete(&self, id: ID) -> Result<bool, AppError>;
}

/// Apartment repository trait with specialized methods
#[async_trait]
pub trait ApartmentRepository: Repository<Apartment, i32> {
    /// Find apartment by its display name
    async fn find_by_name(&self, name: &str) -> Result<Option<Apartment>, AppError>;

    /// List apartments currently in inventory
    async fn list_active(&self) -> Result<Vec<Apartment>, AppError>;
}

/// Customer repository trait with specialized methods
#[async_trait]
pub trait CustomerRepository: Repository<Customer, i32> {
    /// Find customer by phone number
    async fn find_by_phone(&self, phone: &str) -> Result<Option<Customer>, AppError>;

    /// Search customers by name or phone fragment
    async fn search(
        &self,
        query: &str,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Customer>, i64), AppError>;
}

/// Catalog service repository trait with specialized methods
#[async_trait]
pub trait ServiceRepository: Repository<CatalogService, i32> {
    /// List services selectable for new bookings
    async fn list_enabled(&self) -> Result<Vec<CatalogService>, AppError>;
}

/// Booking repository trait with specialized methods
#[async_trait]
pub trait BookingRepository: Repository<Booking, Uuid> {
    /// List bookings with filtering
    #[allow(clippy::too_many_arguments)]
    async fn list_filtered(
        &self,
        apartment_id: Option<i32>,
        customer_id: Option<i32>,
        status: Option<BookingStatus>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Booking>, i64), AppError>;

    /// Bookings on one apartment whose stay window overlaps the given
    /// half-open range and whose status takes the unit out of inventory.
    /// `exclude` skips a booking (its own id when re-saving).
    async fn find_overlapping(
        &self,
        apartment_id: i32,
        start: NaiveDate,
        end: NaiveDate,
        exclude: Option<Uuid>,
    ) -> Result<Vec<Booking>, AppError>;

    /// All bookings (any apartment) overlapping the given range,
    /// for the calendar view.
    async fn find_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Booking>, AppError>;

    /// Bookings belonging to one customer
    async fn find_by_customer(&self, customer_id: i32) -> Result<Vec<Booking>, AppError>;
}

/// Expense repository trait with specialized methods
#[async_trait]
pub trait ExpenseRepository: Repository<Expense, i32> {
    /// List expenses with filtering
    async fn list_filtered(
        &self,
        apartment_id: Option<i32>,
        category: Option<ExpenseCategory>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Expense>, i64), AppError>;
}

/// User repository trait with specialized methods
#[async_trait]
pub trait UserRepository: Repository<User, i32> {
    /// Find user by username
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Find user by email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Update last login timestamp
    async fn update_last_login(&self, id: i32) -> Result<(), AppError>;
}

/// Pagination parameters
#[derive(Debug, Clone, Default)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Pagination {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 1000),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize)]
pub struct PaginationMeta {
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl PaginationMeta {
    pub fn new(total: i64, page: i64, per_page: i64) -> Self {
        let total_pages = if per_page > 0 {
            (total + per_page - 1) / per_page
        } else {
            0
        };

        Self {
            total,
            page,
            per_page,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination() {
        let p = Pagination::new(1, 10);
        assert_eq!(p.offset(), 0);
        assert_eq!(p.limit(), 10);

        let p = Pagination::new(3, 20);
        assert_eq!(p.offset(), 40);
        assert_eq!(p.limit(), 20);
    }

    #[test]
    fn test_pagination_bounds() {
        let p = Pagination::new(0, 10); // page 0 becomes 1
        assert_eq!(p.page, 1);

        let p = Pagination::new(1, 2000); // per_page capped at 1000
        assert_eq!(p.per_page, 1000);
    }

    #[test]
    fn test_pagination_meta() {
        let meta = PaginationMeta::new(95, 1, 10);
        assert_eq!(meta.total_pages, 10);

        let meta = PaginationMeta::new(100, 1, 10);
        assert_eq!(meta.total_pages, 10);

        let meta = PaginationMeta::new(101, 1, 10);
        assert_eq!(meta.total_pages, 11);
    }
}
