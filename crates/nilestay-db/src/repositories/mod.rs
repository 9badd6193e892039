//! Repository implementations
//!
//! This module contains concrete implementations of all repository traits
//! defined in nilestay-core, using sqlx for PostgreSQL access.

pub mod apartment_repo;
pub mod audit_repo;
pub mod booking_repo;
pub mod customer_repo;
pub mod expense_repo;
pub mod service_repo;
pub mod user_repo;

pub use apartment_repo::PgApartmentRepository;
pub use audit_repo::PgAuditLogRepository;
pub use booking_repo::PgBookingRepository;
pub use customer_repo::PgCustomerRepository;
pub use expense_repo::PgExpenseRepository;
pub use service_repo::PgServiceRepository;
pub use user_repo::PgUserRepository;
