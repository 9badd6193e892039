//! Domain models for Nilestay
//!
//! This module contains all the core domain models used throughout the application.

pub mod apartment;
pub mod audit;
pub mod booking;
pub mod currency;
pub mod customer;
pub mod expense;
pub mod service;
pub mod user;

pub use apartment::{Apartment, RateCard};
pub use audit::{AuditLog, AuditLogBuilder, AuditLogData};
pub use booking::{Booking, BookingStatus, PaymentMethod, PaymentStatus, StayService};
pub use currency::Currency;
pub use customer::Customer;
pub use expense::{Expense, ExpenseCategory};
pub use service::CatalogService;
pub use user::{Permission, User, UserInfo, UserPermissions, UserRole};
