//! Nilestay Database Layer
//!
//! This crate provides PostgreSQL database access and repository
//! implementations for the Nilestay system. It includes:
//!
//! - Connection pool management with sqlx
//! - Repository implementations for all domain entities
//! - Transactional writes for bookings and their stay services
//!
//! Queries are runtime queries (not compile-time macros) so the workspace
//! builds without a database connection.

pub mod pool;
pub mod repositories;

pub use pool::create_pool;
pub use repositories::*;

// Re-export commonly used types
pub use nilestay_core::{AppError, AppResult};
pub use sqlx::{PgPool, Postgres, Transaction};
