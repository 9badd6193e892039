//! API layer for Nilestay
//!
//! HTTP API handlers for managing the rental operation: apartments,
//! customers, bookings with their finance engine, the service catalog,
//! expenses, staff accounts, audit logs, and reports.

pub mod dto;
pub mod handlers;

// Re-export common DTOs
pub use dto::{ApiResponse, PaginationParams};

// Re-export handler configuration functions
pub use handlers::{
    configure_apartments, configure_audit, configure_auth, configure_bookings,
    configure_customers, configure_expenses, configure_reports, configure_services,
    configure_users,
};
