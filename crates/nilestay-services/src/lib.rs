//! Business logic services for Nilestay
//!
//! This crate contains the business logic that sits between the HTTP layer
//! and the repositories:
//!
//! - `pricing` - the booking finance engine: pure functions deriving a
//!   booking's nights, base price, service subtotals, total, balance, and
//!   payment status from explicit inputs. No I/O, no ambient state.
//! - `booking` - the compute-then-commit flow around the engine: conflict
//!   and overpayment gates, catalog-selection materialization, persistence
//!   through the repository traits.
//!
//! # Architecture
//!
//! Services own their dependencies behind `Arc`s and are generic over the
//! repository traits, which keeps them testable against in-memory mocks.
//! All operations are instrumented with tracing and return `AppError`.

pub mod booking;
pub mod pricing;

pub use booking::BookingService;
pub use pricing::{
    compute_finance, is_overpaid, materialize_catalog_selections, BookingDraft, FinanceResult,
};

/// Business logic constants
pub mod constants {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    /// Nights per month used by the monthly pricing tier.
    ///
    /// A stay of `MONTH_BASIS_NIGHTS` or more on a unit with a monthly
    /// price is billed at `nights / 30` months, pro-rated linearly.
    pub const MONTH_BASIS_NIGHTS: i64 = 30;

    /// Fallback USD to EGP conversion rate when none is configured
    pub const DEFAULT_USD_TO_EGP_RATE: Decimal = dec!(50);

    /// Decimal places for money amounts at rounding points
    pub const MONEY_SCALE: u32 = 2;
}
