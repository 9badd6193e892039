//! Booking finance engine
//!
//! Pure functions mapping a booking draft plus its referenced rate card and
//! catalog snapshot to the derived financial fields: nights, base price,
//! service subtotals, total, remaining balance, and payment status.
//!
//! Every input is an explicit parameter (rate card, catalog, conversion
//! rate) - there are no global lookups and no I/O, so the engine is safe to
//! re-run on every draft edit and yields identical results for identical
//! inputs. Rounding to two decimal places happens at exactly two points,
//! the total and the remaining balance; intermediate sums keep full
//! precision.

use std::collections::HashSet;

use chrono::NaiveDate;
use nilestay_core::models::{
    BookingStatus, CatalogService, Currency, PaymentMethod, PaymentStatus, RateCard, StayService,
};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::constants::{MONEY_SCALE, MONTH_BASIS_NIGHTS};

/// The financial inputs of a booking form, before or after commit.
///
/// `start_date`/`end_date` stay optional because the engine is called on
/// half-filled forms; a missing date degrades to an all-zero result rather
/// than an error. For a committed booking the catalog selection has already
/// been materialized into `services`, so `selected_service_ids` is empty.
#[derive(Debug, Clone, Default)]
pub struct BookingDraft {
    pub status: BookingStatus,
    pub currency: Currency,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Discount in the booking's currency
    pub discount: Decimal,
    /// Amount received so far, in the booking's currency
    pub paid_amount: Decimal,
    pub payment_method: PaymentMethod,
    /// Catalog selections not yet materialized (EGP list prices)
    pub selected_service_ids: Vec<i32>,
    /// Stay services already carrying prices in the booking's currency
    pub services: Vec<StayService>,
}

/// Derived financial fields of a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FinanceResult {
    /// Billable nights (minimum 1 once both dates are known)
    pub nights: i64,
    /// Stay price in the booking's currency, before services and discount
    pub base_price: Decimal,
    /// Catalog + ad-hoc services subtotal in the booking's currency
    pub services_total: Decimal,
    /// `round2(base_price + services_total - discount)`
    pub total: Decimal,
    /// `round2(total - paid_amount)`
    pub remaining: Decimal,
    /// Derived payment state
    pub payment_status: PaymentStatus,
}

impl FinanceResult {
    /// The all-zero result used when there is not enough information to
    /// price the draft, or for non-revenue maintenance blocks.
    fn zeroed(payment_status: PaymentStatus) -> Self {
        Self {
            nights: 0,
            base_price: Decimal::ZERO,
            services_total: Decimal::ZERO,
            total: Decimal::ZERO,
            remaining: Decimal::ZERO,
            payment_status,
        }
    }
}

/// Round a money amount to two decimal places (half away from zero)
pub fn round2(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Billable nights between two dates.
///
/// The end date is the checkout day and does not count as a night, but any
/// same-day or inverted range still bills a single night: a one-night
/// minimum charge, not an error.
pub fn nights_between(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days().max(1)
}

/// Stay price in EGP for the given night count.
///
/// Stays of [`MONTH_BASIS_NIGHTS`] or more on a unit with a monthly tier
/// are billed at `nights / 30` months, pro-rated linearly; everything else
/// bills nightly.
fn base_price_egp(nights: i64, rate_card: &RateCard) -> Decimal {
    if nights >= MONTH_BASIS_NIGHTS && rate_card.has_monthly_tier() {
        Decimal::from(nights) / Decimal::from(MONTH_BASIS_NIGHTS) * rate_card.monthly_price
    } else {
        Decimal::from(nights) * rate_card.daily_price
    }
}

/// Derive the payment status from the computed figures.
///
/// `Paid` iff nothing remains due; `Partial` iff something was received but
/// not everything; otherwise `Unpaid`. Maintenance blocks are handled
/// before this is reached (they carry `NotApplicable`).
fn derive_payment_status(total: Decimal, paid: Decimal, remaining: Decimal) -> PaymentStatus {
    if remaining <= Decimal::ZERO {
        PaymentStatus::Paid
    } else if paid > Decimal::ZERO && paid < total {
        PaymentStatus::Partial
    } else {
        PaymentStatus::Unpaid
    }
}

/// Compute the derived financial fields for a draft.
///
/// Degrades to an all-zero result while the form lacks an apartment or a
/// parseable date range, and for maintenance blocks (which are non-revenue
/// and get [`PaymentStatus::NotApplicable`]). Unknown catalog ids are
/// ignored; duplicated selections count once. Negative totals from
/// over-discounting pass through unchanged.
pub fn compute_finance(
    draft: &BookingDraft,
    rate_card: Option<&RateCard>,
    catalog: &[CatalogService],
    usd_to_egp_rate: Decimal,
) -> FinanceResult {
    if draft.status.is_maintenance() {
        return FinanceResult::zeroed(PaymentStatus::NotApplicable);
    }

    let (Some(card), Some(start), Some(end)) = (rate_card, draft.start_date, draft.end_date)
    else {
        // Not enough information yet - a normal mid-form state.
        return FinanceResult::zeroed(derive_payment_status(
            Decimal::ZERO,
            draft.paid_amount,
            Decimal::ZERO,
        ));
    };

    let nights = nights_between(start, end);
    let base_price = draft
        .currency
        .from_egp(base_price_egp(nights, card), usd_to_egp_rate);

    // Catalog prices are EGP list prices and follow the same conversion;
    // stay services were captured in the booking's currency and sum as-is.
    let mut seen = HashSet::new();
    let catalog_total: Decimal = draft
        .selected_service_ids
        .iter()
        .filter(|id| seen.insert(**id))
        .filter_map(|id| catalog.iter().find(|s| s.id == *id))
        .map(|s| draft.currency.from_egp(s.price, usd_to_egp_rate))
        .sum();

    let adhoc_total: Decimal = draft.services.iter().map(|s| s.price).sum();
    let services_total = catalog_total + adhoc_total;

    let total = round2(base_price + services_total - draft.discount);
    let remaining = round2(total - draft.paid_amount);
    let payment_status = derive_payment_status(total, draft.paid_amount, remaining);

    debug!(
        nights,
        %base_price,
        %services_total,
        %total,
        %remaining,
        "Computed booking finance"
    );

    FinanceResult {
        nights,
        base_price,
        services_total,
        total,
        remaining,
        payment_status,
    }
}

/// Whether the draft has received more money than it is worth.
///
/// Callers must refuse to commit such a draft; the engine only reports the
/// condition. A non-positive total never counts as overpaid (zero-value
/// drafts and credit-carrying negative totals pass).
pub fn is_overpaid(draft: &BookingDraft, finance: &FinanceResult) -> bool {
    draft.paid_amount > finance.total && finance.total > Decimal::ZERO
}

/// Snapshot the draft's catalog selections into stay services.
///
/// Runs exactly once per commit (create or edit save). Selections that
/// already have a materialized stay service are skipped, so re-saving a
/// booking never duplicates entries, and later catalog price edits never
/// reach committed bookings. Unknown ids are ignored.
pub fn materialize_catalog_selections(
    draft: &BookingDraft,
    catalog: &[CatalogService],
    finance: &FinanceResult,
    booking_id: Uuid,
    booked_on: NaiveDate,
    usd_to_egp_rate: Decimal,
) -> Vec<StayService> {
    let mut seen: HashSet<i32> = draft
        .services
        .iter()
        .filter_map(|s| s.source_service_id)
        .collect();

    let is_paid = draft.paid_amount >= finance.total;

    draft
        .selected_service_ids
        .iter()
        .filter(|id| seen.insert(**id))
        .filter_map(|id| catalog.iter().find(|s| s.id == *id))
        .map(|service| StayService {
            id: Uuid::new_v4(),
            booking_id,
            source_service_id: Some(service.id),
            name: service.name.clone(),
            price: round2(draft.currency.from_egp(service.price, usd_to_egp_rate)),
            date: booked_on,
            payment_method: draft.payment_method,
            is_paid,
            is_fulfilled: false,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const RATE: Decimal = dec!(50);

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn daily_card(daily: Decimal) -> RateCard {
        RateCard {
            daily_price: daily,
            monthly_price: Decimal::ZERO,
        }
    }

    fn card(daily: Decimal, monthly: Decimal) -> RateCard {
        RateCard {
            daily_price: daily,
            monthly_price: monthly,
        }
    }

    fn catalog_entry(id: i32, name: &str, price: Decimal) -> CatalogService {
        CatalogService {
            id,
            name: name.to_string(),
            price,
            ..Default::default()
        }
    }

    fn adhoc(price: Decimal) -> StayService {
        StayService {
            id: Uuid::new_v4(),
            booking_id: Uuid::new_v4(),
            source_service_id: None,
            name: "extra".to_string(),
            price,
            date: date(2025, 6, 1),
            payment_method: PaymentMethod::Cash,
            is_paid: false,
            is_fulfilled: false,
        }
    }

    fn three_night_draft() -> BookingDraft {
        BookingDraft {
            start_date: Some(date(2025, 6, 10)),
            end_date: Some(date(2025, 6, 13)),
            ..Default::default()
        }
    }

    #[test]
    fn test_three_nights_partial_payment() {
        // dailyPrice=1000 EGP, 3 nights, paid 1500 -> total 3000, remaining 1500
        let draft = BookingDraft {
            paid_amount: dec!(1500),
            ..three_night_draft()
        };
        let result = compute_finance(&draft, Some(&daily_card(dec!(1000))), &[], RATE);

        assert_eq!(result.nights, 3);
        assert_eq!(result.base_price, dec!(3000));
        assert_eq!(result.total, dec!(3000));
        assert_eq!(result.remaining, dec!(1500));
        assert_eq!(result.payment_status, PaymentStatus::Partial);
    }

    #[test]
    fn test_usd_booking_divides_by_rate() {
        let draft = BookingDraft {
            currency: Currency::Usd,
            ..three_night_draft()
        };
        let result = compute_finance(&draft, Some(&daily_card(dec!(1000))), &[], RATE);

        assert_eq!(result.base_price, dec!(60));
        assert_eq!(result.total, dec!(60));
        assert_eq!(result.payment_status, PaymentStatus::Unpaid);
    }

    #[test]
    fn test_same_day_floors_to_one_night() {
        let draft = BookingDraft {
            start_date: Some(date(2025, 6, 10)),
            end_date: Some(date(2025, 6, 10)),
            ..Default::default()
        };
        let result = compute_finance(&draft, Some(&daily_card(dec!(1000))), &[], RATE);
        assert_eq!(result.nights, 1);
        assert_eq!(result.total, dec!(1000));
    }

    #[test]
    fn test_inverted_range_floors_to_one_night() {
        let draft = BookingDraft {
            start_date: Some(date(2025, 6, 10)),
            end_date: Some(date(2025, 6, 5)),
            ..Default::default()
        };
        let result = compute_finance(&draft, Some(&daily_card(dec!(1000))), &[], RATE);
        assert_eq!(result.nights, 1);
    }

    #[test]
    fn test_monthly_tier_crossover() {
        let card = card(dec!(1000), dec!(24000));

        // 29 nights: still nightly
        let draft = BookingDraft {
            start_date: Some(date(2025, 6, 1)),
            end_date: Some(date(2025, 6, 30)),
            ..Default::default()
        };
        let result = compute_finance(&draft, Some(&card), &[], RATE);
        assert_eq!(result.nights, 29);
        assert_eq!(result.base_price, dec!(29000));

        // 30 nights: exactly one month
        let draft = BookingDraft {
            start_date: Some(date(2025, 6, 1)),
            end_date: Some(date(2025, 7, 1)),
            ..Default::default()
        };
        let result = compute_finance(&draft, Some(&card), &[], RATE);
        assert_eq!(result.nights, 30);
        assert_eq!(result.base_price, dec!(24000));

        // 45 nights: one and a half months
        let draft = BookingDraft {
            start_date: Some(date(2025, 6, 1)),
            end_date: Some(date(2025, 7, 16)),
            ..Default::default()
        };
        let result = compute_finance(&draft, Some(&card), &[], RATE);
        assert_eq!(result.nights, 45);
        assert_eq!(result.base_price, dec!(36000));
    }

    #[test]
    fn test_long_stay_without_monthly_tier_bills_nightly() {
        let draft = BookingDraft {
            start_date: Some(date(2025, 6, 1)),
            end_date: Some(date(2025, 7, 16)),
            ..Default::default()
        };
        let result = compute_finance(&draft, Some(&daily_card(dec!(1000))), &[], RATE);
        assert_eq!(result.nights, 45);
        assert_eq!(result.base_price, dec!(45000));
    }

    #[test]
    fn test_maintenance_zeroes_everything() {
        let draft = BookingDraft {
            status: BookingStatus::Maintenance,
            paid_amount: dec!(9999),
            discount: dec!(100),
            selected_service_ids: vec![1],
            services: vec![adhoc(dec!(250))],
            ..three_night_draft()
        };
        let catalog = vec![catalog_entry(1, "Cleaning", dec!(200))];
        let result = compute_finance(&draft, Some(&daily_card(dec!(1000))), &catalog, RATE);

        assert_eq!(result.nights, 0);
        assert_eq!(result.base_price, Decimal::ZERO);
        assert_eq!(result.services_total, Decimal::ZERO);
        assert_eq!(result.total, Decimal::ZERO);
        assert_eq!(result.remaining, Decimal::ZERO);
        assert_eq!(result.payment_status, PaymentStatus::NotApplicable);
    }

    #[test]
    fn test_missing_rate_card_degrades_to_zero() {
        let result = compute_finance(&three_night_draft(), None, &[], RATE);
        assert_eq!(result.nights, 0);
        assert_eq!(result.total, Decimal::ZERO);
        assert_eq!(result.remaining, Decimal::ZERO);
    }

    #[test]
    fn test_missing_dates_degrade_to_zero() {
        let draft = BookingDraft {
            start_date: Some(date(2025, 6, 10)),
            end_date: None,
            ..Default::default()
        };
        let result = compute_finance(&draft, Some(&daily_card(dec!(1000))), &[], RATE);
        assert_eq!(result.nights, 0);
        assert_eq!(result.total, Decimal::ZERO);
    }

    #[test]
    fn test_catalog_services_summed_and_converted() {
        let catalog = vec![
            catalog_entry(1, "Airport pickup", dec!(350)),
            catalog_entry(2, "Cleaning", dec!(200)),
        ];

        let draft = BookingDraft {
            selected_service_ids: vec![1, 2],
            ..three_night_draft()
        };
        let result = compute_finance(&draft, Some(&daily_card(dec!(1000))), &catalog, RATE);
        assert_eq!(result.services_total, dec!(550));
        assert_eq!(result.total, dec!(3550));

        // Same selections in USD divide by the rate
        let draft = BookingDraft {
            currency: Currency::Usd,
            selected_service_ids: vec![1, 2],
            ..three_night_draft()
        };
        let result = compute_finance(&draft, Some(&daily_card(dec!(1000))), &catalog, RATE);
        assert_eq!(result.services_total, dec!(11));
        assert_eq!(result.total, dec!(71));
    }

    #[test]
    fn test_unknown_catalog_ids_ignored() {
        let catalog = vec![catalog_entry(1, "Cleaning", dec!(200))];
        let draft = BookingDraft {
            selected_service_ids: vec![1, 42, 99],
            ..three_night_draft()
        };
        let result = compute_finance(&draft, Some(&daily_card(dec!(1000))), &catalog, RATE);
        assert_eq!(result.services_total, dec!(200));
    }

    #[test]
    fn test_duplicate_selection_counts_once() {
        let catalog = vec![catalog_entry(1, "Cleaning", dec!(200))];
        let draft = BookingDraft {
            selected_service_ids: vec![1, 1, 1],
            ..three_night_draft()
        };
        let result = compute_finance(&draft, Some(&daily_card(dec!(1000))), &catalog, RATE);
        assert_eq!(result.services_total, dec!(200));
    }

    #[test]
    fn test_adhoc_services_not_converted() {
        // Ad-hoc prices were captured in the booking currency at entry time
        let draft = BookingDraft {
            currency: Currency::Usd,
            services: vec![adhoc(dec!(10)), adhoc(dec!(5.50))],
            ..three_night_draft()
        };
        let result = compute_finance(&draft, Some(&daily_card(dec!(1000))), &[], RATE);
        assert_eq!(result.services_total, dec!(15.50));
        assert_eq!(result.total, dec!(75.50));
    }

    #[test]
    fn test_negative_total_passes_through() {
        let draft = BookingDraft {
            discount: dec!(5000),
            ..three_night_draft()
        };
        let result = compute_finance(&draft, Some(&daily_card(dec!(1000))), &[], RATE);
        assert_eq!(result.total, dec!(-2000));
        assert_eq!(result.remaining, dec!(-2000));
        // Nothing due, so the rule reads it as settled
        assert_eq!(result.payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn test_rounding_only_at_total_and_remaining() {
        // 1 EGP nightly at a rate of 3 gives a repeating decimal per night;
        // rounding per-night would give 0.33 * 2 = 0.66, rounding at the
        // total gives 0.67.
        let draft = BookingDraft {
            currency: Currency::Usd,
            start_date: Some(date(2025, 6, 10)),
            end_date: Some(date(2025, 6, 12)),
            ..Default::default()
        };
        let result = compute_finance(&draft, Some(&daily_card(dec!(1))), &[], dec!(3));
        assert_eq!(result.total, dec!(0.67));
    }

    #[test]
    fn test_paid_exactly_total_is_paid() {
        let draft = BookingDraft {
            paid_amount: dec!(3000),
            ..three_night_draft()
        };
        let result = compute_finance(&draft, Some(&daily_card(dec!(1000))), &[], RATE);
        assert_eq!(result.remaining, Decimal::ZERO);
        assert_eq!(result.payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn test_idempotence() {
        let draft = BookingDraft {
            discount: dec!(123.45),
            paid_amount: dec!(1000),
            services: vec![adhoc(dec!(77.77))],
            ..three_night_draft()
        };
        let card = daily_card(dec!(999.99));
        let first = compute_finance(&draft, Some(&card), &[], RATE);
        let second = compute_finance(&draft, Some(&card), &[], RATE);
        assert_eq!(first, second);
    }

    #[test]
    fn test_overpaid_predicate() {
        let card = daily_card(dec!(1000));

        let draft = BookingDraft {
            paid_amount: dec!(5000),
            ..three_night_draft()
        };
        let finance = compute_finance(&draft, Some(&card), &[], RATE);
        assert!(is_overpaid(&draft, &finance));

        // Paid exactly the total is fine
        let draft = BookingDraft {
            paid_amount: dec!(3000),
            ..three_night_draft()
        };
        let finance = compute_finance(&draft, Some(&card), &[], RATE);
        assert!(!is_overpaid(&draft, &finance));

        // A zero total never counts as overpaid (incomplete draft)
        let draft = BookingDraft {
            paid_amount: dec!(100),
            ..Default::default()
        };
        let finance = compute_finance(&draft, None, &[], RATE);
        assert!(!is_overpaid(&draft, &finance));
    }

    #[test]
    fn test_materialize_snapshots_selection() {
        let catalog = vec![
            catalog_entry(1, "Airport pickup", dec!(350)),
            catalog_entry(2, "Cleaning", dec!(200)),
        ];
        let draft = BookingDraft {
            currency: Currency::Usd,
            selected_service_ids: vec![1, 2, 99],
            payment_method: PaymentMethod::Card,
            ..three_night_draft()
        };
        let finance = compute_finance(&draft, Some(&daily_card(dec!(1000))), &catalog, RATE);
        let booking_id = Uuid::new_v4();
        let booked_on = date(2025, 6, 1);

        let services = materialize_catalog_selections(
            &draft, &catalog, &finance, booking_id, booked_on, RATE,
        );

        // Unknown id 99 is skipped
        assert_eq!(services.len(), 2);

        let pickup = services
            .iter()
            .find(|s| s.source_service_id == Some(1))
            .unwrap();
        assert_eq!(pickup.name, "Airport pickup");
        assert_eq!(pickup.price, dec!(7)); // 350 / 50
        assert_eq!(pickup.booking_id, booking_id);
        assert_eq!(pickup.date, booked_on);
        assert_eq!(pickup.payment_method, PaymentMethod::Card);
        assert!(!pickup.is_paid); // nothing paid yet
        assert!(!pickup.is_fulfilled);
    }

    #[test]
    fn test_materialize_marks_paid_when_fully_paid() {
        let catalog = vec![catalog_entry(1, "Cleaning", dec!(200))];
        let draft = BookingDraft {
            selected_service_ids: vec![1],
            paid_amount: dec!(3200),
            ..three_night_draft()
        };
        let finance = compute_finance(&draft, Some(&daily_card(dec!(1000))), &catalog, RATE);
        assert_eq!(finance.total, dec!(3200));

        let services = materialize_catalog_selections(
            &draft,
            &catalog,
            &finance,
            Uuid::new_v4(),
            date(2025, 6, 1),
            RATE,
        );
        assert!(services[0].is_paid);
    }

    #[test]
    fn test_materialize_skips_already_materialized() {
        let catalog = vec![catalog_entry(1, "Cleaning", dec!(200))];
        let existing = StayService {
            source_service_id: Some(1),
            ..adhoc(dec!(200))
        };
        let draft = BookingDraft {
            selected_service_ids: vec![1],
            services: vec![existing],
            ..three_night_draft()
        };
        let finance = compute_finance(&draft, Some(&daily_card(dec!(1000))), &catalog, RATE);

        let services = materialize_catalog_selections(
            &draft,
            &catalog,
            &finance,
            Uuid::new_v4(),
            date(2025, 6, 1),
            RATE,
        );
        assert!(services.is_empty());
    }

    #[test]
    fn test_service_order_does_not_matter() {
        let catalog = vec![
            catalog_entry(1, "A", dec!(123.45)),
            catalog_entry(2, "B", dec!(67.89)),
            catalog_entry(3, "C", dec!(0.01)),
        ];
        let card = daily_card(dec!(500));

        let forward = BookingDraft {
            selected_service_ids: vec![1, 2, 3],
            services: vec![adhoc(dec!(9.99)), adhoc(dec!(0.02))],
            ..three_night_draft()
        };
        let backward = BookingDraft {
            selected_service_ids: vec![3, 2, 1],
            services: vec![adhoc(dec!(0.02)), adhoc(dec!(9.99))],
            ..three_night_draft()
        };

        let a = compute_finance(&forward, Some(&card), &catalog, RATE);
        let b = compute_finance(&backward, Some(&card), &catalog, RATE);
        assert_eq!(a.total, b.total);
        assert_eq!(a.services_total, b.services_total);
    }
}

#[cfg(test)]
mod properties {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn money(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    fn draft_with(
        nights: i64,
        discount_cents: i64,
        paid_cents: i64,
        adhoc_cents: Vec<i64>,
    ) -> BookingDraft {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        BookingDraft {
            start_date: Some(start),
            end_date: Some(start + chrono::Duration::days(nights)),
            discount: money(discount_cents),
            paid_amount: money(paid_cents),
            services: adhoc_cents
                .into_iter()
                .map(|c| StayService {
                    id: Uuid::new_v4(),
                    booking_id: Uuid::new_v4(),
                    source_service_id: None,
                    name: "x".to_string(),
                    price: money(c),
                    date: start,
                    payment_method: PaymentMethod::Cash,
                    is_paid: false,
                    is_fulfilled: false,
                })
                .collect(),
            ..Default::default()
        }
    }

    proptest! {
        #[test]
        fn nights_always_at_least_one(
            daily in 0i64..10_000_00,
            nights in 1i64..90,
        ) {
            let draft = draft_with(nights, 0, 0, vec![]);
            let card = RateCard { daily_price: money(daily), monthly_price: Decimal::ZERO };
            let result = compute_finance(&draft, Some(&card), &[], dec!(50));
            prop_assert!(result.nights >= 1);
        }

        #[test]
        fn total_and_remaining_equations_hold(
            daily in 0i64..10_000_00,
            nights in 1i64..90,
            discount in 0i64..5_000_00,
            paid in 0i64..5_000_00,
            adhoc in proptest::collection::vec(0i64..1_000_00, 0..5),
        ) {
            let draft = draft_with(nights, discount, paid, adhoc);
            let card = RateCard { daily_price: money(daily), monthly_price: Decimal::ZERO };
            let result = compute_finance(&draft, Some(&card), &[], dec!(50));

            prop_assert_eq!(
                result.total,
                round2(result.base_price + result.services_total - draft.discount)
            );
            prop_assert_eq!(result.remaining, round2(result.total - draft.paid_amount));
        }

        #[test]
        fn payment_status_matches_remaining(
            daily in 1i64..10_000_00,
            nights in 1i64..90,
            paid in 0i64..10_000_00,
        ) {
            let draft = draft_with(nights, 0, paid, vec![]);
            let card = RateCard { daily_price: money(daily), monthly_price: Decimal::ZERO };
            let result = compute_finance(&draft, Some(&card), &[], dec!(50));

            if result.remaining <= Decimal::ZERO {
                prop_assert_eq!(result.payment_status, PaymentStatus::Paid);
            } else if draft.paid_amount > Decimal::ZERO {
                prop_assert_eq!(result.payment_status, PaymentStatus::Partial);
            } else {
                prop_assert_eq!(result.payment_status, PaymentStatus::Unpaid);
            }
        }

        #[test]
        fn egp_catalog_prices_unchanged_usd_divided(
            price in 0i64..100_000_00,
        ) {
            let catalog = vec![CatalogService {
                id: 1,
                name: "s".to_string(),
                price: money(price),
                ..Default::default()
            }];
            let mut draft = draft_with(1, 0, 0, vec![]);
            draft.selected_service_ids = vec![1];

            let card = RateCard { daily_price: Decimal::ZERO, monthly_price: Decimal::ZERO };

            let egp = compute_finance(&draft, Some(&card), &catalog, dec!(50));
            prop_assert_eq!(egp.services_total, money(price));

            draft.currency = Currency::Usd;
            let usd = compute_finance(&draft, Some(&card), &catalog, dec!(50));
            prop_assert_eq!(usd.services_total, money(price) / dec!(50));
        }
    }
}
