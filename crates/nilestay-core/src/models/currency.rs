//! Currency model
//!
//! Bookings are priced in either EGP or USD. Rate cards and the service
//! catalog always carry EGP list prices; USD figures are derived through a
//! single fixed conversion rate passed in by the caller.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Booking currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Egyptian Pound (the base currency of all list prices)
    #[default]
    Egp,
    /// US Dollar
    Usd,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Currency {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "EGP" => Some(Currency::Egp),
            "USD" => Some(Currency::Usd),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Egp => "EGP",
            Currency::Usd => "USD",
        }
    }

    /// Convert an EGP list price into this currency.
    ///
    /// `usd_to_egp_rate` must be positive; `FinanceConfig::usd_rate`
    /// guarantees this for configuration-sourced values.
    pub fn from_egp(&self, amount: Decimal, usd_to_egp_rate: Decimal) -> Decimal {
        match self {
            Currency::Egp => amount,
            Currency::Usd => amount / usd_to_egp_rate,
        }
    }

    /// Convert an amount in this currency back into EGP.
    ///
    /// Used by reporting to aggregate mixed-currency figures on one basis.
    pub fn to_egp(&self, amount: Decimal, usd_to_egp_rate: Decimal) -> Decimal {
        match self {
            Currency::Egp => amount,
            Currency::Usd => amount * usd_to_egp_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse() {
        assert_eq!(Currency::from_str("EGP"), Some(Currency::Egp));
        assert_eq!(Currency::from_str("usd"), Some(Currency::Usd));
        assert_eq!(Currency::from_str("EUR"), None);
    }

    #[test]
    fn test_from_egp() {
        let rate = dec!(50);
        assert_eq!(Currency::Egp.from_egp(dec!(3000), rate), dec!(3000));
        assert_eq!(Currency::Usd.from_egp(dec!(3000), rate), dec!(60));
    }

    #[test]
    fn test_to_egp() {
        let rate = dec!(50);
        assert_eq!(Currency::Egp.to_egp(dec!(100), rate), dec!(100));
        assert_eq!(Currency::Usd.to_egp(dec!(60), rate), dec!(3000));
    }

    #[test]
    fn test_roundtrip() {
        let rate = dec!(48.75);
        let amount = dec!(1234.56);
        let usd = Currency::Usd.from_egp(amount, rate);
        assert_eq!(Currency::Usd.to_egp(usd, rate).round_dp(2), amount);
    }
}
