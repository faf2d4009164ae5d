//! Checkout configuration.

use chrono::TimeDelta;
use domain::{Money, Pricing, TaxRate};

/// Settings passed explicitly to the coordinator and service.
///
/// Reads from environment variables:
/// - `CHECKOUT_TAX_RATE_BPS`: tax rate in basis points (default: `2000`, i.e. 20%)
/// - `CHECKOUT_DELIVERY_FEE_CENTS`: delivery fee in cents (default: `299`)
/// - `CHECKOUT_PREP_MINUTES`: preparation time estimate (default: `45`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutConfig {
    pub tax_rate: TaxRate,
    pub delivery_fee: Money,
    pub preparation_minutes: i64,
}

impl CheckoutConfig {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    ///
    /// Missing or unparsable values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            tax_rate: lookup("CHECKOUT_TAX_RATE_BPS")
                .and_then(|v| v.parse().ok())
                .map(TaxRate::from_basis_points)
                .unwrap_or(defaults.tax_rate),
            delivery_fee: lookup("CHECKOUT_DELIVERY_FEE_CENTS")
                .and_then(|v| v.parse::<i64>().ok())
                .filter(|cents| *cents >= 0)
                .map(Money::from_cents)
                .unwrap_or(defaults.delivery_fee),
            preparation_minutes: lookup("CHECKOUT_PREP_MINUTES")
                .and_then(|v| v.parse::<i64>().ok())
                .filter(|minutes| *minutes >= 0)
                .unwrap_or(defaults.preparation_minutes),
        }
    }

    /// Returns the pricing policy applied to new orders.
    pub fn pricing(&self) -> Pricing {
        Pricing {
            tax_rate: self.tax_rate,
            delivery_fee: self.delivery_fee,
            preparation_time: TimeDelta::minutes(self.preparation_minutes),
        }
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            tax_rate: TaxRate::percent(20),
            delivery_fee: Money::from_cents(299),
            preparation_minutes: 45,
        }
    }
}
