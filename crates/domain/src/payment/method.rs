//! The payment strategy contract and its closed set of methods.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::money::Money;

use super::{CashDetails, CheckDetails, CreditCardDetails, PaymentStatus};

/// Why a payment method rejected a payment.
///
/// These are business outcomes recorded on the payment, not errors: the
/// caller may retry with another method.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum DeclineReason {
    #[error("Tendered amount must be positive (got {tendered})")]
    NonPositiveTender { tendered: Money },

    #[error("Insufficient cash: tendered {tendered}, due {due}")]
    InsufficientCash { tendered: Money, due: Money },

    #[error("Card number must be 13 to 19 digits")]
    InvalidCardNumber,

    #[error("Card holder name is required")]
    MissingCardHolder,

    #[error("Card expired on {expiry}")]
    CardExpired { expiry: NaiveDate },

    #[error("CVV must be 3 or 4 digits")]
    InvalidCvv,

    #[error("Cheque number is required")]
    MissingCheckNumber,

    #[error("Bank name is required")]
    MissingBankName,

    #[error("Cheque is post-dated to {check_date}")]
    PostDatedCheck { check_date: NaiveDate },
}

/// Behaviour every payment method provides.
///
/// `validate` and `settle` are required; the remaining hooks have defaults a
/// method may override.
pub trait PaymentRules {
    /// Short method name used in logs, metrics and details.
    fn method_name(&self) -> &'static str;

    /// Checks the method-specific rules for paying `amount` on `today`.
    fn validate(&self, amount: Money, today: NaiveDate) -> Result<(), DeclineReason>;

    /// Applies the effects of an accepted payment and returns the resulting status.
    fn settle(&mut self, amount: Money) -> PaymentStatus;

    /// Called after validation declined the payment.
    fn on_declined(&mut self) {}

    /// Returns true if a completed payment of this method may be refunded.
    fn can_refund(&self) -> bool {
        true
    }

    /// Human-readable description, safe to display or log.
    fn describe(&self) -> String {
        self.method_name().to_string()
    }
}

/// The supported payment methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash(CashDetails),
    Credit(CreditCardDetails),
    Check(CheckDetails),
}

impl PaymentMethod {
    fn rules(&self) -> &dyn PaymentRules {
        match self {
            PaymentMethod::Cash(details) => details,
            PaymentMethod::Credit(details) => details,
            PaymentMethod::Check(details) => details,
        }
    }

    fn rules_mut(&mut self) -> &mut dyn PaymentRules {
        match self {
            PaymentMethod::Cash(details) => details,
            PaymentMethod::Credit(details) => details,
            PaymentMethod::Check(details) => details,
        }
    }
}

impl PaymentRules for PaymentMethod {
    fn method_name(&self) -> &'static str {
        self.rules().method_name()
    }

    fn validate(&self, amount: Money, today: NaiveDate) -> Result<(), DeclineReason> {
        self.rules().validate(amount, today)
    }

    fn settle(&mut self, amount: Money) -> PaymentStatus {
        self.rules_mut().settle(amount)
    }

    fn on_declined(&mut self) {
        self.rules_mut().on_declined();
    }

    fn can_refund(&self) -> bool {
        self.rules().can_refund()
    }

    fn describe(&self) -> String {
        self.rules().describe()
    }
}

impl From<CashDetails> for PaymentMethod {
    fn from(details: CashDetails) -> Self {
        PaymentMethod::Cash(details)
    }
}

impl From<CreditCardDetails> for PaymentMethod {
    fn from(details: CreditCardDetails) -> Self {
        PaymentMethod::Credit(details)
    }
}

impl From<CheckDetails> for PaymentMethod {
    fn from(details: CheckDetails) -> Self {
        PaymentMethod::Check(details)
    }
}
