//! Payments and the payment strategy family.

mod cash;
mod check;
mod credit;
mod method;
mod status;

pub use cash::CashDetails;
pub use check::CheckDetails;
pub use credit::CreditCardDetails;
pub use method::{DeclineReason, PaymentMethod, PaymentRules};
pub use status::PaymentStatus;

use chrono::{DateTime, NaiveDate, Utc};
use common::{CustomerId, OrderId, PaymentId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::money::Money;

/// Errors that can occur during payment operations.
///
/// Declined payments are not errors; see [`DeclineReason`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaymentError {
    /// Payment amounts must be non-negative.
    #[error("Invalid payment amount: {amount} (must not be negative)")]
    InvalidAmount { amount: Money },

    /// The payment was already processed.
    #[error("Payment {payment_id} was already processed (status {status})")]
    AlreadyProcessed {
        payment_id: PaymentId,
        status: PaymentStatus,
    },

    /// Payment is not in a state that allows the requested action.
    #[error("Invalid payment transition: cannot {action} from {current_status} status")]
    InvalidTransition {
        current_status: PaymentStatus,
        action: &'static str,
    },

    /// The action does not apply to this payment method.
    #[error("Cannot {action} a {method} payment")]
    UnsupportedOperation {
        method: &'static str,
        action: &'static str,
    },
}

/// A single attempt to pay for an order.
///
/// Refers to its order by identifier only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    id: PaymentId,
    order_id: OrderId,
    customer_id: CustomerId,
    amount: Money,
    method: PaymentMethod,
    status: PaymentStatus,
    created_at: DateTime<Utc>,
    processed_at: Option<DateTime<Utc>>,
    decline_reason: Option<DeclineReason>,
}

impl Payment {
    /// Creates a pending payment.
    pub fn new(
        id: PaymentId,
        order_id: OrderId,
        customer_id: CustomerId,
        amount: Money,
        method: impl Into<PaymentMethod>,
    ) -> Result<Self, PaymentError> {
        if amount.is_negative() {
            return Err(PaymentError::InvalidAmount { amount });
        }

        Ok(Self {
            id,
            order_id,
            customer_id,
            amount,
            method: method.into(),
            status: PaymentStatus::Pending,
            created_at: Utc::now(),
            processed_at: None,
            decline_reason: None,
        })
    }

    pub fn id(&self) -> PaymentId {
        self.id
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn method(&self) -> &PaymentMethod {
        &self.method
    }

    /// Short name of the payment method, e.g. `"Cash"`.
    pub fn method_name(&self) -> &'static str {
        self.method.method_name()
    }

    pub fn status(&self) -> PaymentStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn processed_at(&self) -> Option<DateTime<Utc>> {
        self.processed_at
    }

    /// Why the payment was declined, if it was.
    pub fn decline_reason(&self) -> Option<&DeclineReason> {
        self.decline_reason.as_ref()
    }

    /// Change owed for a completed cash payment.
    pub fn change_due(&self) -> Option<Money> {
        match &self.method {
            PaymentMethod::Cash(cash) => cash.change_due(),
            _ => None,
        }
    }

    /// Changes the amount before the payment is processed.
    pub fn set_amount(&mut self, amount: Money) -> Result<(), PaymentError> {
        if amount.is_negative() {
            return Err(PaymentError::InvalidAmount { amount });
        }
        self.ensure_unprocessed()?;
        self.amount = amount;
        Ok(())
    }

    /// Checks the method's rules against today's date.
    pub fn validate(&self) -> Result<(), DeclineReason> {
        self.validate_on(Utc::now().date_naive())
    }

    /// Checks the method's rules as of `today`.
    pub fn validate_on(&self, today: NaiveDate) -> Result<(), DeclineReason> {
        self.method.validate(self.amount, today)
    }

    /// Returns true if the payment would currently pass validation.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Processes the payment against today's date.
    ///
    /// Returns `Ok(false)` when the method declined it; the status is then
    /// `Failed` and the reason is recorded.
    pub fn process(&mut self) -> Result<bool, PaymentError> {
        self.process_on(Utc::now().date_naive())
    }

    /// Processes the payment as of `today`.
    pub fn process_on(&mut self, today: NaiveDate) -> Result<bool, PaymentError> {
        self.ensure_unprocessed()?;
        self.processed_at = Some(Utc::now());

        let method = self.method.method_name();
        match self.method.validate(self.amount, today) {
            Ok(()) => {
                self.status = self.method.settle(self.amount);
                metrics::counter!("payments_processed_total", "method" => method, "outcome" => "accepted")
                    .increment(1);
                tracing::info!(
                    payment_id = %self.id,
                    order_id = %self.order_id,
                    method,
                    status = %self.status,
                    "payment accepted"
                );
                Ok(true)
            }
            Err(reason) => {
                self.method.on_declined();
                self.status = PaymentStatus::Failed;
                metrics::counter!("payments_processed_total", "method" => method, "outcome" => "declined")
                    .increment(1);
                tracing::warn!(
                    payment_id = %self.id,
                    order_id = %self.order_id,
                    method,
                    %reason,
                    "payment declined"
                );
                self.decline_reason = Some(reason);
                Ok(false)
            }
        }
    }

    /// Records that an accepted cheque has cleared, completing the payment.
    pub fn mark_cleared(&mut self) -> Result<(), PaymentError> {
        let status = self.status;
        let processed = self.processed_at.is_some();

        match &mut self.method {
            PaymentMethod::Check(check) => {
                if !processed || status != PaymentStatus::Pending {
                    return Err(PaymentError::InvalidTransition {
                        current_status: status,
                        action: "clear",
                    });
                }
                check.clear();
            }
            other => {
                return Err(PaymentError::UnsupportedOperation {
                    method: other.method_name(),
                    action: "clear",
                });
            }
        }

        self.status = PaymentStatus::Completed;
        tracing::info!(payment_id = %self.id, "cheque cleared");
        Ok(())
    }

    /// Reverses a completed payment.
    pub fn refund(&mut self) -> Result<(), PaymentError> {
        if self.status != PaymentStatus::Completed || !self.method.can_refund() {
            return Err(PaymentError::InvalidTransition {
                current_status: self.status,
                action: "refund",
            });
        }

        self.status = PaymentStatus::Refunded;
        tracing::info!(payment_id = %self.id, amount = %self.amount, "payment refunded");
        Ok(())
    }

    /// Human-readable summary, safe to display.
    pub fn details(&self) -> String {
        format!(
            "{} for {} of {}: {} [{}]",
            self.id,
            self.order_id,
            self.amount,
            self.method.describe(),
            self.status
        )
    }

    fn ensure_unprocessed(&self) -> Result<(), PaymentError> {
        if self.processed_at.is_some() {
            return Err(PaymentError::AlreadyProcessed {
                payment_id: self.id,
                status: self.status,
            });
        }
        Ok(())
    }
}
