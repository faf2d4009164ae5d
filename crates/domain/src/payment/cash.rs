//! Cash payments.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::money::Money;

use super::{DeclineReason, PaymentRules, PaymentStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashDetails {
    amount_tendered: Money,
    change_due: Option<Money>,
}

impl CashDetails {
    pub fn new(amount_tendered: Money) -> Self {
        Self {
            amount_tendered,
            change_due: None,
        }
    }

    pub fn amount_tendered(&self) -> Money {
        self.amount_tendered
    }

    /// Change owed to the customer, known once the payment completed.
    pub fn change_due(&self) -> Option<Money> {
        self.change_due
    }
}

impl PaymentRules for CashDetails {
    fn method_name(&self) -> &'static str {
        "Cash"
    }

    fn validate(&self, amount: Money, _today: NaiveDate) -> Result<(), DeclineReason> {
        if !self.amount_tendered.is_positive() {
            return Err(DeclineReason::NonPositiveTender {
                tendered: self.amount_tendered,
            });
        }
        if self.amount_tendered < amount {
            return Err(DeclineReason::InsufficientCash {
                tendered: self.amount_tendered,
                due: amount,
            });
        }
        Ok(())
    }

    fn settle(&mut self, amount: Money) -> PaymentStatus {
        self.change_due = Some(self.amount_tendered - amount);
        PaymentStatus::Completed
    }

    fn describe(&self) -> String {
        match self.change_due {
            Some(change) => format!("Cash: tendered {}, change {}", self.amount_tendered, change),
            None => format!("Cash: tendered {}", self.amount_tendered),
        }
    }
}
