//! Cheque payments.
//!
//! An accepted cheque stays `Pending` until the bank clears it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::money::Money;

use super::{DeclineReason, PaymentRules, PaymentStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckDetails {
    check_number: String,
    bank_name: String,
    check_date: NaiveDate,
    is_cleared: bool,
}

impl CheckDetails {
    pub fn new(
        check_number: impl Into<String>,
        bank_name: impl Into<String>,
        check_date: NaiveDate,
    ) -> Self {
        Self {
            check_number: check_number.into(),
            bank_name: bank_name.into(),
            check_date,
            is_cleared: false,
        }
    }

    pub fn check_number(&self) -> &str {
        &self.check_number
    }

    pub fn bank_name(&self) -> &str {
        &self.bank_name
    }

    pub fn check_date(&self) -> NaiveDate {
        self.check_date
    }

    pub fn is_cleared(&self) -> bool {
        self.is_cleared
    }

    pub(crate) fn clear(&mut self) {
        self.is_cleared = true;
    }
}

impl PaymentRules for CheckDetails {
    fn method_name(&self) -> &'static str {
        "Check"
    }

    fn validate(&self, _amount: Money, today: NaiveDate) -> Result<(), DeclineReason> {
        if self.check_number.trim().is_empty() {
            return Err(DeclineReason::MissingCheckNumber);
        }
        if self.bank_name.trim().is_empty() {
            return Err(DeclineReason::MissingBankName);
        }
        if self.check_date > today {
            return Err(DeclineReason::PostDatedCheck {
                check_date: self.check_date,
            });
        }
        Ok(())
    }

    fn settle(&mut self, _amount: Money) -> PaymentStatus {
        PaymentStatus::Pending
    }

    fn can_refund(&self) -> bool {
        self.is_cleared
    }

    fn describe(&self) -> String {
        let state = if self.is_cleared { "cleared" } else { "awaiting clearance" };
        format!(
            "Cheque #{} drawn on {} dated {} ({state})",
            self.check_number, self.bank_name, self.check_date
        )
    }
}
