//! Credit card payments.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::money::Money;

use super::{DeclineReason, PaymentRules, PaymentStatus};

/// Card details for a credit payment.
///
/// The full card number and CVV are held only for validation: they are never
/// serialized and never appear in `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCardDetails {
    #[serde(skip_serializing, default)]
    card_number: String,
    masked_number: String,
    card_holder: String,
    expiry_date: NaiveDate,
    #[serde(skip_serializing, default)]
    cvv: String,
    authorized: bool,
}

impl CreditCardDetails {
    pub fn new(
        card_number: impl Into<String>,
        card_holder: impl Into<String>,
        expiry_date: NaiveDate,
        cvv: impl Into<String>,
    ) -> Self {
        let card_number = card_number.into();
        let masked_number = mask_card_number(&card_number);
        Self {
            card_number,
            masked_number,
            card_holder: card_holder.into(),
            expiry_date,
            cvv: cvv.into(),
            authorized: false,
        }
    }

    /// Card number with all but the last four digits replaced by `*`.
    pub fn masked_number(&self) -> &str {
        &self.masked_number
    }

    pub fn card_holder(&self) -> &str {
        &self.card_holder
    }

    pub fn expiry_date(&self) -> NaiveDate {
        self.expiry_date
    }

    pub fn is_authorized(&self) -> bool {
        self.authorized
    }
}

impl std::fmt::Debug for CreditCardDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreditCardDetails")
            .field("masked_number", &self.masked_number)
            .field("card_holder", &self.card_holder)
            .field("expiry_date", &self.expiry_date)
            .field("authorized", &self.authorized)
            .finish_non_exhaustive()
    }
}

impl PaymentRules for CreditCardDetails {
    fn method_name(&self) -> &'static str {
        "Credit"
    }

    fn validate(&self, _amount: Money, today: NaiveDate) -> Result<(), DeclineReason> {
        let digits = card_digits(&self.card_number).ok_or(DeclineReason::InvalidCardNumber)?;
        if !(13..=19).contains(&digits.len()) {
            return Err(DeclineReason::InvalidCardNumber);
        }
        if self.card_holder.trim().is_empty() {
            return Err(DeclineReason::MissingCardHolder);
        }
        if self.expiry_date < today {
            return Err(DeclineReason::CardExpired {
                expiry: self.expiry_date,
            });
        }
        let cvv_ok =
            (3..=4).contains(&self.cvv.len()) && self.cvv.chars().all(|c| c.is_ascii_digit());
        if !cvv_ok {
            return Err(DeclineReason::InvalidCvv);
        }
        Ok(())
    }

    fn settle(&mut self, _amount: Money) -> PaymentStatus {
        self.authorized = true;
        PaymentStatus::Completed
    }

    fn on_declined(&mut self) {
        self.authorized = false;
    }

    fn describe(&self) -> String {
        format!(
            "Credit card {} ({}), expires {}",
            self.masked_number,
            self.card_holder,
            self.expiry_date.format("%m/%Y")
        )
    }
}

/// Digits of a card number with spaces and dashes removed; `None` if any
/// other character is present.
fn card_digits(number: &str) -> Option<String> {
    let mut digits = String::with_capacity(number.len());
    for c in number.chars() {
        match c {
            '0'..='9' => digits.push(c),
            ' ' | '-' => {}
            _ => return None,
        }
    }
    Some(digits)
}

fn mask_card_number(number: &str) -> String {
    let digits: Vec<char> = number.chars().filter(char::is_ascii_digit).collect();
    let visible = digits.len().saturating_sub(4);
    digits
        .iter()
        .enumerate()
        .map(|(i, c)| if i < visible { '*' } else { *c })
        .collect()
}
