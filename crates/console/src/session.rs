//! Session file format.
//!
//! A session describes one customer's visit: the menu on offer, what they
//! picked, how they want it, and the payment methods they will try in order.

use chrono::NaiveDate;
use domain::{
    CashDetails, CatalogItem, CheckDetails, CreditCardDetails, CustomerId, Customization,
    Fulfillment, Money, PaymentMethod,
};
use serde::Deserialize;

use crate::error::Result;

#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    /// Generated when absent.
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    pub catalog: Vec<CatalogEntry>,
    pub selections: Vec<Selection>,
    pub fulfillment: Fulfillment,
    pub payments: Vec<PaymentAttempt>,
}

impl Session {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builds the catalog records, rejecting negative prices.
    pub fn catalog_items(&self) -> Result<Vec<CatalogItem>> {
        self.catalog
            .iter()
            .map(CatalogEntry::to_item)
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    pub category: String,
    #[serde(default = "available_by_default")]
    pub available: bool,
    #[serde(default)]
    pub customizations: Vec<CustomizationEntry>,
}

fn available_by_default() -> bool {
    true
}

impl CatalogEntry {
    fn to_item(&self) -> Result<CatalogItem> {
        let mut item = CatalogItem::new(
            self.id.as_str(),
            self.name.as_str(),
            Money::from_cents(self.price_cents),
            self.category.as_str(),
        )?
        .with_availability(self.available);

        for entry in &self.customizations {
            let customization =
                Customization::new(entry.name.as_str(), Money::from_cents(entry.cost_cents))?;
            item = item.with_customization(customization);
        }
        Ok(item)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomizationEntry {
    pub name: String,
    pub cost_cents: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Selection {
    pub item_id: String,
    pub quantity: i64,
    #[serde(default)]
    pub customizations: Vec<String>,
}

/// A payment method as written in a session file.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum PaymentAttempt {
    Cash {
        tendered_cents: i64,
    },
    Credit {
        card_number: String,
        card_holder: String,
        expiry_date: NaiveDate,
        cvv: String,
    },
    Check {
        check_number: String,
        bank_name: String,
        check_date: NaiveDate,
    },
}

impl From<PaymentAttempt> for PaymentMethod {
    fn from(attempt: PaymentAttempt) -> Self {
        match attempt {
            PaymentAttempt::Cash { tendered_cents } => {
                CashDetails::new(Money::from_cents(tendered_cents)).into()
            }
            PaymentAttempt::Credit {
                card_number,
                card_holder,
                expiry_date,
                cvv,
            } => CreditCardDetails::new(card_number, card_holder, expiry_date, cvv).into(),
            PaymentAttempt::Check {
                check_number,
                bank_name,
                check_date,
            } => CheckDetails::new(check_number, bank_name, check_date).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConsoleError;

    const SESSION: &str = r#"{
        "catalog": [
            {
                "id": "BURGER",
                "name": "Classic Burger",
                "price_cents": 1299,
                "category": "Mains",
                "customizations": [{ "name": "Extra cheese", "cost_cents": 150 }]
            },
            { "id": "SOUP", "name": "Soup", "price_cents": 650, "category": "Starters", "available": false }
        ],
        "selections": [{ "item_id": "BURGER", "quantity": 2, "customizations": ["Extra cheese"] }],
        "fulfillment": { "type": "delivery", "address": "12 High St" },
        "payments": [
            { "method": "cash", "tendered_cents": 4000 },
            { "method": "check", "check_number": "1001", "bank_name": "First Bank", "check_date": "2024-03-01" }
        ]
    }"#;

    #[test]
    fn test_parse_session() {
        let session = Session::from_json(SESSION).unwrap();
        assert!(session.customer_id.is_none());
        assert_eq!(session.selections[0].quantity, 2);
        assert_eq!(session.fulfillment, Fulfillment::delivery("12 High St"));
        assert_eq!(session.payments.len(), 2);
    }

    #[test]
    fn test_catalog_items() {
        let session = Session::from_json(SESSION).unwrap();
        let items = session.catalog_items().unwrap();

        assert_eq!(items[0].unit_price(), Money::from_cents(1299));
        assert!(items[0].customization("Extra cheese").is_some());
        assert!(items[0].is_available());
        assert!(!items[1].is_available());
    }

    #[test]
    fn test_negative_price_rejected() {
        let mut session = Session::from_json(SESSION).unwrap();
        session.catalog[0].price_cents = -1;
        assert!(matches!(
            session.catalog_items(),
            Err(ConsoleError::Catalog(_))
        ));
    }

    #[test]
    fn test_attempt_into_method() {
        let attempt = PaymentAttempt::Cash {
            tendered_cents: 4000,
        };
        let method: PaymentMethod = attempt.into();
        assert!(matches!(method, PaymentMethod::Cash(_)));
    }

    #[test]
    fn test_unknown_method_is_parse_error() {
        let result = serde_json::from_str::<PaymentAttempt>(r#"{ "method": "barter" }"#);
        assert!(result.is_err());
    }
}
