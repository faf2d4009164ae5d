//! Catalog records supplied by the menu provider.
//!
//! The checkout core only reads these; catalog maintenance lives elsewhere.

use common::ItemId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::money::Money;

/// Errors raised when building catalog records.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// Prices and customization costs must be non-negative.
    #[error("Negative price for {what}: {amount}")]
    NegativePrice { what: String, amount: Money },
}

/// An optional extra that can be selected for a catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customization {
    pub name: String,
    pub additional_cost: Money,
}

impl Customization {
    pub fn new(name: impl Into<String>, additional_cost: Money) -> Result<Self, CatalogError> {
        let name = name.into();
        if additional_cost.is_negative() {
            return Err(CatalogError::NegativePrice {
                what: name,
                amount: additional_cost,
            });
        }
        Ok(Self {
            name,
            additional_cost,
        })
    }
}

/// A purchasable menu item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    id: ItemId,
    name: String,
    unit_price: Money,
    available: bool,
    category: String,
    #[serde(default)]
    customizations: Vec<Customization>,
}

impl CatalogItem {
    /// Creates an available item with no customization options.
    pub fn new(
        id: impl Into<ItemId>,
        name: impl Into<String>,
        unit_price: Money,
        category: impl Into<String>,
    ) -> Result<Self, CatalogError> {
        let name = name.into();
        if unit_price.is_negative() {
            return Err(CatalogError::NegativePrice {
                what: name,
                amount: unit_price,
            });
        }
        Ok(Self {
            id: id.into(),
            name,
            unit_price,
            available: true,
            category: category.into(),
            customizations: Vec::new(),
        })
    }

    /// Adds a customization option.
    pub fn with_customization(mut self, customization: Customization) -> Self {
        self.customizations.push(customization);
        self
    }

    /// Sets the availability flag.
    pub fn with_availability(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    pub fn id(&self) -> &ItemId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn customizations(&self) -> &[Customization] {
        &self.customizations
    }

    /// Looks up a customization option by name.
    pub fn customization(&self, name: &str) -> Option<&Customization> {
        self.customizations.iter().find(|c| c.name == name)
    }

    /// Re-checks the non-negative price invariant.
    ///
    /// Needed for records that bypassed the constructors, e.g. deserialized ones.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.unit_price.is_negative() {
            return Err(CatalogError::NegativePrice {
                what: self.name.clone(),
                amount: self.unit_price,
            });
        }
        if let Some(c) = self
            .customizations
            .iter()
            .find(|c| c.additional_cost.is_negative())
        {
            return Err(CatalogError::NegativePrice {
                what: c.name.clone(),
                amount: c.additional_cost,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_price_rejected() {
        let result = CatalogItem::new("X", "Bad", Money::from_cents(-1), "Mains");
        assert!(matches!(result, Err(CatalogError::NegativePrice { .. })));
    }

    #[test]
    fn test_negative_customization_rejected() {
        let result = Customization::new("Extra cheese", Money::from_cents(-50));
        assert!(matches!(result, Err(CatalogError::NegativePrice { .. })));
    }

    #[test]
    fn test_customization_lookup() {
        let item = CatalogItem::new("PIZZA", "Margherita", Money::from_cents(1299), "Pizza")
            .unwrap()
            .with_customization(Customization::new("Extra cheese", Money::from_cents(150)).unwrap());

        assert_eq!(
            item.customization("Extra cheese").map(|c| c.additional_cost),
            Some(Money::from_cents(150))
        );
        assert!(item.customization("Anchovies").is_none());
        assert!(item.is_available());
    }

    #[test]
    fn test_validate_deserialized_item() {
        let json = r#"{"id":"S1","name":"Soup","unit_price":{"cents":-10},"available":true,"category":"Starters"}"#;
        let item: CatalogItem = serde_json::from_str(json).unwrap();
        assert!(item.validate().is_err());
    }
}
