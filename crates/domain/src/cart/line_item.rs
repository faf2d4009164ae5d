//! Cart line items.

use common::ItemId;
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogItem;
use crate::money::Money;

/// One catalog item with a quantity and its selected customizations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    item: CatalogItem,
    quantity: u32,
    customizations: Vec<String>,
}

impl LineItem {
    /// Creates a line. Callers guarantee `quantity >= 1` and that every
    /// customization name resolves against `item`.
    pub(crate) fn new(item: CatalogItem, quantity: u32, customizations: Vec<String>) -> Self {
        Self {
            item,
            quantity,
            customizations,
        }
    }

    pub fn item(&self) -> &CatalogItem {
        &self.item
    }

    pub fn item_id(&self) -> &ItemId {
        self.item.id()
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub(crate) fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
    }

    /// Names of the selected customizations.
    pub fn customizations(&self) -> &[String] {
        &self.customizations
    }

    /// Combined cost of the selected customizations for a single unit.
    pub fn customization_cost(&self) -> Money {
        self.customizations
            .iter()
            .filter_map(|name| self.item.customization(name))
            .map(|c| c.additional_cost)
            .sum()
    }

    /// Price of a single unit including customizations.
    pub fn unit_total(&self) -> Money {
        self.item.unit_price() + self.customization_cost()
    }

    /// Returns `(unit_price + customization_cost) * quantity`.
    pub fn line_total(&self) -> Money {
        self.unit_total().multiply(self.quantity)
    }
}
