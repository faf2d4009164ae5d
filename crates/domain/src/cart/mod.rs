//! Shopping cart accumulation.

mod line_item;

pub use line_item::LineItem;

use chrono::{DateTime, Utc};
use common::{CustomerId, ItemId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::CatalogItem;
use crate::money::Money;

/// Errors that can occur while editing a cart.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// Quantity must be at least one and fit in a line.
    #[error("Invalid quantity: {quantity} (must be between 1 and {max})", max = u32::MAX)]
    InvalidQuantity { quantity: i64 },

    /// The catalog item is flagged unavailable.
    #[error("Item unavailable: {item_id}")]
    ItemUnavailable { item_id: ItemId },

    /// A selected customization is not offered for the item.
    #[error("Unknown customization '{name}' for item {item_id}")]
    UnknownCustomization { item_id: ItemId, name: String },
}

/// Items a customer has selected during one checkout session.
///
/// Lines are kept in insertion order and keyed by catalog item; every line
/// holds a quantity of at least one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    customer_id: CustomerId,
    lines: Vec<LineItem>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Cart {
    /// Creates an empty cart for a customer.
    pub fn new(customer_id: CustomerId) -> Self {
        let now = Utc::now();
        Self {
            customer_id,
            lines: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the lines in insertion order.
    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    /// Returns the line for an item, if present.
    pub fn get_line(&self, item_id: &ItemId) -> Option<&LineItem> {
        self.lines.iter().find(|line| line.item_id() == item_id)
    }

    /// Returns the number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns the total quantity across all lines.
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(LineItem::quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of all line totals.
    pub fn total(&self) -> Money {
        self.lines.iter().map(LineItem::line_total).sum()
    }

    /// Adds `quantity` units of an item.
    ///
    /// If the item is already in the cart its quantity is increased and the
    /// existing line's customizations are kept.
    pub fn add_item<S: AsRef<str>>(
        &mut self,
        item: &CatalogItem,
        quantity: i64,
        customizations: &[S],
    ) -> Result<(), CartError> {
        let quantity = positive_quantity(quantity)?;

        if !item.is_available() {
            return Err(CartError::ItemUnavailable {
                item_id: item.id().clone(),
            });
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.item_id() == item.id()) {
            let merged = line
                .quantity()
                .checked_add(quantity)
                .ok_or(CartError::InvalidQuantity {
                    quantity: i64::from(line.quantity()) + i64::from(quantity),
                })?;
            line.set_quantity(merged);
            tracing::debug!(item_id = %item.id(), quantity = merged, "cart line merged");
        } else {
            let mut selected = Vec::with_capacity(customizations.len());
            for name in customizations {
                let name = name.as_ref();
                if item.customization(name).is_none() {
                    return Err(CartError::UnknownCustomization {
                        item_id: item.id().clone(),
                        name: name.to_string(),
                    });
                }
                selected.push(name.to_string());
            }
            self.lines
                .push(LineItem::new(item.clone(), quantity, selected));
            tracing::debug!(item_id = %item.id(), quantity, "cart line added");
        }

        self.touch();
        Ok(())
    }

    /// Removes the line for an item. Absent items are ignored.
    pub fn remove_item(&mut self, item_id: &ItemId) {
        self.lines.retain(|line| line.item_id() != item_id);
        self.touch();
    }

    /// Sets the quantity of a line; zero or less removes it.
    ///
    /// Items that are not in the cart are ignored. A quantity too large for
    /// a line is rejected and the cart is left unchanged.
    pub fn update_quantity(
        &mut self,
        item_id: &ItemId,
        new_quantity: i64,
    ) -> Result<(), CartError> {
        if new_quantity <= 0 {
            self.remove_item(item_id);
            return Ok(());
        }

        let quantity = positive_quantity(new_quantity)?;
        if let Some(line) = self.lines.iter_mut().find(|l| l.item_id() == item_id) {
            line.set_quantity(quantity);
        }
        self.touch();
        Ok(())
    }

    /// Removes every line.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

fn positive_quantity(quantity: i64) -> Result<u32, CartError> {
    match u32::try_from(quantity) {
        Ok(q) if q > 0 => Ok(q),
        _ => Err(CartError::InvalidQuantity { quantity }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Customization;

    const NONE: &[&str] = &[];

    fn burger() -> CatalogItem {
        CatalogItem::new("BURGER", "Burger", Money::from_cents(1299), "Mains")
            .unwrap()
            .with_customization(Customization::new("Bacon", Money::from_cents(150)).unwrap())
    }

    fn fries() -> CatalogItem {
        CatalogItem::new("FRIES", "Fries", Money::from_cents(399), "Sides").unwrap()
    }

    #[test]
    fn test_add_item() {
        let mut cart = Cart::new(CustomerId::new());
        cart.add_item(&burger(), 2, &["Bacon"]).unwrap();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total().cents(), 2898);
    }

    #[test]
    fn test_add_same_item_increases_quantity() {
        let mut cart = Cart::new(CustomerId::new());
        cart.add_item(&fries(), 1, NONE).unwrap();
        cart.add_item(&fries(), 2, NONE).unwrap();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.get_line(&ItemId::new("FRIES")).unwrap().quantity(), 3);
        assert_eq!(cart.total().cents(), 1197);
    }

    #[test]
    fn test_merge_keeps_existing_customizations() {
        let mut cart = Cart::new(CustomerId::new());
        cart.add_item(&burger(), 1, &["Bacon"]).unwrap();
        cart.add_item(&burger(), 1, NONE).unwrap();

        let line = cart.get_line(&ItemId::new("BURGER")).unwrap();
        assert_eq!(line.quantity(), 2);
        assert_eq!(line.customizations(), ["Bacon".to_string()]);
    }

    #[test]
    fn test_add_item_non_positive_quantity_fails() {
        let mut cart = Cart::new(CustomerId::new());
        assert_eq!(
            cart.add_item(&fries(), 0, NONE),
            Err(CartError::InvalidQuantity { quantity: 0 })
        );
        assert_eq!(
            cart.add_item(&fries(), -3, NONE),
            Err(CartError::InvalidQuantity { quantity: -3 })
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_unavailable_item_fails() {
        let mut cart = Cart::new(CustomerId::new());
        let sold_out = fries().with_availability(false);
        let result = cart.add_item(&sold_out, 1, NONE);
        assert!(matches!(result, Err(CartError::ItemUnavailable { .. })));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_unknown_customization_fails() {
        let mut cart = Cart::new(CustomerId::new());
        let result = cart.add_item(&burger(), 1, &["Pineapple"]);
        assert!(matches!(result, Err(CartError::UnknownCustomization { .. })));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_item_absent_is_noop() {
        let mut cart = Cart::new(CustomerId::new());
        cart.add_item(&fries(), 1, NONE).unwrap();
        cart.remove_item(&ItemId::new("NOPE"));
        assert_eq!(cart.line_count(), 1);

        cart.remove_item(&ItemId::new("FRIES"));
        assert!(cart.is_empty());
        assert!(cart.total().is_zero());
    }

    #[test]
    fn test_update_quantity() {
        let mut cart = Cart::new(CustomerId::new());
        cart.add_item(&fries(), 1, NONE).unwrap();
        cart.update_quantity(&ItemId::new("FRIES"), 4).unwrap();

        assert_eq!(cart.item_count(), 4);
        assert_eq!(cart.total().cents(), 1596);
    }

    #[test]
    fn test_update_quantity_to_zero_removes_line() {
        let mut cart = Cart::new(CustomerId::new());
        cart.add_item(&fries(), 2, NONE).unwrap();
        cart.add_item(&burger(), 1, NONE).unwrap();

        cart.update_quantity(&ItemId::new("FRIES"), 0).unwrap();
        cart.update_quantity(&ItemId::new("BURGER"), -1).unwrap();

        assert!(cart.is_empty());
    }

    #[test]
    fn test_oversized_quantity_is_rejected() {
        let mut cart = Cart::new(CustomerId::new());
        cart.add_item(&fries(), 2, NONE).unwrap();

        let too_many = i64::from(u32::MAX) + 1;
        let result = cart.update_quantity(&ItemId::new("FRIES"), too_many);
        assert_eq!(result, Err(CartError::InvalidQuantity { quantity: too_many }));
        assert_eq!(cart.item_count(), 2);

        let result = cart.add_item(&fries(), i64::from(u32::MAX), NONE);
        assert!(matches!(result, Err(CartError::InvalidQuantity { .. })));
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_clear_resets_total() {
        let mut cart = Cart::new(CustomerId::new());
        cart.add_item(&fries(), 2, NONE).unwrap();
        cart.clear();

        assert!(cart.is_empty());
        assert!(cart.total().is_zero());
    }

    #[test]
    fn test_mutations_touch_updated_at() {
        let mut cart = Cart::new(CustomerId::new());
        let before = cart.updated_at();
        cart.add_item(&fries(), 1, NONE).unwrap();
        assert!(cart.updated_at() >= before);
        assert_eq!(cart.created_at(), before);
    }

    #[test]
    fn test_lines_keep_insertion_order() {
        let mut cart = Cart::new(CustomerId::new());
        cart.add_item(&fries(), 1, NONE).unwrap();
        cart.add_item(&burger(), 1, NONE).unwrap();
        cart.add_item(&fries(), 1, NONE).unwrap();

        let ids: Vec<_> = cart.lines().iter().map(|l| l.item_id().as_str()).collect();
        assert_eq!(ids, ["FRIES", "BURGER"]);
    }
}
