//! Value objects for the order domain.

use chrono::{DateTime, TimeDelta, Utc};
use common::ItemId;
use serde::{Deserialize, Serialize};

use crate::cart::LineItem;
use crate::money::{Money, TaxRate};

use super::{OrderError, OrderStatus};

/// A line frozen at order creation, independent of later catalog changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// The catalog item identifier.
    pub item_id: ItemId,

    /// Item name at the time of ordering.
    pub name: String,

    /// Quantity ordered.
    pub quantity: u32,

    /// Base price per unit.
    pub unit_price: Money,

    /// Selected customization names.
    pub customizations: Vec<String>,

    /// Combined customization cost per unit.
    pub customization_cost: Money,
}

impl OrderLine {
    /// Returns `(unit_price + customization_cost) * quantity`.
    pub fn line_total(&self) -> Money {
        (self.unit_price + self.customization_cost).multiply(self.quantity)
    }
}

impl From<&LineItem> for OrderLine {
    fn from(line: &LineItem) -> Self {
        Self {
            item_id: line.item_id().clone(),
            name: line.item().name().to_string(),
            quantity: line.quantity(),
            unit_price: line.item().unit_price(),
            customizations: line.customizations().to_vec(),
            customization_cost: line.customization_cost(),
        }
    }
}

/// How the order reaches the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Fulfillment {
    /// Courier delivery to an address; charged the delivery fee.
    Delivery { address: String },

    /// Customer collects the order.
    Pickup,
}

impl Fulfillment {
    pub fn delivery(address: impl Into<String>) -> Self {
        Fulfillment::Delivery {
            address: address.into(),
        }
    }

    pub fn is_delivery(&self) -> bool {
        matches!(self, Fulfillment::Delivery { .. })
    }

    pub fn address(&self) -> Option<&str> {
        match self {
            Fulfillment::Delivery { address } => Some(address),
            Fulfillment::Pickup => None,
        }
    }
}

/// Pricing policy applied when an order is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pricing {
    pub tax_rate: TaxRate,
    pub delivery_fee: Money,
    /// Offset used for the informational ready/delivery estimate.
    pub preparation_time: TimeDelta,
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            tax_rate: TaxRate::percent(20),
            delivery_fee: Money::from_cents(299),
            preparation_time: TimeDelta::minutes(45),
        }
    }
}

/// Monetary breakdown of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub tax_amount: Money,
    pub delivery_fee: Money,
    pub total_amount: Money,
}

impl OrderTotals {
    /// Computes the breakdown for a set of snapshot lines.
    ///
    /// Tax is levied on the subtotal only; the delivery fee is added for
    /// delivery orders.
    pub fn compute(
        lines: &[OrderLine],
        pricing: &Pricing,
        fulfillment: &Fulfillment,
    ) -> Result<Self, OrderError> {
        let subtotal = lines
            .iter()
            .try_fold(Money::zero(), |acc, line| acc.checked_add(line.line_total()))
            .ok_or(OrderError::AmountOverflow("subtotal"))?;
        let tax_amount = pricing
            .tax_rate
            .apply(subtotal)
            .ok_or(OrderError::AmountOverflow("tax"))?;
        let delivery_fee = if fulfillment.is_delivery() {
            pricing.delivery_fee
        } else {
            Money::zero()
        };
        let total_amount = subtotal
            .checked_add(tax_amount)
            .and_then(|sum| sum.checked_add(delivery_fee))
            .ok_or(OrderError::AmountOverflow("total"))?;

        Ok(Self {
            subtotal,
            tax_amount,
            delivery_fee,
            total_amount,
        })
    }
}

/// One entry in an order's append-only status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: OrderStatus,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl StatusChange {
    pub(crate) fn now(status: OrderStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(unit: i64, extra: i64, quantity: u32) -> OrderLine {
        OrderLine {
            item_id: ItemId::new("X"),
            name: "X".to_string(),
            quantity,
            unit_price: Money::from_cents(unit),
            customizations: Vec::new(),
            customization_cost: Money::from_cents(extra),
        }
    }

    #[test]
    fn test_order_line_total() {
        assert_eq!(line(1299, 150, 2).line_total().cents(), 2898);
    }

    #[test]
    fn test_totals_for_delivery() {
        let totals = OrderTotals::compute(
            &[line(1299, 150, 2)],
            &Pricing::default(),
            &Fulfillment::delivery("1 Main St"),
        )
        .unwrap();

        assert_eq!(totals.subtotal.cents(), 2898);
        assert_eq!(totals.tax_amount.cents(), 580);
        assert_eq!(totals.delivery_fee.cents(), 299);
        assert_eq!(totals.total_amount.cents(), 3777);
    }

    #[test]
    fn test_pickup_has_no_delivery_fee() {
        let totals =
            OrderTotals::compute(&[line(1000, 0, 1)], &Pricing::default(), &Fulfillment::Pickup)
                .unwrap();

        assert!(totals.delivery_fee.is_zero());
        assert_eq!(totals.total_amount.cents(), 1200);
    }

    #[test]
    fn test_tax_overflow_is_an_error() {
        let pricing = Pricing {
            tax_rate: TaxRate::from_basis_points(u32::MAX),
            ..Pricing::default()
        };
        let result = OrderTotals::compute(&[line(i64::MAX / 2, 0, 1)], &pricing, &Fulfillment::Pickup);
        assert_eq!(result, Err(OrderError::AmountOverflow("tax")));
    }

    #[test]
    fn test_fulfillment_serialization() {
        let json = serde_json::to_string(&Fulfillment::delivery("1 Main St")).unwrap();
        assert_eq!(json, r#"{"type":"delivery","address":"1 Main St"}"#);

        let pickup: Fulfillment = serde_json::from_str(r#"{"type":"pickup"}"#).unwrap();
        assert_eq!(pickup, Fulfillment::Pickup);
    }
}
