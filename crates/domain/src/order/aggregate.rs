//! Order aggregate implementation.

use chrono::{DateTime, Utc};
use common::{CustomerId, OrderId, PaymentId};
use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::money::Money;
use crate::payment::PaymentStatus;

use super::{Fulfillment, OrderError, OrderLine, OrderStatus, OrderTotals, Pricing, StatusChange};

/// Order aggregate root.
///
/// Holds an immutable snapshot of the cart it was created from, the monetary
/// breakdown, and the status lifecycle from creation to delivery or
/// cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Identifier assigned by the persistence layer.
    id: OrderId,

    /// Customer who placed the order.
    customer_id: CustomerId,

    /// Lines captured from the cart at creation time.
    lines: Vec<OrderLine>,

    /// Monetary breakdown.
    totals: OrderTotals,

    /// Current status.
    status: OrderStatus,

    /// Settlement state of the order's payment.
    payment_status: PaymentStatus,

    /// Accepted payment that has not settled yet, such as an uncleared cheque.
    #[serde(default)]
    awaiting_clearance: Option<PaymentId>,

    /// Delivery or pickup.
    fulfillment: Fulfillment,

    /// Informational estimate only; never enforced.
    estimated_ready_at: DateTime<Utc>,

    /// Set when the order is marked delivered.
    delivered_at: Option<DateTime<Utc>>,

    /// Append-only status log.
    history: Vec<StatusChange>,

    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

// Query methods
impl Order {
    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    /// Returns the snapshot lines.
    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    /// Returns the total quantity of all lines.
    pub fn total_quantity(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    pub fn totals(&self) -> &OrderTotals {
        &self.totals
    }

    pub fn subtotal(&self) -> Money {
        self.totals.subtotal
    }

    pub fn tax_amount(&self) -> Money {
        self.totals.tax_amount
    }

    pub fn delivery_fee(&self) -> Money {
        self.totals.delivery_fee
    }

    pub fn total_amount(&self) -> Money {
        self.totals.total_amount
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    pub fn fulfillment(&self) -> &Fulfillment {
        &self.fulfillment
    }

    pub fn is_delivery(&self) -> bool {
        self.fulfillment.is_delivery()
    }

    pub fn delivery_address(&self) -> Option<&str> {
        self.fulfillment.address()
    }

    pub fn estimated_ready_at(&self) -> DateTime<Utc> {
        self.estimated_ready_at
    }

    pub fn delivered_at(&self) -> Option<DateTime<Utc>> {
        self.delivered_at
    }

    /// Returns the status history, oldest first.
    pub fn history(&self) -> &[StatusChange] {
        &self.history
    }

    /// Returns the most recent status change, for observers.
    pub fn latest_status_change(&self) -> Option<&StatusChange> {
        self.history.last()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns true if the order is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// The accepted payment still waiting to settle, if any.
    pub fn awaiting_clearance(&self) -> Option<PaymentId> {
        self.awaiting_clearance
    }

    /// Checks that a new payment may be taken for the order.
    ///
    /// Fails for terminal orders, paid orders, and orders with an accepted
    /// payment that has not settled.
    pub fn ensure_payable(&self) -> Result<(), OrderError> {
        self.ensure_not_terminal("accept payment")?;
        if self.payment_status == PaymentStatus::Completed {
            return Err(OrderError::InvalidTransition {
                current_state: self.status,
                action: "accept payment for an already paid order",
            });
        }
        if self.awaiting_clearance.is_some() {
            return Err(OrderError::InvalidTransition {
                current_state: self.status,
                action: "accept payment while another awaits clearance",
            });
        }
        Ok(())
    }
}

// Lifecycle methods
impl Order {
    /// Creates an order from a cart and empties the cart.
    ///
    /// The cart is left untouched if creation fails.
    pub fn create(
        order_id: OrderId,
        customer_id: CustomerId,
        cart: &mut Cart,
        fulfillment: Fulfillment,
        pricing: &Pricing,
    ) -> Result<Self, OrderError> {
        if cart.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        if cart.customer_id() != customer_id {
            return Err(OrderError::CustomerMismatch {
                cart_customer: cart.customer_id(),
                customer: customer_id,
            });
        }

        let lines: Vec<OrderLine> = cart.lines().iter().map(OrderLine::from).collect();
        let totals = OrderTotals::compute(&lines, pricing, &fulfillment)?;
        let now = Utc::now();

        let order = Self {
            id: order_id,
            customer_id,
            lines,
            totals,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            awaiting_clearance: None,
            fulfillment,
            estimated_ready_at: now + pricing.preparation_time,
            delivered_at: None,
            history: vec![StatusChange::now(OrderStatus::Pending, "Order Created")],
            created_at: now,
            updated_at: now,
        };

        cart.clear();

        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(
            order_id = %order.id,
            customer_id = %order.customer_id,
            total = %order.totals.total_amount,
            "order created"
        );

        Ok(order)
    }

    /// Moves the order to a new status and records it in the history.
    ///
    /// Any move out of a non-terminal state is accepted.
    pub fn update_status(
        &mut self,
        new_status: OrderStatus,
        message: Option<&str>,
    ) -> Result<(), OrderError> {
        self.ensure_not_terminal("update status")?;

        match new_status {
            OrderStatus::Cancelled => self.set_payment_status(PaymentStatus::Refunded),
            OrderStatus::Delivered => self.delivered_at = Some(Utc::now()),
            _ => {}
        }

        let message = message
            .map(str::to_string)
            .unwrap_or_else(|| format!("Status changed to {new_status}"));
        self.record(new_status, message);
        Ok(())
    }

    /// Marks the order ready, choosing pickup or delivery from its fulfillment.
    pub fn mark_ready(&mut self) -> Result<(), OrderError> {
        let status = if self.is_delivery() {
            OrderStatus::ReadyForDelivery
        } else {
            OrderStatus::ReadyForPickup
        };
        self.update_status(status, None)
    }

    /// Cancels the order and flags its payment as refunded.
    ///
    /// Cancelling a delivered or already cancelled order does nothing.
    pub fn cancel(&mut self) -> Result<(), OrderError> {
        if self.is_terminal() {
            return Ok(());
        }
        self.update_status(OrderStatus::Cancelled, Some("Order Cancelled"))
    }

    /// Marks the order delivered and records the delivery time.
    ///
    /// Marking an already delivered order does nothing.
    pub fn mark_delivered(&mut self) -> Result<(), OrderError> {
        match self.status {
            OrderStatus::Delivered => Ok(()),
            OrderStatus::Cancelled => Err(OrderError::InvalidTransition {
                current_state: self.status,
                action: "mark delivered",
            }),
            _ => self.update_status(OrderStatus::Delivered, Some("Order Delivered")),
        }
    }

    /// Recomputes the monetary breakdown from the snapshot with a new policy.
    ///
    /// Totals are never recomputed implicitly.
    pub fn recalculate_totals(&mut self, pricing: &Pricing) -> Result<(), OrderError> {
        self.ensure_not_terminal("recalculate totals")?;
        if self.payment_status == PaymentStatus::Completed {
            return Err(OrderError::InvalidTransition {
                current_state: self.status,
                action: "recalculate totals of a paid order",
            });
        }
        if self.awaiting_clearance.is_some() {
            return Err(OrderError::InvalidTransition {
                current_state: self.status,
                action: "recalculate totals while a payment awaits clearance",
            });
        }

        self.totals = OrderTotals::compute(&self.lines, pricing, &self.fulfillment)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Records the settlement state of the order's payment.
    ///
    /// Any status other than Pending ends a wait for clearance.
    pub fn set_payment_status(&mut self, status: PaymentStatus) {
        if status != PaymentStatus::Pending {
            self.awaiting_clearance = None;
        }
        self.payment_status = status;
        self.updated_at = Utc::now();
    }

    /// Records an accepted payment that settles later.
    pub fn await_clearance(&mut self, payment_id: PaymentId) {
        self.awaiting_clearance = Some(payment_id);
        self.payment_status = PaymentStatus::Pending;
        self.updated_at = Utc::now();
    }

    fn ensure_not_terminal(&self, action: &'static str) -> Result<(), OrderError> {
        if self.status.is_terminal() {
            return Err(OrderError::InvalidTransition {
                current_state: self.status,
                action,
            });
        }
        Ok(())
    }

    fn record(&mut self, status: OrderStatus, message: String) {
        tracing::info!(order_id = %self.id, from = %self.status, to = %status, "order status changed");
        self.status = status;
        let change = StatusChange::now(status, message);
        self.updated_at = change.at;
        self.history.push(change);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogItem, Customization};

    fn cart_with_burger(customer_id: CustomerId) -> Cart {
        let burger = CatalogItem::new("BURGER", "Burger", Money::from_cents(1299), "Mains")
            .unwrap()
            .with_customization(Customization::new("Bacon", Money::from_cents(150)).unwrap());
        let mut cart = Cart::new(customer_id);
        cart.add_item(&burger, 2, &["Bacon"]).unwrap();
        cart
    }

    fn create_order() -> Order {
        let customer_id = CustomerId::new();
        let mut cart = cart_with_burger(customer_id);
        Order::create(
            OrderId::new(1),
            customer_id,
            &mut cart,
            Fulfillment::delivery("1 Main St"),
            &Pricing::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_create_order() {
        let order = create_order();

        assert_eq!(order.id(), OrderId::new(1));
        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.payment_status(), PaymentStatus::Pending);
        assert_eq!(order.lines().len(), 1);
        assert_eq!(order.history().len(), 1);
        assert_eq!(order.history()[0].message, "Order Created");
        assert!(order.estimated_ready_at() > order.created_at());
        assert!(order.delivered_at().is_none());
    }

    #[test]
    fn test_create_order_computes_breakdown() {
        let order = create_order();

        assert_eq!(order.subtotal().cents(), 2898);
        assert_eq!(order.tax_amount().cents(), 580);
        assert_eq!(order.delivery_fee().cents(), 299);
        assert_eq!(order.total_amount().cents(), 3777);
    }

    #[test]
    fn test_create_order_empties_cart() {
        let customer_id = CustomerId::new();
        let mut cart = cart_with_burger(customer_id);
        Order::create(
            OrderId::new(1),
            customer_id,
            &mut cart,
            Fulfillment::Pickup,
            &Pricing::default(),
        )
        .unwrap();

        assert!(cart.is_empty());
    }

    #[test]
    fn test_create_order_from_empty_cart_fails() {
        let customer_id = CustomerId::new();
        let mut cart = Cart::new(customer_id);
        let result = Order::create(
            OrderId::new(1),
            customer_id,
            &mut cart,
            Fulfillment::Pickup,
            &Pricing::default(),
        );
        assert_eq!(result, Err(OrderError::EmptyCart));
    }

    #[test]
    fn test_create_order_for_other_customer_fails() {
        let mut cart = cart_with_burger(CustomerId::new());
        let result = Order::create(
            OrderId::new(1),
            CustomerId::new(),
            &mut cart,
            Fulfillment::Pickup,
            &Pricing::default(),
        );
        assert!(matches!(result, Err(OrderError::CustomerMismatch { .. })));
        assert!(!cart.is_empty());
    }

    #[test]
    fn test_snapshot_is_insulated_from_catalog_changes() {
        let customer_id = CustomerId::new();
        let mut cart = cart_with_burger(customer_id);
        let order = Order::create(
            OrderId::new(1),
            customer_id,
            &mut cart,
            Fulfillment::Pickup,
            &Pricing::default(),
        )
        .unwrap();

        let repriced = CatalogItem::new("BURGER", "Burger", Money::from_cents(9999), "Mains").unwrap();
        cart.add_item(&repriced, 1, &[] as &[&str]).unwrap();

        assert_eq!(order.lines()[0].unit_price.cents(), 1299);
        assert_eq!(order.subtotal().cents(), 2898);
    }

    #[test]
    fn test_update_status_appends_history() {
        let mut order = create_order();
        order.update_status(OrderStatus::Preparing, None).unwrap();
        order
            .update_status(OrderStatus::ReadyForDelivery, Some("Out the door soon"))
            .unwrap();

        assert_eq!(order.status(), OrderStatus::ReadyForDelivery);
        assert_eq!(order.history().len(), 3);
        assert_eq!(order.history()[1].message, "Status changed to Preparing");
        assert_eq!(
            order.latest_status_change().map(|c| c.message.as_str()),
            Some("Out the door soon")
        );
    }

    #[test]
    fn test_permissive_transitions() {
        let mut order = create_order();
        order.update_status(OrderStatus::ReadyForPickup, None).unwrap();
        order.update_status(OrderStatus::Pending, None).unwrap();
        order.update_status(OrderStatus::Delivered, None).unwrap();

        assert_eq!(order.status(), OrderStatus::Delivered);
        assert!(order.delivered_at().is_some());
    }

    #[test]
    fn test_terminal_states_reject_updates() {
        let mut delivered = create_order();
        delivered.mark_delivered().unwrap();
        let mut cancelled = create_order();
        cancelled.cancel().unwrap();

        for order in [&mut delivered, &mut cancelled] {
            let before = order.history().len();
            let result = order.update_status(OrderStatus::Preparing, None);
            assert!(matches!(result, Err(OrderError::InvalidTransition { .. })));
            assert_eq!(order.history().len(), before);
        }
    }

    #[test]
    fn test_cancel_order() {
        let mut order = create_order();
        order.cancel().unwrap();

        assert_eq!(order.status(), OrderStatus::Cancelled);
        assert_eq!(order.payment_status(), PaymentStatus::Refunded);
        assert!(order.is_terminal());
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut order = create_order();
        order.cancel().unwrap();
        order.cancel().unwrap();

        assert_eq!(order.history().len(), 2);
    }

    #[test]
    fn test_cancel_delivered_order_is_noop() {
        let mut order = create_order();
        order.mark_delivered().unwrap();
        let history_len = order.history().len();

        order.cancel().unwrap();
        assert_eq!(order.status(), OrderStatus::Delivered);
        assert_eq!(order.payment_status(), PaymentStatus::Pending);
        assert_eq!(order.history().len(), history_len);
    }

    #[test]
    fn test_cannot_deliver_cancelled_order() {
        let mut order = create_order();
        order.cancel().unwrap();

        let result = order.mark_delivered();
        assert!(matches!(result, Err(OrderError::InvalidTransition { .. })));
        assert!(order.delivered_at().is_none());
    }

    #[test]
    fn test_mark_ready_follows_fulfillment() {
        let mut delivery = create_order();
        delivery.mark_ready().unwrap();
        assert_eq!(delivery.status(), OrderStatus::ReadyForDelivery);

        let customer_id = CustomerId::new();
        let mut cart = cart_with_burger(customer_id);
        let mut pickup = Order::create(
            OrderId::new(2),
            customer_id,
            &mut cart,
            Fulfillment::Pickup,
            &Pricing::default(),
        )
        .unwrap();
        pickup.mark_ready().unwrap();
        assert_eq!(pickup.status(), OrderStatus::ReadyForPickup);
    }

    #[test]
    fn test_recalculate_totals() {
        let mut order = create_order();
        let pricing = Pricing {
            delivery_fee: Money::zero(),
            ..Pricing::default()
        };
        order.recalculate_totals(&pricing).unwrap();

        assert_eq!(order.delivery_fee().cents(), 0);
        assert_eq!(order.total_amount().cents(), 3478);
    }

    #[test]
    fn test_recalculate_totals_rejected_after_payment() {
        let mut order = create_order();
        order.set_payment_status(PaymentStatus::Completed);

        let result = order.recalculate_totals(&Pricing::default());
        assert!(matches!(result, Err(OrderError::InvalidTransition { .. })));
    }

    #[test]
    fn test_serialization() {
        let order = create_order();
        let json = serde_json::to_string(&order).unwrap();
        let deserialized: Order = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized, order);
    }

    #[test]
    fn test_pending_clearance_blocks_new_payment() {
        let mut order = create_order();
        assert!(order.ensure_payable().is_ok());

        order.await_clearance(PaymentId::new(7));

        assert_eq!(order.awaiting_clearance(), Some(PaymentId::new(7)));
        assert_eq!(order.payment_status(), PaymentStatus::Pending);
        assert!(matches!(
            order.ensure_payable(),
            Err(OrderError::InvalidTransition { .. })
        ));
        assert!(matches!(
            order.recalculate_totals(&Pricing::default()),
            Err(OrderError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_settlement_ends_clearance_wait() {
        let mut order = create_order();
        order.await_clearance(PaymentId::new(7));

        order.set_payment_status(PaymentStatus::Completed);

        assert_eq!(order.awaiting_clearance(), None);
        assert!(matches!(
            order.ensure_payable(),
            Err(OrderError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_cancel_ends_clearance_wait() {
        let mut order = create_order();
        order.await_clearance(PaymentId::new(7));

        order.cancel().unwrap();

        assert_eq!(order.awaiting_clearance(), None);
        assert_eq!(order.payment_status(), PaymentStatus::Refunded);
    }
}
