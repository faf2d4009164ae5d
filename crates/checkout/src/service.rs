//! Checkout service: the coordinator wired to a store.

use common::{OrderId, PaymentId};
use domain::{
    Cart, Fulfillment, Order, OrderError, OrderStatus, Payment, PaymentMethod, PaymentRules,
    PaymentStatus,
};

use crate::config::CheckoutConfig;
use crate::coordinator::{FinalizeOutcome, OrderPaymentCoordinator};
use crate::error::{CheckoutError, Result};
use crate::store::{OrderStore, StoredOrder, Version};

/// Result of applying a payment to an order.
#[derive(Debug, Clone)]
pub struct PaymentReceipt {
    pub order: Order,
    pub payment: Payment,
    pub outcome: FinalizeOutcome,
}

/// High-level checkout API for a presentation layer.
///
/// Loads records from the store, runs the domain operation through the
/// coordinator, and writes the results back under the version they were
/// loaded at.
pub struct CheckoutService<S: OrderStore> {
    store: S,
    coordinator: OrderPaymentCoordinator,
}

impl<S: OrderStore> CheckoutService<S> {
    /// Creates a new checkout service.
    pub fn new(store: S, config: CheckoutConfig) -> Self {
        Self {
            store,
            coordinator: OrderPaymentCoordinator::new(config),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn coordinator(&self) -> &OrderPaymentCoordinator {
        &self.coordinator
    }

    /// Turns a cart into a stored order.
    ///
    /// The cart is emptied only once the order has been saved. An empty cart
    /// is rejected before an order id is reserved.
    #[tracing::instrument(skip(self, cart), fields(customer_id = %cart.customer_id()))]
    pub async fn place_order(&self, cart: &mut Cart, fulfillment: Fulfillment) -> Result<Order> {
        if cart.is_empty() {
            return Err(OrderError::EmptyCart.into());
        }
        let order_id = self.store.next_order_id().await?;

        let mut working = cart.clone();
        let customer_id = working.customer_id();
        let order =
            self.coordinator
                .create_order(order_id, customer_id, &mut working, fulfillment)?;

        self.store.save_order(&order, Version::initial()).await?;
        *cart = working;
        Ok(order)
    }

    /// Pays for an order with the given method.
    ///
    /// A declined payment is stored for audit while the order is left as it
    /// was, so the caller can retry with another method.
    #[tracing::instrument(skip(self, method), fields(method = method.method_name()))]
    pub async fn pay(&self, order_id: OrderId, method: PaymentMethod) -> Result<PaymentReceipt> {
        let StoredOrder { mut order, version } = self.load(order_id).await?;
        let payment_id = self.store.next_payment_id().await?;
        let mut payment = Payment::new(
            payment_id,
            order.id(),
            order.customer_id(),
            order.total_amount(),
            method,
        )?;

        let outcome = self.coordinator.finalize_order(&mut order, &mut payment)?;

        if outcome.is_declined() {
            self.store.save_payment(&payment).await?;
        } else {
            self.store
                .save_finalized(&order, version, &payment)
                .await?;
        }

        Ok(PaymentReceipt {
            order,
            payment,
            outcome,
        })
    }

    /// Completes a cheque payment once the bank has cleared it.
    #[tracing::instrument(skip(self))]
    pub async fn settle_check(&self, payment_id: PaymentId) -> Result<PaymentReceipt> {
        let mut payment = self
            .store
            .load_payment(payment_id)
            .await?
            .ok_or(CheckoutError::PaymentNotFound(payment_id))?;
        let StoredOrder { mut order, version } = self.load(payment.order_id()).await?;

        self.coordinator.settle_check(&mut order, &mut payment)?;
        self.store
            .save_finalized(&order, version, &payment)
            .await?;

        Ok(PaymentReceipt {
            order,
            payment,
            outcome: FinalizeOutcome::Paid,
        })
    }

    /// Moves an order to a new status.
    ///
    /// Cancellation goes through [`Self::cancel_order`] so a completed
    /// payment is refunded along with the order.
    #[tracing::instrument(skip(self))]
    pub async fn update_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
        message: Option<&str>,
    ) -> Result<Order> {
        if status == OrderStatus::Cancelled {
            let current = self.order(order_id).await?;
            if current.is_terminal() {
                return Err(OrderError::InvalidTransition {
                    current_state: current.status(),
                    action: "update status",
                }
                .into());
            }
            return self.cancel_order(order_id).await;
        }
        self.modify(order_id, |order| order.update_status(status, message))
            .await
    }

    /// Marks an order delivered.
    #[tracing::instrument(skip(self))]
    pub async fn mark_delivered(&self, order_id: OrderId) -> Result<Order> {
        self.modify(order_id, Order::mark_delivered).await
    }

    /// Cancels an order, refunding its completed payment if there is one.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_order(&self, order_id: OrderId) -> Result<Order> {
        let completed = self
            .store
            .payments_for_order(order_id)
            .await?
            .into_iter()
            .find(|p| p.status() == PaymentStatus::Completed);

        let Some(mut payment) = completed else {
            return self.modify(order_id, Order::cancel).await;
        };

        let StoredOrder { mut order, version } = self.load(order_id).await?;
        self.coordinator.refund_order(&mut order, &mut payment)?;
        self.store
            .save_finalized(&order, version, &payment)
            .await?;
        Ok(order)
    }

    /// Loads an order.
    pub async fn order(&self, order_id: OrderId) -> Result<Order> {
        Ok(self.load(order_id).await?.order)
    }

    /// Returns every payment attempt recorded for an order.
    pub async fn payments(&self, order_id: OrderId) -> Result<Vec<Payment>> {
        Ok(self.store.payments_for_order(order_id).await?)
    }

    async fn load(&self, order_id: OrderId) -> Result<StoredOrder> {
        self.store
            .load_order(order_id)
            .await?
            .ok_or(CheckoutError::OrderNotFound(order_id))
    }

    async fn modify<F>(&self, order_id: OrderId, f: F) -> Result<Order>
    where
        F: FnOnce(&mut Order) -> std::result::Result<(), OrderError>,
    {
        let StoredOrder { mut order, version } = self.load(order_id).await?;
        f(&mut order)?;
        self.store.save_order(&order, version).await?;
        Ok(order)
    }
}
