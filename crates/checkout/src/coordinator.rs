//! Joins order finalization to payment processing.

use chrono::{NaiveDate, Utc};
use common::{CustomerId, OrderId};
use domain::{
    Cart, DeclineReason, Fulfillment, Order, OrderError, OrderStatus, Payment, PaymentStatus,
};

use crate::config::CheckoutConfig;
use crate::error::{CheckoutError, Result};

/// What happened when a payment was applied to an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalizeOutcome {
    /// Funds received; the order is paid.
    Paid,

    /// Accepted, but settlement is deferred (cheques awaiting clearance).
    AwaitingClearance,

    /// The payment method declined; the order is unchanged and the caller
    /// may retry with a new payment.
    Declined { reason: DeclineReason },
}

impl FinalizeOutcome {
    pub fn is_declined(&self) -> bool {
        matches!(self, FinalizeOutcome::Declined { .. })
    }
}

/// The only component that touches both an order and its payment.
///
/// It never retries; every failure goes back to the caller. It assumes a
/// single writer per order: concurrent callers must be serialized by the
/// persistence layer.
#[derive(Debug, Clone, Default)]
pub struct OrderPaymentCoordinator {
    config: CheckoutConfig,
}

impl OrderPaymentCoordinator {
    pub fn new(config: CheckoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CheckoutConfig {
        &self.config
    }

    /// Creates an order from a cart using the configured pricing.
    pub fn create_order(
        &self,
        order_id: OrderId,
        customer_id: CustomerId,
        cart: &mut Cart,
        fulfillment: Fulfillment,
    ) -> Result<Order> {
        let order = Order::create(
            order_id,
            customer_id,
            cart,
            fulfillment,
            &self.config.pricing(),
        )?;
        Ok(order)
    }

    /// Processes `payment` for `order` as of today.
    pub fn finalize_order(
        &self,
        order: &mut Order,
        payment: &mut Payment,
    ) -> Result<FinalizeOutcome> {
        self.finalize_order_on(order, payment, Utc::now().date_naive())
    }

    /// Processes `payment` for `order` as of `today`.
    ///
    /// A stale amount or a payment for another order is rejected before the
    /// payment is touched.
    #[tracing::instrument(
        skip_all,
        fields(order_id = %order.id(), payment_id = %payment.id(), method = payment.method_name())
    )]
    pub fn finalize_order_on(
        &self,
        order: &mut Order,
        payment: &mut Payment,
        today: NaiveDate,
    ) -> Result<FinalizeOutcome> {
        let started = std::time::Instant::now();

        if payment.amount() != order.total_amount() {
            return Err(CheckoutError::AmountMismatch {
                order_id: order.id(),
                order_total: order.total_amount(),
                payment_amount: payment.amount(),
            });
        }
        ensure_same_order(order, payment)?;

        order.ensure_payable()?;

        payment.process_on(today)?;

        let outcome = match (payment.decline_reason(), payment.status()) {
            (Some(reason), _) => FinalizeOutcome::Declined {
                reason: reason.clone(),
            },
            (None, PaymentStatus::Completed) => {
                order.set_payment_status(PaymentStatus::Completed);
                FinalizeOutcome::Paid
            }
            (None, _) => {
                order.await_clearance(payment.id());
                FinalizeOutcome::AwaitingClearance
            }
        };

        metrics::histogram!("checkout_finalize_duration_seconds")
            .record(started.elapsed().as_secs_f64());
        tracing::info!(?outcome, "order finalized");

        Ok(outcome)
    }

    /// Completes a cleared cheque and marks its order paid.
    #[tracing::instrument(skip_all, fields(order_id = %order.id(), payment_id = %payment.id()))]
    pub fn settle_check(&self, order: &mut Order, payment: &mut Payment) -> Result<()> {
        ensure_same_order(order, payment)?;
        if order.status() == OrderStatus::Cancelled {
            return Err(OrderError::InvalidTransition {
                current_state: order.status(),
                action: "settle payment",
            }
            .into());
        }
        if order.awaiting_clearance() != Some(payment.id()) {
            return Err(OrderError::InvalidTransition {
                current_state: order.status(),
                action: "settle a payment the order is not waiting on",
            }
            .into());
        }

        payment.mark_cleared()?;
        order.set_payment_status(PaymentStatus::Completed);
        Ok(())
    }

    /// Cancels an order and refunds its completed payment.
    #[tracing::instrument(skip_all, fields(order_id = %order.id(), payment_id = %payment.id()))]
    pub fn refund_order(&self, order: &mut Order, payment: &mut Payment) -> Result<()> {
        ensure_same_order(order, payment)?;
        if order.status() == OrderStatus::Delivered {
            return Err(OrderError::InvalidTransition {
                current_state: order.status(),
                action: "refund",
            }
            .into());
        }

        order.cancel()?;
        if payment.status() == PaymentStatus::Completed {
            payment.refund()?;
        }
        Ok(())
    }
}

fn ensure_same_order(order: &Order, payment: &Payment) -> Result<()> {
    if payment.order_id() != order.id() {
        return Err(CheckoutError::OrderMismatch {
            payment_id: payment.id(),
            payment_order_id: payment.order_id(),
            order_id: order.id(),
        });
    }
    Ok(())
}
