//! Checkout error types.

use common::{OrderId, PaymentId};
use domain::{ErrorKind, Money, OrderError, PaymentError};
use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur while checking out an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The payment amount differs from the order total.
    #[error("Amount mismatch for order {order_id}: order total {order_total}, payment {payment_amount}")]
    AmountMismatch {
        order_id: OrderId,
        order_total: Money,
        payment_amount: Money,
    },

    /// The payment was raised against another order.
    #[error("Payment {payment_id} belongs to order {payment_order_id}, not {order_id}")]
    OrderMismatch {
        payment_id: PaymentId,
        payment_order_id: OrderId,
        order_id: OrderId,
    },

    /// An order rule was violated.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// A payment rule was violated.
    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    /// The persistence collaborator failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// Payment not found.
    #[error("Payment not found: {0}")]
    PaymentNotFound(PaymentId),
}

impl CheckoutError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CheckoutError::AmountMismatch { .. } | CheckoutError::OrderMismatch { .. } => {
                ErrorKind::Consistency
            }
            CheckoutError::Order(e) => e.kind(),
            CheckoutError::Payment(e) => e.kind(),
            CheckoutError::Store(StoreError::ConcurrencyConflict { .. }) => ErrorKind::State,
            CheckoutError::Store(_) => ErrorKind::Storage,
            CheckoutError::OrderNotFound(_) | CheckoutError::PaymentNotFound(_) => {
                ErrorKind::Argument
            }
        }
    }
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;
