//! Order aggregate and related types.

mod aggregate;
mod state;
mod value_objects;

pub use aggregate::Order;
pub use state::OrderStatus;
pub use value_objects::{Fulfillment, OrderLine, OrderTotals, Pricing, StatusChange};

use common::CustomerId;
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    /// Orders cannot be created from an empty cart.
    #[error("Cannot create an order from an empty cart")]
    EmptyCart,

    /// The cart belongs to a different customer.
    #[error("Cart belongs to customer {cart_customer}, not {customer}")]
    CustomerMismatch {
        cart_customer: CustomerId,
        customer: CustomerId,
    },

    /// Order is not in a state that allows the requested action.
    #[error("Invalid state transition: cannot {action} from {current_state} state")]
    InvalidTransition {
        current_state: OrderStatus,
        action: &'static str,
    },

    /// An order amount does not fit in a `Money`.
    #[error("Order amount overflows: {0}")]
    AmountOverflow(&'static str),

    /// Status name did not match any known status.
    #[error("Unknown order status: {0}")]
    UnknownStatus(String),
}
