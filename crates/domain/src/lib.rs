//! Domain core for restaurant checkout.
//!
//! This crate provides:
//! - Money and tax-rate value objects with exact cent arithmetic
//! - Catalog records consumed from the menu provider
//! - The cart that accumulates priced line items
//! - The order aggregate with its status machine and history
//! - The payment strategy family (cash, credit card, cheque)
//!
//! Everything here is synchronous and free of I/O.

pub mod cart;
pub mod catalog;
pub mod error;
pub mod money;
pub mod order;
pub mod payment;

pub use cart::{Cart, CartError, LineItem};
pub use catalog::{CatalogError, CatalogItem, Customization};
pub use common::{CustomerId, ItemId, OrderId, PaymentId};
pub use error::{DomainError, ErrorKind};
pub use money::{Money, TaxRate};
pub use order::{
    Fulfillment, Order, OrderError, OrderLine, OrderStatus, OrderTotals, Pricing, StatusChange,
};
pub use payment::{
    CashDetails, CheckDetails, CreditCardDetails, DeclineReason, Payment, PaymentError,
    PaymentMethod, PaymentRules, PaymentStatus,
};
