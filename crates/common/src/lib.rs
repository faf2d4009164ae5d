//! Identifier types shared by the checkout crates.

mod types;

pub use types::{CustomerId, ItemId, OrderId, PaymentId};
