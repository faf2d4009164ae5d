//! Order-payment coordination for restaurant checkout.
//!
//! This crate joins the domain core to the outside world:
//! - [`OrderPaymentCoordinator`] ties order finalization to payment processing
//! - [`CheckoutConfig`] carries pricing settings explicitly instead of globally
//! - [`OrderStore`] is the seam to the persistence collaborator, with an
//!   in-memory implementation
//! - [`CheckoutService`] runs coordinator operations against a store

pub mod config;
pub mod coordinator;
pub mod error;
pub mod service;
pub mod store;

pub use config::CheckoutConfig;
pub use coordinator::{FinalizeOutcome, OrderPaymentCoordinator};
pub use error::CheckoutError;
pub use service::{CheckoutService, PaymentReceipt};
pub use store::{InMemoryOrderStore, OrderStore, StoreError, StoredOrder, Version};
