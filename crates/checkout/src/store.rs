//! Persistence seam for finalized orders and payments.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{OrderId, PaymentId};
use domain::{Order, Payment};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors raised by a store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Another writer saved the order first.
    #[error(
        "Concurrency conflict for order {order_id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        order_id: OrderId,
        expected: Version,
        actual: Version,
    },

    /// A record could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Optimistic concurrency version of a stored order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(u64);

impl Version {
    /// The version of an order that has never been saved.
    pub fn initial() -> Self {
        Self(0)
    }

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An order together with the version it was loaded at.
#[derive(Debug, Clone)]
pub struct StoredOrder {
    pub order: Order,
    pub version: Version,
}

/// Durable storage for orders and payments.
///
/// Stores assign identifiers and guard each order with an optimistic version:
/// a save whose `expected` version is stale fails with
/// [`StoreError::ConcurrencyConflict`].
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Reserves a fresh order identifier.
    async fn next_order_id(&self) -> Result<OrderId>;

    /// Reserves a fresh payment identifier.
    async fn next_payment_id(&self) -> Result<PaymentId>;

    /// Loads an order, or `None` if it does not exist.
    async fn load_order(&self, order_id: OrderId) -> Result<Option<StoredOrder>>;

    /// Saves an order, returning its new version.
    async fn save_order(&self, order: &Order, expected: Version) -> Result<Version>;

    /// Saves a payment without touching its order.
    async fn save_payment(&self, payment: &Payment) -> Result<()>;

    /// Saves an order and a payment atomically.
    async fn save_finalized(
        &self,
        order: &Order,
        expected: Version,
        payment: &Payment,
    ) -> Result<Version>;

    /// Loads a payment, or `None` if it does not exist.
    async fn load_payment(&self, payment_id: PaymentId) -> Result<Option<Payment>>;

    /// Returns every payment recorded for an order, oldest first.
    async fn payments_for_order(&self, order_id: OrderId) -> Result<Vec<Payment>>;
}

#[derive(Debug, Default)]
struct InMemoryState {
    orders: HashMap<OrderId, (Version, serde_json::Value)>,
    payments: HashMap<PaymentId, serde_json::Value>,
    last_order_id: u64,
    last_payment_id: u64,
}

impl InMemoryState {
    fn check_version(&self, order_id: OrderId, expected: Version) -> Result<Version> {
        let actual = self
            .orders
            .get(&order_id)
            .map(|(version, _)| *version)
            .unwrap_or(Version::initial());

        if actual != expected {
            return Err(StoreError::ConcurrencyConflict {
                order_id,
                expected,
                actual,
            });
        }
        Ok(actual.next())
    }
}

/// In-memory store for tests and the console harness.
///
/// Records are kept as JSON documents, the same shape a durable store would write.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderStore {
    state: Arc<RwLock<InMemoryState>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    /// Returns the number of stored payments.
    pub async fn payment_count(&self) -> usize {
        self.state.read().await.payments.len()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn next_order_id(&self) -> Result<OrderId> {
        let mut state = self.state.write().await;
        state.last_order_id += 1;
        Ok(OrderId::new(state.last_order_id))
    }

    async fn next_payment_id(&self) -> Result<PaymentId> {
        let mut state = self.state.write().await;
        state.last_payment_id += 1;
        Ok(PaymentId::new(state.last_payment_id))
    }

    async fn load_order(&self, order_id: OrderId) -> Result<Option<StoredOrder>> {
        let state = self.state.read().await;
        state
            .orders
            .get(&order_id)
            .map(|(version, doc)| -> Result<StoredOrder> {
                Ok(StoredOrder {
                    order: serde_json::from_value(doc.clone())?,
                    version: *version,
                })
            })
            .transpose()
    }

    async fn save_order(&self, order: &Order, expected: Version) -> Result<Version> {
        let doc = serde_json::to_value(order)?;
        let mut state = self.state.write().await;
        let version = state.check_version(order.id(), expected)?;
        state.orders.insert(order.id(), (version, doc));
        Ok(version)
    }

    async fn save_payment(&self, payment: &Payment) -> Result<()> {
        let doc = serde_json::to_value(payment)?;
        self.state.write().await.payments.insert(payment.id(), doc);
        Ok(())
    }

    async fn save_finalized(
        &self,
        order: &Order,
        expected: Version,
        payment: &Payment,
    ) -> Result<Version> {
        let order_doc = serde_json::to_value(order)?;
        let payment_doc = serde_json::to_value(payment)?;

        let mut state = self.state.write().await;
        let version = state.check_version(order.id(), expected)?;
        state.orders.insert(order.id(), (version, order_doc));
        state.payments.insert(payment.id(), payment_doc);
        Ok(version)
    }

    async fn load_payment(&self, payment_id: PaymentId) -> Result<Option<Payment>> {
        let state = self.state.read().await;
        state
            .payments
            .get(&payment_id)
            .map(|doc| serde_json::from_value(doc.clone()))
            .transpose()
            .map_err(StoreError::from)
    }

    async fn payments_for_order(&self, order_id: OrderId) -> Result<Vec<Payment>> {
        let state = self.state.read().await;
        let mut payments = state
            .payments
            .values()
            .map(|doc| serde_json::from_value::<Payment>(doc.clone()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        payments.retain(|p| p.order_id() == order_id);
        payments.sort_by_key(Payment::id);
        Ok(payments)
    }
}

#[cfg(test)]
mod tests {
    use common::CustomerId;
    use domain::{Cart, CashDetails, CatalogItem, Fulfillment, Money, Pricing};

    use super::*;

    fn order(id: OrderId) -> Order {
        let item = CatalogItem::new("SOUP", "Soup", Money::from_cents(650), "Starters").unwrap();
        let mut cart = Cart::new(CustomerId::new());
        cart.add_item(&item, 1, &[] as &[&str]).unwrap();
        Order::create(
            id,
            cart.customer_id(),
            &mut cart,
            Fulfillment::Pickup,
            &Pricing::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_sequential_ids() {
        let store = InMemoryOrderStore::new();
        assert_eq!(store.next_order_id().await.unwrap(), OrderId::new(1));
        assert_eq!(store.next_order_id().await.unwrap(), OrderId::new(2));
        assert_eq!(store.next_payment_id().await.unwrap(), PaymentId::new(1));
    }

    #[tokio::test]
    async fn test_save_and_load_order() {
        let store = InMemoryOrderStore::new();
        let order = order(OrderId::new(1));

        let version = store.save_order(&order, Version::initial()).await.unwrap();
        assert_eq!(version, Version::new(1));

        let loaded = store.load_order(order.id()).await.unwrap().unwrap();
        assert_eq!(loaded.order, order);
        assert_eq!(loaded.version, version);
        assert!(store.load_order(OrderId::new(2)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stale_version_conflicts() {
        let store = InMemoryOrderStore::new();
        let order = order(OrderId::new(1));
        store.save_order(&order, Version::initial()).await.unwrap();
        store.save_order(&order, Version::new(1)).await.unwrap();

        let result = store.save_order(&order, Version::new(1)).await;
        assert!(matches!(
            result,
            Err(StoreError::ConcurrencyConflict { expected, actual, .. })
                if expected == Version::new(1) && actual == Version::new(2)
        ));
    }

    #[tokio::test]
    async fn test_conflicting_finalize_stores_nothing() {
        let store = InMemoryOrderStore::new();
        let order = order(OrderId::new(1));
        store.save_order(&order, Version::initial()).await.unwrap();

        let payment = Payment::new(
            PaymentId::new(1),
            order.id(),
            order.customer_id(),
            order.total_amount(),
            CashDetails::new(Money::from_cents(1000)),
        )
        .unwrap();

        let result = store
            .save_finalized(&order, Version::initial(), &payment)
            .await;
        assert!(result.is_err());
        assert_eq!(store.payment_count().await, 0);
    }

    #[tokio::test]
    async fn test_payments_for_order() {
        let store = InMemoryOrderStore::new();
        let order = order(OrderId::new(1));

        for id in [2, 1] {
            let payment = Payment::new(
                PaymentId::new(id),
                order.id(),
                order.customer_id(),
                order.total_amount(),
                CashDetails::new(Money::from_cents(1000)),
            )
            .unwrap();
            store.save_payment(&payment).await.unwrap();
        }

        let payments = store.payments_for_order(order.id()).await.unwrap();
        let ids: Vec<_> = payments.iter().map(Payment::id).collect();
        assert_eq!(ids, [PaymentId::new(1), PaymentId::new(2)]);
        assert!(store.payments_for_order(OrderId::new(5)).await.unwrap().is_empty());
    }
}
