//! Console harness for restaurant checkout.
//!
//! Runs a scripted customer session against the checkout service and
//! renders the resulting receipt.

pub mod config;
pub mod error;
pub mod session;

use std::collections::HashMap;
use std::fmt;

use checkout::{CheckoutService, FinalizeOutcome, OrderStore};
use domain::{Cart, CatalogItem, CustomerId, Order, Payment, PaymentMethod};

pub use config::Config;
pub use error::{ConsoleError, Result};
pub use session::{PaymentAttempt, Session};

/// What a session produced.
#[derive(Debug, Clone)]
pub struct Receipt {
    pub order: Order,
    /// Every attempt made, in order.
    pub payments: Vec<Payment>,
    /// `None` when every attempt was declined.
    pub outcome: Option<FinalizeOutcome>,
}

impl Receipt {
    /// The attempt that was accepted, if any.
    pub fn accepted_payment(&self) -> Option<&Payment> {
        self.outcome.as_ref().and_then(|_| self.payments.last())
    }
}

impl fmt::Display for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let order = &self.order;
        writeln!(f, "Order {} ({})", order.id(), order.status())?;
        for line in order.lines() {
            write!(f, "  {} x{} @ {}", line.name, line.quantity, line.unit_price)?;
            if !line.customizations.is_empty() {
                write!(f, " [{}]", line.customizations.join(", "))?;
            }
            writeln!(f, " = {}", line.line_total())?;
        }
        writeln!(f, "  Subtotal:     {}", order.subtotal())?;
        writeln!(f, "  Tax:          {}", order.tax_amount())?;
        if let Some(address) = order.delivery_address() {
            writeln!(f, "  Delivery:     {} to {}", order.delivery_fee(), address)?;
        }
        writeln!(f, "  Total:        {}", order.total_amount())?;

        for payment in &self.payments {
            write!(f, "  {} {}: {}", payment.id(), payment.status(), payment.details())?;
            if let Some(reason) = payment.decline_reason() {
                write!(f, " (declined: {reason})")?;
            }
            writeln!(f)?;
        }

        match &self.outcome {
            Some(FinalizeOutcome::Paid) => writeln!(
                f,
                "Paid. Ready around {}",
                order.estimated_ready_at().format("%H:%M")
            ),
            Some(FinalizeOutcome::AwaitingClearance) => {
                writeln!(f, "Awaiting cheque clearance")
            }
            Some(FinalizeOutcome::Declined { .. }) | None => {
                writeln!(f, "No payment accepted; order is {}", order.payment_status())
            }
        }
    }
}

/// Places the session's order and pays for it.
///
/// Payment attempts are tried in order until one is not declined. An
/// argument error in a selection aborts the session before an order exists.
#[tracing::instrument(skip_all, fields(selections = session.selections.len()))]
pub async fn run_session<S: OrderStore>(
    service: &CheckoutService<S>,
    session: Session,
) -> Result<Receipt> {
    let catalog: HashMap<String, CatalogItem> = session
        .catalog_items()?
        .into_iter()
        .map(|item| (item.id().as_str().to_string(), item))
        .collect();

    let mut cart = Cart::new(session.customer_id.unwrap_or_else(CustomerId::new));
    for selection in &session.selections {
        let item = catalog
            .get(&selection.item_id)
            .ok_or_else(|| ConsoleError::UnknownItem(selection.item_id.clone()))?;
        cart.add_item(item, selection.quantity, selection.customizations.as_slice())?;
    }

    let mut order = service.place_order(&mut cart, session.fulfillment).await?;
    tracing::info!(order_id = %order.id(), total = %order.total_amount(), "order placed");

    let mut payments = Vec::new();
    for attempt in session.payments {
        let method = PaymentMethod::from(attempt);
        let receipt = service.pay(order.id(), method).await?;
        order = receipt.order;
        payments.push(receipt.payment);

        if let FinalizeOutcome::Declined { reason } = &receipt.outcome {
            tracing::warn!(order_id = %order.id(), %reason, "payment declined");
            continue;
        }
        return Ok(Receipt {
            order,
            payments,
            outcome: Some(receipt.outcome),
        });
    }

    tracing::warn!(order_id = %order.id(), attempts = payments.len(), "no payment accepted");
    Ok(Receipt {
        order,
        payments,
        outcome: None,
    })
}
