//! Domain error types.

use thiserror::Error;

use crate::cart::CartError;
use crate::catalog::CatalogError;
use crate::order::OrderError;
use crate::payment::PaymentError;

/// Broad classes of failure, for callers deciding how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad input at the call that introduced it; the user can correct it.
    Argument,

    /// The operation is not allowed in the current session state.
    State,

    /// Records disagree with each other (stale or tampered data).
    Consistency,

    /// The persistence collaborator failed.
    Storage,
}

impl ErrorKind {
    /// Returns true if retrying with corrected input can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Argument)
    }
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Argument
    }
}

impl CartError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Argument
    }
}

impl OrderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrderError::EmptyCart
            | OrderError::UnknownStatus(_)
            | OrderError::AmountOverflow(_) => ErrorKind::Argument,
            OrderError::CustomerMismatch { .. } => ErrorKind::Consistency,
            OrderError::InvalidTransition { .. } => ErrorKind::State,
        }
    }
}

impl PaymentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PaymentError::InvalidAmount { .. } => ErrorKind::Argument,
            PaymentError::AlreadyProcessed { .. }
            | PaymentError::InvalidTransition { .. }
            | PaymentError::UnsupportedOperation { .. } => ErrorKind::State,
        }
    }
}

/// Errors that can occur during domain operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Catalog(e) => e.kind(),
            DomainError::Cart(e) => e.kind(),
            DomainError::Order(e) => e.kind(),
            DomainError::Payment(e) => e.kind(),
        }
    }
}
