//! Harness error types.

use std::path::PathBuf;

use checkout::CheckoutError;
use domain::{CartError, CatalogError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("failed to read session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed session: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("selection refers to unknown item {0}")]
    UnknownItem(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),
}

pub type Result<T> = std::result::Result<T, ConsoleError>;
