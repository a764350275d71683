//! Commerce error types.

use thiserror::Error;

use ironmonger_core::PriceError;

use crate::db::RepositoryError;

/// Errors that can occur during cart, order, address and wishlist operations.
#[derive(Debug, Error)]
pub enum CommerceError {
    /// Missing or malformed input.
    #[error("{0}")]
    InvalidInput(String),

    /// Referenced entity is absent or not owned by the caller.
    #[error("{0}")]
    NotFound(String),

    /// Not enough units on hand.
    #[error("insufficient stock for {product}")]
    InsufficientStock { product: String },

    /// Entry already present.
    #[error("{0}")]
    AlreadyExists(String),

    /// Privileged operation attempted by a regular shopper.
    #[error("{0}")]
    Forbidden(String),

    /// Operation not valid in the aggregate's current state.
    #[error("{0}")]
    InvalidState(String),

    /// The order commit failed part way; the order is kept but marked failed
    /// or, if only cart clearing failed, left pending.
    #[error("order commit failed: {0}")]
    CommitFailed(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl CommerceError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

impl From<PriceError> for CommerceError {
    fn from(err: PriceError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}
