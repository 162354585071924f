//! Core-specific error types
//!
//! Comprehensive error taxonomy for ledger, token, order book, and
//! exchange operations. Every rejected operation aborts with no partial
//! state change, and each failure cause is a distinct variant so callers
//! can assert on cause rather than on mere failure.

use thiserror::Error;

/// Balance ledger errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient balance for {asset}: required {required}, available {available}")]
    InsufficientBalance {
        asset: String,
        required: String,
        available: String,
    },

    #[error("Amount must be non-negative")]
    InvalidAmount,

    #[error("Arithmetic overflow in balance calculation")]
    Overflow,
}

/// Fungible token errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Insufficient token balance: required {required}, available {available}")]
    InsufficientBalance { required: String, available: String },

    #[error("Insufficient allowance: required {required}, approved {approved}")]
    InsufficientAllowance { required: String, approved: String },

    #[error("Invalid recipient: the zero address")]
    InvalidRecipient,

    #[error("Amount must be non-negative")]
    InvalidAmount,

    #[error("Arithmetic overflow in token balance")]
    Overflow,
}

/// Order book errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookError {
    #[error("Order not found: {order_id}")]
    OrderNotFound { order_id: u64 },

    #[error("Unauthorized: caller is not the order's creator")]
    Unauthorized,

    #[error("Order already cancelled")]
    AlreadyCancelled,

    #[error("Order is cancelled")]
    OrderCancelled,

    #[error("Order already filled")]
    OrderAlreadyFilled,

    #[error("Amount must be non-negative")]
    InvalidAmount,
}

/// Exchange facade errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    #[error("Invalid asset for this operation: {asset}")]
    InvalidAsset { asset: String },

    #[error("Token transfer failed: {0}")]
    TransferFailed(#[from] TokenError),

    #[error("Direct native transfers are not accepted")]
    UnsupportedOperation,

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Order book error: {0}")]
    Book(#[from] BookError),
}
