//! Unique identifier types for exchange entities
//!
//! Addresses identify every party the core interacts with: users, the
//! fee account, token contracts, and the exchange's own custody account.
//! Order ids are assigned sequentially by the order book and never reused.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identity of an account or contract.
///
/// The core never inspects the content beyond equality; the surrounding
/// system decides what an address looks like. A distinguished zero
/// address exists only so token transfers can reject it as a recipient.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Create an address from any string-like identity.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The zero address. Valid nowhere as a transfer or approval target.
    pub fn zero() -> Self {
        Self("0x0".to_string())
    }

    /// Check whether this is the zero address.
    pub fn is_zero(&self) -> bool {
        self.0 == "0x0"
    }

    /// Borrow the underlying identity string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Unique identifier for an order.
///
/// Ids are assigned sequentially starting at 1 by the order book and are
/// never reused, so they double as a creation-order index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(u64);

impl OrderId {
    /// Wrap a raw sequence number.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw sequence number.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for OrderId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}
