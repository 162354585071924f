//! Escrow Exchange Core
//!
//! This crate implements the accounting and order-book core of a
//! custodial, multi-asset exchange: it escrows user balances of a native
//! base asset and fungible token assets, lets users post and cancel
//! priced orders against each other, and settles taker-initiated fills
//! with a proportional fee, atomically.
//!
//! # Modules
//! - `errors`: Error taxonomy for ledger, token, book, and exchange
//! - `events`: Notification records emitted by successful mutations
//! - `ledger`: Balance ledger — conservation and authorization on every debit/credit
//! - `token`: Fungible asset protocol and the in-memory reference token
//! - `book`: Append-only order store with cancel/fill status tracking
//! - `exchange`: Asset gateway and fill/fee engine facade
//!
//! # Version
//! v0.1.0 — initial implementation

pub mod book;
pub mod errors;
pub mod events;
pub mod exchange;
pub mod ledger;
pub mod token;

/// Core surface version — frozen after release
pub const CORE_VERSION: &str = "1.0.0";
