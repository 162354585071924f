//! Notification records
//!
//! Events are immutable records appended by successful mutating calls —
//! exactly one per call. Components keep their own append-only log,
//! readable via `events()` and consumable via `drain_events()`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::asset::AssetId;
use types::ids::{Address, OrderId};

/// Asset credited to a user's ledger balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    pub asset: AssetId,
    pub user: Address,
    pub amount: Decimal,
    /// Ledger balance after the credit
    pub balance: Decimal,
}

/// Asset debited from a user's ledger balance and released
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdraw {
    pub asset: AssetId,
    pub user: Address,
    pub amount: Decimal,
    /// Ledger balance after the debit
    pub balance: Decimal,
}

/// Standing order appended to the book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPlaced {
    pub id: OrderId,
    pub user: Address,
    pub token_get: AssetId,
    pub amount_get: Decimal,
    pub token_give: AssetId,
    pub amount_give: Decimal,
    pub timestamp: i64,
}

/// Order withdrawn by its creator before any fill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancelled {
    pub id: OrderId,
    pub user: Address,
    pub token_get: AssetId,
    pub amount_get: Decimal,
    pub token_give: AssetId,
    pub amount_give: Decimal,
    /// Cancellation time, not the order's creation time
    pub timestamp: i64,
}

/// Order filled in full by a taker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub id: OrderId,
    /// Order creator
    pub maker: Address,
    /// Filling counterparty, charged the fee
    pub taker: Address,
    pub token_get: AssetId,
    pub amount_get: Decimal,
    pub token_give: AssetId,
    pub amount_give: Decimal,
    /// Fee paid by the taker in `token_get` units
    pub fee: Decimal,
    pub timestamp: i64,
}

/// Enum wrapper for all exchange events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExchangeEvent {
    Deposit(Deposit),
    Withdraw(Withdraw),
    OrderPlaced(OrderPlaced),
    OrderCancelled(OrderCancelled),
    Trade(Trade),
}

/// Token balance moved between holders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: Address,
    pub to: Address,
    pub value: Decimal,
}

/// Spending allowance granted to a delegate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approval {
    pub owner: Address,
    pub spender: Address,
    pub value: Decimal,
}

/// Enum wrapper for all token events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenEvent {
    Transfer(Transfer),
    Approval(Approval),
}
