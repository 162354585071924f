//! Order Book — append-only store of standing offers
//!
//! Orders are immutable once stored; the only mutable state is a pair of
//! one-shot flags tracked out-of-band: cancelled and filled. An order can
//! be cancelled only while unfilled and filled only while uncancelled,
//! and each transition happens at most once.
//!
//! Posting an order moves no balances and performs no balance check —
//! an offer is advisory and enforcement happens at fill time, so a user
//! may post an order they cannot currently cover.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use types::asset::AssetId;
use types::ids::{Address, OrderId};

use crate::errors::BookError;

/// A standing offer: the creator wants `amount_get` of `token_get` and
/// gives `amount_give` of `token_give` in return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user: Address,
    pub token_get: AssetId,
    pub amount_get: Decimal,
    pub token_give: AssetId,
    pub amount_give: Decimal,
    /// Creation time (Unix seconds), immutable.
    pub timestamp: i64,
}

/// Append-only order store with cancel/fill status tracking.
///
/// Ids are assigned sequentially starting at 1 and never reused; orders
/// are never deleted.
#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    orders: BTreeMap<OrderId, Order>,
    /// Last assigned id.
    order_count: u64,
    cancelled: HashSet<OrderId>,
    filled: HashSet<OrderId>,
}

impl OrderBook {
    /// Create an empty book.
    pub fn new() -> Self {
        Self {
            orders: BTreeMap::new(),
            order_count: 0,
            cancelled: HashSet::new(),
            filled: HashSet::new(),
        }
    }

    /// Append a new order and return it.
    ///
    /// Assigns the next sequential id. Amounts must be non-negative;
    /// zero amounts are accepted (a zero fill is a legal no-op).
    pub fn place(
        &mut self,
        user: Address,
        token_get: AssetId,
        amount_get: Decimal,
        token_give: AssetId,
        amount_give: Decimal,
        timestamp: i64,
    ) -> Result<&Order, BookError> {
        if amount_get.is_sign_negative() || amount_give.is_sign_negative() {
            return Err(BookError::InvalidAmount);
        }

        self.order_count += 1;
        let id = OrderId::new(self.order_count);
        let order = Order {
            id,
            user,
            token_get,
            amount_get,
            token_give,
            amount_give,
            timestamp,
        };

        self.orders.insert(id, order);
        Ok(&self.orders[&id])
    }

    /// Look up an order by id.
    pub fn get(&self, id: OrderId) -> Result<&Order, BookError> {
        self.orders.get(&id).ok_or(BookError::OrderNotFound {
            order_id: id.value(),
        })
    }

    /// Cancel an order on behalf of `user`.
    ///
    /// Only the creator may cancel, each order cancels at most once, and
    /// a filled order can no longer be cancelled. Returns the cancelled
    /// order.
    pub fn cancel(&mut self, id: OrderId, user: &Address) -> Result<&Order, BookError> {
        let order = self.orders.get(&id).ok_or(BookError::OrderNotFound {
            order_id: id.value(),
        })?;

        if order.user != *user {
            return Err(BookError::Unauthorized);
        }
        if self.cancelled.contains(&id) {
            return Err(BookError::AlreadyCancelled);
        }
        if self.filled.contains(&id) {
            return Err(BookError::OrderAlreadyFilled);
        }

        self.cancelled.insert(id);
        Ok(order)
    }

    /// Verify an order can be filled: it exists, is not cancelled, and is
    /// not already filled. Returns the order without changing any state.
    pub fn ensure_fillable(&self, id: OrderId) -> Result<&Order, BookError> {
        let order = self.get(id)?;
        if self.cancelled.contains(&id) {
            return Err(BookError::OrderCancelled);
        }
        if self.filled.contains(&id) {
            return Err(BookError::OrderAlreadyFilled);
        }
        Ok(order)
    }

    /// Mark an order filled. One-shot: a second call fails.
    pub fn mark_filled(&mut self, id: OrderId) -> Result<&Order, BookError> {
        self.ensure_fillable(id)?;
        self.filled.insert(id);
        self.get(id)
    }

    /// Last assigned order id.
    pub fn order_count(&self) -> u64 {
        self.order_count
    }

    pub fn is_cancelled(&self, id: OrderId) -> bool {
        self.cancelled.contains(&id)
    }

    pub fn is_filled(&self, id: OrderId) -> bool {
        self.filled.contains(&id)
    }

    /// Orders that are neither cancelled nor filled, in id order.
    pub fn open_orders(&self) -> impl Iterator<Item = &Order> {
        self.orders
            .values()
            .filter(|order| !self.cancelled.contains(&order.id) && !self.filled.contains(&order.id))
    }
}
