//! Balance Ledger — escrowed balances keyed by (asset, user)
//!
//! The ledger is a closed accounting system: every unit credited to one
//! party was either deposited from outside or debited from another party.
//! Nothing is created or destroyed internally, so for every asset the sum
//! of all balances equals the custody the gateway actually holds.
//!
//! Entries are created implicitly on first credit and never deleted; a
//! balance may reach zero and stay in the map.

use rust_decimal::Decimal;
use std::collections::HashMap;
use types::asset::AssetId;
use types::ids::Address;

use crate::errors::LedgerError;

/// Direction of a single ledger posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    Debit,
    Credit,
}

/// One leg of an atomic settlement: debit or credit `amount` of `asset`
/// on `account`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    pub asset: AssetId,
    pub account: Address,
    pub entry: EntryType,
    pub amount: Decimal,
}

impl Posting {
    pub fn debit(asset: AssetId, account: Address, amount: Decimal) -> Self {
        Self {
            asset,
            account,
            entry: EntryType::Debit,
            amount,
        }
    }

    pub fn credit(asset: AssetId, account: Address, amount: Decimal) -> Self {
        Self {
            asset,
            account,
            entry: EntryType::Credit,
            amount,
        }
    }
}

/// Escrowed balance store.
///
/// Balances are stored as `asset -> (user -> amount)`. All mutation goes
/// through `credit`/`debit`, which enforce non-negative amounts and
/// checked arithmetic; reads never fail and default to zero.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    balances: HashMap<AssetId, HashMap<Address, Decimal>>,
}

impl Ledger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self {
            balances: HashMap::new(),
        }
    }

    /// Increase `user`'s balance of `asset` by `amount`.
    ///
    /// Returns the new balance. Fails only on a negative amount or on
    /// arithmetic overflow (practically unreachable given asset supply
    /// bounds).
    pub fn credit(
        &mut self,
        asset: &AssetId,
        user: &Address,
        amount: Decimal,
    ) -> Result<Decimal, LedgerError> {
        if amount.is_sign_negative() {
            return Err(LedgerError::InvalidAmount);
        }

        let balance = self
            .balances
            .entry(asset.clone())
            .or_default()
            .entry(user.clone())
            .or_insert(Decimal::ZERO);

        *balance = balance.checked_add(amount).ok_or(LedgerError::Overflow)?;
        Ok(*balance)
    }

    /// Decrease `user`'s balance of `asset` by `amount`.
    ///
    /// Returns the new balance. Fails with `InsufficientBalance` when
    /// `amount` exceeds the current balance; the balance is untouched on
    /// failure.
    pub fn debit(
        &mut self,
        asset: &AssetId,
        user: &Address,
        amount: Decimal,
    ) -> Result<Decimal, LedgerError> {
        if amount.is_sign_negative() {
            return Err(LedgerError::InvalidAmount);
        }

        let available = self.balance_of(asset, user);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                asset: asset.to_string(),
                required: amount.to_string(),
                available: available.to_string(),
            });
        }

        let balance = self
            .balances
            .entry(asset.clone())
            .or_default()
            .entry(user.clone())
            .or_insert(Decimal::ZERO);

        *balance = balance.checked_sub(amount).ok_or(LedgerError::Overflow)?;
        Ok(*balance)
    }

    /// Current balance of `(asset, user)`. Zero for unknown pairs.
    pub fn balance_of(&self, asset: &AssetId, user: &Address) -> Decimal {
        self.balances
            .get(asset)
            .and_then(|holders| holders.get(user))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Sum of all balances for `asset`, used by conservation audits.
    pub fn total_for(&self, asset: &AssetId) -> Decimal {
        self.balances
            .get(asset)
            .map(|holders| holders.values().copied().sum())
            .unwrap_or(Decimal::ZERO)
    }

    /// Verify a credit would succeed without performing it.
    ///
    /// Multi-step operations call this before their first mutation so the
    /// commit phase cannot fail halfway through.
    pub fn ensure_can_credit(
        &self,
        asset: &AssetId,
        user: &Address,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        if amount.is_sign_negative() {
            return Err(LedgerError::InvalidAmount);
        }
        self.balance_of(asset, user)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    /// Apply a batch of postings atomically: either every posting takes
    /// effect or none does.
    ///
    /// The net effect per `(asset, account)` pair is computed first and
    /// validated against current balances, so postings that debit and
    /// credit the same pair (a taker filling their own order, a fee
    /// account that is also a party) settle by their combined effect
    /// rather than by statement order.
    pub fn post_atomic(&mut self, postings: &[Posting]) -> Result<(), LedgerError> {
        let mut net: Vec<((AssetId, Address), Decimal)> = Vec::with_capacity(postings.len());

        for posting in postings {
            if posting.amount.is_sign_negative() {
                return Err(LedgerError::InvalidAmount);
            }
            let signed = match posting.entry {
                EntryType::Debit => -posting.amount,
                EntryType::Credit => posting.amount,
            };
            let key = (posting.asset.clone(), posting.account.clone());
            match net.iter_mut().find(|(k, _)| *k == key) {
                Some((_, delta)) => {
                    *delta = delta.checked_add(signed).ok_or(LedgerError::Overflow)?
                }
                None => net.push((key, signed)),
            }
        }

        // Validate every pair before mutating any
        for ((asset, account), delta) in &net {
            let current = self.balance_of(asset, account);
            let settled = current.checked_add(*delta).ok_or(LedgerError::Overflow)?;
            if settled < Decimal::ZERO {
                return Err(LedgerError::InsufficientBalance {
                    asset: asset.to_string(),
                    required: (-*delta).to_string(),
                    available: current.to_string(),
                });
            }
        }

        for ((asset, account), delta) in net {
            let settled = self.balance_of(&asset, &account) + delta;
            self.balances
                .entry(asset)
                .or_default()
                .insert(account, settled);
        }
        Ok(())
    }

    /// Verify a debit would succeed without performing it.
    pub fn ensure_can_debit(
        &self,
        asset: &AssetId,
        user: &Address,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        if amount.is_sign_negative() {
            return Err(LedgerError::InvalidAmount);
        }
        let available = self.balance_of(asset, user);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                asset: asset.to_string(),
                required: amount.to_string(),
                available: available.to_string(),
            });
        }
        Ok(())
    }
}
