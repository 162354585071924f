//! Fungible asset protocol and reference token
//!
//! The gateway never assumes a concrete token implementation: it moves
//! token assets through the `FungibleAsset` trait, the same
//! transfer/approve/balance surface an external token contract exposes.
//! `Token` is the in-memory implementation used by tests and the
//! simulation driver — full supply minted to the deployer, allowance-based
//! delegated transfers, and rejection of the zero address.
//!
//! Caller identity (`from`, `owner`, `spender`) is passed explicitly;
//! the surrounding execution environment is what attests it.

use rust_decimal::Decimal;
use std::collections::HashMap;
use types::ids::Address;

use crate::errors::TokenError;
use crate::events::{Approval, TokenEvent, Transfer};

/// The transfer/approve/balance surface of a fungible asset contract.
///
/// Semantics mirror the standard fungible-token protocol: `transfer`
/// moves the holder's own balance, `approve` grants a spender a
/// delegated allowance, and `transfer_from` spends that allowance.
/// Implementations revert (return `Err`) on any invalid transfer and
/// leave state unchanged.
pub trait FungibleAsset {
    /// The contract's own address; doubles as the token's asset identity.
    fn address(&self) -> &Address;

    fn name(&self) -> &str;

    fn symbol(&self) -> &str;

    /// Decimal places documented by the asset.
    fn decimals(&self) -> u32;

    fn total_supply(&self) -> Decimal;

    /// Balance of `owner`. Zero for unknown holders.
    fn balance_of(&self, owner: &Address) -> Decimal;

    /// Remaining allowance `spender` may move out of `owner`'s balance.
    fn allowance(&self, owner: &Address, spender: &Address) -> Decimal;

    /// Move `amount` from `from`'s balance to `to`.
    fn transfer(&mut self, from: &Address, to: &Address, amount: Decimal)
        -> Result<(), TokenError>;

    /// Grant `spender` an allowance of `amount` over `owner`'s balance.
    fn approve(
        &mut self,
        owner: &Address,
        spender: &Address,
        amount: Decimal,
    ) -> Result<(), TokenError>;

    /// As `spender`, move `amount` from `owner`'s balance to `to`,
    /// consuming allowance.
    fn transfer_from(
        &mut self,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: Decimal,
    ) -> Result<(), TokenError>;
}

/// In-memory fungible token with standard semantics.
#[derive(Debug, Clone)]
pub struct Token {
    address: Address,
    name: String,
    symbol: String,
    decimals: u32,
    total_supply: Decimal,
    balances: HashMap<Address, Decimal>,
    allowances: HashMap<(Address, Address), Decimal>,
    /// Emitted events log (append-only)
    events: Vec<TokenEvent>,
}

impl Token {
    /// Deploy a token, minting the entire supply to `deployer`.
    pub fn new(
        address: Address,
        name: impl Into<String>,
        symbol: impl Into<String>,
        decimals: u32,
        total_supply: Decimal,
        deployer: &Address,
    ) -> Self {
        let mut balances = HashMap::new();
        balances.insert(deployer.clone(), total_supply);
        Self {
            address,
            name: name.into(),
            symbol: symbol.into(),
            decimals,
            total_supply,
            balances,
            allowances: HashMap::new(),
            events: Vec::new(),
        }
    }

    /// Get all emitted events.
    pub fn events(&self) -> &[TokenEvent] {
        &self.events
    }

    /// Drain all events (consume and clear).
    pub fn drain_events(&mut self) -> Vec<TokenEvent> {
        std::mem::take(&mut self.events)
    }

    /// Validate and perform the balance move shared by `transfer` and
    /// `transfer_from`. State is untouched when validation fails.
    fn move_balance(
        &mut self,
        from: &Address,
        to: &Address,
        amount: Decimal,
    ) -> Result<(), TokenError> {
        if amount.is_sign_negative() {
            return Err(TokenError::InvalidAmount);
        }
        if to.is_zero() {
            return Err(TokenError::InvalidRecipient);
        }

        let available = self.balance_of(from);
        if available < amount {
            return Err(TokenError::InsufficientBalance {
                required: amount.to_string(),
                available: available.to_string(),
            });
        }

        // Overflow is checked before the first mutation; the recipient
        // balance is re-read after the debit so a self-transfer nets out
        // instead of double-counting.
        self.balance_of(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        self.balances.insert(from.clone(), available - amount);
        let received = self.balance_of(to) + amount;
        self.balances.insert(to.clone(), received);

        self.events.push(TokenEvent::Transfer(Transfer {
            from: from.clone(),
            to: to.clone(),
            value: amount,
        }));
        Ok(())
    }
}

impl FungibleAsset for Token {
    fn address(&self) -> &Address {
        &self.address
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn decimals(&self) -> u32 {
        self.decimals
    }

    fn total_supply(&self) -> Decimal {
        self.total_supply
    }

    fn balance_of(&self, owner: &Address) -> Decimal {
        self.balances.get(owner).copied().unwrap_or(Decimal::ZERO)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> Decimal {
        self.allowances
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: Decimal,
    ) -> Result<(), TokenError> {
        self.move_balance(from, to, amount)
    }

    fn approve(
        &mut self,
        owner: &Address,
        spender: &Address,
        amount: Decimal,
    ) -> Result<(), TokenError> {
        if amount.is_sign_negative() {
            return Err(TokenError::InvalidAmount);
        }
        if spender.is_zero() {
            return Err(TokenError::InvalidRecipient);
        }

        self.allowances
            .insert((owner.clone(), spender.clone()), amount);

        self.events.push(TokenEvent::Approval(Approval {
            owner: owner.clone(),
            spender: spender.clone(),
            value: amount,
        }));
        Ok(())
    }

    fn transfer_from(
        &mut self,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: Decimal,
    ) -> Result<(), TokenError> {
        if amount.is_sign_negative() {
            return Err(TokenError::InvalidAmount);
        }

        let approved = self.allowance(owner, spender);
        if approved < amount {
            return Err(TokenError::InsufficientAllowance {
                required: amount.to_string(),
                approved: approved.to_string(),
            });
        }

        // Allowance is consumed only after the move succeeds
        self.move_balance(owner, to, amount)?;
        self.allowances
            .insert((owner.clone(), spender.clone()), approved - amount);
        Ok(())
    }
}
