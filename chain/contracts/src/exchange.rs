//! Exchange facade — asset gateway and fill/fee engine
//!
//! The exchange owns the balance ledger, the order book, and the fee
//! schedule, and exposes the public operation surface: deposit and
//! withdraw (native and token), make/cancel order, and taker-initiated
//! fills. Every mutating operation is all-or-nothing and appends exactly
//! one event on success.
//!
//! Mutation goes through `&mut self`, so operations can never interleave;
//! the one ordering discipline that matters is inside withdrawals, where
//! the ledger debit precedes the external release so no caller can ever
//! observe a stale, not-yet-decremented balance.

use rust_decimal::Decimal;
use types::asset::AssetId;
use types::ids::{Address, OrderId};

use crate::book::{Order, OrderBook};
use crate::errors::{ExchangeError, LedgerError};
use crate::events::{
    Deposit, ExchangeEvent, OrderCancelled, OrderPlaced, Trade, Withdraw,
};
use crate::ledger::{Ledger, Posting};
use crate::token::FungibleAsset;

/// Fee configuration, set once at construction and immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeSchedule {
    /// Account credited with every fill fee.
    pub fee_account: Address,
    /// Percentage of the taker's payment charged as the fee. Values of
    /// 100 or more are legal configuration: every nonzero fill then fails
    /// on the fee-inflated taker debit.
    pub fee_percent: u32,
}

impl FeeSchedule {
    pub fn new(fee_account: Address, fee_percent: u32) -> Self {
        Self {
            fee_account,
            fee_percent,
        }
    }

    /// Fee on a taker payment: `amount * fee_percent / 100`, truncated to
    /// base units. `None` on arithmetic overflow.
    pub fn fee_for(&self, amount: Decimal) -> Option<Decimal> {
        amount
            .checked_mul(Decimal::from(self.fee_percent))?
            .checked_div(Decimal::ONE_HUNDRED)
            .map(|fee| fee.trunc())
    }
}

/// Custodial escrow exchange.
#[derive(Debug)]
pub struct Exchange {
    /// The exchange's own address — the custody account on token
    /// contracts and the spender users approve before token deposits.
    address: Address,
    ledger: Ledger,
    book: OrderBook,
    fees: FeeSchedule,
    /// Native value held in custody; moves in lockstep with the ledger's
    /// native total.
    native_custody: Decimal,
    /// Emitted events log (append-only)
    events: Vec<ExchangeEvent>,
}

impl Exchange {
    /// Create an exchange with its custody address and fee schedule.
    pub fn new(address: Address, fees: FeeSchedule) -> Self {
        Self {
            address,
            ledger: Ledger::new(),
            book: OrderBook::new(),
            fees,
            native_custody: Decimal::ZERO,
            events: Vec::new(),
        }
    }

    // ───────────────────────── Deposits ─────────────────────────

    /// Deposit native value for `user`.
    ///
    /// `amount` is the value attached to the call itself, which the
    /// execution environment attests; it cannot be forged by the caller.
    pub fn deposit_native(
        &mut self,
        user: &Address,
        amount: Decimal,
    ) -> Result<ExchangeEvent, ExchangeError> {
        self.ledger
            .ensure_can_credit(&AssetId::Native, user, amount)?;
        self.native_custody = self
            .native_custody
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        let balance = self.ledger.credit(&AssetId::Native, user, amount)?;

        let event = ExchangeEvent::Deposit(Deposit {
            asset: AssetId::Native,
            user: user.clone(),
            amount,
            balance,
        });
        self.events.push(event.clone());
        Ok(event)
    }

    /// Reject native value sent outside `deposit_native`.
    ///
    /// There is no implicit deposit path; un-routed transfers would
    /// strand value the ledger never accounts for.
    pub fn receive_native(
        &mut self,
        _from: &Address,
        _amount: Decimal,
    ) -> Result<ExchangeEvent, ExchangeError> {
        Err(ExchangeError::UnsupportedOperation)
    }

    /// Deposit `amount` of the token asset `asset` for `user`.
    ///
    /// Pulls the tokens from `user` into exchange custody through the
    /// token's allowance protocol; the user must have approved the
    /// exchange beforehand. Rejects the native sentinel and a token
    /// handle that does not match `asset`.
    pub fn deposit_token(
        &mut self,
        asset: &AssetId,
        token: &mut dyn FungibleAsset,
        user: &Address,
        amount: Decimal,
    ) -> Result<ExchangeEvent, ExchangeError> {
        self.ensure_token_asset(asset, token)?;

        // Verified up front so the credit cannot fail after the pull
        self.ledger.ensure_can_credit(asset, user, amount)?;

        let custody = self.address.clone();
        token.transfer_from(&custody, user, &custody, amount)?;
        let balance = self.ledger.credit(asset, user, amount)?;

        let event = ExchangeEvent::Deposit(Deposit {
            asset: asset.clone(),
            user: user.clone(),
            amount,
            balance,
        });
        self.events.push(event.clone());
        Ok(event)
    }

    // ───────────────────────── Withdrawals ─────────────────────────

    /// Withdraw native value to `user`.
    pub fn withdraw_native(
        &mut self,
        user: &Address,
        amount: Decimal,
    ) -> Result<ExchangeEvent, ExchangeError> {
        // Debit precedes the release: a stale balance must never be
        // observable once value has left custody.
        let balance = self.ledger.debit(&AssetId::Native, user, amount)?;
        self.native_custody = self
            .native_custody
            .checked_sub(amount)
            .ok_or(LedgerError::Overflow)?;

        let event = ExchangeEvent::Withdraw(Withdraw {
            asset: AssetId::Native,
            user: user.clone(),
            amount,
            balance,
        });
        self.events.push(event.clone());
        Ok(event)
    }

    /// Withdraw `amount` of the token asset `asset` to `user`.
    pub fn withdraw_token(
        &mut self,
        asset: &AssetId,
        token: &mut dyn FungibleAsset,
        user: &Address,
        amount: Decimal,
    ) -> Result<ExchangeEvent, ExchangeError> {
        self.ensure_token_asset(asset, token)?;

        // Debit first, then release
        let balance = self.ledger.debit(asset, user, amount)?;
        if let Err(refusal) = token.transfer(&self.address, user, amount) {
            // No transactional revert here: restore the debit before
            // surfacing the token's refusal. The restore cannot fail —
            // it returns exactly what was just debited.
            self.ledger.credit(asset, user, amount)?;
            return Err(ExchangeError::TransferFailed(refusal));
        }

        let event = ExchangeEvent::Withdraw(Withdraw {
            asset: asset.clone(),
            user: user.clone(),
            amount,
            balance,
        });
        self.events.push(event.clone());
        Ok(event)
    }

    // ───────────────────────── Orders ─────────────────────────

    /// Post a standing order for `user`.
    ///
    /// No balance is checked or moved at creation time; the offer only
    /// constrains the creator when somebody fills it.
    pub fn make_order(
        &mut self,
        user: &Address,
        token_get: AssetId,
        amount_get: Decimal,
        token_give: AssetId,
        amount_give: Decimal,
        current_time: i64,
    ) -> Result<ExchangeEvent, ExchangeError> {
        let order = self.book.place(
            user.clone(),
            token_get,
            amount_get,
            token_give,
            amount_give,
            current_time,
        )?;

        let event = ExchangeEvent::OrderPlaced(OrderPlaced {
            id: order.id,
            user: order.user.clone(),
            token_get: order.token_get.clone(),
            amount_get: order.amount_get,
            token_give: order.token_give.clone(),
            amount_give: order.amount_give,
            timestamp: order.timestamp,
        });
        self.events.push(event.clone());
        Ok(event)
    }

    /// Cancel order `id` on behalf of `user`.
    pub fn cancel_order(
        &mut self,
        id: OrderId,
        user: &Address,
        current_time: i64,
    ) -> Result<ExchangeEvent, ExchangeError> {
        let order = self.book.cancel(id, user)?.clone();

        let event = ExchangeEvent::OrderCancelled(OrderCancelled {
            id: order.id,
            user: order.user,
            token_get: order.token_get,
            amount_get: order.amount_get,
            token_give: order.token_give,
            amount_give: order.amount_give,
            timestamp: current_time,
        });
        self.events.push(event.clone());
        Ok(event)
    }

    // ───────────────────────── Fills ─────────────────────────

    /// Fill order `id` in full as `taker`.
    ///
    /// The taker pays `amount_get` plus the fee in `token_get`; the maker
    /// pays `amount_give` in `token_give`; the fee account collects the
    /// fee. Maker funding is checked here, not at posting time. All five
    /// ledger movements settle atomically.
    pub fn fill_order(
        &mut self,
        id: OrderId,
        taker: &Address,
        current_time: i64,
    ) -> Result<ExchangeEvent, ExchangeError> {
        let order = self.book.ensure_fillable(id)?.clone();

        let fee = self
            .fees
            .fee_for(order.amount_get)
            .ok_or(LedgerError::Overflow)?;
        let taker_charge = order
            .amount_get
            .checked_add(fee)
            .ok_or(LedgerError::Overflow)?;

        self.ledger.post_atomic(&[
            Posting::debit(order.token_get.clone(), taker.clone(), taker_charge),
            Posting::debit(
                order.token_give.clone(),
                order.user.clone(),
                order.amount_give,
            ),
            Posting::credit(
                order.token_get.clone(),
                order.user.clone(),
                order.amount_get,
            ),
            Posting::credit(order.token_give.clone(), taker.clone(), order.amount_give),
            Posting::credit(
                order.token_get.clone(),
                self.fees.fee_account.clone(),
                fee,
            ),
        ])?;
        self.book.mark_filled(id)?;

        let event = ExchangeEvent::Trade(Trade {
            id: order.id,
            maker: order.user,
            taker: taker.clone(),
            token_get: order.token_get,
            amount_get: order.amount_get,
            token_give: order.token_give,
            amount_give: order.amount_give,
            fee,
            timestamp: current_time,
        });
        self.events.push(event.clone());
        Ok(event)
    }

    // ───────────────────────── Queries ─────────────────────────

    /// The exchange's custody address.
    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn fee_account(&self) -> &Address {
        &self.fees.fee_account
    }

    pub fn fee_percent(&self) -> u32 {
        self.fees.fee_percent
    }

    /// Ledger balance of `(asset, user)`. Zero for unknown pairs.
    pub fn balance_of(&self, asset: &AssetId, user: &Address) -> Decimal {
        self.ledger.balance_of(asset, user)
    }

    /// Sum of all ledger balances for `asset` (conservation audits).
    pub fn ledger_total(&self, asset: &AssetId) -> Decimal {
        self.ledger.total_for(asset)
    }

    /// Native value currently held in custody.
    pub fn native_custody(&self) -> Decimal {
        self.native_custody
    }

    pub fn order(&self, id: OrderId) -> Result<&Order, ExchangeError> {
        Ok(self.book.get(id)?)
    }

    /// Last assigned order id.
    pub fn order_count(&self) -> u64 {
        self.book.order_count()
    }

    pub fn is_cancelled(&self, id: OrderId) -> bool {
        self.book.is_cancelled(id)
    }

    pub fn is_filled(&self, id: OrderId) -> bool {
        self.book.is_filled(id)
    }

    /// Orders that are neither cancelled nor filled, in id order.
    pub fn open_orders(&self) -> impl Iterator<Item = &Order> {
        self.book.open_orders()
    }

    // ───────────────────────── Events ─────────────────────────

    /// Get all emitted events.
    pub fn events(&self) -> &[ExchangeEvent] {
        &self.events
    }

    /// Drain all events (consume and clear).
    pub fn drain_events(&mut self) -> Vec<ExchangeEvent> {
        std::mem::take(&mut self.events)
    }

    // ───────────────────────── Internal Guards ─────────────────────────

    /// A token operation must name a token asset, and the supplied
    /// collaborator must be that token.
    fn ensure_token_asset(
        &self,
        asset: &AssetId,
        token: &dyn FungibleAsset,
    ) -> Result<(), ExchangeError> {
        match asset.token_address() {
            Some(addr) if addr == token.address() => Ok(()),
            _ => Err(ExchangeError::InvalidAsset {
                asset: asset.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{BookError, TokenError};
    use crate::token::Token;
    use types::units;

    const T0: i64 = 1_700_000_000;

    fn alice() -> Address {
        Address::new("alice")
    }

    fn bob() -> Address {
        Address::new("bob")
    }

    fn dapp_asset() -> AssetId {
        AssetId::token(Address::new("0xDA99"))
    }

    fn setup_exchange() -> Exchange {
        Exchange::new(
            Address::new("0xE0"),
            FeeSchedule::new(Address::new("fees"), 10),
        )
    }

    /// Token with 100 whole units already in alice's and bob's hands.
    fn setup_token() -> Token {
        let deployer = Address::new("deployer");
        let mut token = Token::new(
            Address::new("0xDA99"),
            "Escrow Token",
            "ESC",
            18,
            units::whole(1_000_000),
            &deployer,
        );
        token.transfer(&deployer, &alice(), units::whole(100)).unwrap();
        token.transfer(&deployer, &bob(), units::whole(100)).unwrap();
        token
    }

    // ─── Construction ───

    #[test]
    fn test_tracks_fee_schedule() {
        let exchange = setup_exchange();
        assert_eq!(exchange.fee_account(), &Address::new("fees"));
        assert_eq!(exchange.fee_percent(), 10);
    }

    // ─── Native deposits ───

    #[test]
    fn test_deposit_native_credits_ledger_and_custody() {
        let mut exchange = setup_exchange();
        exchange.deposit_native(&alice(), units::whole(1)).unwrap();

        assert_eq!(
            exchange.balance_of(&AssetId::Native, &alice()),
            units::whole(1)
        );
        assert_eq!(exchange.native_custody(), units::whole(1));
    }

    #[test]
    fn test_deposit_native_event() {
        let mut exchange = setup_exchange();
        let event = exchange.deposit_native(&alice(), units::whole(1)).unwrap();
        assert_eq!(
            event,
            ExchangeEvent::Deposit(Deposit {
                asset: AssetId::Native,
                user: alice(),
                amount: units::whole(1),
                balance: units::whole(1),
            })
        );
        assert_eq!(exchange.events().len(), 1);
    }

    #[test]
    fn test_receive_native_rejected() {
        let mut exchange = setup_exchange();
        let result = exchange.receive_native(&alice(), units::whole(1));
        assert_eq!(result.err(), Some(ExchangeError::UnsupportedOperation));
        assert_eq!(exchange.native_custody(), Decimal::ZERO);
    }

    // ─── Token deposits ───

    #[test]
    fn test_deposit_token_pulls_and_credits() {
        let mut exchange = setup_exchange();
        let mut token = setup_token();
        token
            .approve(&alice(), exchange.address(), units::whole(10))
            .unwrap();

        exchange
            .deposit_token(&dapp_asset(), &mut token, &alice(), units::whole(10))
            .unwrap();

        assert_eq!(
            exchange.balance_of(&dapp_asset(), &alice()),
            units::whole(10)
        );
        assert_eq!(token.balance_of(exchange.address()), units::whole(10));
        assert_eq!(token.balance_of(&alice()), units::whole(90));
    }

    #[test]
    fn test_deposit_token_rejects_native_sentinel() {
        let mut exchange = setup_exchange();
        let mut token = setup_token();
        let result =
            exchange.deposit_token(&AssetId::Native, &mut token, &alice(), units::whole(10));
        assert!(matches!(result, Err(ExchangeError::InvalidAsset { .. })));
    }

    #[test]
    fn test_deposit_token_rejects_mismatched_handle() {
        let mut exchange = setup_exchange();
        let mut token = setup_token();
        let other = AssetId::token(Address::new("0xBEEF"));
        let result = exchange.deposit_token(&other, &mut token, &alice(), units::whole(10));
        assert!(matches!(result, Err(ExchangeError::InvalidAsset { .. })));
    }

    #[test]
    fn test_deposit_token_without_approval() {
        let mut exchange = setup_exchange();
        let mut token = setup_token();
        let result =
            exchange.deposit_token(&dapp_asset(), &mut token, &alice(), units::whole(10));
        assert!(matches!(
            result,
            Err(ExchangeError::TransferFailed(
                TokenError::InsufficientAllowance { .. }
            ))
        ));
        // Nothing moved, nothing credited
        assert_eq!(exchange.balance_of(&dapp_asset(), &alice()), Decimal::ZERO);
        assert_eq!(token.balance_of(&alice()), units::whole(100));
    }

    // ─── Native withdrawals ───

    #[test]
    fn test_withdraw_native_roundtrip() {
        let mut exchange = setup_exchange();
        exchange.deposit_native(&alice(), units::whole(1)).unwrap();
        exchange.withdraw_native(&alice(), units::whole(1)).unwrap();

        assert_eq!(exchange.balance_of(&AssetId::Native, &alice()), Decimal::ZERO);
        assert_eq!(exchange.native_custody(), Decimal::ZERO);
    }

    #[test]
    fn test_withdraw_native_insufficient() {
        let mut exchange = setup_exchange();
        exchange.deposit_native(&alice(), units::whole(1)).unwrap();
        let result = exchange.withdraw_native(&alice(), units::whole(2));
        assert!(matches!(
            result,
            Err(ExchangeError::Ledger(LedgerError::InsufficientBalance { .. }))
        ));
        // Custody untouched by the rejected call
        assert_eq!(exchange.native_custody(), units::whole(1));
    }

    // ─── Token withdrawals ───

    #[test]
    fn test_withdraw_token_releases_custody() {
        let mut exchange = setup_exchange();
        let mut token = setup_token();
        token
            .approve(&alice(), exchange.address(), units::whole(10))
            .unwrap();
        exchange
            .deposit_token(&dapp_asset(), &mut token, &alice(), units::whole(10))
            .unwrap();

        exchange
            .withdraw_token(&dapp_asset(), &mut token, &alice(), units::whole(10))
            .unwrap();

        assert_eq!(exchange.balance_of(&dapp_asset(), &alice()), Decimal::ZERO);
        assert_eq!(token.balance_of(&alice()), units::whole(100));
        assert_eq!(token.balance_of(exchange.address()), Decimal::ZERO);
    }

    #[test]
    fn test_withdraw_token_rejects_native_sentinel() {
        let mut exchange = setup_exchange();
        let mut token = setup_token();
        let result =
            exchange.withdraw_token(&AssetId::Native, &mut token, &alice(), units::whole(1));
        assert!(matches!(result, Err(ExchangeError::InvalidAsset { .. })));
    }

    #[test]
    fn test_withdraw_token_insufficient() {
        let mut exchange = setup_exchange();
        let mut token = setup_token();
        let result =
            exchange.withdraw_token(&dapp_asset(), &mut token, &alice(), units::whole(1));
        assert!(matches!(
            result,
            Err(ExchangeError::Ledger(LedgerError::InsufficientBalance { .. }))
        ));
    }

    // ─── Orders ───

    #[test]
    fn test_make_order_stores_and_emits() {
        let mut exchange = setup_exchange();
        exchange
            .make_order(
                &alice(),
                dapp_asset(),
                units::whole(100),
                AssetId::Native,
                units::whole(1),
                T0,
            )
            .unwrap();

        assert_eq!(exchange.order_count(), 1);
        let order = exchange.order(OrderId::new(1)).unwrap();
        assert_eq!(order.user, alice());
        assert_eq!(order.amount_get, units::whole(100));
        assert_eq!(order.timestamp, T0);
    }

    #[test]
    fn test_make_order_needs_no_balance() {
        let mut exchange = setup_exchange();
        // Alice has deposited nothing at all
        let result = exchange.make_order(
            &alice(),
            dapp_asset(),
            units::whole(100),
            AssetId::Native,
            units::whole(1),
            T0,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_cancel_order_emits_with_cancel_time() {
        let mut exchange = setup_exchange();
        exchange
            .make_order(
                &alice(),
                dapp_asset(),
                units::whole(100),
                AssetId::Native,
                units::whole(1),
                T0,
            )
            .unwrap();

        let event = exchange.cancel_order(OrderId::new(1), &alice(), T0 + 60).unwrap();
        match event {
            ExchangeEvent::OrderCancelled(cancelled) => {
                assert_eq!(cancelled.id, OrderId::new(1));
                assert_eq!(cancelled.amount_get, units::whole(100));
                assert_eq!(cancelled.timestamp, T0 + 60);
            }
            other => panic!("expected OrderCancelled, got {other:?}"),
        }
        assert!(exchange.is_cancelled(OrderId::new(1)));
    }

    #[test]
    fn test_cancel_order_wrong_user() {
        let mut exchange = setup_exchange();
        exchange
            .make_order(
                &alice(),
                dapp_asset(),
                units::whole(100),
                AssetId::Native,
                units::whole(1),
                T0,
            )
            .unwrap();

        let result = exchange.cancel_order(OrderId::new(1), &bob(), T0);
        assert_eq!(
            result.err(),
            Some(ExchangeError::Book(BookError::Unauthorized))
        );
    }

    // ─── Fills ───

    /// Worked fee example: 10% fee on an order wanting 10 token for
    /// 1 native moves 11 token out of the taker.
    #[test]
    fn test_fill_order_settles_all_parties() {
        let mut exchange = setup_exchange();
        let mut token = setup_token();

        // Maker funds native, taker funds token
        exchange.deposit_native(&alice(), units::whole(1)).unwrap();
        token
            .approve(&bob(), exchange.address(), units::whole(11))
            .unwrap();
        exchange
            .deposit_token(&dapp_asset(), &mut token, &bob(), units::whole(11))
            .unwrap();

        exchange
            .make_order(
                &alice(),
                dapp_asset(),
                units::whole(10),
                AssetId::Native,
                units::whole(1),
                T0,
            )
            .unwrap();
        let event = exchange.fill_order(OrderId::new(1), &bob(), T0 + 5).unwrap();

        assert_eq!(exchange.balance_of(&dapp_asset(), &alice()), units::whole(10));
        assert_eq!(exchange.balance_of(&AssetId::Native, &alice()), Decimal::ZERO);
        assert_eq!(exchange.balance_of(&dapp_asset(), &bob()), Decimal::ZERO);
        assert_eq!(exchange.balance_of(&AssetId::Native, &bob()), units::whole(1));
        assert_eq!(
            exchange.balance_of(&dapp_asset(), &Address::new("fees")),
            units::whole(1)
        );

        match event {
            ExchangeEvent::Trade(trade) => {
                assert_eq!(trade.maker, alice());
                assert_eq!(trade.taker, bob());
                assert_eq!(trade.fee, units::whole(1));
                assert_eq!(trade.timestamp, T0 + 5);
            }
            other => panic!("expected Trade, got {other:?}"),
        }
        assert!(exchange.is_filled(OrderId::new(1)));
    }

    #[test]
    fn test_fill_order_taker_cannot_cover_fee() {
        let mut exchange = setup_exchange();
        let mut token = setup_token();

        exchange.deposit_native(&alice(), units::whole(1)).unwrap();
        // Bob deposits exactly the principal, nothing for the fee
        token
            .approve(&bob(), exchange.address(), units::whole(10))
            .unwrap();
        exchange
            .deposit_token(&dapp_asset(), &mut token, &bob(), units::whole(10))
            .unwrap();

        exchange
            .make_order(
                &alice(),
                dapp_asset(),
                units::whole(10),
                AssetId::Native,
                units::whole(1),
                T0,
            )
            .unwrap();
        let result = exchange.fill_order(OrderId::new(1), &bob(), T0);
        assert!(matches!(
            result,
            Err(ExchangeError::Ledger(LedgerError::InsufficientBalance { .. }))
        ));
        // Nothing moved, order still open
        assert_eq!(exchange.balance_of(&dapp_asset(), &bob()), units::whole(10));
        assert!(!exchange.is_filled(OrderId::new(1)));
    }

    #[test]
    fn test_fill_order_maker_balance_dropped() {
        let mut exchange = setup_exchange();
        let mut token = setup_token();

        exchange.deposit_native(&alice(), units::whole(1)).unwrap();
        token
            .approve(&bob(), exchange.address(), units::whole(11))
            .unwrap();
        exchange
            .deposit_token(&dapp_asset(), &mut token, &bob(), units::whole(11))
            .unwrap();

        exchange
            .make_order(
                &alice(),
                dapp_asset(),
                units::whole(10),
                AssetId::Native,
                units::whole(1),
                T0,
            )
            .unwrap();
        // Maker withdraws the offered native before anyone fills
        exchange.withdraw_native(&alice(), units::whole(1)).unwrap();

        let result = exchange.fill_order(OrderId::new(1), &bob(), T0);
        assert!(matches!(
            result,
            Err(ExchangeError::Ledger(LedgerError::InsufficientBalance { .. }))
        ));
        assert_eq!(exchange.balance_of(&dapp_asset(), &bob()), units::whole(11));
    }

    #[test]
    fn test_fill_order_dead_orders() {
        let mut exchange = setup_exchange();
        exchange
            .make_order(
                &alice(),
                dapp_asset(),
                Decimal::ZERO,
                AssetId::Native,
                Decimal::ZERO,
                T0,
            )
            .unwrap();
        exchange.cancel_order(OrderId::new(1), &alice(), T0).unwrap();

        assert_eq!(
            exchange.fill_order(OrderId::new(1), &bob(), T0).err(),
            Some(ExchangeError::Book(BookError::OrderCancelled))
        );
        assert_eq!(
            exchange.fill_order(OrderId::new(9), &bob(), T0).err(),
            Some(ExchangeError::Book(BookError::OrderNotFound { order_id: 9 }))
        );
    }

    #[test]
    fn test_fill_zero_amount_order_is_noop_settlement() {
        let mut exchange = setup_exchange();
        exchange
            .make_order(
                &alice(),
                dapp_asset(),
                Decimal::ZERO,
                AssetId::Native,
                Decimal::ZERO,
                T0,
            )
            .unwrap();

        exchange.fill_order(OrderId::new(1), &bob(), T0).unwrap();
        assert!(exchange.is_filled(OrderId::new(1)));
        assert_eq!(exchange.balance_of(&AssetId::Native, &bob()), Decimal::ZERO);
    }

    #[test]
    fn test_fee_schedule_truncates() {
        let fees = FeeSchedule::new(Address::new("fees"), 10);
        // 10% of 15 base units is 1.5, truncated to 1
        assert_eq!(fees.fee_for(Decimal::from(15)), Some(Decimal::ONE));
        assert_eq!(fees.fee_for(Decimal::ZERO), Some(Decimal::ZERO));
    }

    #[test]
    fn test_confiscatory_fee_fails_fills() {
        let mut exchange = Exchange::new(
            Address::new("0xE0"),
            FeeSchedule::new(Address::new("fees"), 100),
        );
        exchange.deposit_native(&alice(), units::whole(1)).unwrap();
        exchange.deposit_native(&bob(), units::whole(10)).unwrap();

        // Bob would owe 10 + 10 native against a balance of 10
        exchange
            .make_order(
                &alice(),
                AssetId::Native,
                units::whole(10),
                AssetId::Native,
                units::whole(1),
                T0,
            )
            .unwrap();
        let result = exchange.fill_order(OrderId::new(1), &bob(), T0);
        assert!(matches!(
            result,
            Err(ExchangeError::Ledger(LedgerError::InsufficientBalance { .. }))
        ));
    }

    #[test]
    fn test_self_fill_settles_net() {
        let mut exchange = setup_exchange();
        exchange.deposit_native(&alice(), units::whole(12)).unwrap();

        // Alice takes her own order: native for native, 10% fee on 10
        exchange
            .make_order(
                &alice(),
                AssetId::Native,
                units::whole(10),
                AssetId::Native,
                units::whole(10),
                T0,
            )
            .unwrap();
        exchange.fill_order(OrderId::new(1), &alice(), T0).unwrap();

        // Principal legs cancel out; only the fee leaves her balance
        assert_eq!(
            exchange.balance_of(&AssetId::Native, &alice()),
            units::whole(11)
        );
        assert_eq!(
            exchange.balance_of(&AssetId::Native, &Address::new("fees")),
            units::whole(1)
        );
        assert_eq!(exchange.ledger_total(&AssetId::Native), units::whole(12));
    }
}
