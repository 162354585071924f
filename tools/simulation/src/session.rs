//! Seeded market session
//!
//! Drives the exchange with a deterministic stream of deposits, orders,
//! cancels, fills, and withdrawals, auditing conservation after every
//! operation and draining all balances back out at the end. The same
//! seed always produces the same session.

use anyhow::{ensure, Result};
use contracts::exchange::{Exchange, FeeSchedule};
use contracts::token::{FungibleAsset, Token};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;
use tracing::{debug, info};
use types::asset::AssetId;
use types::ids::{Address, OrderId};
use types::units;

const USERS: [&str; 4] = ["alice", "bob", "carol", "dave"];

/// Session parameters.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub seed: u64,
    pub ticks: u64,
    /// Fee percentage charged on fills.
    pub fee_percent: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            ticks: 500,
            fee_percent: 10,
        }
    }
}

/// Outcome counters for a completed session.
#[derive(Debug, Default)]
pub struct SessionReport {
    pub ticks: u64,
    pub deposits: u64,
    pub withdrawals: u64,
    pub orders_placed: u64,
    pub orders_cancelled: u64,
    pub orders_filled: u64,
    pub rejections: u64,
    pub audits: u64,
    pub events_emitted: usize,
}

/// Run one deterministic session.
pub fn run(config: &SessionConfig) -> Result<SessionReport> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let base_time = chrono::Utc::now().timestamp();

    let deployer = Address::new("deployer");
    let dapp = AssetId::token(Address::new("0xDA99"));
    let mut token = Token::new(
        Address::new("0xDA99"),
        "Simulated Token",
        "SIM",
        18,
        units::whole(1_000_000),
        &deployer,
    );
    let mut exchange = Exchange::new(
        Address::new("0xE0"),
        FeeSchedule::new(Address::new("fees"), config.fee_percent),
    );

    // Seed every trader with external token funds
    for name in USERS {
        token.transfer(&deployer, &Address::new(name), units::whole(10_000))?;
    }

    info!(
        seed = config.seed,
        ticks = config.ticks,
        fee_percent = config.fee_percent,
        "session starting"
    );

    let mut report = SessionReport::default();
    for tick in 0..config.ticks {
        let now = base_time + tick as i64;
        let user = Address::new(USERS[rng.gen_range(0..USERS.len())]);

        match rng.gen_range(0..7u8) {
            0 => {
                let amount = random_amount(&mut rng);
                match exchange.deposit_native(&user, amount) {
                    Ok(_) => report.deposits += 1,
                    Err(err) => reject(&mut report, tick, &err),
                }
            }
            1 => {
                let amount = random_amount(&mut rng);
                token.approve(&user, exchange.address(), amount)?;
                match exchange.deposit_token(&dapp, &mut token, &user, amount) {
                    Ok(_) => report.deposits += 1,
                    Err(err) => reject(&mut report, tick, &err),
                }
            }
            2 => {
                let amount = random_amount(&mut rng);
                match exchange.withdraw_native(&user, amount) {
                    Ok(_) => report.withdrawals += 1,
                    Err(err) => reject(&mut report, tick, &err),
                }
            }
            3 => {
                let amount = random_amount(&mut rng);
                match exchange.withdraw_token(&dapp, &mut token, &user, amount) {
                    Ok(_) => report.withdrawals += 1,
                    Err(err) => reject(&mut report, tick, &err),
                }
            }
            4 => {
                let (token_get, token_give) = if rng.gen_bool(0.5) {
                    (dapp.clone(), AssetId::Native)
                } else {
                    (AssetId::Native, dapp.clone())
                };
                let amount_get = random_amount(&mut rng);
                let amount_give = random_amount(&mut rng);
                match exchange.make_order(&user, token_get, amount_get, token_give, amount_give, now)
                {
                    Ok(_) => report.orders_placed += 1,
                    Err(err) => reject(&mut report, tick, &err),
                }
            }
            5 => {
                if let Some(id) = random_open_order(&mut rng, &exchange) {
                    match exchange.cancel_order(id, &user, now) {
                        Ok(_) => report.orders_cancelled += 1,
                        Err(err) => reject(&mut report, tick, &err),
                    }
                }
            }
            _ => {
                if let Some(id) = random_open_order(&mut rng, &exchange) {
                    match exchange.fill_order(id, &user, now) {
                        Ok(_) => {
                            debug!(tick, order = %id, taker = %user, "order filled");
                            report.orders_filled += 1;
                        }
                        Err(err) => reject(&mut report, tick, &err),
                    }
                }
            }
        }

        audit(&exchange, &token)?;
        report.audits += 1;
    }

    drain(&mut exchange, &mut token, &dapp)?;
    audit(&exchange, &token)?;
    report.audits += 1;
    ensure!(
        exchange.native_custody().is_zero(),
        "drain left native value in custody"
    );
    ensure!(
        token.balance_of(exchange.address()).is_zero(),
        "drain left tokens in custody"
    );

    report.ticks = config.ticks;
    report.events_emitted = exchange.events().len();
    Ok(report)
}

fn random_amount(rng: &mut ChaCha8Rng) -> Decimal {
    units::whole(rng.gen_range(1..50i64))
}

fn random_open_order(rng: &mut ChaCha8Rng, exchange: &Exchange) -> Option<OrderId> {
    let open: Vec<OrderId> = exchange.open_orders().map(|order| order.id).collect();
    if open.is_empty() {
        None
    } else {
        Some(open[rng.gen_range(0..open.len())])
    }
}

fn reject(report: &mut SessionReport, tick: u64, err: &dyn std::error::Error) {
    debug!(tick, %err, "operation rejected");
    report.rejections += 1;
}

/// Ledger totals must equal custody for both assets, always.
fn audit(exchange: &Exchange, token: &Token) -> Result<()> {
    ensure!(
        exchange.ledger_total(&AssetId::Native) == exchange.native_custody(),
        "native ledger total diverged from custody"
    );
    ensure!(
        exchange.ledger_total(&AssetId::token(Address::new("0xDA99")))
            == token.balance_of(exchange.address()),
        "token ledger total diverged from custody"
    );
    Ok(())
}

/// Withdraw every remaining balance, fee account included.
fn drain(exchange: &mut Exchange, token: &mut Token, dapp: &AssetId) -> Result<()> {
    let mut holders: Vec<Address> = USERS.iter().map(|name| Address::new(*name)).collect();
    holders.push(Address::new("fees"));

    for holder in holders {
        let native = exchange.balance_of(&AssetId::Native, &holder);
        if !native.is_zero() {
            exchange.withdraw_native(&holder, native)?;
        }
        let tokens = exchange.balance_of(dapp, &holder);
        if !tokens.is_zero() {
            exchange.withdraw_token(dapp, token, &holder, tokens)?;
        }
    }
    Ok(())
}
