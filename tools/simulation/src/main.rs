//! Market session driver
//!
//! Deploys the reference token, wires it to the exchange, and runs a
//! seeded random session of deposits, orders, cancels, fills, and
//! withdrawals, auditing conservation after every operation.
//!
//! Usage: `simulation [seed] [ticks]` — both optional, defaults 42/500.

use anyhow::{Context, Result};
use tracing::info;

mod session;

use session::SessionConfig;

fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let mut config = SessionConfig::default();
    let mut args = std::env::args().skip(1);
    if let Some(seed) = args.next() {
        config.seed = seed.parse().context("seed must be an integer")?;
    }
    if let Some(ticks) = args.next() {
        config.ticks = ticks.parse().context("ticks must be an integer")?;
    }

    let report = session::run(&config)?;

    info!(
        ticks = report.ticks,
        deposits = report.deposits,
        withdrawals = report.withdrawals,
        orders_placed = report.orders_placed,
        orders_cancelled = report.orders_cancelled,
        orders_filled = report.orders_filled,
        rejections = report.rejections,
        audits = report.audits,
        events = report.events_emitted,
        "session complete, conservation held at every step"
    );
    Ok(())
}
