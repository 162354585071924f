//! Base-unit amount constructors
//!
//! Amounts flow through the exchange as integral `Decimal` values in an
//! asset's smallest unit. Both the native asset and the reference token
//! document 18 decimal places, so one whole unit is 10^18 base units.

use rust_decimal::Decimal;

/// Decimal places of the native asset and the reference token.
pub const BASE_DECIMALS: u32 = 18;

/// Scale factor (10^decimals) for an asset with the given decimal places.
///
/// Supports the full range a `Decimal` can hold (decimals <= 28).
pub fn scale_factor(decimals: u32) -> Decimal {
    debug_assert!(decimals <= 28, "scale factor exceeds Decimal range");
    Decimal::from_i128_with_scale(10i128.pow(decimals), 0)
}

/// `amount` whole units of an asset with `decimals` places, in base units.
pub fn base_units(amount: i64, decimals: u32) -> Decimal {
    Decimal::from(amount) * scale_factor(decimals)
}

/// `amount` whole units of a standard 18-decimal asset, in base units.
pub fn whole(amount: i64) -> Decimal {
    base_units(amount, BASE_DECIMALS)
}
