//! Caller-visible configuration constants.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::order::Price;

/// Sentinel price carried by `Market` orders until they are rewritten at
/// admission. Never a valid resting price.
pub const INVALID_PRICE: Price = Price::MIN;

/// Conversion factor applied by producers that take human-readable prices.
/// A price of 123.45 becomes 12345 ticks.
pub const TICK_MULTIPLIER: i64 = 100;

/// Number of price slots per side. Prices must lie in `[0, LADDER_SIZE)`;
/// submitting a price outside that range is a programming error.
pub const LADDER_SIZE: usize = 60_000;

/// Initial reserve for the order index.
pub const INITIAL_ORDER_CAPACITY: usize = 200_000;

/// A wall-clock time of day in local civil time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeOfDay {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

/// Local time at which the day-order pruner fires.
pub const MARKET_CLOSE: TimeOfDay = TimeOfDay {
    hour: 16,
    minute: 30,
    second: 0,
};

/// Convert a human-readable decimal price to integer ticks.
///
/// Returns `None` when the scaled value does not fit a tick price.
pub fn ticks_from_decimal(price: Decimal) -> Option<Price> {
    (price * Decimal::from(TICK_MULTIPLIER)).to_i64()
}
