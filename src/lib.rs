//! # tickbook
//!
//! A single-instrument limit order book matching engine over a dense,
//! price-indexed ladder.
//!
//! ## Design
//!
//! - **Dense ladder**: price maps straight to an array index, so level
//!   access is O(1); best/worst indices advance by bounded scans.
//! - **Arena allocation**: resting orders live in a slab of cache-line
//!   nodes; per-level FIFO queues are linked through the nodes, and the
//!   order index stores slab handles for O(1) cancel.
//! - **Price-time priority**: better price first, FIFO within a level.
//! - **Single-writer under one mutex**: [`Orderbook`] serializes every
//!   operation; a background task prunes good-for-day orders at market
//!   close.
//!
//! [`Book`] is the unsynchronized core; [`Orderbook`] is the concurrent
//! wrapper most callers want.

pub mod arena;
pub mod book;
pub mod config;
pub mod events;
pub mod ladder;
pub mod level;
pub mod order;
pub mod orderbook;

pub use arena::{Arena, ArenaIndex, OrderNode, NULL_INDEX};
pub use book::Book;
pub use config::{TimeOfDay, INVALID_PRICE, LADDER_SIZE, MARKET_CLOSE, TICK_MULTIPLIER};
pub use events::{OrderEvent, ParseEventError};
pub use ladder::{Asks, Bids, Ladder, SideSpec};
pub use level::PriceLevel;
pub use order::{
    BookSnapshot, LevelInfo, Order, OrderId, OrderModify, OrderType, Price, Quantity, Side, Trade,
};
pub use orderbook::Orderbook;
