//! Domain value types: orders, modify requests, trades, and level views.

use serde::{Deserialize, Serialize};

use crate::config::INVALID_PRICE;

/// External order identifier, assigned by the caller.
pub type OrderId = u64;

/// Price in integer ticks.
pub type Price = i64;

/// Order quantity in lots.
pub type Quantity = u64;

/// Order side (buy = bid, sell = ask).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Side {
    Buy = 0,
    Sell = 1,
}

impl Side {
    /// Returns the opposite side.
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// Decode the wire code used by the event stream.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Side::Buy),
            1 => Some(Side::Sell),
            _ => None,
        }
    }
}

/// Order lifetime and matching behavior.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum OrderType {
    /// Rests until matched or cancelled.
    GoodTillCancel = 0,
    /// Executes whatever crosses immediately, drops the rest.
    FillAndKill = 1,
    /// Sweeps the opposite side at any price; never rests.
    Market = 2,
    /// Rests until matched, cancelled, or pruned at market close.
    GoodForDay = 3,
    /// Executes fully at submission or drops entirely.
    FillOrKill = 4,
}

impl OrderType {
    /// Decode the wire code used by the event stream.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(OrderType::GoodTillCancel),
            1 => Some(OrderType::FillAndKill),
            2 => Some(OrderType::Market),
            3 => Some(OrderType::GoodForDay),
            4 => Some(OrderType::FillOrKill),
            _ => None,
        }
    }
}

/// An order as submitted by the caller.
///
/// `remaining_quantity` only ever decreases; an order with zero remaining
/// quantity is filled and must not stay in the book.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    order_type: OrderType,
    side: Side,
    price: Price,
    remaining_quantity: Quantity,
}

impl Order {
    pub const fn new(
        id: OrderId,
        order_type: OrderType,
        side: Side,
        price: Price,
        quantity: Quantity,
    ) -> Self {
        Self {
            id,
            order_type,
            side,
            price,
            remaining_quantity: quantity,
        }
    }

    /// A market order carries the invalid-price sentinel until admission
    /// rewrites it against the opposite side.
    pub const fn market(id: OrderId, side: Side, quantity: Quantity) -> Self {
        Self::new(id, OrderType::Market, side, INVALID_PRICE, quantity)
    }

    #[inline]
    pub const fn id(&self) -> OrderId {
        self.id
    }

    #[inline]
    pub const fn order_type(&self) -> OrderType {
        self.order_type
    }

    #[inline]
    pub const fn side(&self) -> Side {
        self.side
    }

    #[inline]
    pub const fn price(&self) -> Price {
        self.price
    }

    #[inline]
    pub const fn remaining_quantity(&self) -> Quantity {
        self.remaining_quantity
    }

    #[inline]
    pub const fn is_filled(&self) -> bool {
        self.remaining_quantity == 0
    }

    /// Decrement the remaining quantity by a fill.
    pub fn fill(&mut self, quantity: Quantity) {
        debug_assert!(quantity <= self.remaining_quantity, "overfill");
        self.remaining_quantity -= quantity;
    }

    /// Rewrite into a non-resting limit order at the given price. Used to
    /// convert an admitted market order so it sweeps the opposite side
    /// without ever resting.
    pub fn to_fill_and_kill(&mut self, price: Price) {
        self.order_type = OrderType::FillAndKill;
        self.price = price;
    }

    /// Rewrite into a resting limit order at the given price.
    pub fn to_good_till_cancel(&mut self, price: Price) {
        self.order_type = OrderType::GoodTillCancel;
        self.price = price;
    }
}

/// Request to replace an existing order: cancel it and re-add with the same
/// id and the original order type. The replacement loses time priority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderModify {
    id: OrderId,
    side: Side,
    price: Price,
    quantity: Quantity,
}

impl OrderModify {
    pub const fn new(id: OrderId, side: Side, price: Price, quantity: Quantity) -> Self {
        Self {
            id,
            side,
            price,
            quantity,
        }
    }

    #[inline]
    pub const fn id(&self) -> OrderId {
        self.id
    }

    #[inline]
    pub const fn side(&self) -> Side {
        self.side
    }

    #[inline]
    pub const fn price(&self) -> Price {
        self.price
    }

    #[inline]
    pub const fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// Build the replacement order, carrying over the original's type.
    pub const fn to_order(&self, order_type: OrderType) -> Order {
        Order::new(self.id, order_type, self.side, self.price, self.quantity)
    }
}

/// A single execution between a resting bid and a resting ask.
///
/// Each side records its own limit price; the aggressor's limit is not
/// captured and is reconstructed by consumers via submission correlation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub bid_id: OrderId,
    pub ask_id: OrderId,
    pub bid_price: Price,
    pub ask_price: Price,
    pub quantity: Quantity,
}

/// Aggregated view of one price level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelInfo {
    pub price: Price,
    pub quantity: Quantity,
}

/// Point-in-time view of both sides: bids best-first (descending price),
/// asks best-first (ascending price).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSnapshot {
    bids: Vec<LevelInfo>,
    asks: Vec<LevelInfo>,
}

impl BookSnapshot {
    pub const fn new(bids: Vec<LevelInfo>, asks: Vec<LevelInfo>) -> Self {
        Self { bids, asks }
    }

    pub fn bids(&self) -> &[LevelInfo] {
        &self.bids
    }

    pub fn asks(&self) -> &[LevelInfo] {
        &self.asks
    }
}
