//! The order book core: admission, continuous matching, and views.
//!
//! Not synchronized; [`crate::orderbook::Orderbook`] wraps a `Book` in the
//! single mutex that serializes all access.

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::arena::{Arena, ArenaIndex, NULL_INDEX};
use crate::config::{INITIAL_ORDER_CAPACITY, LADDER_SIZE};
use crate::ladder::{Asks, Bids, Ladder};
use crate::order::{
    BookSnapshot, LevelInfo, Order, OrderId, OrderModify, OrderType, Price, Quantity, Side, Trade,
};

/// Single-instrument limit order book with price-time priority.
///
/// Trades produced by matching accumulate in an internal buffer; read them
/// with [`Book::trades`] and reset with [`Book::clear_trades`].
pub struct Book {
    arena: Arena,
    bids: Ladder<Bids>,
    asks: Ladder<Asks>,
    orders: FxHashMap<OrderId, ArenaIndex>,
    trades: Vec<Trade>,
}

impl Book {
    pub fn new() -> Self {
        Self::with_capacity(LADDER_SIZE, INITIAL_ORDER_CAPACITY)
    }

    /// `ladder_size` bounds the admissible price range `[0, ladder_size)`;
    /// `order_capacity` is the initial reserve for orders and their index.
    pub fn with_capacity(ladder_size: usize, order_capacity: usize) -> Self {
        Self {
            arena: Arena::with_capacity(order_capacity),
            bids: Ladder::new(ladder_size),
            asks: Ladder::new(ladder_size),
            orders: FxHashMap::with_capacity_and_hasher(order_capacity, Default::default()),
            trades: Vec::new(),
        }
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Admit a new order and run the match loop.
    ///
    /// Silent drops: zero quantity, duplicate id, market order against an
    /// empty opposite side, fill-and-kill that does not cross, fill-or-kill
    /// that cannot be fully filled.
    pub fn add(&mut self, mut order: Order) {
        if order.remaining_quantity() == 0 || self.orders.contains_key(&order.id()) {
            return;
        }

        if order.order_type() == OrderType::Market {
            // Rewriting to fill-and-kill at the opposite side's worst price
            // makes the order sweep every opposite level without resting.
            let opposite_worst = match order.side() {
                Side::Buy => self.asks.worst_price(),
                Side::Sell => self.bids.worst_price(),
            };
            match opposite_worst {
                Some(price) => order.to_fill_and_kill(price),
                None => return,
            }
        }

        if !self.price_in_range(order.price()) {
            debug_assert!(false, "price {} outside ladder range", order.price());
            tracing::error!(id = order.id(), price = order.price(), "price out of range");
            return;
        }

        if order.order_type() == OrderType::FillAndKill
            && !self.can_match(order.side(), order.price())
        {
            return;
        }

        if order.order_type() == OrderType::FillOrKill
            && !self.can_fully_fill(order.side(), order.price(), order.remaining_quantity())
        {
            return;
        }

        trace!(
            id = order.id(),
            side = ?order.side(),
            price = order.price(),
            quantity = order.remaining_quantity(),
            "add"
        );

        let index = self.arena.alloc();
        let node = self.arena.get_mut(index);
        node.id = order.id();
        node.order_type = order.order_type();
        node.side = order.side();
        node.price = order.price();
        node.remaining = order.remaining_quantity();

        match order.side() {
            Side::Buy => {
                self.bids
                    .level_mut(order.price())
                    .push_back(&mut self.arena, index);
                self.bids.on_order_added(order.price());
            }
            Side::Sell => {
                self.asks
                    .level_mut(order.price())
                    .push_back(&mut self.arena, index);
                self.asks.on_order_added(order.price());
            }
        }
        self.orders.insert(order.id(), index);

        self.match_orders();
    }

    /// Remove a resting order. Unknown ids are a no-op; no trades result.
    pub fn cancel(&mut self, order_id: OrderId) {
        let Some(index) = self.orders.remove(&order_id) else {
            return;
        };

        trace!(id = order_id, "cancel");

        let node = *self.arena.get(index);
        match node.side {
            Side::Buy => {
                let emptied = self.bids.level_mut(node.price).remove(&mut self.arena, index);
                if emptied {
                    self.bids.on_order_removed(node.price);
                }
            }
            Side::Sell => {
                let emptied = self.asks.level_mut(node.price).remove(&mut self.arena, index);
                if emptied {
                    self.asks.on_order_removed(node.price);
                }
            }
        }
        self.arena.free(index);
    }

    /// Cancel a batch of ids; unknown ids are skipped.
    pub fn cancel_batch(&mut self, order_ids: &[OrderId]) {
        for &order_id in order_ids {
            self.cancel(order_id);
        }
    }

    /// Replace a resting order: cancel it, then re-admit with the request's
    /// side, price, and quantity under the original order type. The
    /// replacement joins the back of its queue, losing time priority.
    /// Unknown ids are a no-op.
    pub fn modify(&mut self, request: OrderModify) {
        let Some(&index) = self.orders.get(&request.id()) else {
            return;
        };
        let order_type = self.arena.get(index).order_type;

        trace!(id = request.id(), price = request.price(), "modify");

        self.cancel(request.id());
        self.add(request.to_order(order_type));
    }

    // ========================================================================
    // Matching
    // ========================================================================

    /// Whether an aggressor at `price` would cross the opposite side's best.
    fn can_match(&self, side: Side, price: Price) -> bool {
        match side {
            Side::Buy => self.asks.best_price().is_some_and(|ask| ask <= price),
            Side::Sell => self.bids.best_price().is_some_and(|bid| bid >= price),
        }
    }

    /// Whether the opposite side holds `quantity` at prices equal-or-better
    /// than `price`.
    fn can_fully_fill(&self, side: Side, price: Price, quantity: Quantity) -> bool {
        match side {
            Side::Buy => self.asks.can_fully_fill(price, quantity),
            Side::Sell => self.bids.can_fully_fill(price, quantity),
        }
    }

    /// Cross best bid against best ask until they no longer overlap,
    /// emitting one trade per head pair consumed.
    fn match_orders(&mut self) {
        loop {
            let (Some(bid_price), Some(ask_price)) =
                (self.bids.best_price(), self.asks.best_price())
            else {
                break;
            };
            if bid_price < ask_price {
                break;
            }

            loop {
                let bid_head = self.bids.level(bid_price).head;
                let ask_head = self.asks.level(ask_price).head;
                if bid_head == NULL_INDEX || ask_head == NULL_INDEX {
                    break;
                }

                let bid = *self.arena.get(bid_head);
                let ask = *self.arena.get(ask_head);
                let traded = bid.remaining.min(ask.remaining);

                self.trades.push(Trade {
                    bid_id: bid.id,
                    ask_id: ask.id,
                    bid_price: bid.price,
                    ask_price: ask.price,
                    quantity: traded,
                });

                if bid.remaining == traded {
                    // Pop before writing the fill so the level aggregate
                    // drops by the order's full open quantity.
                    self.orders.remove(&bid.id);
                    self.bids.level_mut(bid_price).pop_front(&mut self.arena);
                    self.arena.free(bid_head);
                } else {
                    self.arena.get_mut(bid_head).fill(traded);
                    self.bids.level_mut(bid_price).subtract_qty(traded);
                }

                if ask.remaining == traded {
                    self.orders.remove(&ask.id);
                    self.asks.level_mut(ask_price).pop_front(&mut self.arena);
                    self.arena.free(ask_head);
                } else {
                    self.arena.get_mut(ask_head).fill(traded);
                    self.asks.level_mut(ask_price).subtract_qty(traded);
                }
            }

            if self.bids.level(bid_price).is_empty() {
                self.bids.on_order_removed(bid_price);
            }
            if self.asks.level(ask_price).is_empty() {
                self.asks.on_order_removed(ask_price);
            }
        }

        self.prune_stale_fill_and_kill();
    }

    /// A fill-and-kill aggressor whose admission crossed may keep a
    /// residual once the opposite side runs out; that residual sits at the
    /// head of its side's best level and must not rest.
    fn prune_stale_fill_and_kill(&mut self) {
        if let Some(price) = self.bids.best_price() {
            let head = self.bids.level(price).head;
            if head != NULL_INDEX {
                let node = self.arena.get(head);
                debug_assert!(
                    node.order_type != OrderType::FillOrKill,
                    "fill-or-kill order resting after match"
                );
                if node.order_type == OrderType::FillAndKill {
                    let id = node.id;
                    self.cancel(id);
                }
            }
        }
        if let Some(price) = self.asks.best_price() {
            let head = self.asks.level(price).head;
            if head != NULL_INDEX {
                let node = self.arena.get(head);
                debug_assert!(
                    node.order_type != OrderType::FillOrKill,
                    "fill-or-kill order resting after match"
                );
                if node.order_type == OrderType::FillAndKill {
                    let id = node.id;
                    self.cancel(id);
                }
            }
        }
    }

    #[inline]
    fn price_in_range(&self, price: Price) -> bool {
        self.bids.contains(price)
    }

    // ========================================================================
    // Views
    // ========================================================================

    /// Number of resting orders across both sides.
    pub fn size(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.bids.best_price()
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.best_price()
    }

    /// Midpoint of best bid and best ask. With a one-sided book this is
    /// that side's best price; `None` when both sides are empty.
    pub fn mid_price(&self) -> Option<f64> {
        match (self.bids.best_price(), self.asks.best_price()) {
            (Some(bid), Some(ask)) => Some((bid + ask) as f64 / 2.0),
            (Some(bid), None) => Some(bid as f64),
            (None, Some(ask)) => Some(ask as f64),
            (None, None) => None,
        }
    }

    /// Aggregated depth per level: bids descending, asks ascending.
    pub fn snapshot(&self) -> BookSnapshot {
        let mut bids = Vec::new();
        self.bids.for_each_level_best_to_worst(|price, level| {
            bids.push(LevelInfo {
                price,
                quantity: level.total_qty,
            });
        });

        let mut asks = Vec::new();
        self.asks.for_each_level_best_to_worst(|price, level| {
            asks.push(LevelInfo {
                price,
                quantity: level.total_qty,
            });
        });

        BookSnapshot::new(bids, asks)
    }

    /// Depth at one price: `(total quantity, order count)`.
    pub fn depth_at(&self, side: Side, price: Price) -> (Quantity, u32) {
        let level = match side {
            Side::Buy => self.bids.level(price),
            Side::Sell => self.asks.level(price),
        };
        (level.total_qty, level.count)
    }

    /// Ids of all resting good-for-day orders.
    pub fn day_order_ids(&self) -> Vec<OrderId> {
        self.orders
            .iter()
            .filter(|(_, &index)| self.arena.get(index).order_type == OrderType::GoodForDay)
            .map(|(&id, _)| id)
            .collect()
    }

    /// Trades accumulated since the last [`Book::clear_trades`].
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn clear_trades(&mut self) {
        self.trades.clear();
    }
}

impl Default for Book {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Book {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Book")
            .field("best_bid", &self.bids.best_price())
            .field("best_ask", &self.asks.best_price())
            .field("orders", &self.orders.len())
            .field("trades", &self.trades.len())
            .finish()
    }
}
