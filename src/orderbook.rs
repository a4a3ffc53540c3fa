//! Thread-safe envelope around [`Book`] plus the day-order pruner.
//!
//! One mutex guards all book state; at most one thread is inside the book
//! at any moment. The pruner runs on its own thread, sleeps on a condition
//! variable until the configured market close, and contends on the same
//! mutex to cancel every good-for-day order. Dropping the `Orderbook`
//! signals shutdown and joins the pruner.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::{Days, Local, NaiveTime};
use parking_lot::{Condvar, Mutex};
use tracing::debug;

use crate::book::Book;
use crate::config::{TimeOfDay, MARKET_CLOSE};
use crate::order::{BookSnapshot, Order, OrderId, OrderModify, Price, Trade};

struct EngineState {
    book: Book,
    shutdown: bool,
}

struct Shared {
    state: Mutex<EngineState>,
    close_signal: Condvar,
}

/// Concurrent single-instrument order book.
pub struct Orderbook {
    shared: Arc<Shared>,
    pruner: Option<thread::JoinHandle<()>>,
}

impl Orderbook {
    /// Book with the background day-order pruner firing at the default
    /// market close.
    pub fn new() -> Self {
        Self::with_config(true, MARKET_CLOSE)
    }

    /// `start_prune_thread = false` disables the background pruner for
    /// deterministic tests and replays; [`Orderbook::prune_day_orders`]
    /// remains available for manual pruning.
    pub fn with_config(start_prune_thread: bool, market_close: TimeOfDay) -> Self {
        let shared = Arc::new(Shared {
            state: Mutex::new(EngineState {
                book: Book::new(),
                shutdown: false,
            }),
            close_signal: Condvar::new(),
        });

        let pruner = start_prune_thread.then(|| {
            let shared = Arc::clone(&shared);
            thread::spawn(move || run_pruner(&shared, market_close))
        });

        Self { shared, pruner }
    }

    /// Submit a new order. Resulting trades accumulate in the trade buffer.
    pub fn add(&self, order: Order) {
        self.shared.state.lock().book.add(order);
    }

    /// Cancel a resting order; unknown ids are a no-op.
    pub fn cancel(&self, order_id: OrderId) {
        self.shared.state.lock().book.cancel(order_id);
    }

    /// Cancel a batch of orders under one lock acquisition.
    pub fn cancel_batch(&self, order_ids: &[OrderId]) {
        self.shared.state.lock().book.cancel_batch(order_ids);
    }

    /// Replace a resting order, losing time priority.
    pub fn modify(&self, request: OrderModify) {
        self.shared.state.lock().book.modify(request);
    }

    /// Number of resting orders.
    pub fn size(&self) -> usize {
        self.shared.state.lock().book.size()
    }

    /// Aggregated levels: bids descending, asks ascending.
    pub fn snapshot(&self) -> BookSnapshot {
        self.shared.state.lock().book.snapshot()
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.shared.state.lock().book.best_bid()
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.shared.state.lock().book.best_ask()
    }

    /// Midpoint of the touch; one-sided books report that side's best.
    pub fn mid_price(&self) -> Option<f64> {
        self.shared.state.lock().book.mid_price()
    }

    /// Copy of the trades accumulated since the last clear.
    pub fn trades(&self) -> Vec<Trade> {
        self.shared.state.lock().book.trades().to_vec()
    }

    pub fn clear_trades(&self) {
        self.shared.state.lock().book.clear_trades();
    }

    /// Cancel every resting good-for-day order now. This is the operation
    /// the background pruner performs at market close: snapshot the ids
    /// under the lock, release, then cancel in a second acquisition.
    pub fn prune_day_orders(&self) {
        let stale = self.shared.state.lock().book.day_order_ids();
        if stale.is_empty() {
            return;
        }
        debug!(count = stale.len(), "pruning day orders");
        self.shared.state.lock().book.cancel_batch(&stale);
    }
}

impl Default for Orderbook {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Orderbook {
    fn drop(&mut self) {
        {
            let mut state = self.shared.state.lock();
            state.shutdown = true;
        }
        self.shared.close_signal.notify_all();
        if let Some(handle) = self.pruner.take() {
            let _ = handle.join();
        }
    }
}

fn run_pruner(shared: &Shared, market_close: TimeOfDay) {
    loop {
        let wait = duration_until_close(market_close);

        {
            let mut state = shared.state.lock();
            if state.shutdown {
                return;
            }
            let result = shared
                .close_signal
                .wait_for(&mut state, wait);
            if state.shutdown {
                return;
            }
            if !result.timed_out() {
                // Woken without shutdown; recompute the deadline and wait
                // again.
                continue;
            }
        }

        debug!("market close reached");
        let stale = shared.state.lock().book.day_order_ids();
        if stale.is_empty() {
            continue;
        }
        debug!(count = stale.len(), "pruning day orders");
        shared.state.lock().book.cancel_batch(&stale);
    }
}

/// Time until the next occurrence of the market close in local civil time.
/// A close that already passed today maps to tomorrow's.
fn duration_until_close(market_close: TimeOfDay) -> Duration {
    let now = Local::now().naive_local();
    let close_time = NaiveTime::from_hms_opt(
        market_close.hour,
        market_close.minute,
        market_close.second,
    )
    .unwrap_or(NaiveTime::MIN);

    let mut close = now.date().and_time(close_time);
    if close <= now {
        close = close.checked_add_days(Days::new(1)).unwrap_or(close);
    }

    (close - now).to_std().unwrap_or(Duration::ZERO)
}
