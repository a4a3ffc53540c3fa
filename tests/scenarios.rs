//! End-to-end matching scenarios against the public book surface.

use tickbook::{
    Order, OrderId, OrderModify, OrderType, Orderbook, Price, Quantity, Side, Trade, MARKET_CLOSE,
};

fn book() -> Orderbook {
    Orderbook::with_config(false, MARKET_CLOSE)
}

fn order(id: OrderId, order_type: OrderType, side: Side, price: Price, qty: Quantity) -> Order {
    Order::new(id, order_type, side, price, qty)
}

fn trade(
    bid_id: OrderId,
    ask_id: OrderId,
    bid_price: Price,
    ask_price: Price,
    quantity: Quantity,
) -> Trade {
    Trade {
        bid_id,
        ask_id,
        bid_price,
        ask_price,
        quantity,
    }
}

#[test]
fn sell_side_fifo_consumed_in_arrival_order() {
    let ob = book();
    ob.add(order(0, OrderType::GoodTillCancel, Side::Sell, 100, 5));
    ob.add(order(1, OrderType::GoodTillCancel, Side::Sell, 100, 5));
    ob.add(order(2, OrderType::GoodTillCancel, Side::Sell, 100, 5));
    ob.add(order(3, OrderType::GoodTillCancel, Side::Buy, 100, 12));

    assert_eq!(
        ob.trades(),
        vec![
            trade(3, 0, 100, 100, 5),
            trade(3, 1, 100, 100, 5),
            trade(3, 2, 100, 100, 2),
        ]
    );
    assert_eq!(ob.size(), 1);

    let snapshot = ob.snapshot();
    assert!(snapshot.bids().is_empty());
    assert_eq!(snapshot.asks().len(), 1);
    assert_eq!(snapshot.asks()[0].price, 100);
    assert_eq!(snapshot.asks()[0].quantity, 3);
}

#[test]
fn market_order_walks_three_levels_and_residual_never_rests() {
    let ob = book();
    ob.add(order(0, OrderType::GoodTillCancel, Side::Sell, 100, 10));
    ob.add(order(1, OrderType::GoodTillCancel, Side::Sell, 101, 10));
    ob.add(order(2, OrderType::GoodTillCancel, Side::Sell, 102, 10));
    ob.add(Order::market(3, Side::Buy, 100));

    assert_eq!(
        ob.trades(),
        vec![
            trade(3, 0, 102, 100, 10),
            trade(3, 1, 102, 101, 10),
            trade(3, 2, 102, 102, 10),
        ]
    );
    assert_eq!(ob.size(), 0);
    assert_eq!(ob.best_bid(), None);
    assert_eq!(ob.best_ask(), None);
}

#[test]
fn fill_or_kill_exactly_filled_at_boundary() {
    let ob = book();
    ob.add(order(0, OrderType::GoodTillCancel, Side::Sell, 100, 7));
    ob.add(order(1, OrderType::FillOrKill, Side::Buy, 100, 7));

    assert_eq!(ob.trades(), vec![trade(1, 0, 100, 100, 7)]);
    assert_eq!(ob.size(), 0);
}

#[test]
fn fill_or_kill_one_unit_short_leaves_book_unchanged() {
    let ob = book();
    ob.add(order(0, OrderType::GoodTillCancel, Side::Sell, 100, 9));
    ob.add(order(1, OrderType::FillOrKill, Side::Buy, 100, 10));

    assert!(ob.trades().is_empty());
    assert_eq!(ob.size(), 1);

    let snapshot = ob.snapshot();
    assert_eq!(snapshot.asks().len(), 1);
    assert_eq!(snapshot.asks()[0].price, 100);
    assert_eq!(snapshot.asks()[0].quantity, 9);
}

#[test]
fn modify_triggers_match() {
    let ob = book();
    ob.add(order(0, OrderType::GoodTillCancel, Side::Buy, 100, 10));
    ob.add(order(1, OrderType::GoodTillCancel, Side::Sell, 110, 10));
    ob.modify(OrderModify::new(1, Side::Sell, 95, 10));

    assert_eq!(ob.trades(), vec![trade(0, 1, 100, 95, 10)]);
    assert_eq!(ob.size(), 0);
}

#[test]
fn cancel_unknown_and_repeated_cancel_are_noops() {
    let ob = book();
    ob.add(order(0, OrderType::GoodTillCancel, Side::Buy, 100, 10));
    ob.cancel(999);
    ob.cancel(0);
    ob.cancel(0);

    assert!(ob.trades().is_empty());
    assert_eq!(ob.size(), 0);
    let snapshot = ob.snapshot();
    assert!(snapshot.bids().is_empty());
    assert!(snapshot.asks().is_empty());
}

#[test]
fn zero_quantity_and_duplicate_adds_are_noops() {
    let ob = book();
    ob.add(order(0, OrderType::GoodTillCancel, Side::Buy, 100, 0));
    assert_eq!(ob.size(), 0);

    ob.add(order(1, OrderType::GoodTillCancel, Side::Buy, 100, 10));
    ob.add(order(1, OrderType::GoodTillCancel, Side::Buy, 101, 5));
    assert_eq!(ob.size(), 1);
    assert_eq!(ob.best_bid(), Some(100));
}

#[test]
fn modify_unknown_is_noop() {
    let ob = book();
    ob.modify(OrderModify::new(5, Side::Buy, 100, 10));
    assert_eq!(ob.size(), 0);
    assert!(ob.trades().is_empty());
}

#[test]
fn modify_places_replacement_at_queue_tail() {
    let ob = book();
    ob.add(order(0, OrderType::GoodTillCancel, Side::Sell, 100, 5));
    ob.add(order(1, OrderType::GoodTillCancel, Side::Sell, 100, 5));
    ob.add(order(2, OrderType::GoodTillCancel, Side::Sell, 100, 5));

    // Reprice order 0 onto the same level; it must requeue behind 1 and 2.
    ob.modify(OrderModify::new(0, Side::Sell, 100, 5));

    ob.add(order(3, OrderType::GoodTillCancel, Side::Buy, 100, 15));
    let ask_ids: Vec<OrderId> = ob.trades().iter().map(|t| t.ask_id).collect();
    assert_eq!(ask_ids, vec![1, 2, 0]);
}

#[test]
fn fill_and_kill_takes_what_crosses_and_drops_the_rest() {
    let ob = book();
    ob.add(order(0, OrderType::GoodTillCancel, Side::Sell, 100, 5));
    ob.add(order(1, OrderType::GoodTillCancel, Side::Sell, 101, 5));
    ob.add(order(2, OrderType::FillAndKill, Side::Buy, 100, 8));

    // Only the crossing level fills; the 3-unit residual is cancelled.
    assert_eq!(ob.trades(), vec![trade(2, 0, 100, 100, 5)]);
    assert_eq!(ob.size(), 1);
    assert_eq!(ob.best_ask(), Some(101));
    assert_eq!(ob.best_bid(), None);
}

#[test]
fn fill_and_kill_without_cross_is_dropped() {
    let ob = book();
    ob.add(order(0, OrderType::GoodTillCancel, Side::Sell, 105, 5));
    ob.add(order(1, OrderType::FillAndKill, Side::Buy, 104, 5));

    assert!(ob.trades().is_empty());
    assert_eq!(ob.size(), 1);
}

#[test]
fn market_sell_sweeps_bids() {
    let ob = book();
    ob.add(order(0, OrderType::GoodTillCancel, Side::Buy, 102, 10));
    ob.add(order(1, OrderType::GoodTillCancel, Side::Buy, 101, 10));
    ob.add(Order::market(2, Side::Sell, 15));

    assert_eq!(
        ob.trades(),
        vec![trade(0, 2, 102, 101, 10), trade(1, 2, 101, 101, 5)]
    );
    assert_eq!(ob.size(), 1);
    assert_eq!(ob.best_bid(), Some(101));
}

#[test]
fn prune_day_orders_cancels_only_good_for_day() {
    let ob = book();
    ob.add(order(0, OrderType::GoodForDay, Side::Buy, 50, 10));
    ob.add(order(1, OrderType::GoodTillCancel, Side::Buy, 51, 5));
    ob.add(order(2, OrderType::GoodForDay, Side::Sell, 60, 7));
    ob.add(order(3, OrderType::GoodTillCancel, Side::Sell, 61, 3));
    assert_eq!(ob.size(), 4);

    ob.prune_day_orders();

    assert_eq!(ob.size(), 2);
    let snapshot = ob.snapshot();
    assert_eq!(snapshot.bids().len(), 1);
    assert_eq!(snapshot.bids()[0].price, 51);
    assert_eq!(snapshot.asks().len(), 1);
    assert_eq!(snapshot.asks()[0].price, 61);
}

#[test]
fn quantity_is_conserved_between_trades_and_resting_depth() {
    let ob = book();
    let buys: &[(OrderId, Price, Quantity)] = &[(0, 100, 10), (1, 101, 8), (2, 99, 4)];
    let sells: &[(OrderId, Price, Quantity)] = &[(10, 100, 6), (11, 102, 9), (12, 101, 3)];

    let buy_total: Quantity = buys.iter().map(|&(_, _, q)| q).sum();
    let sell_total: Quantity = sells.iter().map(|&(_, _, q)| q).sum();

    for &(id, price, qty) in buys {
        ob.add(order(id, OrderType::GoodTillCancel, Side::Buy, price, qty));
    }
    for &(id, price, qty) in sells {
        ob.add(order(id, OrderType::GoodTillCancel, Side::Sell, price, qty));
    }

    let traded: Quantity = ob.trades().iter().map(|t| t.quantity).sum();
    let snapshot = ob.snapshot();
    let resting_bids: Quantity = snapshot.bids().iter().map(|l| l.quantity).sum();
    let resting_asks: Quantity = snapshot.asks().iter().map(|l| l.quantity).sum();

    assert_eq!(traded + resting_bids, buy_total);
    assert_eq!(traded + resting_asks, sell_total);
}

#[test]
fn mid_price_tracks_touch() {
    let ob = book();
    assert_eq!(ob.mid_price(), None);

    ob.add(order(0, OrderType::GoodTillCancel, Side::Buy, 100, 1));
    assert_eq!(ob.mid_price(), Some(100.0));

    ob.add(order(1, OrderType::GoodTillCancel, Side::Sell, 103, 1));
    assert_eq!(ob.mid_price(), Some(101.5));
}
