//! End-to-end matching flows across the book and engine layers

use matching_engine::{MatchingEngine, SeedConfig};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use types::ids::OrderId;
use types::instrument::Instrument;
use types::numeric::{Price, Quantity};
use types::order::{Order, OrderStatus, OrderType, Side, TimeInForce};

fn order(
    seq: u64,
    symbol: &str,
    side: Side,
    qty: Decimal,
    order_type: OrderType,
    limit: Option<Decimal>,
) -> Order {
    let mut o = Order::new(
        format!("cli-{seq}"),
        OrderId::from_sequence(seq),
        Instrument::equity(symbol),
        side,
        Quantity::new(qty),
        order_type,
        limit.map(Price::new),
        TimeInForce::Day,
        "flow-test",
    );
    o.status = OrderStatus::Accepted;
    o
}

#[test]
fn fills_come_back_best_price_first_fifo_within_level() {
    let mut engine = MatchingEngine::new();

    // Three resting asks: two share the 101 level, one sits deeper
    for (seq, price, qty) in [(1, dec!(101), dec!(30)), (2, dec!(101), dec!(30)), (3, dec!(102), dec!(30))] {
        let resting = order(seq, "MSFT", Side::Sell, qty, OrderType::Limit, Some(price));
        let result = engine.try_match(&resting);
        assert!(!result.matched);
    }

    let result = engine.try_match(&order(10, "MSFT", Side::Buy, dec!(75), OrderType::Market, None));

    assert_eq!(result.fills.len(), 3);
    let ids: Vec<&str> = result
        .fills
        .iter()
        .map(|f| f.resting_order_id.as_ref().unwrap().as_str())
        .collect();
    assert_eq!(ids, vec!["TC-00001", "TC-00002", "TC-00003"]);
    assert_eq!(result.fills[2].quantity.as_decimal(), dec!(15));
    // VWAP: (60*101 + 15*102) / 75
    assert_eq!(result.fill_price.unwrap().as_decimal(), dec!(101.2));
}

#[test]
fn partial_fill_when_liquidity_runs_out() {
    let mut engine = MatchingEngine::with_seed_config(SeedConfig {
        spread_bps: dec!(10),
        depth_levels: 2,
        qty_per_level: Quantity::new(dec!(100)),
        auto_seed: true,
    });
    engine.update_reference_price("TSLA", Price::new(dec!(200)));

    let result = engine.try_match(&order(1, "TSLA", Side::Buy, dec!(250), OrderType::Market, None));

    assert!(result.matched);
    assert_eq!(result.fill_quantity.as_decimal(), dec!(200));
    assert_eq!(result.remaining_quantity.as_decimal(), dec!(50));
    assert_eq!(engine.book("TSLA").unwrap().ask_levels(), 0);
    // Bid side untouched by a buy
    assert_eq!(engine.book("TSLA").unwrap().bid_levels(), 2);
}

#[test]
fn rest_cancel_then_miss() {
    let mut engine = MatchingEngine::new();
    engine.seed("AAPL", Price::new(dec!(150)));

    let resting = order(1, "AAPL", Side::Buy, dec!(50), OrderType::Limit, Some(dec!(140)));
    let result = engine.try_match(&resting);
    assert!(!result.matched);
    assert_eq!(result.remaining_quantity.as_decimal(), dec!(50));

    assert!(engine.cancel("AAPL", &OrderId::from_sequence(1)));

    // A sell limit at 140 sweeps every bid down to 140; the cancelled
    // order must not be among the fills
    let sweep = engine.try_match(&order(2, "AAPL", Side::Sell, dec!(10000), OrderType::Limit, Some(dec!(140))));
    assert!(sweep
        .fills
        .iter()
        .all(|f| f.resting_order_id.as_ref().unwrap().as_str() != "TC-00001"));
}

#[test]
fn crossing_limits_meet_in_the_middle() {
    let mut engine = MatchingEngine::new();

    let resting = order(1, "NVDA", Side::Sell, dec!(40), OrderType::Limit, Some(dec!(120)));
    engine.try_match(&resting);

    // Buy limit above the resting ask trades at the resting price
    let result = engine.try_match(&order(2, "NVDA", Side::Buy, dec!(40), OrderType::Limit, Some(dec!(121))));

    assert!(result.matched);
    assert_eq!(result.fill_price.unwrap().as_decimal(), dec!(120));
    assert!(result.remaining_quantity.is_zero());
    let book = engine.book("NVDA").unwrap();
    assert_eq!(book.ask_levels(), 0);
    assert_eq!(book.bid_levels(), 0);
}

#[test]
fn bid_never_meets_ask_at_rest() {
    let mut engine = MatchingEngine::new();
    engine.seed("AAPL", Price::new(dec!(150)));

    // Fire a spread of passive and aggressive limits, then check the book
    for (seq, side, qty, px) in [
        (1, Side::Buy, dec!(10), dec!(149.9)),
        (2, Side::Sell, dec!(10), dec!(150.2)),
        (3, Side::Buy, dec!(500), dec!(150.08)),
        (4, Side::Sell, dec!(700), dec!(149.93)),
    ] {
        engine.try_match(&order(seq, "AAPL", side, qty, OrderType::Limit, Some(px)));
        let book = engine.book("AAPL").unwrap();
        if let (Some(bid), Some(ask)) = (book.best_bid(), book.best_ask()) {
            assert!(bid < ask, "book crossed: bid {bid} >= ask {ask}");
        }
    }
}
