//! Matching engine core
//!
//! One order book per symbol, plus a reference-price table used to seed
//! synthetic liquidity the first time a symbol trades. Market orders walk
//! the opposite side; marketable limits cross first and rest the
//! remainder.

use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use types::ids::OrderId;
use types::numeric::{Price, Quantity};
use types::order::{Order, OrderType, Side};

use crate::book::{BookEntry, DepthLevel, Fill, OrderBook};

/// Parameters for synthetic book seeding
#[derive(Debug, Clone)]
pub struct SeedConfig {
    /// Full bid-ask spread in basis points; seeding applies half per side
    pub spread_bps: Decimal,
    pub depth_levels: usize,
    pub qty_per_level: Quantity,
    /// Seed lazily on first arrival of an order for a symbol with a
    /// registered reference price
    pub auto_seed: bool,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            spread_bps: dec!(10),
            depth_levels: 5,
            qty_per_level: Quantity::new(dec!(1000)),
            auto_seed: true,
        }
    }
}

/// One fill produced by matching, in consumption order
#[derive(Debug, Clone)]
pub struct FillEvent {
    /// The incoming order that removed liquidity
    pub order_id: OrderId,
    /// The consumed resting entry; `None` for the synthetic fallback fill
    pub resting_order_id: Option<OrderId>,
    pub price: Price,
    pub quantity: Quantity,
}

/// Outcome of matching one order
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub matched: bool,
    /// Volume-weighted average over `fills`; `None` when nothing matched
    pub fill_price: Option<Price>,
    pub fill_quantity: Quantity,
    /// For a rested limit this is the quantity now sitting in the book
    pub remaining_quantity: Quantity,
    pub fills: Vec<FillEvent>,
}

impl MatchResult {
    fn unmatched(order_quantity: Quantity) -> Self {
        Self {
            matched: false,
            fill_price: None,
            fill_quantity: Quantity::zero(),
            remaining_quantity: order_quantity,
            fills: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct MatchingEngine {
    books: HashMap<String, OrderBook>,
    reference_prices: HashMap<String, Price>,
    seed_config: SeedConfig,
}

impl MatchingEngine {
    pub fn new() -> Self {
        Self::with_seed_config(SeedConfig::default())
    }

    pub fn with_seed_config(seed_config: SeedConfig) -> Self {
        Self {
            books: HashMap::new(),
            reference_prices: HashMap::new(),
            seed_config,
        }
    }

    /// Match one validated order against its symbol's book.
    ///
    /// Lazily seeds the book when the symbol has no book yet but a
    /// reference price is registered.
    pub fn try_match(&mut self, order: &Order) -> MatchResult {
        let symbol = order.symbol();

        if self.seed_config.auto_seed && !self.books.contains_key(symbol) {
            if let Some(reference) = self.reference_prices.get(symbol).copied() {
                self.seed(symbol, reference);
            }
        }

        match order.order_type {
            OrderType::Market => self.match_market_order(order),
            OrderType::Limit => match order.limit_price {
                Some(limit) => self.match_limit_order(order, limit),
                None => MatchResult::unmatched(order.quantity),
            },
        }
    }

    fn match_market_order(&mut self, order: &Order) -> MatchResult {
        let consumed = match self.books.get_mut(order.symbol()) {
            Some(book) => match order.side {
                Side::Buy => book.consume_asks(order.quantity),
                Side::Sell => book.consume_bids(order.quantity),
            },
            None => Vec::new(),
        };

        if consumed.is_empty() {
            // Legacy fallback: no liquidity at all, but the client sent a
            // price hint on the order itself
            if let Some(price) = order.limit_price {
                return MatchResult {
                    matched: true,
                    fill_price: Some(price),
                    fill_quantity: order.quantity,
                    remaining_quantity: Quantity::zero(),
                    fills: vec![FillEvent {
                        order_id: order.order_id.clone(),
                        resting_order_id: None,
                        price,
                        quantity: order.quantity,
                    }],
                };
            }
            return MatchResult::unmatched(order.quantity);
        }

        Self::aggregate(order, consumed)
    }

    fn match_limit_order(&mut self, order: &Order, limit: Price) -> MatchResult {
        let book = self.books.entry(order.symbol().to_string()).or_default();

        let mut remaining = order.quantity;
        let mut consumed: Vec<Fill> = Vec::new();

        // One best level at a time, so nothing beyond the limit is ever
        // taken out of the book
        while !remaining.is_zero() {
            let Some((best, level_qty)) = book.best_level(order.side.opposite()) else {
                break;
            };
            let crosses = match order.side {
                Side::Buy => best <= limit,
                Side::Sell => best >= limit,
            };
            if !crosses {
                break;
            }

            let take = remaining.min(level_qty);
            let fills = match order.side {
                Side::Buy => book.consume_asks(take),
                Side::Sell => book.consume_bids(take),
            };
            for fill in fills {
                remaining = remaining - fill.quantity;
                consumed.push(fill);
            }
        }

        let mut result = if consumed.is_empty() {
            MatchResult::unmatched(order.quantity)
        } else {
            Self::aggregate(order, consumed)
        };

        // Rest the remainder at the limit price
        if !remaining.is_zero() {
            book.add(
                order.side,
                BookEntry {
                    order_id: order.order_id.clone(),
                    cl_ord_id: order.cl_ord_id.clone(),
                    price: limit,
                    remaining_quantity: remaining,
                    original_quantity: order.quantity,
                    sequence: 0,
                },
            );
            tracing::debug!(
                order_id = %order.order_id,
                symbol = order.symbol(),
                price = %limit,
                quantity = %remaining,
                "limit remainder rested"
            );
            result.remaining_quantity = remaining;
        }

        result
    }

    fn aggregate(order: &Order, consumed: Vec<Fill>) -> MatchResult {
        let mut total_qty = Quantity::zero();
        let mut notional = Decimal::ZERO;
        let mut fills = Vec::with_capacity(consumed.len());

        for fill in consumed {
            total_qty = total_qty + fill.quantity;
            notional += fill.quantity.notional(fill.price);
            fills.push(FillEvent {
                order_id: order.order_id.clone(),
                resting_order_id: Some(fill.order_id),
                price: fill.price,
                quantity: fill.quantity,
            });
        }

        let vwap = Price::try_new(notional / total_qty.as_decimal());
        MatchResult {
            matched: true,
            fill_price: vwap,
            fill_quantity: total_qty,
            remaining_quantity: order.quantity - total_qty,
            fills,
        }
    }

    /// Seed synthetic liquidity around `reference`.
    ///
    /// Level i rests a bid at `ref - half_spread - i*tick` and an ask at
    /// `ref + half_spread + i*tick`, where the tick equals the half
    /// spread (0.01 when the configured spread is non-positive).
    pub fn seed(&mut self, symbol: &str, reference: Price) {
        let config = self.seed_config.clone();
        let book = self.books.entry(symbol.to_string()).or_default();

        // spread_bps is the full spread in basis points, half per side
        let half_spread = reference.as_decimal() * config.spread_bps / dec!(20000);
        let tick = if half_spread > Decimal::ZERO {
            half_spread
        } else {
            dec!(0.01)
        };

        for i in 0..config.depth_levels {
            let offset = half_spread + Decimal::from(i as u64) * tick;

            if let Some(bid_price) = Price::try_new(reference.as_decimal() - offset) {
                book.add(
                    Side::Buy,
                    seed_entry(OrderId::seeded('B', symbol, i), bid_price, config.qty_per_level),
                );
            }
            if let Some(ask_price) = Price::try_new(reference.as_decimal() + offset) {
                book.add(
                    Side::Sell,
                    seed_entry(OrderId::seeded('A', symbol, i), ask_price, config.qty_per_level),
                );
            }
        }

        tracing::info!(
            symbol,
            reference = %reference,
            levels = config.depth_levels,
            "book seeded around reference price"
        );
    }

    /// Cancel a resting order. False when the symbol or id is unknown.
    pub fn cancel(&mut self, symbol: &str, order_id: &OrderId) -> bool {
        match self.books.get_mut(symbol) {
            Some(book) => book.cancel(order_id),
            None => false,
        }
    }

    /// Store the last known market price hint. Never mutates an existing
    /// book.
    pub fn update_reference_price(&mut self, symbol: &str, price: Price) {
        self.reference_prices.insert(symbol.to_string(), price);
    }

    pub fn reference_price(&self, symbol: &str) -> Option<Price> {
        self.reference_prices.get(symbol).copied()
    }

    pub fn book(&self, symbol: &str) -> Option<&OrderBook> {
        self.books.get(symbol)
    }

    /// Depth snapshot for one side of one symbol; empty when no book
    pub fn depth(&self, symbol: &str, side: Side, levels: usize) -> Vec<DepthLevel> {
        self.books
            .get(symbol)
            .map(|book| book.depth(side, levels))
            .unwrap_or_default()
    }
}

fn seed_entry(order_id: OrderId, price: Price, quantity: Quantity) -> BookEntry {
    BookEntry {
        cl_ord_id: order_id.as_str().to_string(),
        order_id,
        price,
        remaining_quantity: quantity,
        original_quantity: quantity,
        sequence: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::instrument::Instrument;
    use types::order::{OrderStatus, TimeInForce};

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
            "test",
        );
        o.status = OrderStatus::Accepted;
        o
    }

    #[test]
    fn seeding_places_levels_half_a_spread_out() {
        let mut engine = MatchingEngine::new();
        engine.seed("AAPL", Price::new(dec!(150)));

        let book = engine.book("AAPL").unwrap();
        // 150 * 10bps / 2 = 0.075
        assert_eq!(book.best_ask().unwrap().as_decimal(), dec!(150.075));
        assert_eq!(book.best_bid().unwrap().as_decimal(), dec!(149.925));
        assert_eq!(book.bid_levels(), 5);
        assert_eq!(book.ask_levels(), 5);
    }

    #[test]
    fn book_is_never_crossed_after_seeding() {
        let mut engine = MatchingEngine::new();
        engine.seed("AAPL", Price::new(dec!(150)));
        let book = engine.book("AAPL").unwrap();
        assert!(book.best_bid().unwrap() < book.best_ask().unwrap());
    }

    #[test]
    fn market_buy_fills_at_best_ask_after_auto_seed() {
        let mut engine = MatchingEngine::new();
        engine.update_reference_price("AAPL", Price::new(dec!(150)));

        let result = engine.try_match(&order(1, "AAPL", Side::Buy, dec!(100), OrderType::Market, None));

        assert!(result.matched);
        assert_eq!(result.fill_quantity.as_decimal(), dec!(100));
        assert_eq!(result.fill_price.unwrap().as_decimal(), dec!(150.075));
        assert!(result.remaining_quantity.is_zero());
        assert_eq!(result.fills.len(), 1);
        assert_eq!(
            result.fills[0].resting_order_id.as_ref().unwrap().as_str(),
            "SEED-A-AAPL-0"
        );
    }

    #[test]
    fn market_walk_aggregates_vwap_across_levels() {
        let mut engine = MatchingEngine::with_seed_config(SeedConfig {
            spread_bps: dec!(10),
            depth_levels: 2,
            qty_per_level: Quantity::new(dec!(100)),
            auto_seed: true,
        });
        engine.seed("TSLA", Price::new(dec!(200)));

        // Asks at 200.1 and 200.2, 100 each; buying 250 leaves 50 unfilled
        let result = engine.try_match(&order(1, "TSLA", Side::Buy, dec!(250), OrderType::Market, None));

        assert!(result.matched);
        assert_eq!(result.fill_quantity.as_decimal(), dec!(200));
        assert_eq!(result.remaining_quantity.as_decimal(), dec!(50));
        // (100*200.1 + 100*200.2) / 200
        assert_eq!(result.fill_price.unwrap().as_decimal(), dec!(200.15));
        assert_eq!(result.fills.len(), 2);
        assert_eq!(result.fills[0].price.as_decimal(), dec!(200.1));
        assert_eq!(result.fills[1].price.as_decimal(), dec!(200.2));
    }

    #[test]
    fn market_sell_consumes_bids() {
        let mut engine = MatchingEngine::new();
        engine.seed("AAPL", Price::new(dec!(150)));

        let result = engine.try_match(&order(1, "AAPL", Side::Sell, dec!(100), OrderType::Market, None));

        assert!(result.matched);
        assert_eq!(result.fill_price.unwrap().as_decimal(), dec!(149.925));
    }

    #[test]
    fn market_order_without_book_or_hint_does_not_match() {
        let mut engine = MatchingEngine::new();
        let result = engine.try_match(&order(1, "ZZZ", Side::Buy, dec!(10), OrderType::Market, None));
        assert!(!result.matched);
        assert!(result.fills.is_empty());
        assert_eq!(result.remaining_quantity.as_decimal(), dec!(10));
    }

    #[test]
    fn market_order_falls_back_to_its_own_price_hint() {
        let mut engine = MatchingEngine::new();
        let result = engine.try_match(&order(
            1,
            "ZZZ",
            Side::Buy,
            dec!(10),
            OrderType::Market,
            Some(dec!(42)),
        ));

        assert!(result.matched);
        assert_eq!(result.fill_price.unwrap().as_decimal(), dec!(42));
        assert_eq!(result.fill_quantity.as_decimal(), dec!(10));
        assert!(result.fills[0].resting_order_id.is_none());
    }

    #[test]
    fn aggressive_limit_buy_crosses_then_rests() {
        let mut engine = MatchingEngine::with_seed_config(SeedConfig {
            spread_bps: dec!(10),
            depth_levels: 2,
            qty_per_level: Quantity::new(dec!(100)),
            auto_seed: true,
        });
        engine.seed("TSLA", Price::new(dec!(200)));

        // Crosses only the 200.1 level; 200.2 is beyond the limit
        let result = engine.try_match(&order(
            1,
            "TSLA",
            Side::Buy,
            dec!(150),
            OrderType::Limit,
            Some(dec!(200.1)),
        ));

        assert!(result.matched);
        assert_eq!(result.fill_quantity.as_decimal(), dec!(100));
        assert_eq!(result.fill_price.unwrap().as_decimal(), dec!(200.1));
        assert_eq!(result.remaining_quantity.as_decimal(), dec!(50));

        // Remainder rests at the limit and becomes the new best bid
        let book = engine.book("TSLA").unwrap();
        assert_eq!(book.best_bid().unwrap().as_decimal(), dec!(200.1));
        // Deeper ask level untouched
        assert_eq!(book.best_ask().unwrap().as_decimal(), dec!(200.2));
        assert_eq!(book.best_level(Side::Sell).unwrap().1.as_decimal(), dec!(100));
    }

    #[test]
    fn limit_never_trades_beyond_its_price() {
        let mut engine = MatchingEngine::new();
        engine.seed("AAPL", Price::new(dec!(150)));

        let result = engine.try_match(&order(
            1,
            "AAPL",
            Side::Sell,
            dec!(5000),
            OrderType::Limit,
            Some(dec!(149.8)),
        ));

        for fill in &result.fills {
            assert!(fill.price.as_decimal() >= dec!(149.8));
        }
    }

    #[test]
    fn passive_limit_rests_without_fills() {
        let mut engine = MatchingEngine::new();
        engine.seed("AAPL", Price::new(dec!(150)));

        let result = engine.try_match(&order(
            1,
            "AAPL",
            Side::Buy,
            dec!(50),
            OrderType::Limit,
            Some(dec!(140)),
        ));

        assert!(!result.matched);
        assert!(result.fills.is_empty());
        assert_eq!(result.remaining_quantity.as_decimal(), dec!(50));

        let depth = engine.depth("AAPL", Side::Buy, 10);
        let level = depth
            .iter()
            .find(|l| l.price.as_decimal() == dec!(140))
            .unwrap();
        assert_eq!(level.quantity.as_decimal(), dec!(50));
    }

    #[test]
    fn cancel_dispatches_to_the_symbol_book() {
        let mut engine = MatchingEngine::new();
        engine.seed("AAPL", Price::new(dec!(150)));

        assert!(engine.cancel("AAPL", &OrderId::new("SEED-B-AAPL-0")));
        assert!(!engine.cancel("AAPL", &OrderId::new("SEED-B-AAPL-0")));
        assert!(!engine.cancel("MSFT", &OrderId::new("SEED-B-AAPL-0")));
    }

    #[test]
    fn reference_price_is_a_hint_not_a_book_mutation() {
        let mut engine = MatchingEngine::new();
        engine.seed("AAPL", Price::new(dec!(150)));
        engine.update_reference_price("AAPL", Price::new(dec!(500)));

        assert_eq!(engine.reference_price("AAPL").unwrap().as_decimal(), dec!(500));
        // The existing book is untouched
        assert_eq!(
            engine.book("AAPL").unwrap().best_ask().unwrap().as_decimal(),
            dec!(150.075)
        );
    }
}
