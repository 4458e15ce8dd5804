//! Book keeper: trade log and positions
//!
//! Trades append to an immutable log; each one is folded into its symbol's
//! position as it arrives. Nothing here is ever deleted.

use std::collections::HashMap;

use types::position::Position;
use types::trade::Trade;

#[derive(Debug, Default)]
pub struct BookKeeper {
    trades: Vec<Trade>,
    positions: HashMap<String, Position>,
}

impl BookKeeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a trade and update its symbol's position
    pub fn book_trade(&mut self, trade: Trade) {
        let position = self
            .positions
            .entry(trade.symbol.clone())
            .or_insert_with(|| Position::new(trade.symbol.clone()));
        position.apply_fill(trade.side, trade.quantity, trade.price);

        tracing::debug!(
            trade_id = %trade.trade_id,
            symbol = %trade.symbol,
            side = trade.side.as_str(),
            quantity = %trade.quantity,
            price = %trade.price,
            "trade booked"
        );
        self.trades.push(trade);
    }

    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    /// All positions, ordered by symbol for stable reporting
    pub fn positions(&self) -> Vec<Position> {
        let mut all: Vec<Position> = self.positions.values().cloned().collect();
        all.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        all
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn trade_count(&self) -> usize {
        self.trades.len()
    }
}
