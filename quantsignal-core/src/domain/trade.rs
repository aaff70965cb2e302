use serde::{Deserialize, Serialize};

use super::candle::MS_PER_DAY;
use super::position::Side;

/// A completed entry → exit cycle.
///
/// `pnl` is the price pnl on the position size (quote currency) and excludes
/// fees. `commission` is the round trip: the entry fee deducted when the
/// position opened plus the exit fee deducted on close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub side: Side,
    pub entry_price: f64,
    pub exit_price: f64,
    pub entry_time: i64,
    pub exit_time: i64,
    pub size: f64,
    pub pnl: f64,
    pub pnl_percent: f64,
    pub commission: f64,
}

impl Trade {
    /// Strictly positive pnl. Break-even trades count as losers.
    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }

    pub fn holding_ms(&self) -> i64 {
        self.exit_time - self.entry_time
    }

    pub fn holding_days(&self) -> f64 {
        self.holding_ms() as f64 / MS_PER_DAY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trade(pnl: f64) -> Trade {
        Trade {
            side: Side::Long,
            entry_price: 100.0,
            exit_price: 100.0 + pnl,
            entry_time: 0,
            exit_time: 2 * 86_400_000,
            size: 1.0,
            pnl,
            pnl_percent: pnl,
            commission: 0.5,
        }
    }

    #[test]
    fn zero_pnl_is_not_a_winner() {
        assert!(!trade(0.0).is_winner());
        assert!(trade(0.01).is_winner());
    }

    #[test]
    fn holding_days_from_millis() {
        assert_eq!(trade(1.0).holding_days(), 2.0);
    }
}
