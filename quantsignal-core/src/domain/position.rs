use serde::{Deserialize, Serialize};

/// Direction of an open position or a completed trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// +1 for long, -1 for short.
    pub fn sign(self) -> f64 {
        match self {
            Side::Long => 1.0,
            Side::Short => -1.0,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Long => f.pad("LONG"),
            Side::Short => f.pad("SHORT"),
        }
    }
}

/// The single open position of a simulation run.
///
/// `entry_price` is already slipped. `entry_commission` was deducted from
/// capital when the position opened and is carried here so the closing trade
/// can report the round-trip cost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub side: Side,
    pub entry_price: f64,
    pub entry_time: i64,
    pub size: f64,
    pub entry_commission: f64,
}

impl Position {
    /// Directional pnl of the whole position at `price`.
    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.side.sign() * (price - self.entry_price) * self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(side: Side) -> Position {
        Position {
            side,
            entry_price: 100.0,
            entry_time: 0,
            size: 10.0,
            entry_commission: 0.0,
        }
    }

    #[test]
    fn long_gains_when_price_rises() {
        let pos = position(Side::Long);
        assert_eq!(pos.unrealized_pnl(110.0), 100.0);
        assert_eq!(pos.unrealized_pnl(90.0), -100.0);
    }

    #[test]
    fn short_gains_when_price_falls() {
        let pos = position(Side::Short);
        assert_eq!(pos.unrealized_pnl(90.0), 100.0);
        assert_eq!(pos.unrealized_pnl(110.0), -100.0);
    }

    #[test]
    fn side_serializes_upper_case() {
        assert_eq!(serde_json::to_string(&Side::Short).unwrap(), "\"SHORT\"");
    }
}
