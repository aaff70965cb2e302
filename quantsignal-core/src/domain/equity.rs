use serde::{Deserialize, Serialize};

/// Mark-to-market equity after one processed candle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub time: i64,
    pub equity: f64,
    /// Close price of the candle the point was recorded on.
    pub price: f64,
}
