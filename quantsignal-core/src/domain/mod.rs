//! Domain types for QuantSignal

pub mod candle;
pub mod equity;
pub mod position;
pub mod trade;

pub use candle::{date_from_millis, Candle, MS_PER_DAY};
pub use equity::EquityPoint;
pub use position::{Position, Side};
pub use trade::Trade;
