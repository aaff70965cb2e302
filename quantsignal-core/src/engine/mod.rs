//! Backtesting engine: the position state machine and its accounting.
//!
//! One run owns its capital, its single open position and its trade and
//! equity lists. Runs share nothing mutable, so independent runs over the
//! same candles and bundle can execute on separate threads.

pub mod accounting;
pub mod config;
pub mod error;
pub mod loop_runner;

pub use accounting::Ledger;
pub use config::BacktestConfig;
pub use error::EngineError;
pub use loop_runner::{Backtester, SimulationOutcome, MIN_CANDLES};
