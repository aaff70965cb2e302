//! QuantSignal Core: candles, indicators, the strategy contract, the
//! position state machine and performance reports.
//!
//! This crate contains the simulation engine:
//! - Domain types (candles, positions, trades, equity points)
//! - Slice-based technical indicator library
//! - Immutable per-run indicator bundle
//! - Strategy trait with explicit per-run state
//! - Built-in strategy library
//! - Single-position state machine with slippage and commission accounting
//! - Report generator over trades and the equity curve

pub mod components;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod report;
pub mod strategies;

pub use components::{
    Band, IndicatorBundle, IndicatorSpec, ParamSet, ParamValue, Signal, SignalContext, Strategy,
    StrategyError,
};
pub use domain::{Candle, EquityPoint, Position, Side, Trade};
pub use engine::{BacktestConfig, Backtester, EngineError};
pub use report::{BacktestReport, ReportSummary};
pub use strategies::{BuiltinStrategy, StrategyKind};
