//! QuantSignal Runner: orchestration around the simulation core.
//!
//! This crate builds on `quantsignal-core` to provide:
//! - TOML run files for single runs and grid searches
//! - CSV candle loading and a seeded synthetic candle source
//! - Exhaustive parameter grid search with per-combination failure isolation
//! - A bounded, caller-owned report cache
//! - Dataset fingerprinting

pub mod cache;
pub mod config;
pub mod data_loader;
pub mod runner;
pub mod sweep;

pub use cache::{CacheKey, ReportCache};
pub use config::{ConfigError, RunFile, StrategySection};
pub use data_loader::{dataset_hash, load_csv, read_csv, synthetic_candles, LoadError};
pub use runner::{run_search, run_single, run_single_cached, RunError};
pub use sweep::{
    grid_search, GridAxis, ParamGrid, SearchError, SearchOptions, SearchOutcome, SearchResult,
    SkippedCombination,
};
