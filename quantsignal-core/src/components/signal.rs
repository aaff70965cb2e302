//! Signal vocabulary and the strategy contract.
//!
//! A strategy is an immutable value. Anything it needs to remember between
//! bars (entry price, last stop index, armed pivots) lives in its associated
//! `State`, which the engine creates fresh for each run and threads through
//! every `evaluate` call. One strategy value can therefore back many
//! concurrent runs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::indicator::IndicatorBundle;
use crate::domain::Candle;

/// Discrete action proposed for the current bar. "No signal" is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    /// Close a short if one is open, then go long if flat.
    Buy,
    /// Close a long if one is open, then go short if flat.
    Sell,
    /// Close an open long; no-op otherwise.
    CloseLong,
    /// Close an open short; no-op otherwise.
    CloseShort,
}

/// Failure raised by a strategy, either while being built or while evaluating.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StrategyError {
    #[error("indicator not in bundle: {0}")]
    MissingIndicator(String),

    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("{0}")]
    Evaluation(String),
}

/// Everything a strategy may look at on bar `index`.
///
/// The full candle slice is visible; strategies are trusted not to read past
/// `index`.
#[derive(Debug, Clone, Copy)]
pub struct SignalContext<'a> {
    pub candles: &'a [Candle],
    pub indicators: &'a IndicatorBundle,
    pub index: usize,
}

impl<'a> SignalContext<'a> {
    pub fn new(candles: &'a [Candle], indicators: &'a IndicatorBundle, index: usize) -> Self {
        Self {
            candles,
            indicators,
            index,
        }
    }

    pub fn candle(&self) -> &'a Candle {
        &self.candles[self.index]
    }

    pub fn close(&self) -> f64 {
        self.candle().close
    }
}

/// A pluggable signal generator.
pub trait Strategy: Send + Sync {
    /// Per-run mutable memory.
    type State: Send;

    /// Stable identifier, used in logs and error messages.
    fn name(&self) -> &str;

    /// Indicators this strategy reads from the bundle.
    fn indicators(&self) -> Vec<super::indicator::IndicatorSpec>;

    /// Fresh state for a new run.
    fn init_state(&self) -> Self::State;

    /// Decide the signal for `ctx.index`.
    fn evaluate(
        &self,
        ctx: &SignalContext<'_>,
        state: &mut Self::State,
    ) -> Result<Option<Signal>, StrategyError>;
}
