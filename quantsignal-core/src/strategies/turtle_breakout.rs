//! Pivot breakout ("turtle") strategy.
//!
//! A pivot high is a bar whose high is strictly above the `left_bars` highs
//! before it and the `right_bars` highs after it; it is only confirmed
//! `right_bars` bars later. A confirmed pivot arms a long entry that fires once
//! the high breaks above the pivot price. Pivot lows mirror this for shorts.
//! Signals are at least `min_hold_bars` apart.

use crate::components::{IndicatorSpec, ParamSet, Signal, SignalContext, Strategy, StrategyError};

use super::require_positive;

#[derive(Debug, Clone, PartialEq)]
pub struct TurtleBreakout {
    pub left_bars: usize,
    pub right_bars: usize,
    pub min_hold_bars: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurtleState {
    pub pivot_high: f64,
    pub pivot_low: f64,
    pub long_armed: bool,
    pub short_armed: bool,
    pub last_signal_bar: Option<usize>,
}

impl TurtleBreakout {
    pub const NAME: &'static str = "turtle_breakout";

    pub fn new(
        left_bars: usize,
        right_bars: usize,
        min_hold_bars: usize,
    ) -> Result<Self, StrategyError> {
        require_positive("left_bars", left_bars)?;
        Ok(Self {
            left_bars,
            right_bars,
            min_hold_bars,
        })
    }

    pub fn from_params(params: &ParamSet) -> Result<Self, StrategyError> {
        Self::new(
            params.usize_or("left_bars", 4)?,
            params.usize_or("right_bars", 2)?,
            params.usize_or("min_hold_bars", 6)?,
        )
    }

    pub fn default_params() -> ParamSet {
        ParamSet::new()
            .with("left_bars", 4)
            .with("right_bars", 2)
            .with("min_hold_bars", 6)
    }

    /// Pivot confirmed at `index`, i.e. centred on `index - right_bars`.
    fn pivot(&self, series: &[f64], index: usize, beats: impl Fn(f64, f64) -> bool) -> Option<f64> {
        let p = index.checked_sub(self.right_bars)?;
        if p < self.left_bars || index >= series.len() {
            return None;
        }
        let val = series[p];
        let left = &series[p - self.left_bars..p];
        let right = &series[p + 1..=index];
        if left.iter().chain(right).all(|&other| beats(val, other)) {
            Some(val)
        } else {
            None
        }
    }
}

impl Strategy for TurtleBreakout {
    type State = TurtleState;

    fn name(&self) -> &str {
        Self::NAME
    }

    fn indicators(&self) -> Vec<IndicatorSpec> {
        Vec::new()
    }

    fn init_state(&self) -> TurtleState {
        TurtleState::default()
    }

    fn evaluate(
        &self,
        ctx: &SignalContext<'_>,
        state: &mut TurtleState,
    ) -> Result<Option<Signal>, StrategyError> {
        let i = ctx.index;
        if i <= self.left_bars + self.right_bars {
            *state = TurtleState::default();
            return Ok(None);
        }

        let highs = ctx.indicators.high();
        let lows = ctx.indicators.low();

        if let Some(price) = self.pivot(highs, i, |v, other| v > other) {
            state.pivot_high = price;
            state.long_armed = true;
        }
        if let Some(price) = self.pivot(lows, i, |v, other| v < other) {
            state.pivot_low = price;
            state.short_armed = true;
        }

        if let Some(last) = state.last_signal_bar {
            if i - last < self.min_hold_bars {
                return Ok(None);
            }
        }

        let candle = ctx.candle();
        if state.long_armed && state.pivot_high > 0.0 && candle.high > state.pivot_high {
            state.long_armed = false;
            state.last_signal_bar = Some(i);
            return Ok(Some(Signal::Buy));
        }
        if state.short_armed && state.pivot_low > 0.0 && candle.low < state.pivot_low {
            state.short_armed = false;
            state.last_signal_bar = Some(i);
            return Ok(Some(Signal::Sell));
        }
        Ok(None)
    }
}
