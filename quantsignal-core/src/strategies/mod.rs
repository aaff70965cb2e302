//! Built-in strategy library.
//!
//! Each strategy is built from a [`ParamSet`](crate::components::ParamSet)
//! with per-strategy defaults and keeps its bar-to-bar memory in an explicit
//! state type. [`StrategyKind`] and [`BuiltinStrategy`] select one at runtime.

pub mod dual_ema;
pub mod dual_supertrend;
pub mod ma_cross;
pub mod macd_ma;
pub mod mean_reversion;
pub mod registry;
pub mod turtle_breakout;

pub use dual_ema::{DualEma, DualEmaState};
pub use dual_supertrend::DualSuperTrend;
pub use ma_cross::MaCross;
pub use macd_ma::MacdMa;
pub use mean_reversion::{MeanReversion, MeanReversionState};
pub use registry::{BuiltinState, BuiltinStrategy, StrategyKind};
pub use turtle_breakout::{TurtleBreakout, TurtleState};

use crate::components::StrategyError;

fn require_positive(name: &str, value: usize) -> Result<(), StrategyError> {
    if value == 0 {
        return Err(StrategyError::InvalidParameter {
            name: name.to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(())
}

fn require_positive_f64(name: &str, value: f64) -> Result<(), StrategyError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(StrategyError::InvalidParameter {
            name: name.to_string(),
            reason: format!("must be positive, got {value}"),
        });
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::components::{IndicatorBundle, Signal, SignalContext, Strategy};
    use crate::domain::Candle;

    /// Hourly candles with a one-point range around each close.
    pub fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Candle {
                open_time: i as i64 * 3_600_000,
                open: c,
                high: c + 0.5,
                low: c - 0.5,
                close: c,
                volume: 1_000.0,
                close_time: i as i64 * 3_600_000 + 3_599_999,
            })
            .collect()
    }

    /// Signal per bar as the engine would see it (bar 0 is never evaluated).
    pub fn signals<S: Strategy>(strategy: &S, candles: &[Candle]) -> Vec<Option<Signal>> {
        let bundle = IndicatorBundle::build(candles, &strategy.indicators());
        let mut state = strategy.init_state();
        let mut out = vec![None];
        for i in 1..candles.len() {
            let ctx = SignalContext::new(candles, &bundle, i);
            out.push(strategy.evaluate(&ctx, &mut state).unwrap());
        }
        out
    }
}
