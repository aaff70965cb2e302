//! Dual EMA trend follower with RSI confirmation, percent stop-loss and a
//! cooldown after stops.
//!
//! Per bar, in order:
//! 1. Stop-loss on the strategy's own position (close vs entry ± sl_pct).
//! 2. Cooldown: no entries within `cooldown` bars of the last stop.
//! 3. Entries on fast/slow EMA crosses, long only with RSI > 50, short only
//!    with RSI < 50.

use crate::components::{
    Band, IndicatorSpec, ParamSet, Signal, SignalContext, Strategy, StrategyError,
};
use crate::domain::Side;
use crate::indicators::{crossover, crossunder};

use super::require_positive;

#[derive(Debug, Clone, PartialEq)]
pub struct DualEma {
    pub fast_len: usize,
    pub slow_len: usize,
    pub rsi_len: usize,
    /// Stop distance as a fraction of the entry price.
    pub sl_pct: f64,
    pub cooldown: usize,
}

/// What the strategy believes it holds. Tracked independently of the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DualEmaState {
    pub side: Option<Side>,
    pub entry_price: f64,
    pub last_stop_bar: Option<usize>,
}

impl DualEma {
    pub const NAME: &'static str = "dual_ema";

    pub fn new(
        fast_len: usize,
        slow_len: usize,
        rsi_len: usize,
        sl_pct: f64,
        cooldown: usize,
    ) -> Result<Self, StrategyError> {
        require_positive("fast_len", fast_len)?;
        require_positive("rsi_len", rsi_len)?;
        if fast_len >= slow_len {
            return Err(StrategyError::InvalidParameter {
                name: "fast_len".into(),
                reason: format!("must be below slow_len ({fast_len} >= {slow_len})"),
            });
        }
        if !(sl_pct > 0.0 && sl_pct < 1.0) {
            return Err(StrategyError::InvalidParameter {
                name: "sl_pct".into(),
                reason: format!("must be in (0, 1), got {sl_pct}"),
            });
        }
        Ok(Self {
            fast_len,
            slow_len,
            rsi_len,
            sl_pct,
            cooldown,
        })
    }

    pub fn from_params(params: &ParamSet) -> Result<Self, StrategyError> {
        Self::new(
            params.usize_or("fast_len", 50)?,
            params.usize_or("slow_len", 200)?,
            params.usize_or("rsi_len", 14)?,
            params.f64_or("sl_pct", 0.05)?,
            params.usize_or("cooldown", 3)?,
        )
    }

    pub fn default_params() -> ParamSet {
        ParamSet::new()
            .with("fast_len", 50)
            .with("slow_len", 200)
            .with("rsi_len", 14)
            .with("sl_pct", 0.05)
            .with("cooldown", 3)
    }

    fn fast(&self) -> IndicatorSpec {
        IndicatorSpec::Ema {
            period: self.fast_len,
        }
    }

    fn slow(&self) -> IndicatorSpec {
        IndicatorSpec::Ema {
            period: self.slow_len,
        }
    }

    fn rsi(&self) -> IndicatorSpec {
        IndicatorSpec::Rsi {
            period: self.rsi_len,
        }
    }
}

impl Strategy for DualEma {
    type State = DualEmaState;

    fn name(&self) -> &str {
        Self::NAME
    }

    fn indicators(&self) -> Vec<IndicatorSpec> {
        vec![self.fast(), self.slow(), self.rsi()]
    }

    fn init_state(&self) -> DualEmaState {
        DualEmaState::default()
    }

    fn evaluate(
        &self,
        ctx: &SignalContext<'_>,
        state: &mut DualEmaState,
    ) -> Result<Option<Signal>, StrategyError> {
        let i = ctx.index;
        let fast = ctx.indicators.require(&self.fast(), Band::Primary)?;
        let slow = ctx.indicators.require(&self.slow(), Band::Primary)?;
        let rsi = match ctx.indicators.value(&self.rsi(), Band::Primary, i) {
            Some(v) => v,
            None => return Ok(None),
        };
        if fast[i].is_nan() || slow[i].is_nan() {
            return Ok(None);
        }
        let close = ctx.close();

        let stopped = match state.side {
            Some(Side::Long) if close <= state.entry_price * (1.0 - self.sl_pct) => {
                Some(Signal::CloseLong)
            }
            Some(Side::Short) if close >= state.entry_price * (1.0 + self.sl_pct) => {
                Some(Signal::CloseShort)
            }
            _ => None,
        };
        if stopped.is_some() {
            state.side = None;
            state.last_stop_bar = Some(i);
            return Ok(stopped);
        }

        if let Some(bar) = state.last_stop_bar {
            if i - bar <= self.cooldown {
                return Ok(None);
            }
        }

        if crossover(fast, slow, i) && rsi > 50.0 {
            state.side = Some(Side::Long);
            state.entry_price = close;
            return Ok(Some(Signal::Buy));
        }
        if crossunder(fast, slow, i) && rsi < 50.0 {
            state.side = Some(Side::Short);
            state.entry_price = close;
            return Ok(Some(Signal::Sell));
        }
        Ok(None)
    }
}
