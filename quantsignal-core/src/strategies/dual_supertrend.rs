//! Two aligned SuperTrends plus a Donchian breakout.
//!
//! Entries need both SuperTrends pointing the same way and a close beyond the
//! previous bar's Donchian channel. While the fast SuperTrend points down it
//! asks to close longs, while it points up it asks to close shorts.

use crate::components::{
    Band, IndicatorSpec, ParamSet, Signal, SignalContext, Strategy, StrategyError,
};

use super::{require_positive, require_positive_f64};

#[derive(Debug, Clone, PartialEq)]
pub struct DualSuperTrend {
    pub st1_period: usize,
    pub st1_mult: f64,
    pub st2_period: usize,
    pub st2_mult: f64,
    pub donchian_period: usize,
}

impl DualSuperTrend {
    pub const NAME: &'static str = "dual_supertrend";

    pub fn new(
        st1_period: usize,
        st1_mult: f64,
        st2_period: usize,
        st2_mult: f64,
        donchian_period: usize,
    ) -> Result<Self, StrategyError> {
        require_positive("st1_period", st1_period)?;
        require_positive("st2_period", st2_period)?;
        require_positive("donchian_period", donchian_period)?;
        require_positive_f64("st1_mult", st1_mult)?;
        require_positive_f64("st2_mult", st2_mult)?;
        Ok(Self {
            st1_period,
            st1_mult,
            st2_period,
            st2_mult,
            donchian_period,
        })
    }

    pub fn from_params(params: &ParamSet) -> Result<Self, StrategyError> {
        Self::new(
            params.usize_or("st1_period", 10)?,
            params.f64_or("st1_mult", 3.0)?,
            params.usize_or("st2_period", 20)?,
            params.f64_or("st2_mult", 4.0)?,
            params.usize_or("donchian_period", 20)?,
        )
    }

    pub fn default_params() -> ParamSet {
        ParamSet::new()
            .with("st1_period", 10)
            .with("st1_mult", 3.0)
            .with("st2_period", 20)
            .with("st2_mult", 4.0)
            .with("donchian_period", 20)
    }

    fn fast(&self) -> IndicatorSpec {
        IndicatorSpec::SuperTrend {
            period: self.st1_period,
            multiplier: self.st1_mult,
        }
    }

    fn slow(&self) -> IndicatorSpec {
        IndicatorSpec::SuperTrend {
            period: self.st2_period,
            multiplier: self.st2_mult,
        }
    }

    fn channel(&self) -> IndicatorSpec {
        IndicatorSpec::Donchian {
            period: self.donchian_period,
        }
    }
}

impl Strategy for DualSuperTrend {
    type State = ();

    fn name(&self) -> &str {
        Self::NAME
    }

    fn indicators(&self) -> Vec<IndicatorSpec> {
        vec![self.fast(), self.slow(), self.channel()]
    }

    fn init_state(&self) -> Self::State {}

    fn evaluate(
        &self,
        ctx: &SignalContext<'_>,
        _state: &mut Self::State,
    ) -> Result<Option<Signal>, StrategyError> {
        let i = ctx.index;
        let bundle = ctx.indicators;
        let (fast, slow, channel) = (self.fast(), self.slow(), self.channel());
        bundle.require(&fast, Band::Direction)?;
        bundle.require(&slow, Band::Direction)?;
        bundle.require(&channel, Band::Upper)?;

        let d1 = bundle.value(&fast, Band::Direction, i);
        let d2 = bundle.value(&slow, Band::Direction, i);
        let prev = i.checked_sub(1);
        let upper_prev = prev.and_then(|p| bundle.value(&channel, Band::Upper, p));
        let lower_prev = prev.and_then(|p| bundle.value(&channel, Band::Lower, p));
        let close = ctx.close();

        let trend_up = d1 == Some(1.0) && d2 == Some(1.0);
        let trend_down = d1 == Some(-1.0) && d2 == Some(-1.0);

        if trend_up && upper_prev.is_some_and(|u| close > u) {
            return Ok(Some(Signal::Buy));
        }
        if trend_down && lower_prev.is_some_and(|l| close < l) {
            return Ok(Some(Signal::Sell));
        }

        Ok(match d1 {
            Some(d) if d < 0.0 => Some(Signal::CloseLong),
            Some(d) if d > 0.0 => Some(Signal::CloseShort),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::test_support::{candles_from_closes, signals};

    #[test]
    fn breakout_in_uptrend_buys() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let data = candles_from_closes(&closes);
        let strategy = DualSuperTrend::new(3, 1.0, 5, 2.0, 4).unwrap();
        let out = signals(&strategy, &data);
        // both SuperTrends defined from bar 5; every close makes a new high
        assert_eq!(out[10], Some(Signal::Buy));
        assert!(out[..5].iter().all(|s| s.is_none() || *s == Some(Signal::CloseShort)));
    }

    #[test]
    fn fast_flip_requests_close() {
        let mut closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        closes.extend((1..=10).map(|i| 129.0 - 6.0 * i as f64));
        // a flat bar: no channel breakout, only the fast SuperTrend speaks
        closes.push(69.0);
        let data = candles_from_closes(&closes);
        let strategy = DualSuperTrend::new(3, 1.0, 20, 4.0, 4).unwrap();
        let out = signals(&strategy, &data);
        assert_eq!(*out.last().unwrap(), Some(Signal::CloseLong));
    }

    #[test]
    fn multipliers_must_be_positive() {
        let params = ParamSet::new().with("st2_mult", 0.0);
        assert!(DualSuperTrend::from_params(&params).is_err());
    }
}
