//! MACD / signal-line crossover filtered by price against a long SMA.

use crate::components::{
    Band, IndicatorSpec, ParamSet, Signal, SignalContext, Strategy, StrategyError,
};
use crate::indicators::{crossover, crossunder};

use super::require_positive;

#[derive(Debug, Clone, PartialEq)]
pub struct MacdMa {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
    pub ma: usize,
}

impl MacdMa {
    pub const NAME: &'static str = "macd_ma";

    pub fn new(fast: usize, slow: usize, signal: usize, ma: usize) -> Result<Self, StrategyError> {
        require_positive("fast", fast)?;
        require_positive("signal", signal)?;
        require_positive("ma", ma)?;
        if fast >= slow {
            return Err(StrategyError::InvalidParameter {
                name: "fast".into(),
                reason: format!("must be below slow ({fast} >= {slow})"),
            });
        }
        Ok(Self {
            fast,
            slow,
            signal,
            ma,
        })
    }

    pub fn from_params(params: &ParamSet) -> Result<Self, StrategyError> {
        Self::new(
            params.usize_or("fast", 8)?,
            params.usize_or("slow", 50)?,
            params.usize_or("signal", 7)?,
            params.usize_or("ma", 250)?,
        )
    }

    pub fn default_params() -> ParamSet {
        ParamSet::new()
            .with("fast", 8)
            .with("slow", 50)
            .with("signal", 7)
            .with("ma", 250)
    }

    fn macd(&self) -> IndicatorSpec {
        IndicatorSpec::Macd {
            fast: self.fast,
            slow: self.slow,
            signal: self.signal,
        }
    }

    fn trend(&self) -> IndicatorSpec {
        IndicatorSpec::Sma { period: self.ma }
    }
}

impl Strategy for MacdMa {
    type State = ();

    fn name(&self) -> &str {
        Self::NAME
    }

    fn indicators(&self) -> Vec<IndicatorSpec> {
        vec![self.macd(), self.trend()]
    }

    fn init_state(&self) -> Self::State {}

    fn evaluate(
        &self,
        ctx: &SignalContext<'_>,
        _state: &mut Self::State,
    ) -> Result<Option<Signal>, StrategyError> {
        let i = ctx.index;
        let macd = self.macd();
        let line = ctx.indicators.require(&macd, Band::Primary)?;
        let signal = ctx.indicators.require(&macd, Band::Signal)?;
        let trend = match ctx.indicators.value(&self.trend(), Band::Primary, i) {
            Some(v) => v,
            None => return Ok(None),
        };
        let price = ctx.close();

        if crossover(line, signal, i) && price > trend {
            return Ok(Some(Signal::Buy));
        }
        if crossunder(line, signal, i) && price < trend {
            return Ok(Some(Signal::Sell));
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::test_support::{candles_from_closes, signals};

    #[test]
    fn defaults_are_valid() {
        let s = MacdMa::from_params(&MacdMa::default_params()).unwrap();
        assert_eq!((s.fast, s.slow, s.signal, s.ma), (8, 50, 7, 250));
    }

    #[test]
    fn rejects_inverted_periods() {
        assert!(MacdMa::new(26, 12, 9, 200).is_err());
    }

    #[test]
    fn follows_cross_and_trend_rule() {
        let closes: Vec<f64> = (0..120)
            .map(|i| 100.0 + 8.0 * (i as f64 * 0.5).sin())
            .collect();
        let data = candles_from_closes(&closes);
        let strategy = MacdMa::new(3, 6, 3, 5).unwrap();
        let out = signals(&strategy, &data);

        let m = crate::indicators::macd(&closes, 3, 6, 3);
        let trend = crate::indicators::sma(&closes, 5);
        for i in 1..closes.len() {
            let up = crossover(&m.line, &m.signal, i) && closes[i] > trend[i];
            let down = crossunder(&m.line, &m.signal, i) && closes[i] < trend[i];
            let expected = if up {
                Some(Signal::Buy)
            } else if down {
                Some(Signal::Sell)
            } else {
                None
            };
            assert_eq!(out[i], expected, "bar {i}");
        }
        assert!(out.iter().any(|s| s.is_some()));
    }
}
