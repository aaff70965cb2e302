//! Price / SMA crossover with an optional long-period trend filter.
//!
//! BUY when the close crosses above the SMA and sits above the filter SMA.
//! SELL when the close crosses below the SMA and sits below the filter SMA.
//! A filter period of 0 disables the filter.

use crate::components::{
    Band, IndicatorSpec, ParamSet, Signal, SignalContext, Strategy, StrategyError,
};
use crate::indicators::{crossover, crossunder};

use super::require_positive;

#[derive(Debug, Clone, PartialEq)]
pub struct MaCross {
    pub period: usize,
    pub filter_period: usize,
    sma: IndicatorSpec,
    filter: Option<IndicatorSpec>,
}

impl MaCross {
    pub const NAME: &'static str = "ma_cross";

    pub fn new(period: usize, filter_period: usize) -> Result<Self, StrategyError> {
        require_positive("period", period)?;
        Ok(Self {
            period,
            filter_period,
            sma: IndicatorSpec::Sma { period },
            filter: (filter_period > 0).then_some(IndicatorSpec::Sma {
                period: filter_period,
            }),
        })
    }

    pub fn from_params(params: &ParamSet) -> Result<Self, StrategyError> {
        Self::new(
            params.usize_or("period", 60)?,
            params.usize_or("filter_period", 250)?,
        )
    }

    pub fn default_params() -> ParamSet {
        ParamSet::new().with("period", 60).with("filter_period", 250)
    }
}

impl Strategy for MaCross {
    type State = ();

    fn name(&self) -> &str {
        Self::NAME
    }

    fn indicators(&self) -> Vec<IndicatorSpec> {
        std::iter::once(self.sma).chain(self.filter).collect()
    }

    fn init_state(&self) -> Self::State {}

    fn evaluate(
        &self,
        ctx: &SignalContext<'_>,
        _state: &mut Self::State,
    ) -> Result<Option<Signal>, StrategyError> {
        let i = ctx.index;
        let sma = ctx.indicators.require(&self.sma, Band::Primary)?;
        let close = ctx.indicators.close();

        let trend = match &self.filter {
            Some(spec) => {
                ctx.indicators.require(spec, Band::Primary)?;
                match ctx.indicators.value(spec, Band::Primary, i) {
                    Some(v) => Some(v),
                    None => return Ok(None),
                }
            }
            None => None,
        };
        let price = ctx.close();

        if crossover(close, sma, i) && trend.map_or(true, |t| price > t) {
            return Ok(Some(Signal::Buy));
        }
        if crossunder(close, sma, i) && trend.map_or(true, |t| price < t) {
            return Ok(Some(Signal::Sell));
        }
        Ok(None)
    }
}
