//! Bollinger / RSI mean reversion with a volume-surge filter.
//!
//! Long when the close is below the lower band, RSI is oversold and volume
//! surges above its 20-bar average; short mirrors this at the upper band.
//! Exits: an ATR-based stop set at entry (checked against the bar's low for
//! longs, high for shorts) or a return to the middle band.

use crate::components::{
    Band, IndicatorSpec, ParamSet, Signal, SignalContext, Strategy, StrategyError,
};
use crate::domain::Side;

use super::{require_positive, require_positive_f64};

const VOLUME_PERIOD: usize = 20;
const ATR_PERIOD: usize = 14;

#[derive(Debug, Clone, PartialEq)]
pub struct MeanReversion {
    pub bb_period: usize,
    pub bb_std: f64,
    pub rsi_period: usize,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    pub vol_mult: f64,
    pub sl_atr_mult: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeanReversionState {
    pub side: Option<Side>,
    pub stop_price: f64,
}

impl MeanReversion {
    pub const NAME: &'static str = "mean_reversion";

    pub fn from_params(params: &ParamSet) -> Result<Self, StrategyError> {
        let strategy = Self {
            bb_period: params.usize_or("bb_period", 20)?,
            bb_std: params.f64_or("bb_std", 2.0)?,
            rsi_period: params.usize_or("rsi_period", 14)?,
            rsi_oversold: params.f64_or("rsi_oversold", 30.0)?,
            rsi_overbought: params.f64_or("rsi_overbought", 70.0)?,
            vol_mult: params.f64_or("vol_mult", 1.5)?,
            sl_atr_mult: params.f64_or("sl_atr_mult", 2.0)?,
        };
        strategy.validate()?;
        Ok(strategy)
    }

    pub fn default_params() -> ParamSet {
        ParamSet::new()
            .with("bb_period", 20)
            .with("bb_std", 2.0)
            .with("rsi_period", 14)
            .with("rsi_oversold", 30)
            .with("rsi_overbought", 70)
            .with("vol_mult", 1.5)
            .with("sl_atr_mult", 2.0)
    }

    fn validate(&self) -> Result<(), StrategyError> {
        require_positive("bb_period", self.bb_period)?;
        require_positive("rsi_period", self.rsi_period)?;
        require_positive_f64("bb_std", self.bb_std)?;
        require_positive_f64("sl_atr_mult", self.sl_atr_mult)?;
        if self.rsi_oversold >= self.rsi_overbought {
            return Err(StrategyError::InvalidParameter {
                name: "rsi_oversold".into(),
                reason: format!(
                    "must be below rsi_overbought ({} >= {})",
                    self.rsi_oversold, self.rsi_overbought
                ),
            });
        }
        Ok(())
    }

    fn bands(&self) -> IndicatorSpec {
        IndicatorSpec::Bollinger {
            period: self.bb_period,
            std_dev: self.bb_std,
        }
    }

    fn rsi(&self) -> IndicatorSpec {
        IndicatorSpec::Rsi {
            period: self.rsi_period,
        }
    }

    fn volume_avg(&self) -> IndicatorSpec {
        IndicatorSpec::VolumeSma {
            period: VOLUME_PERIOD,
        }
    }

    fn atr(&self) -> IndicatorSpec {
        IndicatorSpec::Atr { period: ATR_PERIOD }
    }
}

impl Strategy for MeanReversion {
    type State = MeanReversionState;

    fn name(&self) -> &str {
        Self::NAME
    }

    fn indicators(&self) -> Vec<IndicatorSpec> {
        vec![self.bands(), self.rsi(), self.volume_avg(), self.atr()]
    }

    fn init_state(&self) -> MeanReversionState {
        MeanReversionState::default()
    }

    fn evaluate(
        &self,
        ctx: &SignalContext<'_>,
        state: &mut MeanReversionState,
    ) -> Result<Option<Signal>, StrategyError> {
        let i = ctx.index;
        if i < self.bb_period.max(self.rsi_period).max(VOLUME_PERIOD) {
            return Ok(None);
        }

        let bundle = ctx.indicators;
        let bands = self.bands();
        for (spec, band) in [
            (bands, Band::Upper),
            (self.rsi(), Band::Primary),
            (self.volume_avg(), Band::Primary),
            (self.atr(), Band::Primary),
        ] {
            bundle.require(&spec, band)?;
        }

        let (Some(upper), Some(middle), Some(lower), Some(rsi), Some(vol_avg), Some(atr)) = (
            bundle.value(&bands, Band::Upper, i),
            bundle.value(&bands, Band::Middle, i),
            bundle.value(&bands, Band::Lower, i),
            bundle.value(&self.rsi(), Band::Primary, i),
            bundle.value(&self.volume_avg(), Band::Primary, i),
            bundle.value(&self.atr(), Band::Primary, i),
        ) else {
            return Ok(None);
        };

        let candle = ctx.candle();
        let close = candle.close;

        match state.side {
            Some(Side::Long) if candle.low <= state.stop_price || close >= middle => {
                state.side = None;
                return Ok(Some(Signal::CloseLong));
            }
            Some(Side::Short) if candle.high >= state.stop_price || close <= middle => {
                state.side = None;
                return Ok(Some(Signal::CloseShort));
            }
            _ => {}
        }

        let surge = candle.volume > vol_avg * self.vol_mult;
        if surge && close < lower && rsi < self.rsi_oversold && state.side != Some(Side::Long) {
            state.side = Some(Side::Long);
            state.stop_price = close - atr * self.sl_atr_mult;
            return Ok(Some(Signal::Buy));
        }
        if surge && close > upper && rsi > self.rsi_overbought && state.side != Some(Side::Short) {
            state.side = Some(Side::Short);
            state.stop_price = close + atr * self.sl_atr_mult;
            return Ok(Some(Signal::Sell));
        }
        Ok(None)
    }
}
