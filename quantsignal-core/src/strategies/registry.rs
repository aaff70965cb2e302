//! Runtime selection of the built-in strategies.

use std::fmt;

use super::{
    DualEma, DualEmaState, DualSuperTrend, MaCross, MacdMa, MeanReversion, MeanReversionState,
    TurtleBreakout, TurtleState,
};
use crate::components::{IndicatorSpec, ParamSet, Signal, SignalContext, Strategy, StrategyError};

/// Names of the built-in strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    MaCross,
    DualEma,
    MacdMa,
    TurtleBreakout,
    DualSuperTrend,
    MeanReversion,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 6] = [
        StrategyKind::MaCross,
        StrategyKind::DualEma,
        StrategyKind::MacdMa,
        StrategyKind::TurtleBreakout,
        StrategyKind::DualSuperTrend,
        StrategyKind::MeanReversion,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StrategyKind::MaCross => MaCross::NAME,
            StrategyKind::DualEma => DualEma::NAME,
            StrategyKind::MacdMa => MacdMa::NAME,
            StrategyKind::TurtleBreakout => TurtleBreakout::NAME,
            StrategyKind::DualSuperTrend => DualSuperTrend::NAME,
            StrategyKind::MeanReversion => MeanReversion::NAME,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    pub fn description(self) -> &'static str {
        match self {
            StrategyKind::MaCross => "price/SMA crossover with a long SMA trend filter",
            StrategyKind::DualEma => "EMA crossover, RSI filter, percent stop and cooldown",
            StrategyKind::MacdMa => "MACD/signal crossover filtered by a long SMA",
            StrategyKind::TurtleBreakout => "breakout of confirmed pivot highs and lows",
            StrategyKind::DualSuperTrend => "two aligned SuperTrends with a Donchian breakout",
            StrategyKind::MeanReversion => "Bollinger/RSI reversion on volume surges, ATR stop",
        }
    }

    pub fn default_params(self) -> ParamSet {
        match self {
            StrategyKind::MaCross => MaCross::default_params(),
            StrategyKind::DualEma => DualEma::default_params(),
            StrategyKind::MacdMa => MacdMa::default_params(),
            StrategyKind::TurtleBreakout => TurtleBreakout::default_params(),
            StrategyKind::DualSuperTrend => DualSuperTrend::default_params(),
            StrategyKind::MeanReversion => MeanReversion::default_params(),
        }
    }

    /// Construct the strategy; absent parameters take their defaults.
    pub fn build(self, params: &ParamSet) -> Result<BuiltinStrategy, StrategyError> {
        Ok(match self {
            StrategyKind::MaCross => BuiltinStrategy::MaCross(MaCross::from_params(params)?),
            StrategyKind::DualEma => BuiltinStrategy::DualEma(DualEma::from_params(params)?),
            StrategyKind::MacdMa => BuiltinStrategy::MacdMa(MacdMa::from_params(params)?),
            StrategyKind::TurtleBreakout => {
                BuiltinStrategy::TurtleBreakout(TurtleBreakout::from_params(params)?)
            }
            StrategyKind::DualSuperTrend => {
                BuiltinStrategy::DualSuperTrend(DualSuperTrend::from_params(params)?)
            }
            StrategyKind::MeanReversion => {
                BuiltinStrategy::MeanReversion(MeanReversion::from_params(params)?)
            }
        })
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Any built-in strategy, dispatching to the concrete implementation.
#[derive(Debug, Clone, PartialEq)]
pub enum BuiltinStrategy {
    MaCross(MaCross),
    DualEma(DualEma),
    MacdMa(MacdMa),
    TurtleBreakout(TurtleBreakout),
    DualSuperTrend(DualSuperTrend),
    MeanReversion(MeanReversion),
}

/// Per-run state of a [`BuiltinStrategy`].
#[derive(Debug, Clone, PartialEq)]
pub enum BuiltinState {
    Stateless,
    DualEma(DualEmaState),
    TurtleBreakout(TurtleState),
    MeanReversion(MeanReversionState),
}

impl BuiltinStrategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            BuiltinStrategy::MaCross(_) => StrategyKind::MaCross,
            BuiltinStrategy::DualEma(_) => StrategyKind::DualEma,
            BuiltinStrategy::MacdMa(_) => StrategyKind::MacdMa,
            BuiltinStrategy::TurtleBreakout(_) => StrategyKind::TurtleBreakout,
            BuiltinStrategy::DualSuperTrend(_) => StrategyKind::DualSuperTrend,
            BuiltinStrategy::MeanReversion(_) => StrategyKind::MeanReversion,
        }
    }
}

impl Strategy for BuiltinStrategy {
    type State = BuiltinState;

    fn name(&self) -> &str {
        self.kind().name()
    }

    fn indicators(&self) -> Vec<IndicatorSpec> {
        match self {
            BuiltinStrategy::MaCross(s) => s.indicators(),
            BuiltinStrategy::DualEma(s) => s.indicators(),
            BuiltinStrategy::MacdMa(s) => s.indicators(),
            BuiltinStrategy::TurtleBreakout(s) => s.indicators(),
            BuiltinStrategy::DualSuperTrend(s) => s.indicators(),
            BuiltinStrategy::MeanReversion(s) => s.indicators(),
        }
    }

    fn init_state(&self) -> BuiltinState {
        match self {
            BuiltinStrategy::DualEma(s) => BuiltinState::DualEma(s.init_state()),
            BuiltinStrategy::TurtleBreakout(s) => BuiltinState::TurtleBreakout(s.init_state()),
            BuiltinStrategy::MeanReversion(s) => BuiltinState::MeanReversion(s.init_state()),
            BuiltinStrategy::MaCross(_)
            | BuiltinStrategy::MacdMa(_)
            | BuiltinStrategy::DualSuperTrend(_) => BuiltinState::Stateless,
        }
    }

    fn evaluate(
        &self,
        ctx: &SignalContext<'_>,
        state: &mut BuiltinState,
    ) -> Result<Option<Signal>, StrategyError> {
        match (self, state) {
            (BuiltinStrategy::MaCross(s), BuiltinState::Stateless) => s.evaluate(ctx, &mut ()),
            (BuiltinStrategy::MacdMa(s), BuiltinState::Stateless) => s.evaluate(ctx, &mut ()),
            (BuiltinStrategy::DualSuperTrend(s), BuiltinState::Stateless) => {
                s.evaluate(ctx, &mut ())
            }
            (BuiltinStrategy::DualEma(s), BuiltinState::DualEma(st)) => s.evaluate(ctx, st),
            (BuiltinStrategy::TurtleBreakout(s), BuiltinState::TurtleBreakout(st)) => {
                s.evaluate(ctx, st)
            }
            (BuiltinStrategy::MeanReversion(s), BuiltinState::MeanReversion(st)) => {
                s.evaluate(ctx, st)
            }
            (strategy, _) => Err(StrategyError::Evaluation(format!(
                "state does not belong to strategy '{}'",
                strategy.name()
            ))),
        }
    }
}
