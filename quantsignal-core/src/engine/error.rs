use thiserror::Error;

use crate::components::StrategyError;

/// Reasons a simulation run produces no report.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("insufficient data: need at least {required} candles, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("strategy '{strategy}' failed at candle {index}: {source}")]
    StrategyEvaluation {
        index: usize,
        strategy: String,
        #[source]
        source: StrategyError,
    },

    #[error("invalid backtest config: {0}")]
    InvalidConfig(String),

    #[error("indicator bundle covers {actual} candles, expected {expected}")]
    IndicatorLengthMismatch { expected: usize, actual: usize },
}
