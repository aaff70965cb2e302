//! Backtest configuration.

use serde::{Deserialize, Serialize};

use super::error::EngineError;

/// Capital and cost model for one simulation run.
///
/// Fractions are plain ratios: `commission = 0.0006` is 6 bps per leg,
/// `slippage = 0.0005` moves every fill 5 bps against the trader.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    /// Fraction of current capital committed on each entry, in (0, 1].
    pub position_size: f64,
    pub commission: f64,
    pub slippage: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_capital: 10_000.0,
            position_size: 1.0,
            commission: 0.0,
            slippage: 0.0,
        }
    }
}

impl BacktestConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.initial_capital.is_finite() && self.initial_capital > 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "initial_capital must be positive, got {}",
                self.initial_capital
            )));
        }
        if !(self.position_size > 0.0 && self.position_size <= 1.0) {
            return Err(EngineError::InvalidConfig(format!(
                "position_size must be in (0, 1], got {}",
                self.position_size
            )));
        }
        if !(self.commission.is_finite() && self.commission >= 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "commission must be a non-negative fraction, got {}",
                self.commission
            )));
        }
        if !(self.slippage >= 0.0 && self.slippage < 1.0) {
            return Err(EngineError::InvalidConfig(format!(
                "slippage must be in [0, 1), got {}",
                self.slippage
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_frictionless_and_valid() {
        let c = BacktestConfig::default();
        assert_eq!(c.initial_capital, 10_000.0);
        assert_eq!(c.commission, 0.0);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let bad = [
            BacktestConfig {
                initial_capital: 0.0,
                ..Default::default()
            },
            BacktestConfig {
                position_size: 1.5,
                ..Default::default()
            },
            BacktestConfig {
                commission: -0.001,
                ..Default::default()
            },
            BacktestConfig {
                slippage: f64::NAN,
                ..Default::default()
            },
        ];
        for c in bad {
            assert!(matches!(c.validate(), Err(EngineError::InvalidConfig(_))), "{c:?}");
        }
    }

    #[test]
    fn partial_json_uses_defaults() {
        let c: BacktestConfig = serde_json::from_str(r#"{"commission": 0.0006}"#).unwrap();
        assert_eq!(c.commission, 0.0006);
        assert_eq!(c.position_size, 1.0);
    }
}
