//! TOML run files.
//!
//! One file describes both a single run (`[backtest]` + `[strategy]`) and a
//! grid search (the same plus `[[grid]]` axes and an optional `[search]`).

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use quantsignal_core::{BacktestConfig, ParamSet, StrategyKind};

use crate::sweep::{GridAxis, ParamGrid, SearchOptions};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Which strategy to run and its fixed (or base) parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySection {
    pub name: String,
    #[serde(default)]
    pub params: ParamSet,
}

/// Parsed contents of a run file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunFile {
    #[serde(default)]
    pub backtest: BacktestConfig,
    pub strategy: StrategySection,
    #[serde(default)]
    pub grid: Vec<GridAxis>,
    #[serde(default)]
    pub search: SearchOptions,
}

impl RunFile {
    /// Parse and validate a run file from a TOML string.
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let file: RunFile = toml::from_str(s)?;
        file.validate()?;
        Ok(file)
    }

    /// Load a run file from disk.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// The built-in strategy named in `[strategy]`.
    pub fn strategy_kind(&self) -> Result<StrategyKind, ConfigError> {
        StrategyKind::from_name(&self.strategy.name).ok_or_else(|| {
            ConfigError::Invalid(format!("unknown strategy '{}'", self.strategy.name))
        })
    }

    pub fn param_grid(&self) -> ParamGrid {
        ParamGrid::new(self.grid.clone())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.backtest
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.strategy_kind()?;

        for (i, axis) in self.grid.iter().enumerate() {
            if axis.name.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("grid axis {i} has no name")));
            }
            if self.grid[..i].iter().any(|a| a.name == axis.name) {
                return Err(ConfigError::Invalid(format!(
                    "grid axis '{}' is listed twice",
                    axis.name
                )));
            }
        }

        if self.search.top_n == 0 {
            return Err(ConfigError::Invalid("search.top_n must be at least 1".into()));
        }
        Ok(())
    }
}
