//! Run-file glue: resolve the named built-in strategy, then hand the candles
//! to the engine (single run) or to the grid search.

use thiserror::Error;
use tracing::info;

use quantsignal_core::{BacktestReport, Backtester, Candle, EngineError, StrategyError, StrategyKind};

use crate::cache::{CacheKey, ReportCache};
use crate::config::{ConfigError, RunFile};
use crate::data_loader::LoadError;
use crate::sweep::{grid_search, SearchError, SearchOutcome};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("unknown strategy '{0}'")]
    UnknownStrategy(String),
    #[error("strategy error: {0}")]
    Strategy(#[from] StrategyError),
    #[error("backtest failed: {0}")]
    Engine(#[from] EngineError),
    #[error("search failed: {0}")]
    Search(#[from] SearchError),
    #[error("run file has no [[grid]] axes")]
    NoGrid,
}

fn resolve(run: &RunFile) -> Result<StrategyKind, RunError> {
    StrategyKind::from_name(&run.strategy.name)
        .ok_or_else(|| RunError::UnknownStrategy(run.strategy.name.clone()))
}

/// Run the run file's strategy once with its fixed parameters.
pub fn run_single(run: &RunFile, candles: &[Candle]) -> Result<BacktestReport, RunError> {
    let kind = resolve(run)?;
    let strategy = kind.build(&run.strategy.params)?;
    let backtester = Backtester::new(run.backtest)?;

    info!(
        strategy = kind.name(),
        params = %run.strategy.params,
        candles = candles.len(),
        "running backtest"
    );
    let report = backtester.run(&strategy, candles)?;
    info!(
        trades = report.summary.total_trades,
        total_return = report.summary.total_return,
        "backtest finished"
    );
    Ok(report)
}

/// [`run_single`] through a report cache. The strategy id folds in the
/// parameters so different settings never share an entry.
pub fn run_single_cached(
    run: &RunFile,
    candles: &[Candle],
    symbol: &str,
    timeframe: &str,
    cache: &mut ReportCache,
) -> Result<std::sync::Arc<BacktestReport>, RunError> {
    let strategy_id = format!("{}({})", run.strategy.name, run.strategy.params);
    let key = CacheKey::new(strategy_id, symbol, timeframe);
    cache.get_or_try_insert_with(key, || run_single(run, candles))
}

/// Grid-search the run file's strategy over its `[[grid]]` axes.
pub fn run_search(run: &RunFile, candles: &[Candle]) -> Result<SearchOutcome, RunError> {
    let kind = resolve(run)?;
    let grid = run.param_grid();
    if grid.axes.is_empty() {
        return Err(RunError::NoGrid);
    }

    let outcome = grid_search(
        |params| kind.build(params),
        &grid,
        &run.strategy.params,
        candles,
        run.backtest,
        &run.search,
    )?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_loader::synthetic_candles;

    const HOUR_MS: i64 = 3_600_000;

    fn run_file(toml: &str) -> RunFile {
        RunFile::from_toml(toml).unwrap()
    }

    #[test]
    fn single_run_produces_report() {
        let run = run_file(
            "[strategy]\nname = \"ma_cross\"\n[strategy.params]\nperiod = 10\nfilter_period = 0\n",
        );
        let candles = synthetic_candles(11, 400, HOUR_MS);
        let report = run_single(&run, &candles).unwrap();
        assert_eq!(report.summary.initial_capital, 10_000.0);
        assert!(report.summary.total_trades > 0);
        assert!(!report.equity_curve.is_empty());
    }

    #[test]
    fn bad_params_surface_as_strategy_error() {
        let run = run_file(
            "[strategy]\nname = \"dual_ema\"\n[strategy.params]\nfast_len = 50\nslow_len = 20\n",
        );
        let candles = synthetic_candles(1, 100, HOUR_MS);
        assert!(matches!(
            run_single(&run, &candles),
            Err(RunError::Strategy(StrategyError::InvalidParameter { .. }))
        ));
    }

    #[test]
    fn too_few_candles_is_engine_error() {
        let run = run_file("[strategy]\nname = \"ma_cross\"\n");
        let candles = synthetic_candles(1, 1, HOUR_MS);
        assert!(matches!(
            run_single(&run, &candles),
            Err(RunError::Engine(EngineError::InsufficientData { .. }))
        ));
    }

    #[test]
    fn unknown_strategy_is_reported() {
        let mut run = run_file("[strategy]\nname = \"ma_cross\"\n");
        run.strategy.name = "missing".into();
        let candles = synthetic_candles(1, 10, HOUR_MS);
        assert!(matches!(
            run_single(&run, &candles),
            Err(RunError::UnknownStrategy(ref n)) if n == "missing"
        ));
    }

    #[test]
    fn search_without_grid_is_rejected() {
        let run = run_file("[strategy]\nname = \"ma_cross\"\n");
        let candles = synthetic_candles(1, 100, HOUR_MS);
        assert!(matches!(run_search(&run, &candles), Err(RunError::NoGrid)));
    }

    #[test]
    fn cached_run_reuses_report() {
        let run = run_file("[strategy]\nname = \"ma_cross\"\n[strategy.params]\nperiod = 5\n");
        let candles = synthetic_candles(2, 120, HOUR_MS);
        let mut cache = ReportCache::new(4);

        let first = run_single_cached(&run, &candles, "SYN", "1h", &mut cache).unwrap();
        let second = run_single_cached(&run, &candles, "SYN", "1h", &mut cache).unwrap();
        assert!(std::sync::Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);

        let other = run_single_cached(&run, &candles, "SYN", "4h", &mut cache).unwrap();
        assert!(!std::sync::Arc::ptr_eq(&first, &other));
        assert_eq!(cache.len(), 2);
    }
}
