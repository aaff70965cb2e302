//! BDD tests for the grid search and run-file glue.
//!
//! These tests verify:
//! - Failure isolation per combination (evaluation and construction failures)
//! - Best / top-N selection and determinism, sequential and parallel
//! - Base parameters layered under grid values
//! - Error paths: short data, empty grids, every combination failing
//! - CSV files feeding a single run

use std::io::Write;

use quantsignal_core::{
    Band, BacktestConfig, Backtester, Candle, IndicatorSpec, ParamSet, ParamValue, Signal,
    SignalContext, Strategy, StrategyError, StrategyKind,
};
use quantsignal_runner::{
    grid_search, load_csv, run_search, run_single, synthetic_candles, ParamGrid, RunError,
    RunFile, SearchError, SearchOptions,
};

const HOUR_MS: i64 = 3_600_000;

/// Long above its SMA, short below. Can be told to blow up mid-run.
struct SmaSide {
    period: usize,
    fail_at: Option<usize>,
}

impl Strategy for SmaSide {
    type State = ();

    fn name(&self) -> &str {
        "sma_side"
    }

    fn indicators(&self) -> Vec<IndicatorSpec> {
        vec![IndicatorSpec::Sma {
            period: self.period,
        }]
    }

    fn init_state(&self) -> Self::State {}

    fn evaluate(
        &self,
        ctx: &SignalContext<'_>,
        _state: &mut Self::State,
    ) -> Result<Option<Signal>, StrategyError> {
        if self.fail_at == Some(ctx.index) {
            return Err(StrategyError::Evaluation("division by zero".into()));
        }
        let spec = IndicatorSpec::Sma {
            period: self.period,
        };
        let sma = ctx.indicators.require(&spec, Band::Primary)?;
        if sma[ctx.index].is_nan() {
            return Ok(None);
        }
        Ok(if ctx.close() > sma[ctx.index] {
            Some(Signal::Buy)
        } else {
            Some(Signal::Sell)
        })
    }
}

/// `period=10, variant=2` fails during evaluation; everything else runs.
fn sma_side_factory(params: &ParamSet) -> Result<SmaSide, StrategyError> {
    let period = params.usize_or("period", 10)?;
    let variant = params.usize_or("variant", 1)?;
    Ok(SmaSide {
        period,
        fail_at: (period == 10 && variant == 2).then_some(60),
    })
}

fn two_by_two() -> ParamGrid {
    ParamGrid::default()
        .axis("period", [5, 10])
        .axis("variant", [1, 2])
}

#[test]
fn bdd_scenario_one_failing_combination_is_skipped() {
    // GIVEN a 2x2 grid where one combination throws during evaluation
    let candles = synthetic_candles(5, 300, HOUR_MS);
    let grid = two_by_two();

    // WHEN the grid is searched
    let outcome = grid_search(
        sma_side_factory,
        &grid,
        &ParamSet::new(),
        &candles,
        BacktestConfig::default(),
        &SearchOptions::default(),
    )
    .expect("search should succeed");

    // THEN the remaining three combinations are ranked
    assert_eq!(outcome.evaluated, 3);
    assert_eq!(outcome.top.len(), 3);
    assert!(outcome
        .top
        .windows(2)
        .all(|w| w[0].total_return >= w[1].total_return));

    // AND the failing one is reported with its error
    assert_eq!(outcome.skipped.len(), 1);
    let skipped = &outcome.skipped[0];
    assert_eq!(skipped.params.get("period"), Some(&ParamValue::Int(10)));
    assert_eq!(skipped.params.get("variant"), Some(&ParamValue::Int(2)));
    assert!(skipped.error.contains("division by zero"));
    assert!(skipped.error.contains("60"));
}

#[test]
fn bdd_scenario_best_is_first_of_the_highest() {
    // GIVEN a grid whose second axis does not change behaviour
    let candles = synthetic_candles(9, 300, HOUR_MS);
    let grid = ParamGrid::default()
        .axis("period", [5, 20])
        .axis("variant", [1, 3]);

    // WHEN the grid is searched
    let outcome = grid_search(
        sma_side_factory,
        &grid,
        &ParamSet::new(),
        &candles,
        BacktestConfig::default(),
        &SearchOptions::default(),
    )
    .unwrap();

    // THEN every period appears twice with identical returns
    assert_eq!(outcome.top.len(), 4);
    assert_eq!(outcome.top[0].total_return, outcome.top[1].total_return);

    // AND the best is the first-enumerated of the tied pair
    assert_eq!(outcome.best.total_return, outcome.top[0].total_return);
    assert_eq!(outcome.best.params.get("variant"), Some(&ParamValue::Int(1)));
    assert_eq!(outcome.top[0], outcome.best);
}

#[test]
fn bdd_scenario_search_is_deterministic_and_parallel_safe() {
    // GIVEN fixed data and a built-in strategy grid
    let candles = synthetic_candles(21, 500, HOUR_MS);
    let grid = ParamGrid::default()
        .axis("period", [5, 10, 20, 40])
        .axis("filter_period", [0, 100]);
    let kind = StrategyKind::MaCross;

    let sequential = SearchOptions::default();
    let parallel = SearchOptions {
        parallel: true,
        ..SearchOptions::default()
    };
    let search = |options: &SearchOptions| {
        grid_search(
            |p| kind.build(p),
            &grid,
            &ParamSet::new(),
            &candles,
            BacktestConfig::default(),
            options,
        )
        .unwrap()
    };

    // WHEN the search runs twice sequentially and once in parallel
    let a = search(&sequential);
    let b = search(&sequential);
    let c = search(&parallel);

    // THEN all three outcomes are identical
    assert_eq!(a, b);
    assert_eq!(a, c);
    assert_eq!(a.evaluated, 8);
    assert_eq!(a.dataset_hash, quantsignal_runner::dataset_hash(&candles));
}

#[test]
fn bdd_scenario_shared_bundle_matches_standalone_runs() {
    // GIVEN base params under a grid of periods
    let candles = synthetic_candles(4, 400, HOUR_MS);
    let base = ParamSet::new().with("filter_period", 0);
    let grid = ParamGrid::default().axis("period", [7, 15, 30]);

    // WHEN the grid is searched
    let outcome = grid_search(
        |p| StrategyKind::MaCross.build(p),
        &grid,
        &base,
        &candles,
        BacktestConfig::default(),
        &SearchOptions::default(),
    )
    .unwrap();

    // THEN each result equals a standalone run with the merged params
    let backtester = Backtester::new(BacktestConfig::default()).unwrap();
    for result in &outcome.top {
        assert!(result.params.get("filter_period").is_none());
        let strategy = StrategyKind::MaCross
            .build(&base.merged(&result.params))
            .unwrap();
        let report = backtester.run(&strategy, &candles).unwrap();
        assert_eq!(report.summary.total_return, result.total_return);
        assert_eq!(report.summary.total_trades, result.trades);
    }
}

#[test]
fn bdd_scenario_top_n_truncates() {
    let candles = synthetic_candles(8, 200, HOUR_MS);
    let grid = ParamGrid::default().axis("period", [3, 5, 8, 13, 21]);
    let options = SearchOptions {
        top_n: 2,
        ..SearchOptions::default()
    };

    let outcome = grid_search(
        sma_side_factory,
        &grid,
        &ParamSet::new(),
        &candles,
        BacktestConfig::default(),
        &options,
    )
    .unwrap();

    assert_eq!(outcome.evaluated, 5);
    assert_eq!(outcome.top.len(), 2);
    assert_eq!(outcome.top[0], outcome.best);
}

#[test]
fn bdd_scenario_short_data_is_rejected() {
    // GIVEN fewer candles than the search minimum
    let candles = synthetic_candles(1, 30, HOUR_MS);

    // WHEN the grid is searched
    let err = grid_search(
        sma_side_factory,
        &two_by_two(),
        &ParamSet::new(),
        &candles,
        BacktestConfig::default(),
        &SearchOptions::default(),
    )
    .unwrap_err();

    // THEN the search fails before running anything
    assert_eq!(
        err,
        SearchError::InsufficientData {
            required: 50,
            actual: 30
        }
    );
}

#[test]
fn bdd_scenario_empty_grid_is_rejected() {
    let candles = synthetic_candles(1, 100, HOUR_MS);
    for grid in [
        ParamGrid::default(),
        ParamGrid::default().axis("period", Vec::<i64>::new()),
    ] {
        let err = grid_search(
            sma_side_factory,
            &grid,
            &ParamSet::new(),
            &candles,
            BacktestConfig::default(),
            &SearchOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err, SearchError::EmptyGrid);
    }
}

#[test]
fn bdd_scenario_invalid_combinations_are_skipped() {
    // GIVEN a dual_ema search where one fast length is not below the slow one
    let run = RunFile::from_toml(
        r#"
[strategy]
name = "dual_ema"
[strategy.params]
slow_len = 100
[[grid]]
name = "fast_len"
values = [20, 150]
"#,
    )
    .unwrap();
    let candles = synthetic_candles(3, 400, HOUR_MS);

    // WHEN it is searched
    let outcome = run_search(&run, &candles).unwrap();

    // THEN only the valid combination is evaluated
    assert_eq!(outcome.evaluated, 1);
    assert_eq!(outcome.best.params.get("fast_len"), Some(&ParamValue::Int(20)));
    assert_eq!(outcome.skipped.len(), 1);
    assert!(outcome.skipped[0].error.contains("fast_len"));
}

#[test]
fn bdd_scenario_every_combination_failing() {
    let run = RunFile::from_toml(
        r#"
[strategy]
name = "dual_ema"
[[grid]]
name = "fast_len"
values = [300, 400]
"#,
    )
    .unwrap();
    let candles = synthetic_candles(3, 100, HOUR_MS);

    let err = run_search(&run, &candles).unwrap_err();
    assert!(matches!(
        err,
        RunError::Search(SearchError::NoSuccessfulRuns { skipped: 2 })
    ));
}

fn write_csv(candles: &[Candle]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "open_time,open,high,low,close,volume,close_time").unwrap();
    for c in candles {
        writeln!(
            file,
            "{},{},{},{},{},{},{}",
            c.open_time, c.open, c.high, c.low, c.close, c.volume, c.close_time
        )
        .unwrap();
    }
    file.flush().unwrap();
    file
}

#[test]
fn bdd_scenario_csv_file_feeds_a_run() {
    // GIVEN candles written to a CSV file
    let candles = synthetic_candles(12, 250, HOUR_MS);
    let file = write_csv(&candles);

    // WHEN they are loaded back and run
    let loaded = load_csv(file.path()).unwrap();
    let run = RunFile::from_toml("[strategy]\nname = \"ma_cross\"\n[strategy.params]\nperiod = 10\n")
        .unwrap();
    let from_file = run_single(&run, &loaded).unwrap();
    let in_memory = run_single(&run, &candles).unwrap();

    // THEN the file round trip does not change the result
    assert_eq!(loaded.len(), candles.len());
    assert_eq!(from_file, in_memory);
}
