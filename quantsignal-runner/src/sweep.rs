//! Exhaustive grid search over strategy parameters.
//!
//! Every combination of the grid is turned into a strategy by a caller
//! supplied factory and simulated against the same candles. Failures are
//! isolated per combination. Results come back in enumeration order, so the
//! outcome does not depend on whether runs were executed in parallel.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use quantsignal_core::engine::MIN_CANDLES;
use quantsignal_core::{
    BacktestConfig, Backtester, Candle, EngineError, IndicatorBundle, IndicatorSpec, ParamSet,
    ParamValue, Strategy, StrategyError,
};

use crate::data_loader::dataset_hash;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    #[error("insufficient data: search needs at least {required} candles, got {actual}")]
    InsufficientData { required: usize, actual: usize },
    #[error("parameter grid has no combinations")]
    EmptyGrid,
    #[error("all {skipped} parameter combinations failed")]
    NoSuccessfulRuns { skipped: usize },
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// One named parameter and the literal values to try, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridAxis {
    pub name: String,
    pub values: Vec<ParamValue>,
}

impl GridAxis {
    pub fn new<V: Into<ParamValue>>(name: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Ordered set of axes. The first axis varies slowest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamGrid {
    pub axes: Vec<GridAxis>,
}

impl ParamGrid {
    pub fn new(axes: Vec<GridAxis>) -> Self {
        Self { axes }
    }

    /// Builder-style axis append.
    pub fn axis<V: Into<ParamValue>>(
        mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.axes.push(GridAxis::new(name, values));
        self
    }

    /// Number of combinations. Zero for a grid with no axes or an empty axis.
    pub fn size(&self) -> usize {
        if self.axes.is_empty() {
            return 0;
        }
        self.axes.iter().map(|a| a.values.len()).product()
    }

    /// Full cartesian product, last axis varying fastest.
    pub fn combinations(&self) -> Vec<ParamSet> {
        let total = self.size();
        let mut out = Vec::with_capacity(total);
        if total == 0 {
            return out;
        }

        let mut cursor = vec![0usize; self.axes.len()];
        loop {
            out.push(
                self.axes
                    .iter()
                    .zip(&cursor)
                    .map(|(axis, &i)| (axis.name.clone(), axis.values[i].clone()))
                    .collect(),
            );

            // odometer increment from the last axis
            let mut pos = self.axes.len();
            loop {
                if pos == 0 {
                    return out;
                }
                pos -= 1;
                cursor[pos] += 1;
                if cursor[pos] < self.axes[pos].values.len() {
                    break;
                }
                cursor[pos] = 0;
            }
        }
    }
}

/// Knobs for a search run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchOptions {
    /// Ranked results to keep.
    pub top_n: usize,
    /// Shortest candle series the search accepts.
    pub min_candles: usize,
    /// Evaluate combinations on the rayon pool.
    pub parallel: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            top_n: 10,
            min_candles: 50,
            parallel: false,
        }
    }
}

/// Headline numbers for one evaluated combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// The grid values of this combination (base params not repeated).
    pub params: ParamSet,
    pub total_return: f64,
    pub pl_ratio: f64,
    pub win_rate: f64,
    pub trades: usize,
}

/// A combination that produced no result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedCombination {
    pub params: ParamSet,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    /// First combination reaching the highest total return.
    pub best: SearchResult,
    /// Up to `top_n` results, highest total return first.
    pub top: Vec<SearchResult>,
    pub skipped: Vec<SkippedCombination>,
    /// Combinations that ran to completion.
    pub evaluated: usize,
    pub dataset_hash: String,
}

/// Grid search over `grid`, with each combination layered on top of `base`.
///
/// `factory` is called once per combination, sequentially, in enumeration
/// order. Strategies it rejects are skipped, as are runs that fail.
pub fn grid_search<S, F>(
    factory: F,
    grid: &ParamGrid,
    base: &ParamSet,
    candles: &[Candle],
    config: BacktestConfig,
    options: &SearchOptions,
) -> Result<SearchOutcome, SearchError>
where
    S: Strategy,
    F: Fn(&ParamSet) -> Result<S, StrategyError>,
{
    let required = options.min_candles.max(MIN_CANDLES);
    if candles.len() < required {
        return Err(SearchError::InsufficientData {
            required,
            actual: candles.len(),
        });
    }

    let combinations = grid.combinations();
    if combinations.is_empty() {
        return Err(SearchError::EmptyGrid);
    }
    let backtester = Backtester::new(config)?;

    info!(
        combinations = combinations.len(),
        candles = candles.len(),
        parallel = options.parallel,
        "starting grid search"
    );

    let built: Vec<(ParamSet, Result<S, StrategyError>)> = combinations
        .into_iter()
        .map(|combo| {
            let strategy = factory(&base.merged(&combo));
            (combo, strategy)
        })
        .collect();

    let specs: Vec<IndicatorSpec> = built
        .iter()
        .filter_map(|(_, s)| s.as_ref().ok())
        .flat_map(|s| s.indicators())
        .collect();
    let bundle = IndicatorBundle::build(candles, &specs);

    let evaluate = |(combo, strategy): &(ParamSet, Result<S, StrategyError>)| {
        let result = match strategy {
            Ok(s) => backtester
                .run_with_indicators(s, candles, &bundle)
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        match result {
            Ok(report) => {
                debug!(
                    params = %combo,
                    total_return = report.summary.total_return,
                    trades = report.summary.total_trades,
                    "evaluated combination"
                );
                Ok(SearchResult {
                    params: combo.clone(),
                    total_return: report.summary.total_return,
                    pl_ratio: report.summary.pl_ratio,
                    win_rate: report.summary.win_rate,
                    trades: report.summary.total_trades,
                })
            }
            Err(error) => {
                warn!(params = %combo, %error, "skipping combination");
                Err(SkippedCombination {
                    params: combo.clone(),
                    error,
                })
            }
        }
    };

    let evaluations: Vec<Result<SearchResult, SkippedCombination>> = if options.parallel {
        built.par_iter().map(evaluate).collect()
    } else {
        built.iter().map(evaluate).collect()
    };

    let mut results = Vec::with_capacity(evaluations.len());
    let mut skipped = Vec::new();
    for evaluation in evaluations {
        match evaluation {
            Ok(r) => results.push(r),
            Err(s) => skipped.push(s),
        }
    }

    let best = select_best(&results)
        .cloned()
        .ok_or(SearchError::NoSuccessfulRuns {
            skipped: skipped.len(),
        })?;
    let evaluated = results.len();
    let top = rank(results, options.top_n);

    info!(
        evaluated,
        skipped = skipped.len(),
        best_return = best.total_return,
        best_params = %best.params,
        "grid search finished"
    );

    Ok(SearchOutcome {
        best,
        top,
        skipped,
        evaluated,
        dataset_hash: dataset_hash(candles),
    })
}

/// First result whose total return strictly beats everything before it.
fn select_best(results: &[SearchResult]) -> Option<&SearchResult> {
    let mut best: Option<&SearchResult> = None;
    for r in results {
        match best {
            Some(b) if r.total_return <= b.total_return => {}
            _ => best = Some(r),
        }
    }
    best
}

/// Stable sort by total return, descending, then keep `top_n`.
fn rank(mut results: Vec<SearchResult>, top_n: usize) -> Vec<SearchResult> {
    results.sort_by(|a, b| b.total_return.total_cmp(&a.total_return));
    results.truncate(top_n);
    results
}
