//! Bar-by-bar simulation loop.
//!
//! For every candle from index 1 on:
//! 1. Ask the strategy for a signal against the bar's close.
//! 2. Apply the position transition (close-then-open on reversal).
//! 3. Mark equity.
//!
//! Any position still open after the last bar is closed at its close.

use tracing::debug;

use super::accounting::Ledger;
use super::config::BacktestConfig;
use super::error::EngineError;
use crate::components::{IndicatorBundle, Signal, SignalContext, Strategy};
use crate::domain::{Candle, EquityPoint, Side, Trade};
use crate::report::{generate_report, BacktestReport};

/// Fewest candles a run accepts. Bar 0 only seeds the loop.
pub const MIN_CANDLES: usize = 2;

/// Raw output of a simulation, before any statistics are derived.
#[derive(Debug, Clone)]
pub struct SimulationOutcome {
    pub trades: Vec<Trade>,
    pub equity: Vec<EquityPoint>,
    pub final_capital: f64,
}

/// Runs strategies against candle data under a fixed [`BacktestConfig`].
#[derive(Debug, Clone, Copy)]
pub struct Backtester {
    config: BacktestConfig,
}

impl Backtester {
    pub fn new(config: BacktestConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Build the strategy's indicator bundle and run it.
    pub fn run<S: Strategy>(
        &self,
        strategy: &S,
        candles: &[Candle],
    ) -> Result<BacktestReport, EngineError> {
        check_len(candles)?;
        let bundle = IndicatorBundle::build(candles, &strategy.indicators());
        self.run_with_indicators(strategy, candles, &bundle)
    }

    /// Run against a prebuilt bundle, which may hold more than the strategy needs.
    pub fn run_with_indicators<S: Strategy>(
        &self,
        strategy: &S,
        candles: &[Candle],
        indicators: &IndicatorBundle,
    ) -> Result<BacktestReport, EngineError> {
        let outcome = self.simulate(strategy, candles, indicators)?;
        Ok(generate_report(
            &outcome.trades,
            &outcome.equity,
            candles,
            self.config.initial_capital,
        ))
    }

    /// The position state machine without the report step.
    pub fn simulate<S: Strategy>(
        &self,
        strategy: &S,
        candles: &[Candle],
        indicators: &IndicatorBundle,
    ) -> Result<SimulationOutcome, EngineError> {
        check_len(candles)?;
        if indicators.len() != candles.len() {
            return Err(EngineError::IndicatorLengthMismatch {
                expected: candles.len(),
                actual: indicators.len(),
            });
        }

        let mut ledger = Ledger::new(self.config);
        let mut state = strategy.init_state();

        for (index, candle) in candles.iter().enumerate().skip(1) {
            let ctx = SignalContext::new(candles, indicators, index);
            let signal = strategy.evaluate(&ctx, &mut state).map_err(|source| {
                EngineError::StrategyEvaluation {
                    index,
                    strategy: strategy.name().to_string(),
                    source,
                }
            })?;

            if let Some(signal) = signal {
                apply_signal(&mut ledger, signal, candle);
            }
            ledger.mark(candle.open_time, candle.close);
        }

        // check_len guarantees a last candle
        let last = candles[candles.len() - 1];
        let (trades, equity, final_capital) = ledger.finish(last.close, last.open_time);
        debug!(
            strategy = strategy.name(),
            trades = trades.len(),
            final_capital,
            "simulation finished"
        );

        Ok(SimulationOutcome {
            trades,
            equity,
            final_capital,
        })
    }
}

fn check_len(candles: &[Candle]) -> Result<(), EngineError> {
    if candles.len() < MIN_CANDLES {
        return Err(EngineError::InsufficientData {
            required: MIN_CANDLES,
            actual: candles.len(),
        });
    }
    Ok(())
}

fn apply_signal(ledger: &mut Ledger, signal: Signal, candle: &Candle) {
    let (close, time) = (candle.close, candle.open_time);
    match signal {
        Signal::Buy => {
            ledger.close_side(Side::Short, close, time);
            ledger.open(Side::Long, close, time);
        }
        Signal::Sell => {
            ledger.close_side(Side::Long, close, time);
            ledger.open(Side::Short, close, time);
        }
        Signal::CloseLong => {
            ledger.close_side(Side::Long, close, time);
        }
        Signal::CloseShort => {
            ledger.close_side(Side::Short, close, time);
        }
    }
}
