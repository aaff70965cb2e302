//! Criterion benchmarks for QuantSignal hot paths.
//!
//! Benchmarks:
//! 1. Indicator library over a long close series
//! 2. Bundle build for a built-in strategy
//! 3. Full simulation run per built-in strategy

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use quantsignal_core::components::{IndicatorBundle, ParamSet, Strategy};
use quantsignal_core::domain::Candle;
use quantsignal_core::engine::{BacktestConfig, Backtester};
use quantsignal_core::indicators;
use quantsignal_core::strategies::StrategyKind;

// ── Helpers ──────────────────────────────────────────────────────────

fn make_candles(n: usize) -> Vec<Candle> {
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0 + i as f64 * 0.01;
            Candle {
                open_time: i as i64 * 3_600_000,
                open: close - 0.3,
                high: close + 1.5,
                low: close - 1.5,
                close,
                volume: 1_000.0 + (i % 500) as f64,
                close_time: i as i64 * 3_600_000 + 3_599_999,
            }
        })
        .collect()
}

// ── 1. Indicators ────────────────────────────────────────────────────

fn bench_indicators(c: &mut Criterion) {
    let candles = make_candles(10_000);
    let close: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let high: Vec<f64> = candles.iter().map(|c| c.high).collect();
    let low: Vec<f64> = candles.iter().map(|c| c.low).collect();

    let mut group = c.benchmark_group("indicators");
    group.bench_function("sma_200", |b| {
        b.iter(|| indicators::sma(black_box(&close), 200))
    });
    group.bench_function("ema_200", |b| {
        b.iter(|| indicators::ema(black_box(&close), 200))
    });
    group.bench_function("macd_12_26_9", |b| {
        b.iter(|| indicators::macd(black_box(&close), 12, 26, 9))
    });
    group.bench_function("supertrend_10_3", |b| {
        b.iter(|| indicators::super_trend(black_box(&high), &low, &close, 10, 3.0))
    });
    group.bench_function("adx_14", |b| {
        b.iter(|| indicators::adx(black_box(&high), &low, &close, 14))
    });
    group.finish();
}

// ── 2. Bundle build ──────────────────────────────────────────────────

fn bench_bundle(c: &mut Criterion) {
    let candles = make_candles(10_000);
    let strategy = StrategyKind::MeanReversion
        .build(&ParamSet::new())
        .unwrap();
    let specs = strategy.indicators();
    c.bench_function("bundle_mean_reversion_10k", |b| {
        b.iter(|| IndicatorBundle::build(black_box(&candles), &specs))
    });
}

// ── 3. Simulation ────────────────────────────────────────────────────

fn bench_runs(c: &mut Criterion) {
    let candles = make_candles(5_000);
    let backtester = Backtester::new(BacktestConfig {
        commission: 0.0006,
        slippage: 0.0005,
        ..Default::default()
    })
    .unwrap();

    let mut group = c.benchmark_group("run");
    for kind in StrategyKind::ALL {
        let strategy = kind.build(&ParamSet::new()).unwrap();
        let bundle = IndicatorBundle::build(&candles, &strategy.indicators());
        group.bench_with_input(BenchmarkId::from_parameter(kind), &strategy, |b, s| {
            b.iter(|| backtester.run_with_indicators(s, black_box(&candles), &bundle))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_indicators, bench_bundle, bench_runs);
criterion_main!(benches);
