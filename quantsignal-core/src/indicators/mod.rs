//! Technical indicator library.
//!
//! Stateless functions over numeric slices. Every output is index-aligned with
//! its input; positions before the indicator's warm-up are `f64::NAN`. NaN in
//! the input poisons every window that contains it.
//!
//! Multi-series indicators (MACD, Bollinger, Donchian, SuperTrend) return a
//! small struct holding one aligned series per band.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod cross;
pub mod donchian;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod supertrend;

pub use adx::adx;
pub use atr::{atr, true_range, wilder_smooth};
pub use bollinger::{bollinger, BollingerBands};
pub use cross::{crossover, crossunder};
pub use donchian::{donchian, DonchianChannel};
pub use ema::ema;
pub use macd::{macd, Macd};
pub use rsi::rsi;
pub use sma::sma;
pub use supertrend::{super_trend, SuperTrend};

/// Value at `index` if it exists and is defined (not NaN).
pub fn defined(series: &[f64], index: usize) -> Option<f64> {
    series.get(index).copied().filter(|v| !v.is_nan())
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defined_skips_nan_and_out_of_range() {
        let series = [f64::NAN, 2.0];
        assert_eq!(defined(&series, 0), None);
        assert_eq!(defined(&series, 1), Some(2.0));
        assert_eq!(defined(&series, 2), None);
    }
}
