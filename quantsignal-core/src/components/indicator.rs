//! Indicator specifications and the precomputed indicator bundle.
//!
//! Indicators are pure functions: price columns in, aligned series out.
//! A bundle is built once before the bar loop from the specs a strategy asks
//! for, then only read. Every distinct spec is computed exactly once, so a
//! bundle built for the union of several strategies' needs can be shared by
//! all of their runs.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::signal::StrategyError;
use crate::domain::Candle;
use crate::indicators;

/// One output series of an indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    /// The single series of a one-line indicator, the MACD line, or the SuperTrend line.
    Primary,
    Signal,
    Histogram,
    Upper,
    Middle,
    Lower,
    /// SuperTrend direction, +1 / -1.
    Direction,
}

/// An indicator kind together with its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IndicatorSpec {
    Sma { period: usize },
    /// SMA over volume instead of close.
    VolumeSma { period: usize },
    Ema { period: usize },
    Rsi { period: usize },
    Macd { fast: usize, slow: usize, signal: usize },
    Bollinger { period: usize, std_dev: f64 },
    Atr { period: usize },
    Donchian { period: usize },
    SuperTrend { period: usize, multiplier: f64 },
    Adx { period: usize },
}

impl IndicatorSpec {
    /// Stable key, e.g. `ema_50`, `macd_12_26_9`, `bollinger_20_2`.
    pub fn key(&self) -> String {
        match *self {
            IndicatorSpec::Sma { period } => format!("sma_{period}"),
            IndicatorSpec::VolumeSma { period } => format!("volume_sma_{period}"),
            IndicatorSpec::Ema { period } => format!("ema_{period}"),
            IndicatorSpec::Rsi { period } => format!("rsi_{period}"),
            IndicatorSpec::Macd { fast, slow, signal } => format!("macd_{fast}_{slow}_{signal}"),
            IndicatorSpec::Bollinger { period, std_dev } => format!("bollinger_{period}_{std_dev}"),
            IndicatorSpec::Atr { period } => format!("atr_{period}"),
            IndicatorSpec::Donchian { period } => format!("donchian_{period}"),
            IndicatorSpec::SuperTrend { period, multiplier } => {
                format!("supertrend_{period}_{multiplier}")
            }
            IndicatorSpec::Adx { period } => format!("adx_{period}"),
        }
    }

    /// Bands this indicator produces.
    pub fn bands(&self) -> &'static [Band] {
        match self {
            IndicatorSpec::Macd { .. } => &[Band::Primary, Band::Signal, Band::Histogram],
            IndicatorSpec::Bollinger { .. } | IndicatorSpec::Donchian { .. } => {
                &[Band::Upper, Band::Middle, Band::Lower]
            }
            IndicatorSpec::SuperTrend { .. } => &[Band::Primary, Band::Direction],
            _ => &[Band::Primary],
        }
    }

    fn compute(&self, columns: &PriceColumns) -> Vec<(Band, Vec<f64>)> {
        let PriceColumns {
            high,
            low,
            close,
            volume,
            ..
        } = columns;
        match *self {
            IndicatorSpec::Sma { period } => vec![(Band::Primary, indicators::sma(close, period))],
            IndicatorSpec::VolumeSma { period } => {
                vec![(Band::Primary, indicators::sma(volume, period))]
            }
            IndicatorSpec::Ema { period } => vec![(Band::Primary, indicators::ema(close, period))],
            IndicatorSpec::Rsi { period } => vec![(Band::Primary, indicators::rsi(close, period))],
            IndicatorSpec::Macd { fast, slow, signal } => {
                let m = indicators::macd(close, fast, slow, signal);
                vec![
                    (Band::Primary, m.line),
                    (Band::Signal, m.signal),
                    (Band::Histogram, m.histogram),
                ]
            }
            IndicatorSpec::Bollinger { period, std_dev } => {
                let b = indicators::bollinger(close, period, std_dev);
                vec![
                    (Band::Upper, b.upper),
                    (Band::Middle, b.middle),
                    (Band::Lower, b.lower),
                ]
            }
            IndicatorSpec::Atr { period } => {
                vec![(Band::Primary, indicators::atr(high, low, close, period))]
            }
            IndicatorSpec::Donchian { period } => {
                let d = indicators::donchian(high, low, period);
                vec![
                    (Band::Upper, d.upper),
                    (Band::Middle, d.middle),
                    (Band::Lower, d.lower),
                ]
            }
            IndicatorSpec::SuperTrend { period, multiplier } => {
                let st = indicators::super_trend(high, low, close, period, multiplier);
                vec![(Band::Primary, st.line), (Band::Direction, st.direction)]
            }
            IndicatorSpec::Adx { period } => {
                vec![(Band::Primary, indicators::adx(high, low, close, period))]
            }
        }
    }
}

impl fmt::Display for IndicatorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

#[derive(Debug, Clone, Default)]
struct PriceColumns {
    open: Vec<f64>,
    high: Vec<f64>,
    low: Vec<f64>,
    close: Vec<f64>,
    volume: Vec<f64>,
}

impl PriceColumns {
    fn from_candles(candles: &[Candle]) -> Self {
        Self {
            open: candles.iter().map(|c| c.open).collect(),
            high: candles.iter().map(|c| c.high).collect(),
            low: candles.iter().map(|c| c.low).collect(),
            close: candles.iter().map(|c| c.close).collect(),
            volume: candles.iter().map(|c| c.volume).collect(),
        }
    }
}

/// Immutable container of precomputed indicator series plus the raw price
/// columns they were derived from.
#[derive(Debug, Clone, Default)]
pub struct IndicatorBundle {
    len: usize,
    columns: PriceColumns,
    series: HashMap<String, HashMap<Band, Vec<f64>>>,
}

impl IndicatorBundle {
    /// Compute every distinct spec in `specs` over `candles`.
    pub fn build(candles: &[Candle], specs: &[IndicatorSpec]) -> Self {
        let columns = PriceColumns::from_candles(candles);
        let mut series = HashMap::new();

        for spec in specs {
            let key = spec.key();
            if series.contains_key(&key) {
                continue;
            }
            series.insert(key, spec.compute(&columns).into_iter().collect());
        }

        Self {
            len: candles.len(),
            columns,
            series,
        }
    }

    /// Number of bars every series is aligned to.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of distinct indicators held.
    pub fn indicator_count(&self) -> usize {
        self.series.len()
    }

    pub fn contains(&self, spec: &IndicatorSpec) -> bool {
        self.series.contains_key(&spec.key())
    }

    pub fn series(&self, spec: &IndicatorSpec, band: Band) -> Option<&[f64]> {
        self.series
            .get(&spec.key())
            .and_then(|bands| bands.get(&band))
            .map(|v| v.as_slice())
    }

    /// Like [`series`](Self::series) but a missing entry is a strategy error.
    pub fn require(&self, spec: &IndicatorSpec, band: Band) -> Result<&[f64], StrategyError> {
        self.series(spec, band)
            .ok_or_else(|| StrategyError::MissingIndicator(format!("{}:{band:?}", spec.key())))
    }

    /// Defined value at `index`, `None` if missing, out of range or still warming up.
    pub fn value(&self, spec: &IndicatorSpec, band: Band, index: usize) -> Option<f64> {
        self.series(spec, band)
            .and_then(|s| indicators::defined(s, index))
    }

    pub fn open(&self) -> &[f64] {
        &self.columns.open
    }

    pub fn high(&self) -> &[f64] {
        &self.columns.high
    }

    pub fn low(&self) -> &[f64] {
        &self.columns.low
    }

    pub fn close(&self) -> &[f64] {
        &self.columns.close
    }

    pub fn volume(&self) -> &[f64] {
        &self.columns.volume
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candles(closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Candle {
                open_time: i as i64 * 60_000,
                open: c,
                high: c + 1.0,
                low: c - 1.0,
                close: c,
                volume: 1000.0,
                close_time: i as i64 * 60_000 + 59_999,
            })
            .collect()
    }

    #[test]
    fn spec_keys() {
        assert_eq!(IndicatorSpec::Ema { period: 50 }.key(), "ema_50");
        assert_eq!(
            IndicatorSpec::Macd {
                fast: 12,
                slow: 26,
                signal: 9
            }
            .key(),
            "macd_12_26_9"
        );
        assert_eq!(
            IndicatorSpec::Bollinger {
                period: 20,
                std_dev: 2.0
            }
            .key(),
            "bollinger_20_2"
        );
        assert_eq!(
            IndicatorSpec::SuperTrend {
                period: 10,
                multiplier: 1.5
            }
            .key(),
            "supertrend_10_1.5"
        );
    }

    #[test]
    fn bundle_dedups_and_aligns() {
        let data = candles(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let sma3 = IndicatorSpec::Sma { period: 3 };
        let bundle = IndicatorBundle::build(&data, &[sma3, sma3, IndicatorSpec::Rsi { period: 2 }]);

        assert_eq!(bundle.len(), 5);
        assert_eq!(bundle.indicator_count(), 2);
        assert_eq!(bundle.value(&sma3, Band::Primary, 1), None);
        assert_eq!(bundle.value(&sma3, Band::Primary, 4), Some(13.0));
        assert_eq!(bundle.close(), &[10.0, 11.0, 12.0, 13.0, 14.0]);
    }

    #[test]
    fn missing_indicator_is_an_error() {
        let bundle = IndicatorBundle::build(&candles(&[1.0, 2.0]), &[]);
        let err = bundle
            .require(&IndicatorSpec::Ema { period: 5 }, Band::Primary)
            .unwrap_err();
        assert!(matches!(err, StrategyError::MissingIndicator(ref k) if k.starts_with("ema_5")));
        assert!(bundle.series(&IndicatorSpec::Sma { period: 2 }, Band::Upper).is_none());
    }

    #[test]
    fn multi_band_outputs() {
        let data = candles(&(0..40).map(|i| 100.0 + i as f64).collect::<Vec<_>>());
        let bb = IndicatorSpec::Bollinger {
            period: 5,
            std_dev: 2.0,
        };
        let st = IndicatorSpec::SuperTrend {
            period: 5,
            multiplier: 2.0,
        };
        let bundle = IndicatorBundle::build(&data, &[bb, st]);
        for band in bb.bands() {
            assert!(bundle.series(&bb, *band).is_some());
        }
        assert_eq!(bundle.value(&st, Band::Direction, 20), Some(1.0));
        assert!(bundle.series(&bb, Band::Direction).is_none());
    }
}
