//! Candle sources: CSV files and a deterministic synthetic random walk.
//!
//! Whatever the source, every loaded candle passes [`Candle::is_sane`] and the
//! sequence is strictly ascending by `open_time`, which is what the engine
//! assumes.

use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use quantsignal_core::Candle;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("no candles in {0}")]
    Empty(String),
    #[error("candle {index} has missing, non-positive or inconsistent OHLC values")]
    InvalidCandle { index: usize },
    #[error("candle {index} opens at {current}, not after the previous open {previous}")]
    NotAscending {
        index: usize,
        previous: i64,
        current: i64,
    },
}

/// One CSV row. Column order follows the header, not the struct.
#[derive(Debug, Deserialize)]
struct CsvRow {
    open_time: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
    close_time: i64,
}

impl From<CsvRow> for Candle {
    fn from(row: CsvRow) -> Self {
        Candle {
            open_time: row.open_time,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
            close_time: row.close_time,
        }
    }
}

/// Load candles from a CSV file with an
/// `open_time,open,high,low,close,volume,close_time` header.
pub fn load_csv(path: &Path) -> Result<Vec<Candle>, LoadError> {
    let file = std::fs::File::open(path)?;
    let candles = read_csv(file, &path.display().to_string())?;
    info!(path = %path.display(), candles = candles.len(), "loaded candles");
    Ok(candles)
}

/// Parse candles from any CSV reader. `source` only labels errors.
pub fn read_csv<R: std::io::Read>(reader: R, source: &str) -> Result<Vec<Candle>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut candles = Vec::new();
    for (index, row) in rdr.deserialize::<CsvRow>().enumerate() {
        let candle = Candle::from(row?);
        if !candle.is_sane() {
            return Err(LoadError::InvalidCandle { index });
        }
        candles.push(candle);
    }

    if candles.is_empty() {
        return Err(LoadError::Empty(source.to_string()));
    }
    check_ascending(&candles)?;
    Ok(candles)
}

/// Reject sequences whose open times are not strictly increasing.
pub fn check_ascending(candles: &[Candle]) -> Result<(), LoadError> {
    for (index, pair) in candles.windows(2).enumerate() {
        if pair[1].open_time <= pair[0].open_time {
            return Err(LoadError::NotAscending {
                index: index + 1,
                previous: pair[0].open_time,
                current: pair[1].open_time,
            });
        }
    }
    Ok(())
}

/// Start of the synthetic series: 2024-01-01T00:00:00Z.
const SYNTHETIC_START_MS: i64 = 1_704_067_200_000;

/// Generate `count` candles from a seeded random walk starting at 100.0.
///
/// The same `(seed, count, interval_ms)` always yields the same series.
pub fn synthetic_candles(seed: u64, count: usize, interval_ms: i64) -> Vec<Candle> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut price = 100.0_f64;
    let mut candles = Vec::with_capacity(count);

    for i in 0..count {
        let open_time = SYNTHETIC_START_MS + i as i64 * interval_ms;
        let step: f64 = rng.gen_range(-0.02..0.02);
        let open = price;
        let close = (price * (1.0 + step)).max(0.01);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.008));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.008));
        let volume = rng.gen_range(1_000.0..10_000.0);

        candles.push(Candle {
            open_time,
            open,
            high,
            low,
            close,
            volume,
            close_time: open_time + interval_ms - 1,
        });
        price = close;
    }

    candles
}

/// Deterministic BLAKE3 fingerprint over every candle field.
pub fn dataset_hash(candles: &[Candle]) -> String {
    let mut hasher = blake3::Hasher::new();
    for c in candles {
        hasher.update(&c.open_time.to_le_bytes());
        hasher.update(&c.open.to_le_bytes());
        hasher.update(&c.high.to_le_bytes());
        hasher.update(&c.low.to_le_bytes());
        hasher.update(&c.close.to_le_bytes());
        hasher.update(&c.volume.to_le_bytes());
        hasher.update(&c.close_time.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}
