//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2/(period+1).
//! Seed: SMA of the first `period` values after any leading NaN run, so the EMA of
//! a series with its own warm-up (e.g. a MACD line) starts where that series does.

/// Exponential moving average of `values`.
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 {
        return result;
    }

    let start = match values.iter().position(|v| !v.is_nan()) {
        Some(idx) => idx,
        None => return result,
    };
    let seed_end = start + period;
    if seed_end > n {
        return result;
    }

    let sum: f64 = values[start..seed_end].iter().sum();
    if sum.is_nan() {
        return result;
    }
    let seed = sum / period as f64;
    result[seed_end - 1] = seed;

    let alpha = 2.0 / (period as f64 + 1.0);
    let mut prev = seed;
    for i in seed_end..n {
        if values[i].is_nan() {
            // Once tainted, every later value is undefined.
            return result;
        }
        let value = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = value;
        prev = value;
    }

    result
}
