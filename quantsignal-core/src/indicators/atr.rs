//! Average True Range (ATR) with Wilder smoothing.
//!
//! TR[0] = high - low; TR[t] = max(H-L, |H-prevC|, |L-prevC|).
//! Seed: mean of the first `period` TR values, at index period-1.
//! Then ATR[t] = (ATR[t-1] * (period-1) + TR[t]) / period.

/// True range series. The first bar has no previous close, so it is just its range.
pub fn true_range(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    let n = high.len().min(low.len()).min(close.len());
    let mut tr = Vec::with_capacity(n);

    for i in 0..n {
        let hl = high[i] - low[i];
        if i == 0 {
            tr.push(hl);
            continue;
        }
        let prev_close = close[i - 1];
        if hl.is_nan() || prev_close.is_nan() {
            tr.push(f64::NAN);
            continue;
        }
        let hc = (high[i] - prev_close).abs();
        let lc = (low[i] - prev_close).abs();
        tr.push(hl.max(hc).max(lc));
    }

    tr
}

/// Wilder smoothing: seed with the SMA of the first `period` values, then
/// `s[t] = (s[t-1] * (period-1) + x[t]) / period`.
pub fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period {
        return result;
    }

    let seed: f64 = values[..period].iter().sum::<f64>() / period as f64;
    if seed.is_nan() {
        return result;
    }
    result[period - 1] = seed;

    let p = period as f64;
    let mut prev = seed;
    for i in period..n {
        if values[i].is_nan() {
            return result;
        }
        let smoothed = (prev * (p - 1.0) + values[i]) / p;
        result[i] = smoothed;
        prev = smoothed;
    }

    result
}

pub fn atr(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    wilder_smooth(&true_range(high, low, close), period)
}
