//! Average Directional Index (ADX).
//!
//! +DM/-DM and TR are summed over the first `period` bars (bar 0 contributes
//! zero) and then Wilder-smoothed as running sums. DX is derived from the
//! directional indicators from index period-1; ADX is seeded at 2*period-2 with
//! the mean of the first `period` DX values and Wilder-averaged afterwards.

pub fn adx(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    let n = high.len().min(low.len()).min(close.len());
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < 2 * period - 1 {
        return result;
    }

    let mut tr = vec![0.0; n];
    let mut plus_dm = vec![0.0; n];
    let mut minus_dm = vec![0.0; n];

    for i in 1..n {
        let hl = high[i] - low[i];
        let hc = (high[i] - close[i - 1]).abs();
        let lc = (low[i] - close[i - 1]).abs();
        tr[i] = hl.max(hc).max(lc);

        let up_move = high[i] - high[i - 1];
        let down_move = low[i - 1] - low[i];
        if up_move > down_move && up_move > 0.0 {
            plus_dm[i] = up_move;
        }
        if down_move > up_move && down_move > 0.0 {
            minus_dm[i] = down_move;
        }
    }

    let smooth_tr = running_wilder_sum(&tr, period);
    let smooth_plus = running_wilder_sum(&plus_dm, period);
    let smooth_minus = running_wilder_sum(&minus_dm, period);

    let mut dx = vec![0.0; n];
    for i in (period - 1)..n {
        if smooth_tr[i] == 0.0 {
            continue;
        }
        let plus_di = 100.0 * smooth_plus[i] / smooth_tr[i];
        let minus_di = 100.0 * smooth_minus[i] / smooth_tr[i];
        let sum_di = plus_di + minus_di;
        if sum_di != 0.0 {
            dx[i] = 100.0 * (plus_di - minus_di).abs() / sum_di;
        }
    }

    let seed_index = 2 * period - 2;
    let seed: f64 = dx[(period - 1)..=seed_index].iter().sum::<f64>() / period as f64;
    result[seed_index] = seed;

    let p = period as f64;
    for i in (seed_index + 1)..n {
        result[i] = (result[i - 1] * (p - 1.0) + dx[i]) / p;
    }

    result
}

/// Wilder running sum: seeded with the plain sum of the first `period` values
/// at index period-1, then `s[t] = s[t-1] - s[t-1]/period + x[t]`.
fn running_wilder_sum(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![0.0; n];
    out[period - 1] = values[..period].iter().sum();
    let p = period as f64;
    for i in period..n {
        out[i] = out[i - 1] - out[i - 1] / p + values[i];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adx_first_value_index() {
        let close: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let high: Vec<f64> = close.iter().map(|c| c + 1.0).collect();
        let low: Vec<f64> = close.iter().map(|c| c - 1.0).collect();
        let result = adx(&high, &low, &close, 5);
        assert!(result[7].is_nan());
        assert!(!result[8].is_nan());
    }

    #[test]
    fn adx_strong_trend_is_high() {
        let close: Vec<f64> = (0..60).map(|i| 100.0 + i as f64 * 2.0).collect();
        let high: Vec<f64> = close.iter().map(|c| c + 1.0).collect();
        let low: Vec<f64> = close.iter().map(|c| c - 1.0).collect();
        let result = adx(&high, &low, &close, 14);
        let last = *result.last().unwrap();
        assert!(last > 50.0, "expected strong trend, got {last}");
        assert!(last <= 100.0);
    }

    #[test]
    fn adx_too_short() {
        let v = [1.0, 2.0, 3.0];
        assert!(adx(&v, &v, &v, 5).iter().all(|x| x.is_nan()));
    }
}
