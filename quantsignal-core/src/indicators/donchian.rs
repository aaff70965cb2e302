//! Donchian Channel.
//!
//! upper = highest high over the last `period` bars (current bar included),
//! lower = lowest low over the same window, middle = midpoint.
//! Strategies that trade breakouts compare against the previous bar's channel.

#[derive(Debug, Clone, PartialEq)]
pub struct DonchianChannel {
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
    pub middle: Vec<f64>,
}

pub fn donchian(high: &[f64], low: &[f64], period: usize) -> DonchianChannel {
    let n = high.len().min(low.len());
    let mut upper = vec![f64::NAN; n];
    let mut lower = vec![f64::NAN; n];
    let mut middle = vec![f64::NAN; n];

    if period == 0 || n < period {
        return DonchianChannel {
            upper,
            lower,
            middle,
        };
    }

    for i in (period - 1)..n {
        let start = i + 1 - period;
        let highs = &high[start..=i];
        let lows = &low[start..=i];
        if highs.iter().chain(lows).any(|v| v.is_nan()) {
            continue;
        }
        let max = highs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = lows.iter().copied().fold(f64::INFINITY, f64::min);
        upper[i] = max;
        lower[i] = min;
        middle[i] = (max + min) / 2.0;
    }

    DonchianChannel {
        upper,
        lower,
        middle,
    }
}
