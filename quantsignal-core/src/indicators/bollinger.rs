//! Bollinger Bands.
//!
//! middle = SMA(period), upper/lower = middle ± k * σ where σ is the
//! population standard deviation of the window.

use super::sma::sma;

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

pub fn bollinger(values: &[f64], period: usize, std_dev: f64) -> BollingerBands {
    let n = values.len();
    let middle = sma(values, period);
    let mut upper = vec![f64::NAN; n];
    let mut lower = vec![f64::NAN; n];

    if period > 0 {
        for i in (period.saturating_sub(1))..n {
            let mean = middle[i];
            if mean.is_nan() {
                continue;
            }
            let window = &values[(i + 1 - period)..=i];
            let variance =
                window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / period as f64;
            let sigma = variance.sqrt();
            upper[i] = mean + std_dev * sigma;
            lower[i] = mean - std_dev * sigma;
        }
    }

    BollingerBands {
        upper,
        middle,
        lower,
    }
}
