//! SuperTrend.
//!
//! Basic bands = (H+L)/2 ± multiplier * ATR. The final upper band only
//! ratchets down (and the lower only up) unless the previous close broke
//! through it. Direction flips to down when the close falls below the lower
//! band and back up when it rises above the upper band. The line follows the
//! lower band in an uptrend and the upper band in a downtrend.
//!
//! First valid value at index `period`.

use super::atr::atr;

#[derive(Debug, Clone, PartialEq)]
pub struct SuperTrend {
    pub line: Vec<f64>,
    /// +1.0 for an uptrend, -1.0 for a downtrend, NaN during warm-up.
    pub direction: Vec<f64>,
}

pub fn super_trend(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    period: usize,
    multiplier: f64,
) -> SuperTrend {
    let n = high.len().min(low.len()).min(close.len());
    let atr_values = atr(high, low, close, period);
    let mut line = vec![f64::NAN; n];
    let mut direction = vec![f64::NAN; n];

    if period == 0 || n <= period {
        return SuperTrend { line, direction };
    }

    let mut final_upper = 0.0;
    let mut final_lower = 0.0;
    let mut trend = 1.0;

    for i in period..n {
        let band_atr = atr_values[i];
        if band_atr.is_nan() {
            return SuperTrend { line, direction };
        }

        let mid = (high[i] + low[i]) / 2.0;
        let basic_upper = mid + multiplier * band_atr;
        let basic_lower = mid - multiplier * band_atr;

        if i == period {
            final_upper = basic_upper;
            final_lower = basic_lower;
        } else {
            if basic_upper < final_upper || close[i - 1] > final_upper {
                final_upper = basic_upper;
            }
            if basic_lower > final_lower || close[i - 1] < final_lower {
                final_lower = basic_lower;
            }
        }

        if trend > 0.0 {
            if close[i] < final_lower {
                trend = -1.0;
            }
        } else if close[i] > final_upper {
            trend = 1.0;
        }

        direction[i] = trend;
        line[i] = if trend > 0.0 { final_lower } else { final_upper };
    }

    SuperTrend { line, direction }
}
