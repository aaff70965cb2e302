//! Performance report: summary statistics, recent trades and a compacted
//! equity curve.
//!
//! Every metric is a pure function of the trade list and/or the equity curve.
//! Percentages are on a 0–100 scale and kept at full precision; presentation
//! layers round.

use serde::{Deserialize, Serialize};

use crate::domain::{date_from_millis, Candle, EquityPoint, Side, Trade, MS_PER_DAY};

/// Number of most recent trades carried in the report.
pub const RECENT_TRADES: usize = 10;

/// Target size of the downsampled equity curve.
pub const EQUITY_CURVE_POINTS: usize = 200;

/// Time span covered by the candle window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPeriod {
    pub start: i64,
    pub end: i64,
    /// `YYYY-MM-DD` (UTC) of `start`.
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub long_trades: usize,
    pub short_trades: usize,
    pub win_rate: f64,
    pub total_return: f64,
    pub max_drawdown: f64,
    /// `f64::INFINITY` when there are winners and no losers.
    pub profit_factor: f64,
    pub recovery_factor: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub expectancy: f64,
    pub pl_ratio: f64,
    pub avg_holding_days: f64,
    pub initial_capital: f64,
    pub final_equity: f64,
    pub period: ReportPeriod,
}

/// Read-only view derived from one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestReport {
    pub summary: ReportSummary,
    /// Most recent first.
    pub recent_trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
}

/// Build the report for a run over `candles`.
pub fn generate_report(
    trades: &[Trade],
    equity: &[EquityPoint],
    candles: &[Candle],
    initial_capital: f64,
) -> BacktestReport {
    let final_eq = final_equity(equity, initial_capital);
    let total_ret = total_return(final_eq, initial_capital);
    let max_dd = max_drawdown(equity, initial_capital);
    let wr = win_rate(trades);
    let avg_w = avg_win(trades);
    let avg_l = avg_loss(trades);

    let start = candles.first().map(|c| c.open_time).unwrap_or(0);
    let end = candles.last().map(|c| c.open_time).unwrap_or(start);

    let summary = ReportSummary {
        total_trades: trades.len(),
        winning_trades: trades.iter().filter(|t| t.is_winner()).count(),
        losing_trades: trades.iter().filter(|t| !t.is_winner()).count(),
        long_trades: trades.iter().filter(|t| t.side == Side::Long).count(),
        short_trades: trades.iter().filter(|t| t.side == Side::Short).count(),
        win_rate: wr,
        total_return: total_ret,
        max_drawdown: max_dd,
        profit_factor: profit_factor(trades),
        recovery_factor: recovery_factor(total_ret, max_dd),
        avg_win: avg_w,
        avg_loss: avg_l,
        expectancy: expectancy(wr, avg_w, avg_l),
        pl_ratio: pl_ratio(avg_w, avg_l),
        avg_holding_days: avg_holding_days(trades),
        initial_capital,
        final_equity: final_eq,
        period: ReportPeriod {
            start,
            end,
            start_date: format_date(start),
            end_date: format_date(end),
        },
    };

    BacktestReport {
        summary,
        recent_trades: recent_trades(trades, RECENT_TRADES),
        equity_curve: downsample_equity(equity, start, EQUITY_CURVE_POINTS),
    }
}

fn format_date(ms: i64) -> String {
    date_from_millis(ms)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

// ─── Individual metric functions ────────────────────────────────────

/// Last equity point, or the initial capital for an empty curve.
pub fn final_equity(equity: &[EquityPoint], initial_capital: f64) -> f64 {
    equity.last().map(|p| p.equity).unwrap_or(initial_capital)
}

/// Percent change from initial capital to final equity.
pub fn total_return(final_equity: f64, initial_capital: f64) -> f64 {
    (final_equity - initial_capital) / initial_capital * 100.0
}

/// Largest peak-to-trough decline in percent. The running peak starts at the
/// initial capital.
pub fn max_drawdown(equity: &[EquityPoint], initial_capital: f64) -> f64 {
    let mut peak = initial_capital;
    let mut max_dd: f64 = 0.0;
    for point in equity {
        if point.equity > peak {
            peak = point.equity;
        }
        let dd = (peak - point.equity) / peak * 100.0;
        max_dd = max_dd.max(dd);
    }
    max_dd
}

/// Winners / total × 100; 0 with no trades.
pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64 * 100.0
}

/// Gross profit / |gross loss|.
///
/// +∞ with winners and no losing pnl, 0 with no winners.
pub fn profit_factor(trades: &[Trade]) -> f64 {
    let gross_profit: f64 = trades.iter().filter(|t| t.is_winner()).map(|t| t.pnl).sum();
    let gross_loss: f64 = trades
        .iter()
        .filter(|t| !t.is_winner())
        .map(|t| t.pnl)
        .sum::<f64>()
        .abs();

    if gross_loss == 0.0 {
        if gross_profit > 0.0 {
            f64::INFINITY
        } else {
            0.0
        }
    } else {
        gross_profit / gross_loss
    }
}

/// Total return / max drawdown, or the total return itself without drawdown.
pub fn recovery_factor(total_return: f64, max_drawdown: f64) -> f64 {
    if max_drawdown > 0.0 {
        total_return / max_drawdown
    } else {
        total_return
    }
}

/// Mean pnl percent of winning trades.
pub fn avg_win(trades: &[Trade]) -> f64 {
    mean(trades.iter().filter(|t| t.is_winner()).map(|t| t.pnl_percent))
}

/// Mean pnl percent of losing trades (zero or negative).
pub fn avg_loss(trades: &[Trade]) -> f64 {
    mean(trades.iter().filter(|t| !t.is_winner()).map(|t| t.pnl_percent))
}

pub fn expectancy(win_rate: f64, avg_win: f64, avg_loss: f64) -> f64 {
    let p = win_rate / 100.0;
    p * avg_win + (1.0 - p) * avg_loss
}

/// |avg win / avg loss|; +∞ for winners without losses, 0 with neither.
pub fn pl_ratio(avg_win: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_win > 0.0 {
            f64::INFINITY
        } else {
            0.0
        }
    } else {
        (avg_win / avg_loss).abs()
    }
}

/// Mean entry → exit time in days.
pub fn avg_holding_days(trades: &[Trade]) -> f64 {
    mean(trades.iter().map(|t| t.holding_ms() as f64)) / MS_PER_DAY
}

// ─── Slices ─────────────────────────────────────────────────────────

/// The last `count` trades, most recent first.
pub fn recent_trades(trades: &[Trade], count: usize) -> Vec<Trade> {
    trades.iter().rev().take(count).cloned().collect()
}

/// Points at or after `start`, sampled with a fixed stride of
/// `max(1, len / target)`. The final point is always kept.
pub fn downsample_equity(equity: &[EquityPoint], start: i64, target: usize) -> Vec<EquityPoint> {
    let filtered: Vec<EquityPoint> = equity.iter().filter(|p| p.time >= start).copied().collect();
    let len = filtered.len();
    let step = (len / target.max(1)).max(1);
    filtered
        .into_iter()
        .enumerate()
        .filter(|(i, _)| i % step == 0 || *i == len - 1)
        .map(|(_, p)| p)
        .collect()
}

// ─── Helpers ────────────────────────────────────────────────────────

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
