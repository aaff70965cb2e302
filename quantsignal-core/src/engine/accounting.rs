//! Capital, position and trade bookkeeping for one run.
//!
//! Entry: price slipped against the trader, size = capital * position_size /
//! price, entry fee = capital * position_size * commission, deducted at once.
//! Exit: price slipped against the trader, pnl on size, exit fee =
//! |exit * size| * commission. Capital += pnl - exit fee.

use tracing::debug;

use super::config::BacktestConfig;
use crate::domain::{EquityPoint, Position, Side, Trade};

/// Accounting state owned by exactly one simulation run.
#[derive(Debug, Clone)]
pub struct Ledger {
    config: BacktestConfig,
    capital: f64,
    position: Option<Position>,
    trades: Vec<Trade>,
    equity: Vec<EquityPoint>,
}

impl Ledger {
    pub fn new(config: BacktestConfig) -> Self {
        Self {
            config,
            capital: config.initial_capital,
            position: None,
            trades: Vec::new(),
            equity: Vec::new(),
        }
    }

    /// Realized capital (excludes the open position's unrealized pnl).
    pub fn capital(&self) -> f64 {
        self.capital
    }

    pub fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    pub fn side(&self) -> Option<Side> {
        self.position.map(|p| p.side)
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn equity(&self) -> &[EquityPoint] {
        &self.equity
    }

    /// Open a position at `close`. No-op if one is already open.
    pub fn open(&mut self, side: Side, close: f64, time: i64) {
        if self.position.is_some() {
            return;
        }
        let entry_price = close * (1.0 + side.sign() * self.config.slippage);
        let notional = self.capital * self.config.position_size;
        let size = notional / entry_price;
        let entry_commission = notional * self.config.commission;
        self.capital -= entry_commission;

        debug!(%side, entry_price, size, time, "position opened");
        self.position = Some(Position {
            side,
            entry_price,
            entry_time: time,
            size,
            entry_commission,
        });
    }

    /// Close the open position at `close`, if any, returning the recorded trade.
    pub fn close(&mut self, close: f64, time: i64) -> Option<&Trade> {
        let pos = self.position.take()?;
        let exit_price = close * (1.0 - pos.side.sign() * self.config.slippage);
        let pnl = pos.side.sign() * (exit_price - pos.entry_price) * pos.size;
        let pnl_percent = pos.side.sign() * (exit_price - pos.entry_price) / pos.entry_price * 100.0;
        let exit_commission = (exit_price * pos.size).abs() * self.config.commission;
        self.capital += pnl - exit_commission;

        debug!(side = %pos.side, exit_price, pnl, capital = self.capital, time, "position closed");
        self.trades.push(Trade {
            side: pos.side,
            entry_price: pos.entry_price,
            exit_price,
            entry_time: pos.entry_time,
            exit_time: time,
            size: pos.size,
            pnl,
            pnl_percent,
            commission: pos.entry_commission + exit_commission,
        });
        self.trades.last()
    }

    /// Close the open position only if it is on `side`.
    pub fn close_side(&mut self, side: Side, close: f64, time: i64) -> Option<&Trade> {
        if self.side() != Some(side) {
            return None;
        }
        self.close(close, time)
    }

    /// Record mark-to-market equity for the bar.
    pub fn mark(&mut self, time: i64, price: f64) {
        let unrealized = self
            .position
            .map(|p| p.unrealized_pnl(price))
            .unwrap_or(0.0);
        self.equity.push(EquityPoint {
            time,
            equity: self.capital + unrealized,
            price,
        });
    }

    /// Force-close any open position and settle the last equity point to
    /// realized capital. Returns trades and equity curve.
    pub fn finish(mut self, close: f64, time: i64) -> (Vec<Trade>, Vec<EquityPoint>, f64) {
        if self.position.is_some() {
            debug!(time, "closing open position at end of data");
            self.close(close, time);
            let capital = self.capital;
            if let Some(last) = self.equity.last_mut() {
                last.equity = capital;
            }
        }
        (self.trades, self.equity, self.capital)
    }
}
