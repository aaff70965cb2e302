//! QuantSignal CLI: single backtests, grid searches, strategy listing.
//!
//! Commands:
//! - `run`: backtest the strategy of a TOML run file once
//! - `optimize`: grid-search the run file's `[[grid]]` axes
//! - `strategies`: list built-in strategies and their default parameters

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use quantsignal_core::{BacktestReport, Candle, StrategyKind};
use quantsignal_runner::{
    load_csv, run_search, run_single, synthetic_candles, RunFile, SearchOutcome, SearchResult,
};

#[derive(Parser)]
#[command(
    name = "quantsignal",
    about = "QuantSignal CLI: signal-driven strategy backtesting"
)]
struct Cli {
    /// Log at debug level (overrides RUST_LOG).
    #[arg(long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Backtest the run file's strategy with its fixed parameters.
    Run {
        /// Path to a TOML run file.
        #[arg(long)]
        config: PathBuf,

        #[command(flatten)]
        source: DataSource,

        /// Write the full report as JSON.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Grid-search the run file's [[grid]] axes.
    Optimize {
        /// Path to a TOML run file with [[grid]] axes.
        #[arg(long)]
        config: PathBuf,

        #[command(flatten)]
        source: DataSource,

        /// Write the search outcome as JSON.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List built-in strategies and their default parameters.
    Strategies,
}

/// Where candles come from. Exactly one of `--data` / `--synthetic`.
#[derive(Args)]
#[group(required = true, multiple = false)]
struct DataSource {
    /// CSV file with open_time,open,high,low,close,volume,close_time.
    #[arg(long)]
    data: Option<PathBuf>,

    /// Generate N synthetic candles instead of reading a file.
    #[arg(long, value_name = "N")]
    synthetic: Option<usize>,
}

/// Seed and spacing for `--synthetic`.
const SYNTHETIC_SEED: u64 = 42;
const SYNTHETIC_INTERVAL_MS: i64 = 3_600_000;

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            config,
            source,
            output,
        } => run_cmd(&config, &source, output.as_deref()),
        Commands::Optimize {
            config,
            source,
            output,
        } => optimize_cmd(&config, &source, output.as_deref()),
        Commands::Strategies => {
            list_strategies();
            Ok(())
        }
    }
}

fn setup_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_candles(source: &DataSource) -> Result<Vec<Candle>> {
    match (&source.data, source.synthetic) {
        (Some(path), None) => {
            load_csv(path).with_context(|| format!("loading candles from {}", path.display()))
        }
        (None, Some(count)) => {
            info!(count, seed = SYNTHETIC_SEED, "generating synthetic candles");
            Ok(synthetic_candles(SYNTHETIC_SEED, count, SYNTHETIC_INTERVAL_MS))
        }
        _ => bail!("exactly one of --data or --synthetic is required"),
    }
}

fn run_cmd(config_path: &Path, source: &DataSource, output: Option<&Path>) -> Result<()> {
    let run = RunFile::from_file(config_path)
        .with_context(|| format!("reading run file {}", config_path.display()))?;
    let candles = load_candles(source)?;

    let report = run_single(&run, &candles)?;
    print_summary(&run, &report, source.synthetic.is_some());

    if let Some(path) = output {
        write_json(path, &report)?;
        println!("Report saved to: {}", path.display());
    }
    Ok(())
}

fn optimize_cmd(config_path: &Path, source: &DataSource, output: Option<&Path>) -> Result<()> {
    let run = RunFile::from_file(config_path)
        .with_context(|| format!("reading run file {}", config_path.display()))?;
    if run.grid.is_empty() {
        bail!("{} has no [[grid]] axes to search", config_path.display());
    }
    let candles = load_candles(source)?;

    let outcome = run_search(&run, &candles)?;
    print_search(&run, &outcome, source.synthetic.is_some());

    if let Some(path) = output {
        write_json(path, &outcome)?;
        println!("Results saved to: {}", path.display());
    }
    Ok(())
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn list_strategies() {
    println!("{:<18} {}", "Strategy", "Description");
    println!("{}", "-".repeat(72));
    for kind in StrategyKind::ALL {
        println!("{:<18} {}", kind.name(), kind.description());
        println!("{:<18} defaults: {}", "", kind.default_params());
    }
}

/// Two decimals, or `inf` for an unbounded ratio.
fn ratio(x: f64) -> String {
    if x.is_infinite() {
        "inf".to_string()
    } else {
        format!("{x:.2}")
    }
}

fn print_summary(run: &RunFile, report: &BacktestReport, synthetic: bool) {
    let s = &report.summary;
    println!();
    println!("=== Backtest Result ===");
    println!("Strategy:       {}", run.strategy.name);
    if !run.strategy.params.is_empty() {
        println!("Params:         {}", run.strategy.params);
    }
    println!(
        "Period:         {} to {}",
        s.period.start_date, s.period.end_date
    );
    println!(
        "Trades:         {} ({} long, {} short)",
        s.total_trades, s.long_trades, s.short_trades
    );
    println!();
    println!("--- Performance ---");
    println!("Initial:        {:.2}", s.initial_capital);
    println!("Final Equity:   {:.2}", s.final_equity);
    println!("Total Return:   {:.2}%", s.total_return);
    println!("Max Drawdown:   {:.2}%", s.max_drawdown);
    println!(
        "Win Rate:       {:.1}% ({}W / {}L)",
        s.win_rate, s.winning_trades, s.losing_trades
    );
    println!("Profit Factor:  {}", ratio(s.profit_factor));
    println!("Recovery:       {:.2}", s.recovery_factor);
    println!("Avg Win:        {:.2}%", s.avg_win);
    println!("Avg Loss:       {:.2}%", s.avg_loss);
    println!("Expectancy:     {:.2}%", s.expectancy);
    println!("P/L Ratio:      {}", ratio(s.pl_ratio));
    println!("Avg Holding:    {:.2} days", s.avg_holding_days);

    if !report.recent_trades.is_empty() {
        println!();
        println!("--- Recent Trades ---");
        println!(
            "{:<6} {:>12} {:>12} {:>12} {:>8}",
            "Side", "Entry", "Exit", "PnL", "PnL %"
        );
        println!("{}", "-".repeat(54));
        for t in &report.recent_trades {
            println!(
                "{:<6} {:>12.4} {:>12.4} {:>12.2} {:>7.2}%",
                t.side, t.entry_price, t.exit_price, t.pnl, t.pnl_percent
            );
        }
    }
    if synthetic {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
    println!();
}

fn print_result_row(rank: usize, r: &SearchResult) {
    println!(
        "{:>4} {:>10.2}% {:>8} {:>8.1}% {:>7}  {}",
        rank,
        r.total_return,
        ratio(r.pl_ratio),
        r.win_rate,
        r.trades,
        r.params
    );
}

fn print_search(run: &RunFile, outcome: &SearchOutcome, synthetic: bool) {
    println!();
    println!("=== Grid Search ===");
    println!("Strategy:       {}", run.strategy.name);
    if !run.strategy.params.is_empty() {
        println!("Base Params:    {}", run.strategy.params);
    }
    println!("Combinations:   {}", run.param_grid().size());
    println!("Evaluated:      {}", outcome.evaluated);
    println!("Skipped:        {}", outcome.skipped.len());
    println!(
        "Dataset:        {}",
        outcome.dataset_hash.get(..16).unwrap_or(&outcome.dataset_hash)
    );
    println!();
    println!("--- Best ---");
    println!("Params:         {}", outcome.best.params);
    println!("Total Return:   {:.2}%", outcome.best.total_return);
    println!("P/L Ratio:      {}", ratio(outcome.best.pl_ratio));
    println!("Win Rate:       {:.1}%", outcome.best.win_rate);
    println!("Trades:         {}", outcome.best.trades);
    println!();
    println!("--- Top {} ---", outcome.top.len());
    println!(
        "{:>4} {:>11} {:>8} {:>9} {:>7}  {}",
        "#", "Return", "P/L", "Win", "Trades", "Params"
    );
    println!("{}", "-".repeat(60));
    for (i, r) in outcome.top.iter().enumerate() {
        print_result_row(i + 1, r);
    }
    for skipped in &outcome.skipped {
        println!("SKIPPED: {} ({})", skipped.params, skipped.error);
    }
    if synthetic {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
    println!();
}
