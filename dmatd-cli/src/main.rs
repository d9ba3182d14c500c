//! DMA+TD CLI — scan and analyze commands.
//!
//! Commands:
//! - `scan` — fetch recent klines for a list of symbols and report entry triggers
//! - `analyze` — run the strategy over a CSV candle file

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use dmatd_core::{BarResult, DmaTdParams, DmaTdStrategy, ParamOverrides};
use dmatd_scanner::{
    format_timestamp, init_logging, read_candles, BinanceFuturesProvider, CircuitBreaker,
    CsvProvider, Interval, KlineProvider, LogFormat, NoProgress, ScanConfig, ScanProgress,
    ScanReport, Scanner, SymbolOutcome,
};

#[derive(Parser)]
#[command(
    name = "dmatd",
    about = "DMA+TD scanner — dual moving-average trend with buy-setup entry triggers"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan symbols for an entry trigger on their most recent bar.
    Scan {
        /// Path to a TOML scan config. Flags below override its values.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Symbols to scan (e.g., BTCUSDT ETHUSDT).
        #[arg(long, num_args = 1..)]
        symbols: Vec<String>,

        /// Kline interval (1m 3m 5m 15m 30m 1h 2h 4h 6h 8h 12h 1d 3d 1w 1M).
        #[arg(long)]
        interval: Option<Interval>,

        /// Candles to fetch per symbol.
        #[arg(long)]
        limit: Option<usize>,

        /// Pause between fetches, in milliseconds.
        #[arg(long)]
        pacing_ms: Option<u64>,

        /// Read `{SYMBOL}_{interval}.csv` files from this directory instead of the exchange.
        #[arg(long)]
        csv_dir: Option<PathBuf>,

        /// Print the full report as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,

        #[command(flatten)]
        params: ParamArgs,
    },
    /// Run the strategy over a CSV file of candles.
    Analyze {
        /// CSV with header `timestamp,open,high,low,close,volume`, oldest first.
        #[arg(long)]
        csv: PathBuf,

        /// Print every bar instead of only the latest.
        #[arg(long, default_value_t = false)]
        all: bool,

        /// Print JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,

        #[command(flatten)]
        params: ParamArgs,
    },
}

/// Strategy parameter overrides shared by both commands.
#[derive(Args)]
struct ParamArgs {
    /// Fast EMA length (default 5).
    #[arg(long)]
    fast: Option<usize>,

    /// Slow EMA length (default 20).
    #[arg(long)]
    slow: Option<usize>,

    /// Signal line EMA length (default 9).
    #[arg(long)]
    signal: Option<usize>,

    /// Setup lookback in bars (default 4).
    #[arg(long)]
    setup: Option<usize>,

    /// Setup count that marks an entry, 1-9 (default 1).
    #[arg(long)]
    entry_count: Option<u8>,
}

impl ParamArgs {
    fn overrides(&self) -> ParamOverrides {
        ParamOverrides {
            fast_length: self.fast,
            slow_length: self.slow,
            signal_length: self.signal,
            setup_length: self.setup,
            entry_count: self.entry_count,
        }
    }
}

fn main() -> Result<()> {
    init_logging(LogFormat::from_env());
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            config,
            symbols,
            interval,
            limit,
            pacing_ms,
            csv_dir,
            json,
            params,
        } => {
            let mut scan_config = match config {
                Some(path) => ScanConfig::from_file(&path)?,
                None => ScanConfig::default(),
            };
            if !symbols.is_empty() {
                scan_config.symbols = symbols;
            }
            if let Some(interval) = interval {
                scan_config.interval = interval;
            }
            if let Some(limit) = limit {
                scan_config.limit = limit;
            }
            if let Some(pacing_ms) = pacing_ms {
                scan_config.pacing_ms = pacing_ms;
            }
            scan_config.params = scan_config.params.merged(params.overrides())?;
            scan_config.validate()?;
            run_scan(&scan_config, csv_dir, json)
        }
        Commands::Analyze {
            csv,
            all,
            json,
            params,
        } => {
            let params = DmaTdParams::with_overrides(params.overrides())?;
            run_analyze(&csv, &params, all, json)
        }
    }
}

fn run_scan(config: &ScanConfig, csv_dir: Option<PathBuf>, json: bool) -> Result<()> {
    let provider: Box<dyn KlineProvider> = match csv_dir {
        Some(dir) => Box::new(CsvProvider::new(dir)),
        None => {
            let circuit_breaker = Arc::new(CircuitBreaker::default_provider());
            Box::new(BinanceFuturesProvider::with_base_url(
                config.base_url.as_str(),
                circuit_breaker,
            )?)
        }
    };

    let scanner = Scanner::new(provider.as_ref(), config.params)
        .interval(config.interval)
        .limit(config.limit)
        .pacing(config.pacing());

    let report = if json {
        let report = scanner.scan_with_progress(&config.symbols, &NoProgress);
        println!("{}", report.to_json()?);
        report
    } else {
        println!(
            "Scanning {} symbol(s) on {}, interval {}...",
            config.symbols.len(),
            provider.name(),
            config.interval
        );
        println!("{}", "=".repeat(48));
        let report = scanner.scan_with_progress(&config.symbols, &StdoutProgress);
        print_scan_summary(&report);
        report
    };

    if report.all_failed() {
        bail!("every symbol failed to scan");
    }
    Ok(())
}

/// Prints one line per symbol, and a block per trigger.
struct StdoutProgress;

impl ScanProgress for StdoutProgress {
    fn on_start(&self, symbol: &str, index: usize, total: usize) {
        print!("[{}/{}] {symbol}... ", index + 1, total);
        let _ = std::io::stdout().flush();
    }

    fn on_complete(&self, symbol: &str, _index: usize, _total: usize, outcome: &SymbolOutcome) {
        match outcome {
            SymbolOutcome::Analyzed { latest, .. } if latest.trigger => {
                println!();
                println!(">>>>>> [TRIGGER] <<<<<<");
                println!("Symbol: {symbol}");
                println!("Time:   {}", format_timestamp(latest.timestamp));
                println!("Price:  {}", latest.close);
                println!("{}", "-".repeat(33));
            }
            SymbolOutcome::Analyzed { .. } => println!("no signal."),
            SymbolOutcome::NoData => println!("no data."),
            SymbolOutcome::Failed { error } => println!("ERROR: {error}"),
        }
    }

    fn on_batch_complete(&self, _report: &ScanReport) {}
}

fn print_scan_summary(report: &ScanReport) {
    let triggered = report.triggered();
    println!();
    println!(
        "Scan complete: {} analyzed, {} failed, {} triggered",
        report.succeeded_count(),
        report.failed_count(),
        triggered.len()
    );
    if !triggered.is_empty() {
        let names: Vec<&str> = triggered.iter().map(|t| t.symbol.as_str()).collect();
        println!("Triggered: {}", names.join(", "));
    }
}

fn run_analyze(path: &Path, params: &DmaTdParams, all: bool, json: bool) -> Result<()> {
    let candles =
        read_candles(path).with_context(|| format!("loading candles from {}", path.display()))?;
    let run = DmaTdStrategy::new(*params).run(&candles)?;

    let bars: &[BarResult] = if all {
        run.results()
    } else {
        run.latest().map(std::slice::from_ref).unwrap_or(&[])
    };

    if json {
        println!("{}", serde_json::to_string_pretty(bars)?);
        return Ok(());
    }

    if bars.is_empty() {
        println!("No candles in {}", path.display());
        return Ok(());
    }

    println!(
        "{:<23} {:>12} {:>12} {:>12} {:>7} {:>5} {:>5} {:>7}",
        "Time", "Close", "DMA", "Signal", "Trend", "Setup", "Entry", "Trigger"
    );
    println!("{}", "-".repeat(92));
    for bar in bars {
        println!(
            "{:<23} {:>12.4} {:>12} {:>12} {:>7} {:>5} {:>5} {:>7}",
            format_timestamp(bar.timestamp),
            bar.close,
            format_optional(bar.dma_line),
            format_optional(bar.dma_signal),
            match bar.bullish_trend {
                Some(true) => "bull",
                Some(false) => "bear",
                None => "-",
            },
            bar.setup_count,
            if bar.entry_signal { "yes" } else { "" },
            if bar.trigger { "YES" } else { "" },
        );
    }

    let triggers = run.triggers().count();
    println!();
    println!("Bars: {} ({} warmup), triggers: {triggers}", run.len(), params.warmup_bars());
    Ok(())
}

fn format_optional(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.4}"))
}
