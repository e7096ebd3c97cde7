//! CLI definition and dispatch.

use chrono::{Days, Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_log_adapter::{summarize_log, CsvLogAdapter, DEFAULT_LOG_FILE};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::{upstox_adapter, yahoo_adapter};
use crate::adapters::upstox_adapter::UpstoxAdapter;
use crate::adapters::yahoo_adapter::YahooAdapter;
use crate::domain::error::SnapshotError;
use crate::domain::metrics::{compute_metrics, MetricsRecord};
use crate::ports::config_port::ConfigPort;
use crate::ports::fundamentals_port::{ticker_for, FundamentalsPort};
use crate::ports::history_port::{HistoryPort, Interval};
use crate::ports::record_port::RecordPort;

pub const DEFAULT_DAYS_BACK: i64 = 365;
pub const DEFAULT_TIMEOUT_SECS: i64 = 30;

#[derive(Parser, Debug)]
#[command(name = "snaptrader", about = "Daily equity snapshot collector")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch history and fundamentals and append one snapshot row
    Fetch(FetchArgs),
    /// Show the row count and latest row of a snapshot log
    Show {
        #[arg(short, long, default_value = DEFAULT_LOG_FILE)]
        output: PathBuf,
    },
}

#[derive(Args, Debug, Default)]
pub struct FetchArgs {
    /// Brokerage instrument key, e.g. NSE_EQ|INE002A01018
    #[arg(short, long)]
    pub symbol: Option<String>,
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub days_back: Option<i64>,
    #[arg(long)]
    pub interval: Option<String>,
    /// Fundamentals ticker, when it differs from the instrument key
    #[arg(long)]
    pub ticker: Option<String>,
    /// Read candles from `<dir>/<symbol>.csv` instead of the brokerage API
    #[arg(long)]
    pub candles_dir: Option<PathBuf>,
    #[arg(long, env = "UPSTOX_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,
}

/// Fully resolved settings for one fetch run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub instrument: String,
    pub ticker: String,
    pub output: PathBuf,
    pub days_back: u64,
    pub interval: Interval,
    pub timeout: Duration,
    pub history: HistorySource,
    pub fundamentals_base_url: String,
    pub fundamentals_cookie_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HistorySource {
    Upstox { access_token: String, base_url: String },
    CsvDir(PathBuf),
}

/// One snapshot request handed to the pipeline.
#[derive(Debug, Clone)]
pub struct SnapshotRequest<'a> {
    pub instrument: &'a str,
    pub ticker: &'a str,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub interval: Interval,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Fetch(args) => run_fetch(&args),
        Command::Show { output } => run_show(&output),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, SnapshotError> {
    FileConfigAdapter::from_file(path).map_err(|e| SnapshotError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

pub fn build_run_config(
    args: &FetchArgs,
    config: &dyn ConfigPort,
) -> Result<RunConfig, SnapshotError> {
    let instrument = args
        .symbol
        .clone()
        .or_else(|| config.get_string("upstox", "instrument_key"))
        .ok_or_else(|| SnapshotError::ConfigMissing {
            section: "upstox".into(),
            key: "instrument_key".into(),
        })?;

    let ticker = args
        .ticker
        .clone()
        .or_else(|| config.get_string("fundamentals", "ticker"))
        .unwrap_or_else(|| ticker_for(&instrument).to_string());

    let output = args
        .output
        .clone()
        .or_else(|| config.get_string("output", "path").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));

    let days_back = args
        .days_back
        .unwrap_or_else(|| config.get_int("upstox", "days_back", DEFAULT_DAYS_BACK));
    if days_back <= 0 {
        return Err(SnapshotError::ConfigInvalid {
            section: "upstox".into(),
            key: "days_back".into(),
            reason: format!("must be positive, got {}", days_back),
        });
    }

    let interval_str = args
        .interval
        .clone()
        .or_else(|| config.get_string("upstox", "interval"))
        .unwrap_or_else(|| Interval::Day.as_str().to_string());
    let interval = Interval::parse(&interval_str).ok_or_else(|| SnapshotError::ConfigInvalid {
        section: "upstox".into(),
        key: "interval".into(),
        reason: format!("unsupported interval {:?} (expected day, week or month)", interval_str),
    })?;

    let timeout_secs = config.get_int("http", "timeout_secs", DEFAULT_TIMEOUT_SECS);
    if timeout_secs <= 0 {
        return Err(SnapshotError::ConfigInvalid {
            section: "http".into(),
            key: "timeout_secs".into(),
            reason: format!("must be positive, got {}", timeout_secs),
        });
    }

    let candles_dir = args
        .candles_dir
        .clone()
        .or_else(|| config.get_string("csv", "candles_dir").map(PathBuf::from));

    let history = match candles_dir {
        Some(dir) => HistorySource::CsvDir(dir),
        None => {
            let access_token = args
                .access_token
                .clone()
                .or_else(|| config.get_string("upstox", "access_token"))
                .ok_or_else(|| SnapshotError::ConfigMissing {
                    section: "upstox".into(),
                    key: "access_token".into(),
                })?;
            let base_url = config
                .get_string("upstox", "base_url")
                .unwrap_or_else(|| upstox_adapter::DEFAULT_BASE_URL.to_string());
            HistorySource::Upstox {
                access_token,
                base_url,
            }
        }
    };

    Ok(RunConfig {
        instrument,
        ticker,
        output,
        days_back: days_back as u64,
        interval,
        timeout: Duration::from_secs(timeout_secs as u64),
        history,
        fundamentals_base_url: config
            .get_string("fundamentals", "base_url")
            .unwrap_or_else(|| yahoo_adapter::DEFAULT_BASE_URL.to_string()),
        fundamentals_cookie_url: config
            .get_string("fundamentals", "cookie_url")
            .unwrap_or_else(|| yahoo_adapter::DEFAULT_COOKIE_URL.to_string()),
    })
}

/// Inclusive `[to - days_back, to]` range.
pub fn date_range(
    to: NaiveDate,
    days_back: u64,
) -> Result<(NaiveDate, NaiveDate), SnapshotError> {
    let from = to
        .checked_sub_days(Days::new(days_back))
        .ok_or_else(|| SnapshotError::ConfigInvalid {
            section: "upstox".into(),
            key: "days_back".into(),
            reason: format!("{} days before {} is out of range", days_back, to),
        })?;
    Ok((from, to))
}

/// Fetch, compute and append one snapshot row.
///
/// Nothing is written unless both sources succeed and the history is non-empty.
pub fn process_and_save(
    history: &dyn HistoryPort,
    fundamentals: &dyn FundamentalsPort,
    log: &dyn RecordPort,
    request: &SnapshotRequest<'_>,
) -> Result<MetricsRecord, SnapshotError> {
    let candles =
        history.fetch_candles(request.instrument, request.from, request.to, request.interval)?;
    if candles.is_empty() {
        return Err(SnapshotError::InsufficientData {
            symbol: request.instrument.to_string(),
        });
    }

    let snapshot = fundamentals.fetch_fundamentals(request.ticker)?;
    let record = compute_metrics(request.instrument, &candles, &snapshot)?;

    let missing = record.insufficient_fields();
    if !missing.is_empty() {
        info!(
            candles = candles.len(),
            fields = %missing.join(","),
            "insufficient history for some indicators"
        );
    }

    log.append(request.instrument, &record)?;
    Ok(record)
}

fn run_fetch(args: &FetchArgs) -> ExitCode {
    let config = match &args.config {
        Some(path) => match load_config(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        },
        None => FileConfigAdapter::empty(),
    };

    let run_config = match build_run_config(args, &config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    match run_snapshot(&run_config, Local::now().date_naive()) {
        Ok(()) => {
            println!("Data saved to {}", run_config.output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            if e.is_source_failure() {
                warn!(instrument = %run_config.instrument, "run abandoned, no row written");
            }
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Wire the configured adapters and run the pipeline for the range ending at `today`.
pub fn run_snapshot(run_config: &RunConfig, today: NaiveDate) -> Result<(), SnapshotError> {
    let (from, to) = date_range(today, run_config.days_back)?;

    let history: Box<dyn HistoryPort> = match &run_config.history {
        HistorySource::Upstox {
            access_token,
            base_url,
        } => Box::new(
            UpstoxAdapter::new(access_token, run_config.timeout)?.with_base_url(base_url),
        ),
        HistorySource::CsvDir(dir) => Box::new(CsvAdapter::new(dir.clone())),
    };
    let fundamentals = YahooAdapter::new(run_config.timeout)?
        .with_base_url(&run_config.fundamentals_base_url)
        .with_cookie_url(&run_config.fundamentals_cookie_url);
    let log = CsvLogAdapter::new(run_config.output.clone());

    let request = SnapshotRequest {
        instrument: &run_config.instrument,
        ticker: &run_config.ticker,
        from,
        to,
        interval: run_config.interval,
    };

    let record = process_and_save(history.as_ref(), &fundamentals, &log, &request)?;
    info!(
        instrument = %run_config.instrument,
        date = %record.date,
        path = %log.location().display(),
        "snapshot appended"
    );
    Ok(())
}

fn run_show(output: &PathBuf) -> ExitCode {
    let summary = match summarize_log(output) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    println!("{}: {} rows", output.display(), summary.rows);
    if let Some(last) = summary.last {
        for (name, value) in last {
            let value = if value.is_empty() { "-" } else { value.as_str() };
            println!("  {:<22} {}", name, value);
        }
    }
    ExitCode::SUCCESS
}
