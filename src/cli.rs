//! CLI definition and dispatch.

use clap::{Args, Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::{CsvAdapter, write_prices};
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::yahoo_adapter::{DEFAULT_BASE_URL, YahooAdapter, YahooConfig};
use crate::domain::error::DcaError;
use crate::domain::metrics::{annual_return_table, format_pct};
use crate::domain::params::StrategyParams;
use crate::domain::pipeline::{SimulationOutput, run_pipeline};
use crate::ports::config_port::ConfigPort;
use crate::ports::price_port::PriceSource;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "dcasim", about = "Dynamic dollar-cost-averaging simulator")]
pub struct Cli {
    /// Log more (-v info, -vv debug); RUST_LOG is used when absent
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Strategy parameters; flags override the config file.
#[derive(Args, Debug, Default, Clone)]
pub struct ParamArgs {
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub ticker: Option<String>,
    /// Contribution per month (TWD)
    #[arg(long)]
    pub monthly_invest: Option<f64>,
    #[arg(long)]
    pub start_year: Option<i32>,
    /// Momentum look-back in months
    #[arg(long)]
    pub momentum_period: Option<usize>,
    /// Volatility look-back in months
    #[arg(long)]
    pub volatility_period: Option<usize>,
    /// Annual rate earned by idle cash
    #[arg(long)]
    pub cash_rate: Option<f64>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the simulation and print the results
    Run {
        #[command(flatten)]
        params: ParamArgs,
        /// Read prices from a CSV file or directory instead of the web
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Write a per-month CSV report
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate parameters without fetching data
    Validate {
        #[command(flatten)]
        params: ParamArgs,
    },
    /// Download the monthly price history to a CSV file
    Fetch {
        #[command(flatten)]
        params: ParamArgs,
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Yahoo,
    Csv,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceSettings {
    pub kind: SourceKind,
    pub csv_path: Option<PathBuf>,
    pub base_url: String,
    pub timeout: Duration,
    pub retries: u32,
}

pub fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Run {
            params,
            csv,
            output,
        } => run_simulation_command(&params, csv, output),
        Command::Validate { params } => run_validate(&params),
        Command::Fetch { params, output } => run_fetch(&params, &output),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, DcaError> {
    match path {
        Some(p) => {
            tracing::info!("loading config from {}", p.display());
            FileConfigAdapter::from_file(p)
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

fn config_int<T: TryFrom<i64>>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<T, DcaError> {
    let value = config.get_int(section, key, default)?;
    T::try_from(value).map_err(|_| DcaError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: format!("{} is out of range", value),
    })
}

/// Merge config file values, built-in defaults and flag overrides.
/// The result is not yet validated.
pub fn build_params(config: &dyn ConfigPort, args: &ParamArgs) -> Result<StrategyParams, DcaError> {
    let defaults = StrategyParams::default();
    let section = "simulation";

    let from_config = StrategyParams {
        ticker: config
            .get_string(section, "ticker")
            .unwrap_or(defaults.ticker),
        monthly_invest: config.get_double(section, "monthly_invest", defaults.monthly_invest)?,
        start_year: config_int(config, section, "start_year", defaults.start_year as i64)?,
        momentum_period: config_int(
            config,
            section,
            "momentum_period",
            defaults.momentum_period as i64,
        )?,
        volatility_period: config_int(
            config,
            section,
            "volatility_period",
            defaults.volatility_period as i64,
        )?,
        cash_rate: config.get_double(section, "cash_rate", defaults.cash_rate)?,
    };

    Ok(StrategyParams {
        ticker: args.ticker.clone().unwrap_or(from_config.ticker),
        monthly_invest: args.monthly_invest.unwrap_or(from_config.monthly_invest),
        start_year: args.start_year.unwrap_or(from_config.start_year),
        momentum_period: args.momentum_period.unwrap_or(from_config.momentum_period),
        volatility_period: args.volatility_period.unwrap_or(from_config.volatility_period),
        cash_rate: args.cash_rate.unwrap_or(from_config.cash_rate),
    })
}

pub fn build_source_settings(
    config: &dyn ConfigPort,
    csv_override: Option<PathBuf>,
) -> Result<SourceSettings, DcaError> {
    let invalid = |key: &str, reason: String| DcaError::ConfigInvalid {
        section: "data".to_string(),
        key: key.to_string(),
        reason,
    };

    let csv_path = csv_override
        .clone()
        .or_else(|| config.get_string("data", "csv_path").map(PathBuf::from));

    let kind = if csv_override.is_some() {
        SourceKind::Csv
    } else {
        match config.get_string("data", "source").as_deref() {
            None => SourceKind::Yahoo,
            Some(s) if s.eq_ignore_ascii_case("yahoo") => SourceKind::Yahoo,
            Some(s) if s.eq_ignore_ascii_case("csv") => SourceKind::Csv,
            Some(other) => {
                return Err(invalid("source", format!("unknown source {:?}", other)));
            }
        }
    };

    if kind == SourceKind::Csv && csv_path.is_none() {
        return Err(invalid("csv_path", "csv source requires csv_path".to_string()));
    }

    let timeout_secs: u64 = config_int(config, "data", "timeout_secs", 30)?;
    if timeout_secs == 0 {
        return Err(invalid("timeout_secs", "timeout must be positive".to_string()));
    }

    Ok(SourceSettings {
        kind,
        csv_path,
        base_url: config
            .get_string("data", "base_url")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        timeout: Duration::from_secs(timeout_secs),
        retries: config_int(config, "data", "retries", 1)?,
    })
}

pub fn make_source(settings: &SourceSettings) -> Result<Box<dyn PriceSource>, DcaError> {
    match settings.kind {
        SourceKind::Csv => {
            let path = settings.csv_path.clone().ok_or_else(|| DcaError::ConfigInvalid {
                section: "data".to_string(),
                key: "csv_path".to_string(),
                reason: "csv source requires csv_path".to_string(),
            })?;
            Ok(Box::new(CsvAdapter::new(path)))
        }
        SourceKind::Yahoo => {
            let adapter = YahooAdapter::with_config(YahooConfig {
                base_url: settings.base_url.clone(),
                timeout: settings.timeout,
                retries: settings.retries,
                ..Default::default()
            })?;
            Ok(Box::new(adapter))
        }
    }
}

/// Run the pipeline and, when a path is given, write the CSV report.
pub fn simulate_and_report(
    source: &dyn PriceSource,
    params: &StrategyParams,
    output_path: Option<&Path>,
    report: &dyn ReportPort,
) -> Result<SimulationOutput, DcaError> {
    let output = run_pipeline(source, params)?;
    if let Some(path) = output_path {
        report.write(&output, path)?;
    }
    Ok(output)
}

pub fn print_report<W: Write>(output: &SimulationOutput, out: &mut W) -> io::Result<()> {
    let p = &output.params;
    let s = &output.summary;

    writeln!(out, "=== {} dynamic DCA ===", p.ticker)?;
    writeln!(
        out,
        "Parameters:       invest {:.0}/month, from {}, momentum {}m, volatility {}m, cash {}",
        p.monthly_invest,
        p.start_year,
        p.momentum_period,
        p.volatility_period,
        format_pct(p.cash_rate)
    )?;
    if let (Some(first), Some(last)) = (output.records.first(), output.records.last()) {
        writeln!(out, "Period:           {} to {} ({} months)", first.date, last.date, s.months)?;
    }
    writeln!(out, "Contributed:      {:.0}", s.total_contributed)?;
    writeln!(out, "Final Value:      {:.0}", s.final_value)?;
    writeln!(out, "Total Return:     {}", format_pct(s.total_return))?;
    writeln!(out, "Latest Weight:    {:.3}", s.final_weight)?;
    if let Some(warning) = output.history_warning() {
        writeln!(out, "Warning:          {warning}; every month was held in cash")?;
    }

    writeln!(out, "\n=== Annual Returns ===")?;
    for (year, pct) in annual_return_table(&output.annual_returns) {
        writeln!(out, "  {}  {:>9}", year, pct)?;
    }

    writeln!(out, "\nMax Drawdown:     {}", format_pct(output.max_drawdown))?;
    Ok(())
}

fn run_simulation_command(
    args: &ParamArgs,
    csv: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<(), DcaError> {
    let config = load_config(args.config.as_deref())?;
    let params = build_params(&config, args)?;
    let settings = build_source_settings(&config, csv)?;
    let source = make_source(&settings)?;

    let output_path = output.or_else(|| config.get_string("report", "output").map(PathBuf::from));
    let result = simulate_and_report(
        source.as_ref(),
        &params,
        output_path.as_deref(),
        &CsvReportAdapter,
    )?;

    let stdout = io::stdout();
    print_report(&result, &mut stdout.lock())?;
    if let Some(path) = output_path {
        eprintln!("\nReport written to: {}", path.display());
    }
    Ok(())
}

fn run_validate(args: &ParamArgs) -> Result<(), DcaError> {
    let config = load_config(args.config.as_deref())?;
    let params = build_params(&config, args)?;
    params.validate()?;
    build_source_settings(&config, None)?;

    println!("ticker:            {}", params.ticker);
    println!("monthly_invest:    {}", params.monthly_invest);
    println!("start_year:        {}", params.start_year);
    println!("momentum_period:   {}", params.momentum_period);
    println!("volatility_period: {}", params.volatility_period);
    println!("cash_rate:         {}", params.cash_rate);
    eprintln!("\nParameters are valid.");
    Ok(())
}

fn run_fetch(args: &ParamArgs, output: &Path) -> Result<(), DcaError> {
    let config = load_config(args.config.as_deref())?;
    let params = build_params(&config, args)?;
    params.validate_ticker()?;
    let settings = build_source_settings(&config, None)?;
    let source = make_source(&settings)?;

    let points = source.fetch_monthly(&params.ticker)?;
    write_prices(&points, output)?;
    eprintln!(
        "Wrote {} months of {} to {}",
        points.len(),
        params.ticker,
        output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_run_overrides() {
        let cli = Cli::try_parse_from([
            "dcasim",
            "-vv",
            "run",
            "--ticker",
            "VT",
            "--monthly-invest",
            "500",
            "--start-year",
            "2010",
            "--csv",
            "/tmp/vt.csv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Run { params, csv, output } => {
                assert_eq!(params.ticker.as_deref(), Some("VT"));
                assert_eq!(params.monthly_invest, Some(500.0));
                assert_eq!(params.start_year, Some(2010));
                assert_eq!(csv, Some(PathBuf::from("/tmp/vt.csv")));
                assert!(output.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn cli_fetch_requires_output() {
        assert!(Cli::try_parse_from(["dcasim", "fetch"]).is_err());
    }

    #[test]
    fn build_params_defaults_without_config() {
        let config = FileConfigAdapter::empty();
        let params = build_params(&config, &ParamArgs::default()).unwrap();
        assert_eq!(params, StrategyParams::default());
    }

    #[test]
    fn config_int_rejects_negative_period() {
        let config =
            FileConfigAdapter::from_string("[simulation]\nmomentum_period = -3\n").unwrap();
        let err = build_params(&config, &ParamArgs::default()).unwrap_err();
        assert!(matches!(err, DcaError::ConfigInvalid { ref key, .. } if key == "momentum_period"));
    }

    #[test]
    fn source_defaults_to_yahoo() {
        let settings = build_source_settings(&FileConfigAdapter::empty(), None).unwrap();
        assert_eq!(settings.kind, SourceKind::Yahoo);
        assert_eq!(settings.timeout, Duration::from_secs(30));
        assert_eq!(settings.retries, 1);
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn csv_flag_selects_csv_source() {
        let settings =
            build_source_settings(&FileConfigAdapter::empty(), Some(PathBuf::from("p.csv")))
                .unwrap();
        assert_eq!(settings.kind, SourceKind::Csv);
        assert_eq!(settings.csv_path, Some(PathBuf::from("p.csv")));
    }

    #[test]
    fn csv_source_requires_path() {
        let config = FileConfigAdapter::from_string("[data]\nsource = csv\n").unwrap();
        let err = build_source_settings(&config, None).unwrap_err();
        assert!(matches!(err, DcaError::ConfigInvalid { ref key, .. } if key == "csv_path"));
    }

    #[test]
    fn unknown_source_rejected() {
        let config = FileConfigAdapter::from_string("[data]\nsource = bloomberg\n").unwrap();
        let err = build_source_settings(&config, None).unwrap_err();
        assert!(matches!(err, DcaError::ConfigInvalid { ref key, .. } if key == "source"));
    }

    #[test]
    fn fetch_rejects_blank_ticker_before_requesting() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("prices.csv");
        let args = ParamArgs {
            ticker: Some("   ".to_string()),
            ..Default::default()
        };
        let err = run_fetch(&args, &out).unwrap_err();
        assert!(matches!(err, DcaError::InvalidInput { ref field, .. } if field == "ticker"));
        assert!(!out.exists());
    }

    fn printed(output: &SimulationOutput) -> String {
        let mut buf = Vec::new();
        print_report(output, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn report_prints_insufficient_history() {
        let params = StrategyParams {
            monthly_invest: 1000.0,
            start_year: 2004,
            ..Default::default()
        };
        let output = crate::domain::pipeline::run_simulation(
            &crate::domain::indicator::test_support::make_points(&[100.0, 110.0, 121.0]),
            &params,
        )
        .unwrap();

        let text = printed(&output);
        assert!(text.contains("Warning:"));
        assert!(text.contains("insufficient history"));
    }

    #[test]
    fn report_omits_warning_when_weights_are_live() {
        let prices: Vec<f64> = (0..48)
            .map(|i| 100.0 * (1.0 + 0.004 * i as f64) + 8.0 * ((i as f64) * 0.9).sin())
            .collect();
        let params = StrategyParams {
            monthly_invest: 1000.0,
            momentum_period: 3,
            volatility_period: 2,
            ..Default::default()
        };
        let output = crate::domain::pipeline::run_simulation(
            &crate::domain::indicator::test_support::make_points(&prices),
            &params,
        )
        .unwrap();

        assert!(!printed(&output).contains("Warning:"));
    }

    #[test]
    fn zero_timeout_rejected() {
        let config = FileConfigAdapter::from_string("[data]\ntimeout_secs = 0\n").unwrap();
        assert!(build_source_settings(&config, None).is_err());
    }
}
