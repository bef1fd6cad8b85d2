//! Library module for the anonscope command-line tool.
//!
//! The argument types and command handlers live here so they can be driven
//! from tests; `main.rs` only parses arguments and sets up logging.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use anonscope_core::metrics::k_anonymity;
use anonscope_core::report::{
    AnalysisConfig, PrivacyAnalyzer, analyze_utility, render_json, render_text,
    render_utility_json, render_utility_text,
};
use anonscope_core::{AttributeMode, Table, achieve_l_diversity, load, write_csv};

/// Command-line interface for anonscope
#[derive(Parser)]
#[command(name = "anonscope")]
#[command(about = "Privacy-disclosure metrics for published tabular data")]
#[command(version)]
#[command(long_about = "
anonscope - privacy metrics for anonymized datasets

Groups the records of a table into equivalence classes by their
quasi-identifier values and measures how much the sensitive attributes of
each class disclose:
- k-anonymity and (alpha,k)-anonymity
- l-diversity, entropy l-diversity and recursive (c,l)-diversity
- basic and enhanced beta-likeness
- delta-disclosure privacy and t-closeness

SUPPORTED INPUT:
- Delimited text (.csv, .txt, .tsv)
- JSON arrays of records (.json)
- Spreadsheets (.xlsx, .xls, .ods) [if compiled with --features spreadsheet]

EXAMPLES:
  anonscope k-anonymity patients.csv --qi age,zip
  anonscope report patients.csv --qi age,zip --sa disease --format json
  anonscope suppress patients.csv --qi age,zip --sa disease --l 3 --output safe.csv
")]
pub struct Cli {
    /// Options accepted by every subcommand
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Logging options
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true, help = "Suppress all output except errors")]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute k for k-anonymity
    KAnonymity(KAnonymityArgs),
    /// Compute every privacy metric and check thresholds
    Report(ReportArgs),
    /// Remove equivalence classes that are not l-diverse
    Suppress(SuppressArgs),
    /// Measure information loss of an anonymized table
    Utility(UtilityArgs),
}

/// Columns shared by the metric commands.
#[derive(Args, Debug)]
pub struct ColumnArgs {
    /// Quasi-identifier columns
    #[arg(long, value_delimiter = ',', help = "Comma-separated quasi-identifier columns")]
    pub qi: Vec<String>,

    /// Sensitive attribute columns
    #[arg(
        long,
        value_delimiter = ',',
        required = true,
        help = "Comma-separated sensitive attribute columns"
    )]
    pub sa: Vec<String>,
}

/// Arguments of `k-anonymity`
#[derive(Args, Debug)]
pub struct KAnonymityArgs {
    /// Input table
    #[arg(help = "Input table (.csv, .tsv, .txt, .json, .xlsx, .xls, .ods)")]
    pub file: PathBuf,

    /// Quasi-identifier columns
    #[arg(long, value_delimiter = ',', help = "Comma-separated quasi-identifier columns")]
    pub qi: Vec<String>,
}

/// Arguments of `report`
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Input table
    #[arg(help = "Input table (.csv, .tsv, .txt, .json, .xlsx, .xls, .ods)")]
    pub file: PathBuf,

    /// Column selection
    #[command(flatten)]
    pub columns: ColumnArgs,

    /// Attribute mode (overrides the config file)
    #[arg(long, help = "How sensitive attributes are combined (generalized, independent)")]
    pub mode: Option<AttributeMode>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Analysis config file
    #[arg(long, value_name = "FILE", help = "JSON file with mode and thresholds")]
    pub config: Option<PathBuf>,

    /// Threshold overrides (format: metric:value)
    #[arg(
        long,
        value_delimiter = ',',
        help = "Privacy thresholds (k:5,l:2,t:0.2)"
    )]
    pub threshold: Vec<String>,

    /// Output file path
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Arguments of `suppress`
#[derive(Args, Debug)]
pub struct SuppressArgs {
    /// Input table
    #[arg(help = "Input table (.csv, .tsv, .txt, .json, .xlsx, .xls, .ods)")]
    pub file: PathBuf,

    /// Column selection
    #[command(flatten)]
    pub columns: ColumnArgs,

    /// Target l
    #[arg(long = "l", value_name = "N", help = "Minimum distinct sensitive values per class")]
    pub l: usize,

    /// Output CSV path
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,
}

/// Arguments of `utility`
#[derive(Args, Debug)]
pub struct UtilityArgs {
    /// Original table
    pub raw: PathBuf,

    /// Anonymized table
    pub anonymized: PathBuf,

    /// Column selection
    #[command(flatten)]
    pub columns: ColumnArgs,

    /// Anonymization generalized values but removed no records
    #[arg(long, help = "The anonymized table kept every record")]
    pub no_suppression: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Output file path
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Available output formats
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON validated against the report schema
    Json,
}

/// Applies `metric:value` threshold overrides to a config.
///
/// # Errors
///
/// Returns an error for an entry without a `:` separator, an unknown metric,
/// or a value of the wrong type.
pub fn parse_thresholds(thresholds: &[String], config: AnalysisConfig) -> Result<AnalysisConfig> {
    thresholds
        .iter()
        .map(|entry| entry.trim())
        .filter(|entry| !entry.is_empty())
        .try_fold(config, |config, entry| {
            let Some((metric, value)) = entry.split_once(':') else {
                bail!("invalid threshold '{}', expected metric:value", entry);
            };
            Ok(config.with_override(metric, value)?)
        })
}

/// Runs a parsed command line.
///
/// # Errors
///
/// Returns an error when an input cannot be loaded, a column selection is
/// invalid, a metric cannot be computed, or output cannot be written.
pub fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Command::KAnonymity(args) => run_k_anonymity(args),
        Command::Report(args) => run_report(args),
        Command::Suppress(args) => run_suppress(args),
        Command::Utility(args) => run_utility(args),
    }
}

fn load_table(path: &Path) -> Result<Table> {
    info!("Loading {}", path.display());
    let table = load(path).with_context(|| format!("failed to load {}", path.display()))?;
    info!(
        "Loaded {} records with {} columns",
        table.len(),
        table.columns().len()
    );
    Ok(table)
}

fn emit(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("✓ Output written to {}", path.display());
        }
        None => println!("{}", content.trim_end()),
    }
    Ok(())
}

fn run_k_anonymity(args: &KAnonymityArgs) -> Result<()> {
    let table = load_table(&args.file)?;
    let k = k_anonymity(&table, &args.qi)?;
    println!("k = {}", k);
    Ok(())
}

fn run_report(args: &ReportArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => AnalysisConfig::from_file(path)?,
        None => AnalysisConfig::new(),
    };
    if let Some(mode) = args.mode {
        config = config.with_mode(mode);
    }
    let config = parse_thresholds(&args.threshold, config)?;
    config.validate().context("invalid privacy thresholds")?;

    let table = load_table(&args.file)?;
    let analyzer = PrivacyAnalyzer::new(config);
    let report = analyzer
        .analyze(&table, &args.columns.qi, &args.columns.sa)?
        .with_source(args.file.display().to_string());

    if report.passed() {
        info!("✓ Privacy analysis completed - all thresholds met");
    } else {
        info!(
            "✓ Privacy analysis completed with {} violations ({} critical)",
            report.threshold_violations.len(),
            report.critical_violations()
        );
    }

    let rendered = match args.format {
        OutputFormat::Text => render_text(&report)?,
        OutputFormat::Json => render_json(&report)?,
    };
    emit(&rendered, args.output.as_deref())
}

fn run_suppress(args: &SuppressArgs) -> Result<()> {
    let table = load_table(&args.file)?;
    let anonymized = achieve_l_diversity(&table, &args.columns.qi, &args.columns.sa, args.l)?;

    if anonymized.len() < args.l {
        warn!(
            "Only {} records remain, fewer than l = {}",
            anonymized.len(),
            args.l
        );
    }

    write_csv(&anonymized, &args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    info!("✓ Output written to {}", args.output.display());
    println!("Kept {} of {} records", anonymized.len(), table.len());
    Ok(())
}

fn run_utility(args: &UtilityArgs) -> Result<()> {
    let raw = load_table(&args.raw)?;
    let anonymized = load_table(&args.anonymized)?;

    let report = analyze_utility(
        &raw,
        &anonymized,
        &args.columns.qi,
        &args.columns.sa,
        !args.no_suppression,
    )?;

    let rendered = match args.format {
        OutputFormat::Text => render_utility_text(&report)?,
        OutputFormat::Json => render_utility_json(&report)?,
    };
    emit(&rendered, args.output.as_deref())
}
