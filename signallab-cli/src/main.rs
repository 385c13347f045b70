//! SignalLab CLI — candle analysis commands.
//!
//! Commands:
//! - `analyze` — run the full pipeline on a candle file and print the report
//! - `stage` — run one stage on its own and print its result as JSON
//! - `synth` — generate seeded synthetic candles

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use signallab_core::stages::{compute_indicator_with, compute_pattern_with, compute_trend_with};
use signallab_core::synthetic::random_walk;
use signallab_core::{compute_risk, AnalysisParams, Candle};
use signallab_runner::loader::write_csv;
use signallab_runner::{
    load_candles, run_pipeline_with, ChatEnricher, PatternEnricher, PipelineConfig,
    PipelineReport,
};

#[derive(Parser)]
#[command(
    name = "signallab",
    about = "SignalLab CLI — candle indicators, patterns, risk and trade signals"
)]
struct Cli {
    /// Debug-level logging (overridden by RUST_LOG).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis pipeline on a candle file (.json or .csv).
    Analyze {
        file: PathBuf,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the full report as JSON instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Run a single stage and print its result as JSON.
    Stage {
        #[arg(value_enum)]
        stage: StageArg,

        file: PathBuf,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Generate a seeded random-walk candle series.
    Synth {
        /// Number of candles.
        #[arg(long, default_value_t = 200)]
        bars: usize,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        #[arg(long, default_value_t = 100.0)]
        start_price: f64,

        /// Output file (.json or .csv). Prints JSON to stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StageArg {
    Indicator,
    Pattern,
    Trend,
    Risk,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.command {
        Commands::Analyze { file, config, json } => run_analyze(&file, config.as_deref(), json),
        Commands::Stage {
            stage,
            file,
            config,
        } => run_stage(stage, &file, config.as_deref()),
        Commands::Synth {
            bars,
            seed,
            start_price,
            output,
        } => run_synth(bars, seed, start_price, output.as_deref()),
    }
}

fn init_tracing(verbose: bool) -> Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref(), verbose)?)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// A valid, non-empty `RUST_LOG` wins outright; otherwise `signallab=info`
/// (`debug` with `--verbose`).
fn log_filter(rust_log: Option<&str>, verbose: bool) -> Result<EnvFilter> {
    if let Some(filter) = rust_log
        .filter(|spec| !spec.trim().is_empty())
        .and_then(|spec| EnvFilter::try_new(spec).ok())
    {
        return Ok(filter);
    }
    let default = if verbose {
        "signallab=debug"
    } else {
        "signallab=info"
    };
    Ok(EnvFilter::try_new(default)?)
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(PipelineConfig::default()),
    }
}

fn load(file: &Path) -> Result<Vec<Candle>> {
    let candles = load_candles(file).with_context(|| format!("loading {}", file.display()))?;
    if candles.is_empty() {
        bail!("{} contains no candles", file.display());
    }
    Ok(candles)
}

fn run_analyze(file: &Path, config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let candles = load(file)?;

    let enricher = if config.enrichment.enabled {
        match ChatEnricher::from_config(&config.enrichment) {
            Ok(enricher) => Some(enricher),
            Err(e) => {
                info!(error = %e, "pattern enrichment unavailable");
                None
            }
        }
    } else {
        None
    };
    let enricher_ref = enricher.as_ref().map(|e| e as &dyn PatternEnricher);

    let report = run_pipeline_with(&candles, &config, enricher_ref);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &PipelineReport) {
    println!("{}", report.narrative);
    println!();

    if report.signals.is_empty() {
        println!("Signals: none");
    } else {
        println!("Signals ({}):", report.signals.len());
        for s in &report.signals {
            println!(
                "  #{:<5} t={:<12} {:<4} score {:.2}  {}",
                s.index,
                s.time,
                s.signal_type.to_string(),
                s.score,
                s.reason
            );
        }
    }

    if !report.errors.is_empty() {
        println!();
        println!("Errors:");
        for message in report.error_messages() {
            println!("  {message}");
        }
    }
}

fn run_stage(stage: StageArg, file: &Path, config_path: Option<&Path>) -> Result<()> {
    let params: AnalysisParams = load_config(config_path)?.analysis;
    let candles = load(file)?;

    let value = match stage {
        StageArg::Indicator => serde_json::to_value(compute_indicator_with(&candles, &params)?)?,
        StageArg::Pattern => serde_json::to_value(compute_pattern_with(&candles, &params)?)?,
        StageArg::Trend => serde_json::to_value(compute_trend_with(&candles, &params)?)?,
        StageArg::Risk => {
            let indicator = compute_indicator_with(&candles, &params)?;
            let pattern = compute_pattern_with(&candles, &params)?;
            let trend = compute_trend_with(&candles, &params)?;
            serde_json::to_value(compute_risk(&indicator, &pattern, &trend)?)?
        }
    };
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn run_synth(bars: usize, seed: u64, start_price: f64, output: Option<&Path>) -> Result<()> {
    if !(start_price.is_finite() && start_price > 0.0) {
        bail!("--start-price must be a positive number");
    }
    let candles = random_walk(bars, seed, start_price);

    let Some(path) = output else {
        println!("{}", serde_json::to_string_pretty(&candles)?);
        return Ok(());
    };

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let as_csv = match ext.as_deref() {
        Some("csv") => true,
        Some("json") => false,
        _ => bail!("--output must end in .json or .csv"),
    };

    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    if as_csv {
        write_csv(file, &candles)?;
    } else {
        serde_json::to_writer_pretty(file, &candles)?;
    }
    info!(bars, seed, path = %path.display(), "synthetic candles written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rust_log_is_not_overridden() {
        let filter = log_filter(Some("signallab=debug"), false).unwrap().to_string();
        assert!(filter.contains("signallab=debug"));
        assert!(!filter.contains("info"));

        let filter = log_filter(Some("signallab_runner=trace"), true).unwrap().to_string();
        assert!(filter.contains("signallab_runner=trace"));
        assert!(!filter.contains("signallab=debug"));
    }

    #[test]
    fn default_level_follows_verbose() {
        let level = |rust_log: Option<&str>, verbose: bool| {
            log_filter(rust_log, verbose).unwrap().to_string()
        };
        assert!(level(None, false).contains("signallab=info"));
        assert!(level(None, true).contains("signallab=debug"));
        assert!(level(Some("  "), false).contains("signallab=info"));
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["signallab", "stage", "risk", "bars.csv"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Stage {
                stage: StageArg::Risk,
                ..
            }
        ));

        let cli = Cli::try_parse_from(["signallab", "-v", "synth", "--bars", "50"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Synth { bars: 50, .. }));
    }
}
