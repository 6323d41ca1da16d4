use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pv_harness::{Fixture, HarnessConfig, Runner, Suite, load_corpus, write_json};
use pv_submission::{SampleSubmission, submission_contracts};
use pv_verify::{ConformanceCache, ConformanceReport};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pv_check")]
#[command(about = "Verify image-pyramid submissions")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full suite against the bundled submission.
    #[command(name = "run")]
    Run(RunArgs),
    /// Check a source file statically, without running it.
    #[command(name = "conformance")]
    Conformance(ConformanceArgs),
    /// Print the effective configuration as JSON.
    #[command(name = "config")]
    Config(ConfigArgs),
}

#[derive(Args, Debug, Clone)]
struct ConfigArgs {
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    stress_cases: Option<usize>,
    #[arg(long)]
    min_correlation: Option<f64>,
    #[arg(long)]
    max_error: Option<f64>,
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    #[command(flatten)]
    config: ConfigArgs,
    /// Directory of corpus images; a synthetic corpus is used when absent.
    #[arg(long)]
    corpus: Option<PathBuf>,
    /// Only run cases whose name contains this text.
    #[arg(long)]
    filter: Option<String>,
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct ConformanceArgs {
    #[arg(long, required = true)]
    source: PathBuf,
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ConformanceOutput {
    source: String,
    reports: Vec<ConformanceReport>,
    violations: Vec<String>,
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Run(args) => run_suite(args),
        Command::Conformance(args) => run_conformance(args),
        Command::Config(args) => {
            let config = resolve_config(&args)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&config).context("serializing config")?
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn resolve_config(args: &ConfigArgs) -> Result<HarnessConfig> {
    let mut config = match &args.config {
        Some(path) => HarnessConfig::load(path)?,
        None => HarnessConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.stress.seed = seed;
    }
    if let Some(cases) = args.stress_cases {
        config.stress.cases = cases;
    }
    if let Some(min_correlation) = args.min_correlation {
        config.compare.min_correlation = min_correlation;
    }
    if let Some(max_error) = args.max_error {
        config.compare.max_error = max_error;
    }
    config.validate()?;
    Ok(config)
}

fn run_suite(args: RunArgs) -> Result<ExitCode> {
    let config = resolve_config(&args.config)?;
    let corpus = load_corpus(args.corpus.as_deref())?;
    info!(images = corpus.len(), "corpus loaded");

    let submission = SampleSubmission;
    let fixture = Fixture::setup(config, corpus, &submission);
    let mut suite = Suite::standard(&fixture);
    if let Some(pattern) = &args.filter {
        suite.retain_matching(pattern);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let report = Runner::new(&fixture, &submission).run(&suite, &mut out)?;
    out.flush().context("flushing stdout")?;

    if let Some(path) = &args.report {
        write_json(path, &report)?;
    }
    Ok(exit_code(report.all_passed()))
}

fn run_conformance(args: ConformanceArgs) -> Result<ExitCode> {
    let source = read_source(&args.source)?;
    let contracts = submission_contracts();
    let cache = ConformanceCache::build(&source, &contracts)
        .with_context(|| format!("checking {}", args.source.display()))?;

    let violations: Vec<String> = contracts
        .iter()
        .filter_map(|c| cache.verdict(&c.name).err())
        .map(|failure| failure.to_string())
        .collect();
    let output = ConformanceOutput {
        source: args.source.display().to_string(),
        reports: cache.reports().cloned().collect(),
        violations,
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&output).context("serializing conformance reports")?
    );
    if let Some(path) = &args.report {
        write_json(path, &output)?;
    }
    Ok(exit_code(output.violations.is_empty()))
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading source {}", path.display()))
}

fn exit_code(passed: bool) -> ExitCode {
    if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
