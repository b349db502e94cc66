use anyhow::{Context, Result};
use clap::Parser;
use schnapsen_stats::batch::{run_plan, AnalysisPlan};
use schnapsen_stats::cli::{BatchArgs, Cli, Command, OutputFormat, PairedArgs, ProportionArgs};
use schnapsen_stats::evaluate::{evaluate_paired, evaluate_proportion};
use schnapsen_stats::report::{render_comparison, render_evaluation};
use schnapsen_stats::significance::EvaluationConfig;
use serde::Serialize;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Settings from `--config`, or the defaults
fn base_config(path: Option<&Path>) -> Result<EvaluationConfig> {
    match path {
        Some(path) => Ok(AnalysisPlan::from_file(path)?.settings),
        None => Ok(EvaluationConfig::default()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize report")?;
    println!("{}", json);
    Ok(())
}

fn run_proportion(args: ProportionArgs, format: OutputFormat) -> Result<()> {
    let mut config = base_config(args.config.as_deref())?;
    if let Some(rate) = args.baseline_rate {
        config.baseline_rate = rate;
    }
    if let Some(alpha) = args.alpha {
        config.significance_level = alpha;
    }
    if let Some(confidence) = args.confidence {
        config.confidence_level = confidence;
    }
    if let Some(method) = args.method {
        config.method = method;
    }
    config.clamp_interval |= args.clamp_interval;

    let evaluation = evaluate_proportion(&args.log, &args.subject, &config)
        .with_context(|| format!("Cannot evaluate {}", args.subject))?;

    match format {
        OutputFormat::Text => print!("{}", render_evaluation(&evaluation, args.profile)),
        OutputFormat::Json => print_json(&evaluation)?,
    }
    Ok(())
}

fn run_paired(args: PairedArgs, format: OutputFormat) -> Result<()> {
    let mut config = base_config(args.config.as_deref())?;
    if let Some(alpha) = args.alpha {
        config.significance_level = alpha;
    }

    let evaluation = evaluate_paired(
        &args.log_a,
        &args.subject_a,
        &args.log_b,
        &args.subject_b,
        &config,
    )
    .with_context(|| format!("Cannot compare {} with {}", args.subject_a, args.subject_b))?;

    match format {
        OutputFormat::Text => print!("{}", render_comparison(&evaluation)),
        OutputFormat::Json => print_json(&evaluation)?,
    }
    Ok(())
}

fn run_batch(args: BatchArgs, format: OutputFormat) -> Result<()> {
    let plan = AnalysisPlan::from_file(&args.plan)?;
    if plan.is_empty() {
        tracing::warn!("Plan {} lists no evaluations", args.plan.display());
    }

    let report = run_plan(&plan);
    match format {
        OutputFormat::Text => print!("{}", report.to_report_string(args.profile)),
        OutputFormat::Json => {
            let json = report.to_json().context("Failed to serialize report")?;
            println!("{}", json);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.debug);

    match args.command {
        Command::Proportion(cmd) => run_proportion(cmd, args.format),
        Command::Paired(cmd) => run_paired(cmd, args.format),
        Command::Batch(cmd) => run_batch(cmd, args.format),
    }
}
