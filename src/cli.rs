//! CLI argument parsing for schnapsen-stats

use crate::significance::TestMethod;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "schnapsen-stats")]
#[command(version)]
#[command(about = "Statistical significance of Schnapsen bot match results", long_about = None)]
pub struct Cli {
    /// Enable debug tracing output to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Test one bot's win rate against a baseline
    Proportion(ProportionArgs),
    /// Compare two bots evaluated on the same deals (McNemar)
    Paired(PairedArgs),
    /// Run every evaluation and comparison listed in a TOML plan
    Batch(BatchArgs),
}

#[derive(clap::Args, Debug)]
pub struct ProportionArgs {
    /// Match log CSV
    #[arg(long, value_name = "CSV")]
    pub log: PathBuf,

    /// Bot name as it appears in the Winner column
    #[arg(long, value_name = "NAME")]
    pub subject: String,

    /// Win rate under the null hypothesis
    #[arg(long = "baseline-rate", value_name = "RATE")]
    pub baseline_rate: Option<f64>,

    /// Significance level
    #[arg(long, value_name = "ALPHA")]
    pub alpha: Option<f64>,

    /// Confidence level for the interval
    #[arg(long, value_name = "LEVEL")]
    pub confidence: Option<f64>,

    /// Test method (normal or exact)
    #[arg(long, value_enum)]
    pub method: Option<TestMethod>,

    /// Clamp the confidence interval to [0, 1]
    #[arg(long = "clamp-interval")]
    pub clamp_interval: bool,

    /// Include the play profile breakdown
    #[arg(long)]
    pub profile: bool,

    /// Read default settings from a plan file's [settings] table
    #[arg(long, value_name = "TOML")]
    pub config: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct PairedArgs {
    #[arg(long = "log-a", value_name = "CSV")]
    pub log_a: PathBuf,

    #[arg(long = "subject-a", value_name = "NAME")]
    pub subject_a: String,

    #[arg(long = "log-b", value_name = "CSV")]
    pub log_b: PathBuf,

    #[arg(long = "subject-b", value_name = "NAME")]
    pub subject_b: String,

    /// Significance level
    #[arg(long, value_name = "ALPHA")]
    pub alpha: Option<f64>,

    /// Read default settings from a plan file's [settings] table
    #[arg(long, value_name = "TOML")]
    pub config: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct BatchArgs {
    /// Analysis plan
    #[arg(value_name = "PLAN")]
    pub plan: PathBuf,

    /// Include play profiles in the text report
    #[arg(long)]
    pub profile: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_proportion_defaults() {
        let cli = Cli::parse_from([
            "schnapsen-stats",
            "proportion",
            "--log",
            "cocky.csv",
            "--subject",
            "CockyBot",
        ]);
        assert!(!cli.debug);
        assert_eq!(cli.format, OutputFormat::Text);
        let Command::Proportion(args) = cli.command else {
            panic!("expected proportion subcommand");
        };
        assert_eq!(args.log, PathBuf::from("cocky.csv"));
        assert_eq!(args.subject, "CockyBot");
        assert!(args.alpha.is_none());
        assert!(args.method.is_none());
        assert!(!args.clamp_interval);
        assert!(!args.profile);
    }

    #[test]
    fn test_cli_proportion_overrides() {
        let cli = Cli::parse_from([
            "schnapsen-stats",
            "proportion",
            "--log",
            "cocky.csv",
            "--subject",
            "CockyBot",
            "--alpha",
            "0.01",
            "--confidence",
            "0.99",
            "--baseline-rate",
            "0.6",
            "--method",
            "exact",
            "--clamp-interval",
        ]);
        let Command::Proportion(args) = cli.command else {
            panic!("expected proportion subcommand");
        };
        assert_eq!(args.alpha, Some(0.01));
        assert_eq!(args.confidence, Some(0.99));
        assert_eq!(args.baseline_rate, Some(0.6));
        assert_eq!(args.method, Some(TestMethod::Exact));
        assert!(args.clamp_interval);
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["schnapsen-stats", "batch", "plan.toml", "--format", "json", "--debug"]);
        assert!(cli.debug);
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Command::Batch(ref b) if b.plan == PathBuf::from("plan.toml")));
    }

    #[test]
    fn test_cli_paired_requires_both_sides() {
        let result = Cli::try_parse_from([
            "schnapsen-stats",
            "paired",
            "--log-a",
            "a.csv",
            "--subject-a",
            "CockyBot",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_rejects_unknown_method() {
        let result = Cli::try_parse_from([
            "schnapsen-stats",
            "proportion",
            "--log",
            "a.csv",
            "--subject",
            "A",
            "--method",
            "bayes",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["schnapsen-stats"]).is_err());
    }
}
