//! Batch analysis plans
//!
//! A plan lists subjects to test against the baseline and pairs of subjects
//! to compare. Every unit is evaluated independently: a missing log or an
//! unpaired comparison becomes a notice in the report and the rest of the
//! plan still runs.
//!
//! # Example plan
//!
//! ```toml
//! [settings]
//! significance_level = 0.05
//! method = "exact"
//!
//! [[evaluation]]
//! log = "cocky_experiment_results.csv"
//! subject = "CockyBot"
//!
//! [[comparison]]
//! log_a = "cocky_experiment_results.csv"
//! subject_a = "CockyBot"
//! log_b = "bully_experiment_results.csv"
//! subject_b = "BullyBot"
//! ```

use crate::error::AnalysisError;
use crate::evaluate::{evaluate_paired_in, evaluate_proportion_in};
use crate::match_log::MatchLog;
use crate::report::{BatchReport, Notice};
use crate::significance::EvaluationConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Single-sample evaluation entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSpec {
    pub log: PathBuf,
    pub subject: String,
}

/// Paired comparison entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSpec {
    pub log_a: PathBuf,
    pub subject_a: String,
    pub log_b: PathBuf,
    pub subject_b: String,
}

impl ComparisonSpec {
    fn label(&self) -> String {
        format!("{} vs {}", self.subject_a, self.subject_b)
    }
}

/// Root of a plan file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisPlan {
    #[serde(default)]
    pub settings: EvaluationConfig,
    #[serde(default)]
    pub evaluation: Vec<EvaluationSpec>,
    #[serde(default)]
    pub comparison: Vec<ComparisonSpec>,
}

impl AnalysisPlan {
    /// Load a plan from a TOML file
    ///
    /// Relative log paths are resolved against the plan's directory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read plan {}", path.display()))?;

        let plan = Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse plan {}", path.display()))?;
        Ok(match path.parent() {
            Some(dir) => plan.resolve_relative_to(dir),
            None => plan,
        })
    }

    /// Parse a plan from TOML text; paths are left as written
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let plan: Self = toml::from_str(content).context("Failed to parse TOML")?;
        plan.settings
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid [settings]: {}", e))?;
        Ok(plan)
    }

    fn resolve_relative_to(mut self, dir: &Path) -> Self {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = dir.join(&*p);
            }
        };
        for spec in &mut self.evaluation {
            resolve(&mut spec.log);
        }
        for spec in &mut self.comparison {
            resolve(&mut spec.log_a);
            resolve(&mut spec.log_b);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.evaluation.is_empty() && self.comparison.is_empty()
    }
}

/// Loads each distinct log once and remembers failures
#[derive(Default)]
struct LogCache {
    logs: HashMap<PathBuf, std::result::Result<MatchLog, AnalysisError>>,
}

impl LogCache {
    fn load(&mut self, path: &Path) {
        self.logs
            .entry(path.to_path_buf())
            .or_insert_with(|| MatchLog::open(path));
    }

    fn get(&self, path: &Path) -> std::result::Result<&MatchLog, AnalysisError> {
        match self.logs.get(path) {
            Some(Ok(log)) => Ok(log),
            Some(Err(e)) => Err(e.clone()),
            None => Err(AnalysisError::SourceUnavailable {
                path: path.to_path_buf(),
                reason: "log was not loaded".to_string(),
            }),
        }
    }
}

/// Run every unit of a plan, collecting results and notices
pub fn run_plan(plan: &AnalysisPlan) -> BatchReport {
    let config = &plan.settings;
    let mut cache = LogCache::default();
    let mut report = BatchReport::new(config.clone());

    for spec in &plan.evaluation {
        cache.load(&spec.log);
        let outcome = cache
            .get(&spec.log)
            .and_then(|log| evaluate_proportion_in(log, &spec.subject, config));
        match outcome {
            Ok(evaluation) => report.evaluations.push(evaluation),
            Err(error) => {
                tracing::warn!("Skipping evaluation of {}: {}", spec.subject, error);
                report.notices.push(Notice::new(spec.subject.clone(), error));
            }
        }
    }

    for spec in &plan.comparison {
        cache.load(&spec.log_a);
        cache.load(&spec.log_b);
        let outcome = cache.get(&spec.log_a).and_then(|log_a| {
            let log_b = cache.get(&spec.log_b)?;
            evaluate_paired_in(log_a, &spec.subject_a, log_b, &spec.subject_b, config)
        });
        match outcome {
            Ok(evaluation) => report.comparisons.push(evaluation),
            Err(error) => {
                tracing::warn!("Skipping comparison {}: {}", spec.label(), error);
                report.notices.push(Notice::new(spec.label(), error));
            }
        }
    }

    tracing::info!(
        "Batch finished: {} evaluations, {} comparisons, {} skipped",
        report.evaluations.len(),
        report.comparisons.len(),
        report.notices.len()
    );
    report
}
