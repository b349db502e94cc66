//! Report assembly for evaluation results
//!
//! Text for terminals, JSON for machine parsing. Skipped units are listed
//! as notices rather than silently dropped.

use crate::error::AnalysisError;
use crate::evaluate::{PairedEvaluation, SubjectEvaluation};
use crate::significance::EvaluationConfig;
use serde::Serialize;

/// A unit that could not be evaluated
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    /// Subject name or "A vs B" comparison label
    pub unit: String,
    /// Short condition label, e.g. "no data"
    pub kind: String,
    pub message: String,
}

impl Notice {
    pub fn new(unit: impl Into<String>, error: AnalysisError) -> Self {
        Self {
            unit: unit.into(),
            kind: error.kind().to_string(),
            message: error.to_string(),
        }
    }
}

/// Everything produced by one analysis run
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub config: EvaluationConfig,
    pub evaluations: Vec<SubjectEvaluation>,
    pub comparisons: Vec<PairedEvaluation>,
    pub notices: Vec<Notice>,
}

impl BatchReport {
    pub fn new(config: EvaluationConfig) -> Self {
        Self {
            config,
            evaluations: Vec::new(),
            comparisons: Vec::new(),
            notices: Vec::new(),
        }
    }

    /// Generate human-readable report
    pub fn to_report_string(&self, include_profiles: bool) -> String {
        let mut report = String::new();

        for evaluation in &self.evaluations {
            report.push_str(&render_evaluation(evaluation, include_profiles));
            report.push('\n');
        }

        for comparison in &self.comparisons {
            report.push_str(&render_comparison(comparison));
            report.push('\n');
        }

        if !self.notices.is_empty() {
            report.push_str(&format!("⚠️  Skipped ({}):\n", self.notices.len()));
            for notice in &self.notices {
                report.push_str(&format!("  - {} [{}]: {}\n", notice.unit, notice.kind, notice.message));
            }
        }

        if report.is_empty() {
            report.push_str("Nothing to report.\n");
        }

        report
    }

    /// Serialize the whole report as pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn banner(title: &str) -> String {
    let rule = "=".repeat(60);
    format!("{}\n   {}\n{}\n", rule, title, rule)
}

/// Text block for one single-sample evaluation
pub fn render_evaluation(evaluation: &SubjectEvaluation, include_profile: bool) -> String {
    let r = &evaluation.result;
    let mut report = banner(&format!("Statistical Analysis: {}", evaluation.subject));

    report.push_str(&format!("Source: {}\n\n", evaluation.source.display()));
    report.push_str("Result Summary:\n");
    report.push_str(&format!("  Total Games (n):   {}\n", r.n));
    report.push_str(&format!("  Wins:              {}\n", r.wins));
    report.push_str(&format!("  Losses:            {}\n", r.losses));
    report.push_str(&format!(
        "  Observed Win Rate: {:.4} ({:.2}%)\n",
        r.win_rate,
        r.win_rate * 100.0
    ));

    report.push_str(&format!(
        "\nStatistical Significance (vs baseline {:.0}%, {}):\n",
        r.baseline_rate * 100.0,
        r.method.label()
    ));
    report.push_str(&format!("  Z-Score:           {:.4}\n", r.test_statistic));
    report.push_str(&format!("  Std Error:         {:.5}\n", r.std_error));
    report.push_str(&format!("  P-Value:           {:.10}\n", r.p_value));
    report.push_str(&format!(
        "  Conclusion:        {} at alpha={}\n",
        if r.significant {
            "✅ SIGNIFICANT"
        } else {
            "NOT SIGNIFICANT"
        },
        r.alpha
    ));

    report.push_str(&format!(
        "\n{:.0}% Confidence Interval:\n",
        r.confidence * 100.0
    ));
    report.push_str(&format!("  Range:             [{:.4}, {:.4}]\n", r.ci_lower, r.ci_upper));

    report.push_str(&format!(
        "\nAvg Game Points (Winning): {:.2}\n",
        evaluation.mean_points_per_win
    ));

    if include_profile {
        report.push('\n');
        report.push_str(&evaluation.profile.to_report_string());
    }

    report
}

/// Text block for one paired comparison
pub fn render_comparison(comparison: &PairedEvaluation) -> String {
    let r = &comparison.result;
    let t = &r.table;
    let mut report = banner(&format!(
        "Paired Comparison (McNemar): {} vs {}",
        comparison.subject_a, comparison.subject_b
    ));

    report.push_str(&format!(
        "Sources: {} | {}\n\n",
        comparison.source_a.display(),
        comparison.source_b.display()
    ));
    report.push_str(&format!("Paired trials: {}\n", t.total()));
    report.push_str(&format!("  Both won:                  {}\n", t.n11));
    report.push_str(&format!(
        "  {} won, {} lost:   {}\n",
        comparison.subject_a, comparison.subject_b, t.n10
    ));
    report.push_str(&format!(
        "  {} lost, {} won:   {}\n",
        comparison.subject_a, comparison.subject_b, t.n01
    ));
    report.push_str(&format!("  Both lost:                 {}\n", t.n00));

    report.push_str(&format!("\n  Chi-square (1 df): {:.4}\n", r.chi2_statistic));
    report.push_str(&format!("  P-Value:           {:.10}\n", r.p_value));
    match comparison.favored_name() {
        Some(name) => report.push_str(&format!(
            "  Conclusion:        ✅ SIGNIFICANT at alpha={}, favors {}\n",
            r.alpha, name
        )),
        None if r.significant => report.push_str(&format!(
            "  Conclusion:        SIGNIFICANT at alpha={}, no favored side\n",
            r.alpha
        )),
        None => report.push_str(&format!(
            "  Conclusion:        NOT SIGNIFICANT at alpha={}\n",
            r.alpha
        )),
    }

    report
}
