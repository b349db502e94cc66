//! Log-level evaluation entry points
//!
//! `evaluate_proportion` and `evaluate_paired` read match logs, derive the
//! outcome sequences and run the significance tests. Each call stands alone;
//! a failure affects only the unit being evaluated.

use crate::error::{AnalysisError, Result};
use crate::match_log::MatchLog;
use crate::profile::PlayProfile;
use crate::significance::{
    compare_samples, test_sequence, EvaluationConfig, PairedTestResult, ProportionTestResult,
    Subject,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One subject's single-sample evaluation
#[derive(Debug, Clone, Serialize)]
pub struct SubjectEvaluation {
    pub subject: String,
    pub source: PathBuf,
    pub result: ProportionTestResult,
    /// Mean game points over the subject's wins
    pub mean_points_per_win: f64,
    pub profile: PlayProfile,
}

/// Paired comparison of two subjects
#[derive(Debug, Clone, Serialize)]
pub struct PairedEvaluation {
    pub subject_a: String,
    pub source_a: PathBuf,
    pub subject_b: String,
    pub source_b: PathBuf,
    pub result: PairedTestResult,
}

impl PairedEvaluation {
    pub fn name_of(&self, subject: Subject) -> &str {
        match subject {
            Subject::A => &self.subject_a,
            Subject::B => &self.subject_b,
        }
    }

    /// Name of the favored subject, when the comparison is significant
    pub fn favored_name(&self) -> Option<&str> {
        self.result.favored_subject.map(|s| self.name_of(s))
    }
}

/// Evaluate `subject`'s win rate in the log at `log`
pub fn evaluate_proportion(
    log: &Path,
    subject: &str,
    config: &EvaluationConfig,
) -> Result<SubjectEvaluation> {
    config.validate().map_err(AnalysisError::InvalidConfig)?;
    let log = MatchLog::open(log)?;
    evaluate_proportion_in(&log, subject, config)
}

/// Same as [`evaluate_proportion`] over an already loaded log
pub fn evaluate_proportion_in(
    log: &MatchLog,
    subject: &str,
    config: &EvaluationConfig,
) -> Result<SubjectEvaluation> {
    let sequence = log.outcomes_for(subject);
    let result = test_sequence(&sequence, config)?;

    tracing::info!(
        "{}: {}/{} wins, p={:.6} ({})",
        subject,
        result.wins,
        result.n,
        result.p_value,
        if result.significant {
            "significant"
        } else {
            "not significant"
        }
    );

    Ok(SubjectEvaluation {
        subject: subject.to_string(),
        source: log.source().to_path_buf(),
        mean_points_per_win: sequence.mean_points_per_win(),
        profile: PlayProfile::from_log(log, subject),
        result,
    })
}

/// Compare `subject_a` in `log_a` against `subject_b` in `log_b`
///
/// Both logs must cover the same trials. When both carry seeds they are
/// checked index by index.
pub fn evaluate_paired(
    log_a: &Path,
    subject_a: &str,
    log_b: &Path,
    subject_b: &str,
    config: &EvaluationConfig,
) -> Result<PairedEvaluation> {
    config.validate().map_err(AnalysisError::InvalidConfig)?;
    let log_a = MatchLog::open(log_a)?;
    let log_b = MatchLog::open(log_b)?;
    evaluate_paired_in(&log_a, subject_a, &log_b, subject_b, config)
}

/// Same as [`evaluate_paired`] over already loaded logs
pub fn evaluate_paired_in(
    log_a: &MatchLog,
    subject_a: &str,
    log_b: &MatchLog,
    subject_b: &str,
    config: &EvaluationConfig,
) -> Result<PairedEvaluation> {
    let sample_a = log_a.outcomes_for(subject_a);
    let sample_b = log_b.outcomes_for(subject_b);

    if sample_a.len() == sample_b.len() {
        check_trial_alignment(log_a, log_b)?;
    }
    let result = compare_samples(&sample_a, &sample_b, config)?;

    let evaluation = PairedEvaluation {
        subject_a: subject_a.to_string(),
        source_a: log_a.source().to_path_buf(),
        subject_b: subject_b.to_string(),
        source_b: log_b.source().to_path_buf(),
        result,
    };

    tracing::info!(
        "{} vs {}: chi2={:.4}, p={:.6}, favored={}",
        subject_a,
        subject_b,
        evaluation.result.chi2_statistic,
        evaluation.result.p_value,
        evaluation.favored_name().unwrap_or("none")
    );

    Ok(evaluation)
}

fn check_trial_alignment(log_a: &MatchLog, log_b: &MatchLog) -> Result<()> {
    let (Some(seeds_a), Some(seeds_b)) = (log_a.seeds(), log_b.seeds()) else {
        tracing::debug!("Seed column absent, trusting log order for pairing");
        return Ok(());
    };

    match seeds_a
        .iter()
        .zip(&seeds_b)
        .position(|(a, b)| a != b)
    {
        Some(index) => Err(AnalysisError::MismatchedTrials {
            index,
            seed_a: seeds_a[index],
            seed_b: seeds_b[index],
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::match_log::MatchRecord;

    fn log_with_seeds(source: &str, winners: &[&str], seeds: &[u64]) -> MatchLog {
        let records = winners
            .iter()
            .zip(seeds)
            .map(|(w, &s)| MatchRecord::new(*w, Some(2)).with_seed(s))
            .collect();
        MatchLog::from_records(source, records)
    }

    #[test]
    fn test_evaluate_proportion_in_memory() {
        let log = log_with_seeds("a.csv", &["A", "R", "A", "A"], &[0, 1, 2, 3]);
        let evaluation = evaluate_proportion_in(&log, "A", &EvaluationConfig::default()).unwrap();
        assert_eq!(evaluation.result.wins, 3);
        assert_eq!(evaluation.mean_points_per_win, 2.0);
        assert_eq!(evaluation.profile.total_games, 4);
        assert_eq!(evaluation.source, PathBuf::from("a.csv"));
    }

    #[test]
    fn test_evaluate_proportion_empty_log() {
        let log = MatchLog::from_records("empty.csv", Vec::new());
        assert_eq!(
            evaluate_proportion_in(&log, "A", &EvaluationConfig::default()).unwrap_err(),
            AnalysisError::EmptySample
        );
    }

    #[test]
    fn test_evaluate_proportion_missing_file() {
        let err = evaluate_proportion(
            Path::new("/nonexistent/cocky.csv"),
            "CockyBot",
            &EvaluationConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AnalysisError::SourceUnavailable { .. }));
    }

    #[test]
    fn test_evaluate_paired_names_favorite() {
        let winners_a = vec!["A"; 40];
        let mut winners_b = vec!["R"; 40];
        winners_b[0] = "B";
        let seeds: Vec<u64> = (0..40).collect();

        let log_a = log_with_seeds("a.csv", &winners_a, &seeds);
        let log_b = log_with_seeds("b.csv", &winners_b, &seeds);

        let evaluation =
            evaluate_paired_in(&log_a, "A", &log_b, "B", &EvaluationConfig::default()).unwrap();
        assert_eq!(evaluation.result.table.n10, 39);
        assert_eq!(evaluation.result.table.n11, 1);
        assert_eq!(evaluation.favored_name(), Some("A"));
    }

    #[test]
    fn test_evaluate_paired_detects_seed_mismatch() {
        let log_a = log_with_seeds("a.csv", &["A", "A", "R"], &[0, 1, 2]);
        let log_b = log_with_seeds("b.csv", &["B", "R", "B"], &[0, 7, 2]);

        let err = evaluate_paired_in(&log_a, "A", &log_b, "B", &EvaluationConfig::default())
            .unwrap_err();
        assert_eq!(
            err,
            AnalysisError::MismatchedTrials {
                index: 1,
                seed_a: 1,
                seed_b: 7
            }
        );
    }

    #[test]
    fn test_evaluate_paired_without_seeds_pairs_by_order() {
        let log_a = MatchLog::from_records(
            "a.csv",
            vec![MatchRecord::new("A", None), MatchRecord::new("R", None)],
        );
        let log_b = MatchLog::from_records(
            "b.csv",
            vec![MatchRecord::new("R", None), MatchRecord::new("B", None)],
        );

        let evaluation =
            evaluate_paired_in(&log_a, "A", &log_b, "B", &EvaluationConfig::default()).unwrap();
        assert_eq!(evaluation.result.table.n10, 1);
        assert_eq!(evaluation.result.table.n01, 1);
        assert!(!evaluation.result.significant);
    }

    #[test]
    fn test_evaluate_paired_unequal_lengths() {
        let log_a = log_with_seeds("a.csv", &["A", "A"], &[0, 1]);
        let log_b = log_with_seeds("b.csv", &["B"], &[0]);
        assert!(matches!(
            evaluate_paired_in(&log_a, "A", &log_b, "B", &EvaluationConfig::default()),
            Err(AnalysisError::UnpairedSamples { len_a: 2, len_b: 1 })
        ));
    }
}
