// Paired comparison of two bots on matched trials (McNemar's test)
//
// Both bots play the same baseline opponent on the same deals, so trial i of
// sample A and trial i of sample B share a seed. Only the discordant trials
// (one bot won, the other lost) carry evidence about which bot is stronger.
//
// Continuity correction keeps the raw numerator: chi2 = (|n10 - n01| - 1)^2 / d.
// When n10 == n01 this is 1/d rather than 0.

use crate::error::{AnalysisError, Result};
use crate::match_log::OutcomeSequence;
use crate::numeric::chi_square_survival_1df;
use crate::significance::config::EvaluationConfig;
use serde::Serialize;

/// Side of a paired comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Subject {
    A,
    B,
}

impl Subject {
    pub fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

/// 2x2 cross-classification of paired win/loss outcomes
///
/// First digit is A's outcome, second is B's (1 = won).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ContingencyTable {
    /// Both lost
    pub n00: u64,
    /// A lost, B won
    pub n01: u64,
    /// A won, B lost
    pub n10: u64,
    /// Both won
    pub n11: u64,
}

impl ContingencyTable {
    pub fn new(n00: u64, n01: u64, n10: u64, n11: u64) -> Self {
        Self { n00, n01, n10, n11 }
    }

    /// Classify `(a_won, b_won)` pairs
    pub fn from_pairs(pairs: impl IntoIterator<Item = (bool, bool)>) -> Self {
        pairs
            .into_iter()
            .fold(Self::default(), |mut table, pair| {
                match pair {
                    (false, false) => table.n00 += 1,
                    (false, true) => table.n01 += 1,
                    (true, false) => table.n10 += 1,
                    (true, true) => table.n11 += 1,
                }
                table
            })
    }

    /// Pair two sequences index by index
    ///
    /// Sequences must be non-empty and of equal length.
    pub fn from_samples(sample_a: &OutcomeSequence, sample_b: &OutcomeSequence) -> Result<Self> {
        if sample_a.len() != sample_b.len() || sample_a.is_empty() {
            return Err(AnalysisError::UnpairedSamples {
                len_a: sample_a.len(),
                len_b: sample_b.len(),
            });
        }

        Ok(Self::from_pairs(
            sample_a
                .outcomes()
                .iter()
                .zip(sample_b.outcomes())
                .map(|(a, b)| (a.won, b.won)),
        ))
    }

    /// Paired sample size
    pub fn total(&self) -> u64 {
        self.n00 + self.n01 + self.n10 + self.n11
    }

    /// Number of discordant trials, n10 + n01
    pub fn disagreements(&self) -> u64 {
        self.n10 + self.n01
    }

    /// Same table with the roles of A and B exchanged
    pub fn swapped(&self) -> Self {
        Self {
            n00: self.n00,
            n01: self.n10,
            n10: self.n01,
            n11: self.n11,
        }
    }
}

/// Continuity-corrected McNemar statistic; `0` when there are no disagreements
pub fn mcnemar_statistic(table: &ContingencyTable) -> f64 {
    let d = table.disagreements();
    if d == 0 {
        return 0.0;
    }
    let excess = table.n10.abs_diff(table.n01) as f64 - 1.0;
    excess * excess / d as f64
}

/// Outcome of a paired comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairedTestResult {
    pub table: ContingencyTable,
    pub chi2_statistic: f64,
    pub p_value: f64,
    pub alpha: f64,
    pub significant: bool,
    /// Subject that more often won where the other lost; only when significant
    pub favored_subject: Option<Subject>,
}

/// Run McNemar's test on an already built table
pub fn mcnemar_test(table: ContingencyTable, alpha: f64) -> PairedTestResult {
    let (chi2_statistic, p_value) = if table.disagreements() == 0 {
        (0.0, 1.0)
    } else {
        let chi2 = mcnemar_statistic(&table);
        (chi2, chi_square_survival_1df(chi2))
    };

    let significant = p_value < alpha;
    let favored_subject = if significant {
        match table.n10.cmp(&table.n01) {
            std::cmp::Ordering::Greater => Some(Subject::A),
            std::cmp::Ordering::Less => Some(Subject::B),
            std::cmp::Ordering::Equal => None,
        }
    } else {
        None
    };

    tracing::debug!(
        "McNemar: n01={} n10={} chi2={:.4} p={:.6}",
        table.n01,
        table.n10,
        chi2_statistic,
        p_value
    );

    PairedTestResult {
        table,
        chi2_statistic,
        p_value,
        alpha,
        significant,
        favored_subject,
    }
}

/// Compare two subjects' sequences measured on matched trials
///
/// # Example
/// ```
/// use schnapsen_stats::match_log::OutcomeSequence;
/// use schnapsen_stats::significance::{compare_samples, EvaluationConfig};
///
/// let a = OutcomeSequence::from_wins("CockyBot", [true, true, false]);
/// let b = OutcomeSequence::from_wins("BullyBot", [true, true, false]);
/// let result = compare_samples(&a, &b, &EvaluationConfig::default()).unwrap();
/// assert_eq!(result.p_value, 1.0);
/// ```
pub fn compare_samples(
    sample_a: &OutcomeSequence,
    sample_b: &OutcomeSequence,
    config: &EvaluationConfig,
) -> Result<PairedTestResult> {
    config.validate().map_err(AnalysisError::InvalidConfig)?;
    let table = ContingencyTable::from_samples(sample_a, sample_b)?;
    Ok(mcnemar_test(table, config.significance_level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pairs_classifies_each_cell() {
        let table = ContingencyTable::from_pairs([
            (false, false),
            (false, true),
            (true, false),
            (true, false),
            (true, true),
        ]);
        assert_eq!(table, ContingencyTable::new(1, 1, 2, 1));
        assert_eq!(table.total(), 5);
        assert_eq!(table.disagreements(), 3);
    }

    #[test]
    fn test_reference_table() {
        let result = mcnemar_test(ContingencyTable::new(300, 50, 120, 530), 0.05);
        assert!((result.chi2_statistic - 69.0 * 69.0 / 170.0).abs() < 1e-12);
        assert!(result.p_value < 0.001);
        assert!(result.significant);
        assert_eq!(result.favored_subject, Some(Subject::A));
    }

    #[test]
    fn test_no_disagreement_gives_p_one() {
        let result = mcnemar_test(ContingencyTable::new(400, 0, 0, 600), 0.05);
        assert_eq!(result.chi2_statistic, 0.0);
        assert_eq!(result.p_value, 1.0);
        assert!(!result.significant);
        assert_eq!(result.favored_subject, None);
    }

    #[test]
    fn test_balanced_disagreement_keeps_correction_term() {
        let table = ContingencyTable::new(10, 4, 4, 10);
        assert!((mcnemar_statistic(&table) - 1.0 / 8.0).abs() < 1e-15);
    }

    #[test]
    fn test_single_disagreement_is_zero_statistic() {
        let table = ContingencyTable::new(5, 0, 1, 5);
        assert_eq!(mcnemar_statistic(&table), 0.0);
        assert_eq!(mcnemar_test(table, 0.05).p_value, 1.0);
    }

    #[test]
    fn test_swap_flips_favored_subject() {
        let table = ContingencyTable::new(300, 50, 120, 530);
        let forward = mcnemar_test(table, 0.05);
        let reverse = mcnemar_test(table.swapped(), 0.05);
        assert_eq!(forward.chi2_statistic, reverse.chi2_statistic);
        assert_eq!(forward.p_value, reverse.p_value);
        assert_eq!(reverse.favored_subject, Some(Subject::B));
    }

    #[test]
    fn test_not_significant_has_no_favorite() {
        let result = mcnemar_test(ContingencyTable::new(100, 10, 14, 100), 0.05);
        assert!(!result.significant);
        assert_eq!(result.favored_subject, None);
    }

    #[test]
    fn test_unequal_lengths_are_unpaired() {
        let a = OutcomeSequence::from_wins("A", [true, false]);
        let b = OutcomeSequence::from_wins("B", [true]);
        assert_eq!(
            ContingencyTable::from_samples(&a, &b),
            Err(AnalysisError::UnpairedSamples { len_a: 2, len_b: 1 })
        );
    }

    #[test]
    fn test_empty_samples_are_unpaired() {
        let a = OutcomeSequence::empty("A");
        let b = OutcomeSequence::empty("B");
        assert!(matches!(
            compare_samples(&a, &b, &EvaluationConfig::default()),
            Err(AnalysisError::UnpairedSamples { .. })
        ));
    }

    #[test]
    fn test_subject_other() {
        assert_eq!(Subject::A.other(), Subject::B);
        assert_eq!(Subject::B.other(), Subject::A);
    }
}
