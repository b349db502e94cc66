// Single-sample win-rate test against a baseline rate
//
// Two interchangeable strategies sit behind `ProportionTester`:
// - NormalApproximation: two-tailed z-test, p = 2 * (1 - Φ(|z|))
// - ExactBinomial: sums every Binomial(n, p0) mass no larger than the mass
//   of the observed win count (the two-sided rule R's binom.test uses)
//
// Whatever the strategy, the reported statistic is the standardized z and
// the interval is the Wald interval around the observed win rate.

use crate::error::{AnalysisError, Result};
use crate::match_log::OutcomeSequence;
use crate::numeric::{binomial_ln_pmf, standard_normal_sf, two_sided_critical_value};
use crate::significance::config::EvaluationConfig;
use serde::{Deserialize, Serialize};

/// Relative slack when comparing binomial masses against the observed one
const MASS_TOLERANCE: f64 = 1e-7;

/// Strategy selector for the single-sample p-value
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum TestMethod {
    /// Normal-approximation z-test
    #[default]
    Normal,
    /// Exact two-sided binomial test
    Exact,
}

impl TestMethod {
    pub fn tester(self) -> &'static dyn ProportionTester {
        match self {
            Self::Normal => &NormalApproximation,
            Self::Exact => &ExactBinomial,
        }
    }

    pub fn label(self) -> &'static str {
        self.tester().name()
    }
}

/// Two-sided p-value for `wins` out of `n` under a baseline win rate
pub trait ProportionTester {
    fn name(&self) -> &'static str;

    /// Requires `n > 0` and `0 < baseline_rate < 1`
    fn two_sided_p_value(&self, wins: u64, n: u64, baseline_rate: f64) -> f64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NormalApproximation;

impl ProportionTester for NormalApproximation {
    fn name(&self) -> &'static str {
        "normal approximation z-test"
    }

    fn two_sided_p_value(&self, wins: u64, n: u64, baseline_rate: f64) -> f64 {
        let z = z_score(wins, n, baseline_rate);
        (2.0 * standard_normal_sf(z.abs())).min(1.0)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExactBinomial;

impl ProportionTester for ExactBinomial {
    fn name(&self) -> &'static str {
        "exact binomial test"
    }

    fn two_sided_p_value(&self, wins: u64, n: u64, baseline_rate: f64) -> f64 {
        let observed = binomial_ln_pmf(n, wins, baseline_rate);
        let threshold = observed + MASS_TOLERANCE.ln_1p();

        let total: f64 = (0..=n)
            .map(|k| binomial_ln_pmf(n, k, baseline_rate))
            .filter(|&ln_mass| ln_mass <= threshold)
            .map(f64::exp)
            .sum();
        total.min(1.0)
    }
}

fn null_std_error(n: u64, baseline_rate: f64) -> f64 {
    (baseline_rate * (1.0 - baseline_rate) / n as f64).sqrt()
}

fn z_score(wins: u64, n: u64, baseline_rate: f64) -> f64 {
    (wins as f64 / n as f64 - baseline_rate) / null_std_error(n, baseline_rate)
}

/// Outcome of a single-sample proportion test
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProportionTestResult {
    pub n: u64,
    pub wins: u64,
    pub losses: u64,
    /// wins / n
    pub win_rate: f64,
    /// Standard error under the null, sqrt(p0 (1 - p0) / n)
    pub std_error: f64,
    /// z = (win_rate - p0) / std_error
    pub test_statistic: f64,
    pub p_value: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub alpha: f64,
    pub confidence: f64,
    pub baseline_rate: f64,
    pub method: TestMethod,
    /// p_value < alpha
    pub significant: bool,
}

impl ProportionTestResult {
    pub fn ci_width(&self) -> f64 {
        self.ci_upper - self.ci_lower
    }
}

/// Test `wins` out of `n` matches against the configured baseline
///
/// # Example
/// ```
/// use schnapsen_stats::significance::{test_proportion, EvaluationConfig};
///
/// let result = test_proportion(520, 1000, &EvaluationConfig::default()).unwrap();
/// assert!((result.p_value - 0.2059).abs() < 1e-3);
/// assert!(!result.significant);
/// ```
pub fn test_proportion(wins: u64, n: u64, config: &EvaluationConfig) -> Result<ProportionTestResult> {
    config.validate().map_err(AnalysisError::InvalidConfig)?;

    if n == 0 {
        return Err(AnalysisError::EmptySample);
    }
    if wins > n {
        return Err(AnalysisError::WinsExceedMatches { wins, n });
    }

    let p0 = config.baseline_rate;
    let win_rate = wins as f64 / n as f64;
    let std_error = null_std_error(n, p0);
    let test_statistic = (win_rate - p0) / std_error;
    let p_value = config.method.tester().two_sided_p_value(wins, n, p0);

    let margin =
        two_sided_critical_value(config.confidence_level) * (win_rate * (1.0 - win_rate) / n as f64).sqrt();
    let (mut ci_lower, mut ci_upper) = (win_rate - margin, win_rate + margin);
    if config.clamp_interval {
        ci_lower = ci_lower.max(0.0);
        ci_upper = ci_upper.min(1.0);
    }

    tracing::debug!(
        "Proportion test ({}): {}/{} z={:.4} p={:.6}",
        config.method.label(),
        wins,
        n,
        test_statistic,
        p_value
    );

    Ok(ProportionTestResult {
        n,
        wins,
        losses: n - wins,
        win_rate,
        std_error,
        test_statistic,
        p_value,
        ci_lower,
        ci_upper,
        alpha: config.significance_level,
        confidence: config.confidence_level,
        baseline_rate: p0,
        method: config.method,
        significant: p_value < config.significance_level,
    })
}

/// Test a subject's outcome sequence; empty sequences are `EmptySample`
pub fn test_sequence(
    sequence: &OutcomeSequence,
    config: &EvaluationConfig,
) -> Result<ProportionTestResult> {
    test_proportion(sequence.wins() as u64, sequence.len() as u64, config)
}
