// Configuration for win-rate significance testing
//
// One struct drives both the single-sample proportion test and the paired
// McNemar comparison. Loadable from the `[settings]` table of a batch plan.

use crate::significance::proportion::TestMethod;
use serde::{Deserialize, Serialize};

/// Settings shared by every test in an analysis run
///
/// # Example
/// ```
/// use schnapsen_stats::significance::EvaluationConfig;
///
/// let config = EvaluationConfig::default();
/// assert_eq!(config.significance_level, 0.05);
/// assert_eq!(config.baseline_rate, 0.5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvaluationConfig {
    /// Win probability under the null hypothesis
    ///
    /// 0.5 (default) asks "is this bot better or worse than a coin flip".
    pub baseline_rate: f64,

    /// Type I error threshold (alpha); a p-value strictly below it is significant
    ///
    /// - 0.05 (default)
    /// - 0.01: strict
    /// - 0.10: permissive
    pub significance_level: f64,

    /// Confidence level of the reported win-rate interval
    ///
    /// Default: 0.95 (critical value 1.959964)
    pub confidence_level: f64,

    /// Strategy used for the single-sample p-value
    pub method: TestMethod,

    /// Clamp the Wald interval to [0, 1]
    ///
    /// Off by default: extreme win rates report the raw endpoints.
    pub clamp_interval: bool,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            baseline_rate: 0.5,
            significance_level: 0.05,
            confidence_level: 0.95,
            method: TestMethod::Normal,
            clamp_interval: false,
        }
    }
}

impl EvaluationConfig {
    /// Fewer false positives: alpha 0.01, 99% intervals
    pub fn strict() -> Self {
        Self {
            significance_level: 0.01,
            confidence_level: 0.99,
            ..Self::default()
        }
    }

    /// More sensitive: alpha 0.10, 90% intervals
    pub fn permissive() -> Self {
        Self {
            significance_level: 0.10,
            confidence_level: 0.90,
            ..Self::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        let open_unit = |v: f64| v > 0.0 && v < 1.0;

        if !open_unit(self.baseline_rate) {
            return Err(format!(
                "baseline_rate must be in (0, 1), got {}",
                self.baseline_rate
            ));
        }

        if !open_unit(self.significance_level) {
            return Err(format!(
                "significance_level must be in (0, 1), got {}",
                self.significance_level
            ));
        }

        if !open_unit(self.confidence_level) {
            return Err(format!(
                "confidence_level must be in (0, 1), got {}",
                self.confidence_level
            ));
        }

        Ok(())
    }
}
