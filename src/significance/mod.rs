// Win-rate significance testing for bot evaluation runs
//
// Turns win/loss sequences into quantitative claims:
// - proportion: one bot against a baseline win rate (z-test or exact binomial),
//   with a Wald confidence interval
// - paired: two bots on the same deals against the same opponent (McNemar)
//
// Every function here is pure; reading logs happens in `match_log`.

mod config;
mod paired;
mod proportion;

pub use config::EvaluationConfig;
pub use paired::{
    compare_samples, mcnemar_statistic, mcnemar_test, ContingencyTable, PairedTestResult, Subject,
};
pub use proportion::{
    test_proportion, test_sequence, ExactBinomial, NormalApproximation, ProportionTestResult,
    ProportionTester, TestMethod,
};
