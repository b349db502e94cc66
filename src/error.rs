//! Recoverable analysis conditions
//!
//! None of these end a batch run: the unit that produced one is skipped and
//! reported, and its siblings carry on.

use std::path::PathBuf;
use thiserror::Error;

/// Conditions raised while ingesting logs or computing a test
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Match log unavailable: {}: {reason}", path.display())]
    SourceUnavailable { path: PathBuf, reason: String },

    #[error("Malformed match log {}: {reason}", path.display())]
    MalformedLog { path: PathBuf, reason: String },

    #[error("No data: a proportion test needs at least one match")]
    EmptySample,

    #[error("Invalid counts: {wins} wins out of {n} matches")]
    WinsExceedMatches { wins: u64, n: u64 },

    #[error("Unpaired samples: {len_a} vs {len_b} matches (need equal, non-zero lengths)")]
    UnpairedSamples { len_a: usize, len_b: usize },

    #[error("Mismatched trials at match {index}: seed {seed_a} vs seed {seed_b}")]
    MismatchedTrials { index: usize, seed_a: u64, seed_b: u64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AnalysisError {
    /// Short label used in report notices
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SourceUnavailable { .. } => "source unavailable",
            Self::MalformedLog { .. } => "malformed log",
            Self::EmptySample => "no data",
            Self::WinsExceedMatches { .. } => "invalid counts",
            Self::UnpairedSamples { .. } => "unpaired samples",
            Self::MismatchedTrials { .. } => "mismatched trials",
            Self::InvalidConfig(_) => "invalid configuration",
        }
    }
}

/// Result type for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;
