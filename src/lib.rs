//! schnapsen-stats - statistical significance for Schnapsen bot match logs
//!
//! Reads the CSV logs written by bot experiment runs and answers two
//! questions: does a bot beat a baseline win rate, and does one bot beat
//! another on the same deals. Results come with p-values, confidence
//! intervals and a descriptive play profile.

pub mod batch;
pub mod cli;
pub mod error;
pub mod evaluate;
pub mod match_log;
pub mod numeric;
pub mod profile;
pub mod report;
pub mod significance;
