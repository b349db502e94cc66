//! Match log ingestion
//!
//! Reads the per-game CSV logs written by the experiment runner and derives a
//! subject's win/loss sequence from them. Only `Winner` is required; the other
//! columns the runner writes (`Seed`, `Game points`, `Closer`,
//! `Tricks won after closing`, `<bot> marriages`, `<bot> trump exchanges`)
//! are picked up when present.

use crate::error::{AnalysisError, Result};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

const WINNER: &str = "Winner";
const SEED: &str = "Seed";
const GAME_POINTS: &str = "Game points";
const CLOSER: &str = "Closer";
const TRICKS_AFTER_CLOSING: &str = "Tricks won after closing";
const MARRIAGES_SUFFIX: &str = " marriages";
const TRUMP_EXCHANGES_SUFFIX: &str = " trump exchanges";

/// One row of a match log
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchRecord {
    /// Deal seed, shared by matched trials across logs
    pub seed: Option<u64>,
    /// Identifier of the bot that won the game
    pub winner: String,
    /// Winner's game points (1-3)
    pub game_points: Option<u8>,
    /// Bot that closed the talon, if any
    pub closer: Option<String>,
    /// Tricks the closer won after closing
    pub tricks_after_closing: Option<u32>,
    /// Marriages declared, keyed by bot name
    pub marriages: BTreeMap<String, u32>,
    /// Trump exchanges performed, keyed by bot name
    pub trump_exchanges: BTreeMap<String, u32>,
}

impl MatchRecord {
    /// Minimal record: winner plus optional game points
    pub fn new(winner: impl Into<String>, game_points: Option<u8>) -> Self {
        Self {
            winner: winner.into(),
            game_points,
            ..Self::default()
        }
    }

    /// Attach a deal seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// One completed game from a subject's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOutcome {
    pub won: bool,
    /// Game points scored; only recorded for wins
    pub points: Option<u8>,
}

impl MatchOutcome {
    pub fn win(points: u8) -> Self {
        Self {
            won: true,
            points: Some(points),
        }
    }

    pub fn loss() -> Self {
        Self {
            won: false,
            points: None,
        }
    }
}

/// Ordered outcomes for one subject; index = trial order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeSequence {
    subject: String,
    outcomes: Vec<MatchOutcome>,
}

impl OutcomeSequence {
    pub fn new(subject: impl Into<String>, outcomes: Vec<MatchOutcome>) -> Self {
        Self {
            subject: subject.into(),
            outcomes,
        }
    }

    pub fn empty(subject: impl Into<String>) -> Self {
        Self::new(subject, Vec::new())
    }

    /// Build a sequence from bare win flags (no game points)
    pub fn from_wins(subject: impl Into<String>, wins: impl IntoIterator<Item = bool>) -> Self {
        let outcomes = wins
            .into_iter()
            .map(|won| MatchOutcome { won, points: None })
            .collect();
        Self::new(subject, outcomes)
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn outcomes(&self) -> &[MatchOutcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn wins(&self) -> usize {
        self.outcomes.iter().filter(|o| o.won).count()
    }

    pub fn losses(&self) -> usize {
        self.len() - self.wins()
    }

    /// Mean game points over winning outcomes; `0.0` without wins
    ///
    /// Wins logged without a game-point value count as wins with no points.
    pub fn mean_points_per_win(&self) -> f64 {
        let (wins, points) = self
            .outcomes
            .iter()
            .filter(|o| o.won)
            .fold((0u64, 0u64), |(wins, points), o| {
                (wins + 1, points + u64::from(o.points.unwrap_or(0)))
            });
        if wins == 0 {
            return 0.0;
        }
        points as f64 / wins as f64
    }
}

/// A fully parsed match log
#[derive(Debug, Clone)]
pub struct MatchLog {
    source: PathBuf,
    records: Vec<MatchRecord>,
}

impl MatchLog {
    /// Build a log from already materialized records
    pub fn from_records(source: impl Into<PathBuf>, records: Vec<MatchRecord>) -> Self {
        Self {
            source: source.into(),
            records,
        }
    }

    /// Open and parse a CSV log from disk
    ///
    /// A missing or unreadable file is `SourceUnavailable`; a file that opens
    /// but does not parse is `MalformedLog`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| AnalysisError::SourceUnavailable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let log = Self::from_reader(file, path)?;
        tracing::debug!("Loaded {} records from {}", log.len(), path.display());
        Ok(log)
    }

    /// Parse a CSV log from any reader; `source` labels errors and reports
    pub fn from_reader<R: Read>(reader: R, source: impl Into<PathBuf>) -> Result<Self> {
        let source = source.into();
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| classify_csv_error(&source, e))?
            .clone();
        let columns = Columns::locate(&headers).ok_or_else(|| AnalysisError::MalformedLog {
            path: source.clone(),
            reason: format!("missing required column '{}'", WINNER),
        })?;

        let mut records = Vec::new();
        for row in csv_reader.records() {
            let row = row.map_err(|e| classify_csv_error(&source, e))?;
            let record = columns.parse(&row).map_err(|reason| {
                let line = row.position().map(|p| p.line()).unwrap_or_default();
                AnalysisError::MalformedLog {
                    path: source.clone(),
                    reason: format!("line {}: {}", line, reason),
                }
            })?;
            records.push(record);
        }

        Ok(Self { source, records })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn records(&self) -> &[MatchRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Classify every record as a win or loss for `subject`
    pub fn outcomes_for(&self, subject: &str) -> OutcomeSequence {
        let outcomes = self
            .records
            .iter()
            .fold(Vec::with_capacity(self.len()), |mut acc, record| {
                acc.push(if record.winner == subject {
                    MatchOutcome {
                        won: true,
                        points: record.game_points,
                    }
                } else {
                    MatchOutcome::loss()
                });
                acc
            });
        OutcomeSequence::new(subject, outcomes)
    }

    /// Deal seeds in trial order, if every record carries one
    pub fn seeds(&self) -> Option<Vec<u64>> {
        self.records.iter().map(|r| r.seed).collect()
    }
}

/// Result of best-effort ingestion: a sequence plus the condition, if any,
/// that made it empty
#[derive(Debug, Clone)]
pub struct Ingested {
    pub sequence: OutcomeSequence,
    pub condition: Option<AnalysisError>,
}

/// Ingest a subject's outcomes without failing
///
/// Unavailable or malformed sources produce an empty sequence together with
/// the condition, so the caller can report it and move on. This is the entry
/// point for library callers that only need the win/loss sequence;
/// [`crate::batch::run_plan`] keeps whole [`MatchLog`]s instead because it
/// also builds play profiles and checks seeds, and reports the same
/// conditions as notices.
pub fn ingest_outcomes<P: AsRef<Path>>(path: P, subject: &str) -> Ingested {
    match MatchLog::open(path.as_ref()) {
        Ok(log) => Ingested {
            sequence: log.outcomes_for(subject),
            condition: None,
        },
        Err(e) => {
            tracing::warn!("Skipping {} for {}: {}", path.as_ref().display(), subject, e);
            Ingested {
                sequence: OutcomeSequence::empty(subject),
                condition: Some(e),
            }
        }
    }
}

fn classify_csv_error(source: &Path, err: csv::Error) -> AnalysisError {
    if err.is_io_error() {
        AnalysisError::SourceUnavailable {
            path: source.to_path_buf(),
            reason: err.to_string(),
        }
    } else {
        AnalysisError::MalformedLog {
            path: source.to_path_buf(),
            reason: err.to_string(),
        }
    }
}

/// Column positions resolved from the header row
#[derive(Debug)]
struct Columns {
    winner: usize,
    seed: Option<usize>,
    game_points: Option<usize>,
    closer: Option<usize>,
    tricks_after_closing: Option<usize>,
    marriages: Vec<(String, usize)>,
    trump_exchanges: Vec<(String, usize)>,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Option<Self> {
        let find = |name: &str| headers.iter().position(|h| h == name);
        let per_bot = |suffix: &str| -> Vec<(String, usize)> {
            headers
                .iter()
                .enumerate()
                .filter_map(|(idx, h)| h.strip_suffix(suffix).map(|bot| (bot.to_string(), idx)))
                .collect()
        };

        Some(Self {
            winner: find(WINNER)?,
            seed: find(SEED),
            game_points: find(GAME_POINTS),
            closer: find(CLOSER),
            tricks_after_closing: find(TRICKS_AFTER_CLOSING),
            marriages: per_bot(MARRIAGES_SUFFIX),
            trump_exchanges: per_bot(TRUMP_EXCHANGES_SUFFIX),
        })
    }

    fn parse(&self, row: &csv::StringRecord) -> std::result::Result<MatchRecord, String> {
        let field = |idx: Option<usize>| idx.and_then(|i| row.get(i)).filter(|v| !is_blank(v));

        let winner = row.get(self.winner).unwrap_or_default();
        if winner.is_empty() {
            return Err(format!("empty '{}' field", WINNER));
        }

        let game_points = field(self.game_points)
            .map(|v| parse_number::<u8>(GAME_POINTS, v))
            .transpose()?;
        if let Some(points) = game_points {
            if !(1..=3).contains(&points) {
                return Err(format!("'{}' must be 1-3, got {}", GAME_POINTS, points));
            }
        }

        let counters = |columns: &[(String, usize)],
                        suffix: &str|
         -> std::result::Result<BTreeMap<String, u32>, String> {
            columns
                .iter()
                .map(|(bot, idx)| -> std::result::Result<(String, u32), String> {
                    let count = field(Some(*idx))
                        .map(|v| parse_number::<u32>(&format!("{}{}", bot, suffix), v))
                        .transpose()?
                        .unwrap_or(0);
                    Ok((bot.clone(), count))
                })
                .collect()
        };

        Ok(MatchRecord {
            seed: field(self.seed)
                .map(|v| parse_number::<u64>(SEED, v))
                .transpose()?,
            winner: winner.to_string(),
            game_points,
            closer: field(self.closer)
                .filter(|v| *v != "None")
                .map(str::to_string),
            tricks_after_closing: field(self.tricks_after_closing)
                .map(|v| parse_number::<u32>(TRICKS_AFTER_CLOSING, v))
                .transpose()?,
            marriages: counters(&self.marriages, MARRIAGES_SUFFIX)?,
            trump_exchanges: counters(&self.trump_exchanges, TRUMP_EXCHANGES_SUFFIX)?,
        })
    }
}

/// Empty cells and the runner's `N/A` placeholder carry no value
fn is_blank(value: &str) -> bool {
    value.is_empty() || value == "N/A"
}

fn parse_number<T: std::str::FromStr>(column: &str, value: &str) -> std::result::Result<T, String> {
    value
        .parse::<T>()
        .map_err(|_| format!("invalid '{}' value '{}'", column, value))
}
