//! Descriptive play profile for one bot in a match log
//!
//! Breaks a run down by game points, marriages, trump exchanges and talon
//! closing. Complements the significance tests with how a bot wins.

use crate::match_log::MatchLog;
use serde::Serialize;

/// Per-subject breakdown of a match log
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(into = "ProfileSummary")]
pub struct PlayProfile {
    pub subject: String,
    pub total_games: u64,
    pub wins: u64,
    pub losses: u64,
    /// Wins by game points, indexed `[1, 2, 3]` -> `[0, 1, 2]`
    pub wins_by_points: [u64; 3],
    pub total_marriages: u64,
    pub wins_with_marriage: u64,
    pub total_trump_exchanges: u64,
    pub wins_with_trump_exchange: u64,
    pub times_closed: u64,
    pub wins_after_closing: u64,
    /// Sum and count of numeric "tricks won after closing" values
    tricks_after_closing_sum: u64,
    tricks_after_closing_count: u64,
}

impl PlayProfile {
    /// Fold a log into the profile of `subject`
    pub fn from_log(log: &MatchLog, subject: &str) -> Self {
        let initial = Self {
            subject: subject.to_string(),
            ..Self::default()
        };

        log.records().iter().fold(initial, |mut profile, record| {
            let won = record.winner == subject;
            let marriages = record.marriages.get(subject).copied().unwrap_or(0);
            let exchanges = record.trump_exchanges.get(subject).copied().unwrap_or(0);

            profile.total_games += 1;
            profile.total_marriages += u64::from(marriages);
            profile.total_trump_exchanges += u64::from(exchanges);

            if won {
                profile.wins += 1;
                if let Some(points @ 1..=3) = record.game_points {
                    profile.wins_by_points[usize::from(points - 1)] += 1;
                }
                if marriages > 0 {
                    profile.wins_with_marriage += 1;
                }
                if exchanges > 0 {
                    profile.wins_with_trump_exchange += 1;
                }
            } else {
                profile.losses += 1;
            }

            if record.closer.as_deref() == Some(subject) {
                profile.times_closed += 1;
                if won {
                    profile.wins_after_closing += 1;
                }
                if let Some(tricks) = record.tricks_after_closing {
                    profile.tricks_after_closing_sum += u64::from(tricks);
                    profile.tricks_after_closing_count += 1;
                }
            }

            profile
        })
    }

    pub fn win_rate(&self) -> Option<f64> {
        ratio(self.wins, self.total_games)
    }

    /// Wins scoring `points` game points
    pub fn wins_with_points(&self, points: u8) -> u64 {
        match points {
            1..=3 => self.wins_by_points[usize::from(points - 1)],
            _ => 0,
        }
    }

    /// Share of wins scoring `points` game points; `0.0` without wins
    pub fn points_share(&self, points: u8) -> f64 {
        ratio(self.wins_with_points(points), self.wins).unwrap_or(0.0)
    }

    pub fn marriages_per_game(&self) -> Option<f64> {
        ratio(self.total_marriages, self.total_games)
    }

    pub fn trump_exchanges_per_game(&self) -> Option<f64> {
        ratio(self.total_trump_exchanges, self.total_games)
    }

    pub fn times_not_closed(&self) -> u64 {
        self.total_games - self.times_closed
    }

    pub fn closing_frequency(&self) -> Option<f64> {
        ratio(self.times_closed, self.total_games)
    }

    /// `None` if the subject never closed the talon
    pub fn win_rate_when_closing(&self) -> Option<f64> {
        ratio(self.wins_after_closing, self.times_closed)
    }

    /// `None` if the subject closed in every game
    pub fn win_rate_when_not_closing(&self) -> Option<f64> {
        ratio(
            self.wins - self.wins_after_closing,
            self.times_not_closed(),
        )
    }

    /// Mean tricks won after closing, over games that logged a value
    pub fn avg_tricks_after_closing(&self) -> Option<f64> {
        ratio(self.tricks_after_closing_sum, self.tricks_after_closing_count)
    }

    /// Multi-line text block for reports
    pub fn to_report_string(&self) -> String {
        let mut report = String::new();
        let pct = |v: Option<f64>| match v {
            Some(v) => format!("{:.2}%", v * 100.0),
            None => "N/A".to_string(),
        };
        let rate = |v: Option<f64>| v.map_or_else(|| "N/A".to_string(), |v| format!("{:.2}", v));

        report.push_str(&format!("  Play profile for {}:\n", self.subject));
        report.push_str("    Game points (in wins):\n");
        for points in [3u8, 2, 1] {
            report.push_str(&format!(
                "      {} points: {} ({:.1}%)\n",
                points,
                self.wins_with_points(points),
                self.points_share(points) * 100.0
            ));
        }

        report.push_str(&format!(
            "    Marriages:        {} ({} per game), {} wins with marriage\n",
            self.total_marriages,
            rate(self.marriages_per_game()),
            self.wins_with_marriage
        ));
        report.push_str(&format!(
            "    Trump exchanges:  {} ({} per game), {} wins with exchange\n",
            self.total_trump_exchanges,
            rate(self.trump_exchanges_per_game()),
            self.wins_with_trump_exchange
        ));

        report.push_str(&format!(
            "    Talon closed:     {} of {} games ({})\n",
            self.times_closed,
            self.total_games,
            pct(self.closing_frequency())
        ));
        report.push_str(&format!(
            "    Won after close:  {} (win rate when closing {})\n",
            self.wins_after_closing,
            pct(self.win_rate_when_closing())
        ));
        report.push_str(&format!(
            "    Avg tricks after close: {}\n",
            rate(self.avg_tricks_after_closing())
        ));
        report.push_str(&format!(
            "    Win rate not closing:   {}\n",
            pct(self.win_rate_when_not_closing())
        ));

        report
    }
}

/// JSON form of [`PlayProfile`]: raw counts plus the rates the text report shows
#[derive(Serialize)]
struct ProfileSummary {
    subject: String,
    total_games: u64,
    wins: u64,
    losses: u64,
    win_rate: Option<f64>,
    wins_by_points: [u64; 3],
    total_marriages: u64,
    marriages_per_game: Option<f64>,
    wins_with_marriage: u64,
    total_trump_exchanges: u64,
    trump_exchanges_per_game: Option<f64>,
    wins_with_trump_exchange: u64,
    times_closed: u64,
    times_not_closed: u64,
    closing_frequency: Option<f64>,
    wins_after_closing: u64,
    win_rate_when_closing: Option<f64>,
    win_rate_when_not_closing: Option<f64>,
    avg_tricks_after_closing: Option<f64>,
}

impl From<PlayProfile> for ProfileSummary {
    fn from(p: PlayProfile) -> Self {
        Self {
            win_rate: p.win_rate(),
            marriages_per_game: p.marriages_per_game(),
            trump_exchanges_per_game: p.trump_exchanges_per_game(),
            times_not_closed: p.times_not_closed(),
            closing_frequency: p.closing_frequency(),
            win_rate_when_closing: p.win_rate_when_closing(),
            win_rate_when_not_closing: p.win_rate_when_not_closing(),
            avg_tricks_after_closing: p.avg_tricks_after_closing(),
            subject: p.subject,
            total_games: p.total_games,
            wins: p.wins,
            losses: p.losses,
            wins_by_points: p.wins_by_points,
            total_marriages: p.total_marriages,
            wins_with_marriage: p.wins_with_marriage,
            total_trump_exchanges: p.total_trump_exchanges,
            wins_with_trump_exchange: p.wins_with_trump_exchange,
            times_closed: p.times_closed,
            wins_after_closing: p.wins_after_closing,
        }
    }
}

fn ratio(numerator: u64, denominator: u64) -> Option<f64> {
    (denominator > 0).then(|| numerator as f64 / denominator as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = "\
Seed,Winner,Game points,Closer,CockyBot marriages,CockyBot trump exchanges,Tricks won after closing
0,CockyBot,3,CockyBot,1,0,4
1,RandBot,2,None,0,1,N/A
2,CockyBot,1,RandBot,0,1,N/A
3,CockyBot,2,CockyBot,2,0,N/A
4,RandBot,3,CockyBot,0,0,1
";

    fn profile() -> PlayProfile {
        let log = MatchLog::from_reader(LOG.as_bytes(), "cocky.csv").unwrap();
        PlayProfile::from_log(&log, "CockyBot")
    }

    #[test]
    fn test_win_counts() {
        let p = profile();
        assert_eq!(p.total_games, 5);
        assert_eq!(p.wins, 3);
        assert_eq!(p.losses, 2);
        assert_eq!(p.win_rate(), Some(0.6));
    }

    #[test]
    fn test_points_distribution() {
        let p = profile();
        assert_eq!(p.wins_with_points(3), 1);
        assert_eq!(p.wins_with_points(2), 1);
        assert_eq!(p.wins_with_points(1), 1);
        assert_eq!(p.wins_with_points(4), 0);
        assert!((p.points_share(3) - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_strategic_moves() {
        let p = profile();
        assert_eq!(p.total_marriages, 3);
        assert_eq!(p.wins_with_marriage, 2);
        assert_eq!(p.total_trump_exchanges, 2);
        assert_eq!(p.wins_with_trump_exchange, 1);
        assert_eq!(p.marriages_per_game(), Some(0.6));
    }

    #[test]
    fn test_closing_statistics() {
        let p = profile();
        assert_eq!(p.times_closed, 3);
        assert_eq!(p.times_not_closed(), 2);
        assert_eq!(p.wins_after_closing, 2);
        assert!((p.win_rate_when_closing().unwrap() - 2.0 / 3.0).abs() < 1e-12);
        // N/A rows are skipped: (4 + 1) / 2
        assert_eq!(p.avg_tricks_after_closing(), Some(2.5));
        assert_eq!(p.win_rate_when_not_closing(), Some(0.5));
    }

    #[test]
    fn test_never_closed_reports_na() {
        let log = MatchLog::from_reader("Winner\nA\nB\n".as_bytes(), "min.csv").unwrap();
        let p = PlayProfile::from_log(&log, "A");
        assert_eq!(p.win_rate_when_closing(), None);
        assert_eq!(p.avg_tricks_after_closing(), None);
        assert_eq!(p.points_share(3), 0.0);
        assert!(p.to_report_string().contains("N/A"));
    }

    #[test]
    fn test_json_carries_derived_rates() {
        let value = serde_json::to_value(profile()).unwrap();
        assert_eq!(value["subject"], "CockyBot");
        assert_eq!(value["times_closed"], 3);
        assert_eq!(value["closing_frequency"], 0.6);
        assert_eq!(value["avg_tricks_after_closing"], 2.5);
        assert_eq!(value["win_rate_when_not_closing"], 0.5);
        assert!(value.get("tricks_after_closing_sum").is_none());
        assert!(value.get("tricks_after_closing_count").is_none());

        let never_closed = MatchLog::from_reader("Winner\nA\n".as_bytes(), "min.csv").unwrap();
        let value = serde_json::to_value(PlayProfile::from_log(&never_closed, "A")).unwrap();
        assert!(value["win_rate_when_closing"].is_null());
    }

    #[test]
    fn test_report_lists_points_high_to_low() {
        let report = profile().to_report_string();
        let three = report.find("3 points").unwrap();
        let one = report.find("1 points").unwrap();
        assert!(three < one);
        assert!(report.contains("Talon closed:     3 of 5 games (60.00%)"));
    }
}
