#![no_main]

use libfuzzer_sys::fuzz_target;
use schnapsen_stats::match_log::MatchLog;
use schnapsen_stats::profile::PlayProfile;

fuzz_target!(|data: &[u8]| {
    // Parsing must reject bad input with an error, never panic
    if let Ok(log) = MatchLog::from_reader(data, "fuzz.csv") {
        let subject = log
            .records()
            .first()
            .map(|r| r.winner.clone())
            .unwrap_or_default();
        let _ = log.outcomes_for(&subject);
        let _ = PlayProfile::from_log(&log, &subject).to_report_string();
    }
});
