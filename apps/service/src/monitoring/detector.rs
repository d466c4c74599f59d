//! Edge-triggered transition detection.
//!
//! The detector owns the in-memory connectivity state. Each probe outcome is
//! classified as healthy or failing; a [`Record`] is produced only when that
//! classification differs from the current state. Repeated outcomes on the
//! same side of the boundary, including different kinds of failure, produce
//! nothing.

use chrono::{DateTime, Utc};

use super::types::{ConnectivityState, Outcome};
use crate::database::Record;

#[derive(Debug, Default)]
pub struct TransitionDetector {
    state: ConnectivityState,
    last_timestamp: Option<DateTime<Utc>>,
}

impl TransitionDetector {
    /// Detector assuming the endpoint starts healthy
    pub fn new() -> Self {
        Self::default()
    }

    /// Detector starting from a known state, e.g. the newest stored record
    pub fn with_state(state: ConnectivityState) -> Self {
        Self { state, last_timestamp: None }
    }

    pub fn state(&self) -> ConnectivityState {
        self.state
    }

    /// Feed one outcome, stamped with the current time
    pub fn observe(&mut self, outcome: &Outcome) -> Option<Record> {
        self.observe_at(outcome, Utc::now())
    }

    /// Feed one outcome observed at `now`
    ///
    /// Returns the transition record when the state flips. Timestamps never
    /// go backwards, even if the wall clock does.
    pub fn observe_at(&mut self, outcome: &Outcome, now: DateTime<Utc>) -> Option<Record> {
        let next = outcome.state();
        if next == self.state {
            tracing::debug!(state = %self.state, outcome = %outcome, "No transition");
            return None;
        }

        let timestamp = match self.last_timestamp {
            Some(last) if last > now => last,
            _ => now,
        };

        self.state = next;
        self.last_timestamp = Some(timestamp);

        Some(Record::new(timestamp, next.is_failing(), outcome.message()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn run(outcomes: &[Outcome]) -> Vec<Record> {
        let mut detector = TransitionDetector::new();
        outcomes.iter().filter_map(|outcome| detector.observe(outcome)).collect()
    }

    fn failures(records: &[Record]) -> Vec<bool> {
        records.iter().map(|r| r.failure).collect()
    }

    #[test]
    fn test_starts_healthy() {
        assert_eq!(TransitionDetector::new().state(), ConnectivityState::Healthy);
        assert!(run(&[Outcome::success("ok"), Outcome::success("ok")]).is_empty());
    }

    #[test]
    fn test_first_failure_after_start_is_recorded() {
        let records = run(&[Outcome::success("ok"), Outcome::network_error("dns")]);
        assert_eq!(failures(&records), vec![true]);
        assert_eq!(records[0].description, "dns");
    }

    #[test]
    fn test_failure_then_recovery() {
        let records = run(&[Outcome::network_error("refused"), Outcome::success("ok")]);
        assert_eq!(failures(&records), vec![true, false]);
        assert_eq!(records[1].description, "ok");
    }

    #[test]
    fn test_failure_kinds_do_not_retrigger() {
        let records = run(&[
            Outcome::network_error("timeout"),
            Outcome::unexpected_status("500 Internal Server Error"),
            Outcome::network_error("reset"),
        ]);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].description, "timeout");
    }

    #[test]
    fn test_unexpected_status_behaves_like_network_error() {
        let as_network = run(&[Outcome::network_error("x"), Outcome::success("ok")]);
        let as_status = run(&[Outcome::unexpected_status("x"), Outcome::success("ok")]);
        assert_eq!(failures(&as_network), failures(&as_status));
    }

    #[test]
    fn test_records_equal_boundary_crossings() {
        let f = || Outcome::network_error("down");
        let s = || Outcome::success("up");
        let outcomes = vec![s(), f(), f(), s(), s(), s(), f(), s(), f(), f(), f(), s()];

        let mut expected = 0;
        let mut failing = false;
        for outcome in &outcomes {
            if outcome.is_failure() != failing {
                expected += 1;
                failing = outcome.is_failure();
            }
        }

        let records = run(&outcomes);
        assert_eq!(records.len(), expected);
        assert!(records.windows(2).all(|pair| pair[0].failure != pair[1].failure));
    }

    #[test]
    fn test_timestamps_never_decrease() {
        let start = Utc.with_ymd_and_hms(2024, 3, 10, 2, 0, 0).unwrap();
        let mut detector = TransitionDetector::new();

        let down = detector.observe_at(&Outcome::network_error("a"), start).unwrap();
        // Clock stepped back by a minute.
        let up = detector
            .observe_at(&Outcome::success("b"), start - Duration::minutes(1))
            .unwrap();
        let down_again = detector
            .observe_at(&Outcome::network_error("c"), start + Duration::seconds(2))
            .unwrap();

        assert_eq!(down.timestamp, start);
        assert_eq!(up.timestamp, start);
        assert_eq!(down_again.timestamp, start + Duration::seconds(2));
    }

    #[test]
    fn test_seeded_failing_state_suppresses_duplicate() {
        let mut detector = TransitionDetector::with_state(ConnectivityState::Failing);
        assert!(detector.observe(&Outcome::network_error("still down")).is_none());

        let record = detector.observe(&Outcome::success("back")).unwrap();
        assert!(!record.failure);
        assert_eq!(detector.state(), ConnectivityState::Healthy);
    }

    #[test]
    fn test_end_to_end_sequence() {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        let outcomes = [
            Outcome::success("ok"),
            Outcome::success("ok"),
            Outcome::network_error("timeout"),
            Outcome::network_error("timeout"),
            Outcome::success("ok"),
        ];

        let mut detector = TransitionDetector::new();
        let records: Vec<Record> = outcomes
            .iter()
            .enumerate()
            .filter_map(|(tick, outcome)| {
                detector.observe_at(outcome, start + Duration::seconds(tick as i64))
            })
            .collect();

        assert_eq!(records.len(), 2);
        assert!(records[0].failure);
        assert!(records[0].description.contains("timeout"));
        assert!(!records[1].failure);
        assert!(records[1].timestamp > records[0].timestamp);
        assert_ne!(records[0].id, records[1].id);
    }
}
