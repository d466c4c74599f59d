use anyhow::{Context, Result, bail};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::monitoring::types::ConnectivityState;

/// Record model - one connectivity transition
///
/// Records are immutable once created; the store only ever inserts them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// `true` for an up→down transition, `false` for down→up
    pub failure: bool,
    pub description: String,
}

impl Record {
    /// Create a new record with a fresh id
    pub fn new(timestamp: DateTime<Utc>, failure: bool, description: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4(), timestamp, failure, description: description.into() }
    }

    /// State the endpoint entered with this transition
    pub fn state(&self) -> ConnectivityState {
        ConnectivityState::from_failure(self.failure)
    }

    /// Encode a timestamp for the `ts` column.
    ///
    /// Fixed-width RFC 3339 in UTC, so text order is time order.
    pub fn timestamp_to_column(timestamp: DateTime<Utc>) -> String {
        timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
    }

    /// Decode the `ts` column
    pub fn column_to_timestamp(raw: &str) -> Result<DateTime<Utc>> {
        let parsed = DateTime::parse_from_rfc3339(raw)
            .with_context(|| format!("invalid record timestamp {raw:?}"))?;
        Ok(parsed.with_timezone(&Utc))
    }

    /// Encode the failure flag for the `failure` column
    pub fn failure_to_column(failure: bool) -> i64 {
        if failure { 1 } else { 0 }
    }

    /// Decode the `failure` column
    pub fn column_to_failure(raw: i64) -> Result<bool> {
        match raw {
            0 => Ok(false),
            1 => Ok(true),
            other => bail!("invalid failure flag {other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_new_records_get_unique_ids() {
        let now = Utc::now();
        let a = Record::new(now, true, "down");
        let b = Record::new(now, true, "down");
        assert_ne!(a.id, b.id);
        assert_eq!(a.state(), ConnectivityState::Failing);
    }

    #[test]
    fn test_timestamp_column_sorts_chronologically() {
        let early = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let later = early + chrono::Duration::microseconds(1500);

        let early_col = Record::timestamp_to_column(early);
        let later_col = Record::timestamp_to_column(later);

        assert_eq!(early_col, "2024-01-02T03:04:05.000000000Z");
        assert!(early_col < later_col);
        assert_eq!(Record::column_to_timestamp(&later_col).unwrap(), later);
    }

    #[test]
    fn test_column_decoding_rejects_garbage() {
        assert!(Record::column_to_timestamp("yesterday").is_err());
        assert!(Record::column_to_failure(2).is_err());
        assert!(Record::column_to_failure(1).unwrap());
        assert_eq!(Record::failure_to_column(false), 0);
    }
}
