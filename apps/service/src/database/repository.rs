use anyhow::{Context, Result};
use async_trait::async_trait;
use libsql::{Row, params};
use uuid::Uuid;

use super::models::Record;
use crate::pool::LibsqlPool;

/// Storage for connectivity transitions
///
/// The monitor loop is the only writer; HTTP handlers read concurrently.
/// Implementations must be safe for that mix.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a record. Fails if a record with the same id already exists.
    async fn create_record(&self, record: &Record) -> Result<()>;

    /// All records, oldest first
    async fn list_records(&self) -> Result<Vec<Record>>;

    /// The newest record with `failure = true`
    async fn most_recent_failure(&self) -> Result<Option<Record>>;

    /// The newest record of either kind
    async fn latest_record(&self) -> Result<Option<Record>>;
}

/// LibSQL database implementation
pub struct DatabaseImpl {
    pool: LibsqlPool,
}

const RECORD_COLUMNS: &str = "id, ts, failure, description";

impl DatabaseImpl {
    /// Create a new database instance from a pool
    pub fn new_from_pool(pool: LibsqlPool) -> Self {
        Self { pool }
    }

    /// Get a connection from the pool
    async fn get_conn(&self) -> Result<deadpool::managed::Object<crate::pool::LibsqlManager>> {
        Ok(self.pool.get().await?)
    }

    async fn query_one(&self, sql: &str) -> Result<Option<Record>> {
        let conn = self.get_conn().await?;
        let mut rows = conn.query(sql, ()).await?;

        match rows.next().await? {
            Some(row) => Ok(Some(record_from_row(&row)?)),
            None => Ok(None),
        }
    }
}

fn record_from_row(row: &Row) -> Result<Record> {
    let id: String = row.get(0)?;
    let ts: String = row.get(1)?;
    let failure: i64 = row.get(2)?;

    Ok(Record {
        id: Uuid::parse_str(&id).with_context(|| format!("invalid record id {id:?}"))?,
        timestamp: Record::column_to_timestamp(&ts)?,
        failure: Record::column_to_failure(failure)?,
        description: row.get(3)?,
    })
}

#[async_trait]
impl RecordStore for DatabaseImpl {
    async fn create_record(&self, record: &Record) -> Result<()> {
        let conn = self.get_conn().await?;

        conn.execute(
            "INSERT INTO records (id, ts, failure, description) VALUES (?, ?, ?, ?)",
            params![
                record.id.to_string(),
                Record::timestamp_to_column(record.timestamp),
                Record::failure_to_column(record.failure),
                record.description.clone()
            ],
        )
        .await
        .with_context(|| format!("failed to insert record {}", record.id))?;

        Ok(())
    }

    async fn list_records(&self) -> Result<Vec<Record>> {
        let conn = self.get_conn().await?;
        let mut rows = conn
            .query(&format!("SELECT {RECORD_COLUMNS} FROM records ORDER BY ts ASC, rowid ASC"), ())
            .await?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(record_from_row(&row)?);
        }

        Ok(records)
    }

    async fn most_recent_failure(&self) -> Result<Option<Record>> {
        self.query_one(&format!(
            "SELECT {RECORD_COLUMNS} FROM records WHERE failure = 1 ORDER BY ts DESC, rowid DESC LIMIT 1"
        ))
        .await
    }

    async fn latest_record(&self) -> Result<Option<Record>> {
        self.query_one(&format!(
            "SELECT {RECORD_COLUMNS} FROM records ORDER BY ts DESC, rowid DESC LIMIT 1"
        ))
        .await
    }
}
