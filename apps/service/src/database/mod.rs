/// Database layer
///
/// Persists connectivity transitions in a local LibSQL (SQLite) file.
/// Everything outside this module talks to it through [`RecordStore`].

pub mod migrations;
pub mod models;
pub mod repository;

pub use models::Record;
pub use repository::{DatabaseImpl, RecordStore};

use anyhow::{Context, Result};

use crate::pool::{LibsqlManager, LibsqlPool};

/// Upper bound on pooled connections; one writer plus HTTP readers.
const MAX_CONNECTIONS: usize = 8;

/// Initialize database with schema
pub async fn initialize_database(conn: &libsql::Connection) -> Result<()> {
    // WAL lets HTTP readers proceed while the monitor writes.
    conn.query("PRAGMA journal_mode = WAL", ()).await?.next().await?;
    migrations::run_migrations(conn).await
}

/// Open (or create) the database file, migrate it and wrap it in a pool
pub async fn connect(path: &str) -> Result<DatabaseImpl> {
    let database = libsql::Builder::new_local(path)
        .build()
        .await
        .with_context(|| format!("failed to open database {path}"))?;

    let pool: LibsqlPool = deadpool::managed::Pool::builder(LibsqlManager::new(database))
        .max_size(MAX_CONNECTIONS)
        .build()
        .context("failed to build connection pool")?;

    {
        let conn = pool.get().await.context("failed to acquire database connection")?;
        initialize_database(&conn).await.context("failed to migrate database")?;
    }

    tracing::info!(path, "Database ready");
    Ok(DatabaseImpl::new_from_pool(pool))
}
