//! Connection pool and migrations.

use exn::ResultExt;
use sqlx::SqliteConnection;
use sqlx::pool::PoolConnectionMetadata;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::instrument;

use crate::error::{ErrorKind, Result};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
// Reads (status queries, listing series for a batch) can overlap with the
// single writer in WAL mode.
const MAX_CONNECTIONS: u32 = 4;

/// Handle to the library database.
///
/// Cloning is cheap; every clone shares the same pool and the same write
/// lock, so at most one write transaction is open per process at a time.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    writer: Arc<Mutex<()>>,
}

impl Database {
    async fn new(options: SqliteConnectOptions, pool: SqlitePoolOptions) -> Result<Self> {
        let pool = pool
            // Query-based PRAGMAs must run on every pooled connection, not
            // just the first one handed out.
            .after_connect(|conn, meta| Box::pin(async move { Self::apply_pragmas(conn, meta).await }))
            .connect_with(options)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let db = Self { pool, writer: Arc::new(Mutex::new(())) };
        db.migrate().await?;
        Ok(db)
    }

    /// Open (or create) the database file at `path` and run migrations.
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let options = Self::base_options().filename(path.as_ref()).create_if_missing(true);
        Self::new(options, SqlitePoolOptions::new().max_connections(MAX_CONNECTIONS)).await
    }

    /// Connect to a fresh in-memory database.
    ///
    /// Not gated behind `#[cfg(test)]` so downstream crates can use it in
    /// their own tests.
    pub async fn connect_in_memory() -> Result<Self> {
        let options = Self::base_options().filename(":memory:");
        // Every connection to ":memory:" is its own database, and closing the
        // last one discards it.
        let pool = SqlitePoolOptions::new().max_connections(1).min_connections(1).idle_timeout(None).max_lifetime(None);
        Self::new(options, pool).await
    }

    fn base_options() -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .journal_mode(SqliteJournalMode::Wal)
            // Cascades from series to books, chapters and releases rely on this.
            .foreign_keys(true)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_millis(1500))
    }

    async fn apply_pragmas(conn: &mut SqliteConnection, _meta: PoolConnectionMetadata) -> sqlx::Result<()> {
        sqlx::query(
            r#"
                PRAGMA wal_autocheckpoint = 800;
                PRAGMA cache_size = -8192;
                PRAGMA temp_store = MEMORY;
            "#,
        )
        .execute(conn)
        .await?;
        Ok(())
    }

    #[instrument("performing database migrations", skip(self))]
    async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await.or_raise(|| ErrorKind::Migration)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub(crate) fn writer(&self) -> Arc<Mutex<()>> {
        Arc::clone(&self.writer)
    }

    /// Close the pool once every connection has been returned to it.
    pub async fn close(&self) {
        _ = sqlx::query("PRAGMA optimize").execute(&self.pool).await;
        self.pool.close().await;
    }
}
