mod postgres;
mod sql;
mod sqlite;

pub use postgres::PgSink;
pub use sqlite::SqliteSink;

use crate::{CalendarBatch, EarningRow, Result};
use async_trait::async_trait;
use tracing::{debug, warn};

/// Result of handing a batch to a [`PersistenceSink`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StoreOutcome {
    /// The batch was empty; the store was never touched.
    Nothing,

    /// Number of rows appended to `EarningDates`.
    Inserted(u64),
}

/// Appends collected rows to the `EarningDates` table.
///
/// Only the ticker and the timestamp are persisted; the company name stays in memory.
#[async_trait]
pub trait PersistenceSink: Send + Sync {
    /// Persist `batch`; an empty batch opens no connection.
    async fn store(&self, batch: CalendarBatch) -> Result<StoreOutcome> {
        if batch.is_empty() {
            warn!("no earnings rows collected; nothing to persist");
            return Ok(StoreOutcome::Nothing);
        }

        let time = std::time::Instant::now();
        let inserted = self.insert(&batch).await?;
        debug!(
            "{inserted} rows inserted into EarningDates. {}",
            crate::time_elapsed(time)
        );
        Ok(StoreOutcome::Inserted(inserted))
    }

    /// Open a connection, insert `rows` in one transaction, and close the connection whatever
    /// the outcome.
    async fn insert(&self, rows: &[EarningRow]) -> Result<u64>;
}

/// Pick the backend for a store location: `postgres://` and `postgresql://` URLs go to
/// PostgreSQL, anything else is a SQLite URL or file path.
pub fn open(location: &str) -> Result<Box<dyn PersistenceSink>> {
    if location.starts_with("postgres://") || location.starts_with("postgresql://") {
        Ok(Box::new(PgSink::new(location)))
    } else {
        Ok(Box::new(SqliteSink::new(location)?))
    }
}
