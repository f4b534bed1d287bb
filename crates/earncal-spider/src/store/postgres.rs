use super::sql::{self, Placeholder};
use super::PersistenceSink;
use crate::http::PgClient;
use crate::{EarningRow, Result};
use async_trait::async_trait;
use tokio_postgres::types::ToSql;
use tokio_postgres::{self as pg, NoTls};
use tracing::{debug, error, trace};

/// PostgreSQL store, addressed by a `postgres://` connection string.
#[derive(Clone, Debug)]
pub struct PgSink {
    url: String,
}

impl PgSink {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    async fn write(pg_client: &mut PgClient, rows: &[EarningRow]) -> Result<u64> {
        pg_client
            .batch_execute(sql::CREATE_EARNING_DATES_PG)
            .await?;

        let transaction = pg_client.transaction().await?;
        let mut inserted = 0;
        for chunk in rows.chunks(sql::ROWS_PER_INSERT) {
            let stmt = sql::insert_earning_dates(chunk.len(), Placeholder::Postgres);
            let params: Vec<&(dyn ToSql + Sync)> = chunk
                .iter()
                .flat_map(|row| {
                    [
                        &row.ticker_symbol as &(dyn ToSql + Sync),
                        &row.epoch_millis as &(dyn ToSql + Sync),
                    ]
                })
                .collect();
            inserted += transaction.execute(stmt.as_str(), &params).await?;
            trace!("{} rows staged for EarningDates", chunk.len());
        }

        // unpack the transaction and commit it to the database
        transaction.commit().await.map_err(|err| {
            error!("failed to commit transaction for EarningDates, error({err})");
            err
        })?;

        Ok(inserted)
    }
}

#[async_trait]
impl PersistenceSink for PgSink {
    async fn insert(&self, rows: &[EarningRow]) -> Result<u64> {
        trace!("connecting to postgres store ...");
        let (mut pg_client, pg_conn) = pg::connect(&self.url, NoTls).await.map_err(|err| {
            error!("postgres connection error: {}", err);
            err
        })?;

        let conn_task = tokio::spawn(async move {
            if let Err(err) = pg_conn.await {
                error!("postgres connection error: {}", err);
            }
        });
        debug!("postgres connection established");

        let result = Self::write(&mut pg_client, rows).await;

        // dropping the client closes the connection, which ends the task
        drop(pg_client);
        conn_task.await.ok();

        result.map_err(|err| {
            error!("failed to insert into EarningDates, error({err})");
            err
        })
    }
}
