use super::sql::{self, Placeholder};
use super::PersistenceSink;
use crate::{EarningRow, Error, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{Connection, Sqlite};
use std::str::FromStr;
use tracing::{error, trace};

/// SQLite store, addressed by a `sqlite:` URL or a plain file path.
///
/// The database file is created when missing.
#[derive(Clone, Debug)]
pub struct SqliteSink {
    options: SqliteConnectOptions,
}

impl SqliteSink {
    pub fn new(location: &str) -> Result<Self> {
        let options = if location.starts_with("sqlite:") {
            SqliteConnectOptions::from_str(location).map_err(|err| {
                error!("invalid sqlite url {location}, error({err})");
                Error::Config(format!("sqlite url {location}: {err}"))
            })?
        } else {
            SqliteConnectOptions::new().filename(location)
        };

        Ok(Self {
            options: options.create_if_missing(true),
        })
    }

    async fn write(conn: &mut SqliteConnection, rows: &[EarningRow]) -> Result<u64> {
        sqlx::query::<Sqlite>(sql::CREATE_EARNING_DATES_SQLITE)
            .execute(&mut *conn)
            .await?;

        let mut tx = conn.begin().await?;
        let mut inserted = 0;
        for chunk in rows.chunks(sql::ROWS_PER_INSERT) {
            let stmt = sql::insert_earning_dates(chunk.len(), Placeholder::Sqlite);
            let mut query = sqlx::query::<Sqlite>(&stmt);
            for row in chunk {
                query = query.bind(&row.ticker_symbol).bind(row.epoch_millis);
            }
            inserted += query.execute(&mut *tx).await?.rows_affected();
            trace!("{} rows staged for EarningDates", chunk.len());
        }
        tx.commit().await?;

        Ok(inserted)
    }
}

#[async_trait]
impl PersistenceSink for SqliteSink {
    async fn insert(&self, rows: &[EarningRow]) -> Result<u64> {
        trace!("connecting to sqlite store {:?} ...", self.options.get_filename());
        let mut conn = SqliteConnection::connect_with(&self.options)
            .await
            .map_err(|err| {
                error!("sqlite connection error: {err}");
                err
            })?;

        let result = Self::write(&mut conn, rows).await;
        let closed = conn.close().await;

        let inserted = result.map_err(|err| {
            error!("failed to insert into EarningDates, error({err})");
            err
        })?;
        closed?;
        Ok(inserted)
    }
}
