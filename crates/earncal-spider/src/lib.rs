mod error;
mod tui;

pub mod config;

/// Date window, page retrieval and row extraction for the earnings calendar published at
/// [biz.yahoo.com/research/earncal](https://biz.yahoo.com/research/earncal/).
pub mod calendar;

/// Persistence of collected earnings dates; SQLite (via [`sqlx`]) or PostgreSQL (via
/// [`tokio_postgres`]).
///
/// [`sqlx`]: https://docs.rs/sqlx/latest/sqlx/
/// [`tokio_postgres`]: https://docs.rs/tokio-postgres/latest/tokio_postgres/
pub mod store;

pub use calendar::{CalendarBatch, DateSpec, EarningRow, RawPage};
pub use config::{FailurePolicy, SpiderConfig};
pub use error::{Error, Result};

/// Shortcut for required API elements.
pub mod http {
    pub use reqwest::Client as HttpClient;
    pub use tokio_postgres::Client as PgClient;
}

/// Build the reqwest client shared by every page request.
pub(crate) fn std_client_build(config: &SpiderConfig) -> Result<http::HttpClient> {
    reqwest::ClientBuilder::new()
        .user_agent(&config.user_agent)
        .timeout(config.timeout)
        .build()
        .map_err(|err| {
            tracing::error!("failed to build reqwest client, error({err})");
            Error::Config(format!("http client: {err}"))
        })
}

/// Format the time elapsed since `time` for debug logs.
pub(crate) fn time_elapsed(time: std::time::Instant) -> String {
    format!("time elapsed: {:?}", time.elapsed())
}
