/// Errors raised while collecting and storing the earnings calendar.
///
/// `Fetch` and `Parse` are scoped to a single date; whether they end the run is decided by
/// [`FailurePolicy`](crate::FailurePolicy). Storage errors are always fatal.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to fetch {url}, error({source})")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to parse calendar page for {date_key}, error({reason})")]
    Parse { date_key: String, reason: String },

    #[error("sqlite store error({0})")]
    Sqlite(#[from] sqlx::Error),

    #[error("postgres store error({0})")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// True for errors that only affect one date of the window.
    pub fn is_per_date(&self) -> bool {
        matches!(self, Error::Fetch { .. } | Error::Parse { .. })
    }

    /// True for failures raised by either storage backend.
    pub fn is_storage(&self) -> bool {
        matches!(self, Error::Sqlite(_) | Error::Postgres(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
