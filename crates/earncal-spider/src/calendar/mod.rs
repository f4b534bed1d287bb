mod aggregate;
mod dates;
mod extract;
mod fetch;

pub use aggregate::{dedup, Aggregator, Collection};
pub use dates::{date_strings, date_strings_from, MILLIS_PER_DAY};
pub use extract::RowExtractor;
pub use fetch::{HttpFetcher, PageFetcher};

/// One calendar day of the window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DateSpec {
    /// `YYYYMMDD`
    pub date_key: String,
    pub epoch_millis: i64,
}

/// Raw markup of one calendar page, as returned by a [`PageFetcher`].
#[derive(Clone, Debug)]
pub struct RawPage {
    pub date_key: String,
    pub body: Vec<u8>,
}

impl RawPage {
    pub fn new(date_key: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            date_key: date_key.into(),
            body: body.into(),
        }
    }
}

/// A company expected to report earnings on a given day.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EarningRow {
    pub company_name: String,
    pub ticker_symbol: String,
    pub epoch_millis: i64,
}

/// Every row collected in one run, in date order then page order.
pub type CalendarBatch = Vec<EarningRow>;
