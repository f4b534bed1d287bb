use super::{CalendarBatch, DateSpec, EarningRow, PageFetcher, RowExtractor};
use crate::tui::DateProgress;
use crate::{FailurePolicy, Result, SpiderConfig};
use std::collections::HashSet;
use tracing::{debug, error, info, trace};

/// Outcome of one pass over the date window.
#[derive(Clone, Debug, Default)]
pub struct Collection {
    pub batch: CalendarBatch,
    /// Date keys that contributed no rows because their page failed.
    pub skipped: Vec<String>,
}

/// Walks the date window one day at a time: fetch, extract, append.
pub struct Aggregator<F> {
    fetcher: F,
    extractor: RowExtractor,
    policy: FailurePolicy,
    dedup: bool,
    tui: bool,
}

impl<F: PageFetcher> Aggregator<F> {
    pub fn new(fetcher: F, config: &SpiderConfig) -> Self {
        Self {
            fetcher,
            extractor: RowExtractor::new(config.quote_prefix.clone()),
            policy: config.policy,
            dedup: config.dedup,
            tui: config.tui,
        }
    }

    /// Collect the rows of every date, in date order then page order.
    ///
    /// Under [`FailurePolicy::Skip`] a date whose page cannot be fetched or parsed contributes
    /// no rows; under [`FailurePolicy::Abort`] its error ends the run.
    pub async fn run(&self, dates: &[DateSpec]) -> Result<CalendarBatch> {
        self.collect_window(dates)
            .await
            .map(|collection| collection.batch)
    }

    /// [`Aggregator::run`], also reporting the date keys that were skipped.
    pub async fn collect_window(&self, dates: &[DateSpec]) -> Result<Collection> {
        let time = std::time::Instant::now();
        let progress = DateProgress::new(dates.len(), self.tui);

        let mut batch = CalendarBatch::new();
        let mut skipped = Vec::new();
        for date in dates {
            progress.println(self.fetcher.location(&date.date_key));
            match self.collect(date).await {
                Ok(rows) => {
                    trace!("{} rows collected for {}", rows.len(), date.date_key);
                    batch.extend(rows);
                    progress.succeeded();
                }
                Err(err) if self.policy == FailurePolicy::Skip && err.is_per_date() => {
                    error!("skipping {}, error({err})", date.date_key);
                    progress.println(format!("skipping {}: {err}", date.date_key));
                    progress.failed();
                    skipped.push(date.date_key.clone());
                }
                Err(err) => {
                    progress.abandon();
                    return Err(err);
                }
            }
        }
        progress.finish();

        if self.dedup {
            let before = batch.len();
            batch = dedup(batch);
            debug!("dedup removed {} rows", before - batch.len());
        }

        info!(
            "{} earnings rows collected over {} dates ({} skipped). {}",
            batch.len(),
            dates.len(),
            skipped.len(),
            crate::time_elapsed(time)
        );
        Ok(Collection { batch, skipped })
    }

    async fn collect(&self, date: &DateSpec) -> Result<Vec<EarningRow>> {
        let page = self.fetcher.fetch(&date.date_key).await?;
        self.extractor.extract(&page, date.epoch_millis)
    }
}

/// Drop repeated `(ticker, date)` pairs, keeping the first occurrence.
pub fn dedup(batch: CalendarBatch) -> CalendarBatch {
    let mut seen = HashSet::new();
    batch
        .into_iter()
        .filter(|row| seen.insert((row.ticker_symbol.clone(), row.epoch_millis)))
        .collect()
}

//////////////////////////////////////////////////////////////
// -- TESTS --
//////////////////////////////////////////////////////////////

#[cfg(test)]
fn row(ticker: &str, epoch_millis: i64) -> EarningRow {
    EarningRow {
        company_name: format!("{ticker} Inc"),
        ticker_symbol: ticker.to_string(),
        epoch_millis,
    }
}

#[test]
fn dedup_keeps_first_occurrence() {
    let batch = vec![row("INN", 1), row("OUT", 1), row("INN", 1), row("INN", 2)];
    let kept: Vec<(String, i64)> = dedup(batch)
        .into_iter()
        .map(|r| (r.ticker_symbol, r.epoch_millis))
        .collect();
    assert_eq!(
        kept,
        [
            ("INN".to_string(), 1),
            ("OUT".to_string(), 1),
            ("INN".to_string(), 2)
        ]
    );
}
