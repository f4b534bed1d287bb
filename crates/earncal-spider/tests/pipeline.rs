use async_trait::async_trait;
use chrono::NaiveDate;
use earncal_spider::calendar::{date_strings_from, Aggregator, PageFetcher, MILLIS_PER_DAY};
use earncal_spider::store::{PersistenceSink, SqliteSink, StoreOutcome};
use earncal_spider::{Error, FailurePolicy, RawPage, Result, SpiderConfig};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Serves canned pages keyed by date; unknown dates fail like a 404 would.
struct FakeFetcher {
    pages: HashMap<String, String>,
    requested: Arc<Mutex<Vec<String>>>,
}

impl FakeFetcher {
    fn new(pages: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            pages: pages.into_iter().collect(),
            requested: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch(&self, date_key: &str) -> Result<RawPage> {
        self.requested.lock().unwrap().push(date_key.to_string());
        match self.pages.get(date_key) {
            Some(html) => Ok(RawPage::new(date_key, html.clone())),
            None => Err(Error::Parse {
                date_key: date_key.to_string(),
                reason: "no page served".to_string(),
            }),
        }
    }
}

fn page(rows: &[(&str, &str)]) -> String {
    let mut html = String::from("<html><body><table>");
    html.push_str("<tr><td>Company</td><td>Symbol</td><td>Time</td></tr>");
    for (name, ticker) in rows {
        html.push_str(&format!(
            "<tr><td>{name}</td><td><a href=\"http://finance.yahoo.com/q?s={ticker}\">{ticker}</a></td><td>Before Market Open</td></tr>"
        ));
    }
    html.push_str("</table></body></html>");
    html
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
}

#[tokio::test]
async fn two_day_window_yields_rows_in_date_order() {
    let dates = date_strings_from(today(), 0, 2);
    let fetcher = FakeFetcher::new([
        ("20240102".to_string(), page(&[("Acme Corp", "ACME")])),
        ("20240103".to_string(), page(&[("Globex", "GBX")])),
    ]);

    let batch = Aggregator::new(fetcher, &SpiderConfig::default())
        .run(&dates)
        .await
        .unwrap();

    assert_eq!(batch.len(), 2);
    assert_eq!(batch[0].ticker_symbol, "ACME");
    assert_eq!(batch[1].ticker_symbol, "GBX");
    assert_eq!(batch[0].epoch_millis, dates[0].epoch_millis);
    assert_eq!(batch[1].epoch_millis, dates[1].epoch_millis);
    assert_eq!(batch[1].epoch_millis - batch[0].epoch_millis, MILLIS_PER_DAY);
}

#[tokio::test]
async fn rows_keep_page_order_within_a_date() {
    let dates = date_strings_from(today(), 0, 1);
    let fetcher = FakeFetcher::new([(
        "20240102".to_string(),
        page(&[("Acme Corp", "ACME"), ("Globex", "GBX"), ("Initech", "INTC")]),
    )]);

    let batch = Aggregator::new(fetcher, &SpiderConfig::default())
        .run(&dates)
        .await
        .unwrap();

    let tickers: Vec<&str> = batch.iter().map(|r| r.ticker_symbol.as_str()).collect();
    assert_eq!(tickers, ["ACME", "GBX", "INTC"]);
}

#[tokio::test]
async fn skip_policy_drops_failed_date_and_continues() {
    let dates = date_strings_from(today(), 0, 3);
    let fetcher = FakeFetcher::new([
        ("20240102".to_string(), page(&[("Acme Corp", "ACME")])),
        ("20240104".to_string(), page(&[("Globex", "GBX")])),
    ]);

    let aggregator = Aggregator::new(fetcher, &SpiderConfig::default());
    let batch = aggregator.run(&dates).await.unwrap();

    let tickers: Vec<&str> = batch.iter().map(|r| r.ticker_symbol.as_str()).collect();
    assert_eq!(tickers, ["ACME", "GBX"]);
}

#[tokio::test]
async fn skipped_dates_are_reported() {
    let dates = date_strings_from(today(), 0, 3);
    let fetcher = FakeFetcher::new([
        ("20240102".to_string(), page(&[("Acme Corp", "ACME")])),
        ("20240104".to_string(), page(&[("Globex", "GBX")])),
    ]);

    let collection = Aggregator::new(fetcher, &SpiderConfig::default())
        .collect_window(&dates)
        .await
        .unwrap();

    assert_eq!(collection.batch.len(), 2);
    assert_eq!(collection.skipped, ["20240103"]);
}

#[tokio::test]
async fn skipped_dates_are_reported_in_terminal_mode() {
    let dates = date_strings_from(today(), 0, 2);
    let fetcher = FakeFetcher::new([("20240103".to_string(), page(&[("Globex", "GBX")]))]);
    let config = SpiderConfig {
        tui: true,
        ..SpiderConfig::default()
    };

    let collection = Aggregator::new(fetcher, &config)
        .collect_window(&dates)
        .await
        .unwrap();

    assert_eq!(collection.skipped, ["20240102"]);
    assert_eq!(collection.batch[0].ticker_symbol, "GBX");
}

#[test]
fn fetcher_location_defaults_to_date_key() {
    let fetcher = FakeFetcher::new(std::iter::empty());
    assert_eq!(fetcher.location("20240102"), "20240102");
}

#[tokio::test]
async fn abort_policy_stops_at_failed_date() {
    let dates = date_strings_from(today(), 0, 3);
    let fetcher = FakeFetcher::new([
        ("20240102".to_string(), page(&[("Acme Corp", "ACME")])),
        ("20240104".to_string(), page(&[("Globex", "GBX")])),
    ]);
    let config = SpiderConfig {
        policy: FailurePolicy::Abort,
        ..SpiderConfig::default()
    };

    let aggregator = Aggregator::new(fetcher, &config);
    let err = aggregator.run(&dates).await.unwrap_err();

    assert!(matches!(err, Error::Parse { ref date_key, .. } if date_key == "20240103"));
}

#[tokio::test]
async fn dates_are_fetched_sequentially_in_window_order() {
    let dates = date_strings_from(today(), -1, 2);
    let fetcher = FakeFetcher::new(
        dates
            .iter()
            .map(|d| (d.date_key.clone(), page(&[]))),
    );
    let requested = fetcher.requested.clone();
    let aggregator = Aggregator::new(fetcher, &SpiderConfig::default());

    let batch = aggregator.run(&dates).await.unwrap();
    assert!(batch.is_empty());
    assert_eq!(
        *requested.lock().unwrap(),
        ["20240101", "20240102", "20240103"]
    );
}

#[tokio::test]
async fn dedup_option_collapses_nested_duplicates() {
    let nested = "<table><tr>\
        <td>Outer Inc</td>\
        <td><a href=\"http://finance.yahoo.com/q?s=OUT\">OUT</a></td>\
        <td><table><tr>\
          <td>Inner Co</td>\
          <td><a href=\"http://finance.yahoo.com/q?s=INN\">INN</a></td>\
        </tr></table></td>\
        </tr></table>";
    let dates = date_strings_from(today(), 0, 1);

    let plain = Aggregator::new(
        FakeFetcher::new([("20240102".to_string(), nested.to_string())]),
        &SpiderConfig::default(),
    )
    .run(&dates)
    .await
    .unwrap();
    assert_eq!(plain.len(), 3);

    let config = SpiderConfig {
        dedup: true,
        ..SpiderConfig::default()
    };
    let deduped = Aggregator::new(
        FakeFetcher::new([("20240102".to_string(), nested.to_string())]),
        &config,
    )
    .run(&dates)
    .await
    .unwrap();
    let tickers: Vec<&str> = deduped.iter().map(|r| r.ticker_symbol.as_str()).collect();
    assert_eq!(tickers, ["INN", "OUT"]);
}

#[tokio::test]
async fn end_to_end_into_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("earnings.db");
    let dates = date_strings_from(today(), 0, 2);
    let fetcher = FakeFetcher::new([
        ("20240102".to_string(), page(&[("Acme Corp", "ACME")])),
        ("20240103".to_string(), page(&[("Globex", "GBX")])),
    ]);

    let batch = Aggregator::new(fetcher, &SpiderConfig::default())
        .run(&dates)
        .await
        .unwrap();
    let sink = SqliteSink::new(db.to_str().unwrap()).unwrap();
    let outcome = sink.store(batch).await.unwrap();

    assert_eq!(outcome, StoreOutcome::Inserted(2));
}
