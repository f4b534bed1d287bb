use std::time::Duration;

/// Calendar page for one day; `{date}` is replaced with the `YYYYMMDD` date key.
pub const DEFAULT_URL_TEMPLATE: &'static str = "https://biz.yahoo.com/research/earncal/{date}.html";

/// Every genuine calendar row links its ticker to a quote page starting with this prefix.
pub const DEFAULT_QUOTE_PREFIX: &'static str = "http://finance.yahoo.com/q?s=";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// What the aggregator does when a single date fails to fetch or parse.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log the failure; the date contributes no rows and the run continues.
    #[default]
    Skip,

    /// Stop the whole run on the first failed date.
    Abort,
}

/// Runtime settings for the spider.
#[derive(Clone, Debug)]
pub struct SpiderConfig {
    pub url_template: String,
    pub quote_prefix: String,
    pub timeout: Duration,
    pub user_agent: String,
    pub policy: FailurePolicy,

    /// Drop repeated `(ticker, date)` pairs before storing.
    pub dedup: bool,

    /// Show a progress bar over the dates.
    pub tui: bool,
}

impl Default for SpiderConfig {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            quote_prefix: DEFAULT_QUOTE_PREFIX.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("earncal/", env!("CARGO_PKG_VERSION")).to_string(),
            policy: FailurePolicy::default(),
            dedup: false,
            tui: false,
        }
    }
}

impl SpiderConfig {
    /// Defaults, with the user agent overridden by the `USER_AGENT` environment variable
    /// (or `.env` file) when present.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        let mut config = Self::default();
        if let Ok(user_agent) = dotenv::var("USER_AGENT") {
            config.user_agent = user_agent;
        }
        config
    }

    /// Resolve the page URL for a date key.
    pub fn page_url(&self, date_key: &str) -> String {
        self.url_template.replace("{date}", date_key)
    }
}

//////////////////////////////////////////////////////////////
// -- TESTS --
//////////////////////////////////////////////////////////////

#[test]
fn page_url_substitutes_date_key() {
    let config = SpiderConfig::default();
    assert_eq!(
        config.page_url("20240115"),
        "https://biz.yahoo.com/research/earncal/20240115.html"
    );
}

#[test]
fn defaults_skip_failed_dates() {
    let config = SpiderConfig::default();
    assert_eq!(config.policy, FailurePolicy::Skip);
    assert!(!config.dedup);
    assert_eq!(config.timeout, Duration::from_secs(30));
}
