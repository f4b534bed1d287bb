use super::RawPage;
use crate::http::HttpClient;
use crate::{Error, Result, SpiderConfig};
use async_trait::async_trait;
use tracing::{error, info, trace};

/// Retrieves the calendar page for one date key.
#[async_trait]
pub trait PageFetcher {
    async fn fetch(&self, date_key: &str) -> Result<RawPage>;

    /// Where the page for `date_key` is read from, for progress output.
    fn location(&self, date_key: &str) -> String {
        date_key.to_string()
    }
}

/// Fetches calendar pages over HTTP; one GET per date, no retries.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: HttpClient,
    config: SpiderConfig,
}

impl HttpFetcher {
    pub fn new(config: &SpiderConfig) -> Result<Self> {
        Ok(Self {
            client: crate::std_client_build(config)?,
            config: config.clone(),
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, date_key: &str) -> Result<RawPage> {
        let url = self.location(date_key);
        info!("{url}");

        let fetch_err = |source: reqwest::Error| {
            error!("failed to fetch {url}, error({source})");
            Error::Fetch {
                url: url.clone(),
                source,
            }
        };

        let body = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(fetch_err)?
            .bytes()
            .await
            .map_err(fetch_err)?;
        trace!("fetched {} bytes from {url}", body.len());

        Ok(RawPage::new(date_key, body.to_vec()))
    }

    fn location(&self, date_key: &str) -> String {
        self.config.page_url(date_key)
    }
}
