use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER, SET_COOKIE, USER_AGENT,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use super::parse::parse_holidays;
use super::HolidaySource;
use crate::error::{FetchError, SourceError};

/// Default page listing today's holidays
pub const DEFAULT_HOLIDAYS_URL: &str = "https://kakoysegodnyaprazdnik.ru/";

/// Per-attempt timeout for the holiday page
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Characters of a failed response body kept in the log
const LOGGED_BODY_CHARS: usize = 300;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Header set that makes the scraper look like a regular browser visit
fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("ru-RU,ru;q=0.9,en-US;q=0.8,en;q=0.7"),
    );
    headers.insert(REFERER, HeaderValue::from_static("https://www.google.com/"));
    headers
}

fn truncate_body(body: &str) -> String {
    body.chars().take(LOGGED_BODY_CHARS).collect()
}

/// Read the response body, turning non-2xx into `FetchError::Status`
async fn read_page(fetcher: &str, response: reqwest::Response) -> Result<String, FetchError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        warn!(
            fetcher,
            status = status.as_u16(),
            body = %truncate_body(&body),
            "Holiday page returned non-success status"
        );
        return Err(FetchError::Status {
            status: status.as_u16(),
        });
    }

    Ok(body)
}

/// Something that can GET a page and hand back its body
#[async_trait]
pub trait PageFetcher: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Primary client: a pooled reqwest client with browser-like headers
pub struct BrowserFetcher {
    client: reqwest::Client,
}

impl BrowserFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .default_headers(browser_headers())
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    fn name(&self) -> &str {
        "BrowserFetcher"
    }

    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;
        read_page(self.name(), response).await
    }
}

/// Fallback client for simple anti-bot challenge pages.
///
/// Keeps cookies across requests. For a page below the site root it first
/// visits the root so a challenge cookie gets set. If the page itself answers
/// with a non-success status, it is requested once more so cookies from that
/// challenge response go along.
pub struct ChallengeFetcher {
    client: reqwest::Client,
}

impl ChallengeFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .default_headers(browser_headers())
            .cookie_store(true)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

/// Scheme and host of a URL, e.g. "https://example.org/"
fn site_root(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    let root = match parsed.port() {
        Some(port) => format!("{}://{}:{}/", parsed.scheme(), host, port),
        None => format!("{}://{}/", parsed.scheme(), host),
    };
    Some(root)
}

#[async_trait]
impl PageFetcher for ChallengeFetcher {
    fn name(&self) -> &str {
        "ChallengeFetcher"
    }

    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        if let Some(root) = site_root(url).filter(|root| root != url) {
            // Status is irrelevant here, only the cookies matter
            match self.client.get(&root).send().await {
                Ok(response) => debug!(status = response.status().as_u16(), "Warm-up request done"),
                Err(e) => debug!(error = %e, "Warm-up request failed"),
            }
        }

        let response = self.client.get(url).send().await?;
        if response.status().is_success() {
            return read_page(self.name(), response).await;
        }

        debug!(
            status = response.status().as_u16(),
            set_cookie = response.headers().contains_key(SET_COOKIE),
            "Challenge response, retrying with stored cookies"
        );
        // Drain the body so the cookie jar has seen the whole response
        let _ = response.bytes().await;

        let response = self.client.get(url).send().await?;
        read_page(self.name(), response).await
    }
}

/// Holiday source that scrapes the holiday page on every request
pub struct WebHolidaySource {
    url: String,
    primary: Arc<dyn PageFetcher>,
    fallback: Option<Arc<dyn PageFetcher>>,
    timeout: Duration,
    permits: Arc<Semaphore>,
}

impl WebHolidaySource {
    pub fn new(
        url: impl Into<String>,
        primary: Arc<dyn PageFetcher>,
        fallback: Option<Arc<dyn PageFetcher>>,
        timeout: Duration,
        max_concurrent_fetches: usize,
    ) -> Self {
        Self {
            url: url.into(),
            primary,
            fallback,
            timeout,
            permits: Arc::new(Semaphore::new(max_concurrent_fetches.max(1))),
        }
    }

    async fn fetch_with(&self, fetcher: &dyn PageFetcher) -> Result<String, FetchError> {
        match tokio::time::timeout(self.timeout, fetcher.fetch(&self.url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.timeout)),
        }
    }

    /// Fetch the page, escalating once to the fallback client on failure
    pub async fn fetch_page(&self) -> Result<String, FetchError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| FetchError::PoolClosed)?;

        let primary_err = match self.fetch_with(self.primary.as_ref()).await {
            Ok(body) => return Ok(body),
            Err(e) => e,
        };

        let Some(fallback) = &self.fallback else {
            warn!(url = %self.url, error = %primary_err, "Holiday page fetch failed");
            return Err(primary_err);
        };

        warn!(
            url = %self.url,
            error = %primary_err,
            fallback = fallback.name(),
            "Primary fetch failed, retrying with fallback client"
        );

        self.fetch_with(fallback.as_ref()).await.map_err(|e| {
            warn!(url = %self.url, error = %e, "Fallback fetch failed");
            e
        })
    }
}

#[async_trait]
impl HolidaySource for WebHolidaySource {
    fn name(&self) -> &str {
        "WebHolidaySource"
    }

    async fn holidays_for(&self, _date: NaiveDate) -> Result<Vec<String>, SourceError> {
        // The page always lists the site's own "today"
        let html = self.fetch_page().await?;
        let holidays = parse_holidays(&html);
        info!(count = holidays.len(), "Parsed holidays from page");
        Ok(holidays)
    }
}
