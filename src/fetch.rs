//! Page fetching.
//!
//! The assembly engine only sees the [`Fetcher`] trait; [`HttpFetcher`] is the
//! reqwest-backed implementation used by the CLI.

use crate::config::ScrapingConfig;
use crate::error::FetchError;
use async_trait::async_trait;
use scraper::Html;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Fetches a URL and returns the parsed document.
///
/// Retry and timeout policy belong to the implementation, not to callers.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Html, FetchError>;
}

/// HTTP fetcher with a per-request delay and timeout.
pub struct HttpFetcher {
    client: reqwest::Client,
    delay_sec: f64,
}

impl HttpFetcher {
    /// Creates a fetcher from the scraping configuration.
    pub fn new(config: &ScrapingConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .timeout(Duration::from_secs(config.timeout_sec))
            .build()?;

        Ok(Self {
            client,
            delay_sec: config.delay_between_requests_sec,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Html, FetchError> {
        rate_limit(self.delay_sec).await;
        debug!(url, "fetching page");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        // Invalid byte sequences decode to U+FFFD rather than failing the page.
        let text = response.text().await?;
        Ok(Html::parse_document(&text))
    }
}

/// Applies rate limiting delay.
pub async fn rate_limit(delay_sec: f64) {
    if delay_sec > 0.0 {
        tokio::time::sleep(Duration::from_secs_f64(delay_sec)).await;
    }
}


#[cfg(test)]
mod tests {
    use super::testing::StaticFetcher;
    use super::*;

    #[test]
    fn test_http_fetcher_builds_from_default_config() {
        assert!(HttpFetcher::new(&ScrapingConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_static_fetcher_serves_and_fails() {
        let fetcher = StaticFetcher::new()
            .page("https://a.test/1", "<p>one</p>")
            .failing("https://a.test/2");

        assert!(fetcher.fetch("https://a.test/1").await.is_ok());
        assert!(matches!(
            fetcher.fetch("https://a.test/2").await,
            Err(FetchError::Status { status: 503 })
        ));
        assert_eq!(fetcher.requested().len(), 2);
    }

    #[tokio::test]
    async fn test_http_fetcher_accepts_invalid_utf8() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/chuong-1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(b"<p>Ch\xE0 1</p>".to_vec(), "text/html; charset=utf-8"),
            )
            .mount(&server)
            .await;

        let config = ScrapingConfig {
            delay_between_requests_sec: 0.0,
            ..ScrapingConfig::default()
        };
        let fetcher = HttpFetcher::new(&config).unwrap();
        let doc = fetcher
            .fetch(&format!("{}/chuong-1", server.uri()))
            .await
            .unwrap();

        let text: String = doc.root_element().text().collect();
        assert!(text.contains("Ch\u{FFFD} 1"));
    }

    #[tokio::test]
    async fn test_http_fetcher_reports_status() {
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(wiremock::matchers::method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let config = ScrapingConfig {
            delay_between_requests_sec: 0.0,
            ..ScrapingConfig::default()
        };
        let fetcher = HttpFetcher::new(&config).unwrap();
        let result = fetcher.fetch(&format!("{}/missing", server.uri())).await;
        assert!(matches!(result, Err(FetchError::Status { status: 404 })));
    }

    #[tokio::test]
    async fn test_rate_limit_zero_returns_immediately() {
        rate_limit(0.0).await;
        rate_limit(-1.0).await;
    }
}
