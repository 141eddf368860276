//! HTTP access to IMSLP, including the disclaimer-gate bypass.
//!
//! All network state lives in an explicit [`FetchConfig`]; nothing here is
//! global. The [`PageFetcher`] trait is the seam between the network and the
//! pure parsing layers, so everything above it tests offline.

use anyhow::{Context, Result};
use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::warn;
use url::Url;

/// IMSLP serves a captcha interstitial to obviously non-browser agents.
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

/// Asserts prior acceptance of the IMSLP disclaimer, skipping the gate page
/// on `Special:ImagefromIndex` redirects.
const DISCLAIMER_COOKIE: &str = "imslpdisclaimeraccepted=yes";

/// The download-button anchor on the post-disclaimer wait page.
const DOWNLOAD_BUTTON_SELECTOR: &str = "a#sm_dl_wait";

/// Request configuration carried explicitly into every fetch.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub disclaimer_cookie: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            disclaimer_cookie: DISCLAIMER_COOKIE.to_string(),
        }
    }
}

/// One fetched page: the final URL after redirects, whether the status was
/// 2xx, and the body text.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub final_url: Url,
    pub ok: bool,
    pub body: String,
}

/// A single HTTP GET with the configured headers, redirects followed.
/// Production impl is [`HttpFetcher`]; tests substitute an in-memory stub.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn get(&self, url: &str, config: &FetchConfig) -> Result<FetchedPage>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn get(&self, url: &str, config: &FetchConfig) -> Result<FetchedPage> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, &config.user_agent)
            .header(reqwest::header::COOKIE, &config.disclaimer_cookie)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;

        let final_url = response.url().clone();
        let ok = response.status().is_success();
        let body = response
            .text()
            .await
            .with_context(|| format!("reading body of {url}"))?;

        Ok(FetchedPage {
            final_url,
            ok,
            body,
        })
    }
}

/// Fetch the raw HTML of a work page.
///
/// Any failure degrades to an empty string, which the parse layer turns into
/// an empty score list: the caller cannot distinguish "no IMSLP presence"
/// from a transient upstream error any more finely than IMSLP allows.
/// Failures are logged, never retried (re-fetch loops tend to trip IMSLP's
/// anti-scraping defenses).
pub async fn fetch_wiki_page(fetcher: &dyn PageFetcher, config: &FetchConfig, url: &str) -> String {
    match fetcher.get(url, config).await {
        Ok(page) if page.ok => page.body,
        Ok(_) => {
            warn!(url, "work page fetch returned non-OK status");
            String::new()
        }
        Err(e) => {
            warn!(url, error = %e, "work page fetch failed");
            String::new()
        }
    }
}

/// Resolve a `Special:ImagefromIndex` redirect to a direct, time-limited PDF
/// URL.
///
/// Returns `None` whenever the request fails or the wait-page button is
/// absent: IMSLP download links expire and rate-limit, so unavailability is
/// an expected state, not an error.
pub async fn resolve_index_download(
    fetcher: &dyn PageFetcher,
    config: &FetchConfig,
    index_url: &str,
) -> Option<String> {
    let page = match fetcher.get(index_url, config).await {
        Ok(page) if page.ok => page,
        Ok(_) => {
            warn!(url = index_url, "index redirect returned non-OK status");
            return None;
        }
        Err(e) => {
            warn!(url = index_url, error = %e, "index redirect fetch failed");
            return None;
        }
    };

    let document = Html::parse_document(&page.body);
    let selector = Selector::parse(DOWNLOAD_BUTTON_SELECTOR).unwrap();
    let href = document.select(&selector).next()?.value().attr("href")?;

    // The href is usually relative; resolve it against wherever the redirect
    // chain actually landed.
    match page.final_url.join(href) {
        Ok(resolved) => Some(resolved.to_string()),
        Err(e) => {
            warn!(href, error = %e, "could not resolve download href");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Serves a canned page for every URL, or an error.
    struct StubFetcher {
        page: Result<FetchedPage, String>,
    }

    impl StubFetcher {
        fn ok(final_url: &str, body: &str) -> Self {
            Self {
                page: Ok(FetchedPage {
                    final_url: Url::parse(final_url).unwrap(),
                    ok: true,
                    body: body.to_string(),
                }),
            }
        }

        fn status_failure(final_url: &str) -> Self {
            Self {
                page: Ok(FetchedPage {
                    final_url: Url::parse(final_url).unwrap(),
                    ok: false,
                    body: "<html><body>Not Found</body></html>".to_string(),
                }),
            }
        }

        fn transport_failure() -> Self {
            Self {
                page: Err("connection reset".to_string()),
            }
        }
    }

    #[async_trait]
    impl PageFetcher for StubFetcher {
        async fn get(&self, _url: &str, _config: &FetchConfig) -> Result<FetchedPage> {
            match &self.page {
                Ok(page) => Ok(page.clone()),
                Err(msg) => Err(anyhow::anyhow!("{msg}")),
            }
        }
    }

    const INDEX_URL: &str = "https://imslp.org/wiki/Special:ImagefromIndex/56734/xxyz";

    #[tokio::test]
    async fn test_resolve_index_download_joins_relative_href() {
        let fetcher = StubFetcher::ok(
            "https://ws.imslp.info/imglnks/usimg/5/5f/wait",
            include_str!("../../tests/fixtures/wait_page.html"),
        );
        let url = resolve_index_download(&fetcher, &FetchConfig::default(), INDEX_URL).await;
        assert_eq!(
            url.as_deref(),
            Some("https://ws.imslp.info/files/imglnks/usimg/5/5f/IMSLP56734-nocturnes.pdf")
        );
    }

    #[tokio::test]
    async fn test_resolve_index_download_absolute_href_kept() {
        let fetcher = StubFetcher::ok(
            "https://ws.imslp.info/wait",
            r##"<a id="sm_dl_wait" href="https://cdn.example.org/x.pdf">Click here</a>"##,
        );
        let url = resolve_index_download(&fetcher, &FetchConfig::default(), INDEX_URL).await;
        assert_eq!(url.as_deref(), Some("https://cdn.example.org/x.pdf"));
    }

    #[tokio::test]
    async fn test_missing_button_yields_none() {
        let fetcher = StubFetcher::ok(
            "https://ws.imslp.info/wait",
            include_str!("../../tests/fixtures/wait_page_no_button.html"),
        );
        let url = resolve_index_download(&fetcher, &FetchConfig::default(), INDEX_URL).await;
        assert_eq!(url, None);
    }

    #[tokio::test]
    async fn test_button_without_href_yields_none() {
        let fetcher = StubFetcher::ok(
            "https://ws.imslp.info/wait",
            r#"<a id="sm_dl_wait">preparing download…</a>"#,
        );
        let url = resolve_index_download(&fetcher, &FetchConfig::default(), INDEX_URL).await;
        assert_eq!(url, None);
    }

    #[tokio::test]
    async fn test_non_ok_status_yields_none() {
        let fetcher = StubFetcher::status_failure("https://ws.imslp.info/wait");
        let url = resolve_index_download(&fetcher, &FetchConfig::default(), INDEX_URL).await;
        assert_eq!(url, None);
    }

    #[tokio::test]
    async fn test_transport_failure_yields_none() {
        let fetcher = StubFetcher::transport_failure();
        let url = resolve_index_download(&fetcher, &FetchConfig::default(), INDEX_URL).await;
        assert_eq!(url, None);
    }

    #[tokio::test]
    async fn test_wiki_page_failures_degrade_to_empty_body() {
        let fetcher = StubFetcher::status_failure("https://imslp.org/wiki/Nocturnes");
        let body =
            fetch_wiki_page(&fetcher, &FetchConfig::default(), "https://imslp.org/wiki/Nocturnes")
                .await;
        assert_eq!(body, "");

        let fetcher = StubFetcher::transport_failure();
        let body =
            fetch_wiki_page(&fetcher, &FetchConfig::default(), "https://imslp.org/wiki/Nocturnes")
                .await;
        assert_eq!(body, "");
    }
}
