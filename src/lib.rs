//! imslp-scores: discover downloadable public-domain scores on IMSLP work
//! pages.
//!
//! The pipeline is fetch → DOM extraction → publisher-text parse → score
//! entry extraction → sort/dedup. Parsing is pure and synchronous; the only
//! async boundary is the outbound HTTP GET. Both public operations degrade
//! gracefully: a failed fetch or unparseable page is an empty result, never
//! an error, because IMSLP gives callers nothing finer to report.

pub mod fetch;
pub mod format;
pub mod model;
pub mod parse;

pub use fetch::{FetchConfig, HttpFetcher, PageFetcher};
pub use model::{PublisherInfo, ScoreEntry, ScoreScrape, SkipReason};
pub use parse::parse_scores;

/// List every downloadable PDF score on an IMSLP work page
/// (`https://imslp.org/wiki/<piece>`), sorted and deduplicated.
///
/// Returns an empty list on any failure; an empty list means "no matches"
/// and callers should offer a manual-URL fallback.
pub async fn get_scores_by_wiki_url(wiki_url: &str) -> Vec<ScoreEntry> {
    let fetcher = HttpFetcher::new();
    get_scores_with_fetcher(&fetcher, &FetchConfig::default(), wiki_url)
        .await
        .entries
}

/// As [`get_scores_by_wiki_url`], but with an explicit fetcher/config and the
/// full scrape result including per-entry skip diagnostics.
pub async fn get_scores_with_fetcher(
    fetcher: &dyn PageFetcher,
    config: &FetchConfig,
    wiki_url: &str,
) -> ScoreScrape {
    let html = fetch::fetch_wiki_page(fetcher, config, wiki_url).await;
    let mut scrape = parse::parse_scores(&html);
    parse::sort::sort_scores(&mut scrape.entries);
    scrape.entries = parse::sort::dedup_scores(std::mem::take(&mut scrape.entries));

    for skip in &scrape.skips {
        tracing::debug!(%skip, url = wiki_url, "dropped during parse");
    }
    scrape
}

/// Resolve a `https://imslp.org/wiki/Special:ImagefromIndex/<id>/<token>`
/// URL to a direct (time-limited) PDF URL, or `None` if the download is
/// unavailable right now.
pub async fn get_pdf_url_by_index(index_url: &str) -> Option<String> {
    let fetcher = HttpFetcher::new();
    get_pdf_url_with_fetcher(&fetcher, &FetchConfig::default(), index_url).await
}

/// As [`get_pdf_url_by_index`], but with an explicit fetcher/config.
pub async fn get_pdf_url_with_fetcher(
    fetcher: &dyn PageFetcher,
    config: &FetchConfig,
    index_url: &str,
) -> Option<String> {
    fetch::resolve_index_download(fetcher, config, index_url).await
}
