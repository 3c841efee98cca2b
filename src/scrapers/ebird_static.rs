//! eBird catalog scraper over plain HTTP.
//!
//! Fetches the server-rendered catalog page and runs the DOM heuristics
//! from [`heuristics`](super::heuristics) over it. The catalog is mostly
//! client-rendered, so this often comes back empty and falls back; the
//! [`ebird_browser`](super::ebird_browser) pipeline is the heavier
//! alternative.

use std::time::Duration;

use reqwest::Client;
use scraper::Html;
use tracing::{debug, error, info, instrument, warn};

use super::heuristics::{self, dedupe_capped, fallback_assets};
use crate::cli::EbirdStaticArgs;
use crate::errors::ScrapeError;
use crate::models::AssetFeed;
use crate::outputs::json;
use crate::utils::now_iso;

pub const CATALOG_URL: &str =
    "https://media.ebird.org/catalog?birdOnly=true&mediaType=photo&daysSinceUp=7&sort=rating_rank_desc";
pub const FEED_SOURCE: &str = "eBird Top Photos (Last 7 Days)";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Unique identifiers collected before truncation.
const COLLECT_CAP: usize = 15;
/// Identifiers kept for the slideshow.
pub const MAX_ASSETS: usize = 12;

/// Something that can fetch a page body as text.
pub trait PageFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String, ScrapeError>;
}

/// [`PageFetcher`] backed by a reqwest client with a browser-like user agent.
#[derive(Debug)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    #[instrument(level = "info", skip(self))]
    async fn fetch_page(&self, url: &str) -> Result<String, ScrapeError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        info!(status = %response.status(), "Fetched catalog page");
        Ok(response.text().await?)
    }
}

/// Run every static heuristic over `html` and return at most
/// [`MAX_ASSETS`] unique identifiers in heuristic order.
///
/// Returns an empty list when nothing matched; the caller decides about
/// fallback.
pub fn extract_assets(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let anchors = heuristics::anchor_asset_links(&document);
    let images = heuristics::image_src_numbers(&document);
    let data_attrs = heuristics::data_asset_ids(&document);
    let text = heuristics::ml_text_numbers(&document);
    debug!(
        anchors = anchors.len(),
        images = images.len(),
        data_attrs = data_attrs.len(),
        text = text.len(),
        "Heuristic match counts"
    );

    let mut unique = dedupe_capped(
        anchors.into_iter().chain(images).chain(data_attrs).chain(text),
        COLLECT_CAP,
    );
    unique.truncate(MAX_ASSETS);
    unique
}

/// Fetch the catalog and extract asset identifiers, substituting the
/// fallback list on any failure or when nothing was found.
#[instrument(level = "info", skip(fetcher))]
pub async fn scrape_assets<F: PageFetcher>(fetcher: &F, url: &str) -> Vec<String> {
    match fetcher.fetch_page(url).await {
        Ok(html) => {
            let assets = extract_assets(&html);
            info!(count = assets.len(), "Found unique asset numbers");
            if assets.is_empty() {
                warn!("No asset numbers found; using fallback sample data");
                return fallback_assets();
            }
            assets
        }
        Err(e) => {
            error!(kind = ?e.kind(), error = %e, "Error fetching eBird page; using fallback");
            fallback_assets()
        }
    }
}

/// Entry point for the `ebird-static` subcommand.
#[instrument(level = "info", skip_all)]
pub async fn run(args: &EbirdStaticArgs) {
    info!(url = %args.url, "Fetching eBird photos");

    let assets = match HttpFetcher::new(Duration::from_secs(args.timeout_secs)) {
        Ok(fetcher) => scrape_assets(&fetcher, &args.url).await,
        Err(e) => {
            error!(error = %e, "Could not build HTTP client; using fallback");
            fallback_assets()
        }
    };

    let feed = AssetFeed::new(now_iso(), FEED_SOURCE, assets);
    if let Err(e) = json::write_feed(&feed, &args.output).await {
        error!(path = %args.output.display(), error = %e, "Failed to write asset feed");
        return;
    }
    info!(assets = ?feed.assets, "Asset numbers");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::scrapers::heuristics::FALLBACK_ASSETS;

    /// Serves a fixed body, or times out when there is none.
    struct StubFetcher(Option<String>);

    impl PageFetcher for StubFetcher {
        async fn fetch_page(&self, _url: &str) -> Result<String, ScrapeError> {
            self.0.clone().ok_or_else(timeout)
        }
    }

    fn timeout() -> ScrapeError {
        ScrapeError::Timeout(Duration::from_secs(30))
    }

    #[test]
    fn test_extract_orders_by_heuristic_then_document() {
        let html = r#"
            <p>ML100000004</p>
            <div data-asset-id="100000003"></div>
            <img src="https://cdn.example.org/asset/100000002/640">
            <a href="https://macaulaylibrary.org/asset/100000001">a</a>
            <a href="https://macaulaylibrary.org/asset/100000002">b</a>
        "#;
        assert_eq!(
            extract_assets(html),
            vec!["100000001", "100000002", "100000003", "100000004"]
        );
    }

    #[test]
    fn test_extract_truncates_to_twelve() {
        let html: String = (0..20)
            .map(|i| format!(r#"<a href="https://macaulaylibrary.org/asset/{}">x</a>"#, 200000000 + i))
            .collect();
        let assets = extract_assets(&html);
        assert_eq!(assets.len(), MAX_ASSETS);
        assert_eq!(assets[0], "200000000");
        assert_eq!(assets[11], "200000011");
    }

    #[test]
    fn test_extract_ignores_short_ids() {
        let html = r#"<a href="https://macaulaylibrary.org/asset/1234567">x</a>"#;
        assert!(extract_assets(html).is_empty());
    }

    #[test]
    fn test_extract_ignores_non_ascii_digits() {
        let html = r#"<a href="https://macaulaylibrary.org/asset/١٢٣٤٥">x</a>"#;
        assert!(extract_assets(html).is_empty());
    }

    #[tokio::test]
    async fn test_scrape_ignores_ml_numbers_in_scripts() {
        let html = r#"<p>nothing</p><script>var x = "ML612345678";</script><style>/* ML712345678 */</style>"#;
        assert!(extract_assets(html).is_empty());
        let fetcher = StubFetcher(Some(html.to_string()));
        let assets = scrape_assets(&fetcher, CATALOG_URL).await;
        assert_eq!(assets, FALLBACK_ASSETS.to_vec());
    }

    #[tokio::test]
    async fn test_scrape_without_matches_uses_fallback() {
        let fetcher = StubFetcher(Some("<html><body>nothing here</body></html>".to_string()));
        let assets = scrape_assets(&fetcher, CATALOG_URL).await;
        assert_eq!(assets, FALLBACK_ASSETS.to_vec());
    }

    #[tokio::test]
    async fn test_scrape_transport_failure_uses_fallback() {
        assert_eq!(timeout().kind(), ErrorKind::Transport);
        let fetcher = StubFetcher(None);
        let assets = scrape_assets(&fetcher, CATALOG_URL).await;
        assert_eq!(assets.len(), 8);
        assert_eq!(assets, FALLBACK_ASSETS.to_vec());
    }

    #[tokio::test]
    async fn test_scrape_returns_found_assets() {
        let fetcher = StubFetcher(Some(
            r#"<a href="https://macaulaylibrary.org/asset/612345678">x</a>"#.to_string(),
        ));
        assert_eq!(scrape_assets(&fetcher, CATALOG_URL).await, vec!["612345678"]);
    }
}
