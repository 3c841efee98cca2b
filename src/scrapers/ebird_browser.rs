//! eBird catalog scraper over a headless browser.
//!
//! The catalog grid is filled in client-side, so this pipeline drives
//! headless Chrome through a WebDriver server (chromedriver), lets the page
//! settle, and then runs a wider set of heuristics over both the live DOM
//! and the rendered markup.
//!
//! # Prerequisites
//!
//! A chromedriver instance must be listening on `--webdriver-url`
//! (default `http://localhost:9515`):
//!
//! ```sh
//! chromedriver --port=9515
//! ```

use std::time::Duration;

use futures::stream::{self, StreamExt};
use thirtyfour::prelude::*;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, instrument, warn};

use super::ebird_static::{FEED_SOURCE, MAX_ASSETS};
use super::heuristics::{self, dedupe_capped, fallback_assets, DOM_IMAGE_LIMIT, DOM_LINK_LIMIT};
use crate::cli::EbirdBrowserArgs;
use crate::errors::ScrapeError;
use crate::models::AssetFeed;
use crate::outputs::json;
use crate::utils::{now_iso, truncate_for_log};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const COLLECT_CAP: usize = 50;
const PREVIEW_BYTES: usize = 1000;
const IMAGE_POLL: Duration = Duration::from_millis(250);

/// What the heuristics need from a rendered page.
#[derive(Debug, Default, Clone)]
pub struct RenderedPage {
    /// Page source after scripts ran.
    pub markup: String,
    /// `src` of the leading `img` elements, in document order.
    pub image_srcs: Vec<String>,
    /// `href` of the leading `a` elements, in document order.
    pub link_hrefs: Vec<String>,
}

/// Something that can load a URL, run its scripts, and hand back the result.
pub trait PageRenderer {
    async fn render(&self, url: &str) -> Result<RenderedPage, ScrapeError>;
}

/// [`PageRenderer`] driving headless Chrome over WebDriver.
#[derive(Debug, Clone)]
pub struct ChromeRenderer {
    pub webdriver_url: String,
    pub page_load_timeout: Duration,
    pub settle: Duration,
    pub image_wait: Duration,
}

impl ChromeRenderer {
    pub fn from_args(args: &EbirdBrowserArgs) -> Self {
        Self {
            webdriver_url: args.webdriver_url.clone(),
            page_load_timeout: Duration::from_secs(args.timeout_secs),
            settle: Duration::from_secs(args.settle_secs),
            image_wait: Duration::from_secs(10),
        }
    }

    async fn start_driver(&self) -> Result<WebDriver, ScrapeError> {
        let mut caps = DesiredCapabilities::chrome();
        caps.add_arg("--headless")?;
        caps.add_arg("--disable-gpu")?;
        caps.add_arg("--no-sandbox")?;
        caps.add_arg("--disable-dev-shm-usage")?;
        caps.add_arg(&format!("--user-agent={}", USER_AGENT))?;
        let driver = WebDriver::new(self.webdriver_url.as_str(), caps).await?;
        Ok(driver)
    }

    async fn render_with(&self, driver: &WebDriver, url: &str) -> Result<RenderedPage, ScrapeError> {
        driver.set_page_load_timeout(self.page_load_timeout).await?;

        info!("Navigating to eBird");
        match timeout(self.page_load_timeout, driver.goto(url)).await {
            Ok(nav) => nav?,
            Err(_) => return Err(ScrapeError::Timeout(self.page_load_timeout)),
        }

        info!(settle = ?self.settle, "Waiting for content to load");
        sleep(self.settle).await;

        if wait_for_images(driver, self.image_wait).await {
            info!("Images detected");
        } else {
            warn!("Timeout waiting for images, proceeding anyway");
        }

        let markup = driver.source().await?;
        info!(bytes = markup.len(), "Captured page content");

        let image_srcs = match driver.find_all(By::Tag("img")).await {
            Ok(images) => {
                info!(count = images.len(), "Found img elements");
                collect_attr(&images, "src", DOM_IMAGE_LIMIT).await
            }
            Err(e) => {
                warn!(error = %e, "Error extracting from img elements");
                Vec::new()
            }
        };

        let link_hrefs = match driver.find_all(By::Tag("a")).await {
            Ok(links) => {
                info!(count = links.len(), "Found link elements");
                collect_attr(&links, "href", DOM_LINK_LIMIT).await
            }
            Err(e) => {
                warn!(error = %e, "Error extracting from links");
                Vec::new()
            }
        };

        Ok(RenderedPage {
            markup,
            image_srcs,
            link_hrefs,
        })
    }
}

impl PageRenderer for ChromeRenderer {
    #[instrument(level = "info", skip(self))]
    async fn render(&self, url: &str) -> Result<RenderedPage, ScrapeError> {
        info!(webdriver = %self.webdriver_url, "Launching browser");
        let driver = self.start_driver().await?;
        let rendered = self.render_with(&driver, url).await;

        debug!("Closing browser");
        if let Err(e) = driver.quit().await {
            warn!(error = %e, "Failed to close browser session");
        }
        rendered
    }
}

/// Poll until at least one `img` exists or `wait` elapses.
async fn wait_for_images(driver: &WebDriver, wait: Duration) -> bool {
    let polls = (wait.as_millis() / IMAGE_POLL.as_millis()).max(1) as usize;
    stream::iter(0..polls)
        .then(|_| async move {
            match driver.find_all(By::Tag("img")).await {
                Ok(elements) if !elements.is_empty() => true,
                _ => {
                    sleep(IMAGE_POLL).await;
                    false
                }
            }
        })
        .any(|found| futures::future::ready(found))
        .await
}

/// Read one attribute from the first `limit` elements, skipping absent ones.
async fn collect_attr(elements: &[WebElement], name: &'static str, limit: usize) -> Vec<String> {
    stream::iter(elements.iter().take(limit))
        .then(|el| async move { el.attr(name).await.ok().flatten() })
        .filter_map(|value| async move { value })
        .collect()
        .await
}

/// Run every browser heuristic over a rendered page and return at most
/// [`MAX_ASSETS`] unique identifiers.
///
/// Order: DOM image sources, DOM links, then the markup patterns (asset
/// URLs, `ML` numbers, `catalogId`, `assetId`, image file names, data
/// attributes).
pub fn extract_assets(page: &RenderedPage) -> Vec<String> {
    let markup = page.markup.as_str();
    let surfaces: [(&str, Vec<String>); 8] = [
        ("dom images", heuristics::rendered_image_numbers(&page.image_srcs)),
        ("dom links", heuristics::rendered_link_numbers(&page.link_hrefs)),
        ("asset urls", heuristics::markup_asset_urls(markup)),
        ("ml numbers", heuristics::markup_ml_numbers(markup)),
        ("catalog ids", heuristics::markup_catalog_ids(markup)),
        ("asset ids", heuristics::markup_asset_ids(markup)),
        ("image urls", heuristics::markup_image_files(markup)),
        ("data attributes", heuristics::markup_data_attributes(markup)),
    ];
    for (name, matches) in &surfaces {
        debug!(heuristic = *name, matches = matches.len(), "Heuristic matched");
    }

    let mut unique = dedupe_capped(
        surfaces.into_iter().flat_map(|(_, matches)| matches),
        COLLECT_CAP,
    );
    info!(count = unique.len(), "Total unique asset numbers found");
    unique.truncate(MAX_ASSETS);
    unique
}

/// Render the catalog and extract asset identifiers, substituting the
/// fallback list on any failure or when nothing was found.
#[instrument(level = "info", skip(renderer))]
pub async fn scrape_assets<R: PageRenderer>(renderer: &R, url: &str) -> Vec<String> {
    match renderer.render(url).await {
        Ok(page) => {
            let assets = extract_assets(&page);
            if assets.is_empty() {
                warn!(
                    preview = %truncate_for_log(&page.markup, PREVIEW_BYTES),
                    "No asset numbers found; using fallback sample data"
                );
                return fallback_assets();
            }
            assets
        }
        Err(e) => {
            error!(kind = ?e.kind(), error = %e, "Error during scraping; using fallback");
            fallback_assets()
        }
    }
}

/// Entry point for the `ebird-browser` subcommand.
#[instrument(level = "info", skip_all)]
pub async fn run(args: &EbirdBrowserArgs) {
    info!(url = %args.url, "Fetching eBird photos");

    let renderer = ChromeRenderer::from_args(args);
    let assets = scrape_assets(&renderer, &args.url).await;

    let feed = AssetFeed::new(now_iso(), FEED_SOURCE, assets);
    if let Err(e) = json::write_feed(&feed, &args.output).await {
        error!(path = %args.output.display(), error = %e, "Failed to write asset feed");
        return;
    }
    info!(assets = ?feed.assets, "Asset numbers");
}
