//! # wildslide
//!
//! Fetches recent wildlife photo metadata for two slideshow displays and
//! writes it as JSON feeds.
//!
//! ## Feeds
//!
//! - **eBird**: top-rated bird photos of the last 7 days from the Macaulay
//!   Library catalog, as a list of asset numbers. Scraped either from the
//!   server-rendered page (`ebird-static`) or from the page rendered in
//!   headless Chrome (`ebird-browser`).
//! - **iNaturalist**: recent CC-licensed observations with photos, with
//!   species, observer, location and license attribution (`inat`).
//!
//! ## Usage
//!
//! ```sh
//! wildslide ebird-static
//! wildslide ebird-browser
//! wildslide inat --taxon=551307 --count=20
//! ```
//!
//! ## Failure model
//!
//! Every feed is always written. Network, browser, and parse failures are
//! logged and replaced with fixed placeholder data, and the process exits
//! successfully either way.

use std::error::Error;
use std::time::Instant;

use chrono::Local;
use tracing::{debug, info};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod api;
mod cli;
mod errors;
mod license;
mod models;
mod outputs;
mod scrapers;
mod utils;

use cli::Pipeline;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = Instant::now();
    let args = cli::parse_args(std::env::args());
    debug!(?args, "Parsed CLI arguments");

    info!(
        run_time = %Local::now().format("%Y-%m-%d %H:%M:%S"),
        version = env!("CARGO_PKG_VERSION"),
        "wildslide starting up"
    );

    match &args.pipeline {
        Pipeline::EbirdStatic(opts) => scrapers::ebird_static::run(opts).await,
        Pipeline::EbirdBrowser(opts) => scrapers::ebird_browser::run(opts).await,
        Pipeline::Inat(opts) => scrapers::inat::run(opts).await,
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Scraping completed"
    );

    Ok(())
}
