//! Command-line interface definitions for wildslide.
//!
//! One subcommand per feed. Options can be provided as flags or, where
//! noted, through environment variables.
//!
//! The `inat` subcommand additionally forwards any `--key=value` token it
//! does not recognise straight to the iNaturalist API, so filters such as
//! `--term_id=17` work without a dedicated flag. Those tokens are split off
//! before clap sees the arguments; see [`parse_args`].

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

use crate::api::INAT_ENDPOINT;
use crate::scrapers::ebird_static::CATALOG_URL;

/// Command-line arguments for wildslide.
///
/// # Examples
///
/// ```sh
/// # eBird top photos over plain HTTP
/// wildslide ebird-static
///
/// # eBird top photos through headless Chrome (needs chromedriver)
/// wildslide ebird-browser --webdriver-url http://localhost:9515
///
/// # Two research-grade shark observations, restricted by annotation
/// wildslide inat --taxon=551307 --quality=research --count=2 --term_id=17
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub pipeline: Pipeline,
}

#[derive(Subcommand, Debug)]
pub enum Pipeline {
    /// Extract eBird asset numbers from the server-rendered catalog page
    EbirdStatic(EbirdStaticArgs),
    /// Extract eBird asset numbers from the catalog rendered in headless Chrome
    EbirdBrowser(EbirdBrowserArgs),
    /// Fetch licensed observation photos from the iNaturalist API
    Inat(InatArgs),
}

#[derive(Args, Debug)]
pub struct EbirdStaticArgs {
    /// Catalog page to scrape
    #[arg(long, env = "EBIRD_CATALOG_URL", default_value = CATALOG_URL)]
    pub url: String,

    /// Where to write the asset feed
    #[arg(short, long, default_value = "assets.json")]
    pub output: PathBuf,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,
}

#[derive(Args, Debug)]
pub struct EbirdBrowserArgs {
    /// Catalog page to render
    #[arg(long, env = "EBIRD_CATALOG_URL", default_value = CATALOG_URL)]
    pub url: String,

    /// Where to write the asset feed
    #[arg(short, long, default_value = "birdslide/assets.json")]
    pub output: PathBuf,

    /// WebDriver server controlling Chrome
    #[arg(long, env = "WEBDRIVER_URL", default_value = "http://localhost:9515")]
    pub webdriver_url: String,

    /// Navigation timeout in seconds
    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,

    /// Seconds to let client-side rendering settle after navigation
    #[arg(long, default_value_t = 5)]
    pub settle_secs: u64,
}

#[derive(Args, Debug)]
pub struct InatArgs {
    /// Taxon ID to restrict results to (e.g. 551307 for sharks)
    #[arg(long)]
    pub taxon: Option<String>,

    /// Quality grade filter: `research` or `needs_id`; both when omitted
    #[arg(long)]
    pub quality: Option<String>,

    /// Number of observations to keep (the API pages at most 200)
    #[arg(long, default_value_t = 30)]
    pub count: usize,

    /// Where to write the observation feed
    #[arg(short, long, default_value = "inatslide/observations.json")]
    pub output: PathBuf,

    /// Observation search endpoint
    #[arg(long, env = "INAT_API_URL", default_value = INAT_ENDPOINT)]
    pub endpoint: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Unrecognised `--key=value` pairs, forwarded to the API
    #[arg(skip)]
    pub extra_params: Vec<(String, String)>,
}

/// Parse the process arguments, routing unknown `--key=value` tokens of
/// the `inat` subcommand into [`InatArgs::extra_params`].
pub fn parse_args<I>(args: I) -> Cli
where
    I: IntoIterator<Item = String>,
{
    let (known, extra) = split_passthrough(args.into_iter().collect());
    let mut cli = Cli::parse_from(known);
    if let Pipeline::Inat(ref mut inat) = cli.pipeline {
        inat.extra_params = extra;
    }
    cli
}

/// Separate `--key=value` tokens that the `inat` subcommand has no flag for.
///
/// Only applies when `inat` is the subcommand; every other token, and
/// every token of the other subcommands, is left for clap.
fn split_passthrough(args: Vec<String>) -> (Vec<String>, Vec<(String, String)>) {
    if args.get(1).map(String::as_str) != Some("inat") {
        return (args, Vec::new());
    }

    let command = Cli::command();
    let own_flags: Vec<String> = command
        .find_subcommand("inat")
        .map(|inat| {
            inat.get_arguments()
                .filter_map(|arg| arg.get_long())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let mut known = Vec::with_capacity(args.len());
    let mut extra = Vec::new();
    for (i, arg) in args.into_iter().enumerate() {
        match passthrough_pair(&arg, &own_flags) {
            Some(pair) if i > 1 => extra.push(pair),
            _ => known.push(arg),
        }
    }
    (known, extra)
}

fn passthrough_pair(arg: &str, own_flags: &[String]) -> Option<(String, String)> {
    let (key, value) = arg.strip_prefix("--")?.split_once('=')?;
    if key.is_empty() || own_flags.iter().any(|f| f == key) {
        return None;
    }
    Some((key.to_string(), value.to_string()))
}
