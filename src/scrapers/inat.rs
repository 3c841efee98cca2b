//! iNaturalist observation feed.
//!
//! Queries the observation search API for recent, verifiable, wild,
//! CC-licensed observations with photos and normalizes each result into an
//! [`Observation`] for the slideshow.
//!
//! # Normalization rules
//!
//! - results without a photo or without a photo license are skipped
//! - only the first photo is used, rewritten from `square` to `large`
//! - the observer's display name wins over their login
//! - a withheld location becomes `"Location obscured"`
//!
//! Any failure yields a single placeholder observation so the slideshow
//! always has something to show.

use std::path::Path;
use std::time::Duration;

use tracing::{error, info, instrument};

use crate::api::{parse_response, InatClient, ObservationApi};
use crate::cli::InatArgs;
use crate::errors::ScrapeError;
use crate::license::{license_name, license_url};
use crate::models::{Observation, ObservationFeed, RawObservation};
use crate::outputs::json;
use crate::utils::now_iso;

pub const FEED_SOURCE: &str = "iNaturalist";

/// The API refuses larger pages.
pub const MAX_PER_PAGE: usize = 200;

const OBSERVATION_PAGE: &str = "https://www.inaturalist.org/observations";
const LOCATION_OBSCURED: &str = "Location obscured";
const UNKNOWN_SPECIES: &str = "Unknown species";
const UNKNOWN_OBSERVER: &str = "Unknown";

/// What to ask the API for.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Empty means any taxon.
    pub taxon_id: String,
    /// `research`, `needs_id`, or empty for both.
    pub quality_grade: String,
    /// Maximum observations to keep.
    pub count: usize,
    /// Additional raw API parameters, applied last.
    pub extra: Vec<(String, String)>,
}

impl From<&InatArgs> for SearchOptions {
    fn from(args: &InatArgs) -> Self {
        Self {
            taxon_id: args.taxon.clone().unwrap_or_default(),
            quality_grade: args.quality.clone().unwrap_or_default(),
            count: args.count,
            extra: args.extra_params.clone(),
        }
    }
}

impl SearchOptions {
    /// Ordered query parameters for the search request.
    ///
    /// Extra parameters override built-in ones of the same name in place.
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = [
            ("per_page", self.count.min(MAX_PER_PAGE).to_string()),
            ("order", "desc".to_string()),
            ("order_by", "created_at".to_string()),
            ("photos", "true".to_string()),
            ("photo_licensed", "true".to_string()),
            ("captive", "false".to_string()),
            ("verifiable", "true".to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        if !self.taxon_id.is_empty() {
            set_param(&mut params, "taxon_id", &self.taxon_id);
        }
        if !self.quality_grade.is_empty() {
            set_param(&mut params, "quality_grade", &self.quality_grade);
        }
        for (key, value) in &self.extra {
            set_param(&mut params, key, value);
        }
        params
    }
}

fn set_param(params: &mut Vec<(String, String)>, key: &str, value: &str) {
    match params.iter_mut().find(|(k, _)| k == key) {
        Some((_, v)) => *v = value.to_string(),
        None => params.push((key.to_string(), value.to_string())),
    }
}

/// Turn one API result into an [`Observation`].
///
/// Returns `None` when the result has no photo or its first photo has no
/// license code.
pub fn normalize(raw: &RawObservation) -> Option<Observation> {
    let photo = raw.photos.as_ref()?.first()?;
    let license_code = photo.license_code.as_deref().filter(|c| !c.is_empty())?;

    let taxon = raw.taxon.as_ref();
    let species_common = taxon
        .and_then(|t| t.preferred_common_name.clone())
        .unwrap_or_default();
    let species_scientific = taxon
        .and_then(|t| t.name.clone())
        .unwrap_or_else(|| UNKNOWN_SPECIES.to_string());

    let user = raw.user.as_ref();
    let observer_login = user
        .and_then(|u| u.login.clone())
        .unwrap_or_else(|| UNKNOWN_OBSERVER.to_string());
    let observer = user
        .and_then(|u| u.name.clone())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| observer_login.clone());

    let location = raw
        .place_guess
        .clone()
        .filter(|place| !place.is_empty())
        .unwrap_or_else(|| LOCATION_OBSCURED.to_string());
    let date = raw
        .observed_on_string
        .clone()
        .or_else(|| raw.created_at.clone())
        .unwrap_or_default();

    let obs_url = match raw.id {
        Some(id) => format!("{}/{}", OBSERVATION_PAGE, id),
        None => OBSERVATION_PAGE.to_string(),
    };

    Some(Observation {
        id: raw.id,
        image_url: photo.url.as_deref().unwrap_or_default().replace("square", "large"),
        species_common,
        species_scientific,
        observer,
        observer_login,
        date,
        location,
        license_code: license_code.to_string(),
        license_name: license_name(license_code),
        license_url: license_url(license_code),
        obs_url,
        quality_grade: raw.quality_grade.clone().unwrap_or_default(),
    })
}

/// Placeholder shown when the API cannot be reached or read.
pub fn fallback_observations() -> Vec<Observation> {
    vec![Observation {
        id: Some(123456789),
        image_url: "https://via.placeholder.com/1024x768?text=iNaturalist+observation".to_string(),
        species_common: "Sample Species".to_string(),
        species_scientific: "Genus species".to_string(),
        observer: "Sample Observer".to_string(),
        observer_login: "observer".to_string(),
        date: "Dec 15, 2025".to_string(),
        location: "Sample Location".to_string(),
        license_code: "cc-by".to_string(),
        license_name: "CC BY".to_string(),
        license_url: "https://creativecommons.org/licenses/by/4.0/".to_string(),
        obs_url: "https://www.inaturalist.org".to_string(),
        quality_grade: "research".to_string(),
    }]
}

async fn fetch_observations<A: ObservationApi>(
    api: &A,
    options: &SearchOptions,
) -> Result<Vec<Observation>, ScrapeError> {
    let params = options.params();
    for (key, value) in &params {
        info!(%key, %value, "API parameter");
    }

    let body = api.search(&params).await?;
    let response = parse_response(&body)?;
    info!(
        returned = response.results.len(),
        total = response.total_results.unwrap_or(0),
        "API returned observations"
    );

    let observations: Vec<Observation> = response
        .results
        .iter()
        .filter_map(normalize)
        .take(options.count)
        .collect();
    info!(
        count = observations.len(),
        "Processed observations with licensed photos"
    );
    Ok(observations)
}

/// Search and normalize, substituting [`fallback_observations`] on any
/// transport or parse failure.
#[instrument(level = "info", skip_all, fields(taxon_id = %options.taxon_id, count = options.count))]
pub async fn scrape_observations<A: ObservationApi>(
    api: &A,
    options: &SearchOptions,
) -> Vec<Observation> {
    match fetch_observations(api, options).await {
        Ok(observations) => observations,
        Err(e) => {
            error!(kind = ?e.kind(), error = %e, "Error fetching observations; using fallback");
            fallback_observations()
        }
    }
}

/// Scrape with `api` and write the feed to `output`.
pub async fn run_with<A: ObservationApi>(
    api: &A,
    options: &SearchOptions,
    output: &Path,
) -> ObservationFeed {
    let observations = scrape_observations(api, options).await;
    let feed = ObservationFeed::new(now_iso(), FEED_SOURCE, &options.taxon_id, observations);

    match json::write_feed(&feed, output).await {
        Ok(()) => info!(
            first = feed
                .observations
                .first()
                .map(|o| o.species_scientific.as_str())
                .unwrap_or("None"),
            "Saved observations"
        ),
        Err(e) => error!(path = %output.display(), error = %e, "Failed to write observation feed"),
    }
    feed
}

/// Entry point for the `inat` subcommand.
#[instrument(level = "info", skip_all)]
pub async fn run(args: &InatArgs) {
    let options = SearchOptions::from(args);

    match InatClient::new(&args.endpoint, Duration::from_secs(args.timeout_secs)) {
        Ok(client) => {
            run_with(&client, &options, &args.output).await;
        }
        Err(e) => {
            error!(error = %e, "Could not build HTTP client; using fallback");
            let feed = ObservationFeed::new(
                now_iso(),
                FEED_SOURCE,
                &options.taxon_id,
                fallback_observations(),
            );
            if let Err(e) = json::write_feed(&feed, &args.output).await {
                error!(path = %args.output.display(), error = %e, "Failed to write observation feed");
            }
        }
    }
}
