//! Data models for scraped slideshow feeds.
//!
//! This module defines the structures that flow through the pipelines:
//! - [`AssetFeed`]: the envelope written by both eBird scrapers
//! - [`ObservationFeed`]: the envelope written by the iNaturalist scraper
//! - [`Observation`]: one normalized, photo-bearing observation
//! - [`InatResponse`] and friends: the raw iNaturalist API payload
//!
//! Raw payload types are deliberately lenient: every field is optional so
//! that a sparse or partially-null API result is skipped or defaulted by
//! the normalizer instead of failing the whole page.

use serde::{Deserialize, Serialize};

/// Envelope for a list of Macaulay Library asset identifiers.
///
/// Consumed by the bird slideshow, which only needs the ordered `assets`.
#[derive(Debug, Deserialize, Serialize)]
pub struct AssetFeed {
    /// Local generation time, ISO-8601.
    pub last_updated: String,
    /// Human-readable label of where the identifiers came from.
    pub source: String,
    /// Number of entries in `assets`.
    pub count: usize,
    /// Asset identifiers in first-seen order.
    pub assets: Vec<String>,
}

impl AssetFeed {
    pub fn new(last_updated: String, source: &str, assets: Vec<String>) -> Self {
        Self {
            last_updated,
            source: source.to_string(),
            count: assets.len(),
            assets,
        }
    }
}

/// Envelope for a list of normalized iNaturalist observations.
#[derive(Debug, Deserialize, Serialize)]
pub struct ObservationFeed {
    pub last_updated: String,
    pub source: String,
    /// The taxon filter the feed was built with; empty when unfiltered.
    pub taxon_id: String,
    pub count: usize,
    pub observations: Vec<Observation>,
}

impl ObservationFeed {
    pub fn new(
        last_updated: String,
        source: &str,
        taxon_id: &str,
        observations: Vec<Observation>,
    ) -> Self {
        Self {
            last_updated,
            source: source.to_string(),
            taxon_id: taxon_id.to_string(),
            count: observations.len(),
            observations,
        }
    }
}

/// A single photo-bearing observation, ready for display.
///
/// Built once from an API result and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Observation {
    pub id: Option<u64>,
    /// Large rendition of the observation's first photo.
    pub image_url: String,
    pub species_common: String,
    pub species_scientific: String,
    /// Display name, or the login when no display name is set.
    pub observer: String,
    pub observer_login: String,
    pub date: String,
    pub location: String,
    pub license_code: String,
    pub license_name: String,
    pub license_url: String,
    pub obs_url: String,
    /// iNaturalist quality grade, e.g. `"research"` or `"needs_id"`.
    pub quality_grade: String,
}

/// Top-level body of `GET /v1/observations`.
#[derive(Debug, Default, Deserialize)]
pub struct InatResponse {
    #[serde(default)]
    pub total_results: Option<u64>,
    #[serde(default)]
    pub results: Vec<RawObservation>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawObservation {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub photos: Option<Vec<RawPhoto>>,
    #[serde(default)]
    pub taxon: Option<RawTaxon>,
    #[serde(default)]
    pub user: Option<RawUser>,
    #[serde(default)]
    pub place_guess: Option<String>,
    #[serde(default)]
    pub observed_on_string: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub quality_grade: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawPhoto {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub license_code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawTaxon {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub preferred_common_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawUser {
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}
