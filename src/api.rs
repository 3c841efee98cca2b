//! iNaturalist REST API access.
//!
//! The pipeline talks to the API through the [`ObservationApi`] trait so
//! tests can substitute a canned response or a failing transport.
//! [`InatClient`] is the real implementation over reqwest.
//!
//! There is deliberately no retry: one request is made, and any failure
//! is handed back to the caller, which substitutes placeholder data.

use std::time::{Duration, Instant};

use reqwest::Client;
use tracing::{error, info, instrument};
use url::Url;

use crate::errors::ScrapeError;
use crate::models::InatResponse;

pub const INAT_ENDPOINT: &str = "https://api.inaturalist.org/v1/observations";

/// Trait for searching observations.
///
/// Implementors send the ordered query parameters to the observation
/// search endpoint and return the raw response body.
pub trait ObservationApi {
    async fn search(&self, params: &[(String, String)]) -> Result<String, ScrapeError>;
}

/// [`ObservationApi`] over HTTP.
#[derive(Debug)]
pub struct InatClient {
    client: Client,
    endpoint: String,
}

impl InatClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

impl ObservationApi for InatClient {
    #[instrument(level = "info", skip_all, fields(endpoint = %self.endpoint))]
    async fn search(&self, params: &[(String, String)]) -> Result<String, ScrapeError> {
        let url = Url::parse_with_params(&self.endpoint, params)?;
        let t0 = Instant::now();

        let res = async {
            let response = self.client.get(url.clone()).send().await?.error_for_status()?;
            Ok::<_, ScrapeError>(response.text().await?)
        }
        .await;
        let dt = t0.elapsed();

        match &res {
            Ok(body) => info!(
                %url,
                bytes = body.len(),
                elapsed_ms = dt.as_millis() as u64,
                "Observation search succeeded"
            ),
            Err(e) => error!(%url, elapsed_ms = dt.as_millis() as u64, error = %e, "Observation search failed"),
        }
        res
    }
}

/// Decode a search response body.
pub fn parse_response(body: &str) -> Result<InatResponse, ScrapeError> {
    Ok(serde_json::from_str(body)?)
}
