use std::{fmt, time::Duration};

use futures::future::join_all;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    config::PlannerConfig,
    error::{PlannerError, Result},
    types::{Place, Trip},
};

pub const DEFAULT_PHOTO_BASE_URL: &str = "https://api.unsplash.com";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    urls: Option<PhotoUrls>,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    regular: Option<String>,
}

/// Best-effort photo search against an Unsplash-compatible API.
///
/// Lookups never fail: every problem resolves to "no photo".
#[derive(Clone)]
pub struct PhotoLookup {
    access_key: String,
    base_url: String,
    http: reqwest::Client,
}

impl fmt::Debug for PhotoLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhotoLookup")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl PhotoLookup {
    pub fn new(access_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            base_url: DEFAULT_PHOTO_BASE_URL.to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Build the lookup from `config` alone; the chat key is not needed.
    ///
    /// Fails with `MissingCredential` when no photo access key is configured.
    pub fn from_config(config: &PlannerConfig) -> Result<Self> {
        let access_key = config.unsplash_access_key.as_deref().ok_or_else(|| {
            PlannerError::MissingCredential("Unsplash access key is missing".to_string())
        })?;
        Self::new(access_key)
            .with_base_url(config.unsplash_base_url.as_str())
            .with_timeout(config.timeout)
    }

    /// Build the lookup using the `UNSPLASH_ACCESS_KEY` environment variable
    pub fn from_env() -> Result<Self> {
        Self::from_config(&PlannerConfig::from_env()?)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| PlannerError::Config(format!("failed to build HTTP client: {err}")))?;
        Ok(self)
    }

    /// URL of the first result's regular-size image, if any.
    pub async fn lookup_photo(&self, query: &str) -> Option<String> {
        match self.search(query).await {
            Ok(url) => {
                if url.is_none() {
                    debug!(target: "trip_planner::photo", query, "no photo found");
                }
                url
            }
            Err(err) => {
                warn!(target: "trip_planner::photo", query, error = %err, "photo lookup failed");
                None
            }
        }
    }

    async fn search(&self, query: &str) -> Result<Option<String>> {
        let url = format!("{}/search/photos", self.base_url.trim_end_matches('/'));

        let response = self
            .http
            .get(&url)
            .query(&[("query", query), ("client_id", self.access_key.as_str())])
            .send()
            .await
            .map_err(|err| PlannerError::transport("photo search request failed", err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlannerError::status(
                status.as_u16(),
                "photo search returned a non-success status",
            ));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|err| PlannerError::MalformedResponse(format!("photo search body: {err}")))?;

        Ok(body
            .results
            .into_iter()
            .next()
            .and_then(|result| result.urls)
            .and_then(|urls| urls.regular)
            .filter(|url| !url.is_empty()))
    }

    /// Fill `image` from a lookup on the place name when it has none.
    pub async fn decorate_place(&self, mut place: Place) -> Place {
        if place.image.is_none() {
            place.image = self.lookup_photo(&place.name).await;
        }
        place
    }

    /// Decorate every place concurrently, keeping the input order.
    pub async fn decorate_places(&self, places: Vec<Place>) -> Vec<Place> {
        join_all(places.into_iter().map(|place| self.decorate_place(place))).await
    }

    /// Fill the trip card image from the destination name when it has none.
    pub async fn decorate_trip(&self, mut trip: Trip) -> Trip {
        if trip.card_image.is_none() {
            trip.card_image = self.lookup_photo(&trip.destination.name).await;
        }
        trip
    }
}
