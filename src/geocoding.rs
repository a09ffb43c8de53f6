//! Postcode geocoding
//!
//! Resolves a UK postcode into a point, a bounding box and, when the provider
//! has one, a boundary polygon.

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::models::{BoundingBox, Geometry, Location};
use crate::upstream::{self, Provider};
use crate::{Result, SiteSurveyError};

/// Country scope appended to every lookup
const COUNTRY_SCOPE: &str = "UK";

/// A postcode that is non-empty after trimming
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Postcode(String);

impl Postcode {
    /// Validate raw user input
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SiteSurveyError::validation("Postcode is required"));
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Free-text search query scoped to the UK
    #[must_use]
    pub fn search_query(&self) -> String {
        format!("{}, {COUNTRY_SCOPE}", self.0)
    }
}

impl fmt::Display for Postcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolves postcodes to locations
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn resolve(&self, postcode: &Postcode) -> Result<Location>;
}

/// Nominatim search result
#[derive(Debug, Deserialize)]
pub struct NominatimPlace {
    pub lat: String,
    pub lon: String,
    /// `[south, north, west, east]` as decimal strings
    pub boundingbox: Vec<String>,
    pub geojson: Option<serde_json::Value>,
    pub display_name: Option<String>,
}

/// Geocoder backed by a Nominatim-compatible search endpoint
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn search_url(&self, postcode: &Postcode) -> String {
        format!(
            "{}?q={}&format=json&polygon_geojson=1&limit=1",
            self.base_url,
            urlencoding::encode(&postcode.search_query())
        )
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    #[instrument(name = "geocode", skip(self, postcode), fields(postcode = %postcode))]
    async fn resolve(&self, postcode: &Postcode) -> Result<Location> {
        let url = self.search_url(postcode);
        debug!("Nominatim request URL: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SiteSurveyError::upstream_transport(Provider::Nominatim, e))?;
        let response = upstream::ensure_success(Provider::Nominatim, response).await?;
        let places: Vec<NominatimPlace> = upstream::read_json(Provider::Nominatim, response).await?;

        let location = location_from_candidates(postcode, places)?;
        info!(
            "Resolved postcode {} to ({}) with {} boundary",
            postcode,
            location.format_coordinates(),
            if location.boundary_geometry.is_some() { "provider" } else { "no" }
        );
        Ok(location)
    }
}

/// Build a location from the provider's candidate list, using the first match
pub fn location_from_candidates(postcode: &Postcode, places: Vec<NominatimPlace>) -> Result<Location> {
    let Some(place) = places.into_iter().next() else {
        warn!("No geocoding candidates for postcode {}", postcode);
        return Err(SiteSurveyError::not_found(format!(
            "Postcode not found: {postcode}"
        )));
    };

    let latitude = parse_coordinate("lat", &place.lat)?;
    let longitude = parse_coordinate("lon", &place.lon)?;
    let bounding_box = BoundingBox::from_provider(&place.boundingbox)?;
    let boundary_geometry = place.geojson.and_then(polygon_geometry);

    Ok(Location {
        latitude,
        longitude,
        bounding_box,
        boundary_geometry,
        display_name: place.display_name,
    })
}

fn parse_coordinate(field: &str, raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| {
            SiteSurveyError::malformed(Provider::Nominatim, format!("invalid {field} '{raw}'"))
        })
}

/// Keep polygonal geometry only; points and lines leave the boundary unset
fn polygon_geometry(value: serde_json::Value) -> Option<Geometry> {
    match serde_json::from_value::<Geometry>(value) {
        Ok(geometry) => Some(geometry),
        Err(e) => {
            debug!("Ignoring non-polygon geocoder geometry: {}", e);
            None
        }
    }
}
