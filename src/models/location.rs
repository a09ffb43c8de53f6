//! Location model: resolved point, bounding box and boundary geometry

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::SiteSurveyError;

/// A GeoJSON position, `[longitude, latitude]` with optional extra ordinates
pub type Position = Vec<f64>;

/// Boundary geometry in GeoJSON form
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum Geometry {
    /// A single polygon: outer ring followed by any holes
    Polygon { coordinates: Vec<Vec<Position>> },
    /// Several polygons
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
}

/// Axis-aligned region around a resolved location
///
/// The geocoding provider sends the four components as decimal strings in the
/// fixed order `[south, north, west, east]`. [`BoundingBox::from_provider`] is
/// the only place that order is interpreted.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Southern latitude
    pub south: f64,
    /// Northern latitude
    pub north: f64,
    /// Western longitude
    pub west: f64,
    /// Eastern longitude
    pub east: f64,
}

impl BoundingBox {
    /// Parse the provider's `[south, north, west, east]` string array
    pub fn from_provider<S: AsRef<str>>(components: &[S]) -> Result<Self> {
        let [south, north, west, east] = components else {
            return Err(SiteSurveyError::unknown(
                "Bounding box must have exactly four components",
                Some(format!("received {} components", components.len())),
            ));
        };

        Ok(Self {
            south: parse_component("south", south.as_ref())?,
            north: parse_component("north", north.as_ref())?,
            west: parse_component("west", west.as_ref())?,
            east: parse_component("east", east.as_ref())?,
        })
    }

    /// Components in Overpass order: `south,west,north,east`
    #[must_use]
    pub fn overpass_filter(&self) -> String {
        format!("{},{},{},{}", self.south, self.west, self.north, self.east)
    }
}

fn parse_component(name: &str, raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| {
            SiteSurveyError::unknown(
                format!("Bounding box {name} component is not a number"),
                Some(raw.to_string()),
            )
        })
}

/// Location resolved from a postcode
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Region surrounding the location
    pub bounding_box: BoundingBox,
    /// Boundary polygon, when the geocoder supplies one
    pub boundary_geometry: Option<Geometry>,
    /// Provider label for the match
    pub display_name: Option<String>,
}

impl Location {
    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}
