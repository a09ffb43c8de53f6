//! Response assembly
//!
//! Merges the boundary, obstacles and monthly climate into the response
//! envelope. When the geocoder supplied no polygon the bounding box is turned
//! into one, so the envelope always carries a renderable boundary.

use tracing::debug;

use crate::models::{AnalysisResult, BoundingBox, Geometry, Location, MonthlyClimateAverage, Obstacles};

/// Closed rectangle over `bbox`: (west,south) → (east,south) → (east,north) → (west,north) → (west,south)
#[must_use]
pub fn fallback_boundary(bbox: &BoundingBox) -> Geometry {
    let ring = vec![
        vec![bbox.west, bbox.south],
        vec![bbox.east, bbox.south],
        vec![bbox.east, bbox.north],
        vec![bbox.west, bbox.north],
        vec![bbox.west, bbox.south],
    ];
    Geometry::Polygon {
        coordinates: vec![ring],
    }
}

/// Build the analysis envelope
#[must_use]
pub fn assemble(
    location: &Location,
    obstacles: Obstacles,
    weather: [MonthlyClimateAverage; 12],
) -> AnalysisResult {
    let boundary = match &location.boundary_geometry {
        Some(geometry) => geometry.clone(),
        None => {
            debug!("No provider boundary, using bounding box rectangle");
            fallback_boundary(&location.bounding_box)
        }
    };

    AnalysisResult {
        boundary,
        obstacles,
        weather,
    }
}
