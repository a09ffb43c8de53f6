//! `solarsite` - Rooftop solar site survey for UK postcodes
//!
//! This library resolves a postcode, collects nearby obstacles (buildings,
//! trees, utility poles) and summarizes five years of climate history into
//! monthly averages, serving the combined report over HTTP.

pub mod analysis;
pub mod api;
pub mod assembler;
pub mod climate;
pub mod config;
pub mod error;
pub mod geocoding;
pub mod logging;
pub mod models;
pub mod obstacles;
pub mod upstream;
pub mod web;

// Re-export core types for public API
pub use analysis::SiteAnalyzer;
pub use climate::{ClimateAggregator, ClimateArchive, LookbackWindow, OpenMeteoArchive};
pub use config::SiteSurveyConfig;
pub use error::SiteSurveyError;
pub use geocoding::{Geocoder, NominatimGeocoder, Postcode};
pub use models::{AnalysisResult, Location, MonthlyClimateAverage, ObstacleCategory, Obstacles};
pub use obstacles::{FeatureSource, ObstacleCollector, OverpassSource, SpatialElement};
pub use upstream::Provider;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, SiteSurveyError>;
