//! Data models for the solarsite pipeline
//!
//! This module contains the core domain models organized by concern:
//! - Location: Resolved point, bounding box and boundary geometry
//! - Obstacle: Classified physical obstacles near a site
//! - Climate: Daily archive samples and monthly averages
//! - Analysis: The assembled response envelope

pub mod analysis;
pub mod climate;
pub mod location;
pub mod obstacle;

// Re-export all public types for convenient access
pub use analysis::AnalysisResult;
pub use climate::{DailySample, MONTH_NAMES, MonthlyClimateAverage, SampleCounts};
pub use location::{BoundingBox, Geometry, Location, Position};
pub use obstacle::{ObstacleCategory, ObstacleFeature, Obstacles};
