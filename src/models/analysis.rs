//! The externally visible analysis envelope

use serde::{Deserialize, Serialize};

use super::{Geometry, MonthlyClimateAverage, Obstacles};

/// Everything known about a site: boundary, nearby obstacles and monthly climate
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AnalysisResult {
    pub boundary: Geometry,
    pub obstacles: Obstacles,
    /// Twelve entries, January to December
    pub weather: [MonthlyClimateAverage; 12],
}
