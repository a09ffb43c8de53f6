//! Obstacle features found around a site

use serde::{Deserialize, Serialize};

/// Kind of physical obstacle
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ObstacleCategory {
    Building,
    Tree,
    Pole,
}

/// A single classified obstacle
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ObstacleFeature {
    pub category: ObstacleCategory,
    pub latitude: f64,
    pub longitude: f64,
}

/// Obstacles grouped by category, each list in provider order
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Obstacles {
    pub buildings: Vec<ObstacleFeature>,
    pub trees: Vec<ObstacleFeature>,
    pub poles: Vec<ObstacleFeature>,
}

impl Obstacles {
    /// Append `feature` to its category list unless that list already holds `limit` entries.
    /// Returns whether the feature was kept.
    pub fn push_capped(&mut self, feature: ObstacleFeature, limit: usize) -> bool {
        let list = match feature.category {
            ObstacleCategory::Building => &mut self.buildings,
            ObstacleCategory::Tree => &mut self.trees,
            ObstacleCategory::Pole => &mut self.poles,
        };
        if list.len() >= limit {
            return false;
        }
        list.push(feature);
        true
    }

    /// Total number of features across all categories
    #[must_use]
    pub fn len(&self) -> usize {
        self.buildings.len() + self.trees.len() + self.poles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
