//! Obstacle discovery
//!
//! Queries a spatial-feature provider for buildings, trees and utility poles
//! inside a bounding box and sorts the raw elements into obstacle categories.
//! The classification table below drives both the provider query and the
//! classifier, so the two always agree on what is asked for.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::models::{BoundingBox, ObstacleCategory, ObstacleFeature, Obstacles};
use crate::upstream::{self, Provider};
use crate::{Result, SiteSurveyError};

/// Tag condition an element must satisfy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagPredicate {
    /// Tag present with any value
    Present(&'static str),
    /// Tag present with exactly this value
    Equals(&'static str, &'static str),
}

impl TagPredicate {
    #[must_use]
    pub fn matches(&self, tags: &HashMap<String, String>) -> bool {
        match self {
            TagPredicate::Present(key) => tags.contains_key(*key),
            TagPredicate::Equals(key, value) => tags.get(*key).is_some_and(|v| v == value),
        }
    }

    /// Overpass QL tag filter, e.g. `["natural"="tree"]`
    #[must_use]
    pub fn overpass_filter(&self) -> String {
        match self {
            TagPredicate::Present(key) => format!("[\"{key}\"]"),
            TagPredicate::Equals(key, value) => format!("[\"{key}\"=\"{value}\"]"),
        }
    }
}

/// One entry of the ordered classification table
#[derive(Debug, Clone, Copy)]
pub struct ClassificationRule {
    pub predicate: TagPredicate,
    pub category: ObstacleCategory,
}

/// Evaluated top to bottom; the first matching rule decides the category
pub const CLASSIFICATION_RULES: [ClassificationRule; 3] = [
    ClassificationRule {
        predicate: TagPredicate::Present("building"),
        category: ObstacleCategory::Building,
    },
    ClassificationRule {
        predicate: TagPredicate::Equals("natural", "tree"),
        category: ObstacleCategory::Tree,
    },
    ClassificationRule {
        predicate: TagPredicate::Equals("power", "pole"),
        category: ObstacleCategory::Pole,
    },
];

/// Category of the first rule matching `tags`, if any
#[must_use]
pub fn classify(tags: &HashMap<String, String>) -> Option<ObstacleCategory> {
    CLASSIFICATION_RULES
        .iter()
        .find(|rule| rule.predicate.matches(tags))
        .map(|rule| rule.category)
}

/// Center point Overpass reports for ways and relations
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct ElementCenter {
    pub lat: f64,
    pub lon: f64,
}

/// Raw element as returned by an Overpass-compatible provider
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct SpatialElement {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub center: Option<ElementCenter>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl SpatialElement {
    /// Direct point coordinates, else the area center
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        if let (Some(lat), Some(lon)) = (self.lat, self.lon) {
            return Some((lat, lon));
        }
        self.center.map(|center| (center.lat, center.lon))
    }
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<SpatialElement>,
}

/// Build the composite Overpass query for every classification rule
#[must_use]
pub fn build_query(bbox: &BoundingBox, timeout_seconds: u32) -> String {
    let area = bbox.overpass_filter();
    let statements: String = CLASSIFICATION_RULES
        .iter()
        .map(|rule| format!("  nwr{}({area});\n", rule.predicate.overpass_filter()))
        .collect();
    format!("[out:json][timeout:{timeout_seconds}];\n(\n{statements});\nout center;")
}

/// Classify elements in provider order, keeping at most `limit` per category
#[must_use]
pub fn classify_elements(elements: Vec<SpatialElement>, limit: usize) -> Obstacles {
    let mut obstacles = Obstacles::default();
    let mut unlocated = 0usize;
    let mut unclassified = 0usize;

    for element in elements {
        let Some((latitude, longitude)) = element.coordinates() else {
            unlocated += 1;
            continue;
        };
        let Some(category) = classify(&element.tags) else {
            unclassified += 1;
            continue;
        };
        obstacles.push_capped(
            ObstacleFeature {
                category,
                latitude,
                longitude,
            },
            limit,
        );
    }

    debug!(
        unlocated,
        unclassified,
        buildings = obstacles.buildings.len(),
        trees = obstacles.trees.len(),
        poles = obstacles.poles.len(),
        "classified spatial elements"
    );
    obstacles
}

/// Source of raw spatial elements inside a bounding box
#[async_trait]
pub trait FeatureSource: Send + Sync {
    async fn features_within(&self, bbox: &BoundingBox) -> Result<Vec<SpatialElement>>;
}

/// Feature source backed by an Overpass-compatible interpreter endpoint
pub struct OverpassSource {
    client: Client,
    url: String,
    timeout_seconds: u32,
}

impl OverpassSource {
    pub fn new(client: Client, url: impl Into<String>, timeout_seconds: u32) -> Self {
        Self {
            client,
            url: url.into(),
            timeout_seconds,
        }
    }
}

#[async_trait]
impl FeatureSource for OverpassSource {
    #[instrument(name = "overpass_query", skip(self))]
    async fn features_within(&self, bbox: &BoundingBox) -> Result<Vec<SpatialElement>> {
        let query = build_query(bbox, self.timeout_seconds);
        debug!("Overpass query:\n{}", query);

        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "text/plain")
            .body(query)
            .send()
            .await
            .map_err(|e| SiteSurveyError::upstream_transport(Provider::Overpass, e))?;
        let response = upstream::ensure_success(Provider::Overpass, response).await?;
        let payload: OverpassResponse = upstream::read_json(Provider::Overpass, response).await?;

        debug!("Overpass returned {} elements", payload.elements.len());
        Ok(payload.elements)
    }
}

/// Collects classified obstacles around a site
pub struct ObstacleCollector {
    source: Arc<dyn FeatureSource>,
    limit: usize,
}

impl ObstacleCollector {
    pub fn new(source: Arc<dyn FeatureSource>, limit: usize) -> Self {
        Self { source, limit }
    }

    pub async fn collect(&self, bbox: &BoundingBox) -> Result<Obstacles> {
        let elements = self.source.features_within(bbox).await?;
        let total = elements.len();
        let obstacles = classify_elements(elements, self.limit);
        info!(
            "Collected {} obstacles from {} elements ({} buildings, {} trees, {} poles)",
            obstacles.len(),
            total,
            obstacles.buildings.len(),
            obstacles.trees.len(),
            obstacles.poles.len()
        );
        Ok(obstacles)
    }
}
