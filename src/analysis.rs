//! Site analysis pipeline
//!
//! Geocoder → {ObstacleCollector, ClimateAggregator} → assembler. The two
//! middle stages depend only on the resolved location and run concurrently
//! unless configured otherwise. The first failure aborts the request; no
//! partial result is ever returned.

use std::sync::Arc;
use std::time::Instant;

use chrono::{NaiveDate, Utc};
use tracing::{info, instrument, warn};

use crate::Result;
use crate::assembler::assemble;
use crate::climate::{ClimateAggregator, ClimateArchive, OpenMeteoArchive};
use crate::config::{AnalysisConfig, SiteSurveyConfig};
use crate::geocoding::{Geocoder, NominatimGeocoder, Postcode};
use crate::models::AnalysisResult;
use crate::obstacles::{FeatureSource, ObstacleCollector, OverpassSource};
use crate::upstream;

/// Runs the full analysis for a postcode
pub struct SiteAnalyzer {
    geocoder: Arc<dyn Geocoder>,
    obstacles: ObstacleCollector,
    climate: ClimateAggregator,
    concurrent_stages: bool,
}

impl SiteAnalyzer {
    /// Assemble an analyzer from explicit providers
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        features: Arc<dyn FeatureSource>,
        archive: Arc<dyn ClimateArchive>,
        settings: &AnalysisConfig,
    ) -> Self {
        Self {
            geocoder,
            obstacles: ObstacleCollector::new(features, settings.obstacle_limit),
            climate: ClimateAggregator::new(archive, settings.lookback_years),
            concurrent_stages: settings.concurrent_stages,
        }
    }

    /// Build the HTTP-backed analyzer described by `config`
    pub fn from_config(config: &SiteSurveyConfig) -> Result<Self> {
        let providers = &config.providers;
        let client = upstream::http_client(providers)?;

        let geocoder = NominatimGeocoder::new(client.clone(), providers.geocoding_url.clone());
        let features = OverpassSource::new(
            client.clone(),
            providers.overpass_url.clone(),
            providers.overpass_timeout_seconds,
        );
        let archive = OpenMeteoArchive::new(client, providers.climate_archive_url.clone());

        Ok(Self::new(
            Arc::new(geocoder),
            Arc::new(features),
            Arc::new(archive),
            &config.analysis,
        ))
    }

    /// Analyze a postcode with the lookback window ending today
    pub async fn analyze(&self, postcode: &str) -> Result<AnalysisResult> {
        self.analyze_as_of(postcode, Utc::now().date_naive()).await
    }

    /// Analyze a postcode with the lookback window ending at `as_of`
    #[instrument(name = "analyze", skip(self))]
    pub async fn analyze_as_of(&self, postcode: &str, as_of: NaiveDate) -> Result<AnalysisResult> {
        let start = Instant::now();
        let postcode = Postcode::parse(postcode)?;
        let location = self.geocoder.resolve(&postcode).await?;

        let obstacles = self.obstacles.collect(&location.bounding_box);
        let weather = self
            .climate
            .aggregate(location.latitude, location.longitude, as_of);

        let (obstacles, weather) = if self.concurrent_stages {
            futures::try_join!(obstacles, weather)?
        } else {
            (obstacles.await?, weather.await?)
        };

        let result = assemble(&location, obstacles, weather);

        let elapsed = start.elapsed();
        info!(
            "Analysis for {} finished in {:.3}s",
            postcode,
            elapsed.as_secs_f64()
        );
        if elapsed.as_secs() > 30 {
            warn!("Slow analysis detected: {:.3}s", elapsed.as_secs_f64());
        }

        Ok(result)
    }
}
