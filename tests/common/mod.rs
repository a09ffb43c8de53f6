//! Fake providers shared by the integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;

use solarsite::config::AnalysisConfig;
use solarsite::geocoding::Postcode;
use solarsite::models::{BoundingBox, DailySample, Geometry, Location};
use solarsite::{
    ClimateArchive, FeatureSource, Geocoder, LookbackWindow, Provider, SiteAnalyzer,
    SiteSurveyError, SpatialElement,
};

pub enum GeocodeOutcome {
    Found(Location),
    NoCandidates,
    Status(u16),
    Panic,
}

pub struct FakeGeocoder {
    outcome: GeocodeOutcome,
    pub calls: AtomicUsize,
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn resolve(&self, postcode: &Postcode) -> solarsite::Result<Location> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            GeocodeOutcome::Found(location) => Ok(location.clone()),
            GeocodeOutcome::NoCandidates => Err(SiteSurveyError::not_found(format!(
                "Postcode not found: {postcode}"
            ))),
            GeocodeOutcome::Status(status) => Err(SiteSurveyError::upstream_status(
                Provider::Nominatim,
                *status,
                "",
                None,
            )),
            GeocodeOutcome::Panic => panic!("geocoder crashed on {postcode}"),
        }
    }
}

pub struct FakeFeatures {
    outcome: Result<Vec<SpatialElement>, u16>,
    pub calls: AtomicUsize,
}

#[async_trait]
impl FeatureSource for FakeFeatures {
    async fn features_within(&self, _bbox: &BoundingBox) -> solarsite::Result<Vec<SpatialElement>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Ok(elements) => Ok(elements.clone()),
            Err(status) => Err(SiteSurveyError::upstream_status(
                Provider::Overpass,
                *status,
                "Service Unavailable",
                Some("rate limited".to_string()),
            )),
        }
    }
}

pub struct FakeArchive {
    outcome: Result<Vec<DailySample>, u16>,
    pub calls: AtomicUsize,
    pub last_window: Mutex<Option<LookbackWindow>>,
}

#[async_trait]
impl ClimateArchive for FakeArchive {
    async fn daily_samples(
        &self,
        _latitude: f64,
        _longitude: f64,
        window: LookbackWindow,
    ) -> solarsite::Result<Vec<DailySample>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_window.lock().unwrap() = Some(window);
        match &self.outcome {
            Ok(samples) => Ok(samples.clone()),
            Err(status) => Err(SiteSurveyError::upstream_status(
                Provider::OpenMeteo,
                *status,
                "Bad Gateway",
                None,
            )),
        }
    }
}

/// Three fakes wired into an analyzer
pub struct Harness {
    pub geocoder: Arc<FakeGeocoder>,
    pub features: Arc<FakeFeatures>,
    pub archive: Arc<FakeArchive>,
}

impl Harness {
    pub fn new(
        geocode: GeocodeOutcome,
        features: Result<Vec<SpatialElement>, u16>,
        archive: Result<Vec<DailySample>, u16>,
    ) -> Self {
        Self {
            geocoder: Arc::new(FakeGeocoder {
                outcome: geocode,
                calls: AtomicUsize::new(0),
            }),
            features: Arc::new(FakeFeatures {
                outcome: features,
                calls: AtomicUsize::new(0),
            }),
            archive: Arc::new(FakeArchive {
                outcome: archive,
                calls: AtomicUsize::new(0),
                last_window: Mutex::new(None),
            }),
        }
    }

    /// Everything succeeds with the standard fixtures
    pub fn healthy() -> Self {
        Self::new(
            GeocodeOutcome::Found(location(None)),
            Ok(elements()),
            Ok(march_series()),
        )
    }

    pub fn analyzer(&self) -> SiteAnalyzer {
        self.analyzer_with(&AnalysisConfig::default())
    }

    pub fn analyzer_with(&self, settings: &AnalysisConfig) -> SiteAnalyzer {
        SiteAnalyzer::new(
            self.geocoder.clone(),
            self.features.clone(),
            self.archive.clone(),
            settings,
        )
    }

    pub fn geocoder_calls(&self) -> usize {
        self.geocoder.calls.load(Ordering::SeqCst)
    }

    pub fn feature_calls(&self) -> usize {
        self.features.calls.load(Ordering::SeqCst)
    }

    pub fn archive_calls(&self) -> usize {
        self.archive.calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.geocoder_calls() + self.feature_calls() + self.archive_calls()
    }
}

pub fn location(boundary_geometry: Option<Geometry>) -> Location {
    Location {
        latitude: 51.501,
        longitude: -0.1416,
        bounding_box: BoundingBox::from_provider(&["51.496", "51.506", "-0.1466", "-0.1366"])
            .unwrap(),
        boundary_geometry,
        display_name: Some("SW1A 1AA, London".to_string()),
    }
}

pub fn element(lat: f64, lon: f64, tags: &[(&str, &str)]) -> SpatialElement {
    SpatialElement {
        lat: Some(lat),
        lon: Some(lon),
        center: None,
        tags: tags
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>(),
    }
}

pub fn elements() -> Vec<SpatialElement> {
    vec![
        element(51.5011, -0.1410, &[("building", "yes")]),
        element(51.5012, -0.1411, &[("natural", "tree")]),
        element(51.5013, -0.1412, &[("power", "pole")]),
        element(51.5014, -0.1413, &[("amenity", "post_box")]),
        element(51.5015, -0.1414, &[("building", "house"), ("natural", "tree")]),
    ]
}

/// Two Marches of data: temperatures 4 and 6, sunshine one hour a day
pub fn march_series() -> Vec<DailySample> {
    let mut samples = Vec::new();
    for (year, temp) in [(2022, 4.0), (2023, 6.0)] {
        for day in 1..=31 {
            samples.push(DailySample {
                date: NaiveDate::from_ymd_opt(year, 3, day).unwrap(),
                mean_temperature_c: Some(temp),
                precipitation_mm: Some(2.0),
                sunshine_seconds: Some(3600.0),
            });
        }
    }
    samples
}
