//! Historical climate aggregation
//!
//! Fetches a multi-year daily series from a climate archive and reduces it to
//! one average per calendar month, pooling every year in the window.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, Months, NaiveDate};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::models::{DailySample, MONTH_NAMES, MonthlyClimateAverage, SampleCounts};
use crate::upstream::{self, Provider};
use crate::{Result, SiteSurveyError};

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Daily variables requested from the archive
const DAILY_VARIABLES: &str = "temperature_2m_mean,precipitation_sum,sunshine_duration";

/// Inclusive date range the archive is queried over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookbackWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl LookbackWindow {
    /// `[as_of - years, as_of]` by calendar subtraction.
    /// February 29 lands on February 28 when the start year is not a leap year.
    pub fn ending(as_of: NaiveDate, years: u32) -> Result<Self> {
        let start = years
            .checked_mul(12)
            .and_then(|months| as_of.checked_sub_months(Months::new(months)))
            .ok_or_else(|| {
                SiteSurveyError::unknown(
                    format!("Cannot look back {years} years from {as_of}"),
                    None,
                )
            })?;
        Ok(Self { start, end: as_of })
    }
}

/// Running mean of the non-null values seen for one field
#[derive(Debug, Clone, Copy, Default)]
struct RunningMean {
    sum: f64,
    count: usize,
}

impl RunningMean {
    fn push(&mut self, value: Option<f64>) {
        if let Some(value) = value {
            self.sum += value;
            self.count += 1;
        }
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct MonthBucket {
    temperature: RunningMean,
    precipitation: RunningMean,
    sunshine_hours: RunningMean,
}

/// Reduce daily samples to twelve calendar-month averages, January first.
/// A field with no samples in a month reports 0.
#[must_use]
pub fn monthly_averages(samples: &[DailySample]) -> [MonthlyClimateAverage; 12] {
    let mut buckets = [MonthBucket::default(); 12];

    for sample in samples {
        let bucket = &mut buckets[sample.date.month0() as usize];
        bucket.temperature.push(sample.mean_temperature_c);
        bucket.precipitation.push(sample.precipitation_mm);
        bucket
            .sunshine_hours
            .push(sample.sunshine_seconds.map(|seconds| seconds / SECONDS_PER_HOUR));
    }

    std::array::from_fn(|month| {
        let bucket = &buckets[month];
        MonthlyClimateAverage {
            month_name: MONTH_NAMES[month].to_string(),
            mean_temperature_c: bucket.temperature.mean(),
            mean_precipitation_mm: bucket.precipitation.mean(),
            mean_sunshine_hours: bucket.sunshine_hours.mean(),
            sample_counts: SampleCounts {
                temperature: bucket.temperature.count,
                precipitation: bucket.precipitation.count,
                sunshine: bucket.sunshine_hours.count,
            },
        }
    })
}

/// Source of daily climate records for a point
#[async_trait]
pub trait ClimateArchive: Send + Sync {
    async fn daily_samples(
        &self,
        latitude: f64,
        longitude: f64,
        window: LookbackWindow,
    ) -> Result<Vec<DailySample>>;
}

/// Open-Meteo archive API response structures
mod open_meteo {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct ArchiveResponse {
        pub daily: Option<DailyData>,
    }

    /// Index-aligned daily arrays
    #[derive(Debug, Default, Deserialize)]
    pub struct DailyData {
        #[serde(default)]
        pub time: Vec<String>,
        #[serde(rename = "temperature_2m_mean")]
        pub temperature_mean: Option<Vec<Option<f64>>>,
        #[serde(rename = "precipitation_sum")]
        pub precipitation: Option<Vec<Option<f64>>>,
        #[serde(rename = "sunshine_duration")]
        pub sunshine: Option<Vec<Option<f64>>>,
    }

    fn value_at(values: &Option<Vec<Option<f64>>>, index: usize) -> Option<f64> {
        values.as_ref().and_then(|v| v.get(index).copied().flatten())
    }

    impl DailyData {
        /// Zip the arrays by day; an index missing from a field array is null for that field only
        pub fn into_samples(self) -> Result<Vec<DailySample>> {
            self.time
                .iter()
                .enumerate()
                .map(|(i, day)| {
                    let date = NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|e| {
                        SiteSurveyError::malformed(Provider::OpenMeteo, format!("invalid date '{day}': {e}"))
                    })?;
                    Ok(DailySample {
                        date,
                        mean_temperature_c: value_at(&self.temperature_mean, i),
                        precipitation_mm: value_at(&self.precipitation, i),
                        sunshine_seconds: value_at(&self.sunshine, i),
                    })
                })
                .collect()
        }
    }
}

/// Climate archive backed by an Open-Meteo-compatible endpoint
pub struct OpenMeteoArchive {
    client: Client,
    base_url: String,
}

impl OpenMeteoArchive {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn archive_url(&self, latitude: f64, longitude: f64, window: LookbackWindow) -> String {
        format!(
            "{}?latitude={}&longitude={}&start_date={}&end_date={}&daily={}&timezone=auto",
            self.base_url,
            latitude,
            longitude,
            window.start.format("%Y-%m-%d"),
            window.end.format("%Y-%m-%d"),
            DAILY_VARIABLES
        )
    }
}

#[async_trait]
impl ClimateArchive for OpenMeteoArchive {
    #[instrument(name = "climate_archive", skip(self))]
    async fn daily_samples(
        &self,
        latitude: f64,
        longitude: f64,
        window: LookbackWindow,
    ) -> Result<Vec<DailySample>> {
        let url = self.archive_url(latitude, longitude, window);
        debug!("Open-Meteo archive request URL: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SiteSurveyError::upstream_transport(Provider::OpenMeteo, e))?;
        let response = upstream::ensure_success(Provider::OpenMeteo, response).await?;
        let payload: open_meteo::ArchiveResponse =
            upstream::read_json(Provider::OpenMeteo, response).await?;

        payload.daily.unwrap_or_default().into_samples()
    }
}

/// Produces monthly climate averages for a point
pub struct ClimateAggregator {
    archive: Arc<dyn ClimateArchive>,
    lookback_years: u32,
}

impl ClimateAggregator {
    pub fn new(archive: Arc<dyn ClimateArchive>, lookback_years: u32) -> Self {
        Self {
            archive,
            lookback_years,
        }
    }

    pub async fn aggregate(
        &self,
        latitude: f64,
        longitude: f64,
        as_of: NaiveDate,
    ) -> Result<[MonthlyClimateAverage; 12]> {
        let window = LookbackWindow::ending(as_of, self.lookback_years)?;
        let samples = self.archive.daily_samples(latitude, longitude, window).await?;
        info!(
            "Aggregating {} daily samples from {} to {}",
            samples.len(),
            window.start,
            window.end
        );
        Ok(monthly_averages(&samples))
    }
}
