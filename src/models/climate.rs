//! Climate models: raw daily samples and per-month averages

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Calendar month names, January first
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// One day of archive data. `None` means the provider had no value for that field.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DailySample {
    pub date: NaiveDate,
    /// Daily mean temperature in Celsius
    pub mean_temperature_c: Option<f64>,
    /// Daily precipitation total in mm
    pub precipitation_mm: Option<f64>,
    /// Daily sunshine duration in seconds
    pub sunshine_seconds: Option<f64>,
}

/// Number of non-null samples behind each monthly mean
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleCounts {
    pub temperature: usize,
    pub precipitation: usize,
    pub sunshine: usize,
}

/// Average climate for one calendar month, pooled across every year in the window
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyClimateAverage {
    pub month_name: String,
    /// Mean of daily mean temperatures in Celsius; 0 without samples
    pub mean_temperature_c: f64,
    /// Mean daily precipitation in mm; 0 without samples
    pub mean_precipitation_mm: f64,
    /// Mean daily sunshine in hours; 0 without samples
    pub mean_sunshine_hours: f64,
    pub sample_counts: SampleCounts,
}
