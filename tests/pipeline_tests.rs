//! Pipeline tests against fake providers

mod common;

use chrono::NaiveDate;
use common::{GeocodeOutcome, Harness, element, location, march_series};
use solarsite::config::AnalysisConfig;
use solarsite::models::Geometry;
use solarsite::{Provider, SiteSurveyError};

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

#[tokio::test]
async fn blank_postcode_makes_no_provider_calls() {
    let harness = Harness::healthy();
    let analyzer = harness.analyzer();

    for postcode in ["", "   "] {
        let err = analyzer.analyze_as_of(postcode, as_of()).await.unwrap_err();
        assert!(matches!(err, SiteSurveyError::Validation { .. }));
    }
    assert_eq!(harness.total_calls(), 0);
}

#[tokio::test]
async fn zero_candidates_is_not_found_and_short_circuits() {
    let harness = Harness::new(GeocodeOutcome::NoCandidates, Ok(Vec::new()), Ok(Vec::new()));

    let err = harness
        .analyzer()
        .analyze_as_of("ZZ99 9ZZ", as_of())
        .await
        .unwrap_err();

    assert!(matches!(err, SiteSurveyError::NotFound { .. }));
    assert!(err.to_string().contains("ZZ99 9ZZ"));
    assert_eq!(harness.geocoder_calls(), 1);
    assert_eq!(harness.feature_calls(), 0);
    assert_eq!(harness.archive_calls(), 0);
}

#[tokio::test]
async fn geocoder_outage_is_upstream_not_not_found() {
    let harness = Harness::new(GeocodeOutcome::Status(502), Ok(Vec::new()), Ok(Vec::new()));

    let err = harness
        .analyzer()
        .analyze_as_of("SW1A 1AA", as_of())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SiteSurveyError::Upstream {
            provider: Provider::Nominatim,
            status: Some(502),
            ..
        }
    ));
    assert_eq!(harness.feature_calls(), 0);
}

#[tokio::test]
async fn overpass_failure_names_provider() {
    let harness = Harness::new(
        GeocodeOutcome::Found(location(None)),
        Err(503),
        Ok(march_series()),
    );

    let err = harness
        .analyzer()
        .analyze_as_of("SW1A 1AA", as_of())
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("Overpass"), "{message}");
    assert!(message.contains("503"), "{message}");
}

#[tokio::test]
async fn sequential_mode_skips_climate_after_obstacle_failure() {
    let harness = Harness::new(
        GeocodeOutcome::Found(location(None)),
        Err(503),
        Ok(march_series()),
    );
    let settings = AnalysisConfig {
        concurrent_stages: false,
        ..AnalysisConfig::default()
    };

    let result = harness
        .analyzer_with(&settings)
        .analyze_as_of("SW1A 1AA", as_of())
        .await;

    assert!(result.is_err());
    assert_eq!(harness.feature_calls(), 1);
    assert_eq!(harness.archive_calls(), 0);
}

#[tokio::test]
async fn climate_failure_fails_whole_request() {
    let harness = Harness::new(GeocodeOutcome::Found(location(None)), Ok(Vec::new()), Err(502));

    let err = harness
        .analyzer()
        .analyze_as_of("SW1A 1AA", as_of())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Open-Meteo"));
}

#[tokio::test]
async fn successful_analysis_assembles_envelope() {
    let harness = Harness::healthy();

    let result = harness
        .analyzer()
        .analyze_as_of(" SW1A 1AA ", as_of())
        .await
        .unwrap();

    assert_eq!(result.obstacles.buildings.len(), 2);
    assert_eq!(result.obstacles.trees.len(), 1);
    assert_eq!(result.obstacles.poles.len(), 1);

    assert_eq!(result.weather.len(), 12);
    let march = &result.weather[2];
    assert_eq!(march.month_name, "March");
    assert_eq!(march.mean_temperature_c, 5.0);
    assert_eq!(march.mean_precipitation_mm, 2.0);
    assert_eq!(march.mean_sunshine_hours, 1.0);
    assert_eq!(result.weather[0].mean_temperature_c, 0.0);
    assert_eq!(result.weather[0].sample_counts.temperature, 0);

    let Geometry::Polygon { coordinates } = &result.boundary else {
        panic!("expected fallback polygon");
    };
    assert_eq!(coordinates[0][0], vec![-0.1466, 51.496]);
    assert_eq!(coordinates[0].len(), 5);
}

#[tokio::test]
async fn archive_receives_five_year_window() {
    let harness = Harness::healthy();

    harness
        .analyzer()
        .analyze_as_of("SW1A 1AA", as_of())
        .await
        .unwrap();

    let window = harness.archive.last_window.lock().unwrap().unwrap();
    assert_eq!(window.start, NaiveDate::from_ymd_opt(2019, 6, 15).unwrap());
    assert_eq!(window.end, as_of());
}

#[tokio::test]
async fn provider_boundary_is_used_when_present() {
    let polygon = Geometry::Polygon {
        coordinates: vec![vec![
            vec![-0.14, 51.50],
            vec![-0.13, 51.50],
            vec![-0.13, 51.51],
            vec![-0.14, 51.50],
        ]],
    };
    let harness = Harness::new(
        GeocodeOutcome::Found(location(Some(polygon.clone()))),
        Ok(Vec::new()),
        Ok(Vec::new()),
    );

    let result = harness
        .analyzer()
        .analyze_as_of("SW1A 1AA", as_of())
        .await
        .unwrap();

    assert_eq!(result.boundary, polygon);
    assert!(result.obstacles.is_empty());
}

#[tokio::test]
async fn obstacle_limit_comes_from_settings() {
    let trees = (0..10)
        .map(|i| element(51.5 + f64::from(i) * 0.001, -0.14, &[("natural", "tree")]))
        .collect();
    let harness = Harness::new(
        GeocodeOutcome::Found(location(None)),
        Ok(trees),
        Ok(Vec::new()),
    );
    let settings = AnalysisConfig {
        obstacle_limit: 3,
        ..AnalysisConfig::default()
    };

    let result = harness
        .analyzer_with(&settings)
        .analyze_as_of("SW1A 1AA", as_of())
        .await
        .unwrap();

    assert_eq!(result.obstacles.trees.len(), 3);
    assert_eq!(result.obstacles.trees[0].latitude, 51.5);
}
