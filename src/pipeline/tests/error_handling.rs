//! Fatal configuration errors

use super::{two_district_census, two_station_config, two_station_pollution};
use crate::config::{CensusSettings, PipelineConfig};
use crate::error::PipelineError;
use crate::models::RawSheet;
use crate::pipeline::AirQualityPipeline;
use std::collections::BTreeMap;

#[test]
fn test_unmapped_station_fails_construction() {
    let config = two_station_config().with_stations(["A", "B", "C"]);
    match AirQualityPipeline::new(config).unwrap_err() {
        PipelineError::StationNotMapped { station } => assert_eq!(station, "C"),
        other => panic!("Expected StationNotMapped, got {other:?}"),
    }
}

#[test]
fn test_missing_station_sheet_is_fatal() {
    let mut pollution = two_station_pollution();
    pollution.remove("B");

    let err = AirQualityPipeline::new(two_station_config())
        .unwrap()
        .run(&mut pollution, &mut two_district_census())
        .unwrap_err();

    match err {
        PipelineError::SheetNotFound { station } => assert_eq!(station, "B"),
        other => panic!("Expected SheetNotFound, got {other:?}"),
    }
}

#[test]
fn test_missing_census_sheet_is_fatal() {
    let config = PipelineConfig {
        census: CensusSettings {
            sheet: Some("Απογραφή 2011".to_string()),
            ..CensusSettings::default()
        },
        ..two_station_config()
    };

    let err = AirQualityPipeline::new(config)
        .unwrap()
        .run(&mut two_station_pollution(), &mut two_district_census())
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::CensusSheetNotFound { ref sheet } if sheet == "Απογραφή 2011"
    ));
    assert!(err.is_configuration_error());
}

#[test]
fn test_empty_census_workbook_is_fatal() {
    let err = AirQualityPipeline::new(two_station_config())
        .unwrap()
        .run(&mut two_station_pollution(), &mut BTreeMap::<String, RawSheet>::new())
        .unwrap_err();
    assert!(matches!(err, PipelineError::CensusSheetNotFound { .. }));
}

#[test]
fn test_narrow_census_sheet_is_fatal() {
    let mut census = BTreeMap::new();
    census.insert(
        "Sheet1".to_string(),
        RawSheet::from_strs(&["Περιγραφή", "Πληθυσμός"], &[&["Δημοτική Κοινότητα 1ο", "1"]]),
    );

    let err = AirQualityPipeline::new(two_station_config())
        .unwrap()
        .run(&mut two_station_pollution(), &mut census)
        .unwrap_err();
    assert!(matches!(err, PipelineError::CensusColumnMissing { .. }));
}
