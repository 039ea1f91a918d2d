//! Scenario tests for the pipeline driver
//!
//! Runs the full stage sequence against in-memory workbooks.

pub mod error_handling;

use crate::config::{LimitTable, PipelineConfig, PollutantLimit, StationDistrictMap};
use crate::models::RawSheet;
use std::collections::BTreeMap;

/// Two stations in two districts with a single SO2 limit of 125
pub fn two_station_config() -> PipelineConfig {
    let mut districts = StationDistrictMap::new();
    districts.insert("A", "1ο Διαμέρισμα");
    districts.insert("B", "2ο Διαμέρισμα");

    let mut limits = LimitTable::new();
    limits.insert("SO2", PollutantLimit::micrograms(125.0));

    PipelineConfig::default()
        .with_stations(["A", "B"])
        .with_station_districts(districts)
        .with_limits(limits)
}

pub fn two_station_pollution() -> BTreeMap<String, RawSheet> {
    let mut sheets = BTreeMap::new();
    sheets.insert(
        "A".to_string(),
        RawSheet::from_strs(
            &["Ημερο -\nμηνία", "SO2\nμg/m3"],
            &[&["2010-01-01", "100"], &["2011-01-01", "150"]],
        ),
    );
    sheets.insert(
        "B".to_string(),
        RawSheet::from_strs(
            &["Ημερο -\nμηνία", "SO2\nμg/m3"],
            &[&["2010-01-01", "130"], &["2010-06-01", "140"]],
        ),
    );
    sheets
}

/// Census with D1 = 100000 and D2 listed without a usable population
pub fn two_district_census() -> BTreeMap<String, RawSheet> {
    let mut sheets = BTreeMap::new();
    sheets.insert(
        "Πληθυσμός".to_string(),
        RawSheet::from_strs(
            &["Κωδικός", "Επίπεδο", "Περιγραφή", "", ""],
            &[
                &["1", "Δήμος", "", "ΔΗΜΟΣ ΘΕΣΣΑΛΟΝΙΚΗΣ", "325182"],
                &["2", "ΔΚ", "", "Δημοτική Κοινότητα 1ο", "100000"],
                &["3", "ΔΚ", "", "Δημοτική Κοινότητα 2ο", "—"],
            ],
        ),
    );
    sheets
}
