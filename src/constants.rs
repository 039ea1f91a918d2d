//! Application constants for the air-quality processor
//!
//! This module contains the default study configuration (the Thessaloniki
//! municipal monitoring network and the 2011 census layout), column naming
//! conventions and report layout names used throughout the pipeline.

// =============================================================================
// Monitoring Network
// =============================================================================

/// Station sheet names of the municipal monitoring network, in report order
pub const DEFAULT_STATIONS: &[&str] = &[
    "Στ. ΕΓΝΑΤΙΑΣ",
    "Στ. 25ης ΜΑΡΤΙΟΥ",
    "Στ. ΛΑΓΚΑΔΑ",
    "Στ. ΕΠΤΑΠΥΡΓΙΟΥ",
    "Στ. ΜΑΛΑΚΟΠΗΣ",
    "Στ. ΝΕΟΥ ΔΗΜΑΡΧΕΙΟΥ",
];

/// Station → municipal district assignment
pub const DEFAULT_STATION_DISTRICTS: &[(&str, &str)] = &[
    ("Στ. ΕΓΝΑΤΙΑΣ", "1ο Διαμέρισμα"),
    ("Στ. ΛΑΓΚΑΔΑ", "2ο Διαμέρισμα"),
    ("Στ. ΕΠΤΑΠΥΡΓΙΟΥ", "3ο Διαμέρισμα"),
    ("Στ. 25ης ΜΑΡΤΙΟΥ", "4ο Διαμέρισμα"),
    ("Στ. ΜΑΛΑΚΟΠΗΣ", "4ο Διαμέρισμα"),
    ("Στ. ΝΕΟΥ ΔΗΜΑΡΧΕΙΟΥ", "5ο Διαμέρισμα"),
];

// =============================================================================
// Regulatory Limits
// =============================================================================

/// EU/WHO annual limit values
pub mod limits {
    /// Limits expressed in μg/m³
    pub const MICROGRAM_LIMITS: &[(&str, f64)] = &[
        ("SO2", 125.0),
        ("NO2", 40.0),
        ("NO", 100.0),
        ("O3", 120.0),
        ("PM10", 40.0),
        ("PM2.5", 25.0),
    ];

    /// Limits expressed in mg/m³ (carbon monoxide is reported on this scale)
    pub const MILLIGRAM_LIMITS: &[(&str, f64)] = &[("CO", 10.0)];
}

// =============================================================================
// Column Conventions
// =============================================================================

/// Reserved column carrying the station identity on every station table row
pub const STATION_COLUMN: &str = "_station";

/// Year column added for per-year aggregation
pub const YEAR_COLUMN: &str = "_year";

/// Known typographic variants in the source workbooks (raw → canonical)
pub const DEFAULT_LABEL_VARIANTS: &[(&str, &str)] = &[("Ημερο -", "Ημερο-"), ("PM2,5", "PM2.5")];

/// Substring patterns selecting pollutant columns, evaluated in order.
/// "NO" also catches NO2 columns; they are told apart by exact label later.
pub const DEFAULT_POLLUTANT_PATTERNS: &[&str] = &["SO2", "PM10", "PM2.5", "CO", "NO", "O3"];

/// Unit suffixes stripped from pollutant column labels
pub const DEFAULT_UNIT_TOKENS: &[&str] = &["μg/m3", "mg/m3"];

/// Substring identifying the measurement date column
pub const DEFAULT_DATE_COLUMN_MARKER: &str = "Ημερο";

/// Prefix given to header cells that carry no label
pub const UNNAMED_COLUMN_PREFIX: &str = "Unnamed: ";

// =============================================================================
// Census Layout
// =============================================================================

pub mod census {
    /// Label of the district-name column (blank header at position 3)
    pub const NAME_COLUMN: &str = "Unnamed: 3";

    /// Label of the resident-population column (blank header at position 4)
    pub const POPULATION_COLUMN: &str = "Unnamed: 4";

    /// Positional fallbacks when the labels are absent
    pub const NAME_COLUMN_INDEX: usize = 3;
    pub const POPULATION_COLUMN_INDEX: usize = 4;

    /// Phrase every municipal-community row starts with
    pub const DISTRICT_MARKER: &str = "Δημοτική Κοινότητα";

    /// Suffix appended to the ordinal numeral to build a district key
    pub const DISTRICT_KEY_SUFFIX: &str = "ο Διαμέρισμα";
}

// =============================================================================
// Report Layout
// =============================================================================

pub mod report {
    pub const DEFAULT_OUTPUT_DIR: &str = "output";
    pub const DEFAULT_WORKBOOK_NAME: &str = "atmospheric_analysis_thessaloniki.xlsx";

    pub const MAPPING_SHEET: &str = "Mapping";
    pub const YEARLY_SHEET: &str = "Yearly Means";
    pub const RESULTS_SHEET: &str = "Overall & Per Capita";
    pub const CHARTS_SHEET: &str = "Charts";

    pub const MAPPING_CSV: &str = "mapping.csv";
    pub const YEARLY_CSV: &str = "yearly_means.csv";
    pub const RESULTS_CSV: &str = "results.csv";

    /// Bar colours keyed by compliance outcome
    pub const EXCEEDS_COLOR: &str = "#C0392B";
    pub const WITHIN_COLOR: &str = "#27AE60";
    pub const PER_CAPITA_COLOR: &str = "#4169E1";

    /// Rows reserved per chart block on the charts sheet
    pub const CHART_BLOCK_ROWS: u32 = 18;
}

/// Column names of the exported tables
pub mod columns {
    pub const STATION: &str = "station";
    pub const DISTRICT: &str = "district";
    pub const POLLUTANT: &str = "pollutant";
    pub const YEAR: &str = "year";
    pub const MEAN_VALUE: &str = "mean_value";
    pub const POPULATION: &str = "population";
    pub const PER_CAPITA: &str = "per_capita";
    pub const STATUS: &str = "status";
}

/// Build the district key for a census ordinal, e.g. `3` → `"3ο Διαμέρισμα"`
pub fn district_key(ordinal: u32) -> String {
    format!("{}{}", ordinal, census::DISTRICT_KEY_SUFFIX)
}
