//! Air-Quality Processor Library
//!
//! Turns municipal air-quality measurement workbooks and a census table into
//! a per-district compliance report.
//!
//! This library provides tools for:
//! - Normalizing messy spreadsheet column labels
//! - Loading one measurement table per monitoring station
//! - Aggregating pollutant columns into overall and per-year means
//! - Reducing a census sheet to one population figure per district
//! - Joining means with districts and deriving per-capita pollution
//! - Classifying every pollutant/district pair against its regulatory limit
//! - Writing an Excel report with charts, plus optional CSV tables

pub mod aggregate;
pub mod columns;
pub mod compliance;
pub mod config;
pub mod constants;
pub mod error;
pub mod loader;
pub mod merge;
pub mod models;
pub mod pipeline;
pub mod population;
pub mod report;
pub mod workbook;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use config::{LimitTable, PipelineConfig, PollutantLimit, StationDistrictMap};
pub use error::{PipelineError, Result};
pub use loader::SheetSource;
pub use models::{ClassifiedRecord, ComplianceStatus, MergedRecord, PipelineStats, RawSheet};
pub use pipeline::{AirQualityPipeline, PipelineOutput};
pub use report::ReportWriter;
pub use workbook::ExcelWorkbook;
