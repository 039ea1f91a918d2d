//! Error handling for the air-quality pipeline.
//!
//! Only configuration and I/O problems are errors. Data-quality issues
//! (unparseable cells, missing population, unmatched census rows) are
//! carried through the pipeline as missing values and counted instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Excel writer error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Failed to read workbook {path}: {reason}")]
    Workbook { path: PathBuf, reason: String },

    #[error("Sheet for station '{station}' not found in the pollution workbook")]
    SheetNotFound { station: String },

    #[error("Census sheet '{sheet}' not found")]
    CensusSheetNotFound { sheet: String },

    #[error("Census column '{column}' could not be located (label or position {index})")]
    CensusColumnMissing { column: String, index: usize },

    #[error("Station '{station}' has no district mapping")]
    StationNotMapped { station: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Invalid configuration file {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to write report {path}: {reason}")]
    Report { path: PathBuf, reason: String },
}

impl PipelineError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// True for errors caused by the supplied configuration or missing inputs
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::SheetNotFound { .. }
                | Self::CensusSheetNotFound { .. }
                | Self::CensusColumnMissing { .. }
                | Self::StationNotMapped { .. }
                | Self::Configuration { .. }
                | Self::ConfigParse { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
