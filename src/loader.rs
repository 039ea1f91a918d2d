//! Sheet sources and the station table loader.
//!
//! A `SheetSource` hands out raw worksheets by name. The loader turns the
//! configured station sheets into normalized polars frames tagged with the
//! station they came from.

use crate::columns::normalize_labels;
use crate::config::LabelVariant;
use crate::constants::{STATION_COLUMN, UNNAMED_COLUMN_PREFIX};
use crate::error::{PipelineError, Result};
use crate::models::{RawSheet, StationTable};
use polars::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

/// Named-sheet lookup over a workbook-like input
pub trait SheetSource {
    /// Sheet names in workbook order
    fn sheet_names(&self) -> Vec<String>;

    /// Read one sheet; `Ok(None)` when the workbook has no sheet of that name
    fn read_sheet(&mut self, name: &str) -> Result<Option<RawSheet>>;

    /// Read the named sheet, or the first sheet when no name is given
    fn read_sheet_or_first(&mut self, name: Option<&str>) -> Result<Option<RawSheet>> {
        match name {
            Some(name) => self.read_sheet(name),
            None => match self.sheet_names().into_iter().next() {
                Some(first) => self.read_sheet(&first),
                None => Ok(None),
            },
        }
    }
}

/// In-memory workbook, ordered by sheet name
impl SheetSource for BTreeMap<String, RawSheet> {
    fn sheet_names(&self) -> Vec<String> {
        self.keys().cloned().collect()
    }

    fn read_sheet(&mut self, name: &str) -> Result<Option<RawSheet>> {
        Ok(self.get(name).cloned())
    }
}

/// Build a text-typed frame from a raw sheet, normalizing its labels
///
/// Blank header cells are named after their position (`Unnamed: 3`), short
/// rows are padded with missing cells and surplus cells are ignored.
pub fn sheet_to_frame(sheet: &RawSheet, variants: &[LabelVariant]) -> Result<DataFrame> {
    let raw_labels: Vec<String> = sheet
        .headers
        .iter()
        .enumerate()
        .map(|(idx, label)| {
            if label.trim().is_empty() {
                format!("{UNNAMED_COLUMN_PREFIX}{idx}")
            } else {
                label.clone()
            }
        })
        .collect();
    let labels = normalize_labels(&raw_labels, variants);

    let columns: Vec<Column> = labels
        .iter()
        .enumerate()
        .map(|(idx, label)| {
            let values: Vec<Option<String>> = sheet
                .rows
                .iter()
                .map(|row| row.get(idx).cloned().flatten())
                .collect();
            Column::new(label.as_str().into(), values)
        })
        .collect();

    Ok(DataFrame::new(columns)?)
}

/// Loads one normalized table per configured station
#[derive(Debug, Clone)]
pub struct StationTableLoader<'a> {
    variants: &'a [LabelVariant],
}

impl<'a> StationTableLoader<'a> {
    pub fn new(variants: &'a [LabelVariant]) -> Self {
        Self { variants }
    }

    /// Load a single station sheet; a missing sheet is fatal
    pub fn load<S: SheetSource + ?Sized>(&self, source: &mut S, station: &str) -> Result<StationTable> {
        let sheet = source
            .read_sheet(station)?
            .ok_or_else(|| PipelineError::SheetNotFound {
                station: station.to_string(),
            })?;

        let frame = sheet_to_frame(&sheet, self.variants)?
            .lazy()
            .with_columns([lit(station).alias(STATION_COLUMN)])
            .collect()?;

        debug!(
            "Loaded station '{}': {} rows, {} columns",
            station,
            frame.height(),
            frame.width()
        );

        Ok(StationTable {
            station: station.to_string(),
            frame,
        })
    }

    /// Load every station in list order
    pub fn load_all<S: SheetSource + ?Sized>(
        &self,
        source: &mut S,
        stations: &[String],
    ) -> Result<Vec<StationTable>> {
        stations
            .iter()
            .map(|station| self.load(source, station))
            .collect()
    }
}
