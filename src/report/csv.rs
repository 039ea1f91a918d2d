//! CSV export of the report tables.

use super::{mapping_frame, results_frame, yearly_frame};
use crate::constants::report;
use crate::error::{PipelineError, Result};
use crate::pipeline::PipelineOutput;
use polars::prelude::{CsvWriter, DataFrame, SerWriter};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Write one frame as a headed CSV file
pub fn write_frame(frame: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(frame)
        .map_err(|e| PipelineError::Report {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    debug!("Wrote {} rows to {}", frame.height(), path.display());
    Ok(())
}

/// Export mapping, results and (when computed) yearly tables
pub fn write_tables(dir: &Path, output: &PipelineOutput) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    let path = dir.join(report::MAPPING_CSV);
    write_frame(&mut mapping_frame(&output.mapping)?, &path)?;
    written.push(path);

    let path = dir.join(report::RESULTS_CSV);
    write_frame(&mut results_frame(&output.classified)?, &path)?;
    written.push(path);

    if let Some(yearly) = &output.yearly {
        let path = dir.join(report::YEARLY_CSV);
        write_frame(&mut yearly_frame(yearly)?, &path)?;
        written.push(path);
    }

    Ok(written)
}
