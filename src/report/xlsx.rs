//! Excel workbook export with native column charts.

use crate::config::LimitTable;
use crate::constants::{columns, report};
use crate::error::{PipelineError, Result};
use crate::models::{ClassifiedRecord, ComplianceStatus, StationDistrict, YearlyRecord};
use crate::pipeline::PipelineOutput;
use rust_xlsxwriter::{
    Chart, ChartLegendPosition, ChartLine, ChartLineDashType, ChartPoint, ChartSolidFill,
    ChartType, Format, Workbook, Worksheet,
};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

const LIMIT_LABEL: &str = "limit";

/// One bar of a chart block
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    pub color: &'static str,
}

/// A chart together with the data rows it plots
#[derive(Debug, Clone, PartialEq)]
pub struct ChartBlock {
    pub title: String,
    pub value_label: String,
    pub bars: Vec<Bar>,
    /// Drawn as a dashed reference line across the bars
    pub limit: Option<f64>,
}

/// Write the full report workbook
pub fn write_workbook(path: &Path, output: &PipelineOutput, limits: &LimitTable) -> Result<()> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    write_mapping(workbook.add_worksheet(), &output.mapping, &header)?;
    if let Some(yearly) = &output.yearly {
        write_yearly(workbook.add_worksheet(), yearly, &header)?;
    }
    write_results(workbook.add_worksheet(), &output.classified, &header)?;

    let blocks = chart_blocks(&output.classified, limits);
    write_charts(workbook.add_worksheet(), &blocks, &header)?;

    workbook.save(path).map_err(|e| PipelineError::Report {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(())
}

fn write_header(sheet: &mut Worksheet, labels: &[&str], format: &Format) -> Result<()> {
    for (col, label) in labels.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *label, format)?;
    }
    Ok(())
}

/// Missing values stay blank cells
fn write_optional(sheet: &mut Worksheet, row: u32, col: u16, value: Option<f64>) -> Result<()> {
    if let Some(value) = value {
        sheet.write_number(row, col, value)?;
    }
    Ok(())
}

fn write_mapping(sheet: &mut Worksheet, mapping: &[StationDistrict], header: &Format) -> Result<()> {
    sheet.set_name(report::MAPPING_SHEET)?;
    write_header(sheet, &[columns::STATION, columns::DISTRICT], header)?;

    for (idx, entry) in mapping.iter().enumerate() {
        let row = idx as u32 + 1;
        sheet.write_string(row, 0, &entry.station)?;
        sheet.write_string(row, 1, &entry.district)?;
    }
    sheet.set_column_width(0, 28)?;
    sheet.set_column_width(1, 18)?;
    Ok(())
}

fn write_yearly(sheet: &mut Worksheet, yearly: &[YearlyRecord], header: &Format) -> Result<()> {
    sheet.set_name(report::YEARLY_SHEET)?;
    write_header(
        sheet,
        &[
            columns::STATION,
            columns::DISTRICT,
            columns::YEAR,
            columns::POLLUTANT,
            columns::MEAN_VALUE,
        ],
        header,
    )?;

    for (idx, record) in yearly.iter().enumerate() {
        let row = idx as u32 + 1;
        sheet.write_string(row, 0, &record.station)?;
        sheet.write_string(row, 1, &record.district)?;
        sheet.write_number(row, 2, record.year)?;
        sheet.write_string(row, 3, &record.pollutant)?;
        write_optional(sheet, row, 4, record.mean)?;
    }
    sheet.set_column_width(0, 28)?;
    sheet.set_column_width(1, 18)?;
    Ok(())
}

fn write_results(sheet: &mut Worksheet, records: &[ClassifiedRecord], header: &Format) -> Result<()> {
    sheet.set_name(report::RESULTS_SHEET)?;
    write_header(
        sheet,
        &[
            columns::STATION,
            columns::DISTRICT,
            columns::POLLUTANT,
            columns::MEAN_VALUE,
            columns::POPULATION,
            columns::PER_CAPITA,
            columns::STATUS,
        ],
        header,
    )?;

    for (idx, classified) in records.iter().enumerate() {
        let row = idx as u32 + 1;
        let record = &classified.record;
        sheet.write_string(row, 0, &record.station)?;
        sheet.write_string(row, 1, &record.district)?;
        sheet.write_string(row, 2, &record.pollutant)?;
        write_optional(sheet, row, 3, record.mean)?;
        write_optional(sheet, row, 4, record.population.map(|p| p as f64))?;
        write_optional(sheet, row, 5, record.per_capita)?;
        sheet.write_string(row, 6, classified.status.as_str())?;
    }
    sheet.set_column_width(0, 28)?;
    sheet.set_column_width(1, 18)?;
    sheet.set_column_width(6, 18)?;
    Ok(())
}

/// Chart blocks for a run: one per pollutant, then the per-capita summary
///
/// Pollutant charts follow the order pollutants first appear in the results
/// and plot only rows with a mean. The summary sums per-capita values per
/// district.
pub fn chart_blocks(records: &[ClassifiedRecord], limits: &LimitTable) -> Vec<ChartBlock> {
    let mut pollutants: Vec<&str> = Vec::new();
    for classified in records {
        let pollutant = classified.record.pollutant.as_str();
        if !pollutants.contains(&pollutant) {
            pollutants.push(pollutant);
        }
    }

    let mut blocks = Vec::new();
    for pollutant in pollutants {
        let bars: Vec<Bar> = records
            .iter()
            .filter(|c| c.record.pollutant == pollutant)
            .filter_map(|c| {
                c.record.mean.map(|value| Bar {
                    label: format!("{} ({})", c.record.district, c.record.station),
                    value,
                    color: match c.status {
                        ComplianceStatus::ExceedsLimit => report::EXCEEDS_COLOR,
                        _ => report::WITHIN_COLOR,
                    },
                })
            })
            .collect();
        if bars.is_empty() {
            debug!("No means for {}, chart skipped", pollutant);
            continue;
        }

        let limit = limits.get(pollutant).map(|l| l.value);
        let (title, value_label) = match limits.get(pollutant) {
            Some(limit) => (
                format!(
                    "{pollutant}: mean concentration by district (limit {} {})",
                    limit.value, limit.unit
                ),
                format!("{pollutant} ({})", limit.unit),
            ),
            None => (
                format!("{pollutant}: mean concentration by district (no limit)"),
                pollutant.to_string(),
            ),
        };
        blocks.push(ChartBlock {
            title,
            value_label,
            bars,
            limit,
        });
    }

    let mut per_district: BTreeMap<&str, f64> = BTreeMap::new();
    for classified in records {
        if let Some(value) = classified.record.per_capita {
            *per_district
                .entry(classified.record.district.as_str())
                .or_insert(0.0) += value;
        }
    }
    if !per_district.is_empty() {
        blocks.push(ChartBlock {
            title: "Per-capita pollution by district (sum over pollutants)".to_string(),
            value_label: columns::PER_CAPITA.to_string(),
            bars: per_district
                .into_iter()
                .map(|(district, value)| Bar {
                    label: district.to_string(),
                    value,
                    color: report::PER_CAPITA_COLOR,
                })
                .collect(),
            limit: None,
        });
    }

    blocks
}

fn write_charts(sheet: &mut Worksheet, blocks: &[ChartBlock], header: &Format) -> Result<()> {
    sheet.set_name(report::CHARTS_SHEET)?;
    sheet.set_column_width(0, 36)?;
    sheet.set_column_width(1, 18)?;
    sheet.set_column_width(2, 12)?;

    if blocks.is_empty() {
        sheet.write_string(0, 0, "No values to chart")?;
        return Ok(());
    }

    let mut start: u32 = 0;
    for block in blocks {
        let count = block.bars.len() as u32;
        sheet.write_string_with_format(start, 0, "category", header)?;
        sheet.write_string_with_format(start, 1, &block.value_label, header)?;
        for (idx, bar) in block.bars.iter().enumerate() {
            let row = start + 1 + idx as u32;
            sheet.write_string(row, 0, &bar.label)?;
            sheet.write_number(row, 1, bar.value)?;
            if let Some(limit) = block.limit {
                sheet.write_number(row, 2, limit)?;
            }
        }

        let points: Vec<ChartPoint> = block
            .bars
            .iter()
            .map(|bar| ChartPoint::new().set_format(ChartSolidFill::new().set_color(bar.color)))
            .collect();

        let mut chart = Chart::new(ChartType::Column);
        chart
            .add_series()
            .set_name(block.value_label.as_str())
            .set_categories((report::CHARTS_SHEET, start + 1, 0, start + count, 0))
            .set_values((report::CHARTS_SHEET, start + 1, 1, start + count, 1))
            .set_points(&points);
        chart.title().set_name(block.title.as_str());
        chart.y_axis().set_name(block.value_label.as_str());

        match block.limit {
            Some(_) => {
                sheet.write_string_with_format(start, 2, LIMIT_LABEL, header)?;
                let mut limit_line = Chart::new(ChartType::Line);
                limit_line
                    .add_series()
                    .set_name(LIMIT_LABEL)
                    .set_categories((report::CHARTS_SHEET, start + 1, 0, start + count, 0))
                    .set_values((report::CHARTS_SHEET, start + 1, 2, start + count, 2))
                    .set_format(
                        ChartLine::new()
                            .set_color(report::EXCEEDS_COLOR)
                            .set_dash_type(ChartLineDashType::Dash),
                    );
                chart.combine(&limit_line);
                chart.legend().set_position(ChartLegendPosition::Bottom);
            }
            None => {
                chart.legend().set_hidden();
            }
        }
        sheet.insert_chart(start, 4, &chart)?;

        start += report::CHART_BLOCK_ROWS.max(count + 2);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MergedRecord;

    fn classified(
        station: &str,
        district: &str,
        pollutant: &str,
        mean: Option<f64>,
        per_capita: Option<f64>,
        status: ComplianceStatus,
    ) -> ClassifiedRecord {
        ClassifiedRecord {
            record: MergedRecord {
                station: station.to_string(),
                district: district.to_string(),
                pollutant: pollutant.to_string(),
                mean,
                population: None,
                per_capita,
            },
            status,
        }
    }

    #[test]
    fn test_bars_are_colored_by_status() {
        let records = vec![
            classified("A", "1ο Διαμέρισμα", "SO2", Some(125.0), Some(0.5), ComplianceStatus::WithinLimit),
            classified("B", "2ο Διαμέρισμα", "SO2", Some(135.0), None, ComplianceStatus::ExceedsLimit),
            classified("C", "2ο Διαμέρισμα", "SO2", None, None, ComplianceStatus::WithinLimit),
        ];
        let blocks = chart_blocks(&records, &LimitTable::default());

        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].title.contains("limit 125 μg/m³"));
        assert_eq!(blocks[0].limit, Some(125.0));
        assert_eq!(blocks[1].limit, None);
        let colors: Vec<&str> = blocks[0].bars.iter().map(|b| b.color).collect();
        assert_eq!(colors, vec![report::WITHIN_COLOR, report::EXCEEDS_COLOR]);
        assert_eq!(blocks[0].bars[1].label, "2ο Διαμέρισμα (B)");
    }

    #[test]
    fn test_per_capita_summary_sums_by_district() {
        let records = vec![
            classified("A", "4ο Διαμέρισμα", "SO2", Some(1.0), Some(0.25), ComplianceStatus::WithinLimit),
            classified("B", "4ο Διαμέρισμα", "NO2", Some(2.0), Some(0.5), ComplianceStatus::WithinLimit),
            classified("C", "1ο Διαμέρισμα", "NO2", Some(3.0), Some(1.0), ComplianceStatus::WithinLimit),
        ];
        let blocks = chart_blocks(&records, &LimitTable::default());

        let summary = blocks.last().unwrap();
        let bars: Vec<(&str, f64)> = summary
            .bars
            .iter()
            .map(|b| (b.label.as_str(), b.value))
            .collect();
        assert_eq!(bars, vec![("1ο Διαμέρισμα", 1.0), ("4ο Διαμέρισμα", 0.75)]);
    }

    #[test]
    fn test_pollutant_without_means_gets_no_chart() {
        let records = vec![classified(
            "A",
            "1ο Διαμέρισμα",
            "C6H6",
            None,
            None,
            ComplianceStatus::UnknownPollutant,
        )];
        assert!(chart_blocks(&records, &LimitTable::default()).is_empty());
    }
}
