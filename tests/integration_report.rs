//! Integration tests for the report workflow
//!
//! Builds real `.xlsx` input workbooks, runs the pipeline through the
//! calamine adapter and reads the written report back.

use airquality_processor::config::{LimitTable, PipelineConfig, PollutantLimit, StationDistrictMap};
use airquality_processor::constants::report;
use airquality_processor::{AirQualityPipeline, ExcelWorkbook, ReportWriter, SheetSource};
use calamine::{Data, Reader, open_workbook_auto};
use rust_xlsxwriter::Workbook;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Pollution workbook: station A with SO2 [100, 150], station B with SO2 [130, 140]
fn write_pollution_workbook(path: &Path) {
    let mut workbook = Workbook::new();
    let stations: [(&str, [(&str, f64); 2]); 2] = [
        ("A", [("2010-01-01", 100.0), ("2011-01-01", 150.0)]),
        ("B", [("2010-01-01", 130.0), ("2010-06-01", 140.0)]),
    ];

    for (station, rows) in stations {
        let sheet = workbook.add_worksheet();
        sheet.set_name(station).unwrap();
        sheet.write_string(0, 0, "Ημερο -\nμηνία").unwrap();
        sheet.write_string(0, 1, "SO2\nμg/m3").unwrap();
        sheet.write_string(0, 2, "Σχόλια").unwrap();
        for (idx, (date, value)) in rows.iter().enumerate() {
            let row = idx as u32 + 1;
            sheet.write_string(row, 0, *date).unwrap();
            sheet.write_number(row, 1, *value).unwrap();
        }
    }

    workbook.save(path).unwrap();
}

/// Census workbook: D1 = 100000, D2 without a usable population
fn write_census_workbook(path: &Path) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Απογραφή").unwrap();
    sheet.write_string(0, 0, "Κωδικός").unwrap();
    sheet.write_string(0, 1, "Επίπεδο").unwrap();
    sheet.write_string(0, 2, "Περιγραφή").unwrap();

    sheet.write_string(1, 0, "1").unwrap();
    sheet.write_string(1, 3, "ΔΗΜΟΣ ΘΕΣΣΑΛΟΝΙΚΗΣ").unwrap();
    sheet.write_number(1, 4, 325182).unwrap();

    sheet.write_string(2, 0, "2").unwrap();
    sheet.write_string(2, 3, "Δημοτική Κοινότητα 1ο").unwrap();
    sheet.write_number(2, 4, 100000).unwrap();

    sheet.write_string(3, 0, "3").unwrap();
    sheet.write_string(3, 3, "Δημοτική Κοινότητα 2ο").unwrap();
    sheet.write_string(3, 4, "—").unwrap();

    workbook.save(path).unwrap();
}

fn two_station_config() -> PipelineConfig {
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

struct Fixture {
    _dir: TempDir,
    pollution: PathBuf,
    census: PathBuf,
    output: PathBuf,
}

fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let pollution = dir.path().join("pollution.xlsx");
    let census = dir.path().join("population.xlsx");
    write_pollution_workbook(&pollution);
    write_census_workbook(&census);
    let output = dir.path().join("reports").join("run");

    Fixture {
        _dir: dir,
        pollution,
        census,
        output,
    }
}

fn run_report(fixture: &Fixture, output_dir: &Path) -> Vec<PathBuf> {
    let config = two_station_config();
    let limits = config.limits.clone();
    let pipeline = AirQualityPipeline::new(config).unwrap();

    let mut pollution = ExcelWorkbook::open(&fixture.pollution).unwrap();
    let mut census = ExcelWorkbook::open(&fixture.census).unwrap();
    let output = pipeline.run(&mut pollution, &mut census).unwrap();

    ReportWriter::new(output_dir)
        .with_csv(true)
        .write(&output, &limits)
        .unwrap()
}

#[test]
fn test_excel_adapter_reads_station_sheets() {
    let fixture = fixture();
    let mut workbook = ExcelWorkbook::open(&fixture.pollution).unwrap();

    assert_eq!(workbook.sheet_names(), vec!["A", "B"]);
    let sheet = workbook.read_sheet("A").unwrap().unwrap();
    assert_eq!(sheet.headers[1], "SO2\nμg/m3");
    assert_eq!(sheet.rows[0][1], Some("100".to_string()));
    assert!(workbook.read_sheet("Γ").unwrap().is_none());
}

#[test]
fn test_report_workbook_contents() {
    let fixture = fixture();
    let written = run_report(&fixture, &fixture.output);

    let workbook_path = fixture.output.join(report::DEFAULT_WORKBOOK_NAME);
    assert!(written.contains(&workbook_path));

    let mut workbook = open_workbook_auto(&workbook_path).unwrap();
    assert_eq!(
        workbook.sheet_names(),
        vec![
            report::MAPPING_SHEET,
            report::YEARLY_SHEET,
            report::RESULTS_SHEET,
            report::CHARTS_SHEET
        ]
    );

    let mapping = workbook.worksheet_range(report::MAPPING_SHEET).unwrap();
    assert_eq!(mapping.get_value((1, 0)), Some(&Data::String("A".to_string())));
    assert_eq!(
        mapping.get_value((2, 1)),
        Some(&Data::String("2ο Διαμέρισμα".to_string()))
    );

    let results = workbook.worksheet_range(report::RESULTS_SHEET).unwrap();
    assert_eq!(results.get_value((0, 5)), Some(&Data::String("per_capita".to_string())));
    assert_eq!(results.get_value((1, 3)), Some(&Data::Float(125.0)));
    assert_eq!(results.get_value((1, 4)), Some(&Data::Float(100000.0)));
    assert_eq!(results.get_value((1, 5)), Some(&Data::Float(0.00125)));
    assert_eq!(
        results.get_value((1, 6)),
        Some(&Data::String("within-limit".to_string()))
    );
    assert_eq!(results.get_value((2, 3)), Some(&Data::Float(135.0)));
    assert_eq!(
        results.get_value((2, 6)),
        Some(&Data::String("exceeds-limit".to_string()))
    );

    let yearly = workbook.worksheet_range(report::YEARLY_SHEET).unwrap();
    assert_eq!(yearly.height(), 4);

    // SO2 chart data: bars in column B, the limit line in column C
    let charts = workbook.worksheet_range(report::CHARTS_SHEET).unwrap();
    assert_eq!(charts.get_value((0, 2)), Some(&Data::String("limit".to_string())));
    assert_eq!(charts.get_value((1, 1)), Some(&Data::Float(125.0)));
    assert_eq!(charts.get_value((1, 2)), Some(&Data::Float(125.0)));
    assert_eq!(charts.get_value((2, 1)), Some(&Data::Float(135.0)));
    assert_eq!(charts.get_value((2, 2)), Some(&Data::Float(125.0)));
}

#[test]
fn test_csv_export_is_deterministic() {
    let fixture = fixture();
    let first_dir = fixture.output.join("first");
    let second_dir = fixture.output.join("second");
    run_report(&fixture, &first_dir);
    run_report(&fixture, &second_dir);

    for name in [report::MAPPING_CSV, report::RESULTS_CSV, report::YEARLY_CSV] {
        let first = fs::read(first_dir.join(name)).unwrap();
        let second = fs::read(second_dir.join(name)).unwrap();
        assert!(!first.is_empty());
        assert_eq!(first, second, "{name} differs between runs");
    }

    let results = fs::read_to_string(first_dir.join(report::RESULTS_CSV)).unwrap();
    let mut lines = results.lines();
    assert_eq!(
        lines.next(),
        Some("station,district,pollutant,mean_value,population,per_capita,status")
    );
    assert!(lines.next().unwrap().starts_with("A,1ο Διαμέρισμα,SO2,125"));
}

#[test]
fn test_yearly_sheet_is_omitted_when_disabled() {
    let fixture = fixture();
    let config = two_station_config().without_yearly_means();
    let limits = config.limits.clone();

    let mut pollution = ExcelWorkbook::open(&fixture.pollution).unwrap();
    let mut census = ExcelWorkbook::open(&fixture.census).unwrap();
    let output = AirQualityPipeline::new(config)
        .unwrap()
        .run(&mut pollution, &mut census)
        .unwrap();
    let written = ReportWriter::new(&fixture.output)
        .with_workbook_name("no_yearly.xlsx")
        .write(&output, &limits)
        .unwrap();

    assert_eq!(written.len(), 1);
    let workbook = open_workbook_auto(&written[0]).unwrap();
    assert!(!workbook.sheet_names().iter().any(|s| s == report::YEARLY_SHEET));
}
