//! District join and per-capita calculation.

use crate::config::StationDistrictMap;
use crate::error::Result;
use crate::models::{MeanScope, MergedRecord, PollutantMean, PopulationTable, YearlyRecord};
use std::collections::HashMap;
use tracing::debug;

/// Mean concentration per resident
///
/// Defined only when both inputs are present, the population is positive
/// and the quotient is finite.
pub fn per_capita(mean: Option<f64>, population: Option<u64>) -> Option<f64> {
    match (mean, population) {
        (Some(mean), Some(population)) if population > 0 => {
            Some(mean / population as f64).filter(|v| v.is_finite())
        }
        _ => None,
    }
}

/// Join overall means with their district and its population
///
/// Every input mean yields exactly one record, in input order. Districts
/// absent from the census get no population.
pub fn merge_per_capita(
    means: &[PollutantMean],
    populations: &PopulationTable,
    districts: &StationDistrictMap,
) -> Result<Vec<MergedRecord>> {
    let lookup: HashMap<&str, Option<u64>> = populations
        .districts
        .iter()
        .map(|d| (d.district.as_str(), d.population))
        .collect();

    means
        .iter()
        .filter(|m| m.scope == MeanScope::Overall)
        .map(|m| {
            let district = districts.require(&m.station)?;
            let population = lookup.get(district).copied().flatten();
            if !lookup.contains_key(district) {
                debug!("District '{}' not found in the census", district);
            }

            Ok(MergedRecord {
                station: m.station.clone(),
                district: district.to_string(),
                pollutant: m.pollutant.clone(),
                mean: m.value,
                population,
                per_capita: per_capita(m.value, population),
            })
        })
        .collect()
}

/// Attach districts to per-year means
pub fn attach_districts(
    means: &[PollutantMean],
    districts: &StationDistrictMap,
) -> Result<Vec<YearlyRecord>> {
    means
        .iter()
        .filter_map(|m| match m.scope {
            MeanScope::Year(year) => Some((m, year)),
            MeanScope::Overall => None,
        })
        .map(|(m, year)| {
            Ok(YearlyRecord {
                station: m.station.clone(),
                district: districts.require(&m.station)?.to_string(),
                year,
                pollutant: m.pollutant.clone(),
                mean: m.value,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::models::{CensusReport, DistrictPopulation};

    fn mean(station: &str, pollutant: &str, value: Option<f64>) -> PollutantMean {
        PollutantMean {
            station: station.to_string(),
            pollutant: pollutant.to_string(),
            value,
            scope: MeanScope::Overall,
        }
    }

    fn districts() -> StationDistrictMap {
        let mut map = StationDistrictMap::new();
        map.insert("A", "1ο Διαμέρισμα");
        map.insert("B", "2ο Διαμέρισμα");
        map.insert("C", "1ο Διαμέρισμα");
        map
    }

    fn populations() -> PopulationTable {
        PopulationTable {
            districts: vec![
                DistrictPopulation {
                    ordinal: 1,
                    district: "1ο Διαμέρισμα".to_string(),
                    population: Some(100_000),
                },
                DistrictPopulation {
                    ordinal: 3,
                    district: "3ο Διαμέρισμα".to_string(),
                    population: Some(0),
                },
            ],
            report: CensusReport::default(),
        }
    }

    #[test]
    fn test_per_capita_is_null_safe() {
        assert_eq!(per_capita(Some(125.0), Some(100_000)), Some(0.00125));
        assert_eq!(per_capita(None, Some(100_000)), None);
        assert_eq!(per_capita(Some(125.0), None), None);
        assert_eq!(per_capita(Some(125.0), Some(0)), None);
        assert_eq!(per_capita(Some(f64::INFINITY), Some(10)), None);
    }

    #[test]
    fn test_merge_preserves_every_row_in_order() {
        let means = vec![
            mean("B", "SO2", Some(135.0)),
            mean("A", "SO2", Some(125.0)),
            mean("C", "NO2", None),
        ];
        let merged = merge_per_capita(&means, &populations(), &districts()).unwrap();

        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].station, "B");
        assert_eq!(merged[0].population, None);
        assert_eq!(merged[0].per_capita, None);

        assert_eq!(merged[1].district, "1ο Διαμέρισμα");
        assert_eq!(merged[1].population, Some(100_000));
        assert_eq!(merged[1].per_capita, Some(0.00125));

        assert_eq!(merged[2].district, "1ο Διαμέρισμα");
        assert_eq!(merged[2].per_capita, None);
    }

    #[test]
    fn test_unmapped_station_is_fatal() {
        let means = vec![mean("Z", "SO2", Some(1.0))];
        let err = merge_per_capita(&means, &populations(), &districts()).unwrap_err();
        assert!(matches!(err, PipelineError::StationNotMapped { ref station } if station == "Z"));
    }

    #[test]
    fn test_yearly_means_get_districts() {
        let means = vec![
            mean("A", "SO2", Some(1.0)),
            PollutantMean {
                scope: MeanScope::Year(2011),
                ..mean("C", "SO2", Some(2.0))
            },
        ];
        let yearly = attach_districts(&means, &districts()).unwrap();
        assert_eq!(
            yearly,
            vec![YearlyRecord {
                station: "C".to_string(),
                district: "1ο Διαμέρισμα".to_string(),
                year: 2011,
                pollutant: "SO2".to_string(),
                mean: Some(2.0),
            }]
        );
    }
}
