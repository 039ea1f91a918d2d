//! Regulatory limit classification.

use crate::config::LimitTable;
use crate::models::{ClassifiedRecord, ComplianceStatus, MergedRecord};

/// Compare a record's mean against the limit for its pollutant
///
/// A mean equal to the limit complies. A record without a mean is reported
/// within limit when the pollutant is known.
pub fn classify(record: &MergedRecord, limits: &LimitTable) -> ComplianceStatus {
    let Some(limit) = limits.get(&record.pollutant) else {
        return ComplianceStatus::UnknownPollutant;
    };

    match record.mean {
        Some(mean) if mean > limit.value => ComplianceStatus::ExceedsLimit,
        _ => ComplianceStatus::WithinLimit,
    }
}

pub fn classify_all(records: Vec<MergedRecord>, limits: &LimitTable) -> Vec<ClassifiedRecord> {
    records
        .into_iter()
        .map(|record| {
            let status = classify(&record, limits);
            ClassifiedRecord { record, status }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pollutant: &str, mean: Option<f64>) -> MergedRecord {
        MergedRecord {
            station: "Στ. ΕΓΝΑΤΙΑΣ".to_string(),
            district: "1ο Διαμέρισμα".to_string(),
            pollutant: pollutant.to_string(),
            mean,
            population: Some(50_000),
            per_capita: mean.map(|m| m / 50_000.0),
        }
    }

    #[test]
    fn test_equality_at_limit_complies() {
        let limits = LimitTable::default();
        assert_eq!(
            classify(&record("SO2", Some(125.0)), &limits),
            ComplianceStatus::WithinLimit
        );
        assert_eq!(
            classify(&record("SO2", Some(125.0001)), &limits),
            ComplianceStatus::ExceedsLimit
        );
        assert_eq!(
            classify(&record("CO", Some(10.0)), &limits),
            ComplianceStatus::WithinLimit
        );
    }

    #[test]
    fn test_unknown_pollutant() {
        let limits = LimitTable::default();
        assert_eq!(
            classify(&record("C6H6", Some(3.0)), &limits),
            ComplianceStatus::UnknownPollutant
        );
        assert_eq!(
            classify(&record("C6H6", None), &limits),
            ComplianceStatus::UnknownPollutant
        );
    }

    #[test]
    fn test_missing_mean_is_within_limit() {
        let limits = LimitTable::default();
        assert_eq!(
            classify(&record("PM2.5", None), &limits),
            ComplianceStatus::WithinLimit
        );
    }

    #[test]
    fn test_per_capita_does_not_affect_status() {
        let limits = LimitTable::default();
        let mut high = record("NO2", Some(41.0));
        high.per_capita = Some(0.0);
        let classified = classify_all(vec![high, record("NO2", Some(39.0))], &limits);

        let statuses: Vec<ComplianceStatus> = classified.iter().map(|c| c.status).collect();
        assert_eq!(
            statuses,
            vec![ComplianceStatus::ExceedsLimit, ComplianceStatus::WithinLimit]
        );
    }
}
