//! Column-label normalization and pollutant column classification.
//!
//! Spreadsheet headers in the municipal workbooks carry embedded line
//! breaks, stray padding and a couple of recurring misspellings. Labels are
//! canonicalized here before anything matches on them.

use crate::config::{ColumnSettings, LabelVariant};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Canonicalize a single column label
///
/// Line breaks become single spaces, surrounding whitespace is trimmed and
/// the known typographic variants are replaced in order.
pub fn normalize_label(label: &str, variants: &[LabelVariant]) -> String {
    let flattened = label.replace("\r\n", " ").replace(['\n', '\r'], " ");
    let mut clean = flattened.trim().to_string();
    for variant in variants {
        if !variant.raw.is_empty() && clean.contains(&variant.raw) {
            clean = clean.replace(&variant.raw, &variant.canonical);
        }
    }
    clean
}

/// Canonicalize a header row, keeping labels unique
pub fn normalize_labels<S: AsRef<str>>(labels: &[S], variants: &[LabelVariant]) -> Vec<String> {
    let normalized = labels
        .iter()
        .map(|label| normalize_label(label.as_ref(), variants))
        .collect();
    make_unique(normalized)
}

/// Suffix repeated labels with `.1`, `.2`, … so every label is distinct
///
/// The first occurrence keeps its label.
pub fn make_unique(labels: Vec<String>) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::with_capacity(labels.len());
    let mut unique = Vec::with_capacity(labels.len());

    for label in labels {
        if used.insert(label.clone()) {
            unique.push(label);
            continue;
        }

        let mut n = 1;
        let renamed = loop {
            let candidate = format!("{label}.{n}");
            if !used.contains(&candidate) {
                break candidate;
            }
            n += 1;
        };
        warn!("Duplicate column label '{}' renamed to '{}'", label, renamed);
        used.insert(renamed.clone());
        unique.push(renamed);
    }

    unique
}

/// Ordered pattern rules deciding which columns hold pollutant series
#[derive(Debug, Clone)]
pub struct PollutantSelector {
    patterns: Vec<String>,
    unit_tokens: Vec<String>,
}

impl PollutantSelector {
    pub fn new(patterns: Vec<String>, unit_tokens: Vec<String>) -> Self {
        Self {
            patterns: patterns.into_iter().filter(|p| !p.is_empty()).collect(),
            unit_tokens,
        }
    }

    pub fn from_settings(settings: &ColumnSettings) -> Self {
        Self::new(
            settings.pollutant_patterns.clone(),
            settings.unit_tokens.clone(),
        )
    }

    /// First pattern contained in the label, if any
    pub fn classify(&self, label: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|pattern| label.contains(pattern.as_str()))
            .map(String::as_str)
    }

    /// Bare pollutant name: the label with its unit tokens removed
    pub fn pollutant_name(&self, label: &str) -> String {
        let mut name = label.to_string();
        for token in &self.unit_tokens {
            if !token.is_empty() {
                name = name.replace(token.as_str(), "");
            }
        }
        name.trim().to_string()
    }

    /// Pollutant columns of a header row as `(label, pollutant name)` pairs
    ///
    /// Columns whose names collide keep the first occurrence only.
    pub fn select<'a>(&self, labels: impl IntoIterator<Item = &'a str>) -> Vec<(String, String)> {
        let mut seen = HashSet::new();
        let mut selected = Vec::new();

        for label in labels {
            let Some(pattern) = self.classify(label) else {
                continue;
            };
            let name = self.pollutant_name(label);
            if name.is_empty() {
                continue;
            }
            if !seen.insert(name.clone()) {
                warn!(
                    "Column '{}' duplicates pollutant '{}', keeping the first column",
                    label, name
                );
                continue;
            }
            debug!("Column '{}' → pollutant '{}' (rule '{}')", label, name, pattern);
            selected.push((label.to_string(), name));
        }

        selected
    }
}
