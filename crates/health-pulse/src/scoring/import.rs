use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use super::domain::Metric;
use super::weights::{ConfigurationError, WeightConfiguration};

#[derive(Debug, thiserror::Error)]
pub enum MetricImportError {
    #[error("failed to read metric catalogue: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid metric catalogue CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("metric catalogue line {line}: {reason}")]
    InvalidRow { line: u64, reason: String },
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

#[derive(Debug, Deserialize)]
struct MetricRow {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    enabled: String,
    weight: String,
}

/// Loads an initial metric catalogue from `id,name,description,enabled,weight` CSV.
pub struct MetricCatalogImporter;

impl MetricCatalogImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Metric>, MetricImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(mut reader: R) -> Result<Vec<Metric>, MetricImportError> {
        let mut source = String::new();
        reader.read_to_string(&mut source)?;
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source.as_bytes());
        let headers = csv_reader.headers()?.clone();
        let mut metrics = Vec::new();

        for result in csv_reader.records() {
            let record = result?;
            let line = record
                .position()
                .map_or(0, |position| physical_line(&source, position));
            let row: MetricRow = record.deserialize(Some(&headers))?;

            if row.id.is_empty() {
                return Err(MetricImportError::InvalidRow {
                    line,
                    reason: "metric id is empty".to_string(),
                });
            }
            let enabled = parse_flag(&row.enabled).ok_or_else(|| MetricImportError::InvalidRow {
                line,
                reason: format!("enabled must be true or false, got '{}'", row.enabled),
            })?;
            let weight = row
                .weight
                .parse::<u32>()
                .map_err(|_| MetricImportError::InvalidRow {
                    line,
                    reason: format!(
                        "weight must be a non-negative integer, got '{}'",
                        row.weight
                    ),
                })?;

            metrics.push(Metric {
                id: row.id.into(),
                name: row.name,
                description: row.description,
                enabled,
                weight,
            });
        }

        // Reject duplicates here rather than at session start.
        WeightConfiguration::new(metrics.clone())?;
        Ok(metrics)
    }
}

/// Line the record's first field sits on.
///
/// csv stamps a record with the reader position from before it skipped blank lines, so
/// any terminators at that offset are counted here.
fn physical_line(source: &str, position: &csv::Position) -> u64 {
    let start = usize::try_from(position.byte())
        .unwrap_or(source.len())
        .min(source.len());
    let skipped = source.as_bytes()[start..]
        .iter()
        .take_while(|byte| matches!(byte, b'\r' | b'\n'))
        .filter(|byte| **byte == b'\n')
        .count();
    position.line() + skipped as u64
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}
