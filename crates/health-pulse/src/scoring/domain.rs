use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier for a scoring metric, unique within a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricId(pub String);

impl MetricId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for MetricId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for MetricId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl PartialEq<str> for MetricId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// A named factor contributing to an account's health score.
///
/// `weight` is kept while the metric is disabled so that re-enabling it restores the
/// previous allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    pub id: MetricId,
    pub name: String,
    pub description: String,
    pub enabled: bool,
    pub weight: u32,
}

impl Metric {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        weight: u32,
    ) -> Self {
        Self {
            id: MetricId::new(id),
            name: name.into(),
            description: description.into(),
            enabled: true,
            weight,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Weight counted toward the configuration total.
    pub fn effective_weight(&self) -> u32 {
        if self.enabled {
            self.weight
        } else {
            0
        }
    }

    pub fn snapshot(&self) -> MetricSnapshot {
        MetricSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            enabled: self.enabled,
            weight: self.weight,
        }
    }
}

/// Persisted shape of a metric handed to the repository at save time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    pub id: MetricId,
    pub name: String,
    pub enabled: bool,
    pub weight: u32,
}

/// Raw weight as typed by a user; anything unusable becomes 0.
///
/// Numbers too large for a `u32` saturate rather than reset, so an oversized entry still
/// fails the total check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WeightInput {
    Integer(i64),
    Decimal(f64),
    Text(String),
    /// Booleans, arrays, objects: accepted on the wire, worth 0.
    Other(serde_json::Value),
}

impl WeightInput {
    pub fn coerce(&self) -> u32 {
        match self {
            WeightInput::Integer(value) if *value < 0 => 0,
            WeightInput::Integer(value) => u32::try_from(*value).unwrap_or(u32::MAX),
            WeightInput::Decimal(value) if value.is_nan() || *value < 0.0 => 0,
            WeightInput::Decimal(value) => {
                if *value >= u32::MAX as f64 {
                    u32::MAX
                } else {
                    value.trunc() as u32
                }
            }
            WeightInput::Text(raw) => parse_weight(raw),
            WeightInput::Other(_) => 0,
        }
    }
}

impl From<&str> for WeightInput {
    fn from(value: &str) -> Self {
        WeightInput::Text(value.to_string())
    }
}

impl From<String> for WeightInput {
    fn from(value: String) -> Self {
        WeightInput::Text(value)
    }
}

impl From<i32> for WeightInput {
    fn from(value: i32) -> Self {
        WeightInput::Integer(i64::from(value))
    }
}

impl From<i64> for WeightInput {
    fn from(value: i64) -> Self {
        WeightInput::Integer(value)
    }
}

impl From<u32> for WeightInput {
    fn from(value: u32) -> Self {
        WeightInput::Integer(i64::from(value))
    }
}

/// Reads the leading integer of `raw`, ignoring trailing text ("12abc" -> 12, "12.7" -> 12).
///
/// Empty, non-numeric, or negative input yields 0. Values above 100 pass through untouched
/// and digit runs beyond `u32::MAX` saturate; only the aggregate total is checked.
pub fn parse_weight(raw: &str) -> u32 {
    let trimmed = raw.trim();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits_end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    let digits = &unsigned[..digits_end];

    if digits.is_empty() {
        return 0;
    }
    // a non-empty ASCII digit run can only fail by overflowing
    digits.parse::<u32>().unwrap_or(u32::MAX)
}
