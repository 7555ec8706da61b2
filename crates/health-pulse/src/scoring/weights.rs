use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::{Metric, MetricId, MetricSnapshot, WeightInput};

/// Enabled weights must add up to exactly this amount before a save is allowed.
pub const REQUIRED_TOTAL: u64 = 100;

/// Aggregate classification of the enabled weight total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WeightValidation {
    Valid,
    UnderAllocated { deficit: u64 },
    OverAllocated { excess: u64 },
}

impl WeightValidation {
    pub fn from_total(total: u64) -> Self {
        match total.cmp(&REQUIRED_TOTAL) {
            std::cmp::Ordering::Less => WeightValidation::UnderAllocated {
                deficit: REQUIRED_TOTAL - total,
            },
            std::cmp::Ordering::Greater => WeightValidation::OverAllocated {
                excess: total - REQUIRED_TOTAL,
            },
            std::cmp::Ordering::Equal => WeightValidation::Valid,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, WeightValidation::Valid)
    }

    pub fn message(&self) -> Option<String> {
        match self {
            WeightValidation::Valid => None,
            WeightValidation::UnderAllocated { deficit } => Some(format!(
                "Weights must total 100%. Add {deficit}% to enabled metrics."
            )),
            WeightValidation::OverAllocated { excess } => Some(format!(
                "Weights must total 100%. Remove {excess}% from enabled metrics."
            )),
        }
    }
}

/// Position of the configuration in its edit/save lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigurationState {
    DirtyInvalid,
    DirtyValid,
    Saved,
}

impl ConfigurationState {
    pub fn label(&self) -> &'static str {
        match self {
            ConfigurationState::DirtyInvalid => "dirty_invalid",
            ConfigurationState::DirtyValid => "dirty_valid",
            ConfigurationState::Saved => "saved",
        }
    }
}

/// Proof of a particular save; clearing with a ticket from before the latest edit is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveTicket(u64);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("metric id '{0}' appears more than once")]
    DuplicateMetricId(MetricId),
}

/// Ordered set of health-score metrics with the exactly-100 weight rule.
///
/// Total weight and validity are always computed from the metrics on read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightConfiguration {
    metrics: Vec<Metric>,
    just_saved: bool,
    generation: u64,
}

impl WeightConfiguration {
    pub fn new(metrics: Vec<Metric>) -> Result<Self, ConfigurationError> {
        {
            let mut seen = HashSet::with_capacity(metrics.len());
            for metric in &metrics {
                if !seen.insert(metric.id.as_str()) {
                    return Err(ConfigurationError::DuplicateMetricId(metric.id.clone()));
                }
            }
        }

        Ok(Self {
            metrics,
            just_saved: false,
            generation: 0,
        })
    }

    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    pub fn metric(&self, id: &str) -> Option<&Metric> {
        self.metrics.iter().find(|metric| metric.id == *id)
    }

    /// Flips `enabled` for `id`, keeping its weight. Returns false for unknown ids, which
    /// leave the configuration untouched.
    pub fn toggle_metric(&mut self, id: &str) -> bool {
        let Some(metric) = self.metrics.iter_mut().find(|metric| metric.id == *id) else {
            return false;
        };
        metric.enabled = !metric.enabled;
        self.touch();
        true
    }

    /// Stores the coerced `raw` weight for `id`. Returns false for unknown ids.
    pub fn set_weight(&mut self, id: &str, raw: impl Into<WeightInput>) -> bool {
        let weight = raw.into().coerce();
        let Some(metric) = self.metrics.iter_mut().find(|metric| metric.id == *id) else {
            return false;
        };
        metric.weight = weight;
        self.touch();
        true
    }

    pub fn total_weight(&self) -> u64 {
        self.metrics
            .iter()
            .map(|metric| u64::from(metric.effective_weight()))
            .sum()
    }

    pub fn is_valid(&self) -> bool {
        self.total_weight() == REQUIRED_TOTAL
    }

    pub fn validation(&self) -> WeightValidation {
        WeightValidation::from_total(self.total_weight())
    }

    pub fn validation_message(&self) -> Option<String> {
        self.validation().message()
    }

    pub fn just_saved(&self) -> bool {
        self.just_saved
    }

    pub fn state(&self) -> ConfigurationState {
        if self.just_saved {
            ConfigurationState::Saved
        } else if self.is_valid() {
            ConfigurationState::DirtyValid
        } else {
            ConfigurationState::DirtyInvalid
        }
    }

    pub fn snapshot(&self) -> Vec<MetricSnapshot> {
        self.metrics.iter().map(Metric::snapshot).collect()
    }

    /// Raises the confirmation flag. Callers gate this on `is_valid` and a completed
    /// persistence call.
    pub fn mark_saved(&mut self) -> SaveTicket {
        self.generation += 1;
        self.just_saved = true;
        SaveTicket(self.generation)
    }

    /// Drops the confirmation if nothing happened since `ticket` was issued.
    pub fn clear_confirmation(&mut self, ticket: SaveTicket) -> bool {
        if self.just_saved && ticket.0 == self.generation {
            self.just_saved = false;
            true
        } else {
            false
        }
    }

    /// Overlays stored enabled flags and weights onto matching ids.
    pub fn apply_snapshot(&mut self, stored: &[MetricSnapshot]) -> usize {
        let mut applied = 0;
        for entry in stored {
            if let Some(metric) = self.metrics.iter_mut().find(|metric| metric.id == entry.id) {
                metric.enabled = entry.enabled;
                metric.weight = entry.weight;
                applied += 1;
            }
        }
        if applied > 0 {
            self.touch();
        }
        applied
    }

    fn touch(&mut self) {
        self.generation += 1;
        self.just_saved = false;
    }
}

impl fmt::Display for WeightConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for metric in &self.metrics {
            let marker = if metric.enabled { "x" } else { " " };
            writeln!(
                f,
                "[{marker}] {:<20} {:>4}%  {}",
                metric.id.as_str(),
                metric.weight,
                metric.name
            )?;
        }
        write!(f, "total {}%", self.total_weight())?;
        if let Some(message) = self.validation_message() {
            write!(f, " ({message})")?;
        }
        Ok(())
    }
}
