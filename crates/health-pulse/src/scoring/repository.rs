use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::MetricSnapshot;

/// Weight configuration as handed to the persistence collaborator on save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationRecord {
    pub metrics: Vec<MetricSnapshot>,
    pub saved_at: DateTime<Utc>,
}

impl ConfigurationRecord {
    pub fn new(metrics: Vec<MetricSnapshot>) -> Self {
        Self {
            metrics,
            saved_at: Utc::now(),
        }
    }

    pub fn enabled_total(&self) -> u64 {
        self.metrics
            .iter()
            .filter(|metric| metric.enabled)
            .map(|metric| u64::from(metric.weight))
            .sum()
    }
}

/// Storage abstraction supplied by the hosting application.
pub trait WeightRepository: Send + Sync {
    /// Previously saved configuration, if any, used to seed a new session.
    fn load(&self) -> Result<Option<ConfigurationRecord>, RepositoryError>;
    fn save(&self, record: &ConfigurationRecord) -> Result<(), RepositoryError>;
}

/// Error enumeration for persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("weight store unavailable: {0}")]
    Unavailable(String),
    #[error("weight store rejected the configuration: {0}")]
    Rejected(String),
}
