use serde::Serialize;

use super::domain::Metric;
use super::weights::{ConfigurationState, WeightConfiguration, WeightValidation};

/// Render-ready projection of the configuration with its derived totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigurationView {
    pub metrics: Vec<Metric>,
    pub total_weight: u64,
    pub valid: bool,
    pub validation: WeightValidation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub state: ConfigurationState,
    pub just_saved: bool,
}

impl From<&WeightConfiguration> for ConfigurationView {
    fn from(configuration: &WeightConfiguration) -> Self {
        let validation = configuration.validation();
        Self {
            metrics: configuration.metrics().to_vec(),
            total_weight: configuration.total_weight(),
            valid: validation.is_valid(),
            validation,
            message: validation.message(),
            state: configuration.state(),
            just_saved: configuration.just_saved(),
        }
    }
}
