//! Health-score weighting: the metric catalogue, the exactly-100 allocation rule, and the
//! editing session that gates persistence on it.

pub mod defaults;
pub mod domain;
pub mod import;
pub mod repository;
pub mod router;
pub mod service;
pub mod view;
pub mod weights;

#[cfg(test)]
mod tests;

pub use defaults::reference_metrics;
pub use domain::{parse_weight, Metric, MetricId, MetricSnapshot, WeightInput};
pub use import::{MetricCatalogImporter, MetricImportError};
pub use repository::{ConfigurationRecord, RepositoryError, WeightRepository};
pub use router::{health_score_router, WeightUpdateRequest};
pub use service::{HealthScoreService, HealthScoreServiceError, SaveRejection};
pub use view::ConfigurationView;
pub use weights::{
    ConfigurationError, ConfigurationState, SaveTicket, WeightConfiguration, WeightValidation,
    REQUIRED_TOTAL,
};
