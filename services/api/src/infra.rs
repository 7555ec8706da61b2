use health_pulse::scoring::{
    reference_metrics, ConfigurationRecord, Metric, MetricCatalogImporter, MetricImportError,
    RepositoryError, WeightRepository,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local weight store holding only the most recent save.
#[derive(Default, Clone)]
pub(crate) struct InMemoryWeightRepository {
    latest: Arc<Mutex<Option<ConfigurationRecord>>>,
    saves: Arc<AtomicUsize>,
}

impl WeightRepository for InMemoryWeightRepository {
    fn load(&self) -> Result<Option<ConfigurationRecord>, RepositoryError> {
        Ok(self.latest())
    }

    fn save(&self, record: &ConfigurationRecord) -> Result<(), RepositoryError> {
        let mut guard = self.latest.lock().expect("repository mutex poisoned");
        *guard = Some(record.clone());
        self.saves.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

impl InMemoryWeightRepository {
    pub(crate) fn latest(&self) -> Option<ConfigurationRecord> {
        self.latest.lock().expect("repository mutex poisoned").clone()
    }

    pub(crate) fn save_count(&self) -> usize {
        self.saves.load(Ordering::Relaxed)
    }
}

/// Metric catalogue from CSV when a path is given, otherwise the reference set.
pub(crate) fn load_metrics(path: Option<&Path>) -> Result<Vec<Metric>, MetricImportError> {
    match path {
        Some(path) => MetricCatalogImporter::from_path(path),
        None => Ok(reference_metrics()),
    }
}

pub(crate) fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((id, value)) if !id.trim().is_empty() => {
            Ok((id.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected METRIC_ID=WEIGHT, got '{raw}'")),
    }
}
