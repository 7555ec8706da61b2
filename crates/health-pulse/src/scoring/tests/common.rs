use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::response::Response;
use chrono::Utc;
use serde_json::Value;

use crate::scoring::defaults::reference_metrics;
use crate::scoring::repository::{ConfigurationRecord, RepositoryError, WeightRepository};
use crate::scoring::{health_score_router, HealthScoreService, WeightConfiguration};

pub(super) const WINDOW: Duration = Duration::from_secs(3);

pub(super) fn reference_configuration() -> WeightConfiguration {
    WeightConfiguration::new(reference_metrics()).expect("reference ids are unique")
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    stored: Arc<Mutex<Option<ConfigurationRecord>>>,
    saves: Arc<Mutex<Vec<ConfigurationRecord>>>,
}

impl MemoryRepository {
    pub(super) fn seeded(record: ConfigurationRecord) -> Self {
        let repository = Self::default();
        *repository.stored.lock().expect("repository mutex poisoned") = Some(record);
        repository
    }

    pub(super) fn saves(&self) -> Vec<ConfigurationRecord> {
        self.saves.lock().expect("repository mutex poisoned").clone()
    }
}

impl WeightRepository for MemoryRepository {
    fn load(&self) -> Result<Option<ConfigurationRecord>, RepositoryError> {
        Ok(self.stored.lock().expect("repository mutex poisoned").clone())
    }

    fn save(&self, record: &ConfigurationRecord) -> Result<(), RepositoryError> {
        *self.stored.lock().expect("repository mutex poisoned") = Some(record.clone());
        self.saves
            .lock()
            .expect("repository mutex poisoned")
            .push(record.clone());
        Ok(())
    }
}

pub(super) struct UnavailableRepository;

impl WeightRepository for UnavailableRepository {
    fn load(&self) -> Result<Option<ConfigurationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn save(&self, _record: &ConfigurationRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) struct RejectingRepository;

impl WeightRepository for RejectingRepository {
    fn load(&self) -> Result<Option<ConfigurationRecord>, RepositoryError> {
        Ok(None)
    }

    fn save(&self, _record: &ConfigurationRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Rejected("schema mismatch".to_string()))
    }
}

pub(super) fn build_service() -> (HealthScoreService<MemoryRepository>, MemoryRepository) {
    let repository = MemoryRepository::default();
    let service = HealthScoreService::new(
        Arc::new(repository.clone()),
        reference_configuration(),
        WINDOW,
    );
    (service, repository)
}

pub(super) fn stored_record(adoption_enabled: bool, adoption_weight: u32) -> ConfigurationRecord {
    let mut snapshot = reference_configuration().snapshot();
    if let Some(entry) = snapshot.iter_mut().find(|entry| entry.id == *"adoption") {
        entry.enabled = adoption_enabled;
        entry.weight = adoption_weight;
    }
    ConfigurationRecord {
        metrics: snapshot,
        saved_at: Utc::now(),
    }
}

pub(super) fn router_with_service(service: HealthScoreService<MemoryRepository>) -> axum::Router {
    health_score_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
