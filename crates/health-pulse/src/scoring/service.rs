use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use super::domain::{Metric, WeightInput};
use super::repository::{ConfigurationRecord, RepositoryError, WeightRepository};
use super::view::ConfigurationView;
use super::weights::{ConfigurationError, SaveTicket, WeightConfiguration, WeightValidation};

/// One editing session over a health-score weight configuration.
///
/// Every operation holds the session lock for its full duration. The confirmation shown
/// after a save is cleared by a scheduled task that any later edit or save aborts.
pub struct HealthScoreService<R> {
    session: Arc<Mutex<Session>>,
    repository: Arc<R>,
    confirmation_window: Duration,
}

struct Session {
    configuration: WeightConfiguration,
    pending_clear: Option<AbortHandle>,
}

impl Session {
    fn cancel_pending_clear(&mut self) {
        if let Some(handle) = self.pending_clear.take() {
            handle.abort();
        }
    }
}

fn lock(session: &Mutex<Session>) -> MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<R> HealthScoreService<R>
where
    R: WeightRepository + 'static,
{
    pub fn new(
        repository: Arc<R>,
        configuration: WeightConfiguration,
        confirmation_window: Duration,
    ) -> Self {
        Self {
            session: Arc::new(Mutex::new(Session {
                configuration,
                pending_clear: None,
            })),
            repository,
            confirmation_window,
        }
    }

    /// Builds a session from `metrics`, overlaying whatever the repository last stored.
    pub fn restore(
        repository: Arc<R>,
        metrics: Vec<Metric>,
        confirmation_window: Duration,
    ) -> Result<Self, HealthScoreServiceError> {
        let mut configuration = WeightConfiguration::new(metrics)?;
        if let Some(record) = repository.load()? {
            let applied = configuration.apply_snapshot(&record.metrics);
            info!(
                applied,
                saved_at = %record.saved_at,
                "restored saved health score weights"
            );
        }
        Ok(Self::new(repository, configuration, confirmation_window))
    }

    pub fn view(&self) -> ConfigurationView {
        ConfigurationView::from(&lock(&self.session).configuration)
    }

    /// Copy of the current configuration.
    pub fn configuration(&self) -> WeightConfiguration {
        lock(&self.session).configuration.clone()
    }

    /// Flip a metric on or off. Unknown ids are ignored.
    pub fn toggle_metric(&self, id: &str) -> ConfigurationView {
        let mut session = lock(&self.session);
        if session.configuration.metric(id).is_none() {
            debug!(metric_id = id, "ignoring toggle for unknown metric");
            return ConfigurationView::from(&session.configuration);
        }

        session.cancel_pending_clear();
        session.configuration.toggle_metric(id);
        ConfigurationView::from(&session.configuration)
    }

    /// Update a metric weight from raw user input. Unknown ids are ignored.
    pub fn set_weight(&self, id: &str, raw: impl Into<WeightInput>) -> ConfigurationView {
        let mut session = lock(&self.session);
        if session.configuration.metric(id).is_none() {
            debug!(metric_id = id, "ignoring weight edit for unknown metric");
            return ConfigurationView::from(&session.configuration);
        }

        session.cancel_pending_clear();
        session.configuration.set_weight(id, raw);
        ConfigurationView::from(&session.configuration)
    }

    /// Persist the configuration if its enabled weights total exactly 100.
    pub fn save(&self) -> Result<ConfigurationView, HealthScoreServiceError> {
        let mut session = lock(&self.session);
        let total_weight = session.configuration.total_weight();
        let validation = session.configuration.validation();
        if !validation.is_valid() {
            warn!(total_weight, "rejected save of unbalanced health score weights");
            return Err(SaveRejection {
                total_weight,
                validation,
            }
            .into());
        }

        let record = ConfigurationRecord::new(session.configuration.snapshot());
        if let Err(err) = self.repository.save(&record) {
            warn!(error = %err, "health score weights could not be persisted");
            return Err(err.into());
        }

        session.cancel_pending_clear();
        let ticket = session.configuration.mark_saved();
        session.pending_clear = self.schedule_clear(ticket);

        info!(
            metrics = record.metrics.len(),
            saved_at = %record.saved_at,
            "health score weights saved"
        );
        Ok(ConfigurationView::from(&session.configuration))
    }

    fn schedule_clear(&self, ticket: SaveTicket) -> Option<AbortHandle> {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("no async runtime; save confirmation clears on the next edit");
            return None;
        };

        let session = Arc::downgrade(&self.session);
        let window = self.confirmation_window;
        let task = runtime.spawn(async move {
            tokio::time::sleep(window).await;
            let Some(session) = session.upgrade() else {
                return;
            };
            let mut session = lock(&session);
            if session.configuration.clear_confirmation(ticket) {
                session.pending_clear = None;
                debug!("save confirmation expired");
            }
        });

        Some(task.abort_handle())
    }
}

impl<R> Drop for HealthScoreService<R> {
    fn drop(&mut self) {
        lock(&self.session).cancel_pending_clear();
    }
}

/// Save attempted while the enabled weights do not total 100.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("enabled weights total {total_weight}%, expected exactly 100%")]
pub struct SaveRejection {
    pub total_weight: u64,
    pub validation: WeightValidation,
}

/// Error raised by the health-score service.
#[derive(Debug, thiserror::Error)]
pub enum HealthScoreServiceError {
    #[error(transparent)]
    Rejected(#[from] SaveRejection),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}
