use super::common::*;
use crate::scoring::repository::RepositoryError;
use crate::scoring::weights::{ConfigurationState, WeightValidation};
use crate::scoring::{
    reference_metrics, HealthScoreService, HealthScoreServiceError, SaveRejection,
};
use std::sync::Arc;
use std::time::Duration;

async fn advance(duration: Duration) {
    tokio::time::sleep(duration).await;
    tokio::task::yield_now().await;
}

#[tokio::test(start_paused = true)]
async fn save_persists_snapshot_and_raises_confirmation() {
    let (service, repository) = build_service();

    let view = service.save().expect("valid configuration saves");

    assert!(view.just_saved);
    assert_eq!(view.state, ConfigurationState::Saved);
    let saves = repository.saves();
    assert_eq!(saves.len(), 1);
    assert_eq!(saves[0].metrics.len(), 6);
    assert_eq!(saves[0].enabled_total(), 100);
}

#[tokio::test(start_paused = true)]
async fn confirmation_clears_after_window() {
    let (service, _repository) = build_service();
    service.save().expect("valid configuration saves");

    advance(Duration::from_secs(2)).await;
    assert!(service.view().just_saved);

    advance(Duration::from_millis(1_100)).await;
    let view = service.view();
    assert!(!view.just_saved);
    assert_eq!(view.state, ConfigurationState::DirtyValid);
}

#[tokio::test(start_paused = true)]
async fn mutation_clears_confirmation_immediately() {
    let (service, _repository) = build_service();
    service.save().expect("valid configuration saves");

    let view = service.set_weight("product_usage", 25);

    assert!(!view.just_saved);
    assert_eq!(view.state, ConfigurationState::DirtyValid);
}

#[tokio::test(start_paused = true)]
async fn stale_clear_does_not_cut_short_a_later_save() {
    let (service, _repository) = build_service();
    service.save().expect("first save");

    advance(Duration::from_secs(2)).await;
    service.toggle_metric("nps");
    service.toggle_metric("nps");
    service.save().expect("second save");

    // first window would have ended at 3s
    advance(Duration::from_millis(1_500)).await;
    assert!(service.view().just_saved);

    advance(Duration::from_secs(2)).await;
    assert!(!service.view().just_saved);
}

#[tokio::test(start_paused = true)]
async fn invalid_save_is_rejected_without_side_effects() {
    let (service, repository) = build_service();
    service.toggle_metric("adoption");

    let before = service.configuration();
    match service.save() {
        Err(HealthScoreServiceError::Rejected(SaveRejection {
            total_weight,
            validation,
        })) => {
            assert_eq!(total_weight, 90);
            assert_eq!(validation, WeightValidation::UnderAllocated { deficit: 10 });
        }
        other => panic!("expected rejected save, got {other:?}"),
    }

    assert!(repository.saves().is_empty());
    assert_eq!(service.configuration(), before);
    assert_eq!(service.view().state, ConfigurationState::DirtyInvalid);
}

#[tokio::test(start_paused = true)]
async fn oversized_weight_entry_cannot_be_saved() {
    let (service, repository) = build_service();
    service.set_weight("adoption", 20);
    let view = service.set_weight("billing", "99999999999");

    assert!(!view.valid);
    assert!(matches!(
        service.save(),
        Err(HealthScoreServiceError::Rejected(SaveRejection {
            validation: WeightValidation::OverAllocated { .. },
            ..
        }))
    ));
    assert!(repository.saves().is_empty());
}

#[tokio::test(start_paused = true)]
async fn persistence_failure_is_surfaced_and_flag_stays_unset() {
    let service = HealthScoreService::new(
        Arc::new(UnavailableRepository),
        reference_configuration(),
        WINDOW,
    );

    match service.save() {
        Err(HealthScoreServiceError::Repository(RepositoryError::Unavailable(_))) => {}
        other => panic!("expected repository failure, got {other:?}"),
    }
    let view = service.view();
    assert!(!view.just_saved);
    assert_eq!(view.state, ConfigurationState::DirtyValid);
}

#[tokio::test(start_paused = true)]
async fn unknown_ids_do_not_cancel_confirmation() {
    let (service, _repository) = build_service();
    service.save().expect("valid configuration saves");
    let before = service.configuration();

    service.toggle_metric("nonexistent");
    service.set_weight("nonexistent", 50);

    assert_eq!(service.configuration(), before);
    assert!(service.view().just_saved);

    advance(WINDOW + Duration::from_millis(10)).await;
    assert!(!service.view().just_saved);
}

#[tokio::test(start_paused = true)]
async fn adoption_scenario() {
    let (service, repository) = build_service();

    let view = service.view();
    assert_eq!(view.total_weight, 100);
    assert!(view.valid);
    assert!(service.save().expect("initial save").just_saved);

    let view = service.toggle_metric("adoption");
    assert_eq!(view.total_weight, 90);
    assert!(!view.valid);
    assert!(!view.just_saved);
    assert_eq!(
        view.validation,
        WeightValidation::UnderAllocated { deficit: 10 }
    );
    assert!(matches!(
        service.save(),
        Err(HealthScoreServiceError::Rejected(_))
    ));

    let view = service.toggle_metric("adoption");
    assert_eq!(view.total_weight, 100);
    assert!(view.valid);
    assert!(!view.just_saved);
    assert_eq!(view.state, ConfigurationState::DirtyValid);
    assert_eq!(repository.saves().len(), 1);
}

#[test]
fn save_without_runtime_keeps_confirmation_until_next_edit() {
    let (service, repository) = build_service();

    assert!(service.save().expect("saves without runtime").just_saved);
    assert_eq!(repository.saves().len(), 1);
    assert!(service.view().just_saved);

    assert!(!service.toggle_metric("billing").just_saved);
}

#[test]
fn restore_overlays_stored_weights() {
    let repository = Arc::new(MemoryRepository::seeded(stored_record(true, 35)));

    let service = HealthScoreService::restore(repository, reference_metrics(), WINDOW)
        .expect("session restores");

    let view = service.view();
    let adoption = view
        .metrics
        .iter()
        .find(|metric| metric.id.as_str() == "adoption")
        .expect("adoption present");
    assert_eq!(adoption.weight, 35);
    assert_eq!(view.total_weight, 125);
    assert_eq!(view.state, ConfigurationState::DirtyInvalid);
}

#[test]
fn restore_propagates_load_failures() {
    let result =
        HealthScoreService::restore(Arc::new(UnavailableRepository), reference_metrics(), WINDOW);

    assert!(matches!(
        result,
        Err(HealthScoreServiceError::Repository(
            RepositoryError::Unavailable(_)
        ))
    ));
}
