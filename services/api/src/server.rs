use crate::cli::ServeArgs;
use crate::infra::{load_metrics, AppState, InMemoryWeightRepository};
use crate::routes::with_health_score_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use health_pulse::config::AppConfig;
use health_pulse::error::AppError;
use health_pulse::scoring::HealthScoreService;
use health_pulse::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(path) = args.metrics_csv.take() {
        config.scoring.metrics_csv = Some(path);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let metrics = load_metrics(config.scoring.metrics_csv.as_deref())?;
    let repository = Arc::new(InMemoryWeightRepository::default());
    let service = Arc::new(HealthScoreService::restore(
        repository,
        metrics,
        config.scoring.confirmation_window,
    )?);
    let view = service.view();
    info!(
        metrics = view.metrics.len(),
        total_weight = view.total_weight,
        valid = view.valid,
        "health score session initialized"
    );

    let app = with_health_score_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "health score settings service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
