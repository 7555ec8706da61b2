use crate::infra::{load_metrics, parse_assignment, InMemoryWeightRepository};
use clap::Args;
use health_pulse::error::AppError;
use health_pulse::scoring::{
    ConfigurationView, HealthScoreService, HealthScoreServiceError, SaveRejection,
    WeightConfiguration,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug, Default)]
pub(crate) struct ShowArgs {
    /// CSV metric catalogue (defaults to the reference metrics)
    #[arg(long)]
    pub(crate) metrics_csv: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct CheckArgs {
    /// CSV metric catalogue (defaults to the reference metrics)
    #[arg(long)]
    pub(crate) metrics_csv: Option<PathBuf>,
    /// Metric ids to switch off
    #[arg(long)]
    pub(crate) disable: Vec<String>,
    /// Metric ids to switch on
    #[arg(long)]
    pub(crate) enable: Vec<String>,
    /// Weight edits as METRIC_ID=VALUE; malformed values count as 0
    #[arg(long, value_parser = parse_assignment)]
    pub(crate) set: Vec<(String, String)>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// How long the saved confirmation stays up, in milliseconds
    #[arg(long, default_value_t = 3_000)]
    pub(crate) confirmation_ms: u64,
}

pub(crate) fn run_weights_show(args: ShowArgs) -> Result<(), AppError> {
    let metrics = load_metrics(args.metrics_csv.as_deref())?;
    let configuration = WeightConfiguration::new(metrics)?;
    println!("{configuration}");
    Ok(())
}

pub(crate) fn run_weights_check(args: CheckArgs) -> Result<(), AppError> {
    let metrics = load_metrics(args.metrics_csv.as_deref())?;
    let mut configuration = WeightConfiguration::new(metrics)?;
    apply_edits(&mut configuration, &args);

    println!("{configuration}");
    let validation = configuration.validation();
    if validation.is_valid() {
        println!("Save permitted.");
        Ok(())
    } else {
        println!("Save blocked.");
        Err(HealthScoreServiceError::Rejected(SaveRejection {
            total_weight: configuration.total_weight(),
            validation,
        })
        .into())
    }
}

fn apply_edits(configuration: &mut WeightConfiguration, args: &CheckArgs) {
    for id in &args.disable {
        set_enabled(configuration, id, false);
    }
    for id in &args.enable {
        set_enabled(configuration, id, true);
    }
    for (id, value) in &args.set {
        if !configuration.set_weight(id, value.as_str()) {
            println!("  (skipped unknown metric '{id}')");
        }
    }
}

fn set_enabled(configuration: &mut WeightConfiguration, id: &str, enabled: bool) {
    match configuration.metric(id).map(|metric| metric.enabled) {
        Some(current) if current != enabled => {
            configuration.toggle_metric(id);
        }
        Some(_) => {}
        None => println!("  (skipped unknown metric '{id}')"),
    }
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let repository = Arc::new(InMemoryWeightRepository::default());
    let window = Duration::from_millis(args.confirmation_ms);
    let service = HealthScoreService::restore(repository.clone(), load_metrics(None)?, window)?;

    println!("Health score weighting demo");
    render_view("Reference weights", &service.view());

    let saved = service.save()?;
    render_view("After save", &saved);

    let view = service.toggle_metric("adoption");
    render_view("Adoption disabled", &view);
    match service.save() {
        Ok(_) => println!("  Unexpected: save accepted"),
        Err(err) => println!("  Save rejected: {err}"),
    }

    let view = service.toggle_metric("adoption");
    render_view("Adoption re-enabled", &view);

    service.save()?;
    tokio::time::sleep(window + Duration::from_millis(50)).await;
    render_view("After confirmation window", &service.view());

    println!("\nPersisted saves: {}", repository.save_count());
    if let Some(latest) = repository.latest() {
        println!(
            "Latest save at {} ({}% enabled)",
            latest
                .saved_at
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            latest.enabled_total()
        );
    }
    Ok(())
}

fn render_view(title: &str, view: &ConfigurationView) {
    println!("\n{title}");
    for metric in &view.metrics {
        let marker = if metric.enabled { "on " } else { "off" };
        println!("  [{marker}] {:<18} {:>3}%", metric.name, metric.weight);
    }
    println!(
        "  total {}% | state {} | saved banner {}",
        view.total_weight,
        view.state.label(),
        if view.just_saved { "shown" } else { "hidden" }
    );
    if let Some(message) = &view.message {
        println!("  {message}");
    }
}
