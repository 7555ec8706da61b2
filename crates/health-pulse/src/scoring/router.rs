use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::WeightInput;
use super::repository::{RepositoryError, WeightRepository};
use super::service::{HealthScoreService, HealthScoreServiceError};
use super::weights::WeightValidation;

/// Body of a weight edit; `null` or a missing value counts as malformed input.
#[derive(Debug, Deserialize)]
pub struct WeightUpdateRequest {
    #[serde(default)]
    pub weight: Option<WeightInput>,
}

/// Router builder exposing the weight configuration endpoints.
///
/// Save sits outside `/weights/` so every path segment below it stays a metric id.
pub fn health_score_router<R>(service: Arc<HealthScoreService<R>>) -> Router
where
    R: WeightRepository + 'static,
{
    Router::new()
        .route("/api/v1/health-score/weights", get(view_handler::<R>))
        .route("/api/v1/health-score/save", post(save_handler::<R>))
        .route(
            "/api/v1/health-score/weights/:metric_id",
            axum::routing::put(set_weight_handler::<R>),
        )
        .route(
            "/api/v1/health-score/weights/:metric_id/toggle",
            post(toggle_handler::<R>),
        )
        .with_state(service)
}

pub(crate) async fn view_handler<R>(State(service): State<Arc<HealthScoreService<R>>>) -> Response
where
    R: WeightRepository + 'static,
{
    (StatusCode::OK, Json(service.view())).into_response()
}

pub(crate) async fn toggle_handler<R>(
    State(service): State<Arc<HealthScoreService<R>>>,
    Path(metric_id): Path<String>,
) -> Response
where
    R: WeightRepository + 'static,
{
    let view = service.toggle_metric(&metric_id);
    (StatusCode::OK, Json(view)).into_response()
}

pub(crate) async fn set_weight_handler<R>(
    State(service): State<Arc<HealthScoreService<R>>>,
    Path(metric_id): Path<String>,
    Json(request): Json<WeightUpdateRequest>,
) -> Response
where
    R: WeightRepository + 'static,
{
    let raw = request
        .weight
        .unwrap_or_else(|| WeightInput::Text(String::new()));
    let view = service.set_weight(&metric_id, raw);
    (StatusCode::OK, Json(view)).into_response()
}

pub(crate) async fn save_handler<R>(State(service): State<Arc<HealthScoreService<R>>>) -> Response
where
    R: WeightRepository + 'static,
{
    match service.save() {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(HealthScoreServiceError::Rejected(rejection)) => {
            let mut payload = json!({
                "error": rejection.to_string(),
                "total_weight": rejection.total_weight,
            });
            match rejection.validation {
                WeightValidation::UnderAllocated { deficit } => {
                    payload["deficit"] = json!(deficit);
                }
                WeightValidation::OverAllocated { excess } => {
                    payload["excess"] = json!(excess);
                }
                WeightValidation::Valid => {}
            }
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        Err(HealthScoreServiceError::Repository(error)) => {
            let status = match error {
                RepositoryError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                RepositoryError::Rejected(_) => StatusCode::BAD_GATEWAY,
            };
            let payload = json!({
                "error": error.to_string(),
            });
            (status, Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
