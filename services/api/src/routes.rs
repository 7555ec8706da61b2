use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use health_pulse::scoring::{health_score_router, HealthScoreService, WeightRepository};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_health_score_routes<R>(service: Arc<HealthScoreService<R>>) -> axum::Router
where
    R: WeightRepository + 'static,
{
    health_score_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::InMemoryWeightRepository;
    use health_pulse::scoring::{reference_metrics, WeightConfiguration};
    use std::time::Duration;
    use tower::ServiceExt;

    fn service() -> Arc<HealthScoreService<InMemoryWeightRepository>> {
        let configuration =
            WeightConfiguration::new(reference_metrics()).expect("reference ids are unique");
        Arc::new(HealthScoreService::new(
            Arc::new(InMemoryWeightRepository::default()),
            configuration,
            Duration::from_secs(3),
        ))
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn merged_router_serves_weight_routes() {
        let router = with_health_score_routes(service());

        let response = router
            .oneshot(
                axum::http::Request::get("/api/v1/health-score/weights")
                    .body(axum::body::Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
            .await
            .expect("read body");
        let payload: serde_json::Value = serde_json::from_slice(&body).expect("json payload");
        assert_eq!(payload["total_weight"], json!(100));
    }

    #[tokio::test]
    async fn health_route_is_mounted() {
        let router = with_health_score_routes(service());

        let response = router
            .oneshot(
                axum::http::Request::get("/health")
                    .body(axum::body::Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
    }
}
