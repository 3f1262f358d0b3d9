//! HTTP API: pod and deployment verdicts, health checks and Prometheus metrics

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use health_lib::{ComponentStatus, HealthError, HealthRegistry, Scanner};
use prometheus::{Encoder, TextEncoder};
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub scanner: Scanner,
    pub health_registry: HealthRegistry,
}

impl AppState {
    pub fn new(scanner: Scanner, health_registry: HealthRegistry) -> Self {
        Self {
            scanner,
            health_registry,
        }
    }
}

/// A failed pass, reported as a failed request rather than an empty list
struct ScanError(HealthError);

impl IntoResponse for ScanError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            HealthError::SourceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            HealthError::MalformedSnapshot { .. } => StatusCode::BAD_GATEWAY,
        };

        warn!(error = %self.0, status = %status, "Request scan pass failed");
        let body = json!({
            "error": self.0.to_string(),
            "kind": self.0.kind_label(),
        });
        (status, Json(body)).into_response()
    }
}

/// Pod verdicts from a fresh pass, in cluster order
async fn pods(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ScanError> {
    let pass = state.scanner.scan_pods().await.map_err(ScanError)?;
    Ok(Json(pass.verdicts))
}

/// Deployment replica verdicts from a fresh pass, in cluster order
async fn deployments(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ScanError> {
    let pass = state.scanner.scan_deployments().await.map_err(ScanError)?;
    Ok(Json(pass.verdicts))
}

/// Health check response - returns 200 if healthy, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy => StatusCode::OK,
        ComponentStatus::Degraded => StatusCode::OK, // Still operational
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        warn!(error = %e, "Failed to encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/pod", get(pods))
        .route("/pods", get(pods))
        .route("/deploy", get(deployments))
        .route("/deployments", get(deployments))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Start the API server, stopping gracefully once `shutdown` resolves
pub async fn serve(
    port: u16,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use health_lib::health::components;
    use health_lib::{
        ContainerSnapshot, DeploymentSnapshot, PodPhase, PodSnapshot, ResourceKind,
        ResourceSource,
    };
    use tower::ServiceExt;

    enum Behaviour {
        Healthy,
        Unreachable,
        Malformed,
    }

    struct FakeSource(Behaviour);

    #[async_trait]
    impl ResourceSource for FakeSource {
        async fn list_pods(&self, _namespace: Option<&str>) -> health_lib::Result<Vec<PodSnapshot>> {
            match self.0 {
                Behaviour::Unreachable => Err(HealthError::source_unavailable(
                    ResourceKind::Pods,
                    "connection refused",
                )),
                _ => Ok(vec![
                    PodSnapshot::new("web-0", "shop", PodPhase::Running)
                        .with_ready_condition(true)
                        .with_container(ContainerSnapshot::new("app", true)),
                    PodSnapshot::new("web-1", "shop", PodPhase::Running)
                        .with_container(ContainerSnapshot::new("app", true))
                        .with_container(ContainerSnapshot::new("sidecar", false)),
                    PodSnapshot::new("batch-1", "jobs", PodPhase::Failed)
                        .with_failure("Evicted", "node pressure"),
                ]),
            }
        }

        async fn list_deployments(
            &self,
            _namespace: Option<&str>,
        ) -> health_lib::Result<Vec<DeploymentSnapshot>> {
            match self.0 {
                Behaviour::Healthy => Ok(vec![DeploymentSnapshot {
                    name: "web".to_string(),
                    namespace: "shop".to_string(),
                    desired_replicas: 2,
                    ready_replicas: 1,
                }]),
                Behaviour::Unreachable => Err(HealthError::source_unavailable(
                    ResourceKind::Deployments,
                    "connection refused",
                )),
                Behaviour::Malformed => Err(HealthError::MalformedSnapshot {
                    kind: ResourceKind::Deployments,
                    namespace: "shop".to_string(),
                    name: "web".to_string(),
                    field: "spec.replicas",
                }),
            }
        }
    }

    async fn setup_test_app(behaviour: Behaviour) -> (Router, Arc<AppState>) {
        let health_registry = HealthRegistry::new();
        health_registry.register(components::SCHEDULER).await;
        health_registry.register(components::RESOURCE_SOURCE).await;

        let scanner = Scanner::new(Arc::new(FakeSource(behaviour)));
        let state = Arc::new(AppState::new(scanner, health_registry));
        (create_router(state.clone()), state)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_pods_returns_verdicts_in_order() {
        for uri in ["/pod", "/pods"] {
            let (app, _state) = setup_test_app(Behaviour::Healthy).await;

            let (status, body) = get_json(app, uri).await;

            assert_eq!(status, StatusCode::OK);
            let verdicts = body.as_array().unwrap();
            assert_eq!(verdicts.len(), 3);
            assert_eq!(verdicts[0]["name"], "web-0");
            assert_eq!(verdicts[0]["status"], "Ready");
            assert_eq!(verdicts[1]["status"], "NotReady");
            assert_eq!(verdicts[1]["containers"][1]["name"], "sidecar");
            assert_eq!(verdicts[1]["containers"][1]["ready"], false);
            assert_eq!(verdicts[2]["status"], "Failed");
            assert_eq!(verdicts[2]["reason"], "Evicted");
            assert_eq!(verdicts[2]["message"], "node pressure");
        }
    }

    #[tokio::test]
    async fn test_deployments_returns_replica_counts() {
        for uri in ["/deploy", "/deployments"] {
            let (app, _state) = setup_test_app(Behaviour::Healthy).await;

            let (status, body) = get_json(app, uri).await;

            assert_eq!(status, StatusCode::OK);
            assert_eq!(body[0]["name"], "web");
            assert_eq!(body[0]["desiredReplicas"], 2);
            assert_eq!(body[0]["readyReplicas"], 1);
        }
    }

    #[tokio::test]
    async fn test_source_failure_is_a_failed_request() {
        let (app, _state) = setup_test_app(Behaviour::Unreachable).await;

        let (status, body) = get_json(app, "/pod").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["kind"], "source_unavailable");
        assert!(body["error"].as_str().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_malformed_deployment_is_a_failed_request() {
        let (app, _state) = setup_test_app(Behaviour::Malformed).await;

        let (status, body) = get_json(app, "/deploy").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["kind"], "malformed_snapshot");
    }

    #[tokio::test]
    async fn test_healthz_reflects_source_failures() {
        let (app, state) = setup_test_app(Behaviour::Healthy).await;
        let (status, body) = get_json(app.clone(), "/healthz").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        state
            .health_registry
            .record_failure(components::RESOURCE_SOURCE, "timeout")
            .await;
        let (status, body) = get_json(app.clone(), "/healthz").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");

        for _ in 0..2 {
            state
                .health_registry
                .record_failure(components::RESOURCE_SOURCE, "timeout")
                .await;
        }
        let (status, body) = get_json(app, "/healthz").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "unhealthy");
    }

    #[tokio::test]
    async fn test_readyz() {
        let (app, state) = setup_test_app(Behaviour::Healthy).await;

        let (status, body) = get_json(app.clone(), "/readyz").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["ready"], false);

        state.health_registry.set_ready(true).await;
        let (status, body) = get_json(app, "/readyz").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ready"], true);
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let (app, _state) = setup_test_app(Behaviour::Healthy).await;

        // a pass registers and populates the scan metrics
        let _ = get_json(app.clone(), "/pod").await;

        let response = app
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8_lossy(&body);
        assert!(text.contains("health_agent_scan_latency_seconds"));
    }

    #[tokio::test]
    async fn test_serve_fails_when_port_is_taken() {
        let (_app, state) = setup_test_app(Behaviour::Healthy).await;
        let occupied = tokio::net::TcpListener::bind("0.0.0.0:0").await.unwrap();
        let port = occupied.local_addr().unwrap().port();

        let result = serve(port, state, std::future::pending()).await;

        assert!(result.is_err());
    }
}
