use crate::infra::{AppState, Workspace};
use ai_intake::error::AppError;
use ai_intake::workflows::dashboard::DashboardStats;
use ai_intake::workflows::intake::intake_router;
use ai_intake::workflows::registry::registry_router;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;

pub(crate) fn with_platform_routes(workspace: Workspace) -> axum::Router {
    intake_router(workspace.intakes.clone())
        .merge(registry_router(workspace.registry.clone()))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/dashboard/stats", axum::routing::get(dashboard_stats_endpoint))
        .layer(Extension(workspace))
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

pub(crate) async fn dashboard_stats_endpoint(
    Extension(workspace): Extension<Workspace>,
) -> Result<Json<DashboardStats>, AppError> {
    let use_cases = workspace.registry.all()?;
    let intakes = workspace.intakes.all()?;
    Ok(Json(DashboardStats::collect(&use_cases, &intakes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_intake::workflows::intake::{IntakePolicy, IntakeSectionUpdate, NewIntake};
    use ai_intake::workflows::registry::UseCaseDraft;
    use ai_intake::workflows::risk::ExternalSharing;
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app_state(ready: bool) -> AppState {
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        }
    }

    async fn get_json(router: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router
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
    async fn readiness_tracks_the_flag() {
        let workspace = Workspace::in_memory(IntakePolicy::default());

        let router = with_platform_routes(workspace.clone()).layer(Extension(app_state(false)));
        let (status, body) = get_json(router, "/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "initializing");

        let router = with_platform_routes(workspace).layer(Extension(app_state(true)));
        let (status, _) = get_json(router, "/ready").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn dashboard_stats_roll_up_both_stores() {
        let workspace = Workspace::in_memory(IntakePolicy::default());
        workspace
            .registry
            .create(UseCaseDraft {
                title: "Benefits chatbot".to_string(),
                owner: "HR Ops".to_string(),
                business_unit: "People".to_string(),
                purpose: "Answer benefits questions".to_string(),
                model_type: "LLM".to_string(),
                vendor: "Internal".to_string(),
                data_types: vec!["employee data".to_string(), "health data".to_string()],
                data_residency: "us".to_string(),
                external_sharing: ExternalSharing::Yes,
                status: Default::default(),
            })
            .expect("registers");
        let intake = workspace
            .intakes
            .create(NewIntake {
                system_name: "Benefits chatbot".to_string(),
                business_owner: None,
                business_owner_email: None,
            })
            .expect("intake opens");
        let update: IntakeSectionUpdate =
            serde_json::from_str(r#"{"readiness": {"readiness_status": "approved"}}"#).unwrap();
        workspace
            .intakes
            .autosave(&intake.id, &update)
            .expect("autosave");

        let router = with_platform_routes(workspace).layer(Extension(app_state(true)));
        let (status, body) = get_json(router, "/dashboard/stats").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_count"], 1);
        assert_eq!(body["high_risk_count"], 1);
        assert_eq!(body["external_sharing_pct"], 100.0);
        assert_eq!(body["risk_distribution"]["high"], 1);
        assert_eq!(body["high_risk_items"][0]["title"], "Benefits chatbot");
        assert_eq!(body["intake_stats"]["total"], 1);
        assert_eq!(body["intake_stats"]["draft"], 1);
        assert_eq!(body["intake_stats"]["approved"], 1);
    }

    #[tokio::test]
    async fn health_is_always_ok() {
        let router = with_platform_routes(Workspace::in_memory(IntakePolicy::default()));
        let (status, body) = get_json(router, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}
