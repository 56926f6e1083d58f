use crate::cli::ServeArgs;
use crate::infra::{AppState, Workspace};
use crate::routes::with_platform_routes;
use ai_intake::config::AppConfig;
use ai_intake::error::AppError;
use ai_intake::telemetry;
use ai_intake::workflows::intake::IntakePolicy;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
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

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let policy = IntakePolicy::from(&config.intake);
    info!(
        lock_submitted = policy.lock_submitted,
        page_limit = policy.page_limit,
        "intake policy loaded"
    );
    let workspace = Workspace::in_memory(policy);

    let app = with_platform_routes(workspace)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "ai governance intake service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
