use crate::cli::ServeArgs;
use crate::infra::{AppState, Pipelines};
use crate::routes::router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use carebridge::config::AppConfig;
use carebridge::error::AppError;
use carebridge::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
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

    telemetry::init(&config.telemetry, config.environment)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let pipelines = Pipelines::from_config(&config);
    let app = router(pipelines)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        environment = ?config.environment,
        %addr,
        generator = %config.generator.model,
        "carebridge api ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
