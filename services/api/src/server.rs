use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryTrackerRepository};
use crate::routes::with_admission_routes;
use admission_tracker::admission::AdmissionTrackerService;
use admission_tracker::config::AppConfig;
use admission_tracker::error::AppError;
use admission_tracker::telemetry;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
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

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let rules = config.competition.rules();
    let repository = Arc::new(InMemoryTrackerRepository::default());
    let tracker = Arc::new(AdmissionTrackerService::new(repository, rules));

    let app = with_admission_routes(tracker)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "admission tracker ready");

    axum::serve(listener, app).await?;
    Ok(())
}
