use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryClinicRepository, LoggingAlertPublisher};
use crate::routes::with_clinic_routes;
use anc_risk::clinic::ClinicService;
use anc_risk::config::AppConfig;
use anc_risk::error::AppError;
use anc_risk::telemetry;
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

    let repository = Arc::new(InMemoryClinicRepository::default());
    let alerts = Arc::new(LoggingAlertPublisher);
    let facility = config.clinic.facility.clone();
    let clinic_service = Arc::new(ClinicService::new(repository, alerts, config.clinic));

    let app = with_clinic_routes(clinic_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, %facility, "anc risk service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
