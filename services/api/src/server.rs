use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryRentalRepository, LogNotifier};
use crate::routes::with_rental_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;
use verhuur::config::AppConfig;
use verhuur::error::AppError;
use verhuur::rentals::policy::RoleMatrix;
use verhuur::rentals::service::BackOffice;
use verhuur::telemetry;

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

    let repository = Arc::new(InMemoryRentalRepository::default());
    let notifier = Arc::new(LogNotifier);
    let back_office = Arc::new(BackOffice::new(
        repository,
        notifier,
        Arc::new(RoleMatrix),
        config.billing,
    ));

    let app = with_rental_routes(back_office)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "rental back office ready");

    axum::serve(listener, app).await?;
    Ok(())
}
