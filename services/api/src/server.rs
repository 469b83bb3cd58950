use crate::cli::ServeArgs;
use crate::infra::{override_artifacts, AppState};
use crate::routes::with_forecast_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;
use waterway::config::AppConfig;
use waterway::error::AppError;
use waterway::forecast::{ForecastContext, ForecastState};
use waterway::telemetry;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    let artifacts = override_artifacts(config.artifacts.clone(), args.model, args.projections);

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let context = ForecastContext::load(&artifacts);
    let model_enabled = context.model_enabled();
    let forecast_state = Arc::new(ForecastState::new(
        context,
        config.forecast.default_city.clone(),
    ));

    let app = with_forecast_routes(forecast_state)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, model_enabled, "forecast service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
