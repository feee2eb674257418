use crate::cli::ServeArgs;
use crate::infra::{build_store, AppState, SharedStore};
use crate::routes::api_router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use eu_admit::config::AppConfig;
use eu_admit::error::AppError;
use eu_admit::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

fn apply_overrides(config: &mut AppConfig, args: ServeArgs) {
    let ServeArgs { host, port } = args;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
}

pub(crate) async fn run(args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    apply_overrides(&mut config, args);
    telemetry::init(&config.telemetry)?;

    let store: SharedStore = Arc::new(RwLock::new(build_store(&config)?));
    {
        let guard = store.read().await;
        info!(
            universities = guard.catalog().len(),
            applications = guard.applications().len(),
            persisted = config.storage.data_dir.is_some(),
            "app store ready"
        );
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let ready = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: Arc::clone(&ready),
        metrics: Arc::new(prometheus_handle),
    };

    let app = api_router(store)
        .layer(Extension(state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    ready.store(true, Ordering::Release);
    info!(environment = ?config.environment, %addr, "eu admit service listening");

    axum::serve(listener, app).await?;
    Ok(())
}
