use std::sync::Arc;
use std::time::Duration;

use mesa_infra::PendingOrderSweep;

fn env_i64(name: &str, default: i64) -> i64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() {
    mesa_observability::init();

    let services = Arc::new(mesa_api::app::services::build_services().await);

    let sweep = PendingOrderSweep::new(
        services.store.clone(),
        services.notifier.clone(),
        Duration::from_secs(env_i64("SWEEP_INTERVAL_SECS", 300) as u64),
        chrono::Duration::minutes(env_i64("SWEEP_MAX_AGE_MINUTES", 30)),
        Duration::from_millis(env_i64("SWEEP_SEND_DELAY_MS", 500) as u64),
    );
    sweep.spawn();

    let app = mesa_api::app::build_app(services);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {bind_addr}: {e}"));

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
