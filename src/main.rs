//! motord entry point: wires the store, driver, telemetry hub, and HTTP
//! server together and runs until interrupted.

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::broadcast;
use tracing::info;

use motord::clock;
use motord::config::Config;
use motord::control::MotorControl;
use motord::driver::MotorDriver;
use motord::logging;
use motord::motor::Motor;
use motord::services::web::{self, AppState, WebServerConfig};
use motord::simulator::Simulator;
use motord::store::MotorStore;
use motord::telemetry::TelemetryHub;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_tracing();

    let config = Config::from_env();
    info!(
        port = config.web.port,
        poll_ms = config.driver.poll_interval_ms,
        "starting motord"
    );

    let store = Arc::new(MotorStore::new(Motor::new(clock::unix_ms())));
    let hub = Arc::new(TelemetryHub::default());

    // One shutdown channel fans out to every long-lived task.
    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let driver = MotorDriver::new(
        Simulator::new(Arc::clone(&store)),
        Arc::clone(&store),
        Arc::clone(&hub),
        config.driver.clone(),
    );
    let driver_task = tokio::spawn(driver.run(shutdown_tx.subscribe()));

    let state = Arc::new(AppState::new(
        MotorControl::new(Arc::clone(&store), Arc::clone(&hub)),
        Arc::clone(&hub),
    ));

    let notify_shutdown = shutdown_tx.clone();
    let shutdown = async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown signal received");
        let _ = notify_shutdown.send(());
    };

    web::run_server_with_state(state, WebServerConfig::from_config(&config.web), shutdown)
        .await
        .context("web server failed")?;

    driver_task.await.context("driver task panicked")?;
    info!("motord stopped");
    Ok(())
}
