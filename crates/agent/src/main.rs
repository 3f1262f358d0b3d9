//! Health Agent - pod and deployment health reporting
//!
//! Classifies every pod and deployment in the cluster on request over HTTP,
//! and logs a pod health pass on a fixed schedule.

use anyhow::{Context, Result};
use health_lib::{
    health::components, ClusterConnection, HealthRegistry, KubeSource, LogSink, ScanScheduler,
    Scanner, StructuredLogger,
};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;

const AGENT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting health-agent");

    let config = config::AgentConfig::load()?;
    info!(
        instance = %config.instance_name,
        namespace = config.namespace.as_deref().unwrap_or("<all>"),
        "Agent configured"
    );

    let logger = StructuredLogger::new(&config.instance_name);
    let health_registry = HealthRegistry::with_unhealthy_after(config.unhealthy_after);
    health_registry.register(components::RESOURCE_SOURCE).await;

    // One client shared by the scheduler and every request handler
    let connection = ClusterConnection {
        kubeconfig: config.kubeconfig.clone(),
    };
    let client = connection
        .connect()
        .await
        .context("Failed to connect to the cluster")?;

    let mut scanner = Scanner::new(Arc::new(KubeSource::new(client)));
    if let Some(namespace) = &config.namespace {
        scanner = scanner.with_namespace(namespace.clone());
    }

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let scheduler = ScanScheduler::new(
        scanner.clone(),
        Arc::new(LogSink::new(logger.clone())),
        health_registry.clone(),
        logger.clone(),
        config.scheduler(),
    );
    let scheduler_handle = tokio::spawn(scheduler.run(shutdown_tx.subscribe()));

    let app_state = Arc::new(api::AppState::new(scanner, health_registry.clone()));
    let mut api_shutdown = shutdown_tx.subscribe();
    let mut api_handle = tokio::spawn(api::serve(config.port, app_state, async move {
        let _ = api_shutdown.recv().await;
    }));

    health_registry.set_ready(true).await;
    logger.log_startup(AGENT_VERSION, config.scan_interval_secs);

    let outcome = wait_for_stop(tokio::signal::ctrl_c(), &mut api_handle).await;
    match &outcome {
        Ok(()) => logger.log_shutdown("SIGINT received"),
        Err(e) => {
            error!(error = %format!("{:#}", e), "API server is gone, stopping agent");
            logger.log_shutdown("API server stopped");
        }
    }
    health_registry.set_ready(false).await;
    let _ = shutdown_tx.send(());

    if let Err(e) = scheduler_handle.await {
        error!(error = %e, "Scan scheduler task failed");
    }
    // Only a signal leaves the API task unjoined
    if outcome.is_ok() {
        match api_handle.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!(error = %e, "API server failed"),
            Err(e) => error!(error = %e, "API server task failed"),
        }
    }

    outcome?;
    info!("Shut down");
    Ok(())
}

/// Wait for the shutdown signal. The API server is expected to outlive it,
/// so the server task ending first is an error whatever its result.
async fn wait_for_stop(
    signal: impl Future<Output = std::io::Result<()>>,
    api_handle: &mut JoinHandle<Result<()>>,
) -> Result<()> {
    tokio::select! {
        result = signal => {
            result.context("Failed to listen for shutdown signal")
        }
        joined = api_handle => match joined {
            Ok(Ok(())) => anyhow::bail!("API server stopped unexpectedly"),
            Ok(Err(e)) => Err(e.context("API server failed")),
            Err(e) => Err(anyhow::Error::new(e).context("API server task failed")),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_api_failure_stops_agent() {
        let mut api_handle: JoinHandle<Result<()>> =
            tokio::spawn(async { Err::<(), _>(anyhow::anyhow!("Address already in use")) });

        let err = wait_for_stop(std::future::pending(), &mut api_handle)
            .await
            .unwrap_err();

        assert!(format!("{:#}", err).contains("Address already in use"));
    }

    #[tokio::test]
    async fn test_api_exiting_cleanly_is_still_an_error() {
        let mut api_handle: JoinHandle<Result<()>> =
            tokio::spawn(async { Ok::<_, anyhow::Error>(()) });

        let err = wait_for_stop(std::future::pending(), &mut api_handle)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("stopped unexpectedly"));
    }

    #[tokio::test]
    async fn test_signal_stops_agent_with_api_running() {
        let mut api_handle: JoinHandle<Result<()>> = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok::<_, anyhow::Error>(())
        });

        wait_for_stop(async { Ok::<_, std::io::Error>(()) }, &mut api_handle)
            .await
            .unwrap();

        assert!(!api_handle.is_finished());
        api_handle.abort();
    }
}
