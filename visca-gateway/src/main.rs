use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tokio::sync::oneshot;
use visca_gateway::{
    init_logging, Args, FleetOrchestrator, GatewayConfig, JsonFileRoster, OnvifConnector,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = GatewayConfig::from_args(&args)?;
    init_logging(config.log_level, &config.log_dir)?;

    tracing::info!("roster: {}", config.roster_path.display());
    let orchestrator = FleetOrchestrator::new(
        Arc::new(JsonFileRoster::new(&config.roster_path)),
        Arc::new(OnvifConnector::new(config.worker)),
        config.bind_host,
        config.worker,
    );

    let (tx, rx) = oneshot::channel();
    let fleet = tokio::spawn(orchestrator.run(config.refresh_interval, rx));

    tracing::info!("Ctrl+C to shutdown");
    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal sent");
    let _ = tx.send(());

    fleet.await?;
    tracing::info!("VISCA gateway stopped");
    Ok(())
}
