use crate::modules::{
    camera_connector::CameraConnector,
    config::WorkerSettings,
    gateway_loop::spawn_worker,
    roster::{CameraAddress, CameraRecord, Roster, RosterSource, RosterStore},
    worker_registry::WorkerRegistry,
};
use std::{net::IpAddr, sync::Arc, time::Duration};
use tokio::{net::UdpSocket, sync::oneshot, time::MissedTickBehavior};

/// Keeps one gateway worker per rostered camera.
pub struct FleetOrchestrator {
    source: Arc<dyn RosterSource>,
    connector: Arc<dyn CameraConnector>,
    roster: RosterStore,
    registry: WorkerRegistry,
    bind_host: IpAddr,
    settings: WorkerSettings,
}

impl FleetOrchestrator {
    pub fn new(
        source: Arc<dyn RosterSource>,
        connector: Arc<dyn CameraConnector>,
        bind_host: IpAddr,
        settings: WorkerSettings,
    ) -> Self {
        Self {
            source,
            connector,
            roster: RosterStore::new(),
            registry: WorkerRegistry::new(),
            bind_host,
            settings,
        }
    }

    pub fn roster(&self) -> RosterStore {
        self.roster.clone()
    }

    pub fn is_serving(&self, address: &CameraAddress) -> bool {
        self.registry.contains(address)
    }

    pub fn worker_count(&self) -> usize {
        self.registry.len()
    }

    /// Pulls a fresh roster; a failed fetch counts as an empty roster.
    pub async fn refresh(&self) -> Arc<Roster> {
        let roster = match self.source.fetch().await {
            Ok(roster) => roster,
            Err(err) => {
                tracing::error!("roster fetch failed, treating as empty: {err:#}");
                Roster::new()
            }
        };
        tracing::debug!("roster refreshed: {} camera(s)", roster.len());
        self.roster.replace(roster).await
    }

    /// One refresh and reconciliation cycle.
    pub async fn tick(&self) {
        let roster = self.refresh().await;
        self.reconcile(&roster).await;
    }

    pub async fn reconcile(&self, roster: &Roster) {
        for address in self.registry.reap_finished() {
            tracing::info!("reaped worker for {}", address);
        }

        for record in roster.values() {
            if self.registry.contains(&record.address) {
                continue;
            }
            if let Some(holder) = self.registry.port_holder(record.visca_port) {
                tracing::warn!(
                    "{}: VISCA port {} already served for {}, skipping",
                    record.address,
                    record.visca_port,
                    holder
                );
                continue;
            }
            self.start(record).await;
        }

        for record in roster.values() {
            if self.registry.stop_if_changed(record) {
                tracing::info!(
                    "{}: connection settings changed, stopping worker for restart",
                    record.address
                );
            }
        }
    }

    async fn start(&self, record: &CameraRecord) {
        let socket = match UdpSocket::bind((self.bind_host, record.visca_port)).await {
            Ok(socket) => socket,
            Err(err) => {
                tracing::error!(
                    "{}: cannot bind VISCA port {}: {err}",
                    record.address,
                    record.visca_port
                );
                return;
            }
        };
        let worker = spawn_worker(
            record.connection(),
            socket,
            self.connector.clone(),
            self.roster.clone(),
            self.settings,
        );
        tracing::info!(
            "started worker for {} on VISCA port {}",
            record.address,
            worker.visca_port()
        );
        self.registry.add(record.address.clone(), worker);
    }

    /// Reconciles every `refresh_interval` until `shutdown` fires, then stops all workers.
    pub async fn run(self, refresh_interval: Duration, mut shutdown: oneshot::Receiver<()>) {
        let mut interval = tokio::time::interval(refresh_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = interval.tick() => self.tick().await,
                _ = &mut shutdown => {
                    tracing::info!("shutdown requested");
                    break;
                }
            }
        }
        self.shutdown().await;
    }

    pub async fn shutdown(&self) {
        self.registry.request_stop_all();
        for worker in self.registry.drain() {
            worker.join().await;
        }
        tracing::info!("all workers stopped");
    }
}
