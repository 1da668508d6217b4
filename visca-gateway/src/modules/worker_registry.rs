use crate::modules::{
    gateway_loop::GatewayWorker,
    roster::{CameraAddress, CameraRecord},
};
use dashmap::DashMap;

/// Running gateway workers keyed by camera address.
#[derive(Default)]
pub struct WorkerRegistry {
    workers: DashMap<CameraAddress, GatewayWorker>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, address: CameraAddress, worker: GatewayWorker) {
        if let Some(previous) = self.workers.insert(address.clone(), worker) {
            tracing::warn!("replaced worker handle for {}", address);
            previous.request_stop();
        }
    }

    pub fn contains(&self, address: &CameraAddress) -> bool {
        self.workers.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Removes every worker whose task has exited and returns their addresses.
    pub fn reap_finished(&self) -> Vec<CameraAddress> {
        let finished: Vec<CameraAddress> = self
            .workers
            .iter()
            .filter(|entry| !entry.value().is_running())
            .map(|entry| entry.key().clone())
            .collect();
        for address in &finished {
            self.workers.remove(address);
        }
        finished
    }

    /// Camera whose worker currently holds `port`, stopping or not.
    pub fn port_holder(&self, port: u16) -> Option<CameraAddress> {
        self.workers
            .iter()
            .find(|entry| entry.value().visca_port() == port)
            .map(|entry| entry.key().clone())
    }

    /// Flags the worker for stop when the record no longer matches what it was started with.
    ///
    /// Returns `true` when a stop was newly requested.
    pub fn stop_if_changed(&self, record: &CameraRecord) -> bool {
        let Some(worker) = self.workers.get(&record.address) else {
            return false;
        };
        let changed =
            *worker.params() != record.connection() || worker.visca_port() != record.visca_port;
        if !changed || worker.is_stop_requested() {
            return false;
        }
        worker.request_stop();
        true
    }

    pub fn request_stop_all(&self) {
        for entry in self.workers.iter() {
            entry.value().request_stop();
        }
    }

    pub fn drain(&self) -> Vec<GatewayWorker> {
        let addresses: Vec<CameraAddress> =
            self.workers.iter().map(|entry| entry.key().clone()).collect();
        addresses
            .iter()
            .filter_map(|address| self.workers.remove(address).map(|(_, worker)| worker))
            .collect()
    }
}

impl Drop for WorkerRegistry {
    fn drop(&mut self) {
        for entry in self.workers.iter() {
            entry.value().abort();
        }
    }
}
