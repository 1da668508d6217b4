use crate::modules::{
    camera_connector::CameraConnector,
    config::WorkerSettings,
    roster::{CameraAddress, ConnectionParams, RosterStore},
    translator::Translator,
};
use anyhow::{Context, Result};
use std::{
    net::SocketAddr,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::{net::UdpSocket, task::JoinHandle};
use tracing::Instrument;
use visca_core::{classify, constants::MAX_FRAME_LEN, form};
use visca_onvif::CameraControl;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Nothing arrived within the poll timeout.
    Idle,
    Handled,
    /// Stop was requested or the camera left the roster.
    Finished,
}

/// Serves one camera's VISCA port: receive, translate, call the camera, reply.
pub struct GatewayLoop {
    address: CameraAddress,
    socket: UdpSocket,
    translator: Translator,
    camera: Arc<dyn CameraControl>,
    roster: RosterStore,
    stop: Arc<AtomicBool>,
    poll_timeout: Duration,
}

impl GatewayLoop {
    pub fn new(
        address: CameraAddress,
        socket: UdpSocket,
        camera: Arc<dyn CameraControl>,
        roster: RosterStore,
        stop: Arc<AtomicBool>,
        poll_timeout: Duration,
    ) -> Self {
        Self {
            address,
            socket,
            translator: Translator::new(),
            camera,
            roster,
            stop,
            poll_timeout,
        }
    }

    pub async fn run(mut self) {
        tracing::info!("serving VISCA on {:?}", self.socket.local_addr().ok());
        while self.poll_once().await != PollOutcome::Finished {}
        tracing::info!("gateway finished");
    }

    pub async fn poll_once(&mut self) -> PollOutcome {
        if self.stop.load(Ordering::Acquire) {
            tracing::debug!("stop requested");
            return PollOutcome::Finished;
        }
        if !self.roster.snapshot().await.contains_key(&self.address) {
            tracing::debug!("camera no longer in roster");
            return PollOutcome::Finished;
        }

        let mut buf = [0u8; MAX_FRAME_LEN];
        let (len, source) =
            match tokio::time::timeout(self.poll_timeout, self.socket.recv_from(&mut buf)).await {
                Err(_) => return PollOutcome::Idle,
                Ok(Err(err)) => {
                    tracing::warn!("recv_from failed: {err}");
                    return PollOutcome::Idle;
                }
                Ok(Ok(received)) => received,
            };

        if let Err(err) = self.handle_datagram(&buf[..len], source).await {
            tracing::error!("dropping datagram from {source}: {err:#}");
        }
        PollOutcome::Handled
    }

    async fn handle_datagram(&mut self, frame: &[u8], source: SocketAddr) -> Result<()> {
        let roster = self.roster.snapshot().await;
        let Some(record) = roster.get(&self.address) else {
            return Ok(());
        };
        self.translator.sync_ranges(&record.preset_ranges);

        let Some(client) = self.translator.resolve_client(source.ip()) else {
            tracing::debug!("no preset range for {source}, ignoring");
            return Ok(());
        };

        let command = classify(frame);
        tracing::debug!("{source} ({client}): {frame:02X?} -> {command:?}");
        let translation = self.translator.dispatch(&command, &client);

        if let Some(call) = translation.call {
            call.execute(self.camera.as_ref())
                .await
                .with_context(|| format!("{} failed: {call:?}", command.name()))?;
        }
        if let Some(reply) = translation.reply {
            let bytes = form(&reply).with_context(|| format!("cannot form {reply:?}"))?;
            self.socket
                .send_to(&bytes, source)
                .await
                .with_context(|| format!("send_to {source} failed"))?;
            tracing::trace!("replied {:02X?} to {source}", &bytes[..]);
        }
        Ok(())
    }
}

/// Handle to a spawned gateway task and its cooperative stop flag.
pub struct GatewayWorker {
    params: ConnectionParams,
    visca_port: u16,
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl GatewayWorker {
    pub(crate) fn new(
        params: ConnectionParams,
        visca_port: u16,
        stop: Arc<AtomicBool>,
        handle: JoinHandle<()>,
    ) -> Self {
        Self {
            params,
            visca_port,
            stop,
            handle,
        }
    }

    pub fn params(&self) -> &ConnectionParams {
        &self.params
    }

    pub fn visca_port(&self) -> u16 {
        self.visca_port
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    pub async fn join(self) {
        if let Err(err) = self.handle.await {
            tracing::error!("worker for {} ended abnormally: {err}", self.params.address);
        }
    }

    pub(crate) fn abort(&self) {
        self.handle.abort();
    }
}

/// Starts a worker on an already bound socket; the camera session is opened inside the task.
pub fn spawn_worker(
    params: ConnectionParams,
    socket: UdpSocket,
    connector: Arc<dyn CameraConnector>,
    roster: RosterStore,
    settings: WorkerSettings,
) -> GatewayWorker {
    let visca_port = socket.local_addr().map(|addr| addr.port()).unwrap_or_default();
    let stop = Arc::new(AtomicBool::new(false));
    let span = tracing::info_span!("Gateway", camera = %params.address, port = visca_port);

    let task_params = params.clone();
    let task_stop = stop.clone();
    let handle = tokio::spawn(
        async move {
            let camera = match connector.connect(&task_params).await {
                Ok(camera) => camera,
                Err(err) => {
                    tracing::error!("camera connection failed: {err:#}");
                    return;
                }
            };
            GatewayLoop::new(
                task_params.address,
                socket,
                camera,
                roster,
                task_stop,
                settings.poll_timeout,
            )
            .run()
            .await;
        }
        .instrument(span),
    );

    GatewayWorker::new(params, visca_port, stop, handle)
}


#[cfg(test)]
mod failure {
    use super::*;
    use crate::modules::roster::{CameraRecord, ClientKey, PresetRange, Roster};
    use anyhow::anyhow;
    use visca_onvif::{MockCameraControl, OnvifAuth};

    async fn gateway_with(
        camera: MockCameraControl,
        ranges: &[(ClientKey, u16, u16)],
    ) -> (GatewayLoop, UdpSocket) {
        let address = CameraAddress::new("cam", 80);
        let mut cameras = Roster::new();
        cameras.insert(
            address.clone(),
            CameraRecord {
                address: address.clone(),
                username: String::new(),
                password: String::new(),
                auth: OnvifAuth::Basic,
                onvif_path: None,
                visca_port: 0,
                preset_ranges: ranges
                    .iter()
                    .map(|(client, min, max)| (*client, PresetRange::new(*min, *max)))
                    .collect(),
            },
        );
        let roster = RosterStore::new();
        roster.replace(cameras).await;

        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let controller = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        controller
            .connect(socket.local_addr().unwrap())
            .await
            .unwrap();
        let gateway = GatewayLoop::new(
            address,
            socket,
            Arc::new(camera),
            roster,
            Arc::new(AtomicBool::new(false)),
            Duration::from_millis(20),
        );
        (gateway, controller)
    }

    async fn expect_silence(controller: &UdpSocket) {
        let mut buf = [0u8; 16];
        let reply =
            tokio::time::timeout(Duration::from_millis(50), controller.recv(&mut buf)).await;
        assert!(reply.is_err(), "unexpected reply");
    }

    #[tokio::test]
    async fn camera_error_suppresses_reply_and_keeps_running() {
        let mut camera = MockCameraControl::new();
        camera
            .expect_set_preset()
            .times(2)
            .returning(|_| Err(anyhow!("HTTP 500")));
        let (mut gateway, controller) = gateway_with(camera, &[(ClientKey::Default, 1, 3)]).await;

        for _ in 0..2 {
            controller.send(&[0x81, 0x09, 0x06, 0x12, 0xFF]).await.unwrap();
            let mut outcome = PollOutcome::Idle;
            for _ in 0..50 {
                outcome = gateway.poll_once().await;
                if outcome != PollOutcome::Idle {
                    break;
                }
            }
            assert_eq!(outcome, PollOutcome::Handled);
            expect_silence(&controller).await;
        }
    }

    #[tokio::test]
    async fn unknown_source_without_default_is_dropped() {
        let (mut gateway, controller) =
            gateway_with(MockCameraControl::new(), &[("10.9.9.9".parse().unwrap(), 1, 3)]).await;

        controller.send(&[0x81, 0x09, 0x06, 0x12, 0xFF]).await.unwrap();
        let mut handled = false;
        for _ in 0..50 {
            if gateway.poll_once().await == PollOutcome::Handled {
                handled = true;
                break;
            }
        }
        assert!(handled);
        expect_silence(&controller).await;
    }

    #[tokio::test]
    async fn reply_address_overflow_is_dropped() {
        let (mut gateway, controller) =
            gateway_with(MockCameraControl::new(), &[(ClientKey::Default, 1, 3)]).await;

        // x = 9 gives y = 17, which does not fit the reply header
        controller.send(&[0x89, 0x09, 0x04, 0x47, 0xFF]).await.unwrap();
        let mut handled = false;
        for _ in 0..50 {
            if gateway.poll_once().await == PollOutcome::Handled {
                handled = true;
                break;
            }
        }
        assert!(handled);
        expect_silence(&controller).await;
    }
}
