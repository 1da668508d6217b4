use crate::modules::{config::WorkerSettings, roster::ConnectionParams};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use visca_onvif::{CameraControl, OnvifCamera, OnvifTarget};

/// Opens the camera-control session a worker drives.
#[async_trait]
pub trait CameraConnector: Send + Sync + 'static {
    async fn connect(&self, params: &ConnectionParams) -> Result<Arc<dyn CameraControl>>;
}

pub struct OnvifConnector {
    settings: WorkerSettings,
}

impl OnvifConnector {
    pub fn new(settings: WorkerSettings) -> Self {
        Self { settings }
    }

    fn target(&self, params: &ConnectionParams) -> OnvifTarget {
        let target = OnvifTarget::new(
            &params.address.host,
            params.address.port,
            &params.username,
            &params.password,
        )
        .with_auth(params.auth)
        .with_insecure(self.settings.onvif_insecure)
        .with_timeout(self.settings.camera_timeout);
        match params.onvif_path.as_deref() {
            Some(path) => target.with_path(path),
            None => target,
        }
    }
}

#[async_trait]
impl CameraConnector for OnvifConnector {
    async fn connect(&self, params: &ConnectionParams) -> Result<Arc<dyn CameraControl>> {
        let camera = OnvifCamera::connect(self.target(params)).await?;
        Ok(Arc::new(camera))
    }
}
