use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

/// PTZ operations the gateway drives a camera with.
///
/// Velocity components are in `[-1, 1]`; implementations clamp anything outside.
#[automock]
#[async_trait]
pub trait CameraControl: Send + Sync + 'static {
    async fn set_preset(&self, token: u16) -> Result<()>;
    async fn goto_preset(&self, token: u16) -> Result<()>;
    async fn stop(&self) -> Result<()>;
    async fn go_home(&self) -> Result<()>;
    async fn move_continuous(&self, pan: f32, tilt: f32, zoom: f32) -> Result<()>;
}
