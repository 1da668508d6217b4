use crate::{
    camera_control::CameraControl,
    onvif_profiles,
    onvif_requests::{self, OnvifRequest, PtzVelocity},
    onvif_services::{self, ServiceEndpoints},
    soap::{self, SoapResponse},
    target::OnvifTarget,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;

/// A connected ONVIF camera with its PTZ profile resolved.
pub struct OnvifCamera {
    client: Client,
    target: OnvifTarget,
    endpoints: ServiceEndpoints,
    profile_token: String,
}

impl OnvifCamera {
    pub async fn connect(target: OnvifTarget) -> Result<Self> {
        let client = Client::builder()
            .timeout(target.timeout())
            .danger_accept_invalid_certs(target.onvif_insecure())
            .build()
            .context("http client build failed")?;

        let endpoints = onvif_services::discover_endpoints(&client, &target).await;
        tracing::debug!(
            "ONVIF endpoints: media={} ptz={}",
            endpoints.media,
            endpoints.ptz
        );

        let mut camera = Self {
            client,
            target,
            endpoints,
            profile_token: String::new(),
        };
        camera.profile_token = camera.fetch_profile_token().await?;
        tracing::info!(
            "connected to {} using profile {}",
            camera.target.onvif_endpoint(),
            camera.profile_token
        );
        Ok(camera)
    }

    pub fn profile_token(&self) -> &str {
        &self.profile_token
    }

    pub fn endpoints(&self) -> &ServiceEndpoints {
        &self.endpoints
    }

    async fn fetch_profile_token(&self) -> Result<String> {
        let request = onvif_requests::get_profiles();
        let response = self.send(&self.endpoints.media, &request).await?;
        soap::ensure_success(request.operation, &self.endpoints.media, &response)?;
        let profiles = onvif_profiles::extract_profiles(&response.body)?;
        Ok(onvif_profiles::select(profiles)?.token)
    }

    async fn send(&self, endpoint: &str, request: &OnvifRequest) -> Result<SoapResponse> {
        soap::send(
            &self.client,
            &self.target,
            endpoint,
            &request.action(),
            &request.body,
        )
        .await
    }

    async fn send_ptz(&self, request: OnvifRequest) -> Result<()> {
        let endpoint = &self.endpoints.ptz;
        let response = self.send(endpoint, &request).await?;
        soap::ensure_success(request.operation, endpoint, &response)?;
        tracing::trace!("{} ok ({})", request.operation, response.status);
        Ok(())
    }
}

#[async_trait]
impl CameraControl for OnvifCamera {
    async fn set_preset(&self, token: u16) -> Result<()> {
        self.send_ptz(onvif_requests::set_preset(&self.profile_token, token))
            .await
    }

    async fn goto_preset(&self, token: u16) -> Result<()> {
        self.send_ptz(onvif_requests::goto_preset(&self.profile_token, token))
            .await
    }

    async fn stop(&self) -> Result<()> {
        self.send_ptz(onvif_requests::stop(&self.profile_token, true, true))
            .await
    }

    async fn go_home(&self) -> Result<()> {
        self.send_ptz(onvif_requests::goto_home_position(&self.profile_token))
            .await
    }

    async fn move_continuous(&self, pan: f32, tilt: f32, zoom: f32) -> Result<()> {
        let velocity = PtzVelocity { pan, tilt, zoom };
        self.send_ptz(onvif_requests::continuous_move(
            &self.profile_token,
            velocity,
        ))
        .await
    }
}
