use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_ONVIF_PATH: &str = "/onvif/device_service";
const DEFAULT_TIMEOUT: Duration = Duration::from_millis(3000);

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnvifAuth {
    Basic,
    #[default]
    Wsse,
}

/// Where and how to reach one camera's ONVIF device service.
#[derive(Debug, Clone)]
pub struct OnvifTarget {
    host: String,
    port: u16,
    path: String,
    username: String,
    password: String,
    auth: OnvifAuth,
    insecure: bool,
    timeout: Duration,
}

impl OnvifTarget {
    pub fn new(host: &str, port: u16, username: &str, password: &str) -> Self {
        Self {
            host: host.trim().to_string(),
            port,
            path: DEFAULT_ONVIF_PATH.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            auth: OnvifAuth::default(),
            insecure: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_path(mut self, path: &str) -> Self {
        self.path = normalize_path(path);
        self
    }

    pub fn with_auth(mut self, auth: OnvifAuth) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn onvif_endpoint(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, self.path)
    }

    pub fn onvif_auth(&self) -> OnvifAuth {
        self.auth
    }

    pub fn onvif_insecure(&self) -> bool {
        self.insecure
    }

    pub fn basic_auth(&self) -> Option<(&str, &str)> {
        if self.username.is_empty() {
            return None;
        }
        Some((self.username.as_str(), self.password.as_str()))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return "/".to_string();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod success {
    use super::{OnvifAuth, OnvifTarget};

    #[test]
    fn endpoint_defaults_to_device_service() {
        let target = OnvifTarget::new(" 10.0.0.20 ", 8000, "admin", "secret");
        assert_eq!(
            target.onvif_endpoint(),
            "http://10.0.0.20:8000/onvif/device_service"
        );
        assert_eq!(target.onvif_auth(), OnvifAuth::Wsse);
    }

    #[test]
    fn path_is_normalized() {
        let target = OnvifTarget::new("cam", 80, "", "").with_path("onvif/device");
        assert_eq!(target.onvif_endpoint(), "http://cam:80/onvif/device");

        let target = OnvifTarget::new("cam", 80, "", "").with_path("  ");
        assert_eq!(target.onvif_endpoint(), "http://cam:80/");
    }

    #[test]
    fn basic_auth_needs_username() {
        let target = OnvifTarget::new("cam", 80, "", "secret");
        assert_eq!(target.basic_auth(), None);

        let target = OnvifTarget::new("cam", 80, "admin", "");
        assert_eq!(target.basic_auth(), Some(("admin", "")));
    }
}
