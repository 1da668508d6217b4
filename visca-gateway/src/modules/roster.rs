use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::{
    collections::BTreeMap,
    fmt,
    net::IpAddr,
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
};
use tokio::sync::RwLock;
use visca_onvif::OnvifAuth;

const DEFAULT_CLIENT: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CameraAddress {
    pub host: String,
    pub port: u16,
}

impl CameraAddress {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.trim().to_string(),
            port,
        }
    }
}

impl fmt::Display for CameraAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Who a preset range belongs to: one controller by IP, or the fallback for everyone else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum ClientKey {
    Default,
    Host(IpAddr),
}

impl FromStr for ClientKey {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        let value = value.trim();
        if value == DEFAULT_CLIENT {
            return Ok(ClientKey::Default);
        }
        let ip = value
            .parse::<IpAddr>()
            .with_context(|| format!("preset range key `{value}` is neither `default` nor an IP"))?;
        Ok(ClientKey::Host(ip))
    }
}

impl TryFrom<String> for ClientKey {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for ClientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientKey::Default => f.write_str(DEFAULT_CLIENT),
            ClientKey::Host(ip) => write!(f, "{ip}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PresetRange {
    pub min: u16,
    pub max: u16,
}

impl PresetRange {
    pub fn new(min: u16, max: u16) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, preset: u16) -> bool {
        (self.min..=self.max).contains(&preset)
    }
}

pub type PresetRanges = BTreeMap<ClientKey, PresetRange>;

/// Everything that, when changed, requires reconnecting to the camera.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    pub address: CameraAddress,
    pub username: String,
    pub password: String,
    pub auth: OnvifAuth,
    pub onvif_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraRecord {
    pub address: CameraAddress,
    pub username: String,
    pub password: String,
    pub auth: OnvifAuth,
    pub onvif_path: Option<String>,
    pub visca_port: u16,
    pub preset_ranges: PresetRanges,
}

impl CameraRecord {
    pub fn connection(&self) -> ConnectionParams {
        ConnectionParams {
            address: self.address.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            auth: self.auth,
            onvif_path: self.onvif_path.clone(),
        }
    }
}

/// Ordered so reconciliation visits cameras in the same order every cycle.
pub type Roster = BTreeMap<CameraAddress, CameraRecord>;

#[async_trait]
pub trait RosterSource: Send + Sync + 'static {
    async fn fetch(&self) -> Result<Roster>;
}

#[derive(Debug, Deserialize)]
struct RosterFile {
    cams: Vec<RosterEntry>,
}

#[derive(Debug, Deserialize)]
struct RosterEntry {
    cam_ip: String,
    cam_port: u16,
    cam_login: String,
    cam_password: String,
    visca_server_port: u16,
    #[serde(default)]
    onvif_auth: OnvifAuth,
    #[serde(default)]
    onvif_path: Option<String>,
    #[serde(default)]
    preset_client_range: BTreeMap<ClientKey, PresetRange>,
}

impl RosterEntry {
    fn into_record(self) -> CameraRecord {
        let address = CameraAddress::new(&self.cam_ip, self.cam_port);
        let preset_ranges = self
            .preset_client_range
            .into_iter()
            .filter(|(client, range)| {
                if range.min > range.max {
                    tracing::warn!(
                        "{}: preset range for {} has min {} > max {}, ignoring",
                        address,
                        client,
                        range.min,
                        range.max
                    );
                    return false;
                }
                true
            })
            .collect();
        CameraRecord {
            address,
            username: self.cam_login,
            password: self.cam_password,
            auth: self.onvif_auth,
            onvif_path: self.onvif_path,
            visca_port: self.visca_server_port,
            preset_ranges,
        }
    }
}

/// Roster read from the JSON camera configuration file on every fetch.
pub struct JsonFileRoster {
    path: PathBuf,
}

impl JsonFileRoster {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn parse(text: &str) -> Result<Roster> {
        let file: RosterFile = serde_json::from_str(text).context("invalid roster JSON")?;
        let mut roster = Roster::new();
        for entry in file.cams {
            let record = entry.into_record();
            if record.address.host.is_empty() {
                bail!("camera entry with empty cam_ip");
            }
            if let Some(previous) = roster.insert(record.address.clone(), record) {
                tracing::warn!("{} listed more than once, keeping the last entry", previous.address);
            }
        }
        Ok(roster)
    }
}

#[async_trait]
impl RosterSource for JsonFileRoster {
    async fn fetch(&self) -> Result<Roster> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed to read roster {}", self.path.display()))?;
        Self::parse(&text).with_context(|| format!("failed to load roster {}", self.path.display()))
    }
}

/// Latest roster snapshot, replaced wholesale and shared read-only with the workers.
#[derive(Clone, Default)]
pub struct RosterStore {
    current: Arc<RwLock<Arc<Roster>>>,
}

impl RosterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> Arc<Roster> {
        self.current.read().await.clone()
    }

    pub async fn replace(&self, roster: Roster) -> Arc<Roster> {
        let roster = Arc::new(roster);
        *self.current.write().await = roster.clone();
        roster
    }
}


#[cfg(test)]
mod failure {
    use super::*;

    #[test]
    fn bad_client_key_fails_whole_load() {
        let text = r#"{"cams": [{"cam_ip": "10.0.0.20", "cam_port": 80, "cam_login": "a",
            "cam_password": "b", "visca_server_port": 1,
            "preset_client_range": {"studio-a": {"min": 1, "max": 2}}}]}"#;
        assert!(JsonFileRoster::parse(text).is_err());
    }

    #[test]
    fn missing_key_fails() {
        let text = r#"{"cams": [{"cam_ip": "10.0.0.20", "cam_port": 80}]}"#;
        assert!(JsonFileRoster::parse(text).is_err());
        assert!(JsonFileRoster::parse("not json").is_err());
    }

    #[tokio::test]
    async fn unreadable_file_is_an_error() {
        let source = JsonFileRoster::new("/nonexistent/visca_onvif_config.json");
        assert!(source.fetch().await.is_err());
    }
}
