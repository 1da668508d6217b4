use anyhow::{anyhow, bail, Result};
use roxmltree::Document;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaProfile {
    pub token: String,
    pub name: Option<String>,
    pub ptz_config: Option<String>,
}

pub fn extract_profiles(body: &str) -> Result<Vec<MediaProfile>> {
    let doc = Document::parse(body).map_err(|err| anyhow!("invalid profiles XML: {err}"))?;
    let mut profiles = Vec::new();
    for profile in doc.descendants().filter(|node| node.has_tag_name("Profiles")) {
        let Some(token) = profile.attribute("token") else {
            tracing::warn!("GetProfiles profile token missing");
            continue;
        };
        let name = profile
            .children()
            .find(|node| node.is_element() && node.has_tag_name("Name"))
            .and_then(|node| node.text())
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());
        let ptz_config = profile
            .descendants()
            .find(|node| node.has_tag_name("PTZConfiguration"))
            .and_then(|node| node.attribute("token"))
            .map(str::to_string);
        profiles.push(MediaProfile {
            token: token.to_string(),
            name,
            ptz_config,
        });
    }
    if profiles.is_empty() {
        bail!("Profiles not found");
    }
    Ok(profiles)
}

/// PTZ commands go to the first profile the camera lists.
pub fn select(profiles: Vec<MediaProfile>) -> Result<MediaProfile> {
    log_profiles(&profiles);
    profiles
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("Profiles not found"))
}

fn log_profiles(profiles: &[MediaProfile]) {
    tracing::debug!("[GetProfiles] profiles={}", profiles.len());
    for (index, profile) in profiles.iter().enumerate() {
        tracing::debug!(
            "  [{}] token={} name={} ptz_config={}",
            index,
            profile.token,
            profile.name.as_deref().unwrap_or("-"),
            profile.ptz_config.as_deref().unwrap_or("-"),
        );
    }
}
