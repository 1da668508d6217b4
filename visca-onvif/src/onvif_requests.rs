use crate::wsse::xml_escape;

pub const DEVICE_ACTION_NS: &str = "http://www.onvif.org/ver10/device/wsdl";
pub const MEDIA_ACTION_NS: &str = "http://www.onvif.org/ver10/media/wsdl";
pub const PTZ_ACTION_NS: &str = "http://www.onvif.org/ver20/ptz/wsdl";
pub const TT_NS: &str = "http://www.onvif.org/ver10/schema";

pub const PAN_TILT_VELOCITY_SPACE: &str =
    "http://www.onvif.org/ver10/tptz/PanTiltSpaces/VelocityGenericSpace";
pub const ZOOM_VELOCITY_SPACE: &str =
    "http://www.onvif.org/ver10/tptz/ZoomSpaces/VelocityGenericSpace";
pub const PAN_TILT_SPEED_SPACE: &str =
    "http://www.onvif.org/ver10/tptz/PanTiltSpaces/GenericSpeedSpace";
pub const ZOOM_SPEED_SPACE: &str =
    "http://www.onvif.org/ver10/tptz/ZoomSpaces/ZoomGenericSpeedSpace";

pub struct OnvifRequest {
    pub namespace: &'static str,
    pub operation: &'static str,
    pub body: String,
}

impl OnvifRequest {
    pub fn action(&self) -> String {
        format!("{}/{}", self.namespace, self.operation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PtzVelocity {
    pub pan: f32,
    pub tilt: f32,
    pub zoom: f32,
}

impl PtzVelocity {
    /// Clamps every component into the generic velocity space `[-1, 1]`.
    pub fn clamped(self) -> Self {
        Self {
            pan: self.pan.clamp(-1.0, 1.0),
            tilt: self.tilt.clamp(-1.0, 1.0),
            zoom: self.zoom.clamp(-1.0, 1.0),
        }
    }
}

pub fn get_services() -> OnvifRequest {
    build(
        DEVICE_ACTION_NS,
        "GetServices",
        format!(
            r#"<GetServices xmlns="{}"><IncludeCapability>false</IncludeCapability></GetServices>"#,
            DEVICE_ACTION_NS
        ),
    )
}

pub fn get_capabilities() -> OnvifRequest {
    build(
        DEVICE_ACTION_NS,
        "GetCapabilities",
        format!(
            r#"<GetCapabilities xmlns="{}"><Category>All</Category></GetCapabilities>"#,
            DEVICE_ACTION_NS
        ),
    )
}

pub fn get_profiles() -> OnvifRequest {
    build(
        MEDIA_ACTION_NS,
        "GetProfiles",
        format!(r#"<GetProfiles xmlns="{}"/>"#, MEDIA_ACTION_NS),
    )
}

/// Stores the current position under `preset`; the preset number doubles as its name.
pub fn set_preset(profile: &str, preset: u16) -> OnvifRequest {
    let profile = xml_escape(profile);
    build(
        PTZ_ACTION_NS,
        "SetPreset",
        format!(
            r#"<SetPreset xmlns="{ns}"><ProfileToken>{profile}</ProfileToken><PresetName>{preset}</PresetName><PresetToken>{preset}</PresetToken></SetPreset>"#,
            ns = PTZ_ACTION_NS,
        ),
    )
}

pub fn goto_preset(profile: &str, preset: u16) -> OnvifRequest {
    let profile = xml_escape(profile);
    build(
        PTZ_ACTION_NS,
        "GotoPreset",
        format!(
            r#"<GotoPreset xmlns="{ns}"><ProfileToken>{profile}</ProfileToken><PresetToken>{preset}</PresetToken><Speed>{speed}</Speed></GotoPreset>"#,
            ns = PTZ_ACTION_NS,
            speed = full_speed(),
        ),
    )
}

pub fn goto_home_position(profile: &str) -> OnvifRequest {
    let profile = xml_escape(profile);
    build(
        PTZ_ACTION_NS,
        "GotoHomePosition",
        format!(
            r#"<GotoHomePosition xmlns="{ns}"><ProfileToken>{profile}</ProfileToken></GotoHomePosition>"#,
            ns = PTZ_ACTION_NS,
        ),
    )
}

pub fn continuous_move(profile: &str, velocity: PtzVelocity) -> OnvifRequest {
    let profile = xml_escape(profile);
    let velocity = velocity.clamped();
    build(
        PTZ_ACTION_NS,
        "ContinuousMove",
        format!(
            r#"<ContinuousMove xmlns="{ns}"><ProfileToken>{profile}</ProfileToken><Velocity>{pan_tilt}{zoom}</Velocity></ContinuousMove>"#,
            ns = PTZ_ACTION_NS,
            pan_tilt = pan_tilt_element(velocity.pan, velocity.tilt, PAN_TILT_VELOCITY_SPACE),
            zoom = zoom_element(velocity.zoom, ZOOM_VELOCITY_SPACE),
        ),
    )
}

pub fn stop(profile: &str, pan_tilt: bool, zoom: bool) -> OnvifRequest {
    let profile = xml_escape(profile);
    build(
        PTZ_ACTION_NS,
        "Stop",
        format!(
            r#"<Stop xmlns="{ns}"><ProfileToken>{profile}</ProfileToken><PanTilt>{pan_tilt}</PanTilt><Zoom>{zoom}</Zoom></Stop>"#,
            ns = PTZ_ACTION_NS,
        ),
    )
}

fn build(namespace: &'static str, operation: &'static str, body: String) -> OnvifRequest {
    OnvifRequest {
        namespace,
        operation,
        body,
    }
}

fn full_speed() -> String {
    format!(
        "{}{}",
        pan_tilt_element(1.0, 1.0, PAN_TILT_SPEED_SPACE),
        zoom_element(1.0, ZOOM_SPEED_SPACE)
    )
}

fn pan_tilt_element(pan: f32, tilt: f32, space: &str) -> String {
    format!(
        r#"<PanTilt x="{pan}" y="{tilt}" xmlns="{tt}" space="{space}"/>"#,
        pan = format_float(pan),
        tilt = format_float(tilt),
        tt = TT_NS,
    )
}

fn zoom_element(zoom: f32, space: &str) -> String {
    format!(
        r#"<Zoom x="{zoom}" xmlns="{tt}" space="{space}"/>"#,
        zoom = format_float(zoom),
        tt = TT_NS,
    )
}

fn format_float(value: f32) -> String {
    let normalized = if value.abs() < f32::EPSILON {
        0.0
    } else {
        value
    };
    format!("{:.3}", normalized)
}

#[cfg(test)]
mod success {
    use super::*;

    #[test]
    fn set_preset_uses_number_as_token() {
        let request = set_preset("Profile_1", 7);

        assert_eq!(request.operation, "SetPreset");
        assert_eq!(request.action(), format!("{}/SetPreset", PTZ_ACTION_NS));
        assert!(request
            .body
            .contains("<ProfileToken>Profile_1</ProfileToken>"));
        assert!(request.body.contains("<PresetToken>7</PresetToken>"));
    }

    #[test]
    fn goto_preset_moves_at_full_speed() {
        let request = goto_preset("Profile_1", 0x3F12);

        assert!(request.body.contains("<PresetToken>16146</PresetToken>"));
        assert!(request.body.contains(r#"<PanTilt x="1.000" y="1.000""#));
        assert!(request.body.contains(r#"<Zoom x="1.000""#));
    }

    #[test]
    fn continuous_move_is_clamped() {
        let request = continuous_move(
            "Profile_1",
            PtzVelocity {
                pan: -1.25,
                tilt: 0.5,
                zoom: -0.0,
            },
        );

        assert!(request
            .body
            .contains(r#"<PanTilt x="-1.000" y="0.500""#));
        assert!(request.body.contains(r#"<Zoom x="0.000""#));
        assert!(request.body.contains(PAN_TILT_VELOCITY_SPACE));
    }

    #[test]
    fn stop_both_axes() {
        let request = stop("Profile_1", true, true);

        assert!(request
            .body
            .ends_with("<PanTilt>true</PanTilt><Zoom>true</Zoom></Stop>"));
    }

    #[test]
    fn profile_token_is_escaped() {
        let request = stop("a&b", true, false);

        assert!(request.body.contains("<ProfileToken>a&amp;b</ProfileToken>"));
    }

    #[test]
    fn home_position() {
        let request = goto_home_position("Profile_1");

        assert_eq!(request.operation, "GotoHomePosition");
        assert!(request
            .body
            .contains("<ProfileToken>Profile_1</ProfileToken>"));
    }
}
