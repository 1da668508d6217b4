use crate::modules::{
    preset_allocator::PresetAllocator,
    roster::{ClientKey, PresetRanges},
};
use anyhow::Result;
use std::net::IpAddr;
use visca_core::{
    constants::REPLY_ADDRESS_OFFSET, CamZoomFunction, Command, Description, Direction,
    PanTiltFunction, ReplyTag,
};
use visca_onvif::CameraControl;

const PAN_SPEED_SCALE: f32 = 0x18 as f32;
const TILT_SPEED_SCALE: f32 = 0x14 as f32;
const ZOOM_SPEED_SCALE: f32 = 7.0;
/// Reply address used for a syntax error when the frame carried no device slot.
const UNADDRESSED_REPLY: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraCall {
    SetPreset(u16),
    GotoPreset(u16),
    Stop,
    GoHome,
    MoveContinuous { pan: f32, tilt: f32, zoom: f32 },
}

impl CameraCall {
    pub async fn execute(&self, camera: &dyn CameraControl) -> Result<()> {
        match *self {
            CameraCall::SetPreset(token) => camera.set_preset(token).await,
            CameraCall::GotoPreset(token) => camera.goto_preset(token).await,
            CameraCall::Stop => camera.stop().await,
            CameraCall::GoHome => camera.go_home().await,
            CameraCall::MoveContinuous { pan, tilt, zoom } => {
                camera.move_continuous(pan, tilt, zoom).await
            }
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Translation {
    pub call: Option<CameraCall>,
    pub reply: Option<Description>,
}

impl Translation {
    fn call(call: CameraCall) -> Self {
        Self {
            call: Some(call),
            reply: None,
        }
    }

    fn reply(reply: Description) -> Self {
        Self {
            call: None,
            reply: Some(reply),
        }
    }
}

/// Turns classified commands from one camera's controllers into camera calls and replies.
#[derive(Debug, Default)]
pub struct Translator {
    presets: PresetAllocator,
}

impl Translator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sync_ranges(&mut self, ranges: &PresetRanges) {
        self.presets.sync_ranges(ranges);
    }

    /// Picks the range owner for a datagram source, or `None` when the datagram should be dropped.
    pub fn resolve_client(&self, source: IpAddr) -> Option<ClientKey> {
        let client = ClientKey::Host(source.to_canonical());
        if self.presets.has_range(&client) {
            return Some(client);
        }
        self.presets
            .has_range(&ClientKey::Default)
            .then_some(ClientKey::Default)
    }

    pub fn dispatch(&mut self, command: &Command, client: &ClientKey) -> Translation {
        match *command {
            Command::Unknown { x } => Translation::reply(Description::syntax_error(
                x.map_or(UNADDRESSED_REPLY, reply_address),
            )),
            Command::CommandCancel { .. } => Translation::call(CameraCall::Stop),
            Command::Home { .. } => Translation::call(CameraCall::GoHome),
            Command::CamZoom { function, .. } => cam_zoom(function),
            Command::PanTiltDrive {
                function, vv, ww, ..
            } => pan_tilt_drive(function, vv, ww),
            Command::PanTiltPosInq { x } => self.pan_tilt_position(x, client),
            Command::CamZoomPosInq { x } => Translation::reply(Description::pqrs_position(
                ReplyTag::CamZoomPosInq,
                reply_address(x),
                [0; 4],
            )),
            Command::CamFocusPosInq { x } => Translation::reply(Description::pqrs_position(
                ReplyTag::CamFocusPosInq,
                reply_address(x),
                [0; 4],
            )),
        }
    }

    fn pan_tilt_position(&mut self, x: u8, client: &ClientKey) -> Translation {
        let y = reply_address(x);
        match self.presets.advance(client) {
            Some(preset) => Translation {
                call: Some(CameraCall::SetPreset(preset)),
                reply: Some(Description::pan_tilt_position(y, preset, 0)),
            },
            None => {
                tracing::warn!("no preset range for {client}, rejecting position inquiry");
                Translation::reply(Description::syntax_error(y))
            }
        }
    }
}

fn reply_address(x: u8) -> u8 {
    x.saturating_add(REPLY_ADDRESS_OFFSET)
}

fn cam_zoom(function: CamZoomFunction) -> Translation {
    let zoom = match function {
        CamZoomFunction::Stop => return Translation::call(CameraCall::Stop),
        CamZoomFunction::Tele { p } => f32::from(p) / ZOOM_SPEED_SCALE,
        CamZoomFunction::Wide { p } => -f32::from(p) / ZOOM_SPEED_SCALE,
        CamZoomFunction::Direct { p, q, r, s } => {
            tracing::debug!("CAM_Zoom Direct {p:x}{q:x}{r:x}{s:x} ignored");
            return Translation::default();
        }
    };
    Translation::call(CameraCall::MoveContinuous {
        pan: 0.0,
        tilt: 0.0,
        zoom,
    })
}

fn pan_tilt_drive(function: PanTiltFunction, vv: u8, ww: u8) -> Translation {
    let direction = match function {
        PanTiltFunction::AbsolutePosition { yyyy, .. } => {
            return Translation::call(CameraCall::GotoPreset(yyyy))
        }
        PanTiltFunction::Continuous(Direction::Stop) => return Translation::call(CameraCall::Stop),
        PanTiltFunction::Continuous(direction) => direction,
    };
    let pan = f32::from(vv) / PAN_SPEED_SCALE;
    let tilt = f32::from(ww) / TILT_SPEED_SCALE;
    let (pan, tilt) = match direction {
        Direction::Up => (0.0, tilt),
        Direction::Down => (0.0, -tilt),
        Direction::Left => (-pan, 0.0),
        Direction::Right => (pan, 0.0),
        Direction::UpLeft => (-pan, tilt),
        Direction::UpRight => (pan, tilt),
        Direction::DownLeft => (-pan, -tilt),
        Direction::DownRight => (pan, -tilt),
        Direction::Stop => (0.0, 0.0),
    };
    Translation::call(CameraCall::MoveContinuous {
        pan,
        tilt,
        zoom: 0.0,
    })
}


#[cfg(test)]
mod failure {
    use super::*;

    #[test]
    fn inquiry_without_range_is_rejected() {
        let mut translator = Translator::new();
        let client: ClientKey = "10.0.0.5".parse().unwrap();

        assert_eq!(translator.resolve_client("10.0.0.5".parse().unwrap()), None);

        let translation = translator.dispatch(&Command::PanTiltPosInq { x: 1 }, &client);
        assert_eq!(translation.call, None);
        assert_eq!(translation.reply, Some(Description::syntax_error(9)));
    }
}
