use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

/// Frames the gateway knows how to form, keyed by their VISCA command name.
#[derive(Debug, Display, EnumString, Clone, Copy, PartialEq, Eq)]
pub enum ReplyTag {
    #[strum(serialize = "Ack")]
    Ack,
    #[strum(serialize = "Syntax_Error")]
    SyntaxError,
    #[strum(serialize = "Pan-tiltPosInq")]
    PanTiltPosInq,
    #[strum(serialize = "CAM_ZoomPosInq")]
    CamZoomPosInq,
    #[strum(serialize = "CAM_FocusPosInq")]
    CamFocusPosInq,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("unsupported command: {0}")]
    UnsupportedCommand(String),
    #[error("missing field `{field}` for {command}")]
    MissingField {
        command: ReplyTag,
        field: &'static str,
    },
    #[error("{field}={value} does not fit a VISCA header byte")]
    AddressOutOfRange { field: &'static str, value: u8 },
}

/// Description of an outbound frame: a command name plus whichever fields that command needs.
///
/// Inquiry names form a reply when the reply fields are present and fall back to the request
/// form when only `x` is given.
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Description {
    #[serde(rename = "Command")]
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wwww: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zzzz: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<u8>,
}

impl Description {
    pub fn new(command: ReplyTag) -> Description {
        Description {
            command: command.to_string(),
            ..Default::default()
        }
    }

    pub fn ack(z: u8) -> Description {
        Description::new(ReplyTag::Ack).with_z(z)
    }

    pub fn syntax_error(z: u8) -> Description {
        Description::new(ReplyTag::SyntaxError).with_z(z)
    }

    pub fn pan_tilt_position(y: u8, wwww: u16, zzzz: u16) -> Description {
        Description {
            y: Some(y),
            wwww: Some(wwww),
            zzzz: Some(zzzz),
            ..Description::new(ReplyTag::PanTiltPosInq)
        }
    }

    /// `y 50 0p 0q 0r 0s FF` reply for CAM_ZoomPosInq or CAM_FocusPosInq.
    pub fn pqrs_position(command: ReplyTag, y: u8, pqrs: [u8; 4]) -> Description {
        Description {
            y: Some(y),
            p: Some(pqrs[0]),
            q: Some(pqrs[1]),
            r: Some(pqrs[2]),
            s: Some(pqrs[3]),
            ..Description::new(command)
        }
    }

    pub fn inquiry(command: ReplyTag, x: u8) -> Description {
        Description::new(command).with_x(x)
    }

    pub fn with_x(mut self, x: u8) -> Description {
        self.x = Some(x);
        self
    }

    pub fn with_y(mut self, y: u8) -> Description {
        self.y = Some(y);
        self
    }

    pub fn with_z(mut self, z: u8) -> Description {
        self.z = Some(z);
        self
    }

    pub fn tag(&self) -> Result<ReplyTag, FormError> {
        self.command
            .parse()
            .map_err(|_| FormError::UnsupportedCommand(self.command.clone()))
    }
}

#[cfg(test)]
mod success {
    use super::{Description, ReplyTag};

    #[test]
    fn tag_names() {
        assert_eq!(ReplyTag::PanTiltPosInq.to_string(), "Pan-tiltPosInq");
        assert_eq!(ReplyTag::SyntaxError.to_string(), "Syntax_Error");
        assert_eq!(
            "CAM_FocusPosInq".parse::<ReplyTag>().unwrap(),
            ReplyTag::CamFocusPosInq
        );
    }

    #[test]
    fn deserialize_from_json() {
        let description: Description = serde_json::from_str(
            r#"{"Command": "CAM_FocusPosInq", "p": 1, "q": 2, "r": 3, "s": 4, "y": 5}"#,
        )
        .unwrap();

        assert_eq!(
            description,
            Description::pqrs_position(ReplyTag::CamFocusPosInq, 5, [1, 2, 3, 4])
        );
        assert_eq!(description.x, None);
    }
}
