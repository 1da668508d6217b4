use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum::Display;

/// A classified controller -> device frame.
///
/// `x` is the sending device slot (low nibble of the first byte). `Unknown` carries no slot when the
/// frame was too short to contain one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Unknown {
        x: Option<u8>,
    },
    CommandCancel {
        x: u8,
    },
    Home {
        x: u8,
    },
    CamZoom {
        x: u8,
        function: CamZoomFunction,
    },
    PanTiltDrive {
        x: u8,
        function: PanTiltFunction,
        vv: u8,
        ww: u8,
    },
    PanTiltPosInq {
        x: u8,
    },
    CamZoomPosInq {
        x: u8,
    },
    CamFocusPosInq {
        x: u8,
    },
}

impl Command {
    pub fn device(&self) -> Option<u8> {
        match *self {
            Command::Unknown { x } => x,
            Command::CommandCancel { x }
            | Command::Home { x }
            | Command::CamZoom { x, .. }
            | Command::PanTiltDrive { x, .. }
            | Command::PanTiltPosInq { x }
            | Command::CamZoomPosInq { x }
            | Command::CamFocusPosInq { x } => Some(x),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Unknown { .. } => "Unknown",
            Command::CommandCancel { .. } => "CommandCancel",
            Command::Home { .. } => "Home",
            Command::CamZoom { .. } => "CAM_Zoom",
            Command::PanTiltDrive { .. } => "Pan-tiltDrive",
            Command::PanTiltPosInq { .. } => "Pan-tiltPosInq",
            Command::CamZoomPosInq { .. } => "CAM_ZoomPosInq",
            Command::CamFocusPosInq { .. } => "CAM_FocusPosInq",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CamZoomFunction {
    Stop,
    /// `p` is the speed, 0 (slow) to 7 (fast).
    Tele {
        p: u8,
    },
    Wide {
        p: u8,
    },
    Direct {
        p: u8,
        q: u8,
        r: u8,
        s: u8,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanTiltFunction {
    Continuous(Direction),
    AbsolutePosition { yyyy: u16, zzzz: u16 },
}

/// Direction code of a continuous Pan-tiltDrive, keyed by its two wire bytes.
#[derive(Debug, Display, TryFromPrimitive, IntoPrimitive, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Direction {
    Stop = 0x0303,
    Up = 0x0301,
    Down = 0x0302,
    Left = 0x0103,
    Right = 0x0203,
    UpLeft = 0x0101,
    UpRight = 0x0201,
    DownLeft = 0x0102,
    DownRight = 0x0202,
}
