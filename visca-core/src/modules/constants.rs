use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Largest datagram a gateway reads from a controller.
pub const MAX_FRAME_LEN: usize = 16;
/// Frames shorter than this carry no device address.
pub const MIN_FRAME_LEN: usize = 3;

pub const TERMINATOR: u8 = 0xFF;

/// High nibble of the first byte of every controller -> device frame (`8x`).
pub const DEVICE_HEADER: u8 = 0x08;
/// High nibble of the second byte of a CommandCancel frame (`8x 2p`).
pub const CANCEL_HEADER: u8 = 0x02;
/// Replies are addressed to `y = x + 8`.
pub const REPLY_ADDRESS_OFFSET: u8 = 8;

pub const ACK: u8 = 0x41;
pub const COMPLETION: u8 = 0x50;
pub const SYNTAX_ERROR: [u8; 2] = [0x60, 0x02];

#[derive(Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive, Clone, Copy)]
#[repr(u8)]
pub enum MessageCategory {
    Control = 0x01,
    Inquiry = 0x09,
}

#[derive(Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive, Clone, Copy)]
#[repr(u16)]
pub enum ControlOpcode {
    Home = 0x0604,
    CamZoom = 0x0407,
    CamZoomDirect = 0x0447,
    PanTiltDrive = 0x0601,
    PanTiltAbsolute = 0x0602,
}

#[derive(Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive, Clone, Copy)]
#[repr(u16)]
pub enum InquiryOpcode {
    PanTiltPosInq = 0x0612,
    CamFocusPosInq = 0x0448,
    CamZoomPosInq = 0x0447,
}
