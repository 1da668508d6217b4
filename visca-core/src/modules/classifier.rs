use crate::modules::{
    command::{CamZoomFunction, Command, Direction, PanTiltFunction},
    constants::{
        ControlOpcode, InquiryOpcode, MessageCategory, CANCEL_HEADER, DEVICE_HEADER,
        MIN_FRAME_LEN,
    },
    nibbles::pack_nibbles,
};

/// Classifies one inbound frame. Never fails: anything that does not decode is `Unknown`.
pub fn classify(frame: &[u8]) -> Command {
    if frame.len() < MIN_FRAME_LEN {
        tracing::trace!("frame too short: {} bytes", frame.len());
        return Command::Unknown { x: None };
    }

    let x = frame[0] % 0x10;
    let command = if frame[0] / 0x10 != DEVICE_HEADER {
        None
    } else if frame[1] / 0x10 == CANCEL_HEADER {
        Some(Command::CommandCancel { x })
    } else {
        match MessageCategory::try_from(frame[1]) {
            Ok(MessageCategory::Control) => classify_control(frame, x),
            Ok(MessageCategory::Inquiry) => classify_inquiry(frame, x),
            Err(_) => None,
        }
    };

    let command = command.unwrap_or(Command::Unknown { x: Some(x) });
    tracing::trace!("classified {:02x?} as {:?}", frame, command);
    command
}

fn opcode(frame: &[u8]) -> Option<u16> {
    let bytes = frame.get(2..4)?;
    Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}

// Everything after the category byte, without the trailing terminator.
fn payload(frame: &[u8]) -> &[u8] {
    &frame[2..frame.len() - 1]
}

fn classify_control(frame: &[u8], x: u8) -> Option<Command> {
    let payload = payload(frame);
    match ControlOpcode::try_from(opcode(frame)?).ok()? {
        ControlOpcode::Home => Some(Command::Home { x }),
        ControlOpcode::CamZoom => cam_zoom(payload, x),
        ControlOpcode::CamZoomDirect => cam_zoom_direct(payload, x),
        ControlOpcode::PanTiltDrive => pan_tilt_continuous(payload, x),
        ControlOpcode::PanTiltAbsolute => pan_tilt_absolute(payload, x),
    }
}

fn classify_inquiry(frame: &[u8], x: u8) -> Option<Command> {
    match InquiryOpcode::try_from(opcode(frame)?).ok()? {
        InquiryOpcode::PanTiltPosInq => Some(Command::PanTiltPosInq { x }),
        InquiryOpcode::CamFocusPosInq => Some(Command::CamFocusPosInq { x }),
        InquiryOpcode::CamZoomPosInq => Some(Command::CamZoomPosInq { x }),
    }
}

// 04 07 pq
fn cam_zoom(payload: &[u8], x: u8) -> Option<Command> {
    let arg = *payload.get(2)?;
    let p = arg % 0x10;
    let function = match arg / 0x10 {
        0x00 => CamZoomFunction::Stop,
        0x02 => CamZoomFunction::Tele { p },
        0x03 => CamZoomFunction::Wide { p },
        _ => return None,
    };
    Some(Command::CamZoom { x, function })
}

// 04 47 0p 0q 0r 0s
fn cam_zoom_direct(payload: &[u8], x: u8) -> Option<Command> {
    let digits = payload.get(2..6)?;
    let function = CamZoomFunction::Direct {
        p: digits[0] % 0x10,
        q: digits[1] % 0x10,
        r: digits[2] % 0x10,
        s: digits[3] % 0x10,
    };
    Some(Command::CamZoom { x, function })
}

// 06 01 VV WW dd dd
fn pan_tilt_continuous(payload: &[u8], x: u8) -> Option<Command> {
    let &[_, _, vv, ww, high, low] = payload else {
        return None;
    };
    let direction = Direction::try_from(u16::from_be_bytes([high, low])).ok()?;
    Some(Command::PanTiltDrive {
        x,
        function: PanTiltFunction::Continuous(direction),
        vv,
        ww,
    })
}

// 06 02 VV WW 0Y 0Y 0Y 0Y 0Z 0Z 0Z 0Z
fn pan_tilt_absolute(payload: &[u8], x: u8) -> Option<Command> {
    if payload.len() < 12 {
        return None;
    }
    let digits = |from: usize| [payload[from], payload[from + 1], payload[from + 2], payload[from + 3]];
    Some(Command::PanTiltDrive {
        x,
        function: PanTiltFunction::AbsolutePosition {
            yyyy: pack_nibbles(digits(4)),
            zzzz: pack_nibbles(digits(8)),
        },
        vv: payload[2],
        ww: payload[3],
    })
}


#[cfg(test)]
mod failure {
    use super::classify;
    use crate::modules::command::Command;

    #[test]
    fn too_short_has_no_device() {
        assert_eq!(classify(&[]), Command::Unknown { x: None });
        assert_eq!(classify(&[0x81, 0x01]), Command::Unknown { x: None });
    }

    #[test]
    fn not_a_device_header() {
        assert_eq!(
            classify(&[0x91, 0x01, 0x06, 0x04, 0xFF]),
            Command::Unknown { x: Some(1) }
        );
    }

    #[test]
    fn unknown_category() {
        assert_eq!(
            classify(&[0x83, 0x05, 0x06, 0x04, 0xFF]),
            Command::Unknown { x: Some(3) }
        );
    }

    #[test]
    fn unknown_opcode() {
        assert_eq!(
            classify(&[0x81, 0x01, 0x04, 0x38, 0x02, 0xFF]),
            Command::Unknown { x: Some(1) }
        );
        // Home is a control command, not an inquiry
        assert_eq!(
            classify(&[0x81, 0x09, 0x06, 0x04, 0xFF]),
            Command::Unknown { x: Some(1) }
        );
    }

    #[test]
    fn opcode_cut_short() {
        assert_eq!(
            classify(&[0x81, 0x01, 0xFF]),
            Command::Unknown { x: Some(1) }
        );
    }

    #[test]
    fn unmatched_direction() {
        assert_eq!(
            classify(&[0x81, 0x01, 0x06, 0x01, 0x14, 0x13, 0x04, 0x04, 0xFF]),
            Command::Unknown { x: Some(1) }
        );
    }

    #[test]
    fn continuous_drive_with_trailing_bytes() {
        assert_eq!(
            classify(&[0x81, 0x01, 0x06, 0x01, 0x14, 0x13, 0x01, 0x02, 0x00, 0xFF]),
            Command::Unknown { x: Some(1) }
        );
    }

    #[test]
    fn absolute_position_cut_short() {
        assert_eq!(
            classify(&[0x81, 0x01, 0x06, 0x02, 0x14, 0x14, 0x03, 0x0F, 0x01, 0x02, 0xFF]),
            Command::Unknown { x: Some(1) }
        );
    }

    #[test]
    fn cam_zoom_without_argument() {
        assert_eq!(
            classify(&[0x81, 0x01, 0x04, 0x07, 0xFF]),
            Command::Unknown { x: Some(1) }
        );
    }

    #[test]
    fn cam_zoom_unknown_function() {
        assert_eq!(
            classify(&[0x81, 0x01, 0x04, 0x07, 0x45, 0xFF]),
            Command::Unknown { x: Some(1) }
        );
    }
}
