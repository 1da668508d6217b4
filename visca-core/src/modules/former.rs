use bytes::{BufMut, BytesMut};

use crate::modules::{
    constants::{
        InquiryOpcode, MessageCategory, ACK, COMPLETION, DEVICE_HEADER, MAX_FRAME_LEN,
        SYNTAX_ERROR, TERMINATOR,
    },
    description::{Description, FormError, ReplyTag},
    nibbles::expand_nibbles,
};

/// Forms the wire bytes for `description`.
pub fn form(description: &Description) -> Result<BytesMut, FormError> {
    let command = description.tag()?;
    let mut buf = BytesMut::with_capacity(MAX_FRAME_LEN);

    match command {
        ReplyTag::Ack => {
            let z = require(description.z, command, "z")?;
            buf.put_u8(reply_header(z, "z")?);
            buf.put_u8(ACK);
        }
        ReplyTag::SyntaxError => {
            let z = require(description.z, command, "z")?;
            buf.put_u8(reply_header(z, "z")?);
            buf.put_slice(&SYNTAX_ERROR);
        }
        ReplyTag::PanTiltPosInq => {
            match (description.y, description.wwww, description.zzzz) {
                (Some(y), Some(wwww), Some(zzzz)) => {
                    buf.put_u8(reply_header(y, "y")?);
                    buf.put_u8(COMPLETION);
                    buf.put_slice(&expand_nibbles(wwww));
                    buf.put_slice(&expand_nibbles(zzzz));
                }
                (y, wwww, zzzz) => {
                    let x = description.x.ok_or_else(|| {
                        let field = first_missing(&[
                            ("y", y.is_some()),
                            ("wwww", wwww.is_some()),
                            ("zzzz", zzzz.is_some()),
                        ]);
                        FormError::MissingField { command, field }
                    })?;
                    put_inquiry(&mut buf, x, InquiryOpcode::PanTiltPosInq)?;
                }
            }
        }
        ReplyTag::CamZoomPosInq | ReplyTag::CamFocusPosInq => {
            let d = description;
            match (d.y, d.p, d.q, d.r, d.s) {
                (Some(y), Some(p), Some(q), Some(r), Some(s)) => {
                    buf.put_u8(reply_header(y, "y")?);
                    buf.put_u8(COMPLETION);
                    buf.put_slice(&[p, q, r, s]);
                }
                (y, p, q, r, s) => {
                    let x = d.x.ok_or_else(|| {
                        let field = first_missing(&[
                            ("p", p.is_some()),
                            ("q", q.is_some()),
                            ("r", r.is_some()),
                            ("s", s.is_some()),
                            ("y", y.is_some()),
                        ]);
                        FormError::MissingField { command, field }
                    })?;
                    let opcode = if command == ReplyTag::CamZoomPosInq {
                        InquiryOpcode::CamZoomPosInq
                    } else {
                        InquiryOpcode::CamFocusPosInq
                    };
                    put_inquiry(&mut buf, x, opcode)?;
                }
            }
        }
    }
    buf.put_u8(TERMINATOR);

    tracing::trace!("Formed {} frame: {:02x?}", command, buf.as_ref());

    Ok(buf)
}

fn require(value: Option<u8>, command: ReplyTag, field: &'static str) -> Result<u8, FormError> {
    value.ok_or(FormError::MissingField { command, field })
}

fn first_missing(fields: &[(&'static str, bool)]) -> &'static str {
    fields
        .iter()
        .find(|(_, present)| !present)
        .map(|(name, _)| *name)
        .unwrap_or("x")
}

// `0x10 * y` must fit the header byte.
fn reply_header(address: u8, field: &'static str) -> Result<u8, FormError> {
    if address > 0x0F {
        return Err(FormError::AddressOutOfRange {
            field,
            value: address,
        });
    }
    Ok(address * 0x10)
}

fn put_inquiry(buf: &mut BytesMut, x: u8, opcode: InquiryOpcode) -> Result<(), FormError> {
    if x > 0x0F {
        return Err(FormError::AddressOutOfRange { field: "x", value: x });
    }
    buf.put_u8(DEVICE_HEADER * 0x10 + x);
    buf.put_u8(MessageCategory::Inquiry.into());
    buf.put_u16(opcode.into());
    Ok(())
}
