//! VISCA spreads 16-bit values over four bytes, one hex digit per byte (`0p 0q 0r 0s`).

/// Packs four half-byte digits into a 16-bit value: `d0<<12 | d1<<8 | d2<<4 | d3`.
/// Only the low nibble of each digit is used.
pub fn pack_nibbles(digits: [u8; 4]) -> u16 {
    digits
        .iter()
        .fold(0u16, |value, digit| (value << 4) | u16::from(digit & 0x0F))
}

/// Expands a 16-bit value into four bytes holding one hex digit each, most significant first.
pub fn expand_nibbles(value: u16) -> [u8; 4] {
    [
        (value >> 12) as u8 & 0x0F,
        (value >> 8) as u8 & 0x0F,
        (value >> 4) as u8 & 0x0F,
        value as u8 & 0x0F,
    ]
}

#[cfg(test)]
mod success {
    use super::{expand_nibbles, pack_nibbles};

    #[test]
    fn pack_four_digits() {
        assert_eq!(pack_nibbles([0x03, 0x0F, 0x01, 0x02]), 0x3F12);
        assert_eq!(pack_nibbles([0x0A, 0x01, 0x01, 0x01]), 0xA111);
    }

    #[test]
    fn pack_ignores_high_nibble() {
        assert_eq!(pack_nibbles([0x13, 0xFF, 0x21, 0x02]), 0x3F12);
    }

    #[test]
    fn expand_preset_number() {
        assert_eq!(expand_nibbles(0x0003), [0x00, 0x00, 0x00, 0x03]);
        assert_eq!(expand_nibbles(0x1234), [0x01, 0x02, 0x03, 0x04]);
        assert_eq!(expand_nibbles(0xFFFF), [0x0F, 0x0F, 0x0F, 0x0F]);
    }

    #[test]
    fn expand_then_pack() {
        for value in [0u16, 1, 0x0100, 0x5678, 0xBEEF] {
            assert_eq!(pack_nibbles(expand_nibbles(value)), value);
        }
    }
}
