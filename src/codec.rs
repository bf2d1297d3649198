//! Byte-level helpers for the MGEN wire format.
//!
//! The device always speaks little-endian. Positions travel as packed signed
//! 24-bit values and the dither amplitude as unsigned 8.8 fixed point.

const I24_MIN: i32 = -(1 << 23);
const I24_MAX: i32 = (1 << 23) - 1;

pub fn encode_u16_le(value: u16) -> [u8; 2] {
    value.to_le_bytes()
}

pub fn decode_u16_le(bytes: [u8; 2]) -> u16 {
    u16::from_le_bytes(bytes)
}

pub fn decode_i16_le(bytes: [u8; 2]) -> i16 {
    i16::from_le_bytes(bytes)
}

pub fn decode_i32_le(bytes: [u8; 4]) -> i32 {
    i32::from_le_bytes(bytes)
}

/// Decode a packed 24-bit two's complement value, sign-extending into `i32`.
pub fn decode_i24_le(bytes: [u8; 3]) -> i32 {
    // Place the 24 bits in the top of the word, then shift back arithmetically.
    i32::from_le_bytes([0, bytes[0], bytes[1], bytes[2]]) >> 8
}

/// Encode `value` as packed 24-bit two's complement.
/// Returns `None` if it does not fit.
pub fn encode_i24_le(value: i32) -> Option<[u8; 3]> {
    if !(I24_MIN..=I24_MAX).contains(&value) {
        return None;
    }
    let [b0, b1, b2, _] = value.to_le_bytes();
    Some([b0, b1, b2])
}

/// Unsigned 8.8 fixed point to float.
pub fn decode_fixed_8_8(raw: u16) -> f64 {
    raw as f64 / 256.0
}

/// Float to unsigned 8.8 fixed point, rounding to the nearest step.
/// Returns `None` for non-finite or out of range values.
pub fn encode_fixed_8_8(value: f64) -> Option<u16> {
    let raw = (value * 256.0).round();
    if !raw.is_finite() || raw < 0.0 || raw > u16::MAX as f64 {
        return None;
    }
    Some(raw as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u16_is_little_endian() {
        assert_eq!(encode_u16_le(0x0423), [0x23, 0x04]);
        assert_eq!(decode_u16_le([0x23, 0x04]), 0x0423);
    }

    #[test]
    fn test_decode_i16() {
        assert_eq!(decode_i16_le([0xFF, 0xFF]), -1);
        assert_eq!(decode_i16_le([0x00, 0x80]), i16::MIN);
        assert_eq!(decode_i16_le([0x34, 0x12]), 0x1234);
    }

    #[test]
    fn test_decode_i32() {
        assert_eq!(decode_i32_le([0xFE, 0xFF, 0xFF, 0xFF]), -2);
        assert_eq!(decode_i32_le([0x78, 0x56, 0x34, 0x12]), 0x1234_5678);
    }

    #[test]
    fn test_decode_i24_positive() {
        assert_eq!(decode_i24_le([0x00, 0x00, 0x00]), 0);
        assert_eq!(decode_i24_le([0x00, 0x01, 0x00]), 256);
        assert_eq!(decode_i24_le([0xFF, 0xFF, 0x7F]), I24_MAX);
    }

    #[test]
    fn test_decode_i24_sign_extends() {
        assert_eq!(decode_i24_le([0xFF, 0xFF, 0xFF]), -1);
        assert_eq!(decode_i24_le([0x00, 0x80, 0xFF]), -32768);
        assert_eq!(decode_i24_le([0x00, 0x00, 0x80]), I24_MIN);
    }

    #[test]
    fn test_encode_i24() {
        assert_eq!(encode_i24_le(-1), Some([0xFF, 0xFF, 0xFF]));
        assert_eq!(encode_i24_le(0x012345), Some([0x45, 0x23, 0x01]));
        assert_eq!(encode_i24_le(I24_MIN), Some([0x00, 0x00, 0x80]));
        assert_eq!(encode_i24_le(I24_MAX + 1), None);
        assert_eq!(encode_i24_le(I24_MIN - 1), None);
    }

    #[test]
    fn test_fixed_8_8() {
        assert_eq!(decode_fixed_8_8(0x0A00), 10.0);
        assert_eq!(decode_fixed_8_8(0x0180), 1.5);
        assert_eq!(encode_fixed_8_8(10.0), Some(0x0A00));
        assert_eq!(encode_fixed_8_8(0.5), Some(0x0080));
        assert_eq!(encode_fixed_8_8(-1.0), None);
        assert_eq!(encode_fixed_8_8(256.0), None);
        assert_eq!(encode_fixed_8_8(f64::NAN), None);
    }
}
