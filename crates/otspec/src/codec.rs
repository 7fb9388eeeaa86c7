//! Fixed-width big-endian integer encoding with range checking.
//!
//! Every multi-byte value in a TrueType font is a big-endian integer of a
//! fixed width. The `Serialize` impls for the primitive types cover the
//! common case where the Rust type already matches the field; the functions
//! here are for values computed in a wider type (offsets, deltas, counts)
//! which must be checked before they are narrowed.
use crate::{DeserializationError, SerializationError};
use std::convert::TryFrom;

/// The width of an encoded integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// 16 bits
    W16,
    /// 32 bits
    W32,
    /// 64 bits
    W64,
}

impl Width {
    /// The width in bits.
    pub fn bits(self) -> u32 {
        match self {
            Width::W16 => 16,
            Width::W32 => 32,
            Width::W64 => 64,
        }
    }

    /// The width in bytes.
    pub fn bytes(self) -> usize {
        (self.bits() / 8) as usize
    }

    /// Inclusive bounds of representable values.
    pub fn bounds(self, signed: bool) -> (i128, i128) {
        let bits = self.bits();
        if signed {
            (-(1_i128 << (bits - 1)), (1_i128 << (bits - 1)) - 1)
        } else {
            (0, (1_i128 << bits) - 1)
        }
    }
}

/// Encodes `value` as a big-endian integer of the given width.
///
/// Fails with `SerializationError::Overflow` if the value is outside the
/// range of the target field.
pub fn encode(value: i128, width: Width, signed: bool) -> Result<Vec<u8>, SerializationError> {
    let (min, max) = width.bounds(signed);
    if value < min || value > max {
        return Err(SerializationError::Overflow {
            value,
            bits: width.bits(),
            signed,
        });
    }
    let full = value.to_be_bytes();
    Ok(full[full.len() - width.bytes()..].to_vec())
}

/// Decodes a big-endian integer of the given width. The slice must be
/// exactly `width.bytes()` long.
pub fn decode(bytes: &[u8], width: Width, signed: bool) -> Result<i128, DeserializationError> {
    if bytes.len() != width.bytes() {
        return Err(DeserializationError(format!(
            "Expected {} bytes for a {}-bit integer, found {}",
            width.bytes(),
            width.bits(),
            bytes.len()
        )));
    }
    let negative = signed && bytes[0] & 0x80 != 0;
    let mut full = if negative { [0xff; 16] } else { [0x00; 16] };
    full[16 - bytes.len()..].copy_from_slice(bytes);
    Ok(i128::from_be_bytes(full))
}

macro_rules! narrowing {
    ($name:ident, $t:ty, $signed:expr) => {
        /// Narrows a value computed in a wider type, failing with an
        /// overflow error if it does not fit.
        pub fn $name(value: i64) -> Result<$t, SerializationError> {
            <$t>::try_from(value).map_err(|_| SerializationError::Overflow {
                value: value.into(),
                bits: <$t>::BITS,
                signed: $signed,
            })
        }
    };
}

narrowing!(to_i16, i16, true);
narrowing!(to_u16, u16, false);
narrowing!(to_u32, u32, false);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_widths() {
        assert_eq!(encode(1000, Width::W16, false).unwrap(), [0x03, 0xe8]);
        assert_eq!(encode(-200, Width::W16, true).unwrap(), [0xff, 0x38]);
        assert_eq!(
            encode(0x5F0F3CF5, Width::W32, false).unwrap(),
            [0x5f, 0x0f, 0x3c, 0xf5]
        );
        assert_eq!(
            encode(-1, Width::W64, true).unwrap(),
            [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
        );
        assert_eq!(
            encode(u64::MAX.into(), Width::W64, false).unwrap(),
            [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
        );
    }

    #[test]
    fn encode_out_of_range() {
        assert!(encode(65536, Width::W16, false).is_err());
        assert!(encode(-1, Width::W16, false).is_err());
        assert!(encode(32768, Width::W16, true).is_err());
        assert!(encode(-32769, Width::W16, true).is_err());
        assert_eq!(
            encode(1 << 32, Width::W32, false),
            Err(SerializationError::Overflow {
                value: 1 << 32,
                bits: 32,
                signed: false
            })
        );
    }

    #[test]
    fn decode_inverts_encode() {
        for &(value, width, signed) in &[
            (0xffff, Width::W16, false),
            (-32768, Width::W16, true),
            (32767, Width::W16, true),
            (0xb1b0afba, Width::W32, false),
            (i64::MIN as i128, Width::W64, true),
        ] {
            let bytes = encode(value, width, signed).unwrap();
            assert_eq!(decode(&bytes, width, signed).unwrap(), value);
        }
    }

    #[test]
    fn decode_wrong_length() {
        assert!(decode(&[0, 0, 0], Width::W16, false).is_err());
    }

    #[test]
    fn narrowing_bounds() {
        assert_eq!(to_i16(32767), Ok(32767));
        assert_eq!(to_i16(-32768), Ok(-32768));
        assert!(to_i16(32768).is_err());
        assert!(to_u16(-1).is_err());
        assert_eq!(to_u32(0xffff_ffff), Ok(0xffff_ffff));
    }
}
