use otspec::types::*;
use otspec::{DeserializationError, Deserializer, ReaderContext, SerializationError, Serialize};
use std::ops::Range;

/// The 'loca' OpenType tag.
pub const TAG: Tag = tag!("loca");

/// The glyph location table: N+1 offsets into `glyf` for N glyphs.
///
/// Glyph `i` occupies `indices[i]..indices[i + 1]`; an empty glyph has two
/// equal offsets.
#[allow(non_camel_case_types)]
#[derive(Debug, PartialEq, Clone, Default)]
pub struct loca {
    /// Byte offsets into the `glyf` table
    pub indices: Vec<u32>,
}

impl loca {
    /// Number of glyphs located by this table
    pub fn num_glyphs(&self) -> usize {
        self.indices.len().saturating_sub(1)
    }

    /// Byte ranges of each glyph within `glyf`.
    pub fn glyph_ranges(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        self.indices
            .windows(2)
            .map(|ab| ab[0] as usize..ab[1] as usize)
    }
}

/// Always written in the long (32-bit) format; `head.indexToLocFormat` is 1.
impl Serialize for loca {
    fn to_bytes(&self, data: &mut Vec<u8>) -> Result<(), SerializationError> {
        self.indices.to_bytes(data)
    }
}

/// Reads a `loca` table in either the short or long format.
pub fn from_bytes(s: &[u8], loca_is_32bit: bool) -> Result<loca, DeserializationError> {
    let mut c = ReaderContext::new(s.to_vec());
    let indices: Vec<u32> = if loca_is_32bit {
        c.de_counted(s.len() / 4)?
    } else {
        let short: Vec<u16> = c.de_counted(s.len() / 2)?;
        short.iter().map(|x| (*x as u32) * 2).collect()
    };
    if indices.windows(2).any(|ab| ab[1] < ab[0]) {
        return Err(DeserializationError(
            "Glyph offsets are not in ascending order".to_string(),
        ));
    }
    Ok(loca { indices })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn loca_de_16bit() {
        let binary_loca = vec![0x00, 0x00, 0x01, 0x30, 0x01, 0x30, 0x01, 0x4c];
        let floca = from_bytes(&binary_loca, false).unwrap();
        assert_eq!(floca.indices, vec![0, 608, 608, 664]);
        assert_eq!(floca.num_glyphs(), 3);
        assert_eq!(
            floca.glyph_ranges().collect::<Vec<_>>(),
            vec![0..608, 608..608, 608..664]
        );
    }

    #[test]
    fn loca_serde_32bit() {
        let floca = loca {
            indices: vec![0, 36, 36],
        };
        let binary_loca = otspec::ser::to_bytes(&floca).unwrap();
        assert_eq!(
            binary_loca,
            vec![0, 0, 0, 0, 0, 0, 0, 0x24, 0, 0, 0, 0x24]
        );
        assert_eq!(from_bytes(&binary_loca, true).unwrap(), floca);
    }

    #[test]
    fn loca_descending_is_an_error() {
        assert!(from_bytes(&[0, 0, 0, 8, 0, 0, 0, 4], true).is_err());
    }
}
