use otspec::types::*;
use otspec::{DeserializationError, Deserializer, ReaderContext};
use otspec_macros::tables;

/// The 'head' OpenType tag.
pub const TAG: Tag = tag!("head");

/// Size of a compiled `head` table in bytes.
pub const SIZE: usize = 54;

/// Byte range of `checksumAdjustment` within the table.
pub const CHECKSUM_ADJUSTMENT: std::ops::Range<usize> = 8..12;

tables!(head {
    uint16 majorVersion
    uint16 minorVersion
    Fixed fontRevision
    uint32 checksumAdjustment
    uint32 magicNumber
    uint16 flags
    uint16 unitsPerEm
    LONGDATETIME created
    LONGDATETIME modified
    int16 xMin
    int16 yMin
    int16 xMax
    int16 yMax
    uint16 macStyle
    uint16 lowestRecPPEM
    int16 fontDirectionHint
    int16 indexToLocFormat
    int16 glyphDataFormat
});

/// Create a new `head` table, given a float font revision, units-per-em
/// value and the global glyph coordinate maxima/minima.
///
/// Both dates are set to the 1904 epoch and the checksum adjustment is
/// left at zero for the font assembler to fill in. Glyph offsets are
/// always long.
#[allow(non_snake_case)]
pub fn new(
    fontRevision: f32,
    upm: uint16,
    xMin: int16,
    yMin: int16,
    xMax: int16,
    yMax: int16,
) -> head {
    head {
        majorVersion: 1,
        minorVersion: 0,
        fontRevision,
        checksumAdjustment: 0x0,
        magicNumber: 0x5F0F3CF5,
        flags: 3,
        unitsPerEm: upm,
        created: longdatetime_epoch(),
        modified: longdatetime_epoch(),
        xMin,
        yMin,
        xMax,
        yMax,
        macStyle: 0,
        lowestRecPPEM: 6,
        fontDirectionHint: 2,
        indexToLocFormat: 1,
        glyphDataFormat: 0,
    }
}

impl head {
    /// Does `loca` use 32-bit offsets?
    pub fn loca_is_32bit(&self) -> bool {
        self.indexToLocFormat == 1
    }
}

/// Reads a `head` table.
pub fn from_bytes(s: &[u8]) -> Result<head, DeserializationError> {
    let mut c = ReaderContext::new(s.to_vec());
    let table: head = c.de()?;
    if table.magicNumber != 0x5F0F3CF5 {
        return Err(DeserializationError(format!(
            "Bad magic number {:#x} in head",
            table.magicNumber
        )));
    }
    Ok(table)
}
