use otspec::types::*;
use otspec::{DeserializationError, Deserializer, ReaderContext};
use otspec_macros::tables;

/// The 'maxp' OpenType tag.
pub const TAG: Tag = tag!("maxp");

/// Size of a compiled version 1.0 `maxp` table in bytes.
pub const SIZE: usize = 32;

tables!(maxp {
    uint32  version
    uint16  numGlyphs
    uint16  maxPoints
    uint16  maxContours
    uint16  maxCompositePoints
    uint16  maxCompositeContours
    uint16  maxZones
    uint16  maxTwilightPoints
    uint16  maxStorage
    uint16  maxFunctionDefs
    uint16  maxInstructionDefs
    uint16  maxStackElements
    uint16  maxSizeOfInstructions
    uint16  maxComponentElements
    uint16  maxComponentDepth
});

impl maxp {
    /// Creates a new `maxp` table with version=1.0, given a set of
    /// statistics. Outlines are always simple, so the composite fields are
    /// zero.
    #[allow(non_snake_case)]
    pub fn new10(
        numGlyphs: uint16,
        maxPoints: uint16,
        maxContours: uint16,
        maxSizeOfInstructions: uint16,
    ) -> maxp {
        maxp {
            version: 0x00010000,
            numGlyphs,
            maxPoints,
            maxContours,
            maxCompositePoints: 0,
            maxCompositeContours: 0,
            maxZones: 2,
            maxTwilightPoints: 0,
            maxStorage: 0,
            maxFunctionDefs: 0,
            maxInstructionDefs: 0,
            maxStackElements: 0,
            maxSizeOfInstructions,
            maxComponentElements: 0,
            maxComponentDepth: 0,
        }
    }
}

/// Reads a version 1.0 `maxp` table.
pub fn from_bytes(s: &[u8]) -> Result<maxp, DeserializationError> {
    let mut c = ReaderContext::new(s.to_vec());
    let table: maxp = c.de()?;
    if table.version != 0x00010000 {
        return Err(DeserializationError(format!(
            "Unsupported maxp version {:#x}",
            table.version
        )));
    }
    Ok(table)
}
