use otspec::types::*;
use otspec_macros::tables;

/// The 'post' OpenType tag.
pub const TAG: Tag = tag!("post");

/// Size of a compiled version 3.0 `post` table in bytes.
pub const SIZE: usize = 32;

tables!(post {
    Fixed version
    Fixed italicAngle
    FWORD underlinePosition
    FWORD underlineThickness
    uint32 isFixedPitch
    uint32 minMemType42
    uint32 maxMemType42
    uint32 minMemType1
    uint32 maxMemType1
});

impl post {
    /// A version 3.0 table: no glyph names, and zeroed memory hints.
    #[allow(non_snake_case)]
    pub fn new_v3(
        italicAngle: f32,
        underlinePosition: FWORD,
        underlineThickness: FWORD,
        isFixedPitch: bool,
    ) -> post {
        post {
            version: 3.0,
            italicAngle,
            underlinePosition,
            underlineThickness,
            isFixedPitch: isFixedPitch as uint32,
            minMemType42: 0,
            maxMemType42: 0,
            minMemType1: 0,
            maxMemType1: 0,
        }
    }
}
