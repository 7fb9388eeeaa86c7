use otspec::types::*;
use otspec::utils::filtered_bitset_to_num;
use otspec::{DeserializationError, Deserializer, ReaderContext};
use otspec_macros::tables;

/// The 'OS/2' OpenType tag.
pub const TAG: Tag = tag!("OS/2");

/// Size of a compiled version 2 `OS/2` table in bytes.
pub const SIZE: usize = 96;

tables!(
    Panose {
        u8 panose0
        u8 panose1
        u8 panose2
        u8 panose3
        u8 panose4
        u8 panose5
        u8 panose6
        u8 panose7
        u8 panose8
        u8 panose9
    }
    os2 {
        uint16	version
        int16	xAvgCharWidth
        uint16	usWeightClass
        uint16	usWidthClass
        uint16	fsType
        int16	ySubscriptXSize
        int16	ySubscriptYSize
        int16	ySubscriptXOffset
        int16	ySubscriptYOffset
        int16	ySuperscriptXSize
        int16	ySuperscriptYSize
        int16	ySuperscriptXOffset
        int16	ySuperscriptYOffset
        int16	yStrikeoutSize
        int16	yStrikeoutPosition
        int16	sFamilyClass
        Panose	panose
        uint32	ulUnicodeRange1
        uint32	ulUnicodeRange2
        uint32	ulUnicodeRange3
        uint32	ulUnicodeRange4
        Tag	achVendID
        uint16	fsSelection
        uint16	usFirstCharIndex
        uint16	usLastCharIndex
        int16	sTypoAscender
        int16	sTypoDescender
        int16	sTypoLineGap
        uint16	usWinAscent
        uint16	usWinDescent
        uint32	ulCodePageRange1
        uint32	ulCodePageRange2
        int16	sxHeight
        int16	sCapHeight
        uint16	usDefaultChar
        uint16	usBreakChar
        uint16	usMaxContext
    }
);

impl Default for Panose {
    fn default() -> Self {
        Panose {
            panose0: 0,
            panose1: 0,
            panose2: 0,
            panose3: 0,
            panose4: 0,
            panose5: 0,
            panose6: 0,
            panose7: 0,
            panose8: 0,
            panose9: 0,
        }
    }
}

impl os2 {
    /// Sets the four `ulUnicodeRange` fields from a list of bit positions.
    pub fn set_unicode_ranges(&mut self, bits: &[u8]) {
        self.ulUnicodeRange1 = filtered_bitset_to_num(bits.iter(), 0, 31);
        self.ulUnicodeRange2 = filtered_bitset_to_num(bits.iter(), 32, 63);
        self.ulUnicodeRange3 = filtered_bitset_to_num(bits.iter(), 64, 95);
        self.ulUnicodeRange4 = filtered_bitset_to_num(bits.iter(), 96, 127);
    }

    /// Sets the two `ulCodePageRange` fields from a list of bit positions.
    pub fn set_codepage_ranges(&mut self, bits: &[u8]) {
        self.ulCodePageRange1 = filtered_bitset_to_num(bits.iter(), 0, 31);
        self.ulCodePageRange2 = filtered_bitset_to_num(bits.iter(), 32, 63);
    }

    /// The index of the first and last character in a codepoint map, as
    /// stored in `usFirstCharIndex`/`usLastCharIndex`. Both are clamped to
    /// the BMP; an empty map gives `(0xFFFF, 0)`.
    pub fn char_index_range<'a>(codepoints: impl Iterator<Item = &'a u32>) -> (uint16, uint16) {
        codepoints.fold((0xFFFF, 0), |(first, last), &cp| {
            let cp = cp.min(0xFFFF) as u16;
            (first.min(cp), last.max(cp))
        })
    }
}

/// Reads a version 2 or later `OS/2` table, ignoring any fields beyond the
/// version 2 layout.
pub fn from_bytes(s: &[u8]) -> Result<os2, DeserializationError> {
    let mut c = ReaderContext::new(s.to_vec());
    let table: os2 = c.de()?;
    if table.version < 2 {
        return Err(DeserializationError(format!(
            "OS/2 version {} is too old",
            table.version
        )));
    }
    Ok(table)
}
