use otspec::types::*;
use otspec_macros::tables;

/// The 'hhea' OpenType tag.
pub const TAG: Tag = tag!("hhea");

/// Size of a compiled `hhea` table in bytes.
pub const SIZE: usize = 36;

tables!(hhea {
    uint16 majorVersion
    uint16 minorVersion
    FWORD ascender
    FWORD descender
    FWORD lineGap
    UFWORD  advanceWidthMax
    FWORD   minLeftSideBearing
    FWORD   minRightSideBearing
    FWORD   xMaxExtent
    int16   caretSlopeRise
    int16   caretSlopeRun
    int16   caretOffset
    int16   reserved0
    int16   reserved1
    int16   reserved2
    int16   reserved3
    int16   metricDataFormat
    uint16  numberOfHMetrics
});
