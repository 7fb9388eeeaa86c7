use crate::error::{LayoutMismatchSnafu, Result};
use otspec::types::Tag;
use otspec::Serialize;

/// The `cmap` (Character To Glyph Index Mapping) table
pub mod cmap;
/// The `glyf` (Glyf data) table
pub mod glyf;
/// The `head` (Header) table
pub mod head;
/// The `hhea` (Horizontal header) table
pub mod hhea;
/// The `hmtx` (Horizontal metrics) table
pub mod hmtx;
/// The 'loca' (Index to Location) table
pub mod loca;
/// The `maxp` (Maximum profile) table
pub mod maxp;
/// The `name` (Naming) table
pub mod name;
/// The `OS/2` (OS/2 and Windows Metrics) table
pub mod os2;
/// The `post` (PostScript) table
pub mod post;

/// Serializes a table whose layout has a fixed size, checking that the
/// output is exactly that long.
pub fn compile_fixed<T: Serialize>(tag: Tag, table: &T, size: usize) -> Result<Vec<u8>> {
    let bytes = otspec::ser::to_bytes(table)?;
    if bytes.len() != size {
        return LayoutMismatchSnafu {
            tag,
            declared: size,
            actual: bytes.len(),
        }
        .fail();
    }
    Ok(bytes)
}
