use crate::error::{DuplicateTableSnafu, LayoutMismatchSnafu, NoTablesSnafu, Result};
use crate::tables::head;
use otspec::types::*;
use otspec::{codec, get_search_range, DeserializationError, Deserializer, ReaderContext, Serializer};
use otspec_macros::tables;
use snafu::ensure;
use std::collections::BTreeMap;
use std::num::Wrapping;

/// The `sfntVersion` of a font with TrueType outlines.
pub const SFNT_VERSION_TRUETYPE: uint32 = 0x00010000;

/// The value every finished font sums to.
pub const CHECKSUM_MAGIC: uint32 = 0xB1B0AFBA;

tables!(
    TableHeader {
        uint32 sfntVersion
        uint16 numTables
        uint16 searchRange
        uint16 entrySelector
        uint16 rangeShift
    }
    TableRecord {
        Tag tag
        uint32 checksum
        uint32 offset
        uint32 length
    }
);

/// Table bodies are zero-padded to a multiple of four bytes.
fn padded_len(len: usize) -> usize {
    (len + 3) & !3
}

/// Sums a block of data as big-endian `uint32`s, wrapping on overflow. A
/// trailing partial word is padded with zeros.
pub fn checksum(data: &[u8]) -> u32 {
    data.chunks(4)
        .fold(Wrapping(0u32), |sum, chunk| {
            let mut word = [0u8; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            sum + Wrapping(u32::from_be_bytes(word))
        })
        .0
}

/// The directory checksum of a table. The `head` table is summed with its
/// checksum adjustment zeroed.
pub fn table_checksum(tag: Tag, data: &[u8]) -> u32 {
    if tag == head::TAG && data.len() >= head::CHECKSUM_ADJUSTMENT.end {
        let mut zeroed = data.to_vec();
        zeroed[head::CHECKSUM_ADJUSTMENT].fill(0);
        checksum(&zeroed)
    } else {
        checksum(data)
    }
}

/// A registry of compiled tables, ready to be assembled into a font file.
///
/// Tables are kept in tag order, which is the order the table directory
/// needs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Font {
    tables: BTreeMap<Tag, Vec<u8>>,
}

impl Font {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the compiled bytes of a table. Each tag may only be added
    /// once.
    pub fn add_table(&mut self, tag: Tag, data: Vec<u8>) -> Result<()> {
        ensure!(!self.tables.contains_key(&tag), DuplicateTableSnafu { tag });
        log::debug!("Adding {} table ({} bytes)", tag, data.len());
        self.tables.insert(tag, data);
        Ok(())
    }

    /// The bytes registered for a tag.
    pub fn get_table(&self, tag: Tag) -> Option<&[u8]> {
        self.tables.get(&tag).map(|t| t.as_slice())
    }

    /// The registered tags, in directory order.
    pub fn tags(&self) -> impl Iterator<Item = &Tag> {
        self.tables.keys()
    }

    /// Number of registered tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Is the registry empty?
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Assembles the registered tables into a font file.
    ///
    /// The directory lists tables in ascending tag order. Each body starts
    /// on a 4-byte boundary. If there is a `head` table its checksum
    /// adjustment is filled in so that the whole file sums to
    /// [`CHECKSUM_MAGIC`].
    pub fn compile(&self) -> Result<Vec<u8>> {
        ensure!(!self.tables.is_empty(), NoTablesSnafu);
        let num_tables = codec::to_u16(self.tables.len() as i64)?;
        let (search_range, entry_selector, range_shift) = get_search_range(num_tables, 16);
        let header = TableHeader {
            sfntVersion: SFNT_VERSION_TRUETYPE,
            numTables: num_tables,
            searchRange: search_range,
            entrySelector: entry_selector,
            rangeShift: range_shift,
        };

        let mut records: Vec<TableRecord> = Vec::with_capacity(self.tables.len());
        let mut head_offset: Option<usize> = None;
        let mut offset = 12 + 16 * self.tables.len();
        for (&tag, data) in &self.tables {
            if tag == head::TAG {
                ensure!(
                    data.len() >= head::CHECKSUM_ADJUSTMENT.end,
                    LayoutMismatchSnafu {
                        tag,
                        declared: head::SIZE,
                        actual: data.len()
                    }
                );
                head_offset = Some(offset);
            }
            let record = TableRecord {
                tag,
                checksum: table_checksum(tag, data),
                offset: codec::to_u32(offset as i64)?,
                length: codec::to_u32(data.len() as i64)?,
            };
            log::debug!(
                "{}: offset {}, length {}, checksum {:#010x}",
                tag,
                record.offset,
                record.length,
                record.checksum
            );
            records.push(record);
            offset += padded_len(data.len());
        }

        let mut out: Vec<u8> = Vec::with_capacity(offset);
        out.put(header)?;
        out.put(&records)?;
        for (record, data) in records.iter().zip(self.tables.values()) {
            ensure!(
                out.len() == record.offset as usize,
                LayoutMismatchSnafu {
                    tag: record.tag,
                    declared: record.offset as usize,
                    actual: out.len()
                }
            );
            out.extend(data);
            out.resize(padded_len(out.len()), 0);
        }
        ensure!(
            out.len() == offset,
            LayoutMismatchSnafu {
                tag: records[records.len() - 1].tag,
                declared: offset,
                actual: out.len()
            }
        );

        match head_offset {
            Some(head_offset) => {
                let field = head_offset + head::CHECKSUM_ADJUSTMENT.start
                    ..head_offset + head::CHECKSUM_ADJUSTMENT.end;
                out[field.clone()].fill(0);
                let adjustment = CHECKSUM_MAGIC.wrapping_sub(checksum(&out));
                out[field].copy_from_slice(&adjustment.to_be_bytes());
                log::debug!("Checksum adjustment {:#010x}", adjustment);
            }
            None => log::warn!("No head table; font checksum adjustment not written"),
        }
        Ok(out)
    }

    /// Reads a font file back into a registry of table bytes.
    pub fn from_bytes(s: &[u8]) -> Result<Font, DeserializationError> {
        let (_, records) = read_table_directory(s)?;
        let mut tables = BTreeMap::new();
        for record in records {
            let start = record.offset as usize;
            let end = start + record.length as usize;
            let data = s.get(start..end).ok_or_else(|| {
                DeserializationError(format!(
                    "Table {} ({}..{}) runs past the end of a {} byte font",
                    record.tag,
                    start,
                    end,
                    s.len()
                ))
            })?;
            if tables.insert(record.tag, data.to_vec()).is_some() {
                return Err(DeserializationError(format!(
                    "Table {} appears twice in the directory",
                    record.tag
                )));
            }
        }
        Ok(Font { tables })
    }
}

/// Reads the offset table and table records at the start of a font file.
pub fn read_table_directory(
    s: &[u8],
) -> Result<(TableHeader, Vec<TableRecord>), DeserializationError> {
    let mut c = ReaderContext::new(s.to_vec());
    let header: TableHeader = c.de()?;
    if header.sfntVersion != SFNT_VERSION_TRUETYPE {
        return Err(DeserializationError(format!(
            "Not a TrueType font (sfntVersion {:#010x})",
            header.sfntVersion
        )));
    }
    let records: Vec<TableRecord> = c.de_counted(header.numTables as usize)?;
    Ok((header, records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FontBuildError;
    use crate::tables::compile_fixed;
    use pretty_assertions::assert_eq;

    const BINARY_HHEA: [u8; 36] = [
        0x00, 0x01, 0x00, 0x00, 0x02, 0xc1, 0xff, 0x4c, 0x00, 0x00, 0x05, 0x1f, 0xfe, 0x82, 0xfe,
        0x82, 0x04, 0xdd, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x04, 0x5d,
    ];

    const BINARY_MAXP: [u8; 32] = [
        0x00, 0x01, 0x00, 0x00, 0x04, 0x5d, 0x00, 0x62, 0x00, 0x07, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00,
    ];

    fn head_bytes() -> Vec<u8> {
        compile_fixed(head::TAG, &head::new(1.0, 1000, 0, 0, 500, 700), head::SIZE).unwrap()
    }

    #[test]
    fn test_checksum() {
        assert_eq!(checksum(&BINARY_HHEA), 0x0623074B);
        assert_eq!(checksum(&BINARY_MAXP), 0x04650064);
    }

    #[test]
    fn checksum_pads_last_word() {
        assert_eq!(checksum(&[0x01, 0x02, 0x03]), 0x01020300);
        assert_eq!(checksum(&[0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0x02]), 1);
        assert_eq!(checksum(&[]), 0);
    }

    #[test]
    fn font_ser_without_head() {
        let mut font = Font::new();
        font.add_table(tag!("maxp"), BINARY_MAXP.to_vec()).unwrap();
        font.add_table(tag!("hhea"), BINARY_HHEA.to_vec()).unwrap();
        let serialized = font.compile().unwrap();
        assert_eq!(
            serialized[0..44],
            [
                0x00, 0x01, 0x00, 0x00, 0x00, 0x02, 0x00, 0x20, 0x00, 0x01, 0x00, 0x00, // header
                0x68, 0x68, 0x65, 0x61, 0x06, 0x23, 0x07, 0x4b, 0x00, 0x00, 0x00, 0x2c, 0x00,
                0x00, 0x00, 0x24, // hhea
                0x6d, 0x61, 0x78, 0x70, 0x04, 0x65, 0x00, 0x64, 0x00, 0x00, 0x00, 0x50, 0x00,
                0x00, 0x00, 0x20, // maxp
            ]
        );
        assert_eq!(serialized[44..80], BINARY_HHEA);
        assert_eq!(serialized[80..112], BINARY_MAXP);
        assert_eq!(serialized.len(), 112);
    }

    #[test]
    fn bodies_are_padded() {
        let mut font = Font::new();
        font.add_table(tag!("abcd"), vec![1, 2, 3, 4, 5]).unwrap();
        font.add_table(tag!("bcde"), vec![6]).unwrap();
        let serialized = font.compile().unwrap();
        let (header, records) = read_table_directory(&serialized).unwrap();
        assert_eq!(header.numTables, 2);
        assert_eq!(
            records.iter().map(|r| (r.offset, r.length)).collect::<Vec<_>>(),
            vec![(44, 5), (52, 1)]
        );
        assert_eq!(serialized[44..56], [1, 2, 3, 4, 5, 0, 0, 0, 6, 0, 0, 0]);
    }

    #[test]
    fn checksum_adjustment() {
        let mut font = Font::new();
        font.add_table(head::TAG, head_bytes()).unwrap();
        font.add_table(tag!("hhea"), BINARY_HHEA.to_vec()).unwrap();
        let serialized = font.compile().unwrap();
        assert_eq!(checksum(&serialized), CHECKSUM_MAGIC);

        let (_, records) = read_table_directory(&serialized).unwrap();
        let head_record = &records[0];
        assert_eq!(head_record.tag, head::TAG);
        assert_eq!(head_record.checksum, checksum(&head_bytes()));
        let start = head_record.offset as usize;
        let written = &serialized[start..start + head::SIZE];
        assert_eq!(written[0..8], head_bytes()[0..8]);
        assert_eq!(written[12..], head_bytes()[12..]);
        assert_ne!(written[8..12], [0, 0, 0, 0]);
    }

    #[test]
    fn stale_adjustment_is_ignored() {
        let mut stale = head_bytes();
        stale[8..12].copy_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
        let mut a = Font::new();
        a.add_table(head::TAG, head_bytes()).unwrap();
        let mut b = Font::new();
        b.add_table(head::TAG, stale).unwrap();
        assert_eq!(a.compile().unwrap(), b.compile().unwrap());
    }

    #[test]
    fn build_errors() {
        let mut font = Font::new();
        assert_eq!(font.compile(), Err(FontBuildError::NoTables));
        font.add_table(head::TAG, vec![0; 10]).unwrap();
        assert_eq!(
            font.add_table(head::TAG, vec![]),
            Err(FontBuildError::DuplicateTable { tag: head::TAG })
        );
        assert_eq!(
            font.compile(),
            Err(FontBuildError::LayoutMismatch {
                tag: head::TAG,
                declared: head::SIZE,
                actual: 10
            })
        );
    }

    #[test]
    fn font_de() {
        let mut font = Font::new();
        font.add_table(tag!("hhea"), BINARY_HHEA.to_vec()).unwrap();
        font.add_table(tag!("OS/2"), vec![1, 2, 3]).unwrap();
        let serialized = font.compile().unwrap();
        let back = Font::from_bytes(&serialized).unwrap();
        assert_eq!(back, font);
        assert_eq!(
            back.tags().collect::<Vec<_>>(),
            vec![&tag!("OS/2"), &tag!("hhea")]
        );
        assert_eq!(back.get_table(tag!("OS/2")), Some(&[1_u8, 2, 3][..]));
    }

    #[test]
    fn font_de_errors() {
        assert!(read_table_directory(&[0x4f, 0x54, 0x54, 0x4f, 0, 0, 0, 0, 0, 0, 0, 0]).is_err());
        let truncated = [
            0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x10, 0x00, 0x00, 0x00, 0x00, 0x68, 0x68,
            0x65, 0x61, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x1c, 0x00, 0x00, 0x00, 0x24,
        ];
        assert!(Font::from_bytes(&truncated).is_err());
    }
}
