use encoding::all::{
    BIG5_2003, GBK, MAC_CYRILLIC, MAC_ROMAN, UTF_16BE, WINDOWS_1252, WINDOWS_31J, WINDOWS_949,
};
use encoding::{DecoderTrap, EncoderTrap, EncodingRef};
use otspec::types::*;
use otspec::{
    codec, DeserializationError, Deserialize, Deserializer, ReaderContext, SerializationError,
    Serialize, Serializer,
};
use otspec_macros::tables;

/// The 'name' OpenType tag.
pub const TAG: Tag = tag!("name");

fn get_encoding(platform_id: u16, encoding_id: u16) -> Option<EncodingRef> {
    match (platform_id, encoding_id) {
        (0, _) => Some(UTF_16BE),
        (1, 7) => Some(MAC_CYRILLIC),
        (1, _) => Some(MAC_ROMAN),
        (2, 0) | (2, 2) => Some(WINDOWS_1252),
        (2, 1) => Some(UTF_16BE),
        (3, 2) => Some(WINDOWS_31J),
        (3, 3) => Some(GBK),
        (3, 4) => Some(BIG5_2003),
        (3, 5) => Some(WINDOWS_949),
        (3, 6) => None,
        (3, _) => Some(UTF_16BE),
        _ => None,
    }
}

/// Descriptive names of the name table nameID entries
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum NameRecordID {
    /// Copyright notice
    Copyright,
    /// Font Family name
    FontFamilyName,
    /// Font Subfamily name
    FontSubfamilyName,
    /// Unique font identifier
    UniqueID,
    /// Full font name that reflects all family and relevant subfamily descriptors
    FullFontName,
    /// Version string
    Version,
    /// PostScript name for the font
    PostscriptName,
}

impl From<NameRecordID> for u16 {
    fn from(namerecord: NameRecordID) -> u16 {
        namerecord as u16
    }
}

tables!(
    NameRecordInternal {
        uint16 platformID
        uint16 encodingID
        uint16 languageID
        uint16 nameID
        uint16 length
        uint16 stringOffset
    }
);

/// A single name record to be placed inside the name table
#[derive(Debug, PartialEq, Clone)]
#[allow(non_snake_case)]
pub struct NameRecord {
    /// Platform ID (0=Unicode, 1=Macintosh, 3=Windows)
    pub platformID: uint16,
    /// Identifier for encoding of string content. Platform-specific.
    pub encodingID: uint16,
    /// Identifier for language of string content. Platform-specific.
    pub languageID: uint16,
    /// The numeric identifier representing the type of data. See NameRecordID.
    pub nameID: uint16,
    /// The actual content
    pub string: String,
}

impl NameRecord {
    /// Create a new name record for the Windows platform in Unicode BMP
    /// encoding, US English (3,1,0x409)
    pub fn windows_unicode<T, U>(n: T, s: U) -> NameRecord
    where
        T: Into<u16>,
        U: Into<String>,
    {
        NameRecord {
            platformID: 3,
            encodingID: 1,
            languageID: 0x409,
            nameID: n.into(),
            string: s.into(),
        }
    }

    fn sort_key(&self) -> (u16, u16, u16, u16) {
        (self.platformID, self.encodingID, self.languageID, self.nameID)
    }
}

/// Represents a font's name (Naming) table
#[derive(Debug, PartialEq, Clone, Default)]
#[allow(non_camel_case_types)]
pub struct name {
    /// The name records. Written sorted by platform, encoding, language
    /// and name ID, whatever order they are stored in here.
    pub records: Vec<NameRecord>,
}

impl name {
    /// Finds the string for a name ID, preferring the Windows platform.
    pub fn get<T: Into<u16>>(&self, n: T) -> Option<&str> {
        let n = n.into();
        let mut candidates: Vec<&NameRecord> =
            self.records.iter().filter(|r| r.nameID == n).collect();
        candidates.sort_by_key(|r| (r.platformID != 3, r.sort_key()));
        candidates.first().map(|r| r.string.as_str())
    }
}

impl Serialize for name {
    fn to_bytes(&self, data: &mut Vec<u8>) -> Result<(), SerializationError> {
        let mut records: Vec<&NameRecord> = self.records.iter().collect();
        records.sort_by_key(|r| r.sort_key());

        let mut string_pool: Vec<u8> = Vec::new();
        let count = codec::to_u16(records.len() as i64)?;
        let offset = codec::to_u16(6 + 12 * records.len() as i64)?;
        data.put(0_u16)?;
        data.put(count)?;
        data.put(offset)?;
        for record in records {
            let encoder = get_encoding(record.platformID, record.encodingID).ok_or_else(|| {
                SerializationError::Other(format!(
                    "No encoding for platform {} encoding {}",
                    record.platformID, record.encodingID
                ))
            })?;
            let encoded = encoder
                .encode(&record.string, EncoderTrap::Strict)
                .map_err(|e| SerializationError::Other(e.into_owned()))?;
            data.put(NameRecordInternal {
                platformID: record.platformID,
                encodingID: record.encodingID,
                languageID: record.languageID,
                nameID: record.nameID,
                length: codec::to_u16(encoded.len() as i64)?,
                stringOffset: codec::to_u16(string_pool.len() as i64)?,
            })?;
            string_pool.extend(encoded);
        }
        data.put(string_pool)
    }
}

impl Deserialize for name {
    fn from_bytes(c: &mut ReaderContext) -> Result<Self, DeserializationError> {
        c.push();
        let format: uint16 = c.de()?;
        if format > 1 {
            return Err(DeserializationError(format!(
                "Unknown name table format {}",
                format
            )));
        }
        let count: uint16 = c.de()?;
        let string_offset: uint16 = c.de()?;
        let internal_records: Vec<NameRecordInternal> = c.de_counted(count as usize)?;
        let storage = c.top_of_table() + string_offset as usize;
        let mut records: Vec<NameRecord> = Vec::with_capacity(count as usize);
        for ir in internal_records {
            let start = storage + ir.stringOffset as usize;
            let end = start + ir.length as usize;
            let raw = c.input.get(start..end).ok_or_else(|| {
                DeserializationError(format!(
                    "Name record {} runs past the end of the table",
                    ir.nameID
                ))
            })?;
            let encoding = get_encoding(ir.platformID, ir.encodingID).ok_or_else(|| {
                DeserializationError(format!(
                    "No encoding for platform {} encoding {}",
                    ir.platformID, ir.encodingID
                ))
            })?;
            let string = encoding
                .decode(raw, DecoderTrap::Replace)
                .map_err(|e| DeserializationError(e.into_owned()))?;
            records.push(NameRecord {
                platformID: ir.platformID,
                encodingID: ir.encodingID,
                languageID: ir.languageID,
                nameID: ir.nameID,
                string,
            });
        }
        c.pop();
        Ok(name { records })
    }
}
