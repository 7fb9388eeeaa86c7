use otspec::types::*;
use otspec::{
    codec, get_search_range, DeserializationError, Deserialize, Deserializer, ReaderContext,
    SerializationError, Serialize, Serializer,
};
use otspec_macros::tables;
use std::collections::BTreeMap;

/// The 'cmap' OpenType tag.
pub const TAG: Tag = tag!("cmap");

/// The highest Unicode codepoint.
pub const MAX_CODEPOINT: uint32 = 0x10FFFF;

tables!(

EncodingRecord {
        uint16 platformID
        uint16 encodingID
        uint32 subtableOffset
}

CmapHeader {
    uint16  version
    Counted(EncodingRecord) encodingRecords
}

);

/// One segment of a format 4 subtable, mapping `startCode..=endCode` to
/// glyph IDs by adding `idDelta` (modulo 65536).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(non_snake_case)]
pub struct Segment {
    /// First character code in the segment
    pub startCode: uint16,
    /// Last character code in the segment
    pub endCode: uint16,
    /// Added to the character code to get the glyph ID
    pub idDelta: int16,
}

impl Segment {
    /// A segment mapping `start..=end` onto consecutive glyphs beginning at
    /// `first_glyph`.
    pub fn new(start: uint16, end: uint16, first_glyph: uint16) -> Segment {
        Segment {
            startCode: start,
            endCode: end,
            idDelta: first_glyph.wrapping_sub(start) as i16,
        }
    }
}

#[allow(non_camel_case_types, non_snake_case)]
#[derive(Clone, Debug, PartialEq)]
/// A format 4 cmap subtable, used for mapping Unicode characters in the
/// basic mutilingual plane.
pub struct cmap4 {
    format: uint16,
    length: uint16,
    language: uint16,
    segCountX2: uint16,
    searchRange: uint16,
    entrySelector: uint16,
    rangeShift: uint16,
    endCode: Vec<uint16>,
    reservedPad: uint16,
    startCode: Vec<uint16>,
    idDelta: Vec<int16>,
    idRangeOffsets: Vec<uint16>,
    glyphIdArray: Vec<uint16>,
}

fn is_contiguous_list(l: &[u16]) -> bool {
    l.windows(2).all(|ab| ab[0].checked_add(1) == Some(ab[1]))
}

/// Splits a run of consecutive character codes into segments, pulling out
/// stretches where the glyph IDs also run consecutively so that they can
/// be expressed with an idDelta rather than through the glyph ID array.
///
/// Returns the start codes of every segment but the first, and the end
/// codes of every segment.
fn split_range(
    start_code: u16,
    end_code: u16,
    map: &BTreeMap<uint32, uint16>,
) -> (Vec<u16>, Vec<u16>) {
    if start_code == end_code {
        return (vec![], vec![end_code]);
    }
    let glyph = |code: u16| map.get(&(code as u32)).copied().unwrap_or(0);
    let mut last_id = glyph(start_code);
    let mut last_code = start_code;
    let mut ordered_begin: Option<u16> = None;
    let mut subranges: Vec<(u16, u16)> = Vec::new();
    for code in (start_code + 1)..=end_code {
        let glyph_id = glyph(code);
        if glyph_id > 0 && glyph_id - 1 == last_id {
            if ordered_begin.is_none() {
                ordered_begin = Some(last_code);
            }
        } else if let Some(begin) = ordered_begin.take() {
            subranges.push((begin, last_code));
        }
        last_id = glyph_id;
        last_code = code;
    }
    if let Some(begin) = ordered_begin {
        subranges.push((begin, last_code));
    }

    let mut new_ranges: Vec<(u32, u32)> = Vec::new();
    for (b, e) in subranges {
        if b == start_code && e == end_code {
            break;
        }
        // A new segment costs 8 bytes; only worth it for long enough runs
        let threshold = if b == start_code || e == end_code {
            4
        } else {
            8
        };
        if (e as u32 - b as u32 + 1) > threshold {
            new_ranges.push((b.into(), e.into()));
        }
    }

    let (first, last) = match (new_ranges.first(), new_ranges.last()) {
        (Some(first), Some(last)) => (first.0, last.1),
        _ => return (vec![], vec![end_code]),
    };
    if first != start_code as u32 {
        new_ranges.insert(0, (start_code.into(), first - 1))
    }
    if last != end_code as u32 {
        new_ranges.push((last + 1, end_code.into()));
    }
    let mut i = 1;
    while i < new_ranges.len() {
        if new_ranges[i - 1].1 + 1 != new_ranges[i].0 {
            new_ranges.insert(i, (new_ranges[i - 1].1 + 1, new_ranges[i].0 - 1));
            i += 1;
        }
        i += 1;
    }
    let start = new_ranges.iter().skip(1).map(|r| r.0 as u16).collect();
    let end = new_ranges.iter().map(|r| r.1 as u16).collect();
    (start, end)
}

impl cmap4 {
    /// Creates a new cmap4 subtable for a given language ID, from a mapping of
    /// Unicode codepoints to glyph IDs. Codepoints outside the BMP are left
    /// out; format 4 cannot express them.
    pub fn from_mapping(
        language_id: uint16,
        map: &BTreeMap<uint32, uint16>,
    ) -> Result<Self, SerializationError> {
        let bmp: BTreeMap<uint32, uint16> = map.range(..0xFFFF).map(|(k, v)| (*k, *v)).collect();
        if bmp.len() < map.len() {
            log::debug!(
                "Leaving {} codepoints out of format 4 cmap subtable",
                map.len() - bmp.len()
            );
        }
        let mut start_code: Vec<u16> = Vec::new();
        let mut end_code: Vec<u16> = Vec::new();
        let mut codes = bmp.keys().map(|&c| c as u16);
        if let Some(first) = codes.next() {
            let mut run_start = first;
            let mut last_code = first;
            start_code.push(first);
            for char_code in codes {
                if char_code == last_code + 1 {
                    last_code = char_code;
                    continue;
                }
                let (mut start, mut end) = split_range(run_start, last_code, &bmp);
                start_code.append(&mut start);
                end_code.append(&mut end);
                start_code.push(char_code);
                run_start = char_code;
                last_code = char_code;
            }
            let (mut start, mut end) = split_range(run_start, last_code, &bmp);
            start_code.append(&mut start);
            end_code.append(&mut end);
        }

        let segcount = end_code.len() + 1;
        let mut id_delta: Vec<i16> = Vec::with_capacity(segcount);
        let mut id_range_offsets: Vec<u16> = Vec::with_capacity(segcount);
        let mut glyph_index_array: Vec<u16> = Vec::new();
        for (i, (&start, &end)) in start_code.iter().zip(end_code.iter()).enumerate() {
            let mut indices: Vec<u16> = (start..=end)
                .map(|char_code| *bmp.get(&(char_code as u32)).unwrap_or(&0))
                .collect();
            if is_contiguous_list(&indices) {
                id_delta.push(indices[0].wrapping_sub(start) as i16);
                id_range_offsets.push(0);
            } else {
                id_delta.push(0);
                id_range_offsets.push(codec::to_u16(
                    2 * (segcount + glyph_index_array.len() - i) as i64,
                )?);
                glyph_index_array.append(&mut indices);
            }
        }
        Self::assemble(
            language_id,
            start_code,
            end_code,
            id_delta,
            id_range_offsets,
            glyph_index_array,
        )
    }

    /// Creates a new cmap4 subtable from explicit segments, written as
    /// given. Segments must be in ascending order, must not overlap and
    /// must stop short of 0xFFFF, which is reserved for the final segment.
    pub fn from_segments(
        language_id: uint16,
        segments: &[Segment],
    ) -> Result<Self, SerializationError> {
        if let Some(bad) = segments.iter().find(|s| s.startCode > s.endCode) {
            return Err(SerializationError::Other(format!(
                "cmap segment {:#06x}..{:#06x} ends before it starts",
                bad.startCode, bad.endCode
            )));
        }
        if segments.iter().any(|s| s.endCode == 0xFFFF) {
            return Err(SerializationError::Other(
                "cmap segments may not include 0xFFFF".to_string(),
            ));
        }
        if segments
            .windows(2)
            .any(|ab| ab[1].startCode <= ab[0].endCode)
        {
            return Err(SerializationError::Other(
                "cmap segments must be sorted and must not overlap".to_string(),
            ));
        }
        Self::assemble(
            language_id,
            segments.iter().map(|s| s.startCode).collect(),
            segments.iter().map(|s| s.endCode).collect(),
            segments.iter().map(|s| s.idDelta).collect(),
            vec![0; segments.len()],
            vec![],
        )
    }

    /// Appends the final 0xFFFF segment and works out the header fields.
    fn assemble(
        language_id: uint16,
        mut start_code: Vec<u16>,
        mut end_code: Vec<u16>,
        mut id_delta: Vec<i16>,
        mut id_range_offsets: Vec<u16>,
        glyph_index_array: Vec<u16>,
    ) -> Result<Self, SerializationError> {
        start_code.push(0xffff);
        end_code.push(0xffff);
        id_delta.push(1);
        id_range_offsets.push(0);
        let segcount = codec::to_u16(end_code.len() as i64)?;
        let (search_range, entry_selector, range_shift) = get_search_range(segcount, 2);
        Ok(Self {
            format: 4,
            length: codec::to_u16(
                (glyph_index_array.len() * 2 + 16 + 2 * 4 * segcount as usize) as i64,
            )?,
            language: language_id,
            segCountX2: codec::to_u16(segcount as i64 * 2)?,
            searchRange: search_range,
            entrySelector: entry_selector,
            rangeShift: range_shift,
            endCode: end_code,
            reservedPad: 0,
            startCode: start_code,
            idDelta: id_delta,
            idRangeOffsets: id_range_offsets,
            glyphIdArray: glyph_index_array,
        })
    }

    /// The language field of the subtable
    pub fn language(&self) -> uint16 {
        self.language
    }

    /// The segments of this subtable, including the final 0xFFFF segment.
    pub fn segments(&self) -> Vec<Segment> {
        self.startCode
            .iter()
            .zip(self.endCode.iter())
            .zip(self.idDelta.iter())
            .map(|((&startCode, &endCode), &idDelta)| Segment {
                startCode,
                endCode,
                idDelta,
            })
            .collect()
    }

    /// Looks up the glyph ID for a character code, returning 0 (the
    /// `.notdef` glyph) for unmapped codes.
    pub fn map(&self, code: uint16) -> uint16 {
        let segcount = self.endCode.len();
        let i = match self.endCode.iter().position(|&end| end >= code) {
            Some(i) => i,
            None => return 0,
        };
        let start = match self.startCode.get(i) {
            Some(&start) if start <= code => start,
            _ => return 0,
        };
        let delta = self.idDelta.get(i).copied().unwrap_or(0) as u16;
        let range_offset = self.idRangeOffsets.get(i).copied().unwrap_or(0);
        if range_offset == 0 {
            return code.wrapping_add(delta);
        }
        let index = (range_offset / 2) as usize + (code - start) as usize;
        match index
            .checked_sub(segcount - i)
            .and_then(|ix| self.glyphIdArray.get(ix))
        {
            Some(&0) | None => 0,
            Some(&glyph) => glyph.wrapping_add(delta),
        }
    }

    /// Expands the subtable into a mapping, leaving out the final segment.
    pub fn to_mapping(&self) -> BTreeMap<uint32, uint16> {
        let mut map = BTreeMap::new();
        for (&start, &end) in self.startCode.iter().zip(self.endCode.iter()) {
            if end == 0xffff {
                break;
            }
            for char_code in start..=end {
                map.insert(char_code as u32, self.map(char_code));
            }
        }
        map
    }
}

impl Serialize for cmap4 {
    fn to_bytes(&self, data: &mut Vec<u8>) -> Result<(), SerializationError> {
        data.put(self.format)?;
        data.put(self.length)?;
        data.put(self.language)?;
        data.put(self.segCountX2)?;
        data.put(self.searchRange)?;
        data.put(self.entrySelector)?;
        data.put(self.rangeShift)?;
        data.put(&self.endCode)?;
        data.put(self.reservedPad)?;
        data.put(&self.startCode)?;
        data.put(&self.idDelta)?;
        data.put(&self.idRangeOffsets)?;
        data.put(&self.glyphIdArray)
    }
}

impl Deserialize for cmap4 {
    fn from_bytes(c: &mut ReaderContext) -> Result<Self, DeserializationError> {
        let format: uint16 = c.de()?;
        let length: uint16 = c.de()?;
        let language: uint16 = c.de()?;
        let seg_count_x2: uint16 = c.de()?;
        let segcount: usize = seg_count_x2 as usize / 2;
        let search_range: uint16 = c.de()?;
        let entry_selector: uint16 = c.de()?;
        let range_shift: uint16 = c.de()?;
        let end_code: Vec<uint16> = c.de_counted(segcount)?;
        let reserved_pad: uint16 = c.de()?;
        let start_code: Vec<uint16> = c.de_counted(segcount)?;
        let id_delta: Vec<int16> = c.de_counted(segcount)?;
        let id_range_offsets: Vec<uint16> = c.de_counted(segcount)?;
        let len_so_far = 16 + (segcount * 2 * 4);
        let remainder = (length as usize).checked_sub(len_so_far).ok_or_else(|| {
            DeserializationError(format!(
                "cmap4 length {} too short for {} segments",
                length, segcount
            ))
        })?;
        let glyph_id_array: Vec<u16> = c.de_counted(remainder / 2)?;
        Ok(cmap4 {
            format,
            length,
            language,
            segCountX2: seg_count_x2,
            searchRange: search_range,
            entrySelector: entry_selector,
            rangeShift: range_shift,
            endCode: end_code,
            reservedPad: reserved_pad,
            startCode: start_code,
            idDelta: id_delta,
            idRangeOffsets: id_range_offsets,
            glyphIdArray: glyph_id_array,
        })
    }
}

tables!(
cmap12 {
    uint16 format
    uint16 reserved
    uint32 length
    uint32 language
    Counted32(SequentialMapGroup) groups
}

SequentialMapGroup {
    uint32  startCharCode
    uint32  endCharCode
    uint32  startGlyphID
}

cmap13 {
    uint16 format
    uint16 reserved
    uint32 length
    uint32 language
    Counted32(ConstantMapGroup) groups
}

ConstantMapGroup {
    uint32  startCharCode
    uint32  endCharCode
    uint32  glyphID
}
);

fn group_table_length(groups: usize) -> Result<uint32, SerializationError> {
    codec::to_u32((16 + 12 * groups) as i64)
}

impl cmap12 {
    /// Creates a new cmap12 subtable for a given language ID, from a mapping of
    /// Unicode codepoints to glyph IDs
    pub fn from_mapping(
        language_id: uint16,
        map: &BTreeMap<uint32, uint16>,
    ) -> Result<Self, SerializationError> {
        let mut groups: Vec<SequentialMapGroup> = vec![];
        for (&code, &gid) in map {
            match groups.last_mut() {
                Some(g)
                    if g.endCharCode + 1 == code
                        && g.startGlyphID + (code - g.startCharCode) == gid as u32 =>
                {
                    g.endCharCode = code
                }
                _ => groups.push(SequentialMapGroup {
                    startCharCode: code,
                    endCharCode: code,
                    startGlyphID: gid as u32,
                }),
            }
        }
        Ok(cmap12 {
            format: 12,
            reserved: 0,
            length: group_table_length(groups.len())?,
            language: language_id as uint32,
            groups,
        })
    }

    fn to_mapping(&self) -> Result<BTreeMap<uint32, uint16>, DeserializationError> {
        let mut map = BTreeMap::new();
        for group in &self.groups {
            for code in group.startCharCode..=group.endCharCode {
                let glyph = group.startGlyphID as u64 + (code - group.startCharCode) as u64;
                if glyph > u16::MAX as u64 {
                    return Err(DeserializationError(format!(
                        "cmap12 group maps {:#x} to glyph {}",
                        code, glyph
                    )));
                }
                map.insert(code, glyph as u16);
            }
        }
        Ok(map)
    }
}

impl cmap13 {
    /// Creates a new cmap13 subtable, grouping runs of consecutive
    /// codepoints which map to the same glyph.
    pub fn from_mapping(
        language_id: uint16,
        map: &BTreeMap<uint32, uint16>,
    ) -> Result<Self, SerializationError> {
        let mut groups: Vec<ConstantMapGroup> = vec![];
        for (&code, &gid) in map {
            match groups.last_mut() {
                Some(g) if g.endCharCode + 1 == code && g.glyphID == gid as u32 => {
                    g.endCharCode = code
                }
                _ => groups.push(ConstantMapGroup {
                    startCharCode: code,
                    endCharCode: code,
                    glyphID: gid as u32,
                }),
            }
        }
        Self::from_groups(language_id, groups)
    }

    /// Creates a new cmap13 subtable from explicit many-to-one groups.
    pub fn from_groups(
        language_id: uint16,
        groups: Vec<ConstantMapGroup>,
    ) -> Result<Self, SerializationError> {
        if groups.windows(2).any(|ab| ab[1].startCharCode <= ab[0].endCharCode)
            || groups.iter().any(|g| g.startCharCode > g.endCharCode)
        {
            return Err(SerializationError::Other(
                "cmap13 groups must be sorted and must not overlap".to_string(),
            ));
        }
        Ok(cmap13 {
            format: 13,
            reserved: 0,
            length: group_table_length(groups.len())?,
            language: language_id as uint32,
            groups,
        })
    }
}

/// The mapping carried by a [`CmapSubtable`].
#[derive(Clone, Debug, PartialEq)]
pub enum CmapData {
    /// A mapping between Unicode codepoints and glyph IDs.
    Mapping(BTreeMap<uint32, uint16>),
    /// Format 4 segments, written exactly as given.
    Segments(Vec<Segment>),
    /// Many-to-one codepoint ranges, for format 13.
    Ranges(Vec<ConstantMapGroup>),
}

#[derive(Clone, Debug, PartialEq)]
#[allow(non_snake_case)]
/// A cmap subtable.
///
/// A cmap table can contain multiple mappings of characters
/// to glyphs, both because of differences in mapping based on platform,
/// encoding and language, but also because the mapping may best be expressed
/// by splitting it up into subtables in different formats. This struct
/// represents a mapping in a given format at a relatively high, format-independent
/// level. This subtable is converted to a format-specific subtable on serialize.
pub struct CmapSubtable {
    /// The format to be used to serialize this table: 4 for the BMP, 12
    /// for the full Unicode range, 13 for many-to-one ranges.
    pub format: uint16,
    /// The platform ID: Unicode = 0, Macintosh = 1, Windows = 3.
    pub platformID: uint16,
    /// The encoding ID; interpretation varies dependent on platform.
    pub encodingID: uint16,
    /// The language ID; interpretation varies dependent on platform and encoding.
    pub languageID: uint16,
    /// What the subtable maps.
    pub data: CmapData,
}

impl CmapSubtable {
    /// A format 4 subtable for Windows Unicode BMP (3,1).
    pub fn windows_bmp(data: CmapData) -> CmapSubtable {
        CmapSubtable {
            format: 4,
            platformID: 3,
            encodingID: 1,
            languageID: 0,
            data,
        }
    }

    /// A format 13 subtable for Windows Unicode full repertoire (3,10)
    /// mapping every codepoint to one glyph.
    pub fn catch_all(glyph: uint16) -> CmapSubtable {
        CmapSubtable {
            format: 13,
            platformID: 3,
            encodingID: 10,
            languageID: 0,
            data: CmapData::Ranges(vec![ConstantMapGroup {
                startCharCode: 0,
                endCharCode: MAX_CODEPOINT,
                glyphID: glyph as u32,
            }]),
        }
    }

    /// Looks up the glyph ID for a codepoint, if this subtable maps it.
    pub fn lookup(&self, codepoint: uint32) -> Option<uint16> {
        match &self.data {
            CmapData::Mapping(map) => map.get(&codepoint).copied(),
            CmapData::Segments(segments) => segments
                .iter()
                .find(|s| s.startCode as u32 <= codepoint && codepoint <= s.endCode as u32)
                .map(|s| (codepoint as u16).wrapping_add(s.idDelta as u16)),
            CmapData::Ranges(groups) => groups
                .iter()
                .find(|g| g.startCharCode <= codepoint && codepoint <= g.endCharCode)
                .map(|g| g.glyphID as u16),
        }
    }
}

impl Serialize for CmapSubtable {
    fn to_bytes(&self, data: &mut Vec<u8>) -> Result<(), SerializationError> {
        match (self.format, &self.data) {
            (4, CmapData::Mapping(map)) => {
                cmap4::from_mapping(self.languageID, map)?.to_bytes(data)
            }
            (4, CmapData::Segments(segments)) => {
                cmap4::from_segments(self.languageID, segments)?.to_bytes(data)
            }
            (12, CmapData::Mapping(map)) => {
                cmap12::from_mapping(self.languageID, map)?.to_bytes(data)
            }
            (13, CmapData::Mapping(map)) => {
                cmap13::from_mapping(self.languageID, map)?.to_bytes(data)
            }
            (13, CmapData::Ranges(groups)) => {
                cmap13::from_groups(self.languageID, groups.clone())?.to_bytes(data)
            }
            (format, _) => Err(SerializationError::Other(format!(
                "Can't write this mapping as a format {} cmap subtable",
                format
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
#[allow(non_camel_case_types)]
/// cmap table. The cmap table is a collection of subtables, as described above.
pub struct cmap {
    /// The list of subtables, written in this order
    pub subtables: Vec<CmapSubtable>,
}

impl Serialize for cmap {
    fn to_bytes(&self, data: &mut Vec<u8>) -> Result<(), SerializationError> {
        let mut offsets: BTreeMap<Vec<u8>, uint32> = BTreeMap::new();
        let mut output: Vec<u8> = Vec::new();
        let mut encoding_records: Vec<EncodingRecord> = Vec::new();
        let offset_base = 4 + self.subtables.len() as i64 * 8;
        for st in &self.subtables {
            let compiled = otspec::ser::to_bytes(st)?;
            let offset = match offsets.get(&compiled) {
                Some(&offset) => offset,
                None => {
                    let offset = codec::to_u32(offset_base + output.len() as i64)?;
                    output.extend(&compiled);
                    offsets.insert(compiled, offset);
                    offset
                }
            };
            encoding_records.push(EncodingRecord {
                platformID: st.platformID,
                encodingID: st.encodingID,
                subtableOffset: offset,
            });
        }
        let header = CmapHeader {
            version: 0,
            encodingRecords: encoding_records,
        };
        header.to_bytes(data)?;
        output.to_bytes(data)
    }
}

impl Deserialize for cmap {
    #[allow(non_snake_case)]
    fn from_bytes(c: &mut ReaderContext) -> Result<Self, DeserializationError> {
        c.push();
        let core: CmapHeader = c.de()?;
        let mut subtables = Vec::with_capacity(core.encodingRecords.len());
        for er in &core.encodingRecords {
            c.ptr = c.top_of_table() + er.subtableOffset as usize;
            let format = {
                let bytes = c.peek(2)?;
                u16::from_be_bytes([bytes[0], bytes[1]])
            };
            let (languageID, data) = match format {
                4 => {
                    let subtable: cmap4 = c.de()?;
                    (subtable.language, CmapData::Mapping(subtable.to_mapping()))
                }
                12 => {
                    let subtable: cmap12 = c.de()?;
                    (
                        subtable.language as u16,
                        CmapData::Mapping(subtable.to_mapping()?),
                    )
                }
                13 => {
                    let subtable: cmap13 = c.de()?;
                    (subtable.language as u16, CmapData::Ranges(subtable.groups))
                }
                _ => {
                    return Err(DeserializationError(format!(
                        "Unsupported cmap format {}",
                        format
                    )))
                }
            };
            subtables.push(CmapSubtable {
                format,
                platformID: er.platformID,
                encodingID: er.encodingID,
                languageID,
                data,
            });
        }
        c.pop();
        Ok(cmap { subtables })
    }
}

impl cmap {
    /// Finds the subtable targetted at the the given platform and encoding.
    pub fn get_subtable(&self, platform_id: u16, encoding_id: u16) -> Option<&CmapSubtable> {
        self.subtables
            .iter()
            .find(|st| st.platformID == platform_id && st.encodingID == encoding_id)
    }

    /// Tries to find a mapping targetted at the the given platform and
    /// encoding. Returns a `Some<map>` if one is found, or `None` otherwise.
    pub fn get_mapping(
        &self,
        platform_id: u16,
        encoding_id: u16,
    ) -> Option<&BTreeMap<uint32, uint16>> {
        match self.get_subtable(platform_id, encoding_id).map(|st| &st.data) {
            Some(CmapData::Mapping(map)) => Some(map),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::iter::FromIterator;

    macro_rules! btreemap {
		    ($($k:expr => $v:expr),* $(,)?) => {
		        std::collections::BTreeMap::<_, _>::from_iter(vec![$(($k, $v),)*])
		    };
		}

    fn two_subtables() -> cmap {
        cmap {
            subtables: vec![
                CmapSubtable {
                    format: 4,
                    platformID: 0,
                    encodingID: 3,
                    languageID: 0,
                    data: CmapData::Mapping(btreemap!( 32 => 1, 160 => 1, 65 => 2 )),
                },
                CmapSubtable {
                    format: 4,
                    platformID: 3,
                    encodingID: 1,
                    languageID: 0,
                    data: CmapData::Mapping(btreemap!( 32 => 1, 160 => 1, 65 => 2 )),
                },
            ],
        }
    }

    const BINARY_TWO_SUBTABLES: [u8; 68] = [
        0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00, 0x14, 0x00, 0x03, 0x00,
        0x01, 0x00, 0x00, 0x00, 0x14, 0x00, 0x04, 0x00, 0x30, 0x00, 0x00, 0x00, 0x08, 0x00, 0x08,
        0x00, 0x02, 0x00, 0x00, 0x00, 0x20, 0x00, 0x41, 0x00, 0xa0, 0xff, 0xff, 0x00, 0x00, 0x00,
        0x20, 0x00, 0x41, 0x00, 0xa0, 0xff, 0xff, 0xff, 0xe1, 0xff, 0xc1, 0xff, 0x61, 0x00, 0x01,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    ];

    #[test]
    fn cmap_de() {
        let deserialized: cmap = otspec::de::from_bytes(&BINARY_TWO_SUBTABLES).unwrap();
        assert_eq!(deserialized, two_subtables());
    }

    #[test]
    fn cmap_ser_shares_identical_subtables() {
        let serialized = otspec::ser::to_bytes(&two_subtables()).unwrap();
        assert_eq!(serialized, BINARY_TWO_SUBTABLES.to_vec());
    }

    #[test]
    fn cmap_serde_notosansarmenian() {
        let binary_cmap = vec![
            0x00, 0x00, 0x00, 0x01, 0x00, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00, 0x0c, 0x00, 0x04,
            0x00, 0x70, 0x00, 0x00, 0x00, 0x18, 0x00, 0x10, 0x00, 0x03, 0x00, 0x08, 0x00, 0x00,
            0x00, 0x0d, 0x00, 0x20, 0x00, 0xa0, 0x05, 0x56, 0x05, 0x5f, 0x05, 0x87, 0x05, 0x8a,
            0x05, 0x8f, 0xfb, 0x17, 0xfe, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0d,
            0x00, 0x20, 0x00, 0xa0, 0x05, 0x31, 0x05, 0x59, 0x05, 0x61, 0x05, 0x89, 0x05, 0x8f,
            0xfb, 0x13, 0xfe, 0xff, 0xff, 0xff, 0x00, 0x01, 0xff, 0xf5, 0xff, 0xe3, 0xff, 0x63,
            0xfa, 0xd3, 0xfa, 0xd1, 0xfa, 0xd0, 0xfa, 0xcf, 0xfa, 0xd0, 0x05, 0x47, 0x01, 0x02,
            0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ];
        let bt = btreemap!(0 => 1, 13 => 2, 32 => 3, 160 => 3, 1329 => 4, 1330 => 5, 1331 => 6, 1332 => 7, 1333 => 8, 1334 => 9, 1335 => 10, 1336 => 11, 1337 => 12, 1338 => 13, 1339 => 14, 1340 => 15, 1341 => 16, 1342 => 17, 1343 => 18, 1344 => 19, 1345 => 20, 1346 => 21, 1347 => 22, 1348 => 23, 1349 => 24, 1350 => 25, 1351 => 26, 1352 => 27, 1353 => 28, 1354 => 29, 1355 => 30, 1356 => 31, 1357 => 32, 1358 => 33, 1359 => 34, 1360 => 35, 1361 => 36, 1362 => 37, 1363 => 38, 1364 => 39, 1365 => 40, 1366 => 41, 1369 => 42, 1370 => 43, 1371 => 44, 1372 => 45, 1373 => 46, 1374 => 47, 1375 => 48, 1377 => 49, 1378 => 50, 1379 => 51, 1380 => 52, 1381 => 53, 1382 => 54, 1383 => 55, 1384 => 56, 1385 => 57, 1386 => 58, 1387 => 59, 1388 => 60, 1389 => 61, 1390 => 62, 1391 => 63, 1392 => 64, 1393 => 65, 1394 => 66, 1395 => 67, 1396 => 68, 1397 => 69, 1398 => 70, 1399 => 71, 1400 => 72, 1401 => 73, 1402 => 74, 1403 => 75, 1404 => 76, 1405 => 77, 1406 => 78, 1407 => 79, 1408 => 80, 1409 => 81, 1410 => 82, 1411 => 83, 1412 => 84, 1413 => 85, 1414 => 86, 1415 => 87, 1417 => 88, 1418 => 89, 1423 => 95, 64275 => 90, 64276 => 91, 64277 => 92, 64278 => 93, 64279 => 94, 65279 => 1);
        let fcmap = cmap {
            subtables: vec![CmapSubtable::windows_bmp(CmapData::Mapping(bt))],
        };
        let deserialized: cmap = otspec::de::from_bytes(&binary_cmap).unwrap();
        let serialized = otspec::ser::to_bytes(&deserialized).unwrap();
        assert_eq!(deserialized, fcmap);
        assert_eq!(serialized, binary_cmap);
    }

    #[test]
    fn cmap_deser_notosans() {
        let binary_cmap = vec![
            0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00, 0x0c, 0x00, 0x04,
            0x00, 0x3c, 0x00, 0x00, 0x00, 0x08, 0x00, 0x08, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x0d, 0x00, 0x25, 0xff, 0xff, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0d, 0x00, 0x20,
            0xff, 0xff, 0x00, 0xeb, 0x00, 0x28, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x04, 0x00, 0x00, 0x07, 0x08, 0x04, 0x20, 0x06, 0x8b, 0x05, 0x7e, 0x03, 0x4f,
            0x06, 0x4c,
        ];
        let deserialized: cmap = otspec::de::from_bytes(&binary_cmap).unwrap();
        assert_eq!(
            deserialized.get_mapping(0, 3).map(|m| m.len()),
            Some(8)
        );
        let serialized = otspec::ser::to_bytes(&deserialized).unwrap();
        assert_eq!(serialized, binary_cmap);
    }

    #[test]
    fn explicit_segment_format4() {
        let subtable = cmap4::from_segments(0, &[Segment::new(0x41, 0x41, 0)]).unwrap();
        let expected = vec![
            0x00, 0x04, 0x00, 0x20, 0x00, 0x00, // format, length, language
            0x00, 0x04, 0x00, 0x04, 0x00, 0x01, 0x00, 0x00, // segCountX2, search params
            0x00, 0x41, 0xff, 0xff, // endCode
            0x00, 0x00, // reservedPad
            0x00, 0x41, 0xff, 0xff, // startCode
            0xff, 0xbf, 0x00, 0x01, // idDelta
            0x00, 0x00, 0x00, 0x00, // idRangeOffset
        ];
        assert_eq!(otspec::ser::to_bytes(&subtable).unwrap(), expected);
        assert_eq!(subtable.map(0x41), 0);
        assert_eq!(subtable.map(0xFFFF), 0);
    }

    #[test]
    fn bad_segments() {
        assert!(cmap4::from_segments(0, &[Segment::new(0x42, 0x41, 1)]).is_err());
        assert!(cmap4::from_segments(0, &[Segment::new(0xFFF0, 0xFFFF, 1)]).is_err());
        assert!(cmap4::from_segments(
            0,
            &[Segment::new(0x41, 0x50, 1), Segment::new(0x50, 0x60, 20)]
        )
        .is_err());
    }

    #[test]
    fn catch_all_format13() {
        let expected = vec![
            0x00, 0x0d, 0x00, 0x00, // format, reserved
            0x00, 0x00, 0x00, 0x1c, // length
            0x00, 0x00, 0x00, 0x00, // language
            0x00, 0x00, 0x00, 0x01, // numGroups
            0x00, 0x00, 0x00, 0x00, 0x00, 0x10, 0xff, 0xff, 0x00, 0x00, 0x00, 0x00,
        ];
        let subtable = CmapSubtable::catch_all(0);
        assert_eq!(otspec::ser::to_bytes(&subtable).unwrap(), expected);
        assert_eq!(subtable.lookup(0x10FFFF), Some(0));
        assert_eq!(subtable.lookup(0x110000), None);
    }

    #[test]
    fn records_in_insertion_order() {
        let fcmap = cmap {
            subtables: vec![
                CmapSubtable::catch_all(0),
                CmapSubtable::windows_bmp(CmapData::Segments(vec![Segment::new(0x41, 0x41, 0)])),
            ],
        };
        let bytes = otspec::ser::to_bytes(&fcmap).unwrap();
        assert_eq!(bytes.len(), 4 + 16 + 28 + 32);
        assert_eq!(
            bytes[0..20],
            [
                0x00, 0x00, 0x00, 0x02, // version, numTables
                0x00, 0x03, 0x00, 0x0a, 0x00, 0x00, 0x00, 0x14, // (3,10) at 20
                0x00, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00, 0x30, // (3,1) at 48
            ]
        );
        let back: cmap = otspec::de::from_bytes(&bytes).unwrap();
        assert_eq!(back.subtables[0], CmapSubtable::catch_all(0));
        assert_eq!(back.get_mapping(3, 1), Some(&btreemap!(0x41 => 0)));
    }

    #[test]
    fn lookup_through_format4() {
        let map = btreemap!(0x41 => 1);
        let bytes = otspec::ser::to_bytes(&cmap4::from_mapping(0, &map).unwrap()).unwrap();
        let decoded: cmap4 = otspec::de::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.map(0x41), 1);
        assert_eq!(decoded.map(0x42), 0);
        assert_eq!(decoded.map(0x40), 0);
    }

    #[test]
    fn lookup_through_glyph_id_array() {
        let map = btreemap!(0x20 => 1, 0x21 => 5, 0x22 => 3);
        let subtable = cmap4::from_mapping(0, &map).unwrap();
        assert_eq!(subtable.segments().len(), 2);
        assert_eq!(subtable.map(0x20), 1);
        assert_eq!(subtable.map(0x21), 5);
        assert_eq!(subtable.map(0x22), 3);
        assert_eq!(subtable.map(0x23), 0);
        assert_eq!(subtable.to_mapping(), map);
    }

    #[test]
    fn empty_mapping_is_just_the_last_segment() {
        let subtable = cmap4::from_mapping(0, &BTreeMap::new()).unwrap();
        assert_eq!(
            subtable.segments(),
            vec![Segment {
                startCode: 0xffff,
                endCode: 0xffff,
                idDelta: 1
            }]
        );
        assert_eq!(otspec::ser::to_bytes(&subtable).unwrap().len(), 24);
    }

    #[test]
    fn format4_drops_supplementary_planes() {
        let subtable = cmap4::from_mapping(0, &btreemap!(0x41 => 1, 0x1F600 => 2)).unwrap();
        assert_eq!(subtable.to_mapping(), btreemap!(0x41 => 1));
    }

    #[test]
    fn format12_groups() {
        let map = btreemap!(0x41 => 1, 0x42 => 2, 0x43 => 3, 0x45 => 4, 0x1F600 => 5);
        let subtable = cmap12::from_mapping(0, &map).unwrap();
        assert_eq!(
            subtable
                .groups
                .iter()
                .map(|g| (g.startCharCode, g.endCharCode, g.startGlyphID))
                .collect::<Vec<_>>(),
            vec![(0x41, 0x43, 1), (0x45, 0x45, 4), (0x1F600, 0x1F600, 5)]
        );
        assert_eq!(subtable.length, 16 + 36);
        let bytes = otspec::ser::to_bytes(&subtable).unwrap();
        let back: cmap12 = otspec::de::from_bytes(&bytes).unwrap();
        assert_eq!(back.to_mapping().unwrap(), map);
    }

    #[test]
    fn format13_groups() {
        let map = btreemap!(0x41 => 1, 0x42 => 1, 0x43 => 2);
        let subtable = cmap13::from_mapping(0, &map).unwrap();
        assert_eq!(subtable.groups.len(), 2);
        assert_eq!(subtable.groups[0].endCharCode, 0x42);
    }

    #[test]
    fn mismatched_format_and_data() {
        let subtable = CmapSubtable {
            format: 12,
            platformID: 3,
            encodingID: 10,
            languageID: 0,
            data: CmapData::Segments(vec![]),
        };
        assert!(otspec::ser::to_bytes(&subtable).is_err());
    }

    #[test]
    fn unknown_format_is_an_error() {
        let binary_cmap = vec![
            0x00, 0x00, 0x00, 0x01, 0x00, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00, 0x0c, 0x00, 0x06,
        ];
        let deserialized: Result<cmap, _> = otspec::de::from_bytes(&binary_cmap);
        assert!(deserialized.is_err());
    }
}
