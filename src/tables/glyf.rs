use crate::error::{FontBuildError, Result};
use crate::tables::loca::loca;
use otspec::types::*;
use otspec::{codec, DeserializationError, ReaderContext, Deserialize};

mod glyph;
mod point;

pub use glyph::{encode_delta, Glyph, SimpleGlyphFlags};
pub use point::Point;

/// The 'glyf' OpenType tag.
pub const TAG: Tag = tag!("glyf");

/// The glyph data table
#[allow(non_camel_case_types)]
#[derive(Debug, PartialEq, Clone, Default)]
pub struct glyf {
    /// The glyphs, in glyph ID order
    pub glyphs: Vec<Glyph>,
}

impl glyf {
    /// Recomputes the bounding box of every glyph from its points.
    pub fn recalc_bounds(&mut self) {
        for g in self.glyphs.iter_mut() {
            g.recalc_bounds();
        }
    }

    /// Compiles the glyphs into the body of a `glyf` table and the
    /// matching long-format `loca` table.
    ///
    /// Each glyph record is zero-padded to a multiple of four bytes, so
    /// every `loca` offset is 4-byte aligned. Empty glyphs take no space.
    pub fn compile(&self) -> Result<(Vec<u8>, loca)> {
        let mut glyf_data: Vec<u8> = vec![];
        let mut indices: Vec<u32> = Vec::with_capacity(self.glyphs.len() + 1);
        for (ix, g) in self.glyphs.iter().enumerate() {
            indices.push(codec::to_u32(glyf_data.len() as i64)?);
            g.validate()
                .map_err(|reason| FontBuildError::InvalidGlyphDefinition { glyph: ix, reason })?;
            let bytes = otspec::ser::to_bytes(g)?;
            glyf_data.extend(&bytes);
            let padding = (4 - bytes.len() % 4) % 4;
            glyf_data.extend(std::iter::repeat(0).take(padding));
        }
        indices.push(codec::to_u32(glyf_data.len() as i64)?);
        log::debug!(
            "Compiled {} glyphs into {} bytes of glyf",
            self.glyphs.len(),
            glyf_data.len()
        );
        Ok((glyf_data, loca { indices }))
    }
}

/// Splits a `glyf` table into glyphs using the offsets in `loca`.
///
/// Horizontal metrics live in `hmtx`, so the decoded glyphs have a zero
/// advance width and take their left side bearing from `xMin`.
pub fn from_bytes(s: &[u8], loca_offsets: &loca) -> Result<glyf, DeserializationError> {
    let mut glyphs = Vec::with_capacity(loca_offsets.num_glyphs());
    for range in loca_offsets.glyph_ranges() {
        if range.end > s.len() {
            return Err(DeserializationError(format!(
                "Glyph at {}..{} runs past the end of a glyf table of {} bytes",
                range.start,
                range.end,
                s.len()
            )));
        }
        if range.is_empty() {
            glyphs.push(Glyph::default());
            continue;
        }
        let mut c = ReaderContext::new(s[range].to_vec());
        glyphs.push(Glyph::from_bytes(&mut c)?);
    }
    Ok(glyf { glyphs })
}
