use crate::tables::glyf::Glyph;
use otspec::types::*;

/// Font-wide metrics and identification, supplied once per build.
///
/// `FontMetrics::default()` describes the classic one-glyph test font: a
/// 1000 unit em, 800 ascent, -200 descent and a 500x700 box.
#[derive(Debug, Clone, PartialEq)]
pub struct FontMetrics {
    pub units_per_em: uint16,
    pub ascent: int16,
    pub descent: int16,
    pub line_gap: int16,
    pub x_min: int16,
    pub y_min: int16,
    pub x_max: int16,
    pub y_max: int16,
    /// Advance width used by the default glyph set
    pub advance_width: uint16,
    pub font_revision: f32,
    pub created: NaiveDateTime,
    pub modified: NaiveDateTime,
    pub weight_class: uint16,
    pub width_class: uint16,
    pub vendor_id: Tag,
    /// Bit positions to set in the OS/2 ulUnicodeRange fields (0..=127)
    pub unicode_ranges: Vec<u8>,
    /// Bit positions to set in the OS/2 ulCodePageRange fields (0..=63)
    pub codepage_ranges: Vec<u8>,
    pub family_name: String,
    pub subfamily_name: String,
    pub version_string: String,
}

impl Default for FontMetrics {
    fn default() -> Self {
        FontMetrics {
            units_per_em: 1000,
            ascent: 800,
            descent: -200,
            line_gap: 0,
            x_min: 0,
            y_min: 0,
            x_max: 500,
            y_max: 700,
            advance_width: 500,
            font_revision: 1.0,
            created: longdatetime_epoch(),
            modified: longdatetime_epoch(),
            weight_class: 400,
            width_class: 5,
            vendor_id: tag!("NONE"),
            unicode_ranges: vec![],
            codepage_ranges: vec![],
            family_name: "FontFromScratch".to_string(),
            subfamily_name: "Regular".to_string(),
            version_string: "Version 1.000".to_string(),
        }
    }
}

impl FontMetrics {
    /// The global bounding box as a kurbo rectangle.
    pub fn bounds_rect(&self) -> kurbo::Rect {
        kurbo::Rect::new(
            self.x_min.into(),
            self.y_min.into(),
            self.x_max.into(),
            self.y_max.into(),
        )
    }

    /// Replaces the global bounding box with the union of the bounds of all
    /// non-empty glyphs. Leaves it alone if every glyph is empty.
    pub fn set_bounds_from_glyphs(&mut self, glyphs: &[Glyph]) {
        let union = glyphs
            .iter()
            .filter(|g| !g.is_empty())
            .map(|g| g.bounds_rect())
            .fold(None, |acc: Option<kurbo::Rect>, r| {
                Some(acc.map_or(r, |a| a.union(r)))
            });
        if let Some(r) = union {
            self.x_min = r.min_x() as i16;
            self.y_min = r.min_y() as i16;
            self.x_max = r.max_x() as i16;
            self.y_max = r.max_y() as i16;
        }
    }

    /// Full font name, as stored in name ID 4.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.family_name, self.subfamily_name)
    }

    /// PostScript name, as stored in name ID 6: no spaces allowed.
    pub fn postscript_name(&self) -> String {
        format!("{}-{}", self.family_name, self.subfamily_name)
            .chars()
            .filter(|c| c.is_ascii_graphic() && !"[](){}<>/%".contains(*c))
            .collect()
    }
}
