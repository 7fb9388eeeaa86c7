use crate::error::{FontBuildError, InvalidGlyphDefinitionSnafu, Result};
use crate::font::Font;
use crate::metrics::FontMetrics;
use crate::tables::cmap::{self, CmapData, CmapSubtable};
use crate::tables::glyf::{self, Glyph, Point};
use crate::tables::hmtx::{self, Metric};
use crate::tables::name::{self, NameRecord, NameRecordID};
use crate::tables::os2::{self, Panose};
use crate::tables::{compile_fixed, head, hhea, loca, maxp, post};
use otspec::codec;
use snafu::ensure;
use std::collections::BTreeMap;

pub fn compile_head(metrics: &FontMetrics) -> head::head {
    let mut head_table = head::new(
        metrics.font_revision,
        metrics.units_per_em,
        metrics.x_min,
        metrics.y_min,
        metrics.x_max,
        metrics.y_max,
    );
    head_table.created = metrics.created;
    head_table.modified = metrics.modified;
    head_table
}

pub fn compile_hmtx(glyphs: &[Glyph]) -> hmtx::hmtx {
    hmtx::hmtx {
        metrics: glyphs
            .iter()
            .map(|g| Metric {
                advanceWidth: g.advance_width,
                lsb: g.lsb,
            })
            .collect(),
    }
}

// Side bearing extremes only count glyphs with an outline
pub fn compile_hhea(
    metrics: &FontMetrics,
    glyphs: &[Glyph],
    hmtx_table: &hmtx::hmtx,
) -> Result<hhea::hhea> {
    let inked = || glyphs.iter().filter(|g| !g.is_empty());
    let min_rsb = inked()
        .map(|g| g.advance_width as i64 - g.xMax as i64)
        .min()
        .unwrap_or(0);
    Ok(hhea::hhea {
        majorVersion: 1,
        minorVersion: 0,
        ascender: metrics.ascent,
        descender: metrics.descent,
        lineGap: metrics.line_gap,
        advanceWidthMax: glyphs.iter().map(|g| g.advance_width).max().unwrap_or(0),
        minLeftSideBearing: inked().map(|g| g.lsb).min().unwrap_or(0),
        minRightSideBearing: codec::to_i16(min_rsb)?,
        xMaxExtent: codec::to_i16(metrics.x_max as i64 - metrics.x_min as i64)?,
        caretSlopeRise: 1,
        caretSlopeRun: 0,
        caretOffset: 0,
        reserved0: 0,
        reserved1: 0,
        reserved2: 0,
        reserved3: 0,
        metricDataFormat: 0,
        numberOfHMetrics: hmtx_table.number_of_hmetrics()?,
    })
}

pub fn compile_maxp(glyphs: &[Glyph]) -> Result<maxp::maxp> {
    let max_points = glyphs.iter().map(|g| g.num_points()).max().unwrap_or(0);
    let max_contours = glyphs.iter().map(|g| g.num_contours()).max().unwrap_or(0);
    let max_instructions = glyphs.iter().map(|g| g.instructions.len()).max().unwrap_or(0);
    Ok(maxp::maxp::new10(
        codec::to_u16(glyphs.len() as i64)?,
        codec::to_u16(max_points as i64)?,
        codec::to_u16(max_contours as i64)?,
        codec::to_u16(max_instructions as i64)?,
    ))
}

pub fn compile_os2(
    metrics: &FontMetrics,
    glyphs: &[Glyph],
    mapping: &BTreeMap<u32, u16>,
) -> Result<os2::os2> {
    let upm = metrics.units_per_em as f32;
    let scaled = |factor: f32| (upm * factor).round() as i16;
    let advances: Vec<i64> = glyphs
        .iter()
        .filter(|g| g.advance_width != 0)
        .map(|g| g.advance_width as i64)
        .collect();
    let x_avg_char_width = if advances.is_empty() {
        0
    } else {
        (advances.iter().sum::<i64>() as f64 / advances.len() as f64).round() as i64
    };
    let (first_char, last_char) = os2::os2::char_index_range(mapping.keys());
    let mut table = os2::os2 {
        version: 2,
        xAvgCharWidth: codec::to_i16(x_avg_char_width)?,
        usWeightClass: metrics.weight_class,
        usWidthClass: metrics.width_class,
        fsType: 0,
        ySubscriptXSize: scaled(0.65),
        ySubscriptYSize: scaled(0.6),
        ySubscriptXOffset: 0,
        ySubscriptYOffset: scaled(0.075),
        ySuperscriptXSize: scaled(0.65),
        ySuperscriptYSize: scaled(0.6),
        ySuperscriptXOffset: 0,
        ySuperscriptYOffset: scaled(0.35),
        yStrikeoutSize: scaled(0.05),
        yStrikeoutPosition: scaled(0.22),
        sFamilyClass: 0,
        panose: Panose::default(),
        ulUnicodeRange1: 0,
        ulUnicodeRange2: 0,
        ulUnicodeRange3: 0,
        ulUnicodeRange4: 0,
        achVendID: metrics.vendor_id,
        fsSelection: if metrics.subfamily_name == "Regular" {
            0x40
        } else {
            0
        },
        usFirstCharIndex: first_char,
        usLastCharIndex: last_char,
        sTypoAscender: metrics.ascent,
        sTypoDescender: metrics.descent,
        sTypoLineGap: metrics.line_gap,
        usWinAscent: codec::to_u16(metrics.ascent.max(metrics.y_max).max(0).into())?,
        usWinDescent: codec::to_u16(
            (-(metrics.descent as i64)).max(-(metrics.y_min as i64)).max(0),
        )?,
        ulCodePageRange1: 0,
        ulCodePageRange2: 0,
        sxHeight: 0,
        sCapHeight: 0,
        usDefaultChar: 0,
        usBreakChar: 0x20,
        usMaxContext: 0,
    };
    table.set_unicode_ranges(&metrics.unicode_ranges);
    table.set_codepage_ranges(&metrics.codepage_ranges);
    Ok(table)
}

/// A format 4 subtable for the BMP, then a full-repertoire subtable: format
/// 12 if anything lies beyond what format 4 can hold (U+FFFF is taken by its
/// end segment), otherwise a format 13 catch-all sending everything else to
/// `.notdef`.
pub fn compile_cmap(mapping: &BTreeMap<u32, u16>) -> cmap::cmap {
    let full_repertoire = if mapping.keys().any(|&cp| cp >= 0xFFFF) {
        CmapSubtable {
            format: 12,
            platformID: 3,
            encodingID: 10,
            languageID: 0,
            data: CmapData::Mapping(mapping.clone()),
        }
    } else {
        CmapSubtable::catch_all(0)
    };
    cmap::cmap {
        subtables: vec![
            CmapSubtable::windows_bmp(CmapData::Mapping(mapping.clone())),
            full_repertoire,
        ],
    }
}

pub fn compile_name(metrics: &FontMetrics) -> name::name {
    let records = vec![
        (NameRecordID::FontFamilyName, metrics.family_name.clone()),
        (NameRecordID::FontSubfamilyName, metrics.subfamily_name.clone()),
        (
            NameRecordID::UniqueID,
            format!("{} {:.1}", metrics.family_name, metrics.font_revision),
        ),
        (NameRecordID::FullFontName, metrics.full_name()),
        (NameRecordID::Version, metrics.version_string.clone()),
        (NameRecordID::PostscriptName, metrics.postscript_name()),
    ];
    name::name {
        records: records
            .into_iter()
            .map(|(id, string)| NameRecord::windows_unicode(id, string))
            .collect(),
    }
}

pub fn compile_post(metrics: &FontMetrics) -> post::post {
    let upm = metrics.units_per_em as f32;
    post::post::new_v3(
        0.0,
        (upm * -0.075).round() as i16,
        (upm * 0.05).round() as i16,
        false,
    )
}

/// The glyph set used when the caller supplies none: a `.notdef` box
/// filling the font's bounding box.
pub fn default_glyphs(metrics: &FontMetrics) -> Vec<Glyph> {
    vec![Glyph::from_contours(
        vec![vec![
            Point::on(metrics.x_min, metrics.y_min),
            Point::on(metrics.x_max, metrics.y_min),
            Point::on(metrics.x_max, metrics.y_max),
            Point::on(metrics.x_min, metrics.y_max),
        ]],
        metrics.advance_width,
    )]
}

/// The character map used when the caller supplies none: `A` to `.notdef`.
pub fn default_mapping() -> BTreeMap<u32, u16> {
    let mut mapping = BTreeMap::new();
    mapping.insert(0x41, 0);
    mapping
}

fn check_mapping(glyphs: &[Glyph], mapping: &BTreeMap<u32, u16>) -> Result<()> {
    ensure!(
        !glyphs.is_empty(),
        InvalidGlyphDefinitionSnafu {
            glyph: 0_usize,
            reason: "a font needs at least a .notdef glyph"
        }
    );
    if let Some((cp, &gid)) = mapping.iter().find(|&(_, &gid)| gid as usize >= glyphs.len()) {
        return Err(FontBuildError::InvalidGlyphDefinition {
            glyph: gid as usize,
            reason: format!(
                "U+{:04X} maps to it but the font has {} glyphs",
                cp,
                glyphs.len()
            ),
        });
    }
    Ok(())
}

/// Compiles every required table and registers them in a new [`Font`].
pub fn build_font(
    metrics: &FontMetrics,
    glyphs: &[Glyph],
    mapping: &BTreeMap<u32, u16>,
) -> Result<Font> {
    check_mapping(glyphs, mapping)?;
    let glyf_table = glyf::glyf {
        glyphs: glyphs.to_vec(),
    };
    let (glyf_bytes, loca_table) = glyf_table.compile()?;
    let hmtx_table = compile_hmtx(glyphs);

    let mut font = Font::new();
    font.add_table(
        head::TAG,
        compile_fixed(head::TAG, &compile_head(metrics), head::SIZE)?,
    )?;
    font.add_table(
        hhea::TAG,
        compile_fixed(
            hhea::TAG,
            &compile_hhea(metrics, glyphs, &hmtx_table)?,
            hhea::SIZE,
        )?,
    )?;
    font.add_table(
        maxp::TAG,
        compile_fixed(maxp::TAG, &compile_maxp(glyphs)?, maxp::SIZE)?,
    )?;
    font.add_table(
        os2::TAG,
        compile_fixed(os2::TAG, &compile_os2(metrics, glyphs, mapping)?, os2::SIZE)?,
    )?;
    font.add_table(hmtx::TAG, otspec::ser::to_bytes(&hmtx_table)?)?;
    font.add_table(cmap::TAG, otspec::ser::to_bytes(&compile_cmap(mapping))?)?;
    font.add_table(loca::TAG, otspec::ser::to_bytes(&loca_table)?)?;
    font.add_table(glyf::TAG, glyf_bytes)?;
    font.add_table(name::TAG, otspec::ser::to_bytes(&compile_name(metrics))?)?;
    font.add_table(
        post::TAG,
        compile_fixed(post::TAG, &compile_post(metrics), post::SIZE)?,
    )?;
    Ok(font)
}

/// Builds the one-glyph test font for a set of metrics.
pub fn build_minimal_font(metrics: &FontMetrics) -> Result<Vec<u8>> {
    build_font(metrics, &default_glyphs(metrics), &default_mapping())?.compile()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rectangle() -> Glyph {
        Glyph::from_contours(
            vec![vec![
                Point::on(0, 0),
                Point::on(500, 0),
                Point::on(500, 700),
                Point::on(0, 700),
            ]],
            500,
        )
    }

    #[test]
    fn hhea_from_glyphs() {
        let metrics = FontMetrics::default();
        let glyphs = vec![rectangle(), Glyph::empty(250)];
        let hmtx_table = compile_hmtx(&glyphs);
        let table = compile_hhea(&metrics, &glyphs, &hmtx_table).unwrap();
        assert_eq!(table.ascender, 800);
        assert_eq!(table.descender, -200);
        assert_eq!(table.advanceWidthMax, 500);
        assert_eq!(table.minLeftSideBearing, 0);
        assert_eq!(table.minRightSideBearing, 0);
        assert_eq!(table.xMaxExtent, 500);
        assert_eq!(table.numberOfHMetrics, 2);
    }

    #[test]
    fn maxp_from_glyphs() {
        let two_contours = Glyph::from_contours(
            vec![
                vec![Point::on(0, 0), Point::on(10, 0), Point::on(10, 10)],
                vec![Point::on(2, 2), Point::off(4, 2)],
            ],
            100,
        );
        let table = compile_maxp(&[rectangle(), two_contours, Glyph::empty(0)]).unwrap();
        assert_eq!(table.numGlyphs, 3);
        assert_eq!(table.maxPoints, 5);
        assert_eq!(table.maxContours, 2);
        assert_eq!(table.maxSizeOfInstructions, 0);
    }

    #[test]
    fn os2_from_metrics() {
        let metrics = FontMetrics::default();
        let table = compile_os2(&metrics, &[rectangle(), Glyph::empty(250)], &default_mapping())
            .unwrap();
        assert_eq!(table.xAvgCharWidth, 375);
        assert_eq!(table.usWeightClass, 400);
        assert_eq!(table.usWidthClass, 5);
        assert_eq!((table.usFirstCharIndex, table.usLastCharIndex), (0x41, 0x41));
        assert_eq!((table.usWinAscent, table.usWinDescent), (800, 200));
        assert_eq!(table.fsSelection, 0x40);
    }

    #[test]
    fn cmap_layout() {
        let bmp_only = compile_cmap(&default_mapping());
        assert_eq!(bmp_only.subtables[1], CmapSubtable::catch_all(0));
        let mut wide = default_mapping();
        wide.insert(0x1F600, 0);
        let with_supplementary = compile_cmap(&wide);
        assert_eq!(with_supplementary.subtables[1].format, 12);
        assert_eq!(with_supplementary.subtables[1].lookup(0x1F600), Some(0));
    }

    #[test]
    fn last_bmp_codepoint_goes_to_format12() {
        let mut mapping = default_mapping();
        mapping.insert(0xFFFF, 0);
        let bytes = otspec::ser::to_bytes(&compile_cmap(&mapping)).unwrap();
        let deserialized: cmap::cmap = otspec::de::from_bytes(&bytes).unwrap();
        assert_eq!(deserialized.get_subtable(3, 10).unwrap().format, 12);
        assert_eq!(deserialized.get_mapping(3, 10), Some(&mapping));
        assert_eq!(deserialized.get_mapping(3, 1).unwrap().get(&0xFFFF), None);
    }

    #[test]
    fn os2_char_range_from_mapping() {
        let mapping: BTreeMap<u32, u16> = vec![(0x20, 1), (0x7A, 0), (0x1F600, 1)]
            .into_iter()
            .collect();
        let table = compile_os2(
            &FontMetrics::default(),
            &[rectangle(), Glyph::empty(250)],
            &mapping,
        )
        .unwrap();
        assert_eq!(
            (table.usFirstCharIndex, table.usLastCharIndex),
            (0x20, 0xFFFF)
        );
    }

    #[test]
    fn name_records() {
        let table = compile_name(&FontMetrics::default());
        assert_eq!(table.get(NameRecordID::FontFamilyName), Some("FontFromScratch"));
        assert_eq!(table.get(NameRecordID::UniqueID), Some("FontFromScratch 1.0"));
        assert_eq!(
            table.get(NameRecordID::PostscriptName),
            Some("FontFromScratch-Regular")
        );
        assert_eq!(table.records.len(), 6);
    }

    #[test]
    fn mapping_to_missing_glyph() {
        let mut mapping = default_mapping();
        mapping.insert(0x42, 3);
        let result = build_font(&FontMetrics::default(), &[rectangle()], &mapping);
        assert!(matches!(
            result,
            Err(FontBuildError::InvalidGlyphDefinition { glyph: 3, .. })
        ));
        let result = build_font(&FontMetrics::default(), &[], &BTreeMap::new());
        assert!(matches!(
            result,
            Err(FontBuildError::InvalidGlyphDefinition { glyph: 0, .. })
        ));
    }

    #[test]
    fn all_tables_present() {
        let font = build_font(&FontMetrics::default(), &[rectangle()], &default_mapping()).unwrap();
        let tags: Vec<String> = font.tags().map(|t| t.to_string()).collect();
        assert_eq!(
            tags,
            vec!["OS/2", "cmap", "glyf", "head", "hhea", "hmtx", "loca", "maxp", "name", "post"]
        );
    }

    #[test]
    fn minimal_font_default_glyph() {
        assert_eq!(default_glyphs(&FontMetrics::default()), vec![rectangle()]);
    }
}
