use super::Point;
use bitflags::bitflags;
use itertools::izip;
use otspec::codec;
use otspec::types::*;
use otspec::{
    DeserializationError, Deserialize, Deserializer, ReaderContext, SerializationError,
    Serialize, Serializer,
};
use otspec_macros::tables;

tables!(
    GlyphCore {
        int16	numberOfContours
        int16	xMin
        int16	yMin
        int16	xMax
        int16	yMax
    }
);

bitflags! {
    /// Flags used in simple glyph point descriptions
    pub struct SimpleGlyphFlags: u8 {
        const ON_CURVE_POINT = 0x01;
        const X_SHORT_VECTOR = 0x02;
        const Y_SHORT_VECTOR = 0x04;
        const REPEAT_FLAG = 0x08;
        const X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR = 0x10;
        const Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR = 0x20;
        const OVERLAP_SIMPLE = 0x40;
        const RESERVED = 0x80;
    }
}

/// A simple (non-composite) TrueType glyph, together with its horizontal
/// metrics.
///
/// The bounding box is stored explicitly and written as-is; use
/// [`Glyph::from_contours`] or [`Glyph::recalc_bounds`] to derive it from
/// the points.
#[derive(Debug, PartialEq, Clone, Default)]
#[allow(non_snake_case)]
pub struct Glyph {
    /// Minimum x-coordinate
    pub xMin: int16,
    /// Minimum y-coordinate
    pub yMin: int16,
    /// Maximum x-coordinate
    pub xMax: int16,
    /// Maximum y-coordinate
    pub yMax: int16,
    /// A list of contours, each a list of points
    pub contours: Vec<Vec<Point>>,
    /// TrueType instructions. Written verbatim, never interpreted.
    pub instructions: Vec<u8>,
    /// Advance width, stored in `hmtx`
    pub advance_width: uint16,
    /// Left side bearing, stored in `hmtx`
    pub lsb: int16,
}

impl Deserialize for Glyph {
    fn from_bytes(c: &mut ReaderContext) -> Result<Self, DeserializationError> {
        let core: GlyphCore = c.de()?;
        if core.numberOfContours < 0 {
            return Err(DeserializationError(
                "Composite glyphs are not supported".to_string(),
            ));
        }
        let mut end_pts_of_contour: Vec<usize> =
            Vec::with_capacity(core.numberOfContours as usize);
        for _ in 0..core.numberOfContours {
            let end: uint16 = c.de()?;
            let end = end as usize + 1;
            if end_pts_of_contour.last().map_or(false, |&last| end <= last) {
                return Err(DeserializationError(
                    "Contour end points are not increasing".to_string(),
                ));
            }
            end_pts_of_contour.push(end);
        }
        let instructions_count: uint16 = c.de()?;
        let instructions: Vec<u8> = c.de_counted(instructions_count as usize)?;
        let num_points = end_pts_of_contour.last().copied().unwrap_or(0);

        let mut flags: Vec<SimpleGlyphFlags> = Vec::with_capacity(num_points);
        while flags.len() < num_points {
            let flag = SimpleGlyphFlags::from_bits_truncate(c.de()?);
            flags.push(flag);
            if flag.contains(SimpleGlyphFlags::REPEAT_FLAG) {
                let repeat_count: u8 = c.de()?;
                for _ in 0..repeat_count {
                    flags.push(flag);
                }
            }
        }
        flags.truncate(num_points);

        let x_coords = read_coordinates(
            c,
            &flags,
            SimpleGlyphFlags::X_SHORT_VECTOR,
            SimpleGlyphFlags::X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR,
        )?;
        let y_coords = read_coordinates(
            c,
            &flags,
            SimpleGlyphFlags::Y_SHORT_VECTOR,
            SimpleGlyphFlags::Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR,
        )?;

        // Divvy x/y coords into contours
        let points: Vec<Point> = izip!(&x_coords, &y_coords, &flags)
            .map(|(x, y, flag)| Point {
                x: *x,
                y: *y,
                on_curve: flag.contains(SimpleGlyphFlags::ON_CURVE_POINT),
            })
            .collect();
        end_pts_of_contour.insert(0, 0);
        let contours = end_pts_of_contour
            .windows(2)
            .map(|window| points[window[0]..window[1]].to_vec())
            .collect();

        Ok(Glyph {
            xMin: core.xMin,
            yMin: core.yMin,
            xMax: core.xMax,
            yMax: core.yMax,
            contours,
            instructions,
            advance_width: 0,
            lsb: core.xMin,
        })
    }
}

/// Reads one coordinate array, resolving short vectors and repeated values
/// into absolute positions.
fn read_coordinates(
    c: &mut ReaderContext,
    flags: &[SimpleGlyphFlags],
    short: SimpleGlyphFlags,
    same_or_positive: SimpleGlyphFlags,
) -> Result<Vec<int16>, DeserializationError> {
    let mut coords = Vec::with_capacity(flags.len());
    let mut last = 0_i16;
    for flag in flags {
        if flag.contains(short) {
            let delta: u8 = c.de()?;
            if flag.contains(same_or_positive) {
                last = last.wrapping_add(delta as i16);
            } else {
                last = last.wrapping_sub(delta as i16);
            }
        } else if !flag.contains(same_or_positive) {
            let delta: i16 = c.de()?;
            last = last.wrapping_add(delta);
        }
        coords.push(last);
    }
    Ok(coords)
}

impl Glyph {
    /// Creates a glyph from a list of contours, computing its bounding box
    /// and using the left edge of the box as the left side bearing.
    pub fn from_contours(contours: Vec<Vec<Point>>, advance_width: uint16) -> Glyph {
        let mut glyph = Glyph {
            contours,
            advance_width,
            ..Default::default()
        };
        glyph.recalc_bounds();
        glyph.lsb = glyph.xMin;
        glyph
    }

    /// A glyph with no outline, such as a space.
    pub fn empty(advance_width: uint16) -> Glyph {
        Glyph {
            advance_width,
            ..Default::default()
        }
    }

    /// Returns true if this glyph has no contours
    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    /// Returns a bounding box rectangle for this glyph as a `kurbo::Rect`.
    pub fn bounds_rect(&self) -> kurbo::Rect {
        kurbo::Rect::new(
            self.xMin.into(),
            self.yMin.into(),
            self.xMax.into(),
            self.yMax.into(),
        )
    }

    /// Sets the bounding box rectangle for this glyph from a `kurbo::Rect`.
    pub fn set_bounds_rect(&mut self, r: kurbo::Rect) {
        self.xMin = r.min_x() as i16;
        self.xMax = r.max_x() as i16;
        self.yMin = r.min_y() as i16;
        self.yMax = r.max_y() as i16;
    }

    /// Recomputes the bounding box from the points. An empty glyph gets a
    /// zero box.
    pub fn recalc_bounds(&mut self) {
        let mut points = self.contours.iter().flatten().map(|p| p.to_kurbo());
        let bounds = match points.next() {
            Some(first) => {
                points.fold(kurbo::Rect::from_points(first, first), |r, p| {
                    r.union_pt(p)
                })
            }
            None => kurbo::Rect::ZERO,
        };
        self.set_bounds_rect(bounds);
    }

    /// The number of points in all contours
    pub fn num_points(&self) -> usize {
        self.contours.iter().map(|c| c.len()).sum()
    }

    /// The number of contours
    pub fn num_contours(&self) -> usize {
        self.contours.len()
    }

    /// Distance from the right edge of the bounding box to the advance.
    pub fn rsb(&self) -> i32 {
        self.advance_width as i32 - self.lsb as i32 - (self.xMax as i32 - self.xMin as i32)
    }

    /// Checks that the glyph can be written: every contour has at least one
    /// point, and the stored bounding box encloses every point.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ix) = self.contours.iter().position(|c| c.is_empty()) {
            return Err(format!("contour {} has no points", ix));
        }
        if let Some(p) = self.contours.iter().flatten().find(|p| {
            p.x < self.xMin || p.x > self.xMax || p.y < self.yMin || p.y > self.yMax
        }) {
            return Err(format!(
                "point ({}, {}) lies outside the bounding box ({}, {}, {}, {})",
                p.x, p.y, self.xMin, self.yMin, self.xMax, self.yMax
            ));
        }
        Ok(())
    }

    /// Assuming that the contour list has been expanded into a flat list of
    /// points, returns an array of indices representing the final points of
    /// each contour.
    fn end_points(&self) -> Result<Vec<u16>, SerializationError> {
        let mut count: i64 = -1;
        let mut end_points = Vec::with_capacity(self.contours.len());
        for contour in &self.contours {
            count += contour.len() as i64;
            end_points.push(codec::to_u16(count)?);
        }
        Ok(end_points)
    }

    /// Encodes flags and coordinates. Every delta is written as a full
    /// int16, with no short vectors and no flag repetition.
    fn compile_deltas(&self) -> Result<(Vec<u8>, Vec<u8>, Vec<u8>), SerializationError> {
        let num_points = self.num_points();
        let mut flags: Vec<u8> = Vec::with_capacity(num_points);
        let mut xs: Vec<u8> = Vec::with_capacity(num_points * 2);
        let mut ys: Vec<u8> = Vec::with_capacity(num_points * 2);
        let mut last_x = 0_i64;
        let mut last_y = 0_i64;
        for point in self.contours.iter().flatten() {
            let flag = if point.on_curve {
                SimpleGlyphFlags::ON_CURVE_POINT
            } else {
                SimpleGlyphFlags::empty()
            };
            flags.push(flag.bits());
            xs.put(encode_delta(point.x as i64 - last_x)?)?;
            ys.put(encode_delta(point.y as i64 - last_y)?)?;
            last_x = point.x as i64;
            last_y = point.y as i64;
        }
        Ok((flags, xs, ys))
    }
}

/// Narrows a coordinate delta to the int16 it is stored as.
pub fn encode_delta(delta: i64) -> Result<int16, SerializationError> {
    codec::to_i16(delta)
}

impl Serialize for Glyph {
    fn to_bytes(&self, data: &mut Vec<u8>) -> Result<(), SerializationError> {
        if self.is_empty() {
            return Ok(());
        }
        self.validate().map_err(SerializationError::Other)?;
        data.put(GlyphCore {
            numberOfContours: codec::to_i16(self.contours.len() as i64)?,
            xMin: self.xMin,
            yMin: self.yMin,
            xMax: self.xMax,
            yMax: self.yMax,
        })?;
        data.put(self.end_points()?)?;
        data.put(codec::to_u16(self.instructions.len() as i64)?)?;
        data.put(&self.instructions)?;
        let (flags, xs, ys) = self.compile_deltas()?;
        data.put(flags)?;
        data.put(xs)?;
        data.put(ys)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use otspec::{de, ser};
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
    fn rectangle_ser() {
        let binary_glyph = vec![
            0x00, 0x01, // numberOfContours
            0x00, 0x00, 0x00, 0x00, 0x01, 0xf4, 0x02, 0xbc, // bbox
            0x00, 0x03, // endPtsOfContours
            0x00, 0x00, // instructionLength
            0x01, 0x01, 0x01, 0x01, // flags
            0x00, 0x00, 0x01, 0xf4, 0x00, 0x00, 0xfe, 0x0c, // x deltas
            0x00, 0x00, 0x00, 0x00, 0x02, 0xbc, 0x00, 0x00, // y deltas
        ];
        let glyph = rectangle();
        assert_eq!((glyph.xMax, glyph.yMax, glyph.lsb), (500, 700, 0));
        assert_eq!(ser::to_bytes(&glyph).unwrap(), binary_glyph);
    }

    #[test]
    fn empty_glyph_is_zero_bytes() {
        assert!(ser::to_bytes(&Glyph::empty(250)).unwrap().is_empty());
    }

    #[test]
    fn deltas_run_across_contours() {
        let glyph = Glyph::from_contours(
            vec![
                vec![Point::on(10, 10), Point::off(20, 30)],
                vec![Point::on(15, 5)],
            ],
            0,
        );
        let bytes = ser::to_bytes(&glyph).unwrap();
        // endPtsOfContours
        assert_eq!(bytes[10..14], [0x00, 0x01, 0x00, 0x02]);
        // flags
        assert_eq!(bytes[16..19], [0x01, 0x00, 0x01]);
        // x: 10, +10, -5
        assert_eq!(bytes[19..25], [0x00, 0x0a, 0x00, 0x0a, 0xff, 0xfb]);
        // y: 10, +20, -25
        assert_eq!(bytes[25..31], [0x00, 0x0a, 0x00, 0x14, 0xff, 0xe7]);
    }

    #[test]
    fn delta_limits() {
        assert_eq!(encode_delta(32767), Ok(32767));
        assert_eq!(encode_delta(-32768), Ok(-32768));
        assert!(encode_delta(32768).is_err());

        let glyph = Glyph::from_contours(
            vec![vec![Point::on(-32768, 0), Point::on(32767, 0)]],
            0,
        );
        assert!(ser::to_bytes(&glyph).is_err());
    }

    #[test]
    fn invalid_glyphs() {
        let mut glyph = rectangle();
        glyph.xMax = 400;
        assert!(glyph.validate().is_err());
        assert!(ser::to_bytes(&glyph).is_err());

        let glyph = Glyph::from_contours(vec![vec![Point::on(0, 0)], vec![]], 0);
        assert_eq!(glyph.validate(), Err("contour 1 has no points".to_string()));
    }

    #[test]
    fn rectangle_roundtrip() {
        let glyph = rectangle();
        let bytes = ser::to_bytes(&glyph).unwrap();
        let mut back: Glyph = de::from_bytes(&bytes).unwrap();
        back.advance_width = 500;
        assert_eq!(back, glyph);
    }

    #[test]
    fn short_vectors_de() {
        let binary_glyph = vec![
            0x00, 0x01, // numberOfContours
            0x00, 0x0a, 0x00, 0x00, 0x00, 0x64, 0x00, 0xc8, // bbox
            0x00, 0x02, // endPtsOfContours
            0x00, 0x00, // instructionLength
            0x3b, 0x01, // on-curve, x short positive, y same; repeated once
            0x27, // on-curve, x short negative, y short positive
            0x0a, 0x5a, 0x2d, // x: +10, +90, -45
            0xc8, // y: +200
        ];
        let glyph: Glyph = de::from_bytes(&binary_glyph).unwrap();
        assert_eq!(
            glyph.contours,
            vec![vec![
                Point::on(10, 0),
                Point::on(100, 0),
                Point::on(55, 200)
            ]]
        );
        assert_eq!(glyph.bounds_rect(), kurbo::Rect::new(10.0, 0.0, 100.0, 200.0));
    }

    #[test]
    fn composite_rejected() {
        let binary_glyph = vec![0xff, 0xff, 0, 0, 0, 0, 0, 0, 0, 0];
        let glyph: Result<Glyph, _> = de::from_bytes(&binary_glyph);
        assert!(glyph.is_err());
    }
}
