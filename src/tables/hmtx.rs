use otspec::types::*;
use otspec::{DeserializationError, Deserializer, ReaderContext, SerializationError, Serialize};
use otspec_macros::tables;

/// The 'hmtx' OpenType tag.
pub const TAG: Tag = tag!("hmtx");

tables!(Metric {
    uint16 advanceWidth
    int16 lsb
});

/// The horizontal metrics table
#[derive(Clone, Debug, PartialEq, Default)]
#[allow(non_camel_case_types)]
pub struct hmtx {
    /// The list of metrics, corresponding to the glyph order
    pub metrics: Vec<Metric>,
}

impl hmtx {
    /// The number of horizontal metrics (to be stored in the `hhea` table).
    ///
    /// Every glyph gets a full metric; trailing advance widths are never
    /// folded into a bare left side bearing array.
    pub fn number_of_hmetrics(&self) -> Result<uint16, SerializationError> {
        otspec::codec::to_u16(self.metrics.len() as i64)
    }
}

impl Serialize for hmtx {
    fn to_bytes(&self, data: &mut Vec<u8>) -> Result<(), SerializationError> {
        self.metrics.to_bytes(data)
    }
}

/// Deserializes a Horizontal Metrics Table given a binary vector and the
/// `numberOfHMetrics` field of the `hhea` table. Glyphs beyond
/// `numberOfHMetrics` share the last advance width.
pub fn from_bytes(s: &[u8], number_of_h_metrics: uint16) -> Result<hmtx, DeserializationError> {
    let mut c = ReaderContext::new(s.to_vec());
    let mut metrics: Vec<Metric> = c.de_counted(number_of_h_metrics as usize)?;
    let other_metrics: Vec<int16> = c.de_counted(c.remaining() / 2)?;
    if !other_metrics.is_empty() {
        let last = metrics
            .last()
            .ok_or_else(|| DeserializationError("Must be one advance width in hmtx!".to_string()))?
            .advanceWidth;
        metrics.extend(other_metrics.iter().map(|x| Metric {
            lsb: *x,
            advanceWidth: last,
        }))
    }
    Ok(hmtx { metrics })
}
