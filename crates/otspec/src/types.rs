use crate::DeserializationError;
use crate::Deserialize;
use crate::Deserializer;
use crate::ReaderContext;
use crate::SerializationError;
use crate::Serialize;
use chrono::{Duration, NaiveDate};
pub use chrono::NaiveDateTime;

pub use crate::tag::{InvalidTag, Tag};
pub use otspec_macros::tag;

pub type uint16 = u16;
pub type uint32 = u32;
pub type int16 = i16;
pub type int32 = i32;
pub type FWORD = i16;
pub type UFWORD = u16;

/// A 16.16 fixed-point number, stored as an f32 for ease of use.
#[derive(Shrinkwrap, Debug, PartialEq, Clone, Copy)]
pub struct Fixed(pub f32);

fn ot_round(value: f32) -> i32 {
    (value + 0.5).floor() as i32
}

impl Serialize for Fixed {
    fn to_bytes(&self, data: &mut Vec<u8>) -> Result<(), SerializationError> {
        let packed: i32 = ot_round(self.0 * 65536.0);
        packed.to_bytes(data)
    }
}
impl Deserialize for Fixed {
    fn from_bytes(c: &mut ReaderContext) -> Result<Self, DeserializationError> {
        let packed: i32 = c.de()?;
        Ok(Fixed(packed as f32 / 65536.0))
    }
}

impl From<f32> for Fixed {
    fn from(num: f32) -> Self {
        Self(num)
    }
}
impl From<Fixed> for f32 {
    fn from(num: Fixed) -> Self {
        num.0
    }
}

/// Midnight, 1st January 1904: the zero point of `LONGDATETIME` values.
pub fn longdatetime_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1904, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("1904-01-01 is a valid date")
}

// Roughly 35,000 years either side of the epoch.
const MAX_LONGDATETIME_SECONDS: i64 = 1 << 40;

/// A date, stored in the font as seconds since 1904.
#[derive(Shrinkwrap, Debug, PartialEq, Clone, Copy)]
pub struct LONGDATETIME(pub NaiveDateTime);

impl Serialize for LONGDATETIME {
    fn to_bytes(&self, data: &mut Vec<u8>) -> Result<(), SerializationError> {
        let seconds: i64 = (self.0 - longdatetime_epoch()).num_seconds();
        seconds.to_bytes(data)
    }
}
impl Deserialize for LONGDATETIME {
    fn from_bytes(c: &mut ReaderContext) -> Result<Self, DeserializationError> {
        let diff: i64 = c.de()?;
        if diff
            .checked_abs()
            .map_or(true, |d| d > MAX_LONGDATETIME_SECONDS)
        {
            return Err(DeserializationError(format!("Date out of range: {}", diff)));
        }
        let res = longdatetime_epoch()
            .checked_add_signed(Duration::seconds(diff))
            .ok_or_else(|| DeserializationError(format!("Date out of range: {}", diff)))?;
        Ok(LONGDATETIME(res))
    }
}

impl From<NaiveDateTime> for LONGDATETIME {
    fn from(num: NaiveDateTime) -> Self {
        Self(num)
    }
}
impl From<LONGDATETIME> for NaiveDateTime {
    fn from(num: LONGDATETIME) -> Self {
        num.0
    }
}
