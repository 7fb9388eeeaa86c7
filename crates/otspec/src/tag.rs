//! Table tags.

use crate::{DeserializationError, Deserialize, ReaderContext, SerializationError, Serialize};
use std::{borrow::Borrow, str::FromStr};

/// A four-byte table tag such as `head` or `OS/2`.
///
/// Every byte is in the printable ascii range (0x20..=0x7E). Tags compare
/// byte-wise, which is the order required for the table directory.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag([u8; 4]);

impl Tag {
    /// Attempt to create a `Tag` from raw bytes.
    ///
    /// The input must contain between 1 and 4 printable ascii bytes. Short
    /// tags are padded with spaces. Prefer the `tag!` macro for literals.
    pub fn from_raw(src: impl AsRef<[u8]>) -> Result<Self, InvalidTag> {
        let src = src.as_ref();
        if src.is_empty() || src.len() > 4 {
            return Err(InvalidTag::InvalidLength(src.len()));
        }
        if let Some(pos) = src.iter().position(|b| !(0x20..=0x7E).contains(b)) {
            return Err(InvalidTag::InvalidByte {
                pos,
                byte: src[pos],
            });
        }
        let mut out = [b' '; 4];
        out[..src.len()].copy_from_slice(src);
        Ok(Tag(out))
    }

    /// Used by the `tag!` macro, which has already validated its input.
    #[doc(hidden)]
    pub const fn from_checked_bytes(raw: [u8; 4]) -> Self {
        Tag(raw)
    }

    /// This tag as raw bytes.
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// This tag as a `&str`.
    pub fn as_str(&self) -> &str {
        // Only printable ascii gets in, so this cannot fail.
        std::str::from_utf8(&self.0).unwrap_or("????")
    }
}

/// An error representing an invalid tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvalidTag {
    InvalidLength(usize),
    InvalidByte { pos: usize, byte: u8 },
}

impl FromStr for Tag {
    type Err = InvalidTag;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        Tag::from_raw(src)
    }
}

impl Borrow<[u8; 4]> for Tag {
    fn borrow(&self) -> &[u8; 4] {
        &self.0
    }
}

impl PartialEq<[u8; 4]> for Tag {
    fn eq(&self, other: &[u8; 4]) -> bool {
        &self.0 == other
    }
}

impl PartialEq<str> for Tag {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Tag {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl Serialize for Tag {
    fn to_bytes(&self, data: &mut Vec<u8>) -> Result<(), SerializationError> {
        data.extend_from_slice(&self.0);
        Ok(())
    }
}

impl Deserialize for Tag {
    fn from_bytes(c: &mut ReaderContext) -> Result<Self, DeserializationError> {
        let bytes = c.consume(4)?;
        Tag::from_raw(bytes).map_err(|e| DeserializationError(e.to_string()))
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        self.as_str().fmt(f)
    }
}

impl std::fmt::Debug for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "'{}'", self.as_str())
    }
}

impl std::fmt::Display for InvalidTag {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::InvalidLength(len) => write!(f, "length {} not in accepted range (1..=4)", len),
            Self::InvalidByte { pos, byte } => {
                write!(f, "invalid byte '0x{:02X}' at position {}", byte, pos)
            }
        }
    }
}

impl std::error::Error for InvalidTag {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoke_test() {
        assert!(Tag::from_raw("").is_err());
        assert!(Tag::from_raw("oopsy").is_err());
        assert_eq!(
            Tag::from_raw("\nok"),
            Err(InvalidTag::InvalidByte { pos: 0, byte: 0x0a })
        );
        assert_eq!(Tag::from_raw("a").unwrap(), "a   ");
        assert_eq!(Tag::from_raw("cvt").unwrap(), "cvt ");
        assert_eq!(Tag::from_raw("OS/2").unwrap(), "OS/2");
    }

    #[test]
    fn sorts_bytewise() {
        let mut tags: Vec<Tag> = ["post", "OS/2", "head", "cmap", "hhea"]
            .iter()
            .map(|t| t.parse().unwrap())
            .collect();
        tags.sort();
        let names: Vec<&str> = tags.iter().map(|t| t.as_str()).collect();
        assert_eq!(names, vec!["OS/2", "cmap", "head", "hhea", "post"]);
    }
}
