#![allow(non_snake_case, non_camel_case_types, clippy::upper_case_acronyms)]
//! Assemble minimal TrueType fonts from scratch.
//!
//! Glyph outlines, a character map and a set of [`FontMetrics`] go in; a
//! complete `.ttf` file comes out:
//!
//! ```
//! use fontscratch::{build_minimal_font, FontMetrics};
//!
//! let ttf = build_minimal_font(&FontMetrics::default()).unwrap();
//! assert_eq!(ttf[0..4], [0x00, 0x01, 0x00, 0x00]);
//! ```
//!
//! Each table lives in its own module under [`tables`], and can be built and
//! serialized on its own. [`font::Font`] collects compiled tables and lays
//! them out into a file.

mod buildbasic;
mod error;
/// The font file assembler
pub mod font;
mod metrics;
/// OpenType table definitions
pub mod tables;

pub use crate::buildbasic::{
    build_font, build_minimal_font, compile_cmap, compile_head, compile_hhea, compile_hmtx,
    compile_maxp, compile_name, compile_os2, compile_post, default_glyphs, default_mapping,
};
pub use crate::error::{FontBuildError, Result};
pub use crate::font::Font;
pub use crate::metrics::FontMetrics;
pub use crate::tables::glyf::{Glyph, Point};
pub use otspec::types::Tag;
