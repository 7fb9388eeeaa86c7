use otspec::types::Tag;
use otspec::SerializationError;
use snafu::Snafu;

/// Everything that can go wrong while building a font.
///
/// These are all construction errors: bad input, or a table builder that
/// produced something inconsistent. Nothing is written when one occurs.
#[derive(Debug, Snafu, PartialEq)]
#[snafu(visibility(pub(crate)))]
pub enum FontBuildError {
    #[snafu(display("{} does not fit in {}", value, what))]
    EncodingOverflow { what: String, value: i128 },

    #[snafu(display("Table {} was added twice", tag))]
    DuplicateTable { tag: Tag },

    #[snafu(display(
        "Table {} should be {} bytes long but is {} bytes",
        tag,
        declared,
        actual
    ))]
    LayoutMismatch {
        tag: Tag,
        declared: usize,
        actual: usize,
    },

    #[snafu(display("Glyph {} is invalid: {}", glyph, reason))]
    InvalidGlyphDefinition { glyph: usize, reason: String },

    #[snafu(display("A font needs at least one table"))]
    NoTables,

    #[snafu(display("Error serializing font: {}", message))]
    Serialization { message: String },
}

impl From<SerializationError> for FontBuildError {
    fn from(e: SerializationError) -> Self {
        match e {
            SerializationError::Overflow {
                value,
                bits,
                signed,
            } => FontBuildError::EncodingOverflow {
                what: format!(
                    "{} {}-bit integer",
                    if signed { "a signed" } else { "an unsigned" },
                    bits
                ),
                value,
            },
            SerializationError::Other(message) => FontBuildError::Serialization { message },
        }
    }
}

pub type Result<T, E = FontBuildError> = std::result::Result<T, E>;
