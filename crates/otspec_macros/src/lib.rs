//! This library is used by the otspec crate. No user-serviceable parts inside.
extern crate proc_macro;

mod error;
mod tables;
mod tag;

/// Declare one or more fixed-layout binary records.
///
/// Each record is written as a name followed by a braced list of
/// `type fieldName` pairs, in file order. A plain struct is generated along
/// with `otspec::Serialize` and `otspec::Deserialize` impls which read and
/// write the fields in that order. The following field types are treated
/// specially:
///
/// * `Fixed` becomes an `f32`, stored as 16.16 fixed point.
/// * `LONGDATETIME` becomes a `chrono::NaiveDateTime`.
/// * `Counted(T)` becomes a `Vec<T>` preceded by a `uint16` count.
/// * `Counted32(T)` becomes a `Vec<T>` preceded by a `uint32` count.
///
/// All other types are used as-is and must implement the otspec traits.
#[proc_macro]
pub fn tables(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    tables::expand_tables(input)
}

/// Generate a `Tag` from a string literal, verifying it conforms to the
/// OpenType spec.
///
/// The argument must be a non-empty string literal of at most four
/// characters in the printable ascii range, `0x20..=0x7E`. Shorter input is
/// padded with spaces.
#[proc_macro]
pub fn tag(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    tag::expand_tag(input)
}
