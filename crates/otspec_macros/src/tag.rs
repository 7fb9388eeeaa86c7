use crate::error::SyntaxError;
use proc_macro::{Literal, Span, TokenStream, TokenTree};

/// Expand a macro of the form `tag!("head")`.
pub(crate) fn expand_tag(item: TokenStream) -> TokenStream {
    match expand_tag_impl(item) {
        Ok(tokens) => tokens,
        Err(e) => e.into_compile_error(),
    }
}

fn expand_tag_impl(item: TokenStream) -> Result<TokenStream, SyntaxError> {
    let mut iter = item.into_iter();
    let input = match iter.next() {
        Some(TokenTree::Literal(lit)) => expect_tag_literal(lit)?,
        Some(other) => return Err(SyntaxError::new(other.span(), "expected string literal")),
        None => {
            return Err(SyntaxError::new(
                Span::call_site(),
                "expected string literal",
            ))
        }
    };
    if let Some(extra) = iter.next() {
        return Err(SyntaxError::new(extra.span(), "unexpected tokens after tag"));
    }

    let padded = format!("{:<4}", input);
    let bytes: Vec<String> = padded.bytes().map(|b| format!("0x{:02X}u8", b)).collect();
    let tag_expr = format!(
        "otspec::types::Tag::from_checked_bytes([{}])",
        bytes.join(", ")
    );
    tag_expr
        .parse()
        .map_err(|_| SyntaxError::new(Span::call_site(), "could not build tag expression"))
}

/// A tag must be 1-4 bytes long, all in the printable range 0x20..=0x7E.
/// Escapes are not accepted; every tag in use is plain ascii.
fn expect_tag_literal(lit: Literal) -> Result<String, SyntaxError> {
    let span = lit.span();
    let repr = lit.to_string();
    if repr.len() < 2 || !repr.starts_with('"') || !repr.ends_with('"') {
        return Err(SyntaxError::new(span, "expected string literal"));
    }
    let content = &repr[1..repr.len() - 1];
    if content.contains('\\') {
        return Err(SyntaxError::new(span, "escapes are not allowed in tags"));
    }
    if content.is_empty() || content.len() > 4 {
        return Err(SyntaxError::new(span, "tag must be 1..=4 bytes long"));
    }
    if let Some(idx) = content.bytes().position(|b| !(0x20..=0x7E).contains(&b)) {
        return Err(SyntaxError::new(
            span,
            format!(
                "illegal byte '0x{:02X}' at position {}",
                content.as_bytes()[idx],
                idx
            ),
        ));
    }
    Ok(content.to_owned())
}
