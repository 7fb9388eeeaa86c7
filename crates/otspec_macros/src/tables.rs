use crate::error::SyntaxError;
use proc_macro::{Delimiter, Span, TokenStream, TokenTree};

enum FieldKind {
    Plain(String),
    Fixed,
    DateTime,
    Counted(String),
    Counted32(String),
}

struct Field {
    name: String,
    kind: FieldKind,
}

impl FieldKind {
    /// The type the user sees in the generated struct.
    fn rust_type(&self) -> String {
        match self {
            FieldKind::Plain(t) => t.clone(),
            /* Fixed-point is an artefact of the storage format; callers get
            plain f32s. */
            FieldKind::Fixed => "f32".to_string(),
            FieldKind::DateTime => "otspec::types::NaiveDateTime".to_string(),
            FieldKind::Counted(t) | FieldKind::Counted32(t) => format!("Vec<{}>", t),
        }
    }

    /// The type which knows how to read and write the field.
    fn wire_type(&self) -> Option<String> {
        match self {
            FieldKind::Plain(_) => None,
            FieldKind::Fixed => Some("otspec::types::Fixed".to_string()),
            FieldKind::DateTime => Some("otspec::types::LONGDATETIME".to_string()),
            FieldKind::Counted(t) => Some(format!("otspec::Counted<{}>", t)),
            FieldKind::Counted32(t) => Some(format!("otspec::Counted32<{}>", t)),
        }
    }
}

fn expect_ident(item: Option<TokenTree>) -> Result<String, SyntaxError> {
    match item {
        Some(TokenTree::Ident(i)) => Ok(i.to_string()),
        Some(other) => Err(SyntaxError::new(
            other.span(),
            format!("expected an identifier, found '{}'", other),
        )),
        None => Err(SyntaxError::new(
            Span::call_site(),
            "expected an identifier, found end of macro",
        )),
    }
}

fn expect_group(item: Option<TokenTree>, delimiter: Delimiter) -> Result<TokenStream, SyntaxError> {
    match item {
        Some(TokenTree::Group(g)) if g.delimiter() == delimiter => Ok(g.stream()),
        Some(other) => Err(SyntaxError::new(
            other.span(),
            format!("expected {:?}-delimited group, found '{}'", delimiter, other),
        )),
        None => Err(SyntaxError::new(
            Span::call_site(),
            "expected delimiter, found end of macro",
        )),
    }
}

fn parse_fields(body: TokenStream) -> Result<Vec<Field>, SyntaxError> {
    let mut fields = vec![];
    let mut iter = body.into_iter();
    while let Some(token) = iter.next() {
        let t = expect_ident(Some(token))?;
        let kind = match t.as_str() {
            "Counted" | "Counted32" => {
                let subtype = expect_group(iter.next(), Delimiter::Parenthesis)?.to_string();
                if t == "Counted" {
                    FieldKind::Counted(subtype)
                } else {
                    FieldKind::Counted32(subtype)
                }
            }
            "Fixed" => FieldKind::Fixed,
            "LONGDATETIME" => FieldKind::DateTime,
            _ => FieldKind::Plain(t),
        };
        let name = expect_ident(iter.next())?;
        fields.push(Field { name, kind });
    }
    Ok(fields)
}

fn record_struct(table_name: &str, fields: &[Field]) -> String {
    let mut out_s = format!(
        "/// Low-level structure used for serializing/deserializing table\n\
        #[allow(missing_docs, non_snake_case, non_camel_case_types)]\n\
        #[derive(Debug, PartialEq, Clone)]\n\
        pub struct {} {{\n",
        table_name
    );
    for field in fields {
        out_s.push_str(&format!(
            "    pub {}: {},\n",
            field.name,
            field.kind.rust_type()
        ));
    }
    out_s.push_str("}\n");
    out_s
}

fn serialize_impl(table_name: &str, fields: &[Field]) -> String {
    let mut body = String::new();
    for field in fields {
        match field.kind.wire_type() {
            None => body.push_str(&format!(
                "        otspec::Serialize::to_bytes(&self.{}, data)?;\n",
                field.name
            )),
            Some(wire) => body.push_str(&format!(
                "        otspec::Serialize::to_bytes(&<{}>::from(self.{}.clone()), data)?;\n",
                wire, field.name
            )),
        }
    }
    format!(
        "impl otspec::Serialize for {} {{\n\
        fn to_bytes(&self, data: &mut Vec<u8>) -> Result<(), otspec::SerializationError> {{\n\
        {}\
        Ok(())\n\
        }}\n\
        }}\n",
        table_name, body
    )
}

fn deserialize_impl(table_name: &str, fields: &[Field]) -> String {
    let mut body = String::new();
    for field in fields {
        let rust_type = field.kind.rust_type();
        match field.kind.wire_type() {
            None => body.push_str(&format!(
                "        let {}: {} = <{} as otspec::Deserialize>::from_bytes(c)?;\n",
                field.name, rust_type, rust_type
            )),
            Some(wire) => body.push_str(&format!(
                "        let {}: {} = <{} as otspec::Deserialize>::from_bytes(c)?.into();\n",
                field.name, rust_type, wire
            )),
        }
    }
    let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    format!(
        "impl otspec::Deserialize for {} {{\n\
        #[allow(non_snake_case)]\n\
        fn from_bytes(c: &mut otspec::ReaderContext) -> Result<Self, otspec::DeserializationError> {{\n\
        {}\
        Ok({} {{ {} }})\n\
        }}\n\
        }}\n",
        table_name,
        body,
        table_name,
        names.join(", ")
    )
}

fn expand_tables_impl(item: TokenStream) -> Result<TokenStream, SyntaxError> {
    let mut iter = item.into_iter();
    let mut out_s = String::new();

    while let Some(token) = iter.next() {
        let table_name = expect_ident(Some(token))?;
        let fields = parse_fields(expect_group(iter.next(), Delimiter::Brace)?)?;
        out_s.push_str(&record_struct(&table_name, &fields));
        out_s.push_str(&serialize_impl(&table_name, &fields));
        out_s.push_str(&deserialize_impl(&table_name, &fields));
    }
    out_s.parse().map_err(|_| {
        SyntaxError::new(
            Span::call_site(),
            "tables! produced code which does not parse",
        )
    })
}

pub fn expand_tables(item: TokenStream) -> TokenStream {
    match expand_tables_impl(item) {
        Ok(tokens) => tokens,
        Err(e) => e.into_compile_error(),
    }
}
