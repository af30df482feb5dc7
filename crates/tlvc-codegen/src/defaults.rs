//! Rendering of schema-declared default values as C literals.
//!
//! A default shows up in two places in the emitted text: embedded in the
//! `_INIT` initializer macro ([`init_literal`]) and as a named constant the
//! descriptor table points at ([`render`]). String defaults are emitted as
//! `char[]` arrays because their content length is static; everything else
//! is a plain typed constant.

use crate::error::{Error, Result};
use crate::names::{c_escape, type_ident, type_ident_upper};
use crate::schema::{DefaultValue, Field, FieldKind};
use heck::ToShoutySnakeCase;

/// A default-value constant emitted into the definitions artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultConstant {
    /// The constant's symbol, `{msg_ident}_{field}_default_value`.
    pub symbol: String,
    /// The full C definition line.
    pub definition: String,
    /// The expression a field descriptor uses to reference the constant
    /// (`&symbol`, or the bare symbol for `char[]` arrays).
    pub reference: String,
    /// Whether the symbol needs an `extern` declaration in the header
    /// (true for string defaults, which the `_INIT` macro references).
    pub needs_extern: bool,
}

/// The enumerator symbol for a value of the referenced enum type.
pub fn enum_value_symbol(enum_full_name: &str, value_name: &str) -> String {
    format!(
        "{}_{}",
        type_ident_upper(enum_full_name),
        value_name.to_shouty_snake_case()
    )
}

fn float_repr(v: f64) -> String {
    let s = format!("{}", v);
    if s.contains('.') || s.contains('e') || s.contains("inf") || s.contains("NaN") {
        s
    } else {
        format!("{}.0", s)
    }
}

fn mismatch(field: &Field) -> Error {
    Error::Invariant(format!(
        "default value of field '{}' does not match its declared kind",
        field.name
    ))
}

/// The literal used for this field inside the `_INIT` macro.
///
/// Only call for fields with a declared default. Message-typed fields may
/// not declare defaults; a correctly validated schema cannot produce one,
/// so that case is an internal invariant violation.
pub fn init_literal(msg_ident: &str, field: &Field) -> Result<String> {
    let default = field
        .default
        .as_ref()
        .ok_or_else(|| Error::Invariant(format!("field '{}' has no default value", field.name)))?;

    match (&field.kind, default) {
        (FieldKind::Int32 | FieldKind::Int64, DefaultValue::Int(v)) => {
            Ok(render_int(&field.kind, *v))
        }
        (FieldKind::Uint32 | FieldKind::Uint64, DefaultValue::Uint(v)) => {
            Ok(render_uint(&field.kind, *v))
        }
        (FieldKind::Float, DefaultValue::Float(v)) => Ok(format!("{}f", float_repr(*v))),
        (FieldKind::Double, DefaultValue::Float(v)) => Ok(float_repr(*v)),
        (FieldKind::Bool, DefaultValue::Bool(v)) => Ok(if *v { "1" } else { "0" }.to_string()),
        (FieldKind::String, DefaultValue::String(_)) => {
            // Content lives in the emitted char[] constant.
            Ok(format!("(char *){}_{}_default_value", msg_ident, field.name))
        }
        (FieldKind::Bytes, DefaultValue::Bytes(v)) => Ok(format!(
            "{{ {}, (uint8_t *) \"{}\" }}",
            v.len(),
            c_escape(v)
        )),
        (FieldKind::Enum(en), DefaultValue::EnumValue(value)) => Ok(enum_value_symbol(en, value)),
        (FieldKind::Message(_), _) => Err(Error::Invariant(format!(
            "message-typed field '{}' cannot declare a default value",
            field.name
        ))),
        _ => Err(mismatch(field)),
    }
}

fn render_int(kind: &FieldKind, v: i64) -> String {
    match kind {
        FieldKind::Int64 => format!("{}ll", v),
        _ => format!("{}", v),
    }
}

fn render_uint(kind: &FieldKind, v: u64) -> String {
    match kind {
        FieldKind::Uint64 => format!("{}ull", v),
        _ => format!("{}u", v),
    }
}

/// The named constant for this field's default, emitted into the
/// definitions artifact and referenced from the descriptor table.
pub fn render(msg_ident: &str, field: &Field) -> Result<DefaultConstant> {
    let symbol = format!("{}_{}_default_value", msg_ident, field.name);
    let default = field
        .default
        .as_ref()
        .ok_or_else(|| Error::Invariant(format!("field '{}' has no default value", field.name)))?;

    let (c_type, literal, is_array) = match (&field.kind, default) {
        (FieldKind::Int32, DefaultValue::Int(v)) => ("int32_t", format!("{}", v), false),
        (FieldKind::Int64, DefaultValue::Int(v)) => ("int64_t", format!("{}ll", v), false),
        (FieldKind::Uint32, DefaultValue::Uint(v)) => ("uint32_t", format!("{}u", v), false),
        (FieldKind::Uint64, DefaultValue::Uint(v)) => ("uint64_t", format!("{}ull", v), false),
        (FieldKind::Float, DefaultValue::Float(v)) => ("float", format!("{}f", float_repr(*v)), false),
        (FieldKind::Double, DefaultValue::Float(v)) => ("double", float_repr(*v), false),
        (FieldKind::Bool, DefaultValue::Bool(v)) => {
            ("tlvc_boolean", if *v { "1" } else { "0" }.to_string(), false)
        }
        (FieldKind::String, DefaultValue::String(s)) => {
            ("char", format!("\"{}\"", c_escape(s.as_bytes())), true)
        }
        (FieldKind::Bytes, DefaultValue::Bytes(v)) => (
            "TlvcBinaryData",
            format!("{{ {}, (uint8_t *) \"{}\" }}", v.len(), c_escape(v)),
            false,
        ),
        (FieldKind::Enum(en), DefaultValue::EnumValue(value)) => {
            let ty = format!("{}_t", type_ident(en));
            let lit = enum_value_symbol(en, value);
            return Ok(DefaultConstant {
                definition: format!("static const {} {} = {};", ty, symbol, lit),
                reference: format!("&{}", symbol),
                needs_extern: false,
                symbol,
            });
        }
        (FieldKind::Message(_), _) => {
            return Err(Error::Invariant(format!(
                "message-typed field '{}' cannot declare a default value",
                field.name
            )))
        }
        _ => return Err(mismatch(field)),
    };

    let (definition, reference, needs_extern) = if is_array {
        (
            format!("const {} {}[] = {};", c_type, symbol, literal),
            symbol.clone(),
            true,
        )
    } else {
        (
            format!("static const {} {} = {};", c_type, symbol, literal),
            format!("&{}", symbol),
            false,
        )
    };

    Ok(DefaultConstant {
        symbol,
        definition,
        reference,
        needs_extern,
    })
}
