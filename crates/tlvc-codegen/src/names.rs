//! C identifier derivation from schema names.
//!
//! All generated symbols hang off a lowercase identifier derived from the
//! type's fully-qualified name: the first path segment (the package) plus
//! the type's own name, intermediate nesting dropped. `demo.Outer.Color`
//! becomes `demo_color` both where it is defined and wherever it is
//! referenced, so references always resolve textually.

use heck::{ToShoutySnakeCase, ToSnakeCase};

/// Lowercase C identifier for a type: first path segment plus the type's
/// own name (`"demo.AddressBook"` → `"demo_address_book"`,
/// `"demo.Outer.Color"` → `"demo_color"`).
pub fn type_ident(full_name: &str) -> String {
    let mut parts = full_name.split('.');
    let first = parts.next().unwrap_or(full_name);
    match parts.last() {
        Some(last) => format!("{}_{}", first.to_snake_case(), last.to_snake_case()),
        None => first.to_snake_case(),
    }
}

/// Uppercase form of [`type_ident`], used for macros and enumerators.
pub fn type_ident_upper(full_name: &str) -> String {
    type_ident(full_name).to_shouty_snake_case()
}

/// Include-guard identifier for a schema file name.
pub fn guard_ident(file_name: &str) -> String {
    file_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect()
}

/// Schema file name with its extension stripped (`"contact.proto"` →
/// `"contact"`).
pub fn strip_extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(pos) => &file_name[..pos],
        None => file_name,
    }
}

/// Escape arbitrary bytes as a C string literal body.
///
/// Printable ASCII passes through, the usual short escapes are used where C
/// has them, and everything else becomes a three-digit octal escape.
pub fn c_escape(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        match b {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\{:03o}", b)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idents_from_full_names() {
        assert_eq!(type_ident("demo.AddressBook"), "demo_address_book");
        assert_eq!(type_ident_upper("demo.AddressBook"), "DEMO_ADDRESS_BOOK");
        assert_eq!(type_ident("demo"), "demo");
        assert_eq!(type_ident("Person"), "person");
    }

    #[test]
    fn intermediate_nesting_is_dropped() {
        assert_eq!(type_ident("demo.Outer.Color"), "demo_color");
        assert_eq!(type_ident_upper("demo.Outer.Color"), "DEMO_COLOR");
    }

    #[test]
    fn guard_and_extension() {
        assert_eq!(guard_ident("contact.proto"), "CONTACT_PROTO");
        assert_eq!(strip_extension("contact.proto"), "contact");
        assert_eq!(strip_extension("noext"), "noext");
    }

    #[test]
    fn escape_mixed_bytes() {
        assert_eq!(c_escape(b"ab\"c"), "ab\\\"c");
        assert_eq!(c_escape(&[0x01, b'x', 0xff]), "\\001x\\377");
        assert_eq!(c_escape(b""), "");
    }
}
