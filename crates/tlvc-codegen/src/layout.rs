//! Storage layout derivation for message types.
//!
//! Each message becomes one C struct: a runtime base member, a self anchor
//! (used when the message is itself an element of a parent's repeated
//! field), then one slot per plain field in declaration order, with each
//! oneof group contributing a discriminant + union pair at the position of
//! its first-declared member. The layout is a pure value computed once per
//! message; the emitter renders it, and the descriptor builder indexes into
//! it by member name.

use crate::defaults;
use crate::error::{Error, Result};
use crate::names::{type_ident, type_ident_upper};
use crate::schema::{Field, FieldKind, Message};
use heck::ToShoutySnakeCase;

/// Element type of a value slot or counted array.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueType {
    Int32,
    Uint32,
    Int64,
    Uint64,
    Float,
    Double,
    Bool,
    String,
    Bytes,
    /// Enum value slot; carries the C identifier of the referenced enum.
    Enum(String),
}

impl ValueType {
    /// The C type of a single value of this kind.
    pub fn c_type(&self) -> String {
        match self {
            ValueType::Int32 => "int32_t".to_string(),
            ValueType::Uint32 => "uint32_t".to_string(),
            ValueType::Int64 => "int64_t".to_string(),
            ValueType::Uint64 => "uint64_t".to_string(),
            ValueType::Float => "float".to_string(),
            ValueType::Double => "double".to_string(),
            ValueType::Bool => "tlvc_boolean".to_string(),
            ValueType::String => "char *".to_string(),
            ValueType::Bytes => "TlvcBinaryData".to_string(),
            ValueType::Enum(ident) => format!("{}_t", ident),
        }
    }

    fn from_value_kind(kind: &FieldKind) -> ValueType {
        match kind {
            FieldKind::Int32 => ValueType::Int32,
            FieldKind::Uint32 => ValueType::Uint32,
            FieldKind::Int64 => ValueType::Int64,
            FieldKind::Uint64 => ValueType::Uint64,
            FieldKind::Float => ValueType::Float,
            FieldKind::Double => ValueType::Double,
            FieldKind::Bool => ValueType::Bool,
            FieldKind::String => ValueType::String,
            FieldKind::Bytes => ValueType::Bytes,
            FieldKind::Enum(full) => ValueType::Enum(type_ident(full)),
            // Message kinds are dispatched to pointer shapes before this
            // is reached.
            FieldKind::Message(_) => unreachable!("message kinds have no value slot"),
        }
    }
}

/// The storage shape of one field.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotShape {
    /// One value slot (scalars, enums, strings, bytes).
    Value(ValueType),
    /// Nullable owned pointer for singular message fields; never allocated
    /// until written.
    OwnedOptional { type_ident: String },
    /// Count plus pointer to contiguous elements, for repeated
    /// scalars/enums/strings/bytes.
    CountedArray(ValueType),
    /// Count, pointer array of individually-owned elements, and an
    /// intrusive append anchor so a decoder can accumulate elements in
    /// arrival order before the array is materialized.
    CountedArrayWithAnchor { type_ident: String },
}

impl SlotShape {
    /// Derive the shape from a field's kind and cardinality.
    pub fn compile(field: &Field) -> SlotShape {
        match (&field.kind, field.is_repeated()) {
            (FieldKind::Message(full), false) => SlotShape::OwnedOptional {
                type_ident: type_ident(full),
            },
            (FieldKind::Message(full), true) => SlotShape::CountedArrayWithAnchor {
                type_ident: type_ident(full),
            },
            (kind, false) => SlotShape::Value(ValueType::from_value_kind(kind)),
            (kind, true) => SlotShape::CountedArray(ValueType::from_value_kind(kind)),
        }
    }

    /// C member declarations for a field of this shape.
    pub fn member_decls(&self, name: &str) -> Vec<String> {
        match self {
            SlotShape::Value(vt) => vec![format!("{}{}{};", vt.c_type(), sep(&vt.c_type()), name)],
            SlotShape::OwnedOptional { type_ident } => {
                vec![format!("{}_t *{};", type_ident, name)]
            }
            SlotShape::CountedArray(vt) => vec![
                format!("size_t n_{};", name),
                format!("{}{}*{};", vt.c_type(), sep(&vt.c_type()), name),
            ],
            SlotShape::CountedArrayWithAnchor { type_ident } => vec![
                format!("size_t n_{};", name),
                format!("{}_t **{};", type_ident, name),
                format!("list_head_t l_{};", name),
            ],
        }
    }

    /// Shape-specific zero value for the `_INIT` macro.
    pub fn zero_init(&self) -> &'static str {
        match self {
            SlotShape::Value(ValueType::String) => "NULL",
            SlotShape::Value(ValueType::Bytes) => "{0, NULL}",
            SlotShape::Value(_) => "0",
            SlotShape::OwnedOptional { .. } => "NULL",
            SlotShape::CountedArray(_) => "0, NULL",
            SlotShape::CountedArrayWithAnchor { .. } => "0, NULL, {NULL, NULL}",
        }
    }
}

// "char *" already ends with the pointer star; plain types need a space.
fn sep(c_type: &str) -> &'static str {
    if c_type.ends_with('*') {
        ""
    } else {
        " "
    }
}

/// One field's slot in the layout.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSlot {
    /// Declaration index into [`Message::fields`].
    pub index: usize,
    pub name: String,
    pub shape: SlotShape,
}

/// The discriminant enumeration for a oneof group.
///
/// `NOT_SET` is always 0; each member case carries the member's tag number
/// so the discriminant doubles as a wire-tag hint.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscriminantEnum {
    /// C typedef name, `{msg_ident}_{group}_case_t`.
    pub type_name: String,
    /// Enumerator prefix, `{MSG_IDENT}_{GROUP}`.
    pub prefix: String,
    /// (MEMBER, tag) pairs in declaration order.
    pub cases: Vec<(String, u32)>,
}

impl DiscriminantEnum {
    pub fn not_set(&self) -> String {
        format!("{}_NOT_SET", self.prefix)
    }

    pub fn case_name(&self, member: &str) -> String {
        format!("{}_{}", self.prefix, member)
    }
}

/// A compiled oneof group: discriminant slot plus overlapping storage.
#[derive(Debug, Clone, PartialEq)]
pub struct OneofSlot {
    pub name: String,
    /// The discriminant member, `{group}_case`.
    pub case_member: String,
    pub discriminant: DiscriminantEnum,
    pub members: Vec<FieldSlot>,
}

/// One ordered slot of a struct layout.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutSlot {
    Field(FieldSlot),
    Oneof(OneofSlot),
}

/// The complete storage layout of one message type.
///
/// Every layout implicitly starts with the runtime base member and the
/// embedded self anchor; `slots` covers the declared fields.
#[derive(Debug, Clone, PartialEq)]
pub struct StructLayout {
    /// Lowercase C identifier of the message type.
    pub type_ident: String,
    pub slots: Vec<LayoutSlot>,
}

/// Compile one oneof group into its discriminant enum and member slots.
///
/// Repeated fields cannot be oneof members; the upstream resolver
/// guarantees this, so hitting one is an internal invariant violation.
pub fn compile_oneof(message: &Message, group: usize) -> Result<OneofSlot> {
    let group_name = &message.oneofs[group].name;
    let msg_ident = type_ident(&message.full_name);
    let discriminant_prefix = format!(
        "{}_{}",
        type_ident_upper(&message.full_name),
        group_name.to_shouty_snake_case()
    );

    let mut cases = Vec::new();
    let mut members = Vec::new();
    for (index, field) in message.oneof_members(group) {
        if field.is_repeated() {
            return Err(Error::Invariant(format!(
                "repeated field '{}' cannot be a member of oneof '{}'",
                field.name, group_name
            )));
        }
        cases.push((field.name.to_shouty_snake_case(), field.tag));
        members.push(FieldSlot {
            index,
            name: field.name.clone(),
            shape: SlotShape::compile(field),
        });
    }

    Ok(OneofSlot {
        name: group_name.clone(),
        case_member: format!("{}_case", group_name),
        discriminant: DiscriminantEnum {
            type_name: format!("{}_{}_case_t", msg_ident, group_name),
            prefix: discriminant_prefix,
            cases,
        },
        members,
    })
}

/// Assemble the ordered layout for one message.
///
/// Plain fields keep declaration order; each oneof group is inserted once,
/// at the position of its first-declared member.
pub fn assemble(message: &Message) -> Result<StructLayout> {
    let mut slots = Vec::new();
    let mut oneof_done = vec![false; message.oneofs.len()];

    for (index, field) in message.fields.iter().enumerate() {
        match field.oneof {
            Some(group) => {
                if !oneof_done[group] {
                    oneof_done[group] = true;
                    slots.push(LayoutSlot::Oneof(compile_oneof(message, group)?));
                }
            }
            None => slots.push(LayoutSlot::Field(FieldSlot {
                index,
                name: field.name.clone(),
                shape: SlotShape::compile(field),
            })),
        }
    }

    Ok(StructLayout {
        type_ident: type_ident(&message.full_name),
        slots,
    })
}

/// The comma-separated member initializers of the `_INIT` macro, covering
/// everything after the runtime base: self anchor, then one initializer per
/// slot in layout order. Plain fields take the renderer output or their
/// shape zero; each oneof pair takes `NOT_SET` plus a zeroed union.
pub fn default_init(message: &Message, layout: &StructLayout) -> Result<String> {
    let msg_ident = &layout.type_ident;
    let mut parts = vec!["{NULL, NULL}".to_string()];

    for slot in &layout.slots {
        match slot {
            LayoutSlot::Field(fs) => {
                let field = &message.fields[fs.index];
                if field.default.is_some() {
                    parts.push(defaults::init_literal(msg_ident, field)?);
                } else {
                    parts.push(fs.shape.zero_init().to_string());
                }
            }
            LayoutSlot::Oneof(oneof) => {
                parts.push(oneof.discriminant.not_set());
                parts.push("{0}".to_string());
            }
        }
    }

    Ok(parts.join(", "))
}
