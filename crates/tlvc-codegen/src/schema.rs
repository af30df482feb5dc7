//! The resolved schema tree consumed by the generator.
//!
//! This is the input contract: an immutable, already-validated tree produced
//! by an external schema resolver. Validation (unique tags, resolved type
//! references, no cycles through non-optional fields) happens upstream and is
//! never repeated here; the generator only fails fast on states a valid
//! schema cannot produce.

/// Logical type of a field.
///
/// Enum and message kinds carry the fully-qualified name of the referenced
/// type (e.g. `"demo.Person"`), which the resolver guarantees to exist.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Int32,
    Uint32,
    Int64,
    Uint64,
    Float,
    Double,
    Bool,
    String,
    Bytes,
    Enum(String),
    Message(String),
}

/// How many values a field may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Singular,
    Repeated,
}

/// A schema-declared default value.
///
/// The variant must agree with the field's [`FieldKind`]; the resolver
/// guarantees this. `EnumValue` names an enumerator of the referenced enum
/// type. Message-typed fields can never declare defaults.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    String(String),
    Bytes(Vec<u8>),
    EnumValue(String),
}

/// A single field declaration.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    /// The positive wire tag, unique across the whole message (including
    /// fields of all oneof groups).
    pub tag: u32,
    pub kind: FieldKind,
    pub cardinality: Cardinality,
    pub default: Option<DefaultValue>,
    /// Index into [`Message::oneofs`] when this field is a oneof member.
    pub oneof: Option<usize>,
}

impl Field {
    pub fn new(name: impl Into<String>, tag: u32, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            tag,
            kind,
            cardinality: Cardinality::Singular,
            default: None,
            oneof: None,
        }
    }

    pub fn repeated(mut self) -> Self {
        self.cardinality = Cardinality::Repeated;
        self
    }

    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    pub fn in_oneof(mut self, group: usize) -> Self {
        self.oneof = Some(group);
        self
    }

    pub fn is_repeated(&self) -> bool {
        self.cardinality == Cardinality::Repeated
    }
}

/// A group of mutually-exclusive fields.
///
/// Membership is recorded on the fields themselves ([`Field::oneof`]); the
/// group carries only its name. At most one member is populated at a time.
#[derive(Debug, Clone)]
pub struct OneofGroup {
    pub name: String,
}

impl OneofGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// An enumeration: ordered (name, value) pairs.
#[derive(Debug, Clone)]
pub struct Enum {
    pub name: String,
    /// Fully-qualified name, e.g. `"demo.Color"`.
    pub full_name: String,
    pub values: Vec<(String, i32)>,
}

impl Enum {
    pub fn new(full_name: impl Into<String>, values: Vec<(String, i32)>) -> Self {
        let full_name = full_name.into();
        let name = full_name.rsplit('.').next().unwrap_or(&full_name).to_string();
        Self {
            name,
            full_name,
            values,
        }
    }
}

/// A message type: ordered fields, nested types, and oneof groups.
#[derive(Debug, Clone)]
pub struct Message {
    pub name: String,
    /// Fully-qualified name, e.g. `"demo.Person"`.
    pub full_name: String,
    pub fields: Vec<Field>,
    pub nested: Vec<Message>,
    pub enums: Vec<Enum>,
    pub oneofs: Vec<OneofGroup>,
}

impl Message {
    pub fn new(full_name: impl Into<String>) -> Self {
        let full_name = full_name.into();
        let name = full_name.rsplit('.').next().unwrap_or(&full_name).to_string();
        Self {
            name,
            full_name,
            fields: Vec::new(),
            nested: Vec::new(),
            enums: Vec::new(),
            oneofs: Vec::new(),
        }
    }

    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_nested(mut self, nested: Vec<Message>) -> Self {
        self.nested = nested;
        self
    }

    pub fn with_enums(mut self, enums: Vec<Enum>) -> Self {
        self.enums = enums;
        self
    }

    pub fn with_oneofs(mut self, oneofs: Vec<OneofGroup>) -> Self {
        self.oneofs = oneofs;
        self
    }

    /// Declaration-ordered member fields of the given oneof group.
    pub fn oneof_members(&self, group: usize) -> impl Iterator<Item = (usize, &Field)> {
        self.fields
            .iter()
            .enumerate()
            .filter(move |(_, f)| f.oneof == Some(group))
    }
}

/// One input schema file: the unit of generation.
#[derive(Debug, Clone)]
pub struct FileSchema {
    /// The schema file name, e.g. `"contact.proto"`. Drives artifact names.
    pub name: String,
    pub package: String,
    pub messages: Vec<Message>,
    pub enums: Vec<Enum>,
    /// Names of imported schema files, emitted as dependency includes.
    pub dependencies: Vec<String>,
    /// Size-reduced mode: drop the name index and reflection strings from
    /// the emitted descriptors. A generation-time switch, not a runtime one.
    pub code_size: bool,
}

impl FileSchema {
    pub fn new(name: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
            messages: Vec::new(),
            enums: Vec::new(),
            dependencies: Vec::new(),
            code_size: false,
        }
    }

    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    pub fn with_enums(mut self, enums: Vec<Enum>) -> Self {
        self.enums = enums;
        self
    }

    pub fn with_dependencies(mut self, deps: Vec<String>) -> Self {
        self.dependencies = deps;
        self
    }

    pub fn optimize_code_size(mut self, enabled: bool) -> Self {
        self.code_size = enabled;
        self
    }
}
