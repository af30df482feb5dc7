//! # tlvc-codegen
//!
//! C binding generator for TLV record schemas. From a resolved schema tree
//! this crate generates the C artifacts consumed by the generic `tlvc`
//! runtime: struct layouts, per-message reflection descriptor tables, and
//! an optional descriptor registry spanning an invocation.
//!
//! ## Features
//!
//! - C struct layouts for messages: scalars, strings, bytes, enums, nested
//!   and repeated messages, and oneof groups as tagged unions
//! - Tag-sorted field descriptor tables with a name index and a compressed
//!   tag-number range table for runtime field lookup
//! - `_INIT` initializer macros honoring schema-declared default values
//! - Per-message helper functions (init, alloc, pack/unpack wrappers)
//! - A cross-file descriptor registry (`.inc`/`.desc` pair) for decode-time
//!   lookup of descriptors by record type name
//! - A size-reduced mode that drops reflection strings and the name index
//!
//! ## Quick Start
//!
//! ```rust
//! use tlvc_codegen::{Field, FieldKind, FileGenerator, FileSchema, Message, Options};
//!
//! let file = FileSchema::new("contact.proto", "demo").with_messages(vec![
//!     Message::new("demo.Person").with_fields(vec![
//!         Field::new("name", 1, FieldKind::String),
//!         Field::new("age", 2, FieldKind::Int32),
//!     ]),
//! ]);
//!
//! let generator = FileGenerator::new(&file, Options::default());
//! let header = generator.generate_header().unwrap();
//! assert!(header.contains("typedef struct demo_person_s {"));
//! // Or write both artifacts:
//! // generator.write_to_dir("generated").unwrap();
//! ```
//!
//! The schema tree is assumed validated by an upstream resolver: tags are
//! unique and positive, type references resolve, and defaults match their
//! field kinds. The generator does not re-validate; it fails fast with an
//! [`Error::Invariant`] on states a valid schema cannot produce.

mod defaults;
mod descriptor;
mod error;
mod generator;
mod layout;
mod names;
pub mod registry;
mod schema;

pub use descriptor::{build as build_descriptor_table, DescriptorTable, FieldDescriptor, Label, NameIndexEntry, NumberRange};
pub use error::{Error, Result};
pub use generator::{generate, FileGenerator, Options, FILE_PREFIX, VERSION_NUMBER};
pub use layout::{assemble as assemble_layout, LayoutSlot, SlotShape, StructLayout, ValueType};
pub use schema::{
    Cardinality, DefaultValue, Enum, Field, FieldKind, FileSchema, Message, OneofGroup,
};
