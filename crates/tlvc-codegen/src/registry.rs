//! The descriptor registry artifacts.
//!
//! Beyond the per-file header/source pair, an invocation covering several
//! schema files can emit one registry: an include aggregate (`.inc`) pulling
//! in every generated header, and an entry table fragment (`.desc`) mapping
//! lowercased fully-qualified type names to descriptor addresses. A host
//! program compiles the fragment into a lookup table and resolves record
//! type names against it at decode time.
//!
//! Lookup by the host is lenient: a record whose type name has no registry
//! entry is not an error, it simply stays undecoded. The registry therefore
//! never needs to be complete, only consistent.

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::generator::FILE_PREFIX;
use crate::names::{strip_extension, type_ident};
use crate::schema::{FileSchema, Message};

/// One registry entry: a record type name and its descriptor symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    /// Lowercased fully-qualified name, the decode-time lookup key.
    pub name: String,
    /// C symbol of the message descriptor.
    pub descriptor: String,
}

/// Accumulates entries across the schema files of one invocation.
#[derive(Debug, Default)]
pub struct DescRegistry {
    includes: Vec<String>,
    entries: Vec<RegistryEntry>,
}

impl DescRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    /// Record every message type of `file`, nested types included.
    pub fn add_file(&mut self, file: &FileSchema) {
        self.includes
            .push(format!("{}{}.h", FILE_PREFIX, strip_extension(&file.name)));
        for message in &file.messages {
            self.add_message(message);
        }
    }

    fn add_message(&mut self, message: &Message) {
        self.entries.push(RegistryEntry {
            name: message.full_name.to_lowercase(),
            descriptor: format!("{}_descriptor", type_ident(&message.full_name)),
        });
        for nested in &message.nested {
            self.add_message(nested);
        }
    }

    /// The include aggregate: one `#include` per registered header.
    pub fn generate_inc(&self) -> String {
        let mut out = String::new();
        out.push_str("/* Generated by the TLV schema compiler.  DO NOT EDIT! */\n\n");
        for include in &self.includes {
            out.push_str(&format!("#include \"{}\"\n", include));
        }
        out
    }

    /// The entry table fragment, spliced by the host into a braced
    /// initializer list.
    pub fn generate_desc(&self) -> String {
        let mut out = String::new();
        out.push_str("/* Generated by the TLV schema compiler.  DO NOT EDIT! */\n\n");
        for entry in &self.entries {
            out.push_str(&format!(
                "\t{{ \"{}\", &{} }},\n",
                entry.name, entry.descriptor
            ));
        }
        out
    }

    /// Write `<prefix>.inc` and `<prefix>.desc` into `dir`.
    ///
    /// An invocation with no message types writes nothing.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>, prefix: &str) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        let dir = dir.as_ref();
        fs::write(dir.join(format!("{}.inc", prefix)), self.generate_inc())?;
        fs::write(dir.join(format!("{}.desc", prefix)), self.generate_desc())?;
        Ok(())
    }
}
