//! Per-file artifact emission.
//!
//! A [`FileGenerator`] turns one schema file into two text artifacts: the
//! declarations header (types, case enums, extern descriptors, function
//! prototypes) and the definitions source (initializer constants, the
//! descriptor tables, helper bodies). Messages are visited depth-first,
//! nested types before enclosing types, so every emitted layout can refer
//! to already-emitted nested types by name. Generation is a pure function
//! of the schema tree; running it twice yields byte-identical output.

use std::fs;
use std::path::Path;

use heck::ToShoutySnakeCase;

use crate::defaults;
use crate::descriptor;
use crate::error::{Error, Result};
use crate::layout::{self, LayoutSlot};
use crate::names::{guard_ident, strip_extension, type_ident, type_ident_upper};
use crate::schema::{Enum, FileSchema, Message};

/// Prefix for generated artifact file names.
pub const FILE_PREFIX: &str = "tlvc_";

/// Version stamp of this compiler, embedded in the header compatibility
/// check.
pub const VERSION_NUMBER: u32 = 1_000_002;

/// Oldest runtime header version the generated code accepts.
const MIN_HEADER_VERSION: u32 = 1_000_000;

/// Recognized generator options.
///
/// The only option is `dllexport_decl`, a symbol-visibility prefix applied
/// to exported declarations when the generated code is built into a shared
/// library. Any other option name is a configuration error and aborts the
/// invocation before any artifact is written.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub dllexport_decl: Option<String>,
}

impl Options {
    /// Parse a comma-delimited `name=value` option string, e.g.
    /// `"dllexport_decl=FOO_EXPORT"`.
    pub fn parse(text: &str) -> Result<Options> {
        let mut options = Options::default();
        if text.is_empty() {
            return Ok(options);
        }
        for part in text.split(',') {
            let (name, value) = match part.find('=') {
                Some(pos) => (&part[..pos], &part[pos + 1..]),
                None => (part, ""),
            };
            match name {
                "dllexport_decl" => options.dllexport_decl = Some(value.to_string()),
                _ => return Err(Error::UnknownOption(name.to_string())),
            }
        }
        Ok(options)
    }
}

/// Parse options, generate both artifacts, and write them to `out_dir`.
///
/// A configuration error aborts before any file is opened; an invariant
/// violation aborts before any file is written.
pub fn generate(file: &FileSchema, options: &str, out_dir: impl AsRef<Path>) -> Result<()> {
    let options = Options::parse(options)?;
    FileGenerator::new(file, options).write_to_dir(out_dir)
}

/// Generator for one schema file.
#[derive(Debug)]
pub struct FileGenerator<'a> {
    file: &'a FileSchema,
    options: Options,
}

impl<'a> FileGenerator<'a> {
    pub fn new(file: &'a FileSchema, options: Options) -> Self {
        Self { file, options }
    }

    /// Base name of the emitted artifacts, e.g. `"tlvc_contact"` for
    /// `contact.proto`.
    pub fn base_name(&self) -> String {
        format!("{}{}", FILE_PREFIX, strip_extension(&self.file.name))
    }

    fn export(&self) -> String {
        match &self.options.dllexport_decl {
            Some(decl) => format!("{} ", decl),
            None => String::new(),
        }
    }

    /// Generate both artifacts and write `<base>.h` / `<base>.c` into
    /// `dir`. Both strings are generated before either file is opened, so
    /// a failed generation leaves no partial output behind.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<()> {
        let header = self.generate_header()?;
        let source = self.generate_source()?;
        let dir = dir.as_ref();
        fs::write(dir.join(format!("{}.h", self.base_name())), header)?;
        fs::write(dir.join(format!("{}.c", self.base_name())), source)?;
        Ok(())
    }

    /// Generate the declarations artifact.
    pub fn generate_header(&self) -> Result<String> {
        let mut out = String::new();
        let guard = format!("TLVC_{}_INCLUDED", guard_ident(&self.file.name));

        out.push_str("/* Generated by the TLV schema compiler.  DO NOT EDIT! */\n");
        out.push_str(&format!("/* Generated from: {} */\n\n", self.file.name));
        out.push_str(&format!("#ifndef {}\n#define {}\n\n", guard, guard));
        out.push_str("#include <stdlib.h>\n#include <tlvc.h>\n#include <ulist.h>\n\n");
        out.push_str("TLVC__BEGIN_DECLS\n\n");

        out.push_str(&format!(
            "#if TLVC_VERSION_NUMBER < {}\n\
             # error This file was generated by a newer version of the schema compiler which is incompatible with your tlvc headers. Please update your headers.\n\
             #elif {} < TLVC_MIN_COMPILER_VERSION\n\
             # error This file was generated by an older version of the schema compiler which is incompatible with your tlvc headers. Please regenerate this file with a newer version of the compiler.\n\
             #endif\n\n",
            MIN_HEADER_VERSION, VERSION_NUMBER
        ));

        for dep in &self.file.dependencies {
            out.push_str(&format!(
                "#include \"{}{}.h\"\n",
                FILE_PREFIX,
                strip_extension(dep)
            ));
        }
        if !self.file.dependencies.is_empty() {
            out.push('\n');
        }

        out.push_str(&format!("// Package: {}\n", self.file.package));

        out.push_str("\n/* --- enums --- */\n\n");
        for message in &self.file.messages {
            self.emit_message_enums(&mut out, message);
        }
        for en in &self.file.enums {
            self.emit_enum_definition(&mut out, en);
        }

        out.push_str("\n/* --- messages --- */\n\n");
        for message in &self.file.messages {
            self.emit_struct_definition(&mut out, message)?;
        }

        for message in &self.file.messages {
            self.emit_helper_declarations(&mut out, message, false);
        }

        out.push_str("/* --- per-message closures --- */\n\n");
        for message in &self.file.messages {
            self.emit_closure_typedefs(&mut out, message);
        }

        out.push_str("\n/* --- descriptors --- */\n\n");
        for en in &self.file.enums {
            self.emit_enum_descriptor_declaration(&mut out, en);
        }
        for message in &self.file.messages {
            self.emit_descriptor_declarations(&mut out, message);
        }

        out.push_str(&format!("\nTLVC__END_DECLS\n\n\n#endif  /* {} */\n", guard));
        Ok(out)
    }

    fn emit_enum_definition(&self, out: &mut String, en: &Enum) {
        let ident = type_ident(&en.full_name);
        let upper = type_ident_upper(&en.full_name);

        out.push_str("typedef enum {\n");
        let values: Vec<String> = en
            .values
            .iter()
            .map(|(name, value)| format!("  {}_{} = {}", upper, name.to_shouty_snake_case(), value))
            .collect();
        out.push_str(&values.join(",\n"));
        out.push('\n');
        out.push_str(&format!("  TLVC__FORCE_ENUM_TO_BE_INT_SIZE({})\n", upper));
        out.push_str(&format!("}} {}_t;\n\n", ident));
    }

    fn emit_message_enums(&self, out: &mut String, message: &Message) {
        for nested in &message.nested {
            self.emit_message_enums(out, nested);
        }
        for en in &message.enums {
            self.emit_enum_definition(out, en);
        }
    }

    fn emit_struct_definition(&self, out: &mut String, message: &Message) -> Result<()> {
        for nested in &message.nested {
            self.emit_struct_definition(out, nested)?;
        }

        let layout = layout::assemble(message)?;
        let ident = &layout.type_ident;
        let upper = type_ident_upper(&message.full_name);

        // Case enums for the unions.
        for slot in &layout.slots {
            if let LayoutSlot::Oneof(oneof) = slot {
                out.push_str("typedef enum {\n");
                out.push_str(&format!("  {} = 0,\n", oneof.discriminant.not_set()));
                let cases: Vec<String> = oneof
                    .discriminant
                    .cases
                    .iter()
                    .map(|(member, tag)| {
                        format!("  {} = {}", oneof.discriminant.case_name(member), tag)
                    })
                    .collect();
                out.push_str(&cases.join(",\n"));
                out.push('\n');
                out.push_str(&format!(
                    "  TLVC__FORCE_ENUM_TO_BE_INT_SIZE({})\n",
                    oneof.discriminant.prefix
                ));
                out.push_str(&format!("}} {};\n\n", oneof.discriminant.type_name));
            }
        }

        out.push_str(&format!("typedef struct {}_s {{\n", ident));
        out.push_str("  TlvcMessage base;\n");
        out.push_str("  list_head_t anchor;\n\n");
        for slot in &layout.slots {
            match slot {
                LayoutSlot::Field(fs) => {
                    for decl in fs.shape.member_decls(&fs.name) {
                        out.push_str(&format!("  {}\n", decl));
                    }
                }
                LayoutSlot::Oneof(oneof) => {
                    out.push_str(&format!(
                        "  {} {};\n",
                        oneof.discriminant.type_name, oneof.case_member
                    ));
                    out.push_str("  union {\n");
                    for member in &oneof.members {
                        for decl in member.shape.member_decls(&member.name) {
                            out.push_str(&format!("    {}\n", decl));
                        }
                    }
                    out.push_str("  };\n");
                }
            }
        }
        out.push_str(&format!("}} {}_t;\n\n", ident));

        // String defaults are referenced from the _INIT macro, so their
        // symbols must be visible to every includer.
        for field in &message.fields {
            if field.default.is_some() {
                let constant = defaults::render(ident, field)?;
                if constant.needs_extern {
                    out.push_str(&format!("extern const char {}[];\n", constant.symbol));
                }
            }
        }

        let init = layout::default_init(message, &layout)?;
        out.push_str(&format!(
            "#define {}_INIT \\\n {{ TLVC_MESSAGE_INIT (&{}_descriptor) \\\n    , {} }}\n\n",
            upper, ident, init
        ));

        out.push_str(&format!(
            "#define {}_TYPE_NAME ((char *){}_descriptor.name)\n\n\n",
            upper, ident
        ));
        Ok(())
    }

    fn emit_helper_declarations(&self, out: &mut String, message: &Message, is_submessage: bool) {
        for nested in &message.nested {
            self.emit_helper_declarations(out, nested, true);
        }

        let ident = type_ident(&message.full_name);
        let export = self.export();
        out.push_str(&format!("/* {}_t methods */\n", ident));
        out.push_str(&format!(
            "{}void   {}_init({}_t *message);\n",
            export, ident, ident
        ));
        out.push_str(&format!("{}{}_t *{}_new(void);\n", export, ident, ident));
        out.push_str(&format!(
            "{}{}_t **{}_repeated_new(uint32_t cnt);\n",
            export, ident, ident
        ));
        if !is_submessage {
            out.push_str(&format!(
                "{}size_t {}_get_packed_size(const {}_t *message);\n",
                export, ident, ident
            ));
            out.push_str(&format!(
                "{}size_t {}_pack(const {}_t *message, uint8_t *out);\n",
                export, ident, ident
            ));
            out.push_str(&format!(
                "{}size_t {}_pack_to_buffer(const {}_t *message, TlvcBuffer *buffer);\n",
                export, ident, ident
            ));
            out.push_str(&format!(
                "{}{}_t *{}_unpack(TlvcAllocator *allocator, size_t len, const uint8_t *data);\n",
                export, ident, ident
            ));
            out.push_str(&format!(
                "{}void   {}_free_unpacked({}_t *message, TlvcAllocator *allocator);\n",
                export, ident, ident
            ));
        }
        out.push('\n');
    }

    fn emit_closure_typedefs(&self, out: &mut String, message: &Message) {
        for nested in &message.nested {
            self.emit_closure_typedefs(out, nested);
        }
        let ident = type_ident(&message.full_name);
        out.push_str(&format!(
            "typedef void (*{}_closure)(const {}_t *message, void *closure_data);\n",
            ident, ident
        ));
    }

    fn emit_enum_descriptor_declaration(&self, out: &mut String, en: &Enum) {
        out.push_str(&format!(
            "{}extern const TlvcEnumDescriptor {}_descriptor;\n",
            self.export(),
            type_ident(&en.full_name)
        ));
    }

    fn emit_descriptor_declarations(&self, out: &mut String, message: &Message) {
        out.push_str(&format!(
            "{}extern const TlvcMessageDescriptor {}_descriptor;\n",
            self.export(),
            type_ident(&message.full_name)
        ));
        for nested in &message.nested {
            self.emit_descriptor_declarations(out, nested);
        }
        for en in &message.enums {
            self.emit_enum_descriptor_declaration(out, en);
        }
    }

    /// Generate the definitions artifact.
    pub fn generate_source(&self) -> Result<String> {
        let mut out = String::new();

        out.push_str("/* Generated by the TLV schema compiler.  DO NOT EDIT! */\n");
        out.push_str(&format!("/* Generated from: {} */\n\n", self.file.name));
        out.push_str(&format!("#include \"{}.h\"\n\n\n", self.base_name()));

        for message in &self.file.messages {
            self.emit_helper_definitions(&mut out, message, false);
        }
        for message in &self.file.messages {
            self.emit_message_descriptor(&mut out, message)?;
        }
        for en in &self.file.enums {
            self.emit_enum_descriptor(&mut out, en);
        }
        Ok(out)
    }

    fn emit_helper_definitions(&self, out: &mut String, message: &Message, is_submessage: bool) {
        for nested in &message.nested {
            self.emit_helper_definitions(out, nested, true);
        }

        let ident = type_ident(&message.full_name);
        let upper = type_ident_upper(&message.full_name);

        out.push_str(&format!(
            "void {id}_init({id}_t *message)\n\
             {{\n\
             \x20 static {id}_t init_value = {up}_INIT;\n\
             \x20 *message = init_value;\n\
             \x20 INIT_LIST_HEAD((list_head_t *)&message->anchor);\n\
             }}\n\n",
            id = ident,
            up = upper
        ));
        out.push_str(&format!(
            "{id}_t *{id}_new(void)\n\
             {{\n\
             \x20 {id}_t *m = ({id}_t *)tlvc_message_alloc(\n\
             \x20                (TlvcMessageDescriptor *)&{id}_descriptor);\n\
             \x20 return m;\n\
             }}\n\n",
            id = ident
        ));
        out.push_str(&format!(
            "{id}_t **{id}_repeated_new(uint32_t cnt)\n\
             {{\n\
             \x20 {id}_t **rtmsg = ({id}_t **)malloc(sizeof({id}_t *) * cnt);\n\n\
             \x20 uint32_t i;\n\n\
             \x20 for (i = 0; i < cnt; i++) {{\n\
             \x20   rtmsg[i] = {id}_new();\n\
             \x20 }}\n\n\
             \x20 return rtmsg;\n\
             }}\n\n",
            id = ident
        ));

        if !is_submessage {
            out.push_str(&format!(
                "size_t {id}_get_packed_size(const {id}_t *message)\n\
                 {{\n\
                 \x20 assert(message->base.descriptor == &{id}_descriptor);\n\
                 \x20 return tlvc_message_get_packed_size((const TlvcMessage *)message);\n\
                 }}\n\n",
                id = ident
            ));
            out.push_str(&format!(
                "size_t {id}_pack(const {id}_t *message, uint8_t *out)\n\
                 {{\n\
                 \x20 assert(message->base.descriptor == &{id}_descriptor);\n\
                 \x20 return tlvc_message_pack((const TlvcMessage *)message, out);\n\
                 }}\n\n",
                id = ident
            ));
            out.push_str(&format!(
                "size_t {id}_pack_to_buffer(const {id}_t *message, TlvcBuffer *buffer)\n\
                 {{\n\
                 \x20 assert(message->base.descriptor == &{id}_descriptor);\n\
                 \x20 return tlvc_message_pack_to_buffer((const TlvcMessage *)message, buffer);\n\
                 }}\n\n",
                id = ident
            ));
            out.push_str(&format!(
                "{id}_t *{id}_unpack(TlvcAllocator *allocator, size_t len, const uint8_t *data)\n\
                 {{\n\
                 \x20 return ({id}_t *)tlvc_message_unpack(&{id}_descriptor, allocator, len, data);\n\
                 }}\n\n",
                id = ident
            ));
            out.push_str(&format!(
                "void {id}_free_unpacked({id}_t *message, TlvcAllocator *allocator)\n\
                 {{\n\
                 \x20 if (!message)\n\
                 \x20   return;\n\
                 \x20 assert(message->base.descriptor == &{id}_descriptor);\n\
                 \x20 tlvc_message_free_unpacked((TlvcMessage *)message, allocator);\n\
                 }}\n\n",
                id = ident
            ));
        }
    }

    fn emit_message_descriptor(&self, out: &mut String, message: &Message) -> Result<()> {
        for nested in &message.nested {
            self.emit_message_descriptor(out, nested)?;
        }
        for en in &message.enums {
            self.emit_enum_descriptor(out, en);
        }

        let ident = type_ident(&message.full_name);
        let code_size = self.file.code_size;

        for field in &message.fields {
            if field.default.is_some() {
                let constant = defaults::render(&ident, field)?;
                out.push_str(&format!("{}\n", constant.definition));
            }
        }

        let table = descriptor::build(message, code_size)?;
        let n_fields = table.fields.len();
        let n_ranges;

        if n_fields > 0 {
            out.push_str(&format!(
                "static const TlvcFieldDescriptor {}_field_descriptors[{}] = {{\n",
                ident, n_fields
            ));
            for fd in &table.fields {
                let quantifier = match &fd.quantifier_member {
                    Some(member) => format!("offsetof({}_t, {})", ident, member),
                    None => "0".to_string(),
                };
                let sub = match &fd.sub_descriptor {
                    Some(symbol) => format!("&{}", symbol),
                    None => "NULL".to_string(),
                };
                let default_ref = fd.default_ref.as_deref().unwrap_or("NULL");
                let flags = if fd.oneof { "TLVC_FIELD_FLAG_ONEOF" } else { "0" };
                out.push_str(&format!(
                    "  {{\n\
                     \x20   \"{name}\",\n\
                     \x20   {tag},\n\
                     \x20   {label},\n\
                     \x20   {kind},\n\
                     \x20   {quantifier},   /* quantifier_offset */\n\
                     \x20   offsetof({id}_t, {member}),\n\
                     \x20   {sub},\n\
                     \x20   {default_ref},\n\
                     \x20   {flags},             /* flags */\n\
                     \x20   0, NULL, NULL    /* reserved1, reserved2, reserved3 */\n\
                     \x20 }},\n",
                    name = fd.name,
                    tag = fd.tag,
                    label = fd.label.c_macro(),
                    kind = fd.kind,
                    quantifier = quantifier,
                    id = ident,
                    member = fd.member,
                    sub = sub,
                    default_ref = default_ref,
                    flags = flags,
                ));
            }
            out.push_str("};\n");

            if let Some(name_index) = &table.name_index {
                out.push_str(&format!(
                    "static const unsigned {}_field_indices_by_name[] = {{\n",
                    ident
                ));
                for entry in name_index {
                    out.push_str(&format!(
                        "  {},   /* field[{}] = {} */\n",
                        entry.index, entry.index, entry.name
                    ));
                }
                out.push_str("};\n");
            }

            n_ranges = table.ranges.len();
            out.push_str(&format!(
                "static const TlvcIntRange {}_number_ranges[{} + 1] = {{\n",
                ident, n_ranges
            ));
            for range in &table.ranges {
                out.push_str(&format!(
                    "  {{ {}, {} }},\n",
                    range.start_tag, range.first_index
                ));
            }
            out.push_str(&format!("  {{ 0, {} }}\n}};\n", n_fields));
        } else {
            // Zero-size arrays and empty initializer lists are not
            // portable, so an empty message gets NULL placeholders.
            n_ranges = 0;
            out.push_str(&format!(
                "#define {id}_field_descriptors NULL\n\
                 #define {id}_field_indices_by_name NULL\n\
                 #define {id}_number_ranges NULL\n",
                id = ident
            ));
        }

        out.push_str(&format!(
            "const TlvcMessageDescriptor {}_descriptor = {{\n  TLVC__MESSAGE_DESCRIPTOR_MAGIC,\n",
            ident
        ));
        if code_size {
            out.push_str("  NULL, NULL, NULL, NULL, /* CODE_SIZE */\n");
        } else {
            out.push_str(&format!(
                "  \"{}\",\n  \"{}\",\n  \"{}_t\",\n  \"{}\",\n",
                message.full_name, message.name, ident, self.file.package
            ));
        }
        out.push_str(&format!(
            "  sizeof({}_t),\n  {},\n  {}_field_descriptors,\n",
            ident, n_fields, ident
        ));
        if code_size {
            out.push_str("  NULL, /* CODE_SIZE */\n");
        } else {
            out.push_str(&format!("  {}_field_indices_by_name,\n", ident));
        }
        out.push_str(&format!(
            "  {},  {}_number_ranges,\n  (TlvcMessageInit) {}_init,\n  NULL, NULL, NULL    /* reserved[123] */\n}};\n\n",
            n_ranges, ident, ident
        ));
        Ok(())
    }

    fn emit_enum_descriptor(&self, out: &mut String, en: &Enum) {
        let ident = type_ident(&en.full_name);
        let upper = type_ident_upper(&en.full_name);
        let code_size = self.file.code_size;

        let mut by_number: Vec<(usize, &(String, i32))> = en.values.iter().enumerate().collect();
        by_number.sort_by_key(|(_, (_, value))| *value);

        out.push_str(&format!(
            "static const TlvcEnumValue {}_enum_values_by_number[{}] = {{\n",
            ident,
            by_number.len()
        ));
        for (_, (name, value)) in &by_number {
            out.push_str(&format!(
                "  {{ \"{}\", \"{}_{}\", {} }},\n",
                name,
                upper,
                name.to_shouty_snake_case(),
                value
            ));
        }
        out.push_str("};\n");

        if !code_size {
            let mut by_name: Vec<(usize, &str)> = by_number
                .iter()
                .enumerate()
                .map(|(pos, (_, (name, _)))| (pos, name.as_str()))
                .collect();
            by_name.sort_by_key(|(_, name)| *name);
            out.push_str(&format!(
                "static const TlvcEnumValueIndex {}_enum_values_by_name[{}] = {{\n",
                ident,
                by_name.len()
            ));
            for (pos, name) in &by_name {
                out.push_str(&format!("  {{ \"{}\", {} }},\n", name, pos));
            }
            out.push_str("};\n");
        }

        out.push_str(&format!(
            "const TlvcEnumDescriptor {}_descriptor = {{\n  TLVC__ENUM_DESCRIPTOR_MAGIC,\n",
            ident
        ));
        if code_size {
            out.push_str("  NULL, NULL, NULL, NULL, /* CODE_SIZE */\n");
        } else {
            out.push_str(&format!(
                "  \"{}\",\n  \"{}\",\n  \"{}_t\",\n  \"{}\",\n",
                en.full_name, en.name, ident, self.file.package
            ));
        }
        out.push_str(&format!(
            "  {},\n  {}_enum_values_by_number,\n",
            by_number.len(),
            ident
        ));
        if code_size {
            out.push_str("  0, NULL, /* CODE_SIZE */\n");
        } else {
            out.push_str(&format!(
                "  {},\n  {}_enum_values_by_name,\n",
                en.values.len(),
                ident
            ));
        }
        out.push_str("  NULL, NULL, NULL, NULL    /* reserved[1234] */\n};\n\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Cardinality, DefaultValue, Field, FieldKind, OneofGroup};
    use pretty_assertions::assert_eq;

    fn contact_file() -> FileSchema {
        let item = Message::new("demo.Item")
            .with_fields(vec![Field::new("id", 1, FieldKind::Uint32)]);
        let person = Message::new("demo.Person")
            .with_oneofs(vec![OneofGroup::new("contact")])
            .with_fields(vec![
                Field::new("name", 1, FieldKind::String),
                Field::new("age", 2, FieldKind::Int32).with_default(DefaultValue::Int(42)),
                Field::new("email", 3, FieldKind::String).in_oneof(0),
                Field::new("phone", 7, FieldKind::String).in_oneof(0),
                Field::new("items", 8, FieldKind::Message("demo.Item".into())).repeated(),
            ])
            .with_nested(vec![item]);
        FileSchema::new("contact.proto", "demo").with_messages(vec![person])
    }

    #[test]
    fn unknown_option_is_configuration_error() {
        assert!(matches!(
            Options::parse("foo=bar"),
            Err(Error::UnknownOption(name)) if name == "foo"
        ));
        assert!(matches!(
            Options::parse("dllexport_decl=X,unknown"),
            Err(Error::UnknownOption(_))
        ));
    }

    #[test]
    fn dllexport_option_is_recognized() {
        let options = Options::parse("dllexport_decl=DEMO_EXPORT").unwrap();
        assert_eq!(options.dllexport_decl.as_deref(), Some("DEMO_EXPORT"));
        assert!(Options::parse("").unwrap().dllexport_decl.is_none());
    }

    #[test]
    fn unknown_option_aborts_before_any_artifact() {
        let file = contact_file();
        let dir = tempfile::tempdir().unwrap();
        assert!(generate(&file, "foo=bar", dir.path()).is_err());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn write_to_dir_emits_both_artifacts() {
        let file = contact_file();
        let dir = tempfile::tempdir().unwrap();
        generate(&file, "", dir.path()).unwrap();
        assert!(dir.path().join("tlvc_contact.h").exists());
        assert!(dir.path().join("tlvc_contact.c").exists());
    }

    #[test]
    fn generation_is_deterministic() {
        let file = contact_file();
        let generator = FileGenerator::new(&file, Options::default());
        assert_eq!(
            generator.generate_header().unwrap(),
            generator.generate_header().unwrap()
        );
        assert_eq!(
            generator.generate_source().unwrap(),
            generator.generate_source().unwrap()
        );
    }

    #[test]
    fn header_declares_struct_and_init() {
        let file = contact_file();
        let header = FileGenerator::new(&file, Options::default())
            .generate_header()
            .unwrap();

        assert!(header.contains("#ifndef TLVC_CONTACT_PROTO_INCLUDED"));
        assert!(header.contains("typedef struct demo_person_s {"));
        assert!(header.contains("  TlvcMessage base;\n  list_head_t anchor;\n"));
        // Nested type is laid out before the enclosing type.
        let item_pos = header.find("typedef struct demo_item_s").unwrap();
        let person_pos = header.find("typedef struct demo_person_s").unwrap();
        assert!(item_pos < person_pos);

        // Oneof case enum carries member tags.
        assert!(header.contains("DEMO_PERSON_CONTACT_NOT_SET = 0"));
        assert!(header.contains("DEMO_PERSON_CONTACT_EMAIL = 3"));
        assert!(header.contains("DEMO_PERSON_CONTACT_PHONE = 7"));

        // Repeated message field: count, pointer array, append anchor.
        assert!(header.contains("  size_t n_items;\n  demo_item_t **items;\n  list_head_t l_items;\n"));

        // Default-initializer: zeroes, renderer output, oneof {NOT_SET, 0}.
        assert!(header.contains(
            "#define DEMO_PERSON_INIT \\\n { TLVC_MESSAGE_INIT (&demo_person_descriptor) \\\n    , {NULL, NULL}, NULL, 42, DEMO_PERSON_CONTACT_NOT_SET, {0}, 0, NULL, {NULL, NULL} }"
        ));

        assert!(header.contains("extern const TlvcMessageDescriptor demo_person_descriptor;"));
        assert!(header.contains("demo_person_t *demo_person_unpack("));
        // Submessages get no pack/unpack wrappers.
        assert!(!header.contains("demo_item_unpack"));
    }

    #[test]
    fn source_emits_sorted_descriptors_and_ranges() {
        let file = contact_file();
        let source = FileGenerator::new(&file, Options::default())
            .generate_source()
            .unwrap();

        // Tag-sorted field order: name(1), age(2), email(3), phone(7), items(8).
        let positions: Vec<usize> = ["\"name\"", "\"age\"", "\"email\"", "\"phone\"", "\"items\""]
            .iter()
            .map(|n| source.find(*n).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));

        // Runs: [1..3] and [7..8].
        assert!(source.contains(
            "static const TlvcIntRange demo_person_number_ranges[2 + 1] = {\n  { 1, 0 },\n  { 7, 3 },\n  { 0, 5 }\n};"
        ));

        // Oneof members address the union and check the discriminant.
        assert!(source.contains("offsetof(demo_person_t, contact_case)"));
        assert!(source.contains("TLVC_FIELD_FLAG_ONEOF"));

        // Default constant and its descriptor reference.
        assert!(source.contains("static const int32_t demo_person_age_default_value = 42;"));
        assert!(source.contains("&demo_person_age_default_value"));

        // Descriptor struct of the nested type precedes the enclosing one.
        let item_desc = source.find("const TlvcMessageDescriptor demo_item_descriptor").unwrap();
        let person_desc = source
            .find("const TlvcMessageDescriptor demo_person_descriptor")
            .unwrap();
        assert!(item_desc < person_desc);
    }

    #[test]
    fn scenario_a_range_table() {
        let file = FileSchema::new("abc.proto", "demo").with_messages(vec![Message::new(
            "demo.M",
        )
        .with_fields(vec![
            Field::new("a", 1, FieldKind::Int32),
            Field::new("b", 5, FieldKind::String),
            Field::new("c", 2, FieldKind::Int32),
        ])]);
        let source = FileGenerator::new(&file, Options::default())
            .generate_source()
            .unwrap();
        assert!(source.contains(
            "static const TlvcIntRange demo_m_number_ranges[2 + 1] = {\n  { 1, 0 },\n  { 5, 2 },\n  { 0, 3 }\n};"
        ));
    }

    #[test]
    fn empty_message_gets_null_placeholders() {
        let file = FileSchema::new("empty.proto", "demo")
            .with_messages(vec![Message::new("demo.Empty")]);
        let source = FileGenerator::new(&file, Options::default())
            .generate_source()
            .unwrap();
        assert!(source.contains("#define demo_empty_field_descriptors NULL"));
        assert!(source.contains("#define demo_empty_number_ranges NULL"));
        assert!(source.contains("  0,  demo_empty_number_ranges,"));
    }

    #[test]
    fn code_size_mode_drops_reflection_names() {
        let file = contact_file().optimize_code_size(true);
        let source = FileGenerator::new(&file, Options::default())
            .generate_source()
            .unwrap();
        assert!(source.contains("  NULL, NULL, NULL, NULL, /* CODE_SIZE */"));
        assert!(source.contains("  NULL, /* CODE_SIZE */"));
        assert!(!source.contains("field_indices_by_name[]"));
        // Field descriptors and ranges are still emitted.
        assert!(source.contains("demo_person_field_descriptors[5]"));
        assert!(source.contains("demo_person_number_ranges[2 + 1]"));
    }

    #[test]
    fn dllexport_prefix_applies_to_exports() {
        let file = contact_file();
        let options = Options::parse("dllexport_decl=DEMO_EXPORT").unwrap();
        let header = FileGenerator::new(&file, options).generate_header().unwrap();
        assert!(header.contains("DEMO_EXPORT extern const TlvcMessageDescriptor demo_person_descriptor;"));
        assert!(header.contains("DEMO_EXPORT void   demo_person_init(demo_person_t *message);"));
    }

    #[test]
    fn enum_definition_and_descriptor() {
        let file = FileSchema::new("color.proto", "demo").with_enums(vec![Enum::new(
            "demo.Color",
            vec![("GREEN".into(), 1), ("RED".into(), 0)],
        )]);
        let generator = FileGenerator::new(&file, Options::default());

        let header = generator.generate_header().unwrap();
        assert!(header.contains("  DEMO_COLOR_GREEN = 1,\n  DEMO_COLOR_RED = 0\n"));
        assert!(header.contains("} demo_color_t;"));
        assert!(header.contains("extern const TlvcEnumDescriptor demo_color_descriptor;"));

        let source = generator.generate_source().unwrap();
        // Values sorted by number, names indexed into that order.
        assert!(source.contains(
            "  { \"RED\", \"DEMO_COLOR_RED\", 0 },\n  { \"GREEN\", \"DEMO_COLOR_GREEN\", 1 },"
        ));
        assert!(source.contains("  { \"GREEN\", 1 },\n  { \"RED\", 0 },"));
    }

    #[test]
    fn message_default_aborts_whole_file() {
        let file = FileSchema::new("bad.proto", "demo").with_messages(vec![Message::new(
            "demo.Bad",
        )
        .with_fields(vec![Field::new(
            "sub",
            1,
            FieldKind::Message("demo.Sub".into()),
        )
        .with_default(DefaultValue::Int(0))])]);
        let generator = FileGenerator::new(&file, Options::default());
        assert!(matches!(generator.generate_source(), Err(Error::Invariant(_))));

        let dir = tempfile::tempdir().unwrap();
        assert!(generator.write_to_dir(dir.path()).is_err());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn singular_field_is_optional_label() {
        let field = Field::new("a", 1, FieldKind::Int32);
        assert_eq!(field.cardinality, Cardinality::Singular);
        let file = FileSchema::new("x.proto", "demo")
            .with_messages(vec![Message::new("demo.X").with_fields(vec![field])]);
        let source = FileGenerator::new(&file, Options::default())
            .generate_source()
            .unwrap();
        assert!(source.contains("TLVC_LABEL_OPTIONAL"));
    }
}
