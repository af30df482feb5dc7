//! Example crate demonstrating tlvc-codegen usage.
//!
//! This crate builds a small address-book schema covering the interesting
//! layout cases (nested messages, repeated fields, an enum, a oneof group,
//! declared defaults) and generates its C bindings. The schema tree is
//! constructed by hand here; a real deployment would feed the generator
//! from a schema resolver instead.

use tlvc_codegen::{
    DefaultValue, Enum, Field, FieldKind, FileSchema, Message, OneofGroup,
};

/// The address-book schema file.
pub fn address_book_schema() -> FileSchema {
    let phone_type = Enum::new(
        "demo.Person.PhoneType",
        vec![
            ("MOBILE".into(), 0),
            ("HOME".into(), 1),
            ("WORK".into(), 2),
        ],
    );

    let phone_number = Message::new("demo.Person.PhoneNumber").with_fields(vec![
        Field::new("number", 1, FieldKind::String),
        Field::new("type", 2, FieldKind::Enum("demo.Person.PhoneType".into()))
            .with_default(DefaultValue::EnumValue("HOME".into())),
    ]);

    let person = Message::new("demo.Person")
        .with_nested(vec![phone_number])
        .with_enums(vec![phone_type])
        .with_oneofs(vec![OneofGroup::new("avatar")])
        .with_fields(vec![
            Field::new("name", 1, FieldKind::String),
            Field::new("id", 2, FieldKind::Int32),
            Field::new("email", 3, FieldKind::String),
            Field::new("phones", 4, FieldKind::Message("demo.Person.PhoneNumber".into()))
                .repeated(),
            Field::new("age", 5, FieldKind::Int32).with_default(DefaultValue::Int(42)),
            Field::new("image_url", 7, FieldKind::String).in_oneof(0),
            Field::new("image_data", 8, FieldKind::Bytes).in_oneof(0),
        ]);

    let address_book = Message::new("demo.AddressBook").with_fields(vec![
        Field::new("people", 1, FieldKind::Message("demo.Person".into())).repeated(),
    ]);

    FileSchema::new("addressbook.proto", "demo").with_messages(vec![person, address_book])
}
