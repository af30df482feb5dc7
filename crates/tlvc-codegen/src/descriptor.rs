//! Reflection descriptor tables for message types.
//!
//! Three per-message tables drive the generic runtime: the tag-sorted field
//! descriptor array, the name-sorted index into it, and the tag-number
//! range table that compresses maximal runs of consecutive tags so a
//! runtime can locate a field by tag with a binary search over runs instead
//! of over fields. All three are immutable values returned from
//! [`build`]; nothing here is shared or mutated after construction.

use crate::defaults;
use crate::error::Result;
use crate::names::type_ident;
use crate::schema::{Field, FieldKind, Message};

/// Wire cardinality label macro for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Optional,
    Repeated,
}

impl Label {
    pub fn c_macro(self) -> &'static str {
        match self {
            Label::Optional => "TLVC_LABEL_OPTIONAL",
            Label::Repeated => "TLVC_LABEL_REPEATED",
        }
    }
}

/// Wire-kind macro for a field's logical type.
pub fn wire_type_macro(kind: &FieldKind) -> &'static str {
    match kind {
        FieldKind::Int32 => "TLVC_TYPE_INT32",
        FieldKind::Uint32 => "TLVC_TYPE_UINT32",
        FieldKind::Int64 => "TLVC_TYPE_INT64",
        FieldKind::Uint64 => "TLVC_TYPE_UINT64",
        FieldKind::Float => "TLVC_TYPE_FLOAT",
        FieldKind::Double => "TLVC_TYPE_DOUBLE",
        FieldKind::Bool => "TLVC_TYPE_BOOL",
        FieldKind::String => "TLVC_TYPE_STRING",
        FieldKind::Bytes => "TLVC_TYPE_BYTES",
        FieldKind::Enum(_) => "TLVC_TYPE_ENUM",
        FieldKind::Message(_) => "TLVC_TYPE_MESSAGE",
    }
}

/// One entry of the tag-sorted field descriptor array.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub tag: u32,
    pub label: Label,
    /// Wire-kind macro name.
    pub kind: &'static str,
    /// Struct member holding the value (the union member for oneof fields).
    pub member: String,
    /// Member the runtime checks before reading `member`: the repeated
    /// count for repeated fields, the discriminant for oneof members.
    pub quantifier_member: Option<String>,
    /// Descriptor symbol of the referenced type for enum/message kinds.
    pub sub_descriptor: Option<String>,
    /// Reference expression for the declared default, if any.
    pub default_ref: Option<String>,
    /// Set for oneof members; tells the runtime to compare the
    /// discriminant against the tag before reading the union.
    pub oneof: bool,
}

/// One entry of the name-sorted index: position of `name` in the
/// tag-sorted descriptor array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameIndexEntry {
    pub name: String,
    pub index: usize,
}

/// One maximal run of consecutive tag numbers over the tag-sorted array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberRange {
    pub start_tag: u32,
    pub first_index: usize,
    pub run_len: usize,
}

/// The per-message descriptor tables.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptorTable {
    /// Strictly ascending by tag; uniqueness is an upstream guarantee.
    pub fields: Vec<FieldDescriptor>,
    /// Lexicographically sorted; `None` in size-reduced mode.
    pub name_index: Option<Vec<NameIndexEntry>>,
    pub ranges: Vec<NumberRange>,
}

/// Group ascending tag numbers into maximal consecutive runs.
pub fn build_ranges(tags: &[u32]) -> Vec<NumberRange> {
    let mut ranges: Vec<NumberRange> = Vec::new();
    for (index, &tag) in tags.iter().enumerate() {
        match ranges.last_mut() {
            Some(run) if tag == run.start_tag + run.run_len as u32 => run.run_len += 1,
            _ => ranges.push(NumberRange {
                start_tag: tag,
                first_index: index,
                run_len: 1,
            }),
        }
    }
    ranges
}

fn descriptor_for(message: &Message, msg_ident: &str, field: &Field) -> Result<FieldDescriptor> {
    let label = if field.is_repeated() {
        Label::Repeated
    } else {
        Label::Optional
    };

    let quantifier_member = if field.is_repeated() {
        Some(format!("n_{}", field.name))
    } else {
        field
            .oneof
            .map(|group| format!("{}_case", message.oneofs[group].name))
    };

    let sub_descriptor = match &field.kind {
        FieldKind::Enum(full) | FieldKind::Message(full) => {
            Some(format!("{}_descriptor", type_ident(full)))
        }
        _ => None,
    };

    let default_ref = match field.default {
        Some(_) => Some(defaults::render(msg_ident, field)?.reference),
        None => None,
    };

    Ok(FieldDescriptor {
        name: field.name.clone(),
        tag: field.tag,
        label,
        kind: wire_type_macro(&field.kind),
        member: field.name.clone(),
        quantifier_member,
        sub_descriptor,
        default_ref,
        oneof: field.oneof.is_some(),
    })
}

/// Build the three descriptor tables for one message.
///
/// Fields (oneof members included, flattened) are stable-sorted by
/// ascending tag; the name index is skipped in size-reduced mode.
pub fn build(message: &Message, code_size: bool) -> Result<DescriptorTable> {
    let msg_ident = type_ident(&message.full_name);

    let mut sorted: Vec<&Field> = message.fields.iter().collect();
    sorted.sort_by_key(|f| f.tag);

    let mut fields = Vec::with_capacity(sorted.len());
    for field in &sorted {
        fields.push(descriptor_for(message, &msg_ident, field)?);
    }

    let name_index = if code_size {
        None
    } else {
        let mut entries: Vec<NameIndexEntry> = fields
            .iter()
            .enumerate()
            .map(|(index, f)| NameIndexEntry {
                name: f.name.clone(),
                index,
            })
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Some(entries)
    };

    let tags: Vec<u32> = fields.iter().map(|f| f.tag).collect();
    let ranges = build_ranges(&tags);

    Ok(DescriptorTable {
        fields,
        name_index,
        ranges,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DefaultValue, OneofGroup};

    fn scenario_a() -> Message {
        Message::new("demo.M").with_fields(vec![
            Field::new("a", 1, FieldKind::Int32),
            Field::new("b", 5, FieldKind::String),
            Field::new("c", 2, FieldKind::Int32),
        ])
    }

    #[test]
    fn fields_sorted_by_tag() {
        let table = build(&scenario_a(), false).unwrap();
        let order: Vec<_> = table.fields.iter().map(|f| (f.name.as_str(), f.tag)).collect();
        assert_eq!(order, vec![("a", 1), ("c", 2), ("b", 5)]);
        assert!(table.fields.windows(2).all(|w| w[0].tag < w[1].tag));
    }

    #[test]
    fn ranges_cover_consecutive_runs() {
        let table = build(&scenario_a(), false).unwrap();
        assert_eq!(
            table.ranges,
            vec![
                NumberRange { start_tag: 1, first_index: 0, run_len: 2 },
                NumberRange { start_tag: 5, first_index: 2, run_len: 1 },
            ]
        );
    }

    #[test]
    fn range_lengths_sum_to_field_count_and_stay_disjoint() {
        let msg = Message::new("demo.Sparse").with_fields(vec![
            Field::new("a", 3, FieldKind::Int32),
            Field::new("b", 100, FieldKind::Int32),
            Field::new("c", 4, FieldKind::Int32),
            Field::new("d", 5, FieldKind::Int32),
            Field::new("e", 101, FieldKind::Int32),
            Field::new("f", 1, FieldKind::Int32),
        ]);
        let table = build(&msg, false).unwrap();

        let total: usize = table.ranges.iter().map(|r| r.run_len).sum();
        assert_eq!(total, msg.fields.len());

        // Ordered by start tag, pairwise disjoint, internally consecutive.
        for pair in table.ranges.windows(2) {
            assert!(pair[0].start_tag + pair[0].run_len as u32 <= pair[1].start_tag);
        }
        let covered: Vec<u32> = table
            .ranges
            .iter()
            .flat_map(|r| (0..r.run_len).map(move |i| r.start_tag + i as u32))
            .collect();
        let mut declared: Vec<u32> = msg.fields.iter().map(|f| f.tag).collect();
        declared.sort_unstable();
        assert_eq!(covered, declared);
    }

    #[test]
    fn name_index_binary_search_matches_linear_scan() {
        let msg = Message::new("demo.Named").with_fields(vec![
            Field::new("zeta", 10, FieldKind::Int32),
            Field::new("alpha", 20, FieldKind::Int32),
            Field::new("mid", 3, FieldKind::Int32),
        ]);
        let table = build(&msg, false).unwrap();
        let index = table.name_index.as_ref().unwrap();

        assert!(index.windows(2).all(|w| w[0].name < w[1].name));
        for field in &msg.fields {
            let pos = index
                .binary_search_by(|e| e.name.as_str().cmp(&field.name))
                .unwrap();
            let linear = table.fields.iter().position(|f| f.name == field.name).unwrap();
            assert_eq!(index[pos].index, linear);
        }
    }

    #[test]
    fn code_size_mode_skips_name_index() {
        let table = build(&scenario_a(), true).unwrap();
        assert!(table.name_index.is_none());
        assert!(!table.ranges.is_empty());
    }

    #[test]
    fn quantifiers_and_flags() {
        let msg = Message::new("demo.M")
            .with_oneofs(vec![OneofGroup::new("choice")])
            .with_fields(vec![
                Field::new("items", 1, FieldKind::Message("demo.Item".into())).repeated(),
                Field::new("x", 2, FieldKind::Int32).in_oneof(0),
                Field::new("plain", 3, FieldKind::Int32),
            ]);
        let table = build(&msg, false).unwrap();

        let items = &table.fields[0];
        assert_eq!(items.quantifier_member.as_deref(), Some("n_items"));
        assert_eq!(items.label, Label::Repeated);
        assert_eq!(items.sub_descriptor.as_deref(), Some("demo_item_descriptor"));
        assert!(!items.oneof);

        let x = &table.fields[1];
        assert_eq!(x.quantifier_member.as_deref(), Some("choice_case"));
        assert!(x.oneof);

        let plain = &table.fields[2];
        assert_eq!(plain.quantifier_member, None);
        assert_eq!(plain.sub_descriptor, None);
    }

    #[test]
    fn default_reference_flows_into_descriptor() {
        let msg = Message::new("demo.M").with_fields(vec![
            Field::new("n", 1, FieldKind::Int32).with_default(DefaultValue::Int(42)),
            Field::new("s", 2, FieldKind::String).with_default(DefaultValue::String("".into())),
        ]);
        let table = build(&msg, false).unwrap();
        assert_eq!(
            table.fields[0].default_ref.as_deref(),
            Some("&demo_m_n_default_value")
        );
        assert_eq!(
            table.fields[1].default_ref.as_deref(),
            Some("demo_m_s_default_value")
        );
    }

    #[test]
    fn empty_message_yields_empty_tables() {
        let table = build(&Message::new("demo.Empty"), false).unwrap();
        assert!(table.fields.is_empty());
        assert!(table.ranges.is_empty());
        assert_eq!(table.name_index.as_ref().unwrap().len(), 0);
    }

    #[test]
    fn single_run_when_tags_are_dense() {
        assert_eq!(
            build_ranges(&[1, 2, 3, 4]),
            vec![NumberRange { start_tag: 1, first_index: 0, run_len: 4 }]
        );
        assert_eq!(build_ranges(&[]), vec![]);
    }
}
