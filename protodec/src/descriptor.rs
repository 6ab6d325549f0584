//! Descriptor interpreter (spec.md §4.F): reinterprets a tag-tree as a
//! `google.protobuf.FileDescriptorProto` and renders the `.proto` source it
//! describes.
//!
//! The original tool asserts on every field-number lookup here (`RawMessage::At`
//! throws, enum/message dispatch `assert`s on shape). spec.md §7 calls that
//! out as a programming-contract violation that production code should
//! instead recover from — so every lookup in this module returns
//! [`DescriptorError`] instead of panicking, and [`crate::scan`] skips a
//! candidate that fails here rather than aborting the whole scan.

use std::fmt::Write as _;

use thiserror::Error;

use crate::node::{Node, NodeKind};

/// A structural mismatch between the observed tag-tree and the field-number
/// layout this interpreter expects for `FileDescriptorProto` and its
/// nested messages (spec.md §4.F, §7).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    /// `field` was required at this position but absent.
    #[error("missing field {field} in {context}")]
    MissingField {
        /// The expected field number.
        field: u32,
        /// What was being rendered (`"FieldDescriptorProto"`, etc.), for
        /// diagnostics.
        context: &'static str,
    },
    /// `field` was present but not the wire kind the interpreter needs
    /// (e.g. a `FieldDescriptorProto.type` that isn't a varint).
    #[error("field {field} in {context} has the wrong wire kind")]
    WrongKind {
        /// The field number whose kind didn't match.
        field: u32,
        /// What was being rendered.
        context: &'static str,
    },
    /// A `FieldDescriptorProto.type` value outside `1..=18`.
    #[error("field type {0} is out of range")]
    UnknownFieldType(i64),
    /// A `FieldDescriptorProto.label` value outside `1..=3`.
    #[error("field label {0} is out of range")]
    UnknownLabel(i64),
}

type Result<T> = std::result::Result<T, DescriptorError>;

const FIELD_TYPE_NAMES: [&str; 18] = [
    "double", "float", "int64", "uint64", "int32", "fixed64", "fixed32", "bool", "string",
    "group", "message", "bytes", "uint32", "enum", "sfixed32", "sfixed64", "sint32", "sint64",
];

const LABEL_NAMES: [&str; 3] = ["optional", "required", "repeated"];

/// `true` iff `root` has the fingerprint spec.md §4.F gates `grab` on: a
/// `FileDescriptorProto`-shaped root with string fields 1 (filename) and 2
/// (package) and a message/repeated field 4 (messages).
pub fn looks_like_descriptor(root: &Node) -> bool {
    let Some(map) = root.as_message() else {
        return false;
    };
    let is_string = |n: &Node| matches!(n.kind, NodeKind::Bytes(_));
    let is_message_ish = |n: &Node| matches!(n.kind, NodeKind::Message(_) | NodeKind::Repeated(_));
    map.get(&1).is_some_and(is_string)
        && map.get(&2).is_some_and(is_string)
        && map.get(&4).is_some_and(is_message_ish)
}

/// Renders the `.proto` source text described by `root`, interpreted as a
/// `FileDescriptorProto` (spec.md §4.F).
pub fn render(root: &Node) -> Result<String> {
    let mut out = String::new();
    let map = root
        .as_message()
        .ok_or(DescriptorError::WrongKind {
            field: 0,
            context: "FileDescriptorProto",
        })?;

    if let Some(package) = map.get(&2) {
        let _ = writeln!(out, "package {};", as_string(package, 2, "FileDescriptorProto")?);
    }
    if let Some(imports) = map.get(&3) {
        for item in for_each(imports) {
            let _ = writeln!(out, "import \"{}\";", as_string(item, 3, "FileDescriptorProto")?);
        }
    }
    if let Some(enums) = map.get(&5) {
        for item in for_each(enums) {
            render_enum(item, &mut out, 0)?;
        }
    }
    if let Some(messages) = map.get(&4) {
        for item in for_each(messages) {
            render_message(item, &mut out, 0)?;
        }
    }
    Ok(out)
}

/// Yields `node` itself if it's a lone message, or each element if it's a
/// `Repeated` sequence — the `vit->isMap() / vit->isRepeated()` branch the
/// original repeats at every repeatable field.
fn for_each(node: &Node) -> Box<dyn Iterator<Item = &Node> + '_> {
    match &node.kind {
        NodeKind::Repeated(items) => Box::new(items.iter()),
        _ => Box::new(std::iter::once(node)),
    }
}

fn as_string(node: &Node, field: u32, context: &'static str) -> Result<&str> {
    match &node.kind {
        NodeKind::Bytes(bytes) => Ok(std::str::from_utf8(bytes).unwrap_or_default()),
        _ => Err(DescriptorError::WrongKind { field, context }),
    }
}

fn as_int(node: &Node, field: u32, context: &'static str) -> Result<i64> {
    match &node.kind {
        NodeKind::Varint(v) => Ok(*v),
        _ => Err(DescriptorError::WrongKind { field, context }),
    }
}

fn field_at<'a>(map: &'a std::collections::BTreeMap<u32, Node>, field: u32, context: &'static str) -> Result<&'a Node> {
    map.get(&field)
        .ok_or(DescriptorError::MissingField { field, context })
}

fn push_indent(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push('\t');
    }
}

/// Renders one `EnumDescriptorProto` (1=name, 2=values, repeatable).
fn render_enum(node: &Node, out: &mut String, indent: usize) -> Result<()> {
    const CTX: &str = "EnumDescriptorProto";
    let map = node.as_message().ok_or(DescriptorError::WrongKind { field: 0, context: CTX })?;
    push_indent(out, indent);
    let _ = writeln!(out, "enum {} {{", as_string(field_at(map, 1, CTX)?, 1, CTX)?);

    let values = field_at(map, 2, CTX)?;
    for value in for_each(values) {
        const VCTX: &str = "EnumValueDescriptorProto";
        let vmap = value.as_message().ok_or(DescriptorError::WrongKind { field: 0, context: VCTX })?;
        push_indent(out, indent + 1);
        let _ = writeln!(
            out,
            "{} = {};",
            as_string(field_at(vmap, 1, VCTX)?, 1, VCTX)?,
            as_int(field_at(vmap, 2, VCTX)?, 2, VCTX)?
        );
    }

    push_indent(out, indent);
    out.push_str("}\n");
    Ok(())
}

/// Renders one `DescriptorProto` (1=name, 2=fields, 3=nested messages,
/// 4=nested enums), in the order the original emits: enums, nested
/// messages, then fields.
fn render_message(node: &Node, out: &mut String, indent: usize) -> Result<()> {
    const CTX: &str = "DescriptorProto";
    let map = node.as_message().ok_or(DescriptorError::WrongKind { field: 0, context: CTX })?;
    push_indent(out, indent);
    let _ = writeln!(out, "message {} {{", as_string(field_at(map, 1, CTX)?, 1, CTX)?);

    if let Some(enums) = map.get(&4) {
        for item in for_each(enums) {
            render_enum(item, out, indent + 1)?;
        }
    }
    if let Some(nested) = map.get(&3) {
        for item in for_each(nested) {
            render_message(item, out, indent + 1)?;
        }
    }
    if let Some(fields) = map.get(&2) {
        for item in for_each(fields) {
            render_field(item, out, indent + 1)?;
        }
    }

    push_indent(out, indent);
    out.push_str("}\n");
    Ok(())
}

/// Renders one `FieldDescriptorProto` (1=name, 3=number, 4=label, 5=type,
/// 6=type_name, 7=default_value).
fn render_field(node: &Node, out: &mut String, indent: usize) -> Result<()> {
    const CTX: &str = "FieldDescriptorProto";
    let map = node.as_message().ok_or(DescriptorError::WrongKind { field: 0, context: CTX })?;

    let type_num = as_int(field_at(map, 5, CTX)?, 5, CTX)?;
    if !(1..=18).contains(&type_num) {
        return Err(DescriptorError::UnknownFieldType(type_num));
    }
    let is_complex = type_num == 11 || type_num == 14;
    let type_name = if is_complex {
        as_string(field_at(map, 6, CTX)?, 6, CTX)?.to_string()
    } else {
        FIELD_TYPE_NAMES[(type_num - 1) as usize].to_string()
    };

    let label_num = as_int(field_at(map, 4, CTX)?, 4, CTX)?;
    if !(1..=3).contains(&label_num) {
        return Err(DescriptorError::UnknownLabel(label_num));
    }
    let label = LABEL_NAMES[(label_num - 1) as usize];

    let default_suffix = match map.get(&7) {
        Some(default) => format!(" [default = {}]", as_string(default, 7, CTX)?),
        None => String::new(),
    };

    push_indent(out, indent);
    let _ = writeln!(
        out,
        "{label} {type_name} {} = {}{default_suffix};",
        as_string(field_at(map, 1, CTX)?, 1, CTX)?,
        as_int(field_at(map, 3, CTX)?, 3, CTX)?,
    );
    Ok(())
}
