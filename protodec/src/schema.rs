//! Schema inferer (spec.md §4.E): best-effort `.proto` reconstruction from
//! an already-parsed tag-tree, with no access to an authoritative schema.
//!
//! Every field is guessed `required` (the wire format carries no trace of
//! `optional` vs. `required`), and embedded messages are deduplicated by
//! the literal text of their rendered field list: two submessages that
//! render identically share one `MSGn`, the same way the original tool's
//! string-keyed lookup does.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::node::{Node, NodeKind};

/// Infers and renders a `.proto`-shaped schema from `root`'s children.
pub fn print(root: &Node) -> String {
    let mut messages: Vec<String> = Vec::new();
    let mut lookup: HashMap<String, usize> = HashMap::new();
    fill_schemas(root, &mut messages, &mut lookup);

    let mut out = String::new();
    out.push_str("package ProtodecMessages;\n");
    for (i, text) in messages.iter().enumerate() {
        let _ = write!(out, "\nmessage MSG{} {{\n", i + 1);
        out.push_str(text);
        out.push_str("}\n");
    }
    out
}

/// Builds the field-list text for `node` (a message), recursing into
/// nested/repeated message fields first so their `MSGn` numbers are
/// assigned before this text references them. Returns the 1-based `MSGn`
/// id assigned to `node`'s shape (reused if an identical shape was already
/// seen).
fn fill_schemas(
    node: &Node,
    messages: &mut Vec<String>,
    lookup: &mut HashMap<String, usize>,
) -> usize {
    let map = node
        .as_message()
        .expect("fill_schemas called on a non-message node");

    let mut text = String::new();
    for (field_number, child) in map {
        text.push('\t');
        match &child.kind {
            NodeKind::Repeated(items) => {
                let first = items.first().expect("a repeated field is never empty");
                let type_name = match &first.kind {
                    NodeKind::Message(_) => format!("MSG{}", fill_schemas(first, messages, lookup)),
                    other => scalar_type_name(other).to_string(),
                };
                let _ =
                    writeln!(text, "repeated {type_name} fld{field_number} = {field_number};");
            }
            NodeKind::Message(_) => {
                let id = fill_schemas(child, messages, lookup);
                let _ = writeln!(text, "required MSG{id} fld{field_number} = {field_number};");
            }
            other => {
                let _ = writeln!(
                    text,
                    "required {} fld{field_number} = {field_number};",
                    scalar_type_name(other)
                );
            }
        }
    }

    match lookup.get(&text) {
        Some(&id) => id,
        None => {
            messages.push(text.clone());
            let id = messages.len();
            lookup.insert(text, id);
            id
        }
    }
}

fn scalar_type_name(kind: &NodeKind) -> &'static str {
    match kind {
        NodeKind::Varint(_) => "int64",
        NodeKind::Fixed64(_) => "double",
        NodeKind::Fixed32(_) => "float",
        NodeKind::Bytes(_) => "string",
        NodeKind::Message(_) | NodeKind::Repeated(_) => {
            unreachable!("message/repeated kinds are handled by the caller")
        }
    }
}
