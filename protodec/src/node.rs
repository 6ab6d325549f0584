//! The schema-free tag-tree data model (spec.md §3).

use std::collections::BTreeMap;

use crate::error::DecodeErrorKind;
use crate::varint::encoded_len;
use crate::wire::WireType;

/// One decoded record, tagged with the field number it was read under
/// (`0` for the synthetic root).
///
/// The original tool's `Variant` tracks this as a mutable field on a
/// shared-ownership node (`VariantPtr`); here it's just a struct field on an
/// owned tree, since Rust ownership makes the sharing unnecessary (spec.md
/// §9's own redesign note).
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Field number this node was read under within its parent message, or
    /// position (1-based) within its parent repeated group. `0` at the root.
    pub index: u32,
    pub kind: NodeKind,
}

/// The payload shape of a [`Node`].
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Wire type 0: a decoded varint, kept as the raw 64-bit bit pattern.
    Varint(i64),
    /// Wire type 5: a 4-byte little-endian float.
    Fixed32(f32),
    /// Wire type 1: an 8-byte little-endian double.
    Fixed64(f64),
    /// Wire type 2, classified as opaque bytes (not ASCII, or the nested
    /// parse failed structural validation).
    Bytes(Vec<u8>),
    /// Wire type 2, classified as an embedded message: ascending field
    /// numbers validated on the first pass (spec.md §4.B).
    Message(BTreeMap<u32, Node>),
    /// A field number seen more than once under the same parent, collapsed
    /// into an ordered sequence (spec.md §3's `mapInsert` rule). Keys are
    /// always `1..=len()` in insertion order, so a plain `Vec` captures the
    /// invariant without a redundant key.
    Repeated(Vec<Node>),
}

impl Node {
    /// A freshly constructed, empty message node at the given field index.
    pub fn empty_message(index: u32) -> Node {
        Node {
            index,
            kind: NodeKind::Message(BTreeMap::new()),
        }
    }

    /// The child map, if this node is a [`NodeKind::Message`].
    pub fn as_message(&self) -> Option<&BTreeMap<u32, Node>> {
        match &self.kind {
            NodeKind::Message(map) => Some(map),
            _ => None,
        }
    }

    /// The child at `field_index`, descending into a [`NodeKind::Message`].
    pub fn get(&self, field_index: u32) -> Option<&Node> {
        self.as_message()?.get(&field_index)
    }

    /// Re-encoded size in bytes of this node as a field of its parent
    /// message, including its own tag and (for length-delimited kinds)
    /// length prefix. Testable property: for any input the parser accepts,
    /// `root.size_in_bytes() == input.len()` (modulo trailing zero padding
    /// the parser ignores).
    ///
    /// The original computes a field's wire type via a switch that has no
    /// case for an embedded message, silently defaulting to varint under
    /// `NDEBUG`; messages are unambiguously wire type 2 on the wire, so
    /// that's what's used here (see DESIGN.md).
    pub fn size_in_bytes(&self) -> usize {
        match &self.kind {
            NodeKind::Message(map) => {
                map.values().map(Node::field_size_in_bytes).sum()
            }
            NodeKind::Repeated(items) => {
                items.iter().map(Node::field_size_in_bytes).sum()
            }
            _ => self.field_size_in_bytes(),
        }
    }

    /// This node's contribution to its parent's size: tag bytes, plus a
    /// length prefix for length-delimited kinds, plus the payload.
    fn field_size_in_bytes(&self) -> usize {
        let wire_type = match &self.kind {
            NodeKind::Varint(_) => WireType::Varint,
            NodeKind::Fixed64(_) => WireType::Fixed64,
            NodeKind::Bytes(_) | NodeKind::Message(_) => WireType::Len,
            NodeKind::Fixed32(_) => WireType::Fixed32,
            NodeKind::Repeated(_) => {
                unreachable!("a repeated node never appears as a map value")
            }
        };
        let tag = ((self.index as i64) << 3) | (wire_type.tag_bits() as i64);
        let tag_len = encoded_len(tag);
        let payload_len = match &self.kind {
            NodeKind::Varint(v) => encoded_len(*v),
            NodeKind::Fixed64(_) => 8,
            NodeKind::Fixed32(_) => 4,
            NodeKind::Bytes(b) => {
                let len = b.len();
                encoded_len(len as i64) + len
            }
            NodeKind::Message(_) => {
                let len = self
                    .as_message()
                    .map(|m| m.values().map(Node::field_size_in_bytes).sum())
                    .unwrap_or(0);
                encoded_len(len as i64) + len
            }
            NodeKind::Repeated(_) => unreachable!(),
        };
        tag_len + payload_len
    }
}

/// The result of parsing a buffer into a tag-tree (spec.md §4.D).
///
/// Unlike a `Result`-returning parse, the tree built so far is kept even on
/// failure: the original tool prints whatever was decoded up to the point
/// of failure, and the descriptor scanner ([`crate::scan`]) wants to know
/// just "did this candidate parse cleanly", not see the partial tree.
#[derive(Debug, Clone)]
pub struct RawMessage {
    root: Node,
    error: Option<DecodeErrorKind>,
}

impl RawMessage {
    /// An empty message with no error — the starting point for
    /// [`crate::parse::parse`].
    pub fn new() -> RawMessage {
        RawMessage {
            root: Node::empty_message(0),
            error: None,
        }
    }

    /// The root message node.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Mutable access to the root message node, for the parser to populate.
    pub fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    /// `true` if parsing stopped early due to a structural problem.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// The recorded failure, if any.
    pub fn error(&self) -> Option<&DecodeErrorKind> {
        self.error.as_ref()
    }

    /// Latches a failure onto this message. Only the first failure sticks —
    /// matching the original's "once corrupt, stay corrupt" state machine.
    pub fn set_error(&mut self, kind: DecodeErrorKind) {
        if self.error.is_none() {
            self.error = Some(kind);
        }
    }
}

impl Default for RawMessage {
    fn default() -> Self {
        RawMessage::new()
    }
}

/// Inserts `child` under `field_index` in `map`, applying the
/// repeated-field collapsing rule: a field number seen once is stored
/// directly, a field number seen again turns both the existing and new
/// value into a [`NodeKind::Repeated`] sequence (spec.md §3's `mapInsert`).
///
/// Used by the parser, which builds each message's children in its own map
/// before wrapping them into a `Node`.
pub(crate) fn insert_field(map: &mut BTreeMap<u32, Node>, field_index: u32, child: Node) {
    match map.remove(&field_index) {
        None => {
            map.insert(field_index, child);
        }
        Some(existing) => {
            let mut seq = match existing.kind {
                NodeKind::Repeated(items) => items,
                _ => vec![existing],
            };
            seq.push(child);
            map.insert(
                field_index,
                Node {
                    index: field_index,
                    kind: NodeKind::Repeated(seq),
                },
            );
        }
    }
}
