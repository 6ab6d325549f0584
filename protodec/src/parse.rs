//! The tag-tree parser (spec.md §4.D).
//!
//! An iterative, explicit-stack walk rather than recursive descent — the
//! original tool keeps two parallel stacks (one of end-offsets, one of the
//! message currently being populated) so a single cursor can thread through
//! arbitrarily deep nesting without blowing the call stack on adversarial
//! input. The shape here is the same, adapted to Rust ownership: each stack
//! frame owns the `BTreeMap` it's filling, and only folds it into a
//! [`Node`] when that frame's byte range is fully consumed, at which point
//! it's handed to the parent frame via [`insert_field`].

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::error::DecodeErrorKind;
use crate::node::{insert_field, Node, NodeKind, RawMessage};
use crate::validate::looks_like_message;
use crate::varint::{is_ascii_string, read_varint};
use crate::wire::WireType;

struct Frame {
    /// Field number this frame's eventual `Message` node will be stored
    /// under in its parent (`0` for the root frame, which has no parent).
    index: u32,
    /// Absolute end offset (exclusive) of this frame's byte range.
    end: usize,
    map: BTreeMap<u32, Node>,
}

/// Parses `buf` into a tag-tree.
///
/// Always returns a `RawMessage` — even a failed parse keeps whatever tree
/// was built before the failure, matching the original tool's behavior of
/// printing a partial tree rather than nothing (spec.md §7). Check
/// [`RawMessage::is_error`] to tell a clean parse from a recovered one.
pub fn parse(buf: &[u8]) -> RawMessage {
    debug!(bytes = buf.len(), "parsing tag-tree");
    let mut msg = RawMessage::new();
    let len = buf.len();
    if len == 0 {
        debug!("empty input buffer");
        msg.set_error(DecodeErrorKind::DataCorrupted);
        return msg;
    }

    let mut pos = 0usize;
    let mut stack = vec![Frame {
        index: 0,
        end: len,
        map: BTreeMap::new(),
    }];

    'frames: while let Some(frame_end) = stack.last().map(|f| f.end) {
        loop {
            if pos < frame_end {
                let (tag, next) = read_varint(buf, pos, frame_end);
                pos = next;
                if tag == 0 {
                    continue;
                }

                let (field_index, wire_type) = WireType::split_tag(tag as u64);

                if pos >= frame_end {
                    debug!(offset = pos, "truncated tag: no payload byte follows");
                    msg.set_error(DecodeErrorKind::Truncated { offset: pos });
                    break 'frames;
                }

                let wire_type = match wire_type {
                    Ok(wt) => wt,
                    Err(raw) => {
                        debug!(
                            offset = pos,
                            wire_type = raw,
                            field_index,
                            "unknown wire type"
                        );
                        msg.set_error(DecodeErrorKind::UnknownWireType {
                            offset: pos,
                            wire_type: raw,
                            field_index,
                        });
                        break 'frames;
                    }
                };

                let field_index = field_index as u32;

                match wire_type {
                    WireType::Varint => {
                        let (value, next) = read_varint(buf, pos, frame_end);
                        pos = next;
                        insert_field(
                            &mut stack.last_mut().unwrap().map,
                            field_index,
                            Node {
                                index: field_index,
                                kind: NodeKind::Varint(value),
                            },
                        );
                    }
                    WireType::Fixed64 => {
                        let value = read_fixed64(buf, pos);
                        pos += 8;
                        insert_field(
                            &mut stack.last_mut().unwrap().map,
                            field_index,
                            Node {
                                index: field_index,
                                kind: NodeKind::Fixed64(value),
                            },
                        );
                    }
                    WireType::Fixed32 => {
                        let value = read_fixed32(buf, pos);
                        pos += 4;
                        insert_field(
                            &mut stack.last_mut().unwrap().map,
                            field_index,
                            Node {
                                index: field_index,
                                kind: NodeKind::Fixed32(value),
                            },
                        );
                    }
                    WireType::Len => {
                        let (declared_len, next) = read_varint(buf, pos, frame_end);
                        let payload_end = if declared_len >= 0 {
                            next.checked_add(declared_len as usize)
                        } else {
                            None
                        };
                        let payload_end = match payload_end {
                            Some(end) if end <= frame_end => end,
                            _ => {
                                debug!(offset = pos, "length-delimited field overruns its frame");
                                msg.set_error(DecodeErrorKind::DataCorrupted);
                                break 'frames;
                            }
                        };
                        let payload = &buf[next..payload_end];

                        if is_ascii_string(payload) || !looks_like_message(payload) {
                            trace!(offset = next, field_index, len = payload.len(), "bytes field");
                            insert_field(
                                &mut stack.last_mut().unwrap().map,
                                field_index,
                                Node {
                                    index: field_index,
                                    kind: NodeKind::Bytes(payload.to_vec()),
                                },
                            );
                            pos = payload_end;
                        } else {
                            trace!(
                                offset = next,
                                field_index,
                                end = payload_end,
                                "descending into nested message"
                            );
                            pos = next;
                            stack.push(Frame {
                                index: field_index,
                                end: payload_end,
                                map: BTreeMap::new(),
                            });
                            continue 'frames;
                        }
                    }
                }
            }

            if pos >= frame_end {
                let finished = stack.pop().unwrap();
                trace!(offset = pos, field_index = finished.index, "frame complete");
                let node = Node {
                    index: finished.index,
                    kind: NodeKind::Message(finished.map),
                };
                match stack.last_mut() {
                    Some(parent) => {
                        insert_field(&mut parent.map, finished.index, node);
                    }
                    None => {
                        *msg.root_mut() = node;
                        return msg;
                    }
                }
                continue 'frames;
            }
        }
    }

    msg
}

/// Reads a little-endian `f32` at `pos`, tolerating truncation at the very
/// end of the buffer (the tag-length check already guarantees `pos` is
/// inside a valid frame; this only guards the physical end of `buf`).
fn read_fixed32(buf: &[u8], pos: usize) -> f32 {
    if pos + 4 > buf.len() {
        return 0.0;
    }
    f32::from_le_bytes(buf[pos..pos + 4].try_into().unwrap())
}

/// See [`read_fixed32`].
fn read_fixed64(buf: &[u8], pos: usize) -> f64 {
    if pos + 8 > buf.len() {
        return 0.0;
    }
    f64::from_le_bytes(buf[pos..pos + 8].try_into().unwrap())
}
